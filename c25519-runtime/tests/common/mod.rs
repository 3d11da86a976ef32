//! Common test utilities for integration tests.

#![allow(dead_code)]

use c25519_runtime::{Bridge, ExportNames, ModuleSource, RuntimeConfig, WasmRuntime};

/// Mock computation module with the same imports as the real one.
///
/// Its arithmetic is trivial but position-sensitive, so tests can see
/// exactly which offsets the facade passed:
///
/// - base-point mult: `pub[i] = priv[i] ^ 0x55`
/// - scalar mult: `shared[i] = (pub[i] ^ 0x55) + priv[i]`
/// - Edwards public key: `pub[i] = priv[i] ^ 0xAA`
/// - sign: `sig[0..32] = pub ^ priv`, `sig[32..36] = len`, `sig[36..40] = byte sum`
/// - verify: checks the length and byte sum
pub fn mock_wat(names: &ExportNames) -> String {
    format!(
        r#"
(module
  (import "env" "memory" (memory 1))
  (import "env" "__memory_base" (global $memory_base i32))
  (import "env" "__stack_pointer" (global $sp (mut i32)))

  (func $xor_key (param $out i32) (param $in i32) (param $key i32)
    (local $i i32)
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (i32.const 32)))
        (i32.store8
          (i32.add (local.get $out) (local.get $i))
          (i32.xor
            (i32.load8_u (i32.add (local.get $in) (local.get $i)))
            (local.get $key)))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next))))

  (func $xor_buf (param $out i32) (param $a i32) (param $b i32)
    (local $i i32)
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (i32.const 32)))
        (i32.store8
          (i32.add (local.get $out) (local.get $i))
          (i32.xor
            (i32.load8_u (i32.add (local.get $a) (local.get $i)))
            (i32.load8_u (i32.add (local.get $b) (local.get $i)))))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next))))

  (func $sum (param $ptr i32) (param $len i32) (result i32)
    (local $i i32)
    (local $acc i32)
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (local.get $len)))
        (local.set $acc
          (i32.add
            (local.get $acc)
            (i32.load8_u (i32.add (local.get $ptr) (local.get $i)))))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next)))
    (local.get $acc))

  (func (export "{sbasemult}") (param $pub i32) (param $priv i32)
    (call $xor_key (local.get $pub) (local.get $priv) (i32.const 0x55)))

  (func (export "{smult}") (param $shared i32) (param $pub i32) (param $priv i32)
    (local $i i32)
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (i32.const 32)))
        (i32.store8
          (i32.add (local.get $shared) (local.get $i))
          (i32.add
            (i32.xor
              (i32.load8_u (i32.add (local.get $pub) (local.get $i)))
              (i32.const 0x55))
            (i32.load8_u (i32.add (local.get $priv) (local.get $i)))))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next))))

  (func (export "{sec_to_pub}") (param $pub i32) (param $priv i32)
    (call $xor_key (local.get $pub) (local.get $priv) (i32.const 0xAA)))

  (func (export "{sign}")
    (param $sig i32) (param $pub i32) (param $priv i32) (param $msg i32) (param $len i32)
    (global.set $sp (i32.sub (global.get $sp) (i32.const 16)))
    (call $xor_buf (local.get $sig) (local.get $pub) (local.get $priv))
    (i32.store (i32.add (local.get $sig) (i32.const 32)) (local.get $len))
    (i32.store
      (i32.add (local.get $sig) (i32.const 36))
      (call $sum (local.get $msg) (local.get $len)))
    (memory.fill (i32.add (local.get $sig) (i32.const 40)) (i32.const 0) (i32.const 24))
    (global.set $sp (i32.add (global.get $sp) (i32.const 16))))

  (func (export "{verify}")
    (param $sig i32) (param $pub i32) (param $msg i32) (param $len i32) (result i32)
    (i32.and
      (i32.eq
        (i32.load (i32.add (local.get $sig) (i32.const 32)))
        (local.get $len))
      (i32.eq
        (i32.load (i32.add (local.get $sig) (i32.const 36)))
        (call $sum (local.get $msg) (local.get $len)))))

  (func (export "stack_pointer") (result i32) (global.get $sp))
  (func (export "memory_base") (result i32) (global.get $memory_base)))
"#,
        sbasemult = names.scalar_base_mult,
        smult = names.scalar_mult,
        sec_to_pub = names.edwards_public,
        sign = names.sign,
        verify = names.verify,
    )
}

/// Mock module bytes exporting the given names.
pub fn mock_module(names: &ExportNames) -> Vec<u8> {
    wat::parse_str(mock_wat(names)).expect("Failed to parse WAT")
}

/// A runtime with test limits.
pub fn runtime() -> WasmRuntime {
    WasmRuntime::new(RuntimeConfig::testing()).expect("Failed to create runtime")
}

/// A bridge linked against the mock module with default export names.
pub fn mock_bridge() -> Bridge {
    let names = ExportNames::default();
    let source = ModuleSource::bytes("mock", mock_module(&names));
    Bridge::link(&runtime(), &source, &names).expect("Failed to link mock module")
}

/// A bridge computing on the host.
pub fn software_bridge() -> Bridge {
    Bridge::software(&runtime()).expect("Failed to create software bridge")
}

/// Decode a fixed-size hex field.
pub fn hex_array<const N: usize>(text: &str) -> [u8; N] {
    let bytes = hex::decode(text).expect("valid hex");
    bytes.try_into().expect("wrong length")
}
