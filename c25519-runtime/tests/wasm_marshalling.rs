//! Integration tests for marshalling through a linked module.
//!
//! The mock module in `common` imports the same `env` symbols as the real
//! build output, so these tests exercise linking, frame offsets, argument
//! order and arena growth without the native toolchain.

mod common;

use c25519_runtime::{
    Arena, Bridge, ExportNames, FREE_AREA, ModuleSource, PAGE_SIZE, STACK_POINTER, WasmRuntime,
    instantiate,
};
use common::{mock_bridge, mock_module, runtime};

fn key(byte: u8) -> [u8; 32] {
    [byte; 32]
}

#[test]
fn link_mock_module() {
    let bridge = mock_bridge();
    assert_eq!(bridge.backend(), "wasm");
    assert_eq!(bridge.arena().capacity(), PAGE_SIZE);
}

#[test]
fn link_exposes_env_globals() {
    let runtime = runtime();
    let bytes = mock_module(&ExportNames::default());
    let module = runtime.compile("mock", &bytes).expect("compile");
    let mut arena = Arena::new(&runtime).expect("arena");

    // The mock imports `__memory_base` as immutable and `__stack_pointer`
    // as mutable; a type mismatch would fail here.
    instantiate(&mut arena, "mock", &module).expect("link");
    assert_eq!(arena.stack_pointer(), Some(STACK_POINTER as i32));
}

#[test]
fn x25519_get_public_uses_derive_frame() {
    let mut bridge = mock_bridge();
    let public = bridge.x25519().get_public(&key(0x0F)).expect("derive");
    assert_eq!(public, key(0x0F ^ 0x55));
}

#[test]
fn ed25519_get_public_is_a_different_export() {
    let mut bridge = mock_bridge();
    let montgomery = bridge.x25519().get_public(&key(0x0F)).expect("derive");
    let edwards = bridge.ed25519().get_public(&key(0x0F)).expect("derive");
    assert_eq!(edwards, key(0x0F ^ 0xAA));
    assert_ne!(montgomery, edwards);
}

#[test]
fn get_shared_passes_private_then_public() {
    let mut bridge = mock_bridge();
    let shared = bridge
        .x25519()
        .get_shared(&key(0x02), &key(0x01))
        .expect("shared");
    // (public ^ 0x55) + private; swapped offsets would give 0x58.
    assert_eq!(shared, key(0x56));
}

#[test]
fn get_shared_is_symmetric() {
    let mut bridge = mock_bridge();
    let (sk_a, sk_b) = (key(0x11), key(0x7C));
    let pk_a = bridge.x25519().get_public(&sk_a).expect("derive");
    let pk_b = bridge.x25519().get_public(&sk_b).expect("derive");

    let ab = bridge.x25519().get_shared(&sk_a, &pk_b).expect("shared");
    let ba = bridge.x25519().get_shared(&sk_b, &pk_a).expect("shared");
    assert_eq!(ab, ba);
}

#[test]
fn sign_derives_public_key_in_place() {
    let mut bridge = mock_bridge();
    let sk = key(0x21);
    let sig = bridge.ed25519().sign(b"abc", &sk).expect("sign");

    // sig[0..32] = edwards_public(sk) ^ sk = 0xAA
    assert_eq!(&sig[..32], &[0xAA; 32]);
    assert_eq!(u32::from_le_bytes(sig[32..36].try_into().expect("4 bytes")), 3);
    let sum = u32::from(b'a') + u32::from(b'b') + u32::from(b'c');
    assert_eq!(u32::from_le_bytes(sig[36..40].try_into().expect("4 bytes")), sum);
    assert_eq!(&sig[40..], &[0u8; 24]);
}

#[test]
fn sign_then_verify() {
    let mut bridge = mock_bridge();
    let sk = key(0x42);
    let pk = bridge.ed25519().get_public(&sk).expect("derive");
    let sig = bridge.ed25519().sign(b"hello", &sk).expect("sign");

    assert!(bridge.ed25519().verify(b"hello", &sig, &pk).expect("verify"));
    assert!(!bridge.ed25519().verify(b"hellp", &sig, &pk).expect("verify"));
    assert!(!bridge.ed25519().verify(b"hell", &sig, &pk).expect("verify"));
}

#[test]
fn stack_pointer_is_restored_after_sign() {
    let mut bridge = mock_bridge();
    bridge.ed25519().sign(b"x", &key(1)).expect("sign");
    assert_eq!(bridge.arena_mut().stack_pointer(), Some(STACK_POINTER as i32));
}

#[test]
fn large_messages_grow_the_arena() {
    let mut bridge = mock_bridge();
    let sk = key(0x33);
    let pk = bridge.ed25519().get_public(&sk).expect("derive");

    let message = vec![0x5Au8; 300 * 1024];
    let sig = bridge.ed25519().sign(&message, &sk).expect("sign");
    assert!(bridge.arena().capacity() >= FREE_AREA as usize + 128 + message.len());
    assert!(bridge.arena().capacity() % PAGE_SIZE == 0);
    assert!(bridge.ed25519().verify(&message, &sig, &pk).expect("verify"));

    let grown = bridge.arena().capacity();
    let small = bridge.ed25519().sign(b"short", &sk).expect("sign");
    assert_eq!(bridge.arena().capacity(), grown);
    assert!(bridge.ed25519().verify(b"short", &small, &pk).expect("verify"));
}

#[test]
fn renamed_exports_link_through_names() {
    let names = ExportNames {
        scalar_base_mult: "e0".to_string(),
        scalar_mult: "e1".to_string(),
        edwards_public: "e2".to_string(),
        sign: "e3".to_string(),
        verify: "e4".to_string(),
    };
    let source = ModuleSource::bytes("renamed", mock_module(&names));

    let mut bridge = Bridge::link(&runtime(), &source, &names).expect("link");
    assert_eq!(bridge.x25519().get_public(&key(0)).expect("derive"), key(0x55));

    let err = Bridge::link(&runtime(), &source, &ExportNames::default())
        .expect_err("plain names are not exported");
    assert_eq!(err.code(), "E103");
}

#[test]
fn module_needing_more_memory_is_grown_at_link() {
    let wat = r#"
        (module
          (import "env" "memory" (memory 4))
          (import "env" "__memory_base" (global i32))
          (import "env" "__stack_pointer" (global (mut i32))))
    "#;
    let bytes = wat::parse_str(wat).expect("Failed to parse WAT");
    let runtime = WasmRuntime::with_defaults().expect("runtime");
    let module = runtime.compile("big", &bytes).expect("compile");
    let mut arena = Arena::new(&runtime).expect("arena");
    instantiate(&mut arena, "big", &module).expect("link");
    assert_eq!(arena.pages(), 4);
}

#[test]
fn module_with_unknown_import_fails_to_link() {
    let wat = r#"
        (module
          (import "env" "memory" (memory 1))
          (import "env" "emscripten_notify_memory_growth" (func (param i32))))
    "#;
    let source = ModuleSource::bytes("foreign", wat::parse_str(wat).expect("WAT"));
    let err = Bridge::link(&runtime(), &source, &ExportNames::default()).expect_err("must fail");
    assert_eq!(err.code(), "E102");
}

#[test]
fn independent_bridges_do_not_share_memory() {
    let mut a = mock_bridge();
    let mut b = mock_bridge();
    a.ed25519().sign(&vec![0u8; 200_000], &key(1)).expect("sign");
    assert!(a.arena().capacity() > b.arena().capacity());
    assert_eq!(b.x25519().get_public(&key(0)).expect("derive"), key(0x55));
}
