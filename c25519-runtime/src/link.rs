//! Linking the computation module against an arena.
//!
//! The module is built as a standalone side module and imports:
//!
//! ```text
//! env.memory           : Memory   // the arena
//! env.__memory_base    : i32      // constant 0
//! env.__stack_pointer  : mut i32  // 0x1000, stack grows down
//! ```

use crate::arena::{Arena, PAGE_SIZE};
use c25519_core::error::{C25519Error, Result};
use wasmtime::{ExternType, Instance, Linker, Module};

/// Namespace of every import the module expects.
pub const IMPORT_MODULE: &str = "env";

/// Create a linker exposing the arena's memory and globals under `env`.
pub fn create_linker(arena: &Arena) -> Result<Linker<()>> {
    let mut linker = Linker::new(arena.store().engine());
    let define_err = |e: wasmtime::Error| C25519Error::ModuleLink {
        module: IMPORT_MODULE.to_string(),
        cause: e.to_string(),
    };

    linker
        .define(arena.store(), IMPORT_MODULE, "memory", arena.memory())
        .map_err(define_err)?;
    linker
        .define(arena.store(), IMPORT_MODULE, "__memory_base", arena.memory_base())
        .map_err(define_err)?;
    linker
        .define(
            arena.store(),
            IMPORT_MODULE,
            "__stack_pointer",
            arena.stack_pointer_global(),
        )
        .map_err(define_err)?;

    Ok(linker)
}

/// Instantiate `module` against `arena`.
///
/// The arena is first grown to the minimum size the module declares for its
/// imported memory.
pub fn instantiate(arena: &mut Arena, name: &str, module: &Module) -> Result<Instance> {
    for import in module.imports() {
        if let ExternType::Memory(memory) = import.ty() {
            let minimum = memory.minimum() as usize * PAGE_SIZE;
            arena.ensure_capacity(minimum)?;
        }
    }

    let linker = create_linker(arena)?;
    let instance = linker
        .instantiate(arena.store_mut(), module)
        .map_err(|e| C25519Error::ModuleLink {
            module: name.to_string(),
            cause: e.to_string(),
        })?;

    tracing::debug!(module = name, capacity = arena.capacity(), "module linked");
    Ok(instance)
}
