//! The linear memory shared with the computation module.
//!
//! An [`Arena`] owns one Wasmtime store and the memory it links into the
//! module as `env.memory`. Memory below [`FREE_AREA`] is reserved for the
//! module's own stack; call data is staged at fixed offsets above it.

use c25519_core::error::{C25519Error, Result};
use wasmtime::{Global, GlobalType, Memory, MemoryType, Mutability, Store, Val, ValType};

use crate::runtime::WasmRuntime;

/// Host page size, the unit of arena growth.
pub const PAGE_SIZE: usize = 65536;

/// Initial value of the module's `__stack_pointer` global. The stack grows
/// downward from here.
pub const STACK_POINTER: u32 = 0x1000;

/// Base address of the staging area for call data.
pub const FREE_AREA: u32 = 0x1000;

/// Value of the module's `__memory_base` global.
pub const MEMORY_BASE: u32 = 0;

const _: () = assert!(FREE_AREA >= STACK_POINTER);

/// Growable linear memory plus the globals the module links against.
pub struct Arena {
    store: Store<()>,
    memory: Memory,
    memory_base: Global,
    stack_pointer: Global,
}

impl Arena {
    /// Create an arena of one page on `runtime`'s engine.
    ///
    /// Growth is bounded by the runtime's arena page limit.
    pub fn new(runtime: &WasmRuntime) -> Result<Self> {
        let max_pages = runtime.config().arena_page_limit();
        let mut store = Store::new(runtime.engine(), ());

        let memory = Memory::new(&mut store, MemoryType::new(0, Some(max_pages))).map_err(|e| {
            C25519Error::ArenaGrow {
                requested: 0,
                cause: e.to_string(),
            }
        })?;

        let memory_base = Global::new(
            &mut store,
            GlobalType::new(ValType::I32, Mutability::Const),
            Val::I32(MEMORY_BASE as i32),
        )
        .map_err(|e| C25519Error::ModuleLink {
            module: "env".to_string(),
            cause: e.to_string(),
        })?;

        let stack_pointer = Global::new(
            &mut store,
            GlobalType::new(ValType::I32, Mutability::Var),
            Val::I32(STACK_POINTER as i32),
        )
        .map_err(|e| C25519Error::ModuleLink {
            module: "env".to_string(),
            cause: e.to_string(),
        })?;

        let mut arena = Self {
            store,
            memory,
            memory_base,
            stack_pointer,
        };
        arena.ensure_capacity(1)?;
        Ok(arena)
    }

    /// Guarantee at least `size` bytes of memory.
    ///
    /// Grows by the fewest whole pages that cover the shortfall. Never
    /// shrinks, and does nothing when the arena is already large enough.
    pub fn ensure_capacity(&mut self, size: usize) -> Result<()> {
        let len = self.capacity();
        if size <= len {
            return Ok(());
        }

        let pages = (size - len).div_ceil(PAGE_SIZE) as u64;
        self.memory
            .grow(&mut self.store, pages)
            .map_err(|e| C25519Error::ArenaGrow {
                requested: size as u64,
                cause: e.to_string(),
            })?;

        tracing::debug!(
            from = len,
            to = self.capacity(),
            pages,
            "arena grown"
        );
        Ok(())
    }

    /// Copy `bytes` into the arena at `offset`.
    ///
    /// The range must already be within capacity.
    pub fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        let capacity = self.capacity();
        let start = offset as usize;
        let dest = self
            .memory
            .data_mut(&mut self.store)
            .get_mut(start..start + bytes.len())
            .ok_or(C25519Error::ArenaBounds {
                offset,
                len: bytes.len(),
                capacity,
            })?;
        dest.copy_from_slice(bytes);
        Ok(())
    }

    /// Copy `len` bytes out of the arena at `offset`.
    ///
    /// The result is an owned copy, unaffected by later writes.
    pub fn read(&self, offset: u32, len: usize) -> Result<Vec<u8>> {
        Ok(self.slice(offset, len)?.to_vec())
    }

    /// Copy a fixed-size field out of the arena at `offset`.
    pub fn read_array<const N: usize>(&self, offset: u32) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(offset, N)?);
        Ok(out)
    }

    /// Current size in bytes.
    pub fn capacity(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    /// Current size in pages.
    pub fn pages(&self) -> u64 {
        self.memory.size(&self.store)
    }

    /// Current value of the module's stack pointer global.
    pub fn stack_pointer(&mut self) -> Option<i32> {
        self.stack_pointer.get(&mut self.store).i32()
    }

    pub(crate) fn memory(&self) -> Memory {
        self.memory
    }

    pub(crate) fn memory_base(&self) -> Global {
        self.memory_base
    }

    pub(crate) fn stack_pointer_global(&self) -> Global {
        self.stack_pointer
    }

    pub(crate) fn store(&self) -> &Store<()> {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store<()> {
        &mut self.store
    }

    fn slice(&self, offset: u32, len: usize) -> Result<&[u8]> {
        let start = offset as usize;
        self.memory
            .data(&self.store)
            .get(start..start + len)
            .ok_or(C25519Error::ArenaBounds {
                offset,
                len,
                capacity: self.capacity(),
            })
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RuntimeConfig;

    fn arena() -> Arena {
        let runtime = WasmRuntime::new(RuntimeConfig::testing()).expect("runtime");
        Arena::new(&runtime).expect("arena")
    }

    #[test]
    fn starts_with_one_page() {
        let arena = arena();
        assert_eq!(arena.capacity(), PAGE_SIZE);
        assert_eq!(arena.pages(), 1);
    }

    #[test]
    fn ensure_capacity_is_idempotent_when_sufficient() {
        let mut arena = arena();
        arena.ensure_capacity(PAGE_SIZE).expect("no-op");
        arena.ensure_capacity(10).expect("no-op");
        assert_eq!(arena.pages(), 1);
    }

    #[test]
    fn ensure_capacity_grows_by_minimal_pages() {
        let mut arena = arena();
        arena.ensure_capacity(PAGE_SIZE + 1).expect("grow");
        assert_eq!(arena.pages(), 2);

        arena.ensure_capacity(5 * PAGE_SIZE).expect("grow");
        assert_eq!(arena.pages(), 5);

        arena.ensure_capacity(PAGE_SIZE).expect("never shrinks");
        assert_eq!(arena.capacity(), 5 * PAGE_SIZE);
    }

    #[test]
    fn growth_past_limit_fails() {
        let runtime = WasmRuntime::new(RuntimeConfig::testing().with_max_arena_pages(2))
            .expect("runtime");
        let mut arena = Arena::new(&runtime).expect("arena");
        let err = arena
            .ensure_capacity(3 * PAGE_SIZE)
            .expect_err("limit must hold");
        assert_eq!(err.code(), "E001");
        assert_eq!(arena.pages(), 1);
    }

    #[test]
    fn default_runtime_grows_past_64_mib() {
        let runtime = WasmRuntime::with_defaults().expect("runtime");
        let mut arena = Arena::new(&runtime).expect("arena");
        arena.ensure_capacity((65 << 20) + 1).expect("grow");
        assert_eq!(arena.pages(), 1041);
    }

    #[test]
    fn read_returns_a_copy() {
        let mut arena = arena();
        arena.write(FREE_AREA, &[1, 2, 3, 4]).expect("write");
        let first = arena.read(FREE_AREA, 4).expect("read");
        arena.write(FREE_AREA, &[9, 9, 9, 9]).expect("write");
        assert_eq!(first, vec![1, 2, 3, 4]);
        assert_eq!(arena.read_array::<4>(FREE_AREA).expect("read"), [9, 9, 9, 9]);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let mut arena = arena();
        let err = arena
            .write((PAGE_SIZE - 2) as u32, &[0; 4])
            .expect_err("past the end");
        assert_eq!(err.code(), "E002");
        assert!(arena.read(PAGE_SIZE as u32, 1).is_err());
    }

    #[test]
    fn stack_pointer_is_initialised() {
        let mut arena = arena();
        assert_eq!(arena.stack_pointer(), Some(STACK_POINTER as i32));
    }
}
