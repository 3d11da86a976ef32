//! The Wasmtime engine shared by every arena, and its module cache.

use c25519_core::error::{C25519Error, Result};
use dashmap::DashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use wasmtime::{Config, Engine, Module, Strategy};

/// Page count of a 4 GiB wasm32 linear memory.
pub const WASM32_MAX_PAGES: u32 = 65536;

/// Settings for a [`WasmRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Largest size any arena may grow to, in pages. `None` allows the
    /// full 32-bit address space of [`WASM32_MAX_PAGES`].
    pub max_arena_pages: Option<u32>,
    /// Reuse compilations of identical module bytes.
    pub cache_modules: bool,
    /// Keep DWARF info for debugging the module.
    pub debug_info: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl RuntimeConfig {
    /// Arenas limited only by the address space, cached compilations.
    pub fn production() -> Self {
        Self {
            max_arena_pages: None,
            cache_modules: true,
            debug_info: false,
        }
    }

    /// 16 MiB arenas, no cache, debug info.
    pub fn testing() -> Self {
        Self {
            max_arena_pages: Some(256),
            cache_modules: false,
            debug_info: true,
        }
    }

    /// Bound arena growth to `pages`.
    pub fn with_max_arena_pages(mut self, pages: u32) -> Self {
        self.max_arena_pages = Some(pages.min(WASM32_MAX_PAGES));
        self
    }

    /// Turn the module cache on or off.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_modules = enabled;
        self
    }

    /// Effective page limit of every arena.
    pub fn arena_page_limit(&self) -> u32 {
        self.max_arena_pages.unwrap_or(WASM32_MAX_PAGES)
    }

    /// Largest arena size in bytes.
    pub fn max_arena_bytes(&self) -> u64 {
        u64::from(self.arena_page_limit()) * crate::arena::PAGE_SIZE as u64
    }
}

/// Cache key: length plus a hash of the module bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ModuleKey {
    len: usize,
    digest: u64,
}

impl ModuleKey {
    fn of(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            len: bytes.len(),
            digest: hasher.finish(),
        }
    }
}

/// Owns the engine that compiles the computation module.
///
/// One runtime can back any number of independent arenas; each
/// [`crate::Bridge`] gets its own store.
pub struct WasmRuntime {
    engine: Engine,
    config: RuntimeConfig,
    modules: DashMap<ModuleKey, Module>,
}

impl WasmRuntime {
    /// Create a runtime.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let mut wasmtime_config = Config::new();
        wasmtime_config
            .strategy(Strategy::Cranelift)
            .debug_info(config.debug_info);

        let engine = Engine::new(&wasmtime_config).map_err(|e| C25519Error::ModuleLoad {
            module: "<engine>".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self {
            engine,
            config,
            modules: DashMap::new(),
        })
    }

    /// Create a runtime with [`RuntimeConfig::production`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(RuntimeConfig::default())
    }

    /// The engine every arena store is created on.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Active settings.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Compile the module `bytes`, named `name` in errors and logs.
    pub fn compile(&self, name: &str, bytes: &[u8]) -> Result<Module> {
        let key = ModuleKey::of(bytes);
        if self.config.cache_modules {
            if let Some(module) = self.modules.get(&key) {
                tracing::trace!(module = name, "reusing compiled module");
                return Ok(module.clone());
            }
        }

        let module = Module::new(&self.engine, bytes).map_err(|e| C25519Error::ModuleLoad {
            module: name.to_string(),
            cause: e.to_string(),
        })?;
        tracing::debug!(module = name, bytes = bytes.len(), "module compiled");

        if self.config.cache_modules {
            self.modules.insert(key, module.clone());
        }
        Ok(module)
    }

    /// Number of cached compilations.
    pub fn cached_modules(&self) -> usize {
        self.modules.len()
    }
}
