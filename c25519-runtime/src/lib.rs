//! # c25519-runtime
//!
//! Hosts the compiled c25519 computation module and exposes its primitives.
//!
//! # Architecture
//!
//! - **WasmRuntime**: Wasmtime engine and module cache
//! - **Arena**: the growable linear memory linked into the module
//! - **Exports**: the native entry points, backed by the module
//!   ([`WasmExports`]) or computed on the host ([`SoftwareExports`])
//! - **Bridge**: the facade with the [`X25519`] and [`Ed25519`] groups
//! - **Readiness**: one-shot signal for background linking
//!
//! # Memory Layout
//!
//! | Range | Use |
//! |:------|:----|
//! | `0x0000..0x1000` | module stack, growing down from `__stack_pointer` |
//! | `0x1000..` | call frames, fixed per primitive |
//! | past the frame | message bodies, arena grows to fit |
//!
//! # Example
//!
//! ```ignore
//! use c25519_runtime::{Bridge, ExportNames, ModuleSource, WasmRuntime};
//! use std::sync::Arc;
//!
//! let runtime = Arc::new(WasmRuntime::with_defaults()?);
//! let linking = Bridge::spawn_link(
//!     runtime,
//!     ModuleSource::file("dist/c25519.speed.wasm"),
//!     ExportNames::default(),
//! );
//! linking.readiness().ready().await?;
//!
//! let mut bridge = linking.finish().await?;
//! let public = bridge.ed25519().get_public(&private_key)?;
//! let signature = bridge.ed25519().sign(b"message", &private_key)?;
//! ```

#![warn(missing_docs)]

mod arena;
mod bridge;
mod exports;
pub mod frame;
mod link;
mod readiness;
mod runtime;
mod software;
mod source;

pub use arena::{Arena, FREE_AREA, MEMORY_BASE, PAGE_SIZE, STACK_POINTER};
pub use bridge::{Bridge, Ed25519, X25519};
pub use exports::{ExportNames, Exports, WasmExports};
pub use link::{IMPORT_MODULE, create_linker, instantiate};
pub use readiness::{LinkState, Linking, Readiness};
pub use runtime::{RuntimeConfig, WASM32_MAX_PAGES, WasmRuntime};
pub use software::SoftwareExports;
pub use source::{ModuleSource, PAYLOAD_ENGINE};
