//! Placeholder tokens shared by the native build and the script renderings.
//!
//! A single [`TokenMapping`] holds one canonical [`TokenValue`] per token.
//! The compiler and the compactor each read it through their own view
//! ([`TokenMapping::compiler_defines`], [`TokenMapping::compactor_defines`]),
//! so the two can never disagree on which tokens exist.

mod collector;
mod manifest;
mod mapping;
mod substitute;
mod value;

pub use collector::{DEFAULT_PATTERN, TokenCollector, scan_tokens};
pub use manifest::TokenManifest;
pub use mapping::TokenMapping;
pub use substitute::{ensure_resolved, substitute, surviving_tokens};
pub use value::TokenValue;
