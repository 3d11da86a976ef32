//! CLI command implementations.

pub mod build;
pub mod tokens;
pub mod version;
