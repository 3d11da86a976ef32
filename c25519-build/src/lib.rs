//! Multi-variant build for the c25519 bridge.
//!
//! Renders one script template into every (profile, loading convention)
//! combination: each profile compiles its own binary module, whose bytes are
//! embedded into a readable and a compacted rendering per convention.
//!
//! ```ignore
//! use c25519_build::{BuildConfig, BuildPipeline};
//!
//! let config = BuildConfig::load(root, None)?;
//! let report = BuildPipeline::from_config(config).run().await?;
//! for path in report.artifacts() {
//!     println!("{}", path.display());
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod observability;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod toolchain;

pub use config::{BuildConfig, CONFIG_FILE, CompactorConfig, CompilerConfig, DeclarationCopy};
pub use pipeline::BuildPipeline;
pub use report::{BuildReport, ProfileArtifacts, ProfileReport, RenderingReport, VariantReport};
pub use toolchain::{CompactRequest, Compactor, CompileRequest, Compiler, Emcc, Terser, ToolFuture};
