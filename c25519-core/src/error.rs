//! Error types for the c25519 bridge.
//!
//! Every variant carries a stable code in its message so that failures
//! surfaced by the build or by a host embedding the runtime can be matched
//! without parsing free text.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for c25519 operations.
#[derive(Error, Debug)]
pub enum C25519Error {
    // =========================================================================
    // Arena Errors (E001-E099)
    // =========================================================================
    /// The linear memory could not be grown to the requested size.
    #[error("E001: Arena growth to {requested} bytes failed: {cause}")]
    ArenaGrow {
        /// Total number of bytes that were requested.
        requested: u64,
        /// Reason reported by the engine.
        cause: String,
    },

    /// An access fell outside the current arena capacity.
    #[error("E002: Arena access out of bounds: offset={offset}, len={len}, capacity={capacity}")]
    ArenaBounds {
        /// Start offset of the access.
        offset: u32,
        /// Number of bytes accessed.
        len: usize,
        /// Arena capacity at the time of the access.
        capacity: usize,
    },

    /// A message is too large to be addressed by a 32-bit module.
    #[error("E003: Message of {len} bytes exceeds the addressable arena")]
    MessageTooLarge {
        /// Length of the rejected message.
        len: usize,
    },

    // =========================================================================
    // Module Errors (E100-E199)
    // =========================================================================
    /// The binary module could not be decoded or compiled.
    #[error("E101: Failed to load module '{module}': {cause}")]
    ModuleLoad {
        /// Name of the module.
        module: String,
        /// Reason for the load failure.
        cause: String,
    },

    /// Instantiation against the arena failed.
    #[error("E102: Failed to link module '{module}': {cause}")]
    ModuleLink {
        /// Name of the module.
        module: String,
        /// Reason for the link failure.
        cause: String,
    },

    /// A required export is missing or has the wrong signature.
    #[error("E103: Module does not export '{name}': {cause}")]
    MissingExport {
        /// Export symbol that was looked up.
        name: String,
        /// Reason reported by the engine.
        cause: String,
    },

    /// A native export trapped.
    #[error("E104: Export '{name}' trapped: {cause}")]
    ExportTrap {
        /// Export symbol that was called.
        name: String,
        /// Trap description.
        cause: String,
    },

    /// The background linking task ended without producing a module.
    #[error("E105: Linking did not complete: {cause}")]
    LinkAborted {
        /// Reason the task ended.
        cause: String,
    },

    // =========================================================================
    // Token Errors (E200-E299)
    // =========================================================================
    /// The placeholder pattern is not a valid regular expression.
    #[error("E201: Invalid token pattern '{pattern}': {cause}")]
    TokenPattern {
        /// The rejected pattern.
        pattern: String,
        /// Regex compiler message.
        cause: String,
    },

    /// A render step referenced a token that has no resolved value.
    #[error("E202: Unresolved token '{token}' in {artifact}")]
    UnresolvedToken {
        /// The placeholder name.
        token: String,
        /// Artifact being rendered.
        artifact: String,
    },

    /// A token manifest could not be read or written.
    #[error("E203: Invalid token manifest at {path}: {cause}")]
    TokenManifest {
        /// Manifest location.
        path: PathBuf,
        /// Reason for the failure.
        cause: String,
    },

    // =========================================================================
    // Build Errors (E300-E399)
    // =========================================================================
    /// The native compiler failed for a profile.
    #[error("E301: Native compilation failed for profile '{profile}': {cause}")]
    Compile {
        /// Optimization profile being built.
        profile: String,
        /// Compiler diagnostics or spawn failure.
        cause: String,
    },

    /// The compactor failed for a variant.
    #[error("E302: Compaction failed for {variant}: {cause}")]
    Compact {
        /// Variant being rendered.
        variant: String,
        /// Compactor diagnostics or spawn failure.
        cause: String,
    },

    /// An external tool could not be started.
    #[error("E303: Missing binary '{binary}': {cause}")]
    MissingBinary {
        /// Program name.
        binary: String,
        /// Reason the spawn failed.
        cause: String,
    },

    /// The build configuration is invalid.
    #[error("E304: Invalid build configuration: {cause}")]
    Config {
        /// Description of the problem.
        cause: String,
    },

    /// Template wrapping failed for a variant.
    #[error("E305: Rendering failed for {variant}: {cause}")]
    Render {
        /// Variant being rendered.
        variant: String,
        /// Description of the problem.
        cause: String,
    },

    // =========================================================================
    // I/O Errors (E900-E999)
    // =========================================================================
    /// File I/O error.
    #[error("E901: I/O error at {path}: {cause}")]
    Io {
        /// The path where the I/O error occurred.
        path: PathBuf,
        /// Description of the I/O error.
        cause: String,
    },

    /// Serialization or deserialization error.
    #[error("E902: Serialization error: {0}")]
    Serialization(String),
}

impl C25519Error {
    /// Stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArenaGrow { .. } => "E001",
            Self::ArenaBounds { .. } => "E002",
            Self::MessageTooLarge { .. } => "E003",
            Self::ModuleLoad { .. } => "E101",
            Self::ModuleLink { .. } => "E102",
            Self::MissingExport { .. } => "E103",
            Self::ExportTrap { .. } => "E104",
            Self::LinkAborted { .. } => "E105",
            Self::TokenPattern { .. } => "E201",
            Self::UnresolvedToken { .. } => "E202",
            Self::TokenManifest { .. } => "E203",
            Self::Compile { .. } => "E301",
            Self::Compact { .. } => "E302",
            Self::MissingBinary { .. } => "E303",
            Self::Config { .. } => "E304",
            Self::Render { .. } => "E305",
            Self::Io { .. } => "E901",
            Self::Serialization(_) => "E902",
        }
    }

    /// Whether this error is a build-time defect that must abort the
    /// affected artifact set.
    #[must_use]
    pub fn is_build_defect(&self) -> bool {
        matches!(
            self,
            Self::TokenPattern { .. }
                | Self::UnresolvedToken { .. }
                | Self::Compile { .. }
                | Self::Compact { .. }
                | Self::MissingBinary { .. }
                | Self::Config { .. }
                | Self::Render { .. }
        )
    }

    /// Build an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            cause: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for C25519Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for c25519 operations.
pub type Result<T> = std::result::Result<T, C25519Error>;
