//! Where the binary module comes from.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use c25519_core::error::{C25519Error, Result};
use std::path::PathBuf;

/// Payload codec: standard alphabet, emitted without padding, padding
/// accepted on input.
pub const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A binary computation module to link.
#[derive(Debug, Clone)]
pub enum ModuleSource {
    /// Module bytes already in memory.
    Bytes {
        /// Name used in diagnostics.
        name: String,
        /// Raw module bytes.
        bytes: Vec<u8>,
    },
    /// A module file on disk.
    File(PathBuf),
    /// Base-64 text, as embedded in the script renderings.
    Base64 {
        /// Name used in diagnostics.
        name: String,
        /// Encoded module.
        text: String,
    },
}

impl ModuleSource {
    /// Module from raw bytes.
    pub fn bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Module from a file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Module from base-64 text, with or without padding.
    pub fn base64(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Base64 {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Self::Bytes { name, .. } | Self::Base64 { name, .. } => name.clone(),
            Self::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    /// Load the module bytes.
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes { bytes, .. } => Ok(bytes.clone()),
            Self::File(path) => std::fs::read(path).map_err(|e| C25519Error::ModuleLoad {
                module: self.name(),
                cause: e.to_string(),
            }),
            Self::Base64 { name, text } => {
                PAYLOAD_ENGINE
                    .decode(text.trim())
                    .map_err(|e| C25519Error::ModuleLoad {
                        module: name.clone(),
                        cause: e.to_string(),
                    })
            }
        }
    }
}
