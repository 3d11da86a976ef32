//! Per-profile token manifest written next to each binary module.

use super::mapping::TokenMapping;
use super::value::TokenValue;
use crate::error::{C25519Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolved tokens of one profile build, as stored on disk.
///
/// Hosts read this to find the renamed export symbols of the module built
/// alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenManifest {
    /// Profile the module was built with.
    pub profile: String,
    /// Token name to canonical value.
    pub tokens: IndexMap<String, TokenValue>,
}

impl TokenManifest {
    /// Capture the resolved tokens of `mapping`, leaving out `exclude`.
    pub fn from_mapping(profile: impl Into<String>, mapping: &TokenMapping, exclude: &[&str]) -> Self {
        let tokens = mapping
            .iter()
            .filter(|(name, value)| value.is_resolved() && !exclude.contains(name))
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();

        Self {
            profile: profile.into(),
            tokens,
        }
    }

    /// Get a token value.
    pub fn get(&self, name: &str) -> Option<&TokenValue> {
        self.tokens.get(name)
    }

    /// Rebuild a mapping from the manifest.
    pub fn to_mapping(&self) -> TokenMapping {
        self.tokens
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| C25519Error::TokenManifest {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }

    /// Read a manifest from `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| C25519Error::TokenManifest {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| C25519Error::TokenManifest {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> TokenMapping {
        TokenMapping::new()
            .with_seed("__WASM_BASE64__", TokenValue::Text("AGFzbQ".to_string()))
            .with_seed(
                "__WASMEXPORTS_c25519_smult__",
                TokenValue::Identifier("e0".to_string()),
            )
            .with_seed("__LATER__", TokenValue::Unresolved)
    }

    #[test]
    fn excludes_payload_and_unresolved() {
        let manifest = TokenManifest::from_mapping("speed", &mapping(), &["__WASM_BASE64__"]);
        assert_eq!(manifest.tokens.len(), 1);
        assert_eq!(
            manifest.get("__WASMEXPORTS_c25519_smult__"),
            Some(&TokenValue::Identifier("e0".to_string()))
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("c25519.speed.tokens.json");
        let manifest = TokenManifest::from_mapping("speed", &mapping(), &["__WASM_BASE64__"]);
        manifest.write(&path).expect("write");

        let loaded = TokenManifest::read(&path).expect("read");
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.to_mapping().len(), 1);
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        let err = TokenManifest::read(&path).expect_err("must fail");
        assert_eq!(err.code(), "E203");
    }
}
