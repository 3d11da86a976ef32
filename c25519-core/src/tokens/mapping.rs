//! Insertion-ordered token mapping.

use super::value::TokenValue;
use crate::error::{C25519Error, Result};
use indexmap::IndexMap;

/// Ordered mapping from placeholder name to its canonical value.
///
/// Iteration follows first insertion, so both export views list tokens in
/// the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMapping {
    entries: IndexMap<String, TokenValue>,
}

impl TokenMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known token, replacing any previous value.
    pub fn with_seed(mut self, name: impl Into<String>, value: TokenValue) -> Self {
        self.entries.insert(name.into(), value);
        self
    }

    /// Insert `name` only if it is not already known.
    ///
    /// Returns `true` if the token was new.
    pub fn insert_if_absent(&mut self, name: &str, value: impl FnOnce() -> TokenValue) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_owned(), value());
        true
    }

    /// Set the value of a token, keeping its original position.
    pub fn set(&mut self, name: impl Into<String>, value: TokenValue) {
        self.entries.insert(name.into(), value);
    }

    /// Get the value of a token.
    pub fn get(&self, name: &str) -> Option<&TokenValue> {
        self.entries.get(name)
    }

    /// Check whether a token is known.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tokens are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of tokens that still have no value.
    pub fn unresolved(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| !v.is_resolved())
            .map(|(k, _)| k)
            .collect()
    }

    /// Look up a token that a render step depends on.
    ///
    /// Fails if the token is unknown or still unresolved.
    pub fn resolve(&self, name: &str, artifact: &str) -> Result<&TokenValue> {
        match self.entries.get(name) {
            Some(value) if value.is_resolved() => Ok(value),
            _ => Err(C25519Error::UnresolvedToken {
                token: name.to_owned(),
                artifact: artifact.to_owned(),
            }),
        }
    }

    /// Compiler view: one `-DNAME=literal` argument per resolved token.
    pub fn compiler_defines(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(name, value)| {
                value
                    .compiler_literal()
                    .map(|lit| format!("-D{}={}", name, lit))
            })
            .collect()
    }

    /// Compactor view: token name to script literal, resolved tokens only.
    pub fn compactor_defines(&self) -> IndexMap<String, String> {
        self.iter()
            .filter_map(|(name, value)| {
                value
                    .compactor_literal()
                    .map(|lit| (name.to_owned(), lit))
            })
            .collect()
    }
}

impl FromIterator<(String, TokenValue)> for TokenMapping {
    fn from_iter<I: IntoIterator<Item = (String, TokenValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TokenMapping {
        TokenMapping::new()
            .with_seed("__WASM_BASE64__", TokenValue::Unresolved)
            .with_seed(
                "__WASMEXPORTS_edsign_sign__",
                TokenValue::Identifier("e0".to_string()),
            )
            .with_seed("__HEAP_BASE__", TokenValue::Integer(4096))
    }

    #[test]
    fn insert_if_absent_keeps_seed() {
        let mut mapping = sample();
        let inserted = mapping.insert_if_absent("__WASM_BASE64__", || {
            TokenValue::Identifier("x".to_string())
        });
        assert!(!inserted);
        assert_eq!(mapping.get("__WASM_BASE64__"), Some(&TokenValue::Unresolved));
    }

    #[test]
    fn set_keeps_position() {
        let mut mapping = sample();
        mapping.set("__WASM_BASE64__", TokenValue::Text("AGFzbQ".to_string()));
        let names: Vec<&str> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(names[0], "__WASM_BASE64__");
        assert!(mapping.unresolved().is_empty());
    }

    #[test]
    fn resolve_rejects_unresolved_and_unknown() {
        let mapping = sample();
        let err = mapping
            .resolve("__WASM_BASE64__", "speed/cjs")
            .expect_err("sentinel must not resolve");
        assert_eq!(err.code(), "E202");
        assert!(mapping.resolve("__NOPE__", "speed/cjs").is_err());
        assert!(mapping.resolve("__HEAP_BASE__", "speed/cjs").is_ok());
    }

    #[test]
    fn views_skip_unresolved_and_agree_on_names() {
        let mapping = sample();
        let defines = mapping.compiler_defines();
        assert_eq!(
            defines,
            vec![
                "-D__WASMEXPORTS_edsign_sign__=e0".to_string(),
                "-D__HEAP_BASE__=4096".to_string(),
            ]
        );

        let globals = mapping.compactor_defines();
        let names: Vec<&String> = globals.keys().collect();
        assert_eq!(names, vec!["__WASMEXPORTS_edsign_sign__", "__HEAP_BASE__"]);
        assert_eq!(globals["__WASMEXPORTS_edsign_sign__"], "\"e0\"");
    }
}
