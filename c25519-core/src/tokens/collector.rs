//! Placeholder harvesting from template and header sources.

use super::mapping::TokenMapping;
use super::value::TokenValue;
use crate::error::{C25519Error, Result};
use regex::Regex;

/// Placeholder pattern used by the templates and native headers.
pub const DEFAULT_PATTERN: &str = "__[A-Za-z0-9_]+?__";

/// Scans text sources for placeholder tokens and merges them into one
/// [`TokenMapping`].
///
/// Tokens found by scanning are given a generated compact identifier
/// (`e0`, `e1`, ...), in first-seen order. Seeded tokens keep their value.
#[derive(Debug, Clone)]
pub struct TokenCollector {
    pattern: Regex,
    mapping: TokenMapping,
    generated: usize,
}

impl TokenCollector {
    /// Create a collector for the given placeholder pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| C25519Error::TokenPattern {
            pattern: pattern.to_owned(),
            cause: e.to_string(),
        })?;

        Ok(Self {
            pattern,
            mapping: TokenMapping::new(),
            generated: 0,
        })
    }

    /// Create a collector for [`DEFAULT_PATTERN`].
    pub fn with_default_pattern() -> Result<Self> {
        Self::new(DEFAULT_PATTERN)
    }

    /// Pre-seed a token. Later scans never overwrite it.
    pub fn seed(mut self, name: impl Into<String>, value: TokenValue) -> Self {
        self.mapping.set(name, value);
        self
    }

    /// The compiled placeholder pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Distinct tokens referenced by `source`, in first-seen order.
    pub fn scan<'s>(&self, source: &'s str) -> Vec<&'s str> {
        scan_tokens(&self.pattern, source)
    }

    /// Record every token of `source`. Returns the number of new tokens.
    pub fn collect(&mut self, source: &str) -> usize {
        let mut added = 0;
        for token in scan_tokens(&self.pattern, source) {
            let generated = &mut self.generated;
            if self.mapping.insert_if_absent(token, || {
                let name = generated_name(*generated);
                *generated += 1;
                TokenValue::Identifier(name)
            }) {
                added += 1;
            }
        }

        tracing::trace!(added, total = self.mapping.len(), "collected tokens");
        added
    }

    /// The mapping harvested so far.
    pub fn mapping(&self) -> &TokenMapping {
        &self.mapping
    }

    /// Mutable access, used to resolve seeded tokens after compilation.
    pub fn mapping_mut(&mut self) -> &mut TokenMapping {
        &mut self.mapping
    }

    /// Consume the collector and return the mapping.
    pub fn into_mapping(self) -> TokenMapping {
        self.mapping
    }
}

/// Distinct matches of `pattern` in `source`, in first-seen order.
pub fn scan_tokens<'s>(pattern: &Regex, source: &'s str) -> Vec<&'s str> {
    let mut seen: Vec<&'s str> = Vec::new();
    for m in pattern.find_iter(source) {
        if !seen.contains(&m.as_str()) {
            seen.push(m.as_str());
        }
    }
    seen
}

/// Compact identifier for the `index`-th generated token.
fn generated_name(index: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = index;
    let mut digits = Vec::new();
    loop {
        digits.push(DIGITS[n % 36]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    let mut name = String::with_capacity(digits.len() + 1);
    name.push('e');
    name.extend(digits.into_iter().map(char::from));
    name
}
