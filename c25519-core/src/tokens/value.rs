//! Canonical token values and their two literal encodings.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The resolved value of a placeholder token.
///
/// One canonical value is stored per token; the native compiler and the
/// compactor each get their own encoding of it through
/// [`TokenValue::compiler_literal`] and [`TokenValue::compactor_literal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TokenValue {
    /// Known token without a value yet.
    Unresolved,
    /// A symbol name, emitted bare for the compiler and quoted for the compactor.
    Identifier(String),
    /// Arbitrary text, emitted as a string literal for both consumers.
    Text(String),
    /// An integer constant.
    Integer(i64),
}

impl TokenValue {
    /// Whether the token has a usable value.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Encode the value for a preprocessor definition (`-DNAME=<literal>`).
    pub fn compiler_literal(&self) -> Option<String> {
        match self {
            Self::Unresolved => None,
            Self::Identifier(name) => Some(name.clone()),
            Self::Text(text) => Some(c_string_literal(text)),
            Self::Integer(n) => Some(n.to_string()),
        }
    }

    /// Encode the value as a script literal for global-constant substitution.
    pub fn compactor_literal(&self) -> Option<String> {
        match self {
            Self::Unresolved => None,
            Self::Identifier(name) => Some(js_string_literal(name)),
            Self::Text(text) => Some(js_string_literal(text)),
            Self::Integer(n) => Some(n.to_string()),
        }
    }
}

fn c_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            // Octal escapes never swallow following hex digits.
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push('"');
    out
}

fn js_string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_owned()).to_string()
}
