//! Placeholder substitution for renderings.

use super::collector::scan_tokens;
use super::mapping::TokenMapping;
use crate::error::{C25519Error, Result};
use regex::{Captures, Regex};

/// Replace every placeholder in `source` with its compactor literal.
///
/// All placeholders are checked before any text is produced, so a missing or
/// unresolved token never leaks into a partially rendered artifact.
pub fn substitute(
    pattern: &Regex,
    source: &str,
    mapping: &TokenMapping,
    artifact: &str,
) -> Result<String> {
    for token in scan_tokens(pattern, source) {
        mapping.resolve(token, artifact)?;
    }

    let rendered = pattern.replace_all(source, |caps: &Captures<'_>| {
        let token = &caps[0];
        mapping
            .get(token)
            .and_then(|value| value.compactor_literal())
            .unwrap_or_else(|| token.to_owned())
    });

    Ok(rendered.into_owned())
}

/// Known placeholders that still occur in `text`.
pub fn surviving_tokens<'m>(mapping: &'m TokenMapping, text: &str) -> Vec<&'m str> {
    mapping
        .iter()
        .map(|(name, _)| name)
        .filter(|name| text.contains(name))
        .collect()
}

/// Fail if any known placeholder survived into a finished artifact.
pub fn ensure_resolved(mapping: &TokenMapping, text: &str, artifact: &str) -> Result<()> {
    match surviving_tokens(mapping, text).first() {
        Some(token) => Err(C25519Error::UnresolvedToken {
            token: (*token).to_owned(),
            artifact: artifact.to_owned(),
        }),
        None => Ok(()),
    }
}
