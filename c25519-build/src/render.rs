//! Wrapping the template into a loading-convention wrapper.

use c25519_core::error::{C25519Error, Result};
use c25519_core::variant::Variant;

/// Marker in every wrapper that the template replaces.
pub const TEMPLATE_MARKER: &str = "/** TEMPLATE **/";

/// Insert `template` at every [`TEMPLATE_MARKER`] of `wrapper`.
pub fn wrap(wrapper: &str, template: &str, variant: &Variant) -> Result<String> {
    if !wrapper.contains(TEMPLATE_MARKER) {
        return Err(C25519Error::Render {
            variant: variant.to_string(),
            cause: format!("wrapper has no '{}' marker", TEMPLATE_MARKER),
        });
    }
    Ok(wrapper.replace(TEMPLATE_MARKER, template))
}
