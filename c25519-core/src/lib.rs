//! # c25519-core
//!
//! Shared types for the c25519 bridge: the error taxonomy, fixed key sizes,
//! build variants, and the placeholder token machinery used by the build.
//!
//! ## Modules
//!
//! - [`error`]: Error types with stable codes
//! - [`types`]: Key sizes and arena slots
//! - [`variant`]: Optimization profiles and loading conventions
//! - [`tokens`]: Token collection, mapping, substitution and manifests

#![warn(missing_docs)]

pub mod error;
pub mod tokens;
pub mod types;
pub mod variant;

pub use error::{C25519Error, Result};
pub use types::{
    PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, PrivateKey, PublicKey, SHARED_SECRET_SIZE, SIGNATURE_SIZE,
    SharedSecret, Signature, Slot,
};
pub use variant::{ModuleFormat, Profile, Rendering, Variant};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{C25519Error, Result};
    pub use crate::tokens::{TokenCollector, TokenManifest, TokenMapping, TokenValue};
    pub use crate::types::*;
    pub use crate::variant::{ModuleFormat, Profile, Rendering, Variant};
}
