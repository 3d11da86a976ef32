//! The native entry points behind both primitive groups.
//!
//! ```text
//! c25519_sbasemult(public, private)
//! c25519_smult(shared, public, private)
//! edsign_sec_to_pub(public, private)
//! edsign_sign(signature, public, private, message, len)
//! edsign_verify(signature, public, message, len) -> i32
//! ```
//!
//! Every argument except `len` is an arena offset.

use crate::arena::Arena;
use c25519_core::error::{C25519Error, Result};
use c25519_core::tokens::{TokenManifest, TokenMapping, TokenValue};
use wasmtime::{Instance, TypedFunc};

/// Table of native entry points operating on arena offsets.
pub trait Exports: Send + Sync {
    /// Montgomery public key of the private key at `private`, written to `public`.
    fn scalar_base_mult(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()>;

    /// Shared secret of `private` and `public`, written to `shared`.
    fn scalar_mult(&self, arena: &mut Arena, shared: u32, public: u32, private: u32) -> Result<()>;

    /// Edwards public key of the private key at `private`, written to `public`.
    fn edwards_public(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()>;

    /// Signature of `len` message bytes at `message`, written to `signature`.
    fn sign(
        &self,
        arena: &mut Arena,
        signature: u32,
        public: u32,
        private: u32,
        message: u32,
        len: u32,
    ) -> Result<()>;

    /// Raw verification result; nonzero means valid.
    fn verify(
        &self,
        arena: &mut Arena,
        signature: u32,
        public: u32,
        message: u32,
        len: u32,
    ) -> Result<i32>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}

/// Symbol names of the native entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNames {
    /// Montgomery base-point multiplication.
    pub scalar_base_mult: String,
    /// Montgomery scalar multiplication.
    pub scalar_mult: String,
    /// Edwards public key derivation.
    pub edwards_public: String,
    /// Signing.
    pub sign: String,
    /// Verification.
    pub verify: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            scalar_base_mult: "c25519_sbasemult".to_string(),
            scalar_mult: "c25519_smult".to_string(),
            edwards_public: "edsign_sec_to_pub".to_string(),
            sign: "edsign_sign".to_string(),
            verify: "edsign_verify".to_string(),
        }
    }
}

impl ExportNames {
    /// Placeholder token under which the build renames `symbol`.
    pub fn token_for(symbol: &str) -> String {
        format!("__WASMEXPORTS_{}__", symbol)
    }

    /// Names as renamed by a build, falling back to the plain symbol for any
    /// export the mapping does not rename.
    pub fn from_mapping(mapping: &TokenMapping) -> Self {
        let rename = |symbol: String| match mapping.get(&Self::token_for(&symbol)) {
            Some(TokenValue::Identifier(renamed)) => renamed.clone(),
            _ => symbol,
        };

        let plain = Self::default();
        Self {
            scalar_base_mult: rename(plain.scalar_base_mult),
            scalar_mult: rename(plain.scalar_mult),
            edwards_public: rename(plain.edwards_public),
            sign: rename(plain.sign),
            verify: rename(plain.verify),
        }
    }

    /// Names recorded in a build's token manifest.
    pub fn from_manifest(manifest: &TokenManifest) -> Self {
        Self::from_mapping(&manifest.to_mapping())
    }
}

struct Export<P, R> {
    name: String,
    func: TypedFunc<P, R>,
}

impl<P, R> Export<P, R>
where
    P: wasmtime::WasmParams,
    R: wasmtime::WasmResults,
{
    fn resolve(instance: &Instance, arena: &mut Arena, name: &str) -> Result<Self> {
        let func = instance
            .get_typed_func::<P, R>(arena.store_mut(), name)
            .map_err(|e| C25519Error::MissingExport {
                name: name.to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            func,
        })
    }

    fn call(&self, arena: &mut Arena, params: P) -> Result<R> {
        tracing::trace!(export = %self.name, "calling export");
        self.func
            .call(arena.store_mut(), params)
            .map_err(|e| C25519Error::ExportTrap {
                name: self.name.clone(),
                cause: e.to_string(),
            })
    }
}

/// Entry points of a linked computation module.
pub struct WasmExports {
    scalar_base_mult: Export<(u32, u32), ()>,
    scalar_mult: Export<(u32, u32, u32), ()>,
    edwards_public: Export<(u32, u32), ()>,
    sign: Export<(u32, u32, u32, u32, u32), ()>,
    verify: Export<(u32, u32, u32, u32), i32>,
}

impl WasmExports {
    /// Look up every entry point in `instance`.
    pub fn resolve(instance: &Instance, arena: &mut Arena, names: &ExportNames) -> Result<Self> {
        Ok(Self {
            scalar_base_mult: Export::resolve(instance, arena, &names.scalar_base_mult)?,
            scalar_mult: Export::resolve(instance, arena, &names.scalar_mult)?,
            edwards_public: Export::resolve(instance, arena, &names.edwards_public)?,
            sign: Export::resolve(instance, arena, &names.sign)?,
            verify: Export::resolve(instance, arena, &names.verify)?,
        })
    }
}

impl Exports for WasmExports {
    fn scalar_base_mult(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()> {
        self.scalar_base_mult.call(arena, (public, private))
    }

    fn scalar_mult(&self, arena: &mut Arena, shared: u32, public: u32, private: u32) -> Result<()> {
        self.scalar_mult.call(arena, (shared, public, private))
    }

    fn edwards_public(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()> {
        self.edwards_public.call(arena, (public, private))
    }

    fn sign(
        &self,
        arena: &mut Arena,
        signature: u32,
        public: u32,
        private: u32,
        message: u32,
        len: u32,
    ) -> Result<()> {
        self.sign
            .call(arena, (signature, public, private, message, len))
    }

    fn verify(
        &self,
        arena: &mut Arena,
        signature: u32,
        public: u32,
        message: u32,
        len: u32,
    ) -> Result<i32> {
        self.verify.call(arena, (signature, public, message, len))
    }

    fn backend(&self) -> &'static str {
        "wasm"
    }
}
