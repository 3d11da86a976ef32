//! Primitive invocation facade.
//!
//! A [`Bridge`] pairs one arena with one export table and hands out the two
//! primitive groups, [`X25519`] and [`Ed25519`]. Both groups stage their data
//! at the fixed offsets of [`crate::frame`], so a bridge serves one call at a
//! time; `&mut` access enforces this.

use crate::arena::Arena;
use crate::exports::{ExportNames, Exports, WasmExports};
use crate::frame::{DeriveFrame, SharedFrame, SignFrame, VerifyFrame, message_len};
use crate::link;
use crate::readiness::{LinkState, Linking, Readiness};
use crate::runtime::WasmRuntime;
use crate::software::SoftwareExports;
use crate::source::ModuleSource;
use c25519_core::error::Result;
use c25519_core::types::{PrivateKey, PublicKey, SharedSecret, Signature};
use std::sync::Arc;
use tracing::{debug, warn};

/// A linked computation module and its arena.
pub struct Bridge {
    arena: Arena,
    exports: Box<dyn Exports>,
}

impl Bridge {
    /// Compile and link a module synchronously.
    pub fn link(runtime: &WasmRuntime, source: &ModuleSource, names: &ExportNames) -> Result<Self> {
        let name = source.name();
        let bytes = source.load()?;
        let module = runtime.compile(&name, &bytes)?;

        let mut arena = Arena::new(runtime)?;
        let instance = link::instantiate(&mut arena, &name, &module)?;
        let exports = WasmExports::resolve(&instance, &mut arena, names)?;

        debug!(module = %name, "bridge ready");
        Ok(Self {
            arena,
            exports: Box::new(exports),
        })
    }

    /// A bridge computing on the host instead of in a module.
    pub fn software(runtime: &WasmRuntime) -> Result<Self> {
        Ok(Self::with_exports(Arena::new(runtime)?, SoftwareExports::new()))
    }

    /// A bridge over an existing arena and export table.
    pub fn with_exports(arena: Arena, exports: impl Exports + 'static) -> Self {
        Self {
            arena,
            exports: Box::new(exports),
        }
    }

    /// Link on a blocking task and return immediately.
    ///
    /// The returned handle yields readiness signals for callers that only
    /// need to know when primitives become available.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_link(
        runtime: Arc<WasmRuntime>,
        source: ModuleSource,
        names: ExportNames,
    ) -> Linking {
        let (tx, readiness) = Readiness::channel();
        tx.send_replace(LinkState::Linking);

        let handle = tokio::task::spawn_blocking(move || {
            let result = Self::link(&runtime, &source, &names);
            match &result {
                Ok(_) => {
                    tx.send_replace(LinkState::Ready);
                }
                Err(e) => {
                    warn!(module = %source.name(), error = %e, "linking failed");
                    tx.send_replace(LinkState::Failed);
                }
            }
            result
        });

        Linking::new(readiness, handle)
    }

    /// The key-agreement group.
    pub fn x25519(&mut self) -> X25519<'_> {
        X25519 {
            arena: &mut self.arena,
            exports: self.exports.as_ref(),
        }
    }

    /// The signature group.
    pub fn ed25519(&mut self) -> Ed25519<'_> {
        Ed25519 {
            arena: &mut self.arena,
            exports: self.exports.as_ref(),
        }
    }

    /// The arena backing this bridge.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena, e.g. to grow it ahead of large messages.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Name of the export backend ("wasm" or "software").
    pub fn backend(&self) -> &'static str {
        self.exports.backend()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("backend", &self.backend())
            .field("arena", &self.arena)
            .finish()
    }
}

/// X25519 key agreement over Montgomery coordinates.
pub struct X25519<'b> {
    arena: &'b mut Arena,
    exports: &'b dyn Exports,
}

impl X25519<'_> {
    /// Derive the public key of `private_key`.
    pub fn get_public(&mut self, private_key: &PrivateKey) -> Result<PublicKey> {
        self.arena.write(DeriveFrame::PRIVATE.offset, private_key)?;
        self.exports.scalar_base_mult(
            self.arena,
            DeriveFrame::PUBLIC.offset,
            DeriveFrame::PRIVATE.offset,
        )?;
        self.arena.read_array(DeriveFrame::PUBLIC.offset)
    }

    /// Derive the secret shared between `private_key` and a peer's
    /// `public_key`.
    pub fn get_shared(
        &mut self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
    ) -> Result<SharedSecret> {
        self.arena.write(SharedFrame::PRIVATE.offset, private_key)?;
        self.arena.write(SharedFrame::PUBLIC.offset, public_key)?;
        self.exports.scalar_mult(
            self.arena,
            SharedFrame::SHARED.offset,
            SharedFrame::PUBLIC.offset,
            SharedFrame::PRIVATE.offset,
        )?;
        self.arena.read_array(SharedFrame::SHARED.offset)
    }
}

/// Ed25519 signatures over twisted-Edwards coordinates.
pub struct Ed25519<'b> {
    arena: &'b mut Arena,
    exports: &'b dyn Exports,
}

impl Ed25519<'_> {
    /// Derive the public key of `private_key`.
    ///
    /// Not interchangeable with [`X25519::get_public`].
    pub fn get_public(&mut self, private_key: &PrivateKey) -> Result<PublicKey> {
        self.arena.write(DeriveFrame::PRIVATE.offset, private_key)?;
        self.exports.edwards_public(
            self.arena,
            DeriveFrame::PUBLIC.offset,
            DeriveFrame::PRIVATE.offset,
        )?;
        self.arena.read_array(DeriveFrame::PUBLIC.offset)
    }

    /// Sign `message` with `private_key`. Deterministic.
    pub fn sign(&mut self, message: &[u8], private_key: &PrivateKey) -> Result<Signature> {
        let len = message_len(message.len())?;
        self.arena.ensure_capacity(SignFrame::required(message.len())?)?;

        self.arena.write(SignFrame::PRIVATE.offset, private_key)?;
        self.arena.write(SignFrame::MESSAGE, message)?;
        self.exports.edwards_public(
            self.arena,
            SignFrame::PUBLIC.offset,
            SignFrame::PRIVATE.offset,
        )?;
        self.exports.sign(
            self.arena,
            SignFrame::SIGNATURE.offset,
            SignFrame::PUBLIC.offset,
            SignFrame::PRIVATE.offset,
            SignFrame::MESSAGE,
            len,
        )?;
        self.arena.read_array(SignFrame::SIGNATURE.offset)
    }

    /// Check `signature` over `message` against `public_key`.
    ///
    /// An invalid signature is `Ok(false)`.
    pub fn verify(
        &mut self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool> {
        let len = message_len(message.len())?;
        self.arena.ensure_capacity(VerifyFrame::required(message.len())?)?;

        self.arena.write(VerifyFrame::PUBLIC.offset, public_key)?;
        self.arena.write(VerifyFrame::SIGNATURE.offset, signature)?;
        self.arena.write(VerifyFrame::MESSAGE, message)?;
        let valid = self.exports.verify(
            self.arena,
            VerifyFrame::SIGNATURE.offset,
            VerifyFrame::PUBLIC.offset,
            VerifyFrame::MESSAGE,
            len,
        )?;
        Ok(valid != 0)
    }
}
