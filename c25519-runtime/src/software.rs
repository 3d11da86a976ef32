//! Host-side implementation of the export table.
//!
//! Reads and writes the same arena offsets as the compiled module, so the
//! facade cannot tell the two apart. Arithmetic comes from `ed25519-compact`.

use crate::arena::Arena;
use crate::exports::Exports;
use c25519_core::error::Result;
use c25519_core::types::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
use ed25519_compact::{KeyPair, PublicKey, SecretKey, Seed, Signature, x25519};

/// Export table computed on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareExports;

impl SoftwareExports {
    /// Create the table.
    pub fn new() -> Self {
        Self
    }
}

impl Exports for SoftwareExports {
    fn scalar_base_mult(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()> {
        let sk = x25519::SecretKey::new(arena.read_array::<PRIVATE_KEY_SIZE>(private)?);
        // Low-order results come back as all zeros, as the native code does.
        let pk = sk
            .recover_public_key()
            .map(|pk| *pk)
            .unwrap_or([0u8; PUBLIC_KEY_SIZE]);
        arena.write(public, &pk)
    }

    fn scalar_mult(&self, arena: &mut Arena, shared: u32, public: u32, private: u32) -> Result<()> {
        let sk = x25519::SecretKey::new(arena.read_array::<PRIVATE_KEY_SIZE>(private)?);
        let pk = x25519::PublicKey::new(arena.read_array::<PUBLIC_KEY_SIZE>(public)?);
        let secret = pk.dh(&sk).map(|s| *s).unwrap_or([0u8; PUBLIC_KEY_SIZE]);
        arena.write(shared, &secret)
    }

    fn edwards_public(&self, arena: &mut Arena, public: u32, private: u32) -> Result<()> {
        let seed = Seed::new(arena.read_array::<PRIVATE_KEY_SIZE>(private)?);
        let pair = KeyPair::from_seed(seed);
        arena.write(public, &pair.pk[..])
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
        let mut expanded = [0u8; PRIVATE_KEY_SIZE + PUBLIC_KEY_SIZE];
        expanded[..PRIVATE_KEY_SIZE].copy_from_slice(&arena.read_array::<PRIVATE_KEY_SIZE>(private)?);
        expanded[PRIVATE_KEY_SIZE..].copy_from_slice(&arena.read_array::<PUBLIC_KEY_SIZE>(public)?);

        let body = arena.read(message, len as usize)?;
        let sig = SecretKey::new(expanded).sign(&body, None);
        arena.write(signature, &sig[..])
    }

    fn verify(
        &self,
        arena: &mut Arena,
        signature: u32,
        public: u32,
        message: u32,
        len: u32,
    ) -> Result<i32> {
        let sig = Signature::new(arena.read_array::<SIGNATURE_SIZE>(signature)?);
        let pk = PublicKey::new(arena.read_array::<PUBLIC_KEY_SIZE>(public)?);
        let body = arena.read(message, len as usize)?;
        Ok(i32::from(pk.verify(&body, &sig).is_ok()))
    }

    fn backend(&self) -> &'static str {
        "software"
    }
}
