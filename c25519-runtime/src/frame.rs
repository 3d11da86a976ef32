//! Fixed call-frame layouts inside the free area.
//!
//! Every primitive stages its inputs and outputs at the same offsets on
//! every call. Only message bodies vary in length, and they always come last.

use crate::arena::FREE_AREA;
use c25519_core::error::{C25519Error, Result};
use c25519_core::types::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE, SIGNATURE_SIZE, Slot};

const fn slot(relative: u32, size: usize) -> Slot {
    Slot::new(FREE_AREA + relative, size as u32)
}

/// Public key derivation, shared by both primitive groups.
pub struct DeriveFrame;

impl DeriveFrame {
    /// Private key input.
    pub const PRIVATE: Slot = slot(0, PRIVATE_KEY_SIZE);
    /// Public key output.
    pub const PUBLIC: Slot = slot(32, PUBLIC_KEY_SIZE);
}

/// Shared-secret derivation. Private key first, matching the wrapper's
/// parameter order.
pub struct SharedFrame;

impl SharedFrame {
    /// Own private key.
    pub const PRIVATE: Slot = slot(0, PRIVATE_KEY_SIZE);
    /// Peer public key.
    pub const PUBLIC: Slot = slot(32, PUBLIC_KEY_SIZE);
    /// Shared secret output.
    pub const SHARED: Slot = slot(64, SHARED_SECRET_SIZE);
}

/// Signing.
pub struct SignFrame;

impl SignFrame {
    /// Private key input.
    pub const PRIVATE: Slot = slot(0, PRIVATE_KEY_SIZE);
    /// Public key, derived in place before signing.
    pub const PUBLIC: Slot = slot(32, PUBLIC_KEY_SIZE);
    /// Signature output.
    pub const SIGNATURE: Slot = slot(64, SIGNATURE_SIZE);
    /// Start of the message body.
    pub const MESSAGE: u32 = FREE_AREA + 128;

    /// Arena size needed to stage a message of `len` bytes.
    pub fn required(len: usize) -> Result<usize> {
        required(Self::MESSAGE, len)
    }
}

/// Verification.
pub struct VerifyFrame;

impl VerifyFrame {
    /// Public key input.
    pub const PUBLIC: Slot = slot(0, PUBLIC_KEY_SIZE);
    /// Signature input.
    pub const SIGNATURE: Slot = slot(32, SIGNATURE_SIZE);
    /// Start of the message body.
    pub const MESSAGE: u32 = FREE_AREA + 96;

    /// Arena size needed to stage a message of `len` bytes.
    pub fn required(len: usize) -> Result<usize> {
        required(Self::MESSAGE, len)
    }
}

// The module addresses memory with i32 offsets.
fn required(base: u32, len: usize) -> Result<usize> {
    u32::try_from(len)
        .ok()
        .and_then(|l| base.checked_add(l))
        .map(|end| end as usize)
        .ok_or(C25519Error::MessageTooLarge { len })
}

/// Message length as passed to the module.
pub(crate) fn message_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| C25519Error::MessageTooLarge { len })
}
