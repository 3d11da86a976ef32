//! Fixed-size key material exchanged with the computation module.

/// Size of an X25519 or Ed25519 private key in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of an X25519 or Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an X25519 shared secret in bytes.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// A 32-byte private key.
pub type PrivateKey = [u8; PRIVATE_KEY_SIZE];

/// A 32-byte public key (Montgomery u-coordinate or packed Edwards point).
pub type PublicKey = [u8; PUBLIC_KEY_SIZE];

/// A 32-byte X25519 shared secret.
pub type SharedSecret = [u8; SHARED_SECRET_SIZE];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; SIGNATURE_SIZE];

/// A region inside the linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Byte offset within linear memory.
    pub offset: u32,
    /// Size of the region in bytes.
    pub size: u32,
}

impl Slot {
    /// Create a new slot.
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Get the end offset (offset + size).
    pub const fn end(&self) -> u32 {
        self.offset + self.size
    }

    /// Check whether two slots share at least one byte.
    pub const fn overlaps(&self, other: &Slot) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_basic() {
        let slot = Slot::new(0x1000, 32);
        assert_eq!(slot.end(), 0x1020);
    }

    #[test]
    fn slot_overlap() {
        let a = Slot::new(0, 32);
        let b = Slot::new(32, 32);
        let c = Slot::new(16, 32);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
