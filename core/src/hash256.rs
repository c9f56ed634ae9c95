//! 32-byte block hash, stored and compared the way the chain's hex display
//! and proof-of-work arithmetic expect.
//!
//! A header's on-wire fields (`prev_block_hash`, `merkle_root`) carry hash
//! bytes in "internal" order: the raw output of whatever hash function
//! produced them. Every hex string a user or the storage format sees -
//! block explorers, genesis constants, checkpoint lists - is the *reverse*
//! of that: `display = reverse(internal)`. [`Hash256`] stores the display
//! form directly, since that is what equality, hex round-tripping and the
//! proof-of-work big-endian magnitude comparison all want; the on-wire
//! 32-byte field is obtained by reversing on the way in and out.

use std::fmt;

use num_bigint::BigUint;

use crate::error::{ChainError, Result};

/// A block hash in display/comparison order (reverse of the hash
/// function's raw output).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// All-zero hash used as the virtual parent of height -1.
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    pub fn from_display_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }

    /// Build from the raw bytes a hash kernel produced, reversing them into
    /// display order.
    pub fn from_raw_kernel_output(mut raw: [u8; 32]) -> Self {
        raw.reverse();
        Hash256(raw)
    }

    /// The 32 bytes as they appear on the wire inside a serialized header
    /// (internal order): the reverse of display order.
    pub fn to_wire_bytes(&self) -> [u8; 32] {
        let mut b = self.0;
        b.reverse();
        b
    }

    pub fn from_wire_bytes(mut bytes: [u8; 32]) -> Self {
        bytes.reverse();
        Hash256(bytes)
    }

    pub fn as_display_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 64 {
            return Err(ChainError::Codec(format!(
                "expected a 64-character hex hash, got {} characters",
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| ChainError::Codec(format!("invalid hex hash: {e}")))?;
        let out: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::Codec("hex hash did not decode to 32 bytes".into()))?;
        Ok(Hash256(out))
    }

    /// Interpret the stored (display-order) bytes as a big-endian integer,
    /// the form proof-of-work comparisons against a target use.
    pub fn as_big_endian_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}


impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}
