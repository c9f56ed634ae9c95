//! AuxPOW kernel: Scrypt(N=1024, r=1, p=1, dklen=32) over the 80-byte
//! legacy-format header, salted with itself.
//!
//! This is the one kernel of the five that a real crate in this corpus can
//! fully implement (the `scrypt` crate, already a teacher dependency via
//! its yescrypt kernel).

use scrypt::{scrypt, Params as ScryptParams};

use crate::error::{ChainError, Result};
use crate::hash256::Hash256;

/// `log2(N)` for `N = 1024`.
const LOG2_N: u8 = 10;
const R: u32 = 1;
const P: u32 = 1;
const DKLEN: usize = 32;

pub fn scrypt_auxpow_hash(header_80: &[u8]) -> Result<Hash256> {
    let params = ScryptParams::new(LOG2_N, R, P, DKLEN)
        .map_err(|e| ChainError::Codec(format!("invalid scrypt parameters: {e}")))?;
    let mut out = [0u8; DKLEN];
    scrypt(header_80, header_80, &params, &mut out)
        .map_err(|e| ChainError::Codec(format!("scrypt hashing failed: {e}")))?;
    Ok(Hash256::from_raw_kernel_output(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_deterministically() {
        let header = [0u8; 80];
        let a = scrypt_auxpow_hash(&header).unwrap();
        let b = scrypt_auxpow_hash(&header).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_headers_hash_differently() {
        let mut header = [0u8; 80];
        let a = scrypt_auxpow_hash(&header).unwrap();
        header[0] = 1;
        let b = scrypt_auxpow_hash(&header).unwrap();
        assert_ne!(a, b);
    }
}
