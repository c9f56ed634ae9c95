//! Compact-bits <-> 256-bit target conversion, and the chain-work a single
//! header contributes.
//!
//! Matches Bitcoin Core's `arith_uint256::SetCompact`/`GetCompact` exactly
//! (down to the sign-bit and overflow rejections), since every retarget
//! engine and the verifier itself depend on round-tripping `bits` the same
//! way the network does.

use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;

use crate::error::{ChainError, Result};

pub static MAX_TARGET: Lazy<BigUint> = Lazy::new(|| {
    hex_const("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
});
pub static KAWPOW_LIMIT: Lazy<BigUint> = Lazy::new(|| {
    hex_const("0000000000ffffffffffffffffffffffffffffffffffffffffffffffffffffff")
});
pub static MEOWPOW_LIMIT: Lazy<BigUint> = Lazy::new(|| {
    hex_const("0000000000ffffffffffffffffffffffffffffffffffffffffffffffffffffff")
});
pub static SCRYPT_LIMIT: Lazy<BigUint> = Lazy::new(|| {
    hex_const("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
});

fn hex_const(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 16).expect("hard-coded target constant is valid hex")
}

/// `arith_uint256::SetCompact`.
pub fn bits_to_target(bits: u32) -> Result<BigUint> {
    let bits_n = (bits >> 24) & 0xff;
    let bits_base = bits & 0x007f_ffff;

    let target: BigUint = if bits_n <= 3 {
        BigUint::from(bits_base) >> (8 * (3 - bits_n))
    } else {
        BigUint::from(bits_base) << (8 * (bits_n - 3))
    };

    if !target.is_zero() && bits & 0x0080_0000 != 0 {
        return Err(ChainError::InvalidHeader("target cannot be negative".into()));
    }
    if !target.is_zero()
        && (bits_n > 34 || (bits_n > 33 && bits_base > 0xff) || (bits_n > 32 && bits_base > 0xffff))
    {
        return Err(ChainError::InvalidHeader("target has overflown".into()));
    }
    Ok(target)
}

/// `arith_uint256::GetCompact`.
///
/// Walks a *fixed 32-byte* big-endian representation (leading zero bytes
/// included), exactly as `target.to_bytes(length=32, byteorder='big')`
/// does in the original - starting `bits_n` from a trimmed `BigUint`
/// encoding instead would strip too many leading zeros up front and throw
/// off the byte count this loop is tracking.
pub fn target_to_bits(target: &BigUint) -> u32 {
    let trimmed = target.to_bytes_be();
    let mut c = vec![0u8; 32 - trimmed.len().min(32)];
    c.extend_from_slice(&trimmed[trimmed.len().saturating_sub(32)..]);

    let mut bits_n = c.len() as u32;
    while bits_n > 0 && c.first() == Some(&0) {
        c.remove(0);
        bits_n -= 1;
        if c.len() < 3 {
            c.push(0);
        }
    }
    let mut bits_base = {
        let mut v = 0u32;
        for &b in c.iter().take(3) {
            v = (v << 8) | b as u32;
        }
        v
    };
    if bits_base >= 0x0080_0000 {
        bits_n += 1;
        bits_base >>= 8;
    }
    (bits_n << 24) | bits_base
}

/// Work a single header with this target contributes to cumulative chain
/// work: `floor((2^256 - target - 1) / (target + 1)) + 1`.
pub fn chain_work_of_target(target: &BigUint) -> BigUint {
    let max = BigUint::from(1u8) << 256;
    let numerator = &max - target - 1u8;
    let denominator = target + 1u8;
    numerator / denominator + 1u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_to_target_zero_bits_base() {
        assert_eq!(bits_to_target(0x00000000).unwrap(), BigUint::zero());
        assert_eq!(bits_to_target(0x03000000).unwrap(), BigUint::zero());
    }

    #[test]
    fn bits_to_target_rejects_negative_sign_bit() {
        assert!(bits_to_target(0x01800000).is_err());
    }

    #[test]
    fn bits_to_target_rejects_overflow() {
        assert!(bits_to_target(0xff123456).is_err());
    }

    #[test]
    fn bits_target_round_trip() {
        for bits in [0x1d00ffffu32, 0x1b0404cb, 0x207fffff, 0x03123456] {
            let target = bits_to_target(bits).unwrap();
            let round_tripped = target_to_bits(&target);
            assert_eq!(round_tripped, bits, "bits=0x{bits:08x}");
        }
    }

    #[test]
    fn small_target_round_trips_through_padding_branch() {
        // A target with fewer than 3 significant bytes exercises the
        // `c.len() < 3` zero-padding branch in target_to_bits.
        let target = BigUint::from(5u32);
        let bits = target_to_bits(&target);
        let back = bits_to_target(bits).unwrap();
        assert_eq!(back, target);
    }

    #[test]
    fn chain_work_of_max_target_is_one() {
        let max = (BigUint::from(1u8) << 256) - 1u8;
        assert_eq!(chain_work_of_target(&max), BigUint::from(1u8));
    }

    #[test]
    fn chain_work_increases_as_target_shrinks() {
        let big = bits_to_target(0x1d00ffff).unwrap();
        let small = bits_to_target(0x1b0404cb).unwrap();
        assert!(chain_work_of_target(&small) > chain_work_of_target(&big));
    }
}
