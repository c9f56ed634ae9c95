//! Proof-of-work hash kernels.
//!
//! Which kernel applies to a given header is a pure function of height,
//! version and timestamp (see [`PoWAlgo::for_header`]); the kernel itself
//! only needs the 80 serialized header bytes (or, for KawPow/MeowPow, also
//! the 120-byte extended record it was carved out of).

mod legacy_sha;
mod kawpow;
mod scrypt_auxpow;

pub use legacy_sha::{x16r_hash, x16rv2_hash};
pub use kawpow::{kawpow_hash, meowpow_hash};
pub use scrypt_auxpow::scrypt_auxpow_hash;

use crate::hash256::Hash256;
use crate::params::NetworkParams;

/// Which of the five PoW kernels a given header was (or should be) mined
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoWAlgo {
    X16r,
    X16rv2,
    KawPow,
    MeowPow,
    ScryptAuxPow,
}

impl PoWAlgo {
    /// Algorithm name the way `get_block_algo` names it: only the two
    /// names that matter for algorithm-separated retargeting.
    pub fn retarget_name(&self) -> &'static str {
        match self {
            PoWAlgo::ScryptAuxPow => "scrypt",
            _ => "meowpow",
        }
    }

    /// Select the algorithm for a header given its height, version and
    /// timestamp, mirroring `get_block_algo` composed with `hash_header`'s
    /// own timestamp-band dispatch.
    pub fn for_header(params: &NetworkParams, height: u32, version: u32, timestamp: u32) -> PoWAlgo {
        let is_auxpow = height >= params.aux_pow_activation_height && (version & (1 << 8)) != 0;
        if is_auxpow {
            return PoWAlgo::ScryptAuxPow;
        }
        if timestamp >= params.kawpow_activation_ts && timestamp < params.meowpow_activation_ts {
            PoWAlgo::KawPow
        } else if timestamp >= params.meowpow_activation_ts {
            PoWAlgo::MeowPow
        } else if timestamp >= params.x16rv2_activation_ts {
            PoWAlgo::X16rv2
        } else {
            PoWAlgo::X16r
        }
    }
}

/// Reverse a fixed-size byte array in place and return it, the
/// `revb`/byte-reversal convention used throughout header hashing.
pub(crate) fn revb32(mut b: [u8; 32]) -> [u8; 32] {
    b.reverse();
    b
}

/// Compute the proof-of-work hash of a serialized header, dispatching on
/// algorithm. `header_bytes` is the codec's wire form (80 bytes for
/// X16r/X16rv2/ScryptAuxPow, 120 for KawPow/MeowPow).
pub fn hash_header(algo: PoWAlgo, header_bytes: &[u8]) -> crate::error::Result<Hash256> {
    match algo {
        PoWAlgo::X16r => x16r_hash(&header_bytes[..80]),
        PoWAlgo::X16rv2 => x16rv2_hash(&header_bytes[..80]),
        PoWAlgo::KawPow => kawpow_hash(header_bytes),
        PoWAlgo::MeowPow => meowpow_hash(header_bytes),
        PoWAlgo::ScryptAuxPow => scrypt_auxpow_hash(&header_bytes[..80]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retarget_name_groups_non_scrypt_as_meowpow() {
        assert_eq!(PoWAlgo::X16r.retarget_name(), "meowpow");
        assert_eq!(PoWAlgo::KawPow.retarget_name(), "meowpow");
        assert_eq!(PoWAlgo::MeowPow.retarget_name(), "meowpow");
        assert_eq!(PoWAlgo::ScryptAuxPow.retarget_name(), "scrypt");
    }

    #[test]
    fn for_header_picks_auxpow_by_version_bit_and_height() {
        let p = NetworkParams::mainnet();
        let algo = PoWAlgo::for_header(&p, p.aux_pow_activation_height, 1 << 8, p.meowpow_activation_ts);
        assert_eq!(algo, PoWAlgo::ScryptAuxPow);

        // same version bit, below activation height: not AuxPOW
        let algo = PoWAlgo::for_header(&p, p.aux_pow_activation_height - 1, 1 << 8, p.meowpow_activation_ts);
        assert_ne!(algo, PoWAlgo::ScryptAuxPow);
    }

    #[test]
    fn for_header_picks_timestamp_band() {
        let p = NetworkParams::mainnet();
        assert_eq!(PoWAlgo::for_header(&p, 0, 0, p.x16rv2_activation_ts - 1), PoWAlgo::X16r);
        assert_eq!(PoWAlgo::for_header(&p, 0, 0, p.x16rv2_activation_ts), PoWAlgo::X16rv2);
        assert_eq!(PoWAlgo::for_header(&p, 0, 0, p.kawpow_activation_ts), PoWAlgo::KawPow);
        assert_eq!(PoWAlgo::for_header(&p, 0, 0, p.meowpow_activation_ts), PoWAlgo::MeowPow);
    }
}
