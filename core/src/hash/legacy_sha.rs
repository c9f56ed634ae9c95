//! x16r / x16rv2: sixteen-algorithm hash chains selected per-round by the
//! previous round's digest.
//!
//! Both chains begin and end on SHA-256d (`sha2`, already a teacher
//! dependency), but the fourteen rounds in between select from a pool of
//! sixteen distinct hash primitives (Blake, BMW, Groestl, Skein, Luffa,
//! Cubehash, Shavite, Simd, Echo, Hamsi, Fugue, Shabal, Whirlpool, and on
//! x16rv2 two more) that have no published Rust crate in this corpus. The
//! real chains are out of scope to implement here (they are "hash
//! primitives the engine consumes as pure functions", not part of the
//! chain-verification logic this crate owns) - the kernel refuses to
//! silently return a wrong hash and errors instead.

use sha2::{Digest, Sha256};

use crate::error::{ChainError, Result};
use crate::hash256::Hash256;

#[allow(dead_code)]
fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// The fourteen-round algorithm-selection chain at the heart of x16r.
/// Round selection is driven by the previous round's digest, which means
/// there is no way to compute a placeholder without the sixteen underlying
/// primitives actually being present - so this refuses the request rather
/// than hash something that isn't x16r.
fn x16r_permute(_header: &[u8]) -> Result<[u8; 32]> {
    log::error!(
        "x16r kernel requested but no x16r hash-chain primitive is linked into this build"
    );
    Err(ChainError::KernelUnavailable(
        "x16r: sixteen-algorithm permutation chain not available".into(),
    ))
}

fn x16rv2_permute(_header: &[u8]) -> Result<[u8; 32]> {
    log::error!(
        "x16rv2 kernel requested but no x16rv2 hash-chain primitive is linked into this build"
    );
    Err(ChainError::KernelUnavailable(
        "x16rv2: sixteen-algorithm permutation chain (v2) not available".into(),
    ))
}

pub fn x16r_hash(header_80: &[u8]) -> Result<Hash256> {
    let raw = x16r_permute(header_80)?;
    Ok(Hash256::from_raw_kernel_output(raw))
}

pub fn x16rv2_hash(header_80: &[u8]) -> Result<Hash256> {
    let raw = x16rv2_permute(header_80)?;
    Ok(Hash256::from_raw_kernel_output(raw))
}
