//! LWMA-1 multi-algorithm retargeting: each algorithm (native MeowPow,
//! Scrypt via AuxPOW) adjusts its own difficulty from a window of only its
//! own past blocks, sharing the block height axis with the other
//! algorithm's blocks interleaved in between.

use num_bigint::BigUint;

use crate::error::{ChainError, Result};
use crate::hash::PoWAlgo;
use crate::params::NetworkParams;
use crate::target::bits_to_target;

use super::HeightSource;

const N: u32 = 90;
const POW_TARGET_SPACING: u32 = 60;

/// Next target for `height`, whose header is mined with `current_algo`.
/// Walks backward from `height - 1`, collecting the most recent `N + 1`
/// ancestors mined with the same algorithm (bounded by `min(height - 1,
/// N * 10)` blocks of backward search), then applies the LWMA-1 weighted
/// average.
pub fn get_target_lwma_multi_algo(
    params: &NetworkParams,
    height: u32,
    current_algo: PoWAlgo,
    source: &dyn HeightSource,
) -> Result<BigUint> {
    let aux_active = height >= params.aux_pow_activation_height;
    let algos = if aux_active { 2 } else { 1 };
    let t = POW_TARGET_SPACING * algos;

    let pow_limit = match current_algo {
        PoWAlgo::ScryptAuxPow => &*crate::target::SCRYPT_LIMIT,
        _ => &*crate::target::MEOWPOW_LIMIT,
    };

    let search_limit = (height.saturating_sub(1)).min(N * 10);
    let mut same_algo_blocks = Vec::new();
    let mut h = height as i64 - 1;
    let floor = height as i64 - 1 - search_limit as i64 - 1;
    while h > floor && h >= 0 {
        if same_algo_blocks.len() as u32 >= N + 1 {
            break;
        }
        match source.header_fields_at(h as u32) {
            Some(fields) => {
                let blk_algo = fields.algo(params, h as u32);
                if blk_algo == current_algo {
                    same_algo_blocks.push(fields);
                }
            }
            None => break,
        }
        h -= 1;
    }

    if (same_algo_blocks.len() as u32) < N + 1 {
        return Err(ChainError::NotEnoughHeaders(format!(
            "lwma: need {} blocks of {:?}, only have {}",
            N + 1,
            current_algo,
            same_algo_blocks.len()
        )));
    }

    // oldest-first
    same_algo_blocks.reverse();

    let mut sum_targets = BigUint::from(0u8);
    let mut sum_weighted_solvetimes: u64 = 0;
    let mut prev_time = same_algo_blocks[0].timestamp as i64;

    for (i, blk) in same_algo_blocks.iter().enumerate().skip(1) {
        let i = i as u64;
        let mut ts = blk.timestamp as i64;
        if ts <= prev_time {
            ts = prev_time + 1;
        }
        let solve_time = (ts - prev_time).clamp(1, 6 * t as i64) as u64;
        prev_time = ts;

        sum_weighted_solvetimes += i * solve_time;
        sum_targets += bits_to_target(blk.bits)?;
    }

    let avg_target = sum_targets / N as u64;
    let k = (N as u64) * (N as u64 + 1) * t as u64 / 2;
    let mut next_target = avg_target * sum_weighted_solvetimes / k;
    if &next_target > pow_limit {
        next_target = pow_limit.clone();
    }
    Ok(next_target)
}
