//! DGWv3 (Dark Gravity Wave v3): a single-algorithm, 180-block sliding
//! difficulty average with a timespan clamp.
//!
//! With the retrieved network parameters, `aux_pow_activation_height`
//! equals `n_dgw_activation_block`, so the DGW window in
//! [`super::RetargetEngine::for_height`] is never actually selected - LWMA
//! takes over at the same height DGW would have started. The engine is
//! still implemented in full: a chain started from different parameters
//! (or replaying history before that coincidence existed) exercises it.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{ChainError, Result};
use crate::params::NetworkParams;
use crate::target::{bits_to_target, MAX_TARGET};

use super::HeightSource;

const DGW_PASTBLOCKS: u32 = 180;
const POW_TARGET_SPACING: u32 = 60;

/// `height in 373..373+180` / `height in 801212..801212+180`: documented
/// hard difficulty resets for the KawPow and MeowPow launches. Within
/// these windows the target is the algorithm's PoW limit, unconditionally.
fn reset_window_limit(height: u32) -> Option<&'static Lazy<BigUint>> {
    use crate::target::{KAWPOW_LIMIT, MEOWPOW_LIMIT};
    if (373..373 + 180).contains(&height) {
        Some(&KAWPOW_LIMIT)
    } else if (801_212..801_212 + 180).contains(&height) {
        Some(&MEOWPOW_LIMIT)
    } else {
        None
    }
}

use once_cell::sync::Lazy;

/// DGWv3 next-target computation for `height`, reading ancestors through
/// `source` (heights `height-1` down to `height-180`).
///
/// Uses the canonical [`bits_to_target`] rather than the original's
/// separate `convbignum` helper - see DESIGN.md Open Question 3.
pub fn get_target_dgwv3(params: &NetworkParams, height: u32, source: &dyn HeightSource) -> Result<BigUint> {
    if let Some(limit) = reset_window_limit(height) {
        return Ok(limit.clone());
    }

    let mut count_blocks: u32 = 0;
    let mut past_difficulty_average = BigUint::zero();
    let mut past_difficulty_average_prev = BigUint::zero();
    let mut last_block_time: Option<u32> = None;
    let mut actual_timespan: i64 = 0;

    for i in 0..DGW_PASTBLOCKS {
        let h = height
            .checked_sub(1 + i)
            .ok_or_else(|| ChainError::NotEnoughHeaders(format!("dgw: height underflow at {height}")))?;
        let block = source
            .header_fields_at(h)
            .ok_or_else(|| ChainError::NotEnoughHeaders(format!("dgw: missing header at height {h}")))?;
        count_blocks += 1;

        if count_blocks <= DGW_PASTBLOCKS {
            let bn_num = bits_to_target(block.bits)?;
            if count_blocks == 1 {
                past_difficulty_average = bn_num;
            } else {
                let count_blocks = count_blocks as u64;
                past_difficulty_average =
                    (past_difficulty_average_prev * count_blocks + bn_num) / (count_blocks + 1);
            }
            past_difficulty_average_prev = past_difficulty_average.clone();
        }

        if let Some(last) = last_block_time {
            actual_timespan += last as i64 - block.timestamp as i64;
        }
        last_block_time = Some(block.timestamp);
    }

    let target_timespan = (count_blocks * POW_TARGET_SPACING) as i64;
    let actual_timespan = actual_timespan.clamp(target_timespan / 3, target_timespan * 3);

    let mut bn_new = past_difficulty_average;
    bn_new *= actual_timespan as u64;
    bn_new /= target_timespan as u64;
    if bn_new > *MAX_TARGET {
        bn_new = MAX_TARGET.clone();
    }
    Ok(bn_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retarget::HeaderFields;
    use std::collections::HashMap;

    struct FakeSource(HashMap<u32, HeaderFields>);
    impl HeightSource for FakeSource {
        fn header_fields_at(&self, height: u32) -> Option<HeaderFields> {
            self.0.get(&height).copied()
        }
    }

    fn flat_window(height: u32, bits: u32, spacing: u32) -> FakeSource {
        let mut m = HashMap::new();
        for i in 1..=DGW_PASTBLOCKS {
            let h = height - i;
            m.insert(h, HeaderFields { version: 0, timestamp: 1_000_000 - i * spacing, bits });
        }
        FakeSource(m)
    }

    #[test]
    fn reset_window_returns_kawpow_limit_unconditionally() {
        let p = NetworkParams::mainnet();
        let source = FakeSource(HashMap::new());
        let target = get_target_dgwv3(&p, 400, &source).unwrap();
        assert_eq!(target, *crate::target::KAWPOW_LIMIT);
    }

    #[test]
    fn flat_difficulty_scales_by_actual_over_target_timespan() {
        // Only 179 (not 180) solvetime diffs are ever summed - the first
        // window entry has no predecessor to diff against - so even
        // perfectly on-schedule blocks produce an actual timespan slightly
        // short of the full 180-block target timespan.
        let p = NetworkParams::mainnet();
        let bits = 0x1d00ffff;
        let source = flat_window(100_000, bits, POW_TARGET_SPACING);
        let target = get_target_dgwv3(&p, 100_000, &source).unwrap();

        let flat_target = bits_to_target(bits).unwrap();
        let actual_timespan = 179u64 * POW_TARGET_SPACING as u64;
        let target_timespan = DGW_PASTBLOCKS as u64 * POW_TARGET_SPACING as u64;
        let expected = flat_target * actual_timespan / target_timespan;
        assert_eq!(target, expected);
    }

    #[test]
    fn missing_ancestor_is_not_enough_headers() {
        let p = NetworkParams::mainnet();
        let source = FakeSource(HashMap::new());
        let err = get_target_dgwv3(&p, 100_000, &source).unwrap_err();
        assert!(matches!(err, ChainError::NotEnoughHeaders(_)));
    }
}
