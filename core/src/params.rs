//! Network parameters: the fixed constants a chain is instantiated with.
//!
//! Deliberately a plain struct rather than a global singleton - *which*
//! network an engine talks to is the caller's business (config discovery is
//! out of scope here), but the constants themselves are fixed per network,
//! mainnet and testnet each returning their own [`NetworkParams`] value.

use num_bigint::BigUint;

use crate::hash256::Hash256;

/// One (block height, block hash) pair from a DGW checkpoint chunk, paired
/// with the full 256-bit target in force at the end of that chunk - bundled
/// checkpoint data carries the expanded target verbatim, not the compact
/// `bits` encoding (real targets run well past `u32`; `bits` is only ever
/// compact-encoded on the wire, never as bundled trust anchors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DgwCheckpoint {
    pub hash: Hash256,
    pub target: BigUint,
}

#[derive(Debug, Clone)]
pub struct NetworkParams {
    pub name: &'static str,
    pub testnet: bool,

    pub genesis: Hash256,

    /// `(hash, target)` pairs, one per legacy 2016-block chunk, ending at
    /// `height = index * 2016 + 2015`.
    pub legacy_checkpoints: Vec<(Hash256, BigUint)>,

    /// DGW checkpoint chunks: each chunk carries the first and last header
    /// of a `DGW_CHECKPOINTS_SPACING`-block window.
    pub dgw_checkpoints: Vec<[DgwCheckpoint; 2]>,
    pub dgw_checkpoints_spacing: u32,
    pub dgw_checkpoints_start: u32,

    pub x16rv2_activation_ts: u32,
    pub kawpow_activation_ts: u32,
    pub kawpow_activation_height: u32,
    pub meowpow_activation_ts: u32,
    pub n_dgw_activation_block: u32,

    /// Height at which AuxPOW (Scrypt merge-mining) becomes selectable via
    /// the header's version bit 8. Not present as a distinct constant in
    /// the retrieved parameter source; set equal to `kawpow_activation_height`
    /// (see DESIGN.md Open Question 6 - both forks land at the same height
    /// on this chain).
    pub aux_pow_activation_height: u32,
}

impl NetworkParams {
    pub fn mainnet() -> Self {
        NetworkParams {
            name: "mainnet",
            testnet: false,
            genesis: Hash256::from_hex(
                "000000edd819220359469c54f2614b5602ebc775ea67a64602f354bdaa320f70"
                    .get(..64)
                    .expect("genesis constant is 64 hex chars"),
            )
            .expect("valid genesis hex"),
            // Not retrieved alongside constants.py (checkpoints.json is a
            // separate data file, absent from this corpus); the engine
            // behaves correctly with an empty checkpoint set, just without
            // the fast-path that skips recomputation for early chunks.
            legacy_checkpoints: Vec::new(),
            dgw_checkpoints: Vec::new(),
            dgw_checkpoints_spacing: 2016,
            dgw_checkpoints_start: 168 * 2016,
            x16rv2_activation_ts: 1_569_945_600,
            kawpow_activation_ts: 1_662_493_424,
            kawpow_activation_height: 373,
            meowpow_activation_ts: 1_710_799_200,
            n_dgw_activation_block: 373,
            aux_pow_activation_height: 373,
        }
    }

    pub fn testnet() -> Self {
        NetworkParams {
            name: "testnet",
            testnet: true,
            genesis: Hash256::from_hex(
                "000000ecfc5e6324a079542221d00e10362bdc894d56500c414060eea8a3ad5a"
                    .get(..64)
                    .expect("genesis constant is 64 hex chars"),
            )
            .expect("valid genesis hex"),
            legacy_checkpoints: Vec::new(),
            dgw_checkpoints: Vec::new(),
            dgw_checkpoints_spacing: 2016,
            dgw_checkpoints_start: 0,
            x16rv2_activation_ts: 1_567_533_600,
            kawpow_activation_ts: 1_585_159_201,
            kawpow_activation_height: 1,
            meowpow_activation_ts: 1_585_159_200,
            n_dgw_activation_block: 1,
            aux_pow_activation_height: 1,
        }
    }

    /// Last height covered by `legacy_checkpoints`, or `0` if there are none.
    pub fn max_legacy_checkpoint(&self) -> u32 {
        (self.legacy_checkpoints.len() as u32).saturating_mul(2016).saturating_sub(1)
    }

    /// Last height covered by `dgw_checkpoints`, or `0` if there are none.
    pub fn max_checkpoint(&self) -> u32 {
        let span = (self.dgw_checkpoints.len() as u32).saturating_mul(self.dgw_checkpoints_spacing);
        self.dgw_checkpoints_start.saturating_add(span).saturating_sub(1)
    }

    /// The bundled hash for `height`, if `height` is the last height of a
    /// legacy (pre-DGW) 2016-block checkpoint chunk - i.e. `(height + 1) %
    /// 2016 == 0` and `height` is still below `n_dgw_activation_block`.
    /// Every other legacy-range height still has to be hashed from its own
    /// stored header; only the chunk boundary itself is pinned data.
    pub fn legacy_checkpoint_hash(&self, height: u32) -> Option<Hash256> {
        if height >= self.n_dgw_activation_block {
            return None;
        }
        if (height + 1) % 2016 != 0 {
            return None;
        }
        let idx = (height / 2016) as usize;
        self.legacy_checkpoints.get(idx).map(|(hash, _)| *hash)
    }

    /// Whether `height` is one of the two pinned sentinel offsets (window
    /// start or `spacing - 1`) of a DGW checkpoint window, and if so, which
    /// window index and which of the pair (`false` = first/start, `true` =
    /// last/end) it is. Returns `None` for every other height, including
    /// ones before `dgw_checkpoints_start` or past the last bundled window.
    pub fn dgw_checkpoint_sentinel(&self, height: u32) -> Option<(usize, bool)> {
        if height < self.dgw_checkpoints_start {
            return None;
        }
        let offset = height - self.dgw_checkpoints_start;
        let spacing = self.dgw_checkpoints_spacing;
        let idx = (offset / spacing) as usize;
        if idx >= self.dgw_checkpoints.len() {
            return None;
        }
        if offset % spacing == 0 {
            Some((idx, false))
        } else if offset % spacing == spacing - 1 {
            Some((idx, true))
        } else {
            None
        }
    }
}
