//! A single chain: a contiguous run of header records rooted either at
//! genesis (the main chain) or at a fork point on some other chain.
//!
//! Chains form a forest. A chain never owns a strong reference to its
//! parent's identity - identities change under `swap_with_parent` - so the
//! parent edge is stored as a lookup key (the parent's current
//! `forkpoint_hash`) resolved through a [`ChainLookup`] at call time, per
//! `blockchain.py`'s `parent` being re-pointed during a swap rather than
//! held as a fixed object reference.
//!
//! A chain's own identity (`forkpoint`, `forkpoint_hash`, `prev_hash`,
//! `parent_key`) and its backing file's path are *not* fixed for the
//! object's lifetime either: [`crate::manager::ChainManager`]'s reorg swap
//! relabels an existing `Chain` in place rather than constructing a new
//! one, so every identity field lives behind the same lock as the file
//! size.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use num_bigint::BigUint;
use parking_lot::ReentrantMutex;

use crate::error::{ChainError, Result};
use crate::hash256::Hash256;
use crate::header::{Header, EXTENDED_HEADER_SIZE};
use crate::params::NetworkParams;
use crate::retarget::{self, HeaderFields, HeightSource};
use crate::store;
use crate::target::{bits_to_target, target_to_bits};
use crate::verify::verify_header;

/// Resolves a chain's parent (and, transitively, further ancestors) by
/// `forkpoint_hash`. Implemented by [`crate::manager::ChainManager`]'s
/// registry; kept as a trait so `chain.rs` doesn't need to know about
/// `manager.rs`'s locking.
pub trait ChainLookup {
    fn lookup(&self, forkpoint_hash: &Hash256) -> Option<Arc<Chain>>;
}

struct ChainState {
    path: PathBuf,
    size: u64,
    forkpoint: u32,
    forkpoint_hash: Hash256,
    prev_hash: Option<Hash256>,
    parent_key: Option<Hash256>,
}

pub struct Chain {
    pub params: Arc<NetworkParams>,
    state: ReentrantMutex<RefCell<ChainState>>,
}

impl Chain {
    /// Instantiate the main chain, rooted at genesis, backed by `path`.
    pub fn main(params: Arc<NetworkParams>, path: impl Into<PathBuf>) -> Result<Arc<Chain>> {
        let path = path.into();
        store::ensure_exists(&path)?;
        let size = store::size(&path)?;
        let genesis = params.genesis;
        Ok(Arc::new(Chain {
            params,
            state: ReentrantMutex::new(RefCell::new(ChainState {
                path,
                size,
                forkpoint: 0,
                forkpoint_hash: genesis,
                prev_hash: None,
                parent_key: None,
            })),
        }))
    }

    /// Instantiate a fork chain rooted at `forkpoint`, parented on
    /// `parent_key` (the parent's `forkpoint_hash` at the time of creation).
    pub fn fork_at(
        params: Arc<NetworkParams>,
        path: impl Into<PathBuf>,
        forkpoint: u32,
        forkpoint_hash: Hash256,
        prev_hash: Hash256,
        parent_key: Hash256,
    ) -> Result<Arc<Chain>> {
        let path = path.into();
        store::ensure_exists(&path)?;
        let size = store::size(&path)?;
        Ok(Arc::new(Chain {
            params,
            state: ReentrantMutex::new(RefCell::new(ChainState {
                path,
                size,
                forkpoint,
                forkpoint_hash,
                prev_hash: Some(prev_hash),
                parent_key: Some(parent_key),
            })),
        }))
    }

    pub fn path(&self) -> PathBuf {
        self.state.lock().borrow().path.clone()
    }

    pub fn forkpoint(&self) -> u32 {
        self.state.lock().borrow().forkpoint
    }

    pub fn forkpoint_hash(&self) -> Hash256 {
        self.state.lock().borrow().forkpoint_hash
    }

    pub fn prev_hash(&self) -> Option<Hash256> {
        self.state.lock().borrow().prev_hash
    }

    pub fn parent_key(&self) -> Option<Hash256> {
        self.state.lock().borrow().parent_key
    }

    /// Highest height this chain (including delegation to ancestors) has a
    /// record for.
    pub fn height(&self) -> u32 {
        let guard = self.state.lock();
        let s = guard.borrow();
        s.forkpoint + s.size.saturating_sub(1) as u32
    }

    pub fn size(&self) -> u64 {
        self.state.lock().borrow().size
    }

    fn update_size(&self) -> Result<()> {
        let guard = self.state.lock();
        let path = guard.borrow().path.clone();
        let size = store::size(&path)?;
        guard.borrow_mut().size = size;
        Ok(())
    }

    pub fn parent(&self, registry: &dyn ChainLookup) -> Option<Arc<Chain>> {
        self.parent_key().and_then(|k| registry.lookup(&k))
    }

    /// Read the decoded header at `height`, delegating to the parent chain
    /// for heights below this chain's forkpoint. `None` means an empty
    /// (all-zero, unwritten) slot within this chain's own range.
    pub fn read_header(&self, height: u32, registry: &dyn ChainLookup) -> Result<Option<Header>> {
        let (forkpoint, path) = {
            let guard = self.state.lock();
            let s = guard.borrow();
            (s.forkpoint, s.path.clone())
        };
        if height < forkpoint {
            return match self.parent(registry) {
                Some(parent) => parent.read_header(height, registry),
                None => Ok(None),
            };
        }
        let delta = (height - forkpoint) as u64;
        let record = match store::read_record(&path, delta)? {
            Some(r) => r,
            None => return Ok(None),
        };
        let unpadded = store::unpad_if_auxpow(&record, height, self.params.aux_pow_activation_height);
        let header = Header::decode(unpadded, height, self.params.aux_pow_activation_height)?;
        Ok(Some(header))
    }

    pub fn get_hash(&self, height: u32, registry: &dyn ChainLookup) -> Result<Hash256> {
        if height == 0 {
            return Ok(self.params.genesis);
        }
        if let Some(hash) = self.params.legacy_checkpoint_hash(height) {
            return Ok(hash);
        }
        if let Some((idx, is_last)) = self.params.dgw_checkpoint_sentinel(height) {
            let pair = &self.params.dgw_checkpoints[idx];
            return Ok(pair[if is_last { 1 } else { 0 }].hash);
        }
        match self.read_header(height, registry)? {
            Some(header) => {
                let bytes = header.encode();
                let algo = crate::hash::PoWAlgo::for_header(&self.params, height, header.version(), header.timestamp());
                crate::hash::hash_header(algo, &bytes)
            }
            None => Err(ChainError::MissingHeader(format!("no header at height {height}"))),
        }
    }

    pub fn check_hash(&self, height: u32, expected: Hash256, registry: &dyn ChainLookup) -> Result<bool> {
        Ok(self.get_hash(height, registry)? == expected)
    }

    /// The target a candidate header at `height` must satisfy, resolved by
    /// whichever retarget regime applies at that height, reading ancestors
    /// from this chain's own store (and, transitively, its parents).
    pub fn get_target(&self, height: u32, current_algo: crate::hash::PoWAlgo, registry: &dyn ChainLookup) -> Result<BigUint> {
        let source = ChainHeightSource { chain: self, registry };
        retarget::resolve_target(&self.params, height, current_algo, &source)
    }

    /// Whether `header` could be appended immediately after this chain's
    /// current tip. `check_height` additionally requires `header`'s own
    /// claimed height (as supplied by the caller) to equal `tip + 1`; a
    /// live `fork()` call passes `check_height = false` because the
    /// candidate may be destined for a different chain's tip.
    pub fn can_connect(&self, header: &Header, claimed_height: u32, registry: &dyn ChainLookup, check_height: bool) -> Result<bool> {
        if check_height && claimed_height != self.height() + 1 {
            return Ok(false);
        }
        if claimed_height == 0 {
            return Ok(false);
        }
        let prev_hash = self.get_hash(claimed_height - 1, registry)?;
        if prev_hash != header.prev_block_hash() {
            return Ok(false);
        }
        let algo = crate::hash::PoWAlgo::for_header(&self.params, claimed_height, header.version(), header.timestamp());
        let inside_checkpoints = claimed_height <= self.params.max_checkpoint();
        let (target, skip_bits) = if inside_checkpoints {
            (self.get_target(claimed_height, algo, registry)?, false)
        } else {
            (bits_to_target(header.bits())?, true)
        };
        match verify_header(&self.params, header, claimed_height, prev_hash, &target, None, skip_bits) {
            Ok(()) => Ok(true),
            Err(ChainError::InvalidHeader(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn header_at_tip(&self, registry: &dyn ChainLookup) -> Result<Option<Header>> {
        self.read_header(self.height(), registry)
    }

    /// Tip timestamp older than `max_age_secs` relative to `now` (unix
    /// seconds). Defaults to 8h in [`crate::manager::ChainManager`].
    pub fn is_tip_stale(&self, now: u64, max_age_secs: u64, registry: &dyn ChainLookup) -> Result<bool> {
        match self.header_at_tip(registry)? {
            Some(header) => Ok(now.saturating_sub(header.timestamp() as u64) > max_age_secs),
            None => Ok(true),
        }
    }

    /// Append one header at the current tip (`height() + 1`).
    pub fn save_header(&self, header: &Header, height: u32) -> Result<()> {
        let expected = self.height() + 1;
        if height != expected {
            return Err(ChainError::InvalidHeader(format!(
                "save_header: height {height} is not the next tip ({expected})"
            )));
        }
        let bytes = header.encode();
        let record = store::pad_for_storage(&bytes);
        let (forkpoint, path) = {
            let guard = self.state.lock();
            let s = guard.borrow();
            (s.forkpoint, s.path.clone())
        };
        let delta = (height - forkpoint) as u64;
        store::save_record(&path, delta, &record)?;
        self.update_size()
    }

    /// Append a chunk of already-encoded records (normalised to 120 bytes
    /// each beforehand by the caller, matching `save_chunk`'s
    /// `convert_to_kawpow_len`-equivalent step).
    pub fn save_chunk(&self, start_height: u32, records: &[[u8; EXTENDED_HEADER_SIZE]]) -> Result<()> {
        let (forkpoint, path, size) = {
            let guard = self.state.lock();
            let s = guard.borrow();
            (s.forkpoint, s.path.clone(), s.size)
        };
        if start_height != self.height() + 1 && !(start_height == forkpoint && size == 0) {
            return Err(ChainError::InvalidHeader(format!(
                "save_chunk: start height {start_height} does not continue this chain"
            )));
        }
        let base_delta = (start_height - forkpoint) as u64;
        for (i, record) in records.iter().enumerate() {
            store::save_record(&path, base_delta + i as u64, record)?;
        }
        self.update_size()
    }

    /// Read this chain's entire backing file as raw bytes - used only by
    /// the fork-swap file exchange in [`crate::manager::ChainManager`].
    pub(crate) fn read_all_records(&self) -> Result<Vec<u8>> {
        let path = self.path();
        store::read_all(&path)
    }

    /// Relabel this chain's identity and replace its backing file's
    /// contents in one step, called only by the chain manager under the
    /// registry lock during a reorg swap (spec.md Sec. 4.G
    /// `_swap_with_parent`). `new_path` becomes this chain's file from now
    /// on; `new_data` is written there in full, overwriting whatever was
    /// there before.
    pub(crate) fn swap_identity_and_contents(
        &self,
        new_forkpoint: u32,
        new_forkpoint_hash: Hash256,
        new_prev_hash: Option<Hash256>,
        new_parent_key: Option<Hash256>,
        new_path: PathBuf,
        new_data: &[u8],
    ) -> Result<()> {
        let guard = self.state.lock();
        store::write(&new_path, new_data, 0, true)?;
        let mut s = guard.borrow_mut();
        s.path = new_path;
        s.forkpoint = new_forkpoint;
        s.forkpoint_hash = new_forkpoint_hash;
        s.prev_hash = new_prev_hash;
        s.parent_key = new_parent_key;
        s.size = new_data.len() as u64 / EXTENDED_HEADER_SIZE as u64;
        Ok(())
    }

    /// Re-parent this chain onto a different `forkpoint_hash` key without
    /// touching its file or forkpoint - used when an old parent's
    /// non-swapped children are discovered to actually descend from the
    /// demoted side of a swap (spec.md Sec. 4.G "re-parent any direct
    /// children of the old parent that actually descend from the child").
    pub(crate) fn reparent(&self, new_parent_key: Hash256) {
        self.state.lock().borrow_mut().parent_key = Some(new_parent_key);
    }
}

/// Adapts a chain (plus the registry needed to walk past its forkpoint)
/// into the narrower view the retarget engines need.
struct ChainHeightSource<'a> {
    chain: &'a Chain,
    registry: &'a dyn ChainLookup,
}

impl HeightSource for ChainHeightSource<'_> {
    fn header_fields_at(&self, height: u32) -> Option<HeaderFields> {
        let header = self.chain.read_header(height, self.registry).ok()??;
        Some(HeaderFields { version: header.version(), timestamp: header.timestamp(), bits: header.bits() })
    }
}

/// `bits` implied by `target_to_bits(target)`, used by callers that need to
/// cross-check a recomputed target against a header's declared bits
/// without re-deriving the header itself.
pub fn bits_for_target(target: &BigUint) -> u32 {
    target_to_bits(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    pub(crate) struct TestRegistry(pub RwLock<HashMap<Hash256, Arc<Chain>>>);
    impl ChainLookup for TestRegistry {
        fn lookup(&self, key: &Hash256) -> Option<Arc<Chain>> {
            self.0.read().unwrap().get(key).cloned()
        }
    }

    fn legacy_header(prev: Hash256, bits: u32, nonce: u32) -> Header {
        Header::Legacy {
            version: 0,
            prev_block_hash: prev,
            merkle_root: Hash256::ZERO,
            timestamp: 0,
            bits,
            nonce,
        }
    }

    #[test]
    fn get_hash_at_legacy_checkpoint_boundary_returns_bundled_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = NetworkParams::mainnet();
        p.n_dgw_activation_block = 10_000;
        let pinned_hash = Hash256::from_hex(&"6".repeat(64)).unwrap();
        p.legacy_checkpoints = vec![(pinned_hash, bits_to_target(0x1d00ffff).unwrap())];
        let params = Arc::new(p);
        let chain = Chain::main(params, dir.path().join("blockchain_headers")).unwrap();
        let registry = TestRegistry(RwLock::new(HashMap::new()));

        assert_eq!(chain.get_hash(2015, &registry).unwrap(), pinned_hash);
    }

    #[test]
    fn get_hash_at_dgw_sentinel_returns_bundled_checkpoint_value() {
        // spec.md Sec. 8: "hash_at(h) over the DGW sentinel positions equals
        // the bundled DGW checkpoint value" - no record needs to be stored
        // at that height at all for this to hold.
        let dir = tempfile::tempdir().unwrap();
        let mut p = NetworkParams::mainnet();
        p.dgw_checkpoints_start = 2000;
        p.dgw_checkpoints_spacing = 10;
        let pinned_hash = Hash256::from_hex(&"7".repeat(64)).unwrap();
        p.dgw_checkpoints = vec![[
            crate::params::DgwCheckpoint { hash: pinned_hash, target: bits_to_target(0x1d00ffff).unwrap() },
            crate::params::DgwCheckpoint {
                hash: Hash256::from_hex(&"8".repeat(64)).unwrap(),
                target: bits_to_target(0x1c00ffff).unwrap(),
            },
        ]];
        let params = Arc::new(p);
        let chain = Chain::main(params, dir.path().join("blockchain_headers")).unwrap();
        let registry = TestRegistry(RwLock::new(HashMap::new()));

        assert_eq!(chain.get_hash(2000, &registry).unwrap(), pinned_hash);
    }

    #[test]
    fn genesis_only_chain_reports_height_zero() {
        let dir = tempfile::tempdir().unwrap();
        let params = Arc::new(NetworkParams::mainnet());
        let chain = Chain::main(params, dir.path().join("blockchain_headers")).unwrap();
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.size(), 0);
    }

    #[test]
    fn save_header_advances_height_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let params = Arc::new(NetworkParams::mainnet());
        let chain = Chain::main(params, dir.path().join("blockchain_headers")).unwrap();
        let registry = TestRegistry(RwLock::new(HashMap::new()));

        let genesis_hash = chain.get_hash(0, &registry).unwrap();
        let h1 = legacy_header(genesis_hash, 0x1d00ffff, 7);
        chain.save_header(&h1, 1).unwrap();
        assert_eq!(chain.height(), 1);

        let decoded = chain.read_header(1, &registry).unwrap().unwrap();
        assert_eq!(decoded, h1);
    }

    #[test]
    fn save_header_rejects_non_contiguous_height() {
        let dir = tempfile::tempdir().unwrap();
        let params = Arc::new(NetworkParams::mainnet());
        let chain = Chain::main(params, dir.path().join("blockchain_headers")).unwrap();
        let h5 = legacy_header(Hash256::ZERO, 0x1d00ffff, 0);
        assert!(chain.save_header(&h5, 5).is_err());
    }

    #[test]
    fn fork_chain_delegates_reads_below_forkpoint_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        let params = Arc::new(NetworkParams::mainnet());
        let main = Chain::main(params.clone(), dir.path().join("blockchain_headers")).unwrap();
        let registry = TestRegistry(RwLock::new(HashMap::new()));

        let genesis_hash = main.get_hash(0, &registry).unwrap();
        let h1 = legacy_header(genesis_hash, 0x1d00ffff, 1);
        main.save_header(&h1, 1).unwrap();
        let h1_hash = main.get_hash(1, &registry).unwrap();

        registry.0.write().unwrap().insert(main.forkpoint_hash(), main.clone());

        let fork = Chain::fork_at(
            params,
            dir.path().join("forks/fork2_2_x_y"),
            2,
            h1_hash,
            h1_hash,
            main.forkpoint_hash(),
        )
        .unwrap();
        let h2 = legacy_header(h1_hash, 0x1d00ffff, 2);
        fork.save_header(&h2, 2).unwrap();

        // height 1 isn't local to the fork; it must delegate to main.
        let delegated = fork.read_header(1, &registry).unwrap().unwrap();
        assert_eq!(delegated, h1);
    }

    #[test]
    fn swap_identity_and_contents_relabels_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let params = Arc::new(NetworkParams::mainnet());
        let chain = Chain::fork_at(
            params,
            dir.path().join("forks/fork2_5_a_b"),
            5,
            Hash256::from_hex(&"1".repeat(64)).unwrap(),
            Hash256::ZERO,
            Hash256::from_hex(&"2".repeat(64)).unwrap(),
        )
        .unwrap();

        let new_hash = Hash256::from_hex(&"3".repeat(64)).unwrap();
        let new_path = dir.path().join("blockchain_headers");
        let data = vec![0u8; EXTENDED_HEADER_SIZE * 3];
        chain
            .swap_identity_and_contents(0, new_hash, None, None, new_path.clone(), &data)
            .unwrap();

        assert_eq!(chain.forkpoint(), 0);
        assert_eq!(chain.forkpoint_hash(), new_hash);
        assert_eq!(chain.parent_key(), None);
        assert_eq!(chain.path(), new_path);
        assert_eq!(chain.size(), 3);
    }
}
