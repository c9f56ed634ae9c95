//! Chain manager: the registry of chains, startup recovery, chunk ingest,
//! fork creation and swap, and the query surface external callers see.
//!
//! A chain only knows its own records and, by key, its parent. Everything
//! that needs to reason about the *forest* - which chain is best, which
//! chains contain a given (height, hash), whether a child has outgrown its
//! parent - lives here, one level up, exactly the seam `blockchain.py`
//! draws between a `Blockchain` instance and the module-level
//! `blockchains` dict plus `blockchains_lock`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use num_bigint::BigUint;
use parking_lot::RwLock;

use crate::chain::{Chain, ChainLookup};
use crate::error::{ChainError, Result};
use crate::hash::PoWAlgo;
use crate::hash256::Hash256;
use crate::header::{wire_len_for, Header, EXTENDED_HEADER_SIZE};
use crate::params::NetworkParams;
use crate::retarget::{self, HeaderFields, HeightSource};
use crate::store;
use crate::target::{bits_to_target, chain_work_of_target};
use crate::verify::verify_header;

/// Tip older than this is considered stale by [`ChainManager::is_tip_stale`]
/// unless the caller overrides it.
pub const DEFAULT_MAX_TIP_AGE_SECS: u64 = 8 * 60 * 60;

/// Process-wide cache of cumulative chain-work up to a hash, filled at
/// 2016-block boundaries (the same cadence as a legacy checkpoint chunk).
/// Idempotent: two concurrent fills of the same key compute the same value,
/// so it is safe to recompute on contention rather than block.
struct ChainWorkCache {
    entries: RwLock<HashMap<Hash256, BigUint>>,
}

impl ChainWorkCache {
    fn new() -> Self {
        ChainWorkCache { entries: RwLock::new(HashMap::new()) }
    }

    fn get(&self, hash: &Hash256) -> Option<BigUint> {
        self.entries.read().get(hash).cloned()
    }

    fn insert(&self, hash: Hash256, work: BigUint) {
        self.entries.write().insert(hash, work);
    }
}

fn is_chunk_boundary(height: u32) -> bool {
    (height + 1) % 2016 == 0
}

pub struct ChainManager {
    pub params: Arc<NetworkParams>,
    headers_dir: PathBuf,
    registry: RwLock<HashMap<Hash256, Arc<Chain>>>,
    main_key: RwLock<Hash256>,
    work_cache: ChainWorkCache,
}

impl ChainLookup for ChainManager {
    fn lookup(&self, forkpoint_hash: &Hash256) -> Option<Arc<Chain>> {
        self.registry.read().get(forkpoint_hash).cloned()
    }
}

impl ChainManager {
    /// Instantiate the main chain under `headers_dir`, recover it from a
    /// truncated/corrupt tail if needed, then load and validate any forks
    /// found in `headers_dir/forks`.
    pub fn open(params: Arc<NetworkParams>, headers_dir: impl Into<PathBuf>) -> Result<Arc<ChainManager>> {
        let headers_dir = headers_dir.into();
        log::info!("opening {} header chain at {}", params.name, headers_dir.display());
        std::fs::create_dir_all(&headers_dir)?;
        let main_path = headers_dir.join("blockchain_headers");
        let main = Chain::main(params.clone(), main_path)?;

        let manager = Arc::new(ChainManager {
            params: params.clone(),
            headers_dir,
            registry: RwLock::new(HashMap::new()),
            main_key: RwLock::new(main.forkpoint_hash()),
            work_cache: ChainWorkCache::new(),
        });
        manager.registry.write().insert(main.forkpoint_hash(), main.clone());

        manager.recover_main_chain(&main)?;
        manager.load_forks()?;
        Ok(manager)
    }

    pub fn main_chain(&self) -> Arc<Chain> {
        let key = *self.main_key.read();
        self.lookup(&key).expect("main chain is always registered")
    }

    /// If the chain's highest stored header is past the checkpoint horizon
    /// but the first header past that horizon fails to connect, the tail is
    /// corrupt: wipe it and restart from genesis rather than trust a
    /// partially-written file.
    fn recover_main_chain(&self, main: &Arc<Chain>) -> Result<()> {
        let max_checkpoint = self.params.max_checkpoint();
        if main.height() <= max_checkpoint {
            return Ok(());
        }
        let probe_height = max_checkpoint + 1;
        let probe_header = match main.read_header(probe_height, self) {
            Ok(Some(h)) => h,
            _ => {
                self.reset_main_chain(main)?;
                return Ok(());
            }
        };
        let connects = main.can_connect(&probe_header, probe_height, self, false).unwrap_or(false);
        if !connects {
            log::warn!("main chain tail past checkpoint {max_checkpoint} does not connect; resetting");
            self.reset_main_chain(main)?;
        }
        Ok(())
    }

    fn reset_main_chain(&self, main: &Arc<Chain>) -> Result<()> {
        let genesis = self.params.genesis;
        let path = main.path();
        main.swap_identity_and_contents(0, genesis, None, None, path, &[])
    }

    /// Enumerate `forks/fork2_*`, sorted by forkpoint ascending so a parent
    /// is always instantiated before any child that might reference it.
    fn load_forks(&self) -> Result<()> {
        let forks_dir = self.headers_dir.join("forks");
        if !forks_dir.exists() {
            return Ok(());
        }
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(&forks_dir)? {
            let entry = entry?;
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if let Some(parsed) = parse_fork_filename(name) {
                    candidates.push((parsed.0, parsed.1, parsed.2, path));
                }
            }
        }
        candidates.sort_by_key(|(forkpoint, ..)| *forkpoint);

        let max_checkpoint = self.params.max_checkpoint();
        for (forkpoint, prev_hash, first_hash, path) in candidates {
            if forkpoint <= max_checkpoint {
                let _ = std::fs::remove_file(&path);
                continue;
            }
            let parent = self
                .registry
                .read()
                .values()
                .find(|c| c.check_hash(forkpoint.saturating_sub(1), prev_hash, self).unwrap_or(false))
                .cloned();
            let parent = match parent {
                Some(p) => p,
                None => {
                    let _ = std::fs::remove_file(&path);
                    continue;
                }
            };
            let fork = match Chain::fork_at(self.params.clone(), path.clone(), forkpoint, first_hash, prev_hash, parent.forkpoint_hash()) {
                Ok(c) => c,
                Err(_) => {
                    let _ = std::fs::remove_file(&path);
                    continue;
                }
            };
            let first_record = match fork.read_header(forkpoint, self) {
                Ok(Some(h)) => h,
                _ => {
                    let _ = std::fs::remove_file(&path);
                    continue;
                }
            };
            let computed_first = match fork.get_hash(forkpoint, self) {
                Ok(h) => h,
                Err(_) => {
                    let _ = std::fs::remove_file(&path);
                    continue;
                }
            };
            if computed_first != first_hash {
                let _ = std::fs::remove_file(&path);
                continue;
            }
            if !parent.can_connect(&first_record, forkpoint, self, false).unwrap_or(false) {
                let _ = std::fs::remove_file(&path);
                continue;
            }
            self.registry.write().insert(fork.forkpoint_hash(), fork);
        }
        Ok(())
    }

    /// Verify `bytes` (a concatenation of length-prefix-free records
    /// starting at height `start`) against `chain`, and on success persist
    /// them. Returns `Ok(false)` - never an error - for any verification
    /// failure, matching the spec's "false means rejected, not an I/O
    /// problem" contract; propagates genuine I/O/lookup failures as `Err`.
    pub fn connect_chunk(&self, chain: &Arc<Chain>, start: u32, bytes: &[u8]) -> Result<bool> {
        match self.verify_chunk(chain, start, bytes) {
            Ok(records) => {
                chain.save_chunk(start, &records)?;
                self.maybe_swap(chain)?;
                Ok(true)
            }
            Err(ChainError::InvalidHeader(reason)) => {
                log::warn!("chunk at height {start} rejected: {reason}");
                Ok(false)
            }
            Err(ChainError::Codec(reason)) => {
                log::warn!("chunk at height {start} malformed: {reason}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn verify_chunk(&self, chain: &Arc<Chain>, start: u32, bytes: &[u8]) -> Result<Vec<[u8; EXTENDED_HEADER_SIZE]>> {
        let params = &self.params;
        let mut decoded: Vec<Header> = Vec::new();
        let mut offset = 0usize;
        let mut height = start;
        while offset < bytes.len() {
            if offset + 4 > bytes.len() {
                return Err(ChainError::Codec("truncated record before version field".into()));
            }
            let version = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
            let len = wire_len_for(params, height, version);
            if offset + len > bytes.len() {
                return Err(ChainError::Codec("truncated record body".into()));
            }
            let header = Header::decode(&bytes[offset..offset + len], height, params.aux_pow_activation_height)?;
            decoded.push(header);
            offset += len;
            height += 1;
        }

        if decoded.is_empty() {
            return Err(ChainError::Codec("empty chunk".into()));
        }

        // Within the DGW checkpoint range a chunk must be exactly one
        // checkpoint window, starting on a spacing boundary.
        if start >= params.dgw_checkpoints_start && start <= params.max_checkpoint() {
            if (start - params.dgw_checkpoints_start) % params.dgw_checkpoints_spacing != 0 {
                return Err(ChainError::InvalidHeader("dgw chunk does not start on a spacing boundary".into()));
            }
            if decoded.len() as u32 != params.dgw_checkpoints_spacing {
                return Err(ChainError::InvalidHeader("dgw chunk not correct size".into()));
            }
        }

        let source = ChunkHeightSource { chain, registry: self, start, headers: &decoded };
        let mut prev_hash = chain.get_hash(start - 1, self)?;
        let mut records = Vec::with_capacity(decoded.len());

        for (i, header) in decoded.iter().enumerate() {
            let h = start + i as u32;
            let algo = PoWAlgo::for_header(params, h, header.version(), header.timestamp());
            let inside_checkpoints = h <= params.max_checkpoint();
            let (target, skip_bits) = if inside_checkpoints {
                (retarget::resolve_target(params, h, algo, &source)?, false)
            } else {
                (bits_to_target(header.bits())?, true)
            };
            verify_header(params, header, h, prev_hash, &target, None, skip_bits)?;
            records.push(store::pad_for_storage(&header.encode()));

            // Past the checkpoint horizon, the next record's own declared
            // prev_block_hash is trusted as this record's hash rather than
            // re-deriving it with a PoW hash - the whole point of sampling
            // is to not pay for that hash on skipped heights.
            prev_hash = match decoded.get(i + 1) {
                Some(next) => next.prev_block_hash(),
                None => prev_hash,
            };
        }
        Ok(records)
    }

    /// `fork(header)`: parent must already accept `header` as a valid
    /// successor (ignoring height, since it is destined for a new chain,
    /// not the parent's own tip).
    pub fn fork(&self, parent: &Arc<Chain>, header: &Header, height: u32) -> Result<Arc<Chain>> {
        if !parent.can_connect(header, height, self, false)? {
            return Err(ChainError::InvalidHeader("fork: header does not connect to parent".into()));
        }
        let first_hash = crate::verify::compute_header_hash(&self.params, header, height)?;
        let prev_hash = header.prev_block_hash();
        let forks_dir = self.headers_dir.join("forks");
        std::fs::create_dir_all(&forks_dir)?;
        let path = forks_dir.join(fork_filename(height, prev_hash, first_hash));
        store::write(&path, &[], 0, true)?;

        let fork = Chain::fork_at(self.params.clone(), path, height, first_hash, prev_hash, parent.forkpoint_hash())?;
        fork.save_header(header, height)?;
        self.registry.write().insert(fork.forkpoint_hash(), fork.clone());
        Ok(fork)
    }

    /// Run `swap_with_parent` repeatedly while `chain`'s cumulative work
    /// exceeds its parent's, bounded by the registry size so pathological
    /// data cannot loop forever.
    pub fn maybe_swap(&self, chain: &Arc<Chain>) -> Result<()> {
        let bound = self.registry.read().len().max(1);
        let mut current = chain.clone();
        for _ in 0..bound {
            let parent = match current.parent(self) {
                Some(p) => p,
                None => break,
            };
            let child_work = self.chain_work(&current)?;
            let parent_work = self.chain_work(&parent)?;
            if child_work <= parent_work {
                break;
            }
            self.execute_swap(&current, &parent)?;
            // `current` has inherited the parent's identity/file; keep
            // checking one level further up in case the win cascades.
        }
        Ok(())
    }

    /// Exchange `child` and `parent`'s identities and backing files in
    /// place: `child` takes over `parent`'s filename, forkpoint and
    /// `forkpoint_hash`; `parent` is demoted to a fork rooted at `child`'s
    /// old forkpoint, keeping only the tail of data it had there (its
    /// losing, now-divergent branch).
    ///
    /// Simplified relative to a literal byte-for-byte transcription of
    /// read/write/rename: both chains' full state is recomputed from their
    /// in-memory record buffers and written out under
    /// `swap_identity_and_contents` in one step per chain, under each
    /// chain's own lock plus the registry lock, rather than via an
    /// intermediate on-disk rename dance. See DESIGN.md.
    fn execute_swap(&self, child: &Arc<Chain>, parent: &Arc<Chain>) -> Result<()> {
        let child_forkpoint = child.forkpoint();
        let parent_forkpoint = parent.forkpoint();
        let child_size = child.size();

        let child_data = child.read_all_records()?;
        let parent_data = parent.read_all_records()?;
        let record_size = EXTENDED_HEADER_SIZE as u64;

        let tail_start = ((child_forkpoint - parent_forkpoint) as u64 * record_size) as usize;
        let tail_len = (child_size * record_size) as usize;
        let tail_end = (tail_start + tail_len).min(parent_data.len());
        let parent_losing_tail = parent_data.get(tail_start.min(parent_data.len())..tail_end).unwrap_or(&[]).to_vec();
        let parent_head = parent_data.get(..tail_start.min(parent_data.len())).unwrap_or(&[]).to_vec();

        let old_parent_key = parent.forkpoint_hash();
        let old_child_key = child.forkpoint_hash();
        let old_parent_path = parent.path();
        let old_child_path = child.path();

        let mut new_main_data = parent_head;
        new_main_data.extend_from_slice(&child_data);

        let was_main = *self.main_key.read() == old_parent_key;

        // The demoted chain's forkpoint_hash is NOT the winning fork's old
        // identity - it has to be re-derived from the first record of the
        // *losing* tail now assigned to it (spec.md Sec. 9: "the
        // `_swap_with_parent` re-computation of `parent._forkpoint_hash`
        // ... hashes the first record of the block of data just assigned to
        // the parent"). Falls back to the old key only when there is no
        // losing tail at all (the demoted chain becomes an empty stub).
        let demoted_forkpoint_hash = match parent_losing_tail.get(..EXTENDED_HEADER_SIZE) {
            Some(first_record) => {
                let record: [u8; EXTENDED_HEADER_SIZE] =
                    first_record.try_into().expect("slice is exactly one record");
                let unpadded = store::unpad_if_auxpow(&record, child_forkpoint, self.params.aux_pow_activation_height);
                let header = Header::decode(unpadded, child_forkpoint, self.params.aux_pow_activation_height)?;
                let algo = PoWAlgo::for_header(&self.params, child_forkpoint, header.version(), header.timestamp());
                crate::hash::hash_header(algo, &header.encode())?
            }
            None => old_child_key,
        };

        child.swap_identity_and_contents(
            parent_forkpoint,
            old_parent_key,
            parent.prev_hash(),
            parent.parent_key(),
            old_parent_path,
            &new_main_data,
        )?;
        parent.swap_identity_and_contents(
            child_forkpoint,
            demoted_forkpoint_hash,
            child.prev_hash(),
            Some(old_parent_key),
            old_child_path,
            &parent_losing_tail,
        )?;

        {
            let mut reg = self.registry.write();
            reg.remove(&old_parent_key);
            reg.remove(&old_child_key);
            reg.insert(child.forkpoint_hash(), child.clone());
            reg.insert(parent.forkpoint_hash(), parent.clone());

            for other in reg.values() {
                if Arc::ptr_eq(other, child) || Arc::ptr_eq(other, parent) {
                    continue;
                }
                if other.parent_key() == Some(old_parent_key) {
                    // still genuinely parented above the swap point belongs
                    // with whichever side now owns that forkpoint_hash;
                    // both sides keep the same key set, so only chains
                    // actually rooted past the divergence need re-pointing
                    // onto the demoted chain's new key.
                    if other.forkpoint() >= child_forkpoint {
                        other.reparent(parent.forkpoint_hash());
                    }
                }
            }
        }

        if was_main {
            *self.main_key.write() = child.forkpoint_hash();
        }
        Ok(())
    }

    /// Cumulative proof-of-work from genesis up to `chain`'s current tip,
    /// served from the 2016-boundary cache where possible and summed
    /// forward from the nearest cached ancestor otherwise.
    pub fn chain_work(&self, chain: &Arc<Chain>) -> Result<BigUint> {
        self.chain_work_at(chain, chain.height())
    }

    fn chain_work_at(&self, chain: &Arc<Chain>, height: u32) -> Result<BigUint> {
        let (mut from_height, mut work) = self.nearest_cached_ancestor(chain, height)?;
        while from_height < height {
            from_height += 1;
            let header = chain
                .read_header(from_height, self)?
                .ok_or_else(|| ChainError::MissingHeader(format!("chain work: missing header at {from_height}")))?;
            let target = bits_to_target(header.bits())?;
            work += chain_work_of_target(&target);
            if is_chunk_boundary(from_height) {
                let hash = chain.get_hash(from_height, self)?;
                self.work_cache.insert(hash, work.clone());
            }
        }
        Ok(work)
    }

    /// Walk backward in 2016-block strides from `height` looking for a
    /// cached entry, falling back to genesis (defined as the work of one
    /// block at `MAX_TARGET`) if nothing is cached yet.
    fn nearest_cached_ancestor(&self, chain: &Arc<Chain>, height: u32) -> Result<(u32, BigUint)> {
        if height == 0 {
            return Ok((0, chain_work_of_target(&crate::target::MAX_TARGET)));
        }
        let mut boundary = height.checked_sub((height + 1) % 2016).unwrap_or(0);
        loop {
            if boundary == 0 {
                return Ok((0, chain_work_of_target(&crate::target::MAX_TARGET)));
            }
            let hash = chain.get_hash(boundary, self)?;
            if let Some(work) = self.work_cache.get(&hash) {
                return Ok((boundary, work));
            }
            if boundary < 2016 {
                return Ok((0, chain_work_of_target(&crate::target::MAX_TARGET)));
            }
            boundary -= 2016;
        }
    }

    /// `-1` is encoded as any negative height; callers pass `-1` for "the
    /// virtual parent of genesis".
    pub fn hash_at(&self, chain: &Arc<Chain>, height: i64) -> Result<Hash256> {
        if height < 0 {
            return Ok(Hash256::ZERO);
        }
        if height == 0 {
            return Ok(self.params.genesis);
        }
        chain.get_hash(height as u32, self)
    }

    pub fn header_at(&self, chain: &Arc<Chain>, height: u32) -> Result<Option<Header>> {
        chain.read_header(height, self)
    }

    pub fn height(&self, chain: &Arc<Chain>) -> u32 {
        chain.height()
    }

    pub fn header_at_tip(&self, chain: &Arc<Chain>) -> Result<Option<Header>> {
        chain.header_at_tip(self)
    }

    pub fn is_tip_stale(&self, chain: &Arc<Chain>) -> Result<bool> {
        self.is_tip_stale_at(chain, now_unix(), DEFAULT_MAX_TIP_AGE_SECS)
    }

    pub fn is_tip_stale_at(&self, chain: &Arc<Chain>, now: u64, max_age_secs: u64) -> Result<bool> {
        chain.is_tip_stale(now, max_age_secs, self)
    }

    pub fn can_connect(&self, chain: &Arc<Chain>, header: &Header, height: u32) -> Result<bool> {
        chain.can_connect(header, height, self, true)
    }

    /// Chains, across the whole registry, that have a record at `height`
    /// whose hash is `hash`. Sorted by cumulative work, richest first.
    pub fn get_chains_that_contain(&self, height: u32, hash: Hash256) -> Result<Vec<Arc<Chain>>> {
        let candidates: Vec<Arc<Chain>> = self
            .registry
            .read()
            .values()
            .filter(|c| c.height() >= height)
            .cloned()
            .collect();

        let mut with_work = Vec::new();
        for chain in candidates {
            if chain.get_hash(height, self).ok() == Some(hash) {
                let work = self.chain_work(&chain)?;
                with_work.push((work, chain));
            }
        }
        with_work.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(with_work.into_iter().map(|(_, c)| c).collect())
    }

    /// The chain whose current tip equals `header`'s declared
    /// `prev_block_hash`, if any - i.e. the chain `header` could extend.
    pub fn check_header(&self, header: &Header) -> Result<Option<Arc<Chain>>> {
        let prev = header.prev_block_hash();
        for chain in self.registry.read().values() {
            if chain.get_hash(chain.height(), self).ok() == Some(prev) {
                return Ok(Some(chain.clone()));
            }
        }
        Ok(None)
    }

    /// The chain with the greatest cumulative chain-work in the registry.
    pub fn get_best_chain(&self) -> Result<Arc<Chain>> {
        let chains: Vec<Arc<Chain>> = self.registry.read().values().cloned().collect();
        let mut best: Option<(BigUint, Arc<Chain>)> = None;
        for chain in chains {
            let work = self.chain_work(&chain)?;
            best = match best {
                Some((best_work, best_chain)) if best_work >= work => Some((best_work, best_chain)),
                _ => Some((work, chain)),
            };
        }
        best.map(|(_, c)| c).ok_or_else(|| ChainError::MissingHeader("registry is empty".into()))
    }

    /// `(hash, target)` pairs for every completed 2016-block chunk beyond
    /// the network's built-in `legacy_checkpoints`, up to `chain`'s tip -
    /// the data a caller would bundle as new hard checkpoints once it has
    /// synced past them. Production only; what a caller does with the
    /// result (persisting it, shipping it to other clients) is its concern.
    pub fn checkpoints_through_tip(&self, chain: &Arc<Chain>) -> Result<Vec<(Hash256, BigUint)>> {
        let tip = chain.height();
        let mut out = Vec::new();
        let mut index = self.params.legacy_checkpoints.len() as u32;
        loop {
            let height = index * 2016 + 2015;
            if height > tip {
                break;
            }
            let hash = chain.get_hash(height, self)?;
            let header = chain
                .read_header(height, self)?
                .ok_or_else(|| ChainError::MissingHeader(format!("checkpoint: missing header at {height}")))?;
            let algo = PoWAlgo::for_header(&self.params, height, header.version(), header.timestamp());
            let target = chain.get_target(height, algo, self)?;
            out.push((hash, target));
            index += 1;
        }
        Ok(out)
    }
}

/// Adapts a not-yet-committed chunk (plus the chain it will be appended to)
/// into a [`HeightSource`]: heights below the chunk's start height read
/// through the chain's own store; heights inside the chunk read the
/// in-memory decoded headers.
struct ChunkHeightSource<'a> {
    chain: &'a Arc<Chain>,
    registry: &'a ChainManager,
    start: u32,
    headers: &'a [Header],
}

impl HeightSource for ChunkHeightSource<'_> {
    fn header_fields_at(&self, height: u32) -> Option<HeaderFields> {
        if height < self.start {
            let header = self.chain.read_header(height, self.registry).ok()??;
            return Some(HeaderFields { version: header.version(), timestamp: header.timestamp(), bits: header.bits() });
        }
        let idx = (height - self.start) as usize;
        self.headers.get(idx).map(|h| HeaderFields { version: h.version(), timestamp: h.timestamp(), bits: h.bits() })
    }
}

fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// `forks/fork2_<forkpoint>_<prev_hash>_<first_hash>`, hashes hex without
/// leading zeros.
fn fork_filename(forkpoint: u32, prev_hash: Hash256, first_hash: Hash256) -> String {
    format!("fork2_{}_{}_{}", forkpoint, strip_leading_zeros(&prev_hash.to_hex()), strip_leading_zeros(&first_hash.to_hex()))
}

fn parse_fork_filename(name: &str) -> Option<(u32, Hash256, Hash256)> {
    let rest = name.strip_prefix("fork2_")?;
    let mut parts = rest.splitn(3, '_');
    let forkpoint: u32 = parts.next()?.parse().ok()?;
    let prev_hash = Hash256::from_hex(&pad_hex(parts.next()?)).ok()?;
    let first_hash = Hash256::from_hex(&pad_hex(parts.next()?)).ok()?;
    Some((forkpoint, prev_hash, first_hash))
}

fn strip_leading_zeros(hex: &str) -> String {
    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn pad_hex(s: &str) -> String {
    if s.len() >= 64 {
        s.to_string()
    } else {
        format!("{}{}", "0".repeat(64 - s.len()), s)
    }
}
