use crate::{
    keys,
    kv::RocksKv,
    recent::{decode_block, RecentCursor},
    KeyValueStore, ProviderError,
};
use gethdata_freezer::{FreezerIterator, FreezerStore};
use gethdata_primitives::Block;
use std::path::Path;
use tracing::debug;

/// Read-only access to both storage tiers of a chain-data directory.
///
/// The store owns its file and database handles for its lifetime; dropping
/// it releases everything.
#[derive(Debug)]
pub struct Store<KV = RocksKv> {
    kv: KV,
    freezer: FreezerStore,
}

impl Store<RocksKv> {
    /// Opens the chain-data directory at `path`: the key-value store at the
    /// root, the freezer under `ancient/chain`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let kv = RocksKv::open(path)?;
        let freezer = FreezerStore::open(&path.join("ancient/chain"))?;
        Self::new(kv, freezer)
    }
}

impl<KV: KeyValueStore> Store<KV> {
    /// Builds a store from already opened tiers.
    ///
    /// The tiers must meet: the first block past the freezer has to be
    /// readable from the key-value tier, otherwise iteration would hit a
    /// gap at the frontier.
    pub fn new(kv: KV, freezer: FreezerStore) -> Result<Self, ProviderError> {
        let frontier = freezer.last_num();
        if decode_block(&kv, frontier)?.is_none() {
            return Err(ProviderError::BlockNotFound(frontier))
        }
        debug!(target: "provider", last_ancient = frontier, "Opened store");
        Ok(Self { kv, freezer })
    }

    /// One past the highest block held by the freezer; the height at which
    /// iteration switches to the key-value tier.
    pub fn last_ancient_number(&self) -> u64 {
        self.freezer.last_num()
    }

    /// Height of the current chain head, if the key-value tier records one.
    pub fn head_block_number(&self) -> Result<Option<u64>, ProviderError> {
        let Some(hash) = self.kv.get(keys::HEAD_BLOCK_KEY)? else { return Ok(None) };
        if hash.len() != 32 {
            return Err(ProviderError::UnexpectedHashLength(hash.len()))
        }
        let Some(raw) = self.kv.get(&keys::header_number_key(&hash))? else { return Ok(None) };
        let number: [u8; 8] = raw
            .as_slice()
            .try_into()
            .map_err(|_| ProviderError::UnexpectedNumberLength(raw.len()))?;
        Ok(Some(u64::from_be_bytes(number)))
    }

    /// Returns an iterator positioned at block 0.
    ///
    /// Iterators hold only cursor positions, so several of them can read
    /// the same store independently.
    pub fn iterator(&self) -> BlockIterator<'_, KV> {
        BlockIterator {
            store: self,
            number: 0,
            last_ancient: self.freezer.last_num(),
            cursor: None,
            pending: None,
        }
    }
}

/// The tier a [`BlockIterator`] is currently reading from.
#[derive(Debug)]
enum TierCursor<'a, KV> {
    Ancient(FreezerIterator<'a>),
    Recent(RecentCursor<'a, KV>),
}

/// Forward iterator over fully decoded blocks, in ascending order from the
/// seek point.
///
/// A `next` that fails returns `false` and hands the error to the
/// following `value` call; a clean `false` means the stream is exhausted.
/// Corrupt records are never skipped.
#[derive(Debug)]
pub struct BlockIterator<'a, KV> {
    store: &'a Store<KV>,
    /// Height the next `next` call will produce.
    number: u64,
    last_ancient: u64,
    cursor: Option<TierCursor<'a, KV>>,
    pending: Option<ProviderError>,
}

impl<'a, KV: KeyValueStore> BlockIterator<'a, KV> {
    /// Repositions the iterator so that the following `next` yields block
    /// `num`. Any live tier cursor is discarded.
    pub fn seek(&mut self, num: u64) {
        self.number = num;
        self.cursor = None;
        self.pending = None;
    }

    /// Advances to the next block.
    pub fn next(&mut self) -> bool {
        if self.number >= self.last_ancient {
            // from the frontier onward blocks come from the key-value
            // tier; once entered there is no way back
            if !matches!(self.cursor, Some(TierCursor::Recent(_))) {
                self.cursor =
                    Some(TierCursor::Recent(RecentCursor::new(&self.store.kv, self.number)));
            }
            self.number += 1;
            let Some(TierCursor::Recent(cursor)) = self.cursor.as_mut() else { unreachable!() };
            match cursor.next() {
                Ok(advanced) => advanced,
                Err(err) => {
                    self.pending = Some(err);
                    false
                }
            }
        } else {
            if !matches!(self.cursor, Some(TierCursor::Ancient(_))) {
                match self.store.freezer.iter(self.number) {
                    Ok(iter) => self.cursor = Some(TierCursor::Ancient(iter)),
                    Err(err) => {
                        self.pending = Some(err.into());
                        return false
                    }
                }
            }
            self.number += 1;
            let Some(TierCursor::Ancient(cursor)) = self.cursor.as_mut() else { unreachable!() };
            match cursor.next() {
                Ok(advanced) => advanced,
                Err(err) => {
                    self.pending = Some(err.into());
                    false
                }
            }
        }
    }

    /// The block produced by the last successful `next`, or the error that
    /// stopped iteration.
    pub fn value(&mut self) -> Result<Block, ProviderError> {
        if let Some(err) = self.pending.take() {
            return Err(err)
        }
        match &self.cursor {
            Some(TierCursor::Ancient(cursor)) => Ok(cursor.value()?),
            Some(TierCursor::Recent(cursor)) => cursor.value(),
            None => Err(ProviderError::NoValue),
        }
    }
}
