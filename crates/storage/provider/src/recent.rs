use crate::{keys, KeyValueStore, ProviderError};
use gethdata_primitives::{decode_exact, Block, Body, Header, Receipt};

/// Decodes block `number` from the recent tier.
///
/// Resolves the canonical hash for the height, fetches the three keyed
/// records and cross-checks them. `Ok(None)` means the height is not fully
/// present, which past the chain head is the expected outcome.
pub(crate) fn decode_block<KV: KeyValueStore>(
    kv: &KV,
    number: u64,
) -> Result<Option<Block>, ProviderError> {
    let Some(hash) = kv.get(&keys::header_hash_key(number))? else { return Ok(None) };
    if hash.len() != 32 {
        return Err(ProviderError::UnexpectedHashLength(hash.len()))
    }

    let Some(header_raw) = kv.get(&keys::header_key(number, &hash))? else { return Ok(None) };
    let Some(body_raw) = kv.get(&keys::block_body_key(number, &hash))? else { return Ok(None) };
    let Some(receipts_raw) = kv.get(&keys::block_receipts_key(number, &hash))? else {
        return Ok(None)
    };

    let header: Header = decode_exact(&header_raw)?;
    let body: Body = decode_exact(&body_raw)?;
    let receipts: Vec<Receipt> = decode_exact(&receipts_raw)?;

    if body.transactions.len() != receipts.len() {
        return Err(ProviderError::TransactionReceiptMismatch {
            transactions: body.transactions.len(),
            receipts: receipts.len(),
        })
    }

    Ok(Some(Block { number: header.number, header, body, receipts }))
}

/// Cursor over the recent tier: plain keyed lookups at ascending heights.
#[derive(Debug)]
pub(crate) struct RecentCursor<'a, KV> {
    kv: &'a KV,
    number: u64,
    block: Option<Block>,
}

impl<'a, KV: KeyValueStore> RecentCursor<'a, KV> {
    pub(crate) fn new(kv: &'a KV, number: u64) -> Self {
        Self { kv, number, block: None }
    }

    /// Advances to the next height. `Ok(false)` means the height is absent,
    /// the expected condition at the chain tip.
    pub(crate) fn next(&mut self) -> Result<bool, ProviderError> {
        match decode_block(self.kv, self.number)? {
            Some(block) => {
                self.block = Some(block);
                self.number += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The block produced by the last successful `next`.
    pub(crate) fn value(&self) -> Result<Block, ProviderError> {
        self.block.clone().ok_or(ProviderError::NoValue)
    }
}
