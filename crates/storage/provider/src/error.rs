use gethdata_freezer::FreezerError;
use thiserror::Error;

/// Errors produced while opening a store or iterating blocks.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Freezer(#[from] FreezerError),
    #[error(transparent)]
    Decode(#[from] alloy_rlp::Error),
    #[error("key-value store error: {0}")]
    Database(String),
    #[error("stored hash has length {0}, expected 32")]
    UnexpectedHashLength(usize),
    #[error("head block number has length {0}, expected 8")]
    UnexpectedNumberLength(usize),
    #[error("block has {transactions} transactions but {receipts} receipts")]
    TransactionReceiptMismatch { transactions: usize, receipts: usize },
    #[error("block {0} is missing from the recent tier")]
    BlockNotFound(u64),
    #[error("iterator has no current value")]
    NoValue,
}
