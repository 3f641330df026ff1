use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while opening or reading freezer tables.
#[derive(Error, Debug)]
pub enum FreezerError {
    #[error("freezer table {0} not found")]
    MissingTable(String),
    #[error("freezer table {0} has both a compressed and a raw index")]
    AmbiguousIndex(String),
    #[error("index size {0} is not a positive multiple of the entry size")]
    InvalidIndexSize(u64),
    #[error("missing data file: {0}")]
    MissingDataFile(PathBuf),
    #[error("index entry {0} is out of bounds")]
    IndexOutOfBounds(u64),
    #[error("record references unopened data file {0}")]
    UnknownDataFile(u16),
    #[error("record spans {start}..{end}, past the end of data file {file_num}")]
    RecordOutOfBounds { file_num: u16, start: u64, end: u64 },
    #[error("index offsets decrease at entry {0}")]
    NonMonotonicIndex(u64),
    #[error("record of {0} decoded bytes exceeds the per-record cap")]
    RecordTooLarge(usize),
    #[error("freezer tables disagree on item count: {headers} headers, {got} {table}")]
    ItemCountMismatch { table: &'static str, headers: u64, got: u64 },
    #[error("block has {transactions} transactions but {receipts} receipts")]
    TransactionReceiptMismatch { transactions: usize, receipts: usize },
    #[error(transparent)]
    Decode(#[from] alloy_rlp::Error),
    #[error(transparent)]
    Snappy(#[from] snap::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
