//! Consensus record types for the chain-data read path.
//!
//! Headers, bodies, transactions and receipts decode from their canonical
//! RLP form. Record hashes are not stored on disk; they are recomputed from
//! the raw input span while decoding, so the parser never re-encodes.

mod block;
mod header;
mod log;
mod receipt;
mod transaction;

pub use block::{Block, Body};
pub use header::Header;
pub use log::Log;
pub use receipt::Receipt;
pub use transaction::{
    AccessList, AccessListItem, Transaction, TxAccessList, TxDynamicFee, TxKind, TxLegacy, TxType,
    TypedTransaction,
};

pub use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};

/// Decodes a value that must span the entire input buffer.
///
/// Stored records are exactly one RLP value; trailing bytes mean the record
/// is corrupt.
pub fn decode_exact<T: alloy_rlp::Decodable>(mut buf: &[u8]) -> alloy_rlp::Result<T> {
    let value = T::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(alloy_rlp::Error::UnexpectedLength)
    }
    Ok(value)
}
