//! Key construction for the recent tier.
//!
//! Block numbers are 8-byte big-endian, hashes are 32 bytes, and prefixes
//! are single ASCII bytes.

/// Hash of the current chain head.
pub(crate) const HEAD_BLOCK_KEY: &[u8] = b"LastBlock";

/// `'h' || num || hash` -> header.
const HEADER_PREFIX: u8 = b'h';
/// `'b' || num || hash` -> block body.
const BODY_PREFIX: u8 = b'b';
/// `'r' || num || hash` -> block receipts.
const RECEIPTS_PREFIX: u8 = b'r';
/// `'H' || hash` -> block number.
const HEADER_NUMBER_PREFIX: u8 = b'H';
/// `'h' || num || 'n'` -> canonical hash.
const HEADER_HASH_SUFFIX: u8 = b'n';

fn numbered_key(prefix: u8, number: u64, rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(9 + rest.len());
    key.push(prefix);
    key.extend_from_slice(&number.to_be_bytes());
    key.extend_from_slice(rest);
    key
}

/// Key of the canonical hash at `number`.
pub(crate) fn header_hash_key(number: u64) -> Vec<u8> {
    numbered_key(HEADER_PREFIX, number, &[HEADER_HASH_SUFFIX])
}

/// Key of the header with the given number and hash.
pub(crate) fn header_key(number: u64, hash: &[u8]) -> Vec<u8> {
    numbered_key(HEADER_PREFIX, number, hash)
}

/// Key of the block body with the given number and hash.
pub(crate) fn block_body_key(number: u64, hash: &[u8]) -> Vec<u8> {
    numbered_key(BODY_PREFIX, number, hash)
}

/// Key of the block receipts with the given number and hash.
pub(crate) fn block_receipts_key(number: u64, hash: &[u8]) -> Vec<u8> {
    numbered_key(RECEIPTS_PREFIX, number, hash)
}

/// Key of the block number stored for `hash`.
pub(crate) fn header_number_key(hash: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + hash.len());
    key.push(HEADER_NUMBER_PREFIX);
    key.extend_from_slice(hash);
    key
}
