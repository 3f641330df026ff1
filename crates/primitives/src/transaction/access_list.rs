use alloy_primitives::{Address, B256};
use alloy_rlp::{length_of_length, Decodable, Encodable};

/// A single entry of an [`AccessList`]: an address and the storage keys the
/// transaction plans to touch under it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessListItem {
    /// Account address.
    pub address: Address,
    /// Storage keys under `address`.
    pub storage_keys: Vec<B256>,
}

impl AccessListItem {
    fn payload_length(&self) -> usize {
        self.address.length() + self.storage_keys.length()
    }
}

impl Encodable for AccessListItem {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header = alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.address.encode(out);
        self.storage_keys.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for AccessListItem {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this =
            Self { address: Decodable::decode(buf)?, storage_keys: Decodable::decode(buf)? };

        let consumed = started_len - buf.len();
        if consumed != rlp_head.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: rlp_head.payload_length,
                got: consumed,
            })
        }
        Ok(this)
    }
}

/// EIP-2930 access list. An empty list is a valid value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Encodable for AccessList {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.encode(out);
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for AccessList {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self(Decodable::decode(buf)?))
    }
}
