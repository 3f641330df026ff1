use alloy_primitives::{Address, Bytes, B256};
use alloy_rlp::{length_of_length, Decodable, Encodable};

/// Log entry emitted during transaction execution. Encoded as a list of
/// exactly three elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Log {
    /// Contract that emitted this log.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<B256>,
    /// Arbitrary length data.
    pub data: Bytes,
}

impl Log {
    fn payload_length(&self) -> usize {
        self.address.length() + self.topics.length() + self.data.length()
    }
}

impl Encodable for Log {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header = alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.address.encode(out);
        self.topics.encode(out);
        self.data.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for Log {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this = Self {
            address: Decodable::decode(buf)?,
            topics: Decodable::decode(buf)?,
            data: Decodable::decode(buf)?,
        };

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
