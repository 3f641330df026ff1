use crate::Log;
use alloy_primitives::Bytes;
use alloy_rlp::{length_of_length, Decodable, Encodable};

/// Receipt of a single transaction. Encoded as a list of exactly three
/// elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Receipt {
    /// Pre-Byzantium intermediate state root (32 bytes) or the EIP-658
    /// status code as a minimal big-endian integer. Kept as raw wire bytes;
    /// callers interpret it.
    pub post_state_or_status: Bytes,
    /// Gas used by the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Logs emitted during execution.
    pub logs: Vec<Log>,
}

impl Receipt {
    /// Interprets the first field as an EIP-658 status code, if it is one.
    ///
    /// Returns `None` for pre-Byzantium receipts that carry a state root.
    pub fn status(&self) -> Option<bool> {
        match self.post_state_or_status.as_ref() {
            [] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }

    fn payload_length(&self) -> usize {
        self.post_state_or_status.length() +
            self.cumulative_gas_used.length() +
            self.logs.length()
    }
}

impl Encodable for Receipt {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header = alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.post_state_or_status.encode(out);
        self.cumulative_gas_used.encode(out);
        self.logs.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for Receipt {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this = Self {
            post_state_or_status: Decodable::decode(buf)?,
            cumulative_gas_used: Decodable::decode(buf)?,
            logs: Decodable::decode(buf)?,
        };
        if this.post_state_or_status.len() > 32 {
            return Err(alloy_rlp::Error::Custom(
                "post-state or status field longer than 32 bytes",
            ))
        }

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
