use crate::{Header, Receipt, Transaction};
use alloy_rlp::{length_of_length, Decodable, Encodable};

/// Block body: the transactions and the ommer headers. Encoded as a list of
/// exactly two lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    /// Transactions in execution order.
    pub transactions: Vec<Transaction>,
    /// Headers of the block's ommers.
    pub uncles: Vec<Header>,
}

impl Body {
    fn payload_length(&self) -> usize {
        self.transactions.length() + self.uncles.length()
    }
}

impl Encodable for Body {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header = alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.transactions.encode(out);
        self.uncles.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for Body {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this =
            Self { transactions: Decodable::decode(buf)?, uncles: Decodable::decode(buf)? };

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

/// A fully decoded block: one chain height across all three stored columns.
///
/// `number` always equals `header.number`; the stores enforce that the
/// receipt count matches the transaction count before constructing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// Block height.
    pub number: u64,
    /// The block header.
    pub header: Header,
    /// Transactions and ommers.
    pub body: Body,
    /// One receipt per transaction.
    pub receipts: Vec<Receipt>,
}
