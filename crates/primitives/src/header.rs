use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{length_of_length, Decodable, Encodable};

/// Block header.
///
/// The canonical encoding is a list of fifteen fields, or sixteen once the
/// base fee was introduced. `hash` is not part of the encoding; it is the
/// keccak of the raw header bytes and is recomputed on every decode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Keccak hash of the canonical header encoding.
    pub hash: B256,
    /// Hash of the parent block header.
    pub parent_hash: B256,
    /// Hash of the RLP list of ommer headers.
    pub ommers_hash: B256,
    /// Address that collected the block reward.
    pub beneficiary: Address,
    /// Root of the state trie after this block.
    pub state_root: B256,
    /// Root of the transaction trie.
    pub transactions_root: B256,
    /// Root of the receipt trie.
    pub receipts_root: B256,
    /// Bloom filter over the logs of all transactions in the block.
    /// Always 256 bytes on the wire.
    pub logs_bloom: Bloom,
    /// Proof-of-work difficulty.
    pub difficulty: u64,
    /// Block height.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Total gas used by the block.
    pub gas_used: u64,
    /// Unix timestamp.
    pub timestamp: u64,
    /// Arbitrary extra data chosen by the miner.
    pub extra_data: Bytes,
    /// Proof-of-work mix digest.
    pub mix_hash: B256,
    /// Proof-of-work nonce.
    pub nonce: B64,
    /// Base fee per gas. Present iff the header encodes sixteen fields.
    pub base_fee_per_gas: Option<U256>,
}

impl Header {
    /// Length of the RLP payload, without the list header.
    fn payload_length(&self) -> usize {
        let mut length = self.parent_hash.length() +
            self.ommers_hash.length() +
            self.beneficiary.length() +
            self.state_root.length() +
            self.transactions_root.length() +
            self.receipts_root.length() +
            self.logs_bloom.length() +
            self.difficulty.length() +
            self.number.length() +
            self.gas_limit.length() +
            self.gas_used.length() +
            self.timestamp.length() +
            self.extra_data.length() +
            self.mix_hash.length() +
            self.nonce.length();
        if let Some(base_fee) = self.base_fee_per_gas {
            length += base_fee.length();
        }
        length
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        let header = alloy_rlp::Header { list: true, payload_length: self.payload_length() };
        header.encode(out);
        self.parent_hash.encode(out);
        self.ommers_hash.encode(out);
        self.beneficiary.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        self.nonce.encode(out);
        if let Some(base_fee) = self.base_fee_per_gas {
            base_fee.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for Header {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        // keep the original slice around to hash the consumed span
        let original = *buf;

        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let mut this = Self {
            hash: B256::ZERO,
            parent_hash: Decodable::decode(buf)?,
            ommers_hash: Decodable::decode(buf)?,
            beneficiary: Decodable::decode(buf)?,
            state_root: Decodable::decode(buf)?,
            transactions_root: Decodable::decode(buf)?,
            receipts_root: Decodable::decode(buf)?,
            logs_bloom: Decodable::decode(buf)?,
            difficulty: Decodable::decode(buf)?,
            number: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            gas_used: Decodable::decode(buf)?,
            timestamp: Decodable::decode(buf)?,
            extra_data: Decodable::decode(buf)?,
            mix_hash: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            base_fee_per_gas: None,
        };

        // a sixteenth field is the base fee; anything else is a size mismatch
        if started_len - buf.len() < rlp_head.payload_length {
            this.base_fee_per_gas = Some(Decodable::decode(buf)?);
        }

        let consumed = started_len - buf.len();
        if consumed != rlp_head.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: rlp_head.payload_length,
                got: consumed,
            })
        }

        this.hash = keccak256(&original[..original.len() - buf.len()]);
        Ok(this)
    }
}
