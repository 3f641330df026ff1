mod access_list;
mod tx_type;

pub use access_list::{AccessList, AccessListItem};
pub use tx_type::TxType;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{
    length_of_length, Decodable, Encodable, EMPTY_LIST_CODE, EMPTY_STRING_CODE,
};
use bytes::Buf;

/// Recipient of a transaction, or `Create` for a contract deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxKind {
    /// Deploys a contract; the recipient field is empty on the wire.
    #[default]
    Create,
    /// Calls the given address.
    Call(Address),
}

impl TxKind {
    /// Recipient address, unless this is a contract creation.
    pub const fn to(&self) -> Option<&Address> {
        match self {
            Self::Call(to) => Some(to),
            Self::Create => None,
        }
    }
}

impl Encodable for TxKind {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self {
            Self::Call(to) => to.encode(out),
            Self::Create => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Call(to) => to.length(),
            Self::Create => 1,
        }
    }
}

impl Decodable for TxKind {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        // only a string of exactly twenty bytes carries a recipient; the
        // writer leaves anything else (usually empty) for deployments
        let bytes = Bytes::decode(buf)?;
        if bytes.len() == 20 {
            Ok(Self::Call(Address::from_slice(&bytes)))
        } else {
            Ok(Self::Create)
        }
    }
}

/// Untyped transaction, a list of nine fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxLegacy {
    /// Number of transactions sent by the sender before this one.
    pub nonce: u64,
    /// Wei paid per unit of gas.
    pub gas_price: U256,
    /// Gas limit of the transaction.
    pub gas_limit: u64,
    /// Recipient, or `Create`.
    pub to: TxKind,
    /// Wei transferred to the recipient.
    pub value: U256,
    /// Call data, or init code for a creation.
    pub input: Bytes,
    /// Signature `v`, kept as raw wire bytes.
    pub v: Bytes,
    /// Signature `r`, kept as raw wire bytes.
    pub r: Bytes,
    /// Signature `s`, kept as raw wire bytes.
    pub s: Bytes,
}

impl TxLegacy {
    fn fields_len(&self) -> usize {
        self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.v.length() +
            self.r.length() +
            self.s.length()
    }

    fn encode_fields(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.v.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }
}

/// EIP-2930 transaction, eleven fields behind a type-1 envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxAccessList {
    /// Chain the transaction is valid on.
    pub chain_id: U256,
    /// Number of transactions sent by the sender before this one.
    pub nonce: u64,
    /// Wei paid per unit of gas.
    pub gas_price: U256,
    /// Gas limit of the transaction.
    pub gas_limit: u64,
    /// Recipient, or `Create`.
    pub to: TxKind,
    /// Wei transferred to the recipient.
    pub value: U256,
    /// Call data, or init code for a creation.
    pub input: Bytes,
    /// Addresses and storage keys the transaction plans to access.
    pub access_list: AccessList,
    /// Signature `v`, kept as raw wire bytes.
    pub v: Bytes,
    /// Signature `r`, kept as raw wire bytes.
    pub r: Bytes,
    /// Signature `s`, kept as raw wire bytes.
    pub s: Bytes,
}

impl TxAccessList {
    fn fields_len(&self) -> usize {
        self.chain_id.length() +
            self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.access_list.length() +
            self.v.length() +
            self.r.length() +
            self.s.length()
    }

    fn encode_fields(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
        self.v.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn decode_inner(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this = Self {
            chain_id: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            gas_price: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
            v: Decodable::decode(buf)?,
            r: Decodable::decode(buf)?,
            s: Decodable::decode(buf)?,
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

/// EIP-1559 transaction, twelve fields behind a type-2 envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxDynamicFee {
    /// Chain the transaction is valid on.
    pub chain_id: U256,
    /// Number of transactions sent by the sender before this one.
    pub nonce: u64,
    /// Wei per gas paid to the block producer on top of the base fee.
    pub max_priority_fee_per_gas: U256,
    /// Total wei per gas the sender is willing to pay.
    pub max_fee_per_gas: U256,
    /// Gas limit of the transaction.
    pub gas_limit: u64,
    /// Recipient, or `Create`.
    pub to: TxKind,
    /// Wei transferred to the recipient.
    pub value: U256,
    /// Call data, or init code for a creation.
    pub input: Bytes,
    /// Addresses and storage keys the transaction plans to access.
    pub access_list: AccessList,
    /// Signature `v`, kept as raw wire bytes.
    pub v: Bytes,
    /// Signature `r`, kept as raw wire bytes.
    pub r: Bytes,
    /// Signature `s`, kept as raw wire bytes.
    pub s: Bytes,
}

impl TxDynamicFee {
    fn fields_len(&self) -> usize {
        self.chain_id.length() +
            self.nonce.length() +
            self.max_priority_fee_per_gas.length() +
            self.max_fee_per_gas.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.access_list.length() +
            self.v.length() +
            self.r.length() +
            self.s.length()
    }

    fn encode_fields(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
        self.v.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn decode_inner(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let this = Self {
            chain_id: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            max_priority_fee_per_gas: Decodable::decode(buf)?,
            max_fee_per_gas: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
            v: Decodable::decode(buf)?,
            r: Decodable::decode(buf)?,
            s: Decodable::decode(buf)?,
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

/// The three envelope variants a stored transaction can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedTransaction {
    /// Untyped transaction.
    Legacy(TxLegacy),
    /// EIP-2930 transaction.
    AccessList(TxAccessList),
    /// EIP-1559 transaction.
    DynamicFee(TxDynamicFee),
}

/// A decoded transaction together with its hash.
///
/// The hash is the keccak of the raw envelope: the list encoding itself for
/// legacy transactions, the type byte followed by the inner list for typed
/// ones. It is recomputed from the input span on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Keccak hash of the raw envelope.
    pub hash: B256,
    /// The decoded variant.
    pub inner: TypedTransaction,
}

impl Transaction {
    /// Envelope type of this transaction.
    pub const fn tx_type(&self) -> TxType {
        match self.inner {
            TypedTransaction::Legacy(_) => TxType::Legacy,
            TypedTransaction::AccessList(_) => TxType::AccessList,
            TypedTransaction::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    /// Recipient, or `Create`.
    pub const fn kind(&self) -> TxKind {
        match &self.inner {
            TypedTransaction::Legacy(tx) => tx.to,
            TypedTransaction::AccessList(tx) => tx.to,
            TypedTransaction::DynamicFee(tx) => tx.to,
        }
    }

    /// Recipient address, unless this is a contract creation.
    pub const fn to(&self) -> Option<&Address> {
        match &self.inner {
            TypedTransaction::Legacy(tx) => tx.to.to(),
            TypedTransaction::AccessList(tx) => tx.to.to(),
            TypedTransaction::DynamicFee(tx) => tx.to.to(),
        }
    }

    /// Sender nonce.
    pub const fn nonce(&self) -> u64 {
        match &self.inner {
            TypedTransaction::Legacy(tx) => tx.nonce,
            TypedTransaction::AccessList(tx) => tx.nonce,
            TypedTransaction::DynamicFee(tx) => tx.nonce,
        }
    }

    /// Transferred value in wei.
    pub const fn value(&self) -> U256 {
        match &self.inner {
            TypedTransaction::Legacy(tx) => tx.value,
            TypedTransaction::AccessList(tx) => tx.value,
            TypedTransaction::DynamicFee(tx) => tx.value,
        }
    }

    /// Call data.
    pub const fn input(&self) -> &Bytes {
        match &self.inner {
            TypedTransaction::Legacy(tx) => &tx.input,
            TypedTransaction::AccessList(tx) => &tx.input,
            TypedTransaction::DynamicFee(tx) => &tx.input,
        }
    }

    /// Chain id, absent on legacy transactions.
    pub const fn chain_id(&self) -> Option<U256> {
        match &self.inner {
            TypedTransaction::Legacy(_) => None,
            TypedTransaction::AccessList(tx) => Some(tx.chain_id),
            TypedTransaction::DynamicFee(tx) => Some(tx.chain_id),
        }
    }

    /// Access list, absent on legacy transactions.
    pub const fn access_list(&self) -> Option<&AccessList> {
        match &self.inner {
            TypedTransaction::Legacy(_) => None,
            TypedTransaction::AccessList(tx) => Some(&tx.access_list),
            TypedTransaction::DynamicFee(tx) => Some(&tx.access_list),
        }
    }

    /// Decodes a raw EIP-2718 envelope: either a bare legacy list or a type
    /// byte followed by the inner list.
    pub fn decode_envelope(data: &[u8]) -> alloy_rlp::Result<Self> {
        let first = *data.first().ok_or(alloy_rlp::Error::InputTooShort)?;
        if first >= EMPTY_LIST_CODE {
            let mut buf = data;
            let tx = Self::decode_legacy(&mut buf)?;
            if !buf.is_empty() {
                return Err(alloy_rlp::Error::UnexpectedLength)
            }
            return Ok(tx)
        }

        let mut buf = &data[1..];
        let inner = match first {
            1 => TypedTransaction::AccessList(TxAccessList::decode_inner(&mut buf)?),
            2 => TypedTransaction::DynamicFee(TxDynamicFee::decode_inner(&mut buf)?),
            _ => return Err(alloy_rlp::Error::Custom("unsupported transaction envelope type")),
        };
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength)
        }
        Ok(Self { hash: keccak256(data), inner })
    }

    /// Raw envelope bytes, the preimage of [`Transaction::hash`].
    pub fn encoded_envelope(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.envelope_length());
        match &self.inner {
            TypedTransaction::Legacy(tx) => {
                alloy_rlp::Header { list: true, payload_length: tx.fields_len() }.encode(&mut out);
                tx.encode_fields(&mut out);
            }
            TypedTransaction::AccessList(tx) => {
                out.push(TxType::AccessList as u8);
                alloy_rlp::Header { list: true, payload_length: tx.fields_len() }.encode(&mut out);
                tx.encode_fields(&mut out);
            }
            TypedTransaction::DynamicFee(tx) => {
                out.push(TxType::DynamicFee as u8);
                alloy_rlp::Header { list: true, payload_length: tx.fields_len() }.encode(&mut out);
                tx.encode_fields(&mut out);
            }
        }
        out
    }

    fn envelope_length(&self) -> usize {
        match &self.inner {
            TypedTransaction::Legacy(tx) => {
                let payload_length = tx.fields_len();
                payload_length + length_of_length(payload_length)
            }
            TypedTransaction::AccessList(tx) => {
                let payload_length = tx.fields_len();
                1 + payload_length + length_of_length(payload_length)
            }
            TypedTransaction::DynamicFee(tx) => {
                let payload_length = tx.fields_len();
                1 + payload_length + length_of_length(payload_length)
            }
        }
    }

    fn decode_legacy(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let original = *buf;

        let rlp_head = alloy_rlp::Header::decode(buf)?;
        if !rlp_head.list {
            return Err(alloy_rlp::Error::UnexpectedString)
        }
        let started_len = buf.len();

        let tx = TxLegacy {
            nonce: Decodable::decode(buf)?,
            gas_price: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            v: Decodable::decode(buf)?,
            r: Decodable::decode(buf)?,
            s: Decodable::decode(buf)?,
        };

        let consumed = started_len - buf.len();
        if consumed != rlp_head.payload_length {
            return Err(alloy_rlp::Error::ListLengthMismatch {
                expected: rlp_head.payload_length,
                got: consumed,
            })
        }

        let hash = keccak256(&original[..original.len() - buf.len()]);
        Ok(Self { hash, inner: TypedTransaction::Legacy(tx) })
    }
}

/// Decodes the in-body form: typed transactions are wrapped in an RLP
/// string, legacy transactions are bare lists.
impl Decodable for Transaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let rlp_head = {
            let mut peek = *buf;
            alloy_rlp::Header::decode(&mut peek)?
        };
        if rlp_head.list {
            return Self::decode_legacy(buf)
        }

        let rlp_head = alloy_rlp::Header::decode(buf)?;
        let tx = Self::decode_envelope(&buf[..rlp_head.payload_length])?;
        buf.advance(rlp_head.payload_length);
        Ok(tx)
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match &self.inner {
            TypedTransaction::Legacy(tx) => {
                alloy_rlp::Header { list: true, payload_length: tx.fields_len() }.encode(out);
                tx.encode_fields(out);
            }
            _ => {
                let envelope_length = self.envelope_length();
                alloy_rlp::Header { list: false, payload_length: envelope_length }.encode(out);
                out.put_slice(&self.encoded_envelope());
            }
        }
    }

    fn length(&self) -> usize {
        let envelope_length = self.envelope_length();
        match &self.inner {
            TypedTransaction::Legacy(_) => envelope_length,
            _ => envelope_length + length_of_length(envelope_length),
        }
    }
}
