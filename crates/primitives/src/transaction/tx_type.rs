/// Transaction envelope type, the single-byte tag of EIP-2718.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TxType {
    /// Untyped transaction, the original wire format.
    Legacy = 0,
    /// EIP-2930 transaction with an access list.
    AccessList = 1,
    /// EIP-1559 transaction with a dynamic fee.
    DynamicFee = 2,
}
