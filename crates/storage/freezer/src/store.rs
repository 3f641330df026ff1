use crate::{FreezerCursor, FreezerError, FreezerTable};
use gethdata_primitives::{decode_exact, Block, Body, Header, Receipt};
use std::path::Path;
use tracing::debug;

/// The three freezer columns of the chain, kept in lock-step by block
/// number: every item index holds the header, body and receipts of one
/// block.
#[derive(Debug)]
pub struct FreezerStore {
    headers: FreezerTable,
    bodies: FreezerTable,
    receipts: FreezerTable,
}

impl FreezerStore {
    /// Opens the three columns under `path`.
    ///
    /// The writer appends to all columns as one atomic triple, so unequal
    /// item counts mean the directory is not usable.
    pub fn open(path: &Path) -> Result<Self, FreezerError> {
        let receipts = FreezerTable::open(path, "receipts")?;
        let headers = FreezerTable::open(path, "headers")?;
        let bodies = FreezerTable::open(path, "bodies")?;

        if headers.num_items() != bodies.num_items() {
            return Err(FreezerError::ItemCountMismatch {
                table: "bodies",
                headers: headers.num_items(),
                got: bodies.num_items(),
            })
        }
        if headers.num_items() != receipts.num_items() {
            return Err(FreezerError::ItemCountMismatch {
                table: "receipts",
                headers: headers.num_items(),
                got: receipts.num_items(),
            })
        }

        debug!(target: "freezer", blocks = headers.num_items(), path = %path.display(), "Opened freezer store");
        Ok(Self { headers, bodies, receipts })
    }

    /// Number of stored blocks. Block 0 is the first, so this is also one
    /// past the highest block held by the freezer.
    pub fn last_num(&self) -> u64 {
        self.headers.num_items()
    }

    /// Returns an iterator whose first `next` yields block `num`.
    pub fn iter(&self, num: u64) -> Result<FreezerIterator<'_>, FreezerError> {
        Ok(FreezerIterator {
            headers: self.headers.cursor(num)?,
            bodies: self.bodies.cursor(num)?,
            receipts: self.receipts.cursor(num)?,
        })
    }
}

/// Lock-step iterator over the three columns.
#[derive(Debug)]
pub struct FreezerIterator<'a> {
    headers: FreezerCursor<'a>,
    bodies: FreezerCursor<'a>,
    receipts: FreezerCursor<'a>,
}

impl FreezerIterator<'_> {
    /// Advances all three columns by one block.
    ///
    /// The equal-count invariant was checked at open time, so the cursors
    /// can only disagree if process state is corrupt; that is a programming
    /// error, not an I/O condition.
    pub fn next(&mut self) -> Result<bool, FreezerError> {
        let advanced = self.receipts.next()?;
        let headers = self.headers.next()?;
        let bodies = self.bodies.next()?;
        assert!(
            headers == advanced && bodies == advanced,
            "freezer columns advanced unevenly"
        );
        Ok(advanced)
    }

    /// Decodes the current triple into a block.
    pub fn value(&self) -> Result<Block, FreezerError> {
        let header: Header = decode_exact(self.headers.value())?;
        let body: Body = decode_exact(self.bodies.value())?;
        let receipts: Vec<Receipt> = decode_exact(self.receipts.value())?;

        if body.transactions.len() != receipts.len() {
            return Err(FreezerError::TransactionReceiptMismatch {
                transactions: body.transactions.len(),
                receipts: receipts.len(),
            })
        }

        Ok(Block { number: header.number, header, body, receipts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_records;
    use alloy_rlp::Encodable;
    use gethdata_primitives::{
        Bytes, Transaction, TxLegacy, TypedTransaction, B256,
    };
    use std::path::Path;
    use tempfile::tempdir;

    fn encode<T: Encodable>(value: &T) -> Vec<u8> {
        let mut out = Vec::new();
        value.encode(&mut out);
        out
    }

    fn sample_block(number: u64, tx_count: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let header = Header { number, gas_limit: 8_000_000, ..Default::default() };

        let transactions = (0..tx_count)
            .map(|i| Transaction {
                hash: B256::ZERO,
                inner: TypedTransaction::Legacy(TxLegacy {
                    nonce: i as u64,
                    gas_limit: 21_000,
                    ..Default::default()
                }),
            })
            .collect();
        let body = Body { transactions, uncles: Vec::new() };

        let receipts: Vec<Receipt> = (0..tx_count)
            .map(|i| Receipt {
                post_state_or_status: Bytes::from(vec![1]),
                cumulative_gas_used: 21_000 * (i as u64 + 1),
                logs: Vec::new(),
            })
            .collect();

        (encode(&header), encode(&body), encode(&receipts))
    }

    pub(crate) fn write_store(dir: &Path, blocks: usize) {
        let mut headers = Vec::new();
        let mut bodies = Vec::new();
        let mut receipts = Vec::new();
        for number in 0..blocks {
            let (header, body, receipt) = sample_block(number as u64, number % 3);
            headers.push(header);
            bodies.push(body);
            receipts.push(receipt);
        }
        fn as_slices(records: &Vec<Vec<u8>>) -> Vec<&[u8]> {
            records.iter().map(|r| r.as_slice()).collect()
        }
        write_records(dir, "headers", &as_slices(&headers));
        write_records(dir, "bodies", &as_slices(&bodies));
        write_records(dir, "receipts", &as_slices(&receipts));
    }

    #[test]
    fn iterates_blocks_in_order() {
        let dir = tempdir().unwrap();
        write_store(dir.path(), 5);

        let store = FreezerStore::open(dir.path()).unwrap();
        assert_eq!(store.last_num(), 5);

        let mut iter = store.iter(0).unwrap();
        for number in 0..5u64 {
            assert!(iter.next().unwrap());
            let block = iter.value().unwrap();
            assert_eq!(block.number, number);
            assert_eq!(block.header.number, number);
            assert_eq!(block.body.transactions.len(), (number % 3) as usize);
            assert_eq!(block.receipts.len(), block.body.transactions.len());
        }
        assert!(!iter.next().unwrap());
    }

    #[test]
    fn seek_matches_sequential_iteration() {
        let dir = tempdir().unwrap();
        write_store(dir.path(), 6);
        let store = FreezerStore::open(dir.path()).unwrap();

        // seek(k) then k advances must land on the same block as a direct
        // seek to the target
        let mut walked = store.iter(1).unwrap();
        for _ in 0..4 {
            assert!(walked.next().unwrap());
        }
        let mut direct = store.iter(4).unwrap();
        assert!(direct.next().unwrap());

        assert_eq!(walked.value().unwrap(), direct.value().unwrap());
    }

    #[test]
    fn open_rejects_unequal_columns() {
        let dir = tempdir().unwrap();
        write_store(dir.path(), 4);
        // rewrite the bodies column one block short
        let bodies: Vec<Vec<u8>> = (0..3)
            .map(|number| {
                let (_, body, _) = sample_block(number as u64, 0);
                body
            })
            .collect();
        let slices: Vec<&[u8]> = bodies.iter().map(|r| r.as_slice()).collect();
        write_records(dir.path(), "bodies", &slices);

        assert!(matches!(
            FreezerStore::open(dir.path()),
            Err(FreezerError::ItemCountMismatch { table: "bodies", .. })
        ));
    }

    #[test]
    fn value_rejects_transaction_receipt_mismatch() {
        let dir = tempdir().unwrap();

        let (header, body, _) = sample_block(0, 2);
        let receipts: Vec<Receipt> = vec![Receipt::default()];
        write_records(dir.path(), "headers", &[&header]);
        write_records(dir.path(), "bodies", &[&body]);
        write_records(dir.path(), "receipts", &[&encode(&receipts)]);

        let store = FreezerStore::open(dir.path()).unwrap();
        let mut iter = store.iter(0).unwrap();
        assert!(iter.next().unwrap());
        assert!(matches!(
            iter.value(),
            Err(FreezerError::TransactionReceiptMismatch { transactions: 2, receipts: 1 })
        ));
    }

    #[test]
    fn corrupt_record_is_not_skipped() {
        let dir = tempdir().unwrap();

        let (header, _, _) = sample_block(0, 0);
        write_records(dir.path(), "headers", &[&header]);
        write_records(dir.path(), "bodies", &[b"not rlp"]);
        write_records(dir.path(), "receipts", &[&encode(&Vec::<Receipt>::new())]);

        let store = FreezerStore::open(dir.path()).unwrap();
        let mut iter = store.iter(0).unwrap();
        assert!(iter.next().unwrap());
        assert!(matches!(iter.value(), Err(FreezerError::Decode(_))));
    }
}
