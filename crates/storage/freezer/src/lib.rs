//! Reader for the chain freezer: the append-only, chunked columnar store
//! that holds cold block history.
//!
//! Each column pairs an index file of packed 6-byte entries with a set of
//! rolling data files. Record boundaries exist only in the index: entry `i`
//! carries the end offset of record `i - 1`, and a jump in the file number
//! means the writer rolled over to a fresh data file. Records are
//! optionally snappy-compressed, one independent block-format frame per
//! record.

mod error;
mod store;
mod table;

pub use error::FreezerError;
pub use store::{FreezerIterator, FreezerStore};
pub use table::{FreezerCursor, FreezerTable, IndexEntry};

/// Cap on the decoded size of a single record. The length prefix written by
/// the compressor is trusted only up to this bound.
pub const MAX_RECORD_SIZE: usize = 16 * 1024 * 1024;

#[cfg(test)]
mod test_utils {
    use std::{fs, path::Path};

    /// Lays a column out on disk: one index file from `entries` and one
    /// data file per entry of `files`.
    pub(crate) fn write_table(
        dir: &Path,
        name: &str,
        compressed: bool,
        entries: &[(u16, u32)],
        files: &[&[u8]],
    ) {
        let index_ext = if compressed { "cidx" } else { "ridx" };
        let data_ext = if compressed { "cdat" } else { "rdat" };

        let mut index = Vec::with_capacity(entries.len() * 6);
        for (file_num, offset) in entries {
            index.extend_from_slice(&file_num.to_be_bytes());
            index.extend_from_slice(&offset.to_be_bytes());
        }
        fs::write(dir.join(format!("{name}.{index_ext}")), index).unwrap();

        for (file_num, data) in files.iter().enumerate() {
            fs::write(dir.join(format!("{name}.{file_num:04}.{data_ext}")), data).unwrap();
        }
    }

    /// Writes a single-file column of raw records and the matching index.
    pub(crate) fn write_records(dir: &Path, name: &str, records: &[&[u8]]) {
        let mut entries = vec![(0u16, 0u32)];
        let mut data = Vec::new();
        for record in records {
            data.extend_from_slice(record);
            entries.push((0, data.len() as u32));
        }
        write_table(dir, name, false, &entries, &[&data]);
    }
}
