use crate::{FreezerError, MAX_RECORD_SIZE};
use memmap2::Mmap;
use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Size of one index entry on disk.
const INDEX_ENTRY_SIZE: u64 = 6;

/// One 6-byte index entry, big-endian on disk.
///
/// Entry `i` gives the end offset of record `i - 1`; entry 0 is the
/// start-of-record-0 sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Number of the data file the boundary lives in.
    pub file_num: u16,
    /// Byte offset within that file.
    pub offset: u32,
}

impl IndexEntry {
    fn unmarshal(buf: &[u8]) -> Self {
        Self {
            file_num: u16::from_be_bytes([buf[0], buf[1]]),
            offset: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
        }
    }
}

/// A read-only memory-mapped file. The descriptor must stay alive as long
/// as the map.
struct MappedFile {
    #[allow(unused)]
    file: File,
    mmap: Mmap,
}

impl MappedFile {
    fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the file is read-only and its descriptor is kept alive as
        // long as the mmap handle.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { file, mmap })
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile").field("len", &self.mmap.len()).finish()
    }
}

/// One immutable freezer column: the index file plus every data file it
/// refers to, all mapped at open time.
#[derive(Debug)]
pub struct FreezerTable {
    /// Column name, e.g. `headers`.
    name: String,
    /// Whether records are snappy-compressed.
    compressed: bool,
    /// The index file.
    index: MappedFile,
    /// Data files keyed by file number.
    data: HashMap<u16, MappedFile>,
    /// Number of records in the table.
    num_items: u64,
}

impl FreezerTable {
    /// Opens the column `name` under `path`.
    ///
    /// Exactly one of the `.cidx`/`.ridx` index variants must exist; its
    /// size fixes the item count, and every data file between the first and
    /// the last referenced file number is mapped up front.
    pub fn open(path: &Path, name: &str) -> Result<Self, FreezerError> {
        let has_compressed = path.join(format!("{name}.cidx")).try_exists()?;
        let has_raw = path.join(format!("{name}.ridx")).try_exists()?;
        let compressed = match (has_compressed, has_raw) {
            (true, true) => return Err(FreezerError::AmbiguousIndex(name.to_string())),
            (false, false) => return Err(FreezerError::MissingTable(name.to_string())),
            (compressed, _) => compressed,
        };

        let index = MappedFile::open(&index_path(path, name, compressed))?;
        let size = index.mmap.len() as u64;
        if size == 0 || size % INDEX_ENTRY_SIZE != 0 {
            return Err(FreezerError::InvalidIndexSize(size))
        }
        // entry 0 is the sentinel, so it does not count as a record
        let num_items = size / INDEX_ENTRY_SIZE - 1;

        let mut this = Self {
            name: name.to_string(),
            compressed,
            index,
            data: HashMap::new(),
            num_items,
        };

        let first = this.entry(0)?;
        let last = this.entry(num_items)?;
        for file_num in first.file_num..=last.file_num {
            let data_path = data_path(path, name, file_num, compressed);
            let mapped = MappedFile::open(&data_path).map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    FreezerError::MissingDataFile(data_path.clone())
                } else {
                    err.into()
                }
            })?;
            this.data.insert(file_num, mapped);
        }

        debug!(
            target: "freezer",
            table = %this.name,
            items = this.num_items,
            compressed,
            "Opened freezer table"
        );
        Ok(this)
    }

    /// Number of records in the table.
    pub fn num_items(&self) -> u64 {
        self.num_items
    }

    /// Returns a cursor positioned so that its first `next` yields record
    /// `n`. Seeking at or past the end parks the cursor there.
    pub fn cursor(&self, n: u64) -> Result<FreezerCursor<'_>, FreezerError> {
        let mut cursor = FreezerCursor {
            table: self,
            prev: IndexEntry { file_num: 0, offset: 0 },
            next_row: 0,
            decoder: snap::raw::Decoder::new(),
            buf: Vec::new(),
        };
        cursor.seek(n)?;
        Ok(cursor)
    }

    /// Reads index entry `i`.
    fn entry(&self, i: u64) -> Result<IndexEntry, FreezerError> {
        let start = (i * INDEX_ENTRY_SIZE) as usize;
        let buf = self
            .index
            .mmap
            .get(start..start + INDEX_ENTRY_SIZE as usize)
            .ok_or(FreezerError::IndexOutOfBounds(i))?;
        Ok(IndexEntry::unmarshal(buf))
    }

    /// Slices `len` bytes at `start` out of data file `file_num`.
    fn read(&self, file_num: u16, start: u32, len: u32) -> Result<&[u8], FreezerError> {
        let data = self.data.get(&file_num).ok_or(FreezerError::UnknownDataFile(file_num))?;
        let start = start as usize;
        let end = start + len as usize;
        data.mmap.get(start..end).ok_or(FreezerError::RecordOutOfBounds {
            file_num,
            start: start as u64,
            end: end as u64,
        })
    }
}

fn index_path(path: &Path, name: &str, compressed: bool) -> PathBuf {
    let ext = if compressed { "cidx" } else { "ridx" };
    path.join(format!("{name}.{ext}"))
}

fn data_path(path: &Path, name: &str, file_num: u16, compressed: bool) -> PathBuf {
    let ext = if compressed { "cdat" } else { "rdat" };
    path.join(format!("{name}.{file_num:04}.{ext}"))
}

/// Cursor over the records of one table.
///
/// Holds only positions and a scratch buffer, so any number of cursors can
/// read the same table independently. The buffer is reused across `next`
/// calls; values must not be retained across them.
pub struct FreezerCursor<'a> {
    table: &'a FreezerTable,
    /// Last index entry read; the start boundary of the next record.
    prev: IndexEntry,
    /// Index of the next entry to read.
    next_row: u64,
    decoder: snap::raw::Decoder,
    buf: Vec<u8>,
}

impl<'a> FreezerCursor<'a> {
    /// Repositions the cursor so that the following `next` yields record
    /// `n`.
    pub fn seek(&mut self, n: u64) -> Result<(), FreezerError> {
        let row = n.min(self.table.num_items);
        self.prev = self.table.entry(row)?;
        self.next_row = row + 1;
        Ok(())
    }

    /// Advances to the next record. Returns `false` once the table is
    /// exhausted, leaving the current value untouched.
    pub fn next(&mut self) -> Result<bool, FreezerError> {
        if self.next_row > self.table.num_items {
            return Ok(false)
        }
        let table = self.table;
        let cur = table.entry(self.next_row)?;

        // a changed file number means the writer rolled over: the record
        // starts at offset zero of the new file and the tail of the
        // previous file belongs to no record
        let raw = if cur.file_num != self.prev.file_num {
            table.read(cur.file_num, 0, cur.offset)?
        } else {
            let len = cur
                .offset
                .checked_sub(self.prev.offset)
                .ok_or(FreezerError::NonMonotonicIndex(self.next_row))?;
            table.read(cur.file_num, self.prev.offset, len)?
        };

        if table.compressed {
            let decoded_len = snap::raw::decompress_len(raw)?;
            if decoded_len > MAX_RECORD_SIZE {
                return Err(FreezerError::RecordTooLarge(decoded_len))
            }
            self.buf.resize(decoded_len, 0);
            let written = self.decoder.decompress(raw, &mut self.buf)?;
            self.buf.truncate(written);
        } else {
            self.buf.clear();
            self.buf.extend_from_slice(raw);
        }

        self.prev = cur;
        self.next_row += 1;
        Ok(true)
    }

    /// Raw bytes of the current record.
    pub fn value(&self) -> &[u8] {
        &self.buf
    }

    /// Decodes the current record.
    pub fn decode<T: alloy_rlp::Decodable>(&self) -> Result<T, FreezerError> {
        Ok(gethdata_primitives::decode_exact(&self.buf)?)
    }
}

impl std::fmt::Debug for FreezerCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreezerCursor")
            .field("table", &self.table.name)
            .field("prev", &self.prev)
            .field("next_row", &self.next_row)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_records, write_table};
    use tempfile::tempdir;

    fn collect(table: &FreezerTable, from: u64) -> Vec<Vec<u8>> {
        let mut cursor = table.cursor(from).unwrap();
        let mut records = Vec::new();
        while cursor.next().unwrap() {
            records.push(cursor.value().to_vec());
        }
        records
    }

    #[test]
    fn single_file_table() {
        let dir = tempdir().unwrap();
        write_records(dir.path(), "headers", &[b"a", b"bb", b"ccc"]);

        let table = FreezerTable::open(dir.path(), "headers").unwrap();
        assert_eq!(table.num_items(), 3);
        assert_eq!(collect(&table, 0), vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
    }

    #[test]
    fn rollover_between_data_files() {
        let dir = tempdir().unwrap();
        // two records in file 0000, then the writer rolls to file 0001; the
        // tail of file 0000 belongs to no record and must be skipped
        write_table(
            dir.path(),
            "bodies",
            false,
            &[(0, 0), (0, 3), (0, 6), (1, 3)],
            &[b"aaabbb-junk", b"ccc"],
        );

        let table = FreezerTable::open(dir.path(), "bodies").unwrap();
        assert_eq!(table.num_items(), 3);
        assert_eq!(
            collect(&table, 0),
            vec![b"aaa".to_vec(), b"bbb".to_vec(), b"ccc".to_vec()]
        );
    }

    #[test]
    fn seek_positions_the_cursor() {
        let dir = tempdir().unwrap();
        write_records(dir.path(), "headers", &[b"a", b"bb", b"ccc"]);
        let table = FreezerTable::open(dir.path(), "headers").unwrap();

        assert_eq!(collect(&table, 2), vec![b"ccc".to_vec()]);
        assert_eq!(collect(&table, 3), Vec::<Vec<u8>>::new());
        // seeking past the end is not an error, just exhaustion
        assert_eq!(collect(&table, 99), Vec::<Vec<u8>>::new());

        let mut cursor = table.cursor(1).unwrap();
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.value(), b"bb");
        cursor.seek(0).unwrap();
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.value(), b"a");
    }

    #[test]
    fn next_past_the_end_keeps_the_value() {
        let dir = tempdir().unwrap();
        write_records(dir.path(), "headers", &[b"a", b"bb"]);
        let table = FreezerTable::open(dir.path(), "headers").unwrap();

        let mut cursor = table.cursor(1).unwrap();
        assert!(cursor.next().unwrap());
        assert!(!cursor.next().unwrap());
        assert!(!cursor.next().unwrap());
        assert_eq!(cursor.value(), b"bb");
    }

    #[test]
    fn compressed_table() {
        let dir = tempdir().unwrap();
        let records: &[&[u8]] = &[b"first record", b"second", b"third record body"];

        let mut encoder = snap::raw::Encoder::new();
        let mut entries = vec![(0u16, 0u32)];
        let mut data = Vec::new();
        for record in records {
            data.extend_from_slice(&encoder.compress_vec(record).unwrap());
            entries.push((0, data.len() as u32));
        }
        write_table(dir.path(), "receipts", true, &entries, &[&data]);

        let table = FreezerTable::open(dir.path(), "receipts").unwrap();
        assert_eq!(table.num_items(), 3);
        let expected: Vec<Vec<u8>> = records.iter().map(|r| r.to_vec()).collect();
        assert_eq!(collect(&table, 0), expected);
    }

    #[test]
    fn empty_table() {
        let dir = tempdir().unwrap();
        write_records(dir.path(), "headers", &[]);

        let table = FreezerTable::open(dir.path(), "headers").unwrap();
        assert_eq!(table.num_items(), 0);
        assert!(!table.cursor(0).unwrap().next().unwrap());
    }

    #[test]
    fn open_rejects_broken_layouts() {
        // missing table
        let dir = tempdir().unwrap();
        assert!(matches!(
            FreezerTable::open(dir.path(), "headers"),
            Err(FreezerError::MissingTable(_))
        ));

        // both index variants present
        let dir = tempdir().unwrap();
        write_records(dir.path(), "headers", &[b"a"]);
        std::fs::write(dir.path().join("headers.cidx"), [0u8; 6]).unwrap();
        assert!(matches!(
            FreezerTable::open(dir.path(), "headers"),
            Err(FreezerError::AmbiguousIndex(_))
        ));

        // index size not a multiple of the entry size
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("headers.ridx"), [0u8; 7]).unwrap();
        assert!(matches!(
            FreezerTable::open(dir.path(), "headers"),
            Err(FreezerError::InvalidIndexSize(7))
        ));

        // empty index
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("headers.ridx"), []).unwrap();
        assert!(matches!(
            FreezerTable::open(dir.path(), "headers"),
            Err(FreezerError::InvalidIndexSize(0))
        ));

        // data file referenced by the index is missing
        let dir = tempdir().unwrap();
        let mut index = Vec::new();
        for (file_num, offset) in [(0u16, 0u32), (0, 1)] {
            index.extend_from_slice(&file_num.to_be_bytes());
            index.extend_from_slice(&offset.to_be_bytes());
        }
        std::fs::write(dir.path().join("headers.ridx"), index).unwrap();
        assert!(matches!(
            FreezerTable::open(dir.path(), "headers"),
            Err(FreezerError::MissingDataFile(_))
        ));
    }

    #[test]
    fn corrupt_index_surfaces_errors() {
        // record extends past the end of its data file
        let dir = tempdir().unwrap();
        write_table(dir.path(), "headers", false, &[(0, 0), (0, 10)], &[b"short"]);
        let table = FreezerTable::open(dir.path(), "headers").unwrap();
        let mut cursor = table.cursor(0).unwrap();
        assert!(matches!(cursor.next(), Err(FreezerError::RecordOutOfBounds { .. })));

        // offsets going backwards within one file
        let dir = tempdir().unwrap();
        write_table(dir.path(), "headers", false, &[(0, 0), (0, 4), (0, 2)], &[b"abcdef"]);
        let table = FreezerTable::open(dir.path(), "headers").unwrap();
        let mut cursor = table.cursor(0).unwrap();
        assert!(cursor.next().unwrap());
        assert!(matches!(cursor.next(), Err(FreezerError::NonMonotonicIndex(2))));
    }
}
