//! Record Store Iterator
//!
//! Sequential iteration over the records of a store.

use crate::error::Result;

use super::reader::RecordReader;

/// Iterator over store records in file order
pub struct RecordIterator<'a> {
    reader: &'a mut RecordReader,
    /// Records still to yield
    remaining: u64,
}

impl<'a> RecordIterator<'a> {
    pub(super) fn new(reader: &'a mut RecordReader) -> Self {
        let remaining = reader.record_count();
        Self { reader, remaining }
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let mut record = vec![0u8; self.reader.record_size()];
        match self.reader.read_next(&mut record) {
            Ok(true) => {
                self.remaining -= 1;
                Some(Ok(record))
            }
            Ok(false) => {
                self.remaining = 0;
                None
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (0, Some(n))
    }
}
