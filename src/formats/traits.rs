//! Format reader and writer traits for VCF records.
//!
//! These traits give streaming readers and the export writers one interface,
//! so conversion code does not depend on a concrete format.
//!
//! # Example
//!
//! ```ignore
//! use vcfscope::formats::{FormatReader, FormatWriter};
//!
//! fn copy_records<R: FormatReader, W: FormatWriter>(
//!     reader: &mut R,
//!     writer: &mut W,
//! ) -> vcfscope::Result<usize> {
//!     let mut count = 0;
//!     while let Some(record) = reader.read_record()? {
//!         writer.write_record(&record)?;
//!         count += 1;
//!     }
//!     writer.finish()?;
//!     Ok(count)
//! }
//! ```

use crate::error::Result;
use crate::record::Record;

/// Trait for readers that produce VCF records from a source.
///
/// Implementations return `Ok(None)` when the source is exhausted and
/// preserve record order exactly.
pub trait FormatReader: std::fmt::Debug {
    /// Read the next record from the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoding fails fatally.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read all remaining records into a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails. On error, previously read records
    /// are discarded.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the number of records read so far, if tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

/// Trait for writers that serialize VCF records to a format.
///
/// Writers may buffer; [`finish`](Self::finish) must be called to flush the
/// output. Writing after `finish` is an error.
pub trait FormatWriter: std::fmt::Debug {
    /// Write a single record to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or the underlying
    /// output fails.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Write several records in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any record cannot be written.
    fn write_batch<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
        Self: Sized,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Finish writing and flush any buffered data.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()>;

    /// Returns the number of records written so far, if tracked.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Extension trait providing iterator-style access for format readers.
///
/// Automatically implemented for all types implementing [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Create an iterator over records from this reader.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator { reader: self }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter for [`FormatReader`].
///
/// Created by the [`records`](FormatReaderExt::records) method.
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VcfError;

    fn test_record(pos: u64) -> Record {
        Record::builder("chr1", pos, "A").build().unwrap()
    }

    #[derive(Debug)]
    struct MockReader {
        records: Vec<Record>,
        index: usize,
    }

    impl FormatReader for MockReader {
        fn read_record(&mut self) -> Result<Option<Record>> {
            let record = self.records.get(self.index).cloned();
            if record.is_some() {
                self.index += 1;
            }
            Ok(record)
        }

        fn records_read(&self) -> Option<usize> {
            Some(self.index)
        }
    }

    #[derive(Debug, Default)]
    struct MockWriter {
        records: Vec<Record>,
        finished: bool,
    }

    impl FormatWriter for MockWriter {
        fn write_record(&mut self, record: &Record) -> Result<()> {
            if self.finished {
                return Err(VcfError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "writer already finished",
                )));
            }
            self.records.push(record.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }

        fn records_written(&self) -> Option<usize> {
            Some(self.records.len())
        }
    }

    #[test]
    fn test_reader_read_all() {
        let mut reader = MockReader {
            records: vec![test_record(1), test_record(2), test_record(3)],
            index: 0,
        };
        assert_eq!(reader.read_all().unwrap().len(), 3);
        assert_eq!(reader.records_read(), Some(3));
    }

    #[test]
    fn test_reader_iterator() {
        let mut reader = MockReader {
            records: vec![test_record(1), test_record(2)],
            index: 0,
        };
        let positions: Vec<u64> = reader.records().map(|r| r.unwrap().pos()).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn test_writer_batch_and_finish() {
        let records = vec![test_record(1), test_record(2)];
        let mut writer = MockWriter::default();
        writer.write_batch(&records).unwrap();
        assert_eq!(writer.records_written(), Some(2));

        writer.finish().unwrap();
        assert!(writer.write_record(&records[0]).is_err());
    }
}
