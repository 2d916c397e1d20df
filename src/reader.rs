//! Reading VCF records from text streams.
//!
//! This module provides [`VcfReader`] for reading VCF records one at a time
//! from any source that implements [`std::io::BufRead`]. The header is read
//! when the reader is created; records are decoded lazily with the same
//! skip-and-report policy as [`Decoder`](crate::decoder::Decoder).
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use vcfscope::VcfReader;
//!
//! let file = File::open("calls.vcf")?;
//! let mut reader = VcfReader::new(BufReader::new(file))?;
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{}:{}", record.chrom(), record.pos());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Reading from a buffer:
//!
//! ```
//! use std::io::Cursor;
//! use vcfscope::VcfReader;
//!
//! let data = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
//!             chr1\t10\t.\tA\tC\t.\tPASS\t.\tGT\t0/1\n";
//! let mut reader = VcfReader::new(Cursor::new(data))?;
//! assert_eq!(reader.header().samples, vec!["S1"]);
//!
//! let record = reader.read_record()?.expect("one record");
//! assert_eq!(record.sample_value(0, "GT"), Some("0/1"));
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use std::io::{BufRead, ErrorKind};

use crate::decoder::{DecodeOptions, Decoded, LineDecoder};
use crate::error::{Result, VcfError};
use crate::formats::FormatReader;
use crate::header::Header;
use crate::record::{Record, VcfData};
use crate::recovery::DecodeWarning;

/// Streaming reader for VCF text.
#[derive(Debug)]
pub struct VcfReader<R: BufRead> {
    reader: R,
    decoder: LineDecoder,
    buffer: String,
    pending: Option<String>,
    line_no: usize,
    records_read: usize,
}

impl<R: BufRead> VcfReader<R> {
    /// Create a reader with default options and read the header.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Acquisition`] if the source fails, or
    /// [`VcfError::Decode`] if it is not UTF-8.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, DecodeOptions::default())
    }

    /// Create a reader with the given options and read the header.
    ///
    /// The progress interval is not used; a stream has no known length.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_options(reader: R, options: DecodeOptions) -> Result<Self> {
        let mut vcf_reader = VcfReader {
            reader,
            decoder: LineDecoder::new(options.recovery_mode),
            buffer: String::new(),
            pending: None,
            line_no: 0,
            records_read: 0,
        };
        vcf_reader.read_header()?;
        Ok(vcf_reader)
    }

    /// The header read from the source.
    #[must_use]
    pub fn header(&self) -> &Header {
        self.decoder.header()
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.decoder.recovery().warnings
    }

    /// Read the next record, skipping malformed lines.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Acquisition`] if the source fails,
    /// [`VcfError::Decode`] on non-UTF-8 input, or in strict mode on the
    /// first malformed line.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        loop {
            let line = match self.pending.take() {
                Some(line) => line,
                None => match self.next_line()? {
                    Some(line) => line,
                    None => return Ok(None),
                },
            };
            if let Some(record) = self.decoder.push_line(self.line_no, &line)? {
                self.records_read += 1;
                return Ok(Some(record));
            }
        }
    }

    /// Read every remaining record and assemble the full model.
    ///
    /// # Errors
    ///
    /// As [`read_record`](Self::read_record); on error nothing is returned.
    pub fn read_to_end(mut self) -> Result<Decoded> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        let (header, recovery) = self.decoder.finish();
        Ok(Decoded {
            data: VcfData::new(header, records)?,
            warnings: recovery.warnings,
            records_skipped: recovery.records_skipped,
        })
    }

    /// Consume header lines; the first record line is kept for `read_record`.
    fn read_header(&mut self) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if line.starts_with('#') || line.trim().is_empty() {
                self.decoder.push_line(self.line_no, &line)?;
            } else {
                self.pending = Some(line);
                break;
            }
        }
        Ok(())
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        let read = self.reader.read_line(&mut self.buffer).map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                VcfError::Decode(format!("input is not valid UTF-8 near line {}", self.line_no + 1))
            } else {
                VcfError::Acquisition(e.to_string())
            }
        })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let mut line = std::mem::take(&mut self.buffer);
        if line.ends_with('\n') {
            line.pop();
        }
        if self.line_no == 1 {
            if let Some(stripped) = line.strip_prefix('\u{feff}') {
                line = stripped.to_string();
            }
        }
        Ok(Some(line))
    }
}

impl<R: BufRead + std::fmt::Debug> FormatReader for VcfReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        VcfReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}
