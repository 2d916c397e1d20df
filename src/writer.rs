//! Writing records back to VCF text.
//!
//! [`VcfWriter`] re-encodes a [`Header`] and [`Record`]s to tab-delimited VCF.
//! Absent and empty values are written as the `.` sentinel, so decoding the
//! output yields the same record model.
//!
//! # Examples
//!
//! ```
//! use vcfscope::{Header, Record, VcfWriter};
//!
//! # fn main() -> vcfscope::Result<()> {
//! let record = Record::builder("chr1", 100, "A").alternate("G").build()?;
//!
//! let mut buffer = Vec::new();
//! let mut writer = VcfWriter::new(&mut buffer);
//! writer.write_header(&Header::default())?;
//! writer.write_record(&record)?;
//! writer.finish()?;
//!
//! let text = String::from_utf8(buffer).unwrap();
//! assert!(text.ends_with("chr1\t100\t.\tA\tG\t.\t.\t.\n"));
//! # Ok(())
//! # }
//! ```

use std::fmt::Write as _;
use std::io::Write;

use crate::error::{Result, VcfError};
use crate::formats::FormatWriter;
use crate::header::Header;
use crate::record::{Record, MISSING};

const FIXED_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

/// Writer for VCF text.
///
/// Records are written one line at a time to any [`std::io::Write`]
/// destination. The header is optional and must precede the first record.
#[derive(Debug)]
pub struct VcfWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> VcfWriter<W> {
    /// Create a new VCF writer.
    pub fn new(writer: W) -> Self {
        VcfWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Write the header lines: `##fileformat`, `##INFO`, `##FORMAT`,
    /// `##contig`, remaining meta lines, then the `#CHROM` column line.
    ///
    /// # Errors
    ///
    /// Returns an error if records were already written, the writer is
    /// finished, or the underlying writer fails.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.ensure_open()?;
        if self.records_written > 0 {
            return Err(VcfError::InvalidRecord(
                "Header must be written before any record".to_string(),
            ));
        }
        self.writer.write_all(format_header(header).as_bytes())?;
        Ok(())
    }

    /// Write a single record line.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or the underlying writer fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.ensure_open()?;
        let mut line = format_record(record);
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Recover the underlying destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            Err(VcfError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for VcfWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        VcfWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        VcfWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}

/// Render the header lines, each terminated by `\n`.
#[must_use]
pub fn format_header(header: &Header) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "##fileformat={}", header.fileformat);
    for (id, description) in &header.info {
        let _ = writeln!(out, "##INFO=<ID={id},Description=\"{description}\">");
    }
    for (id, description) in &header.format {
        let _ = writeln!(out, "##FORMAT=<ID={id},Description=\"{description}\">");
    }
    for (id, attributes) in &header.contigs {
        if attributes.is_empty() {
            let _ = writeln!(out, "##contig=<ID={id}>");
        } else {
            let _ = writeln!(out, "##contig=<ID={id},{attributes}>");
        }
    }
    for (key, values) in &header.meta {
        for value in values {
            if value.is_empty() {
                let _ = writeln!(out, "##{key}");
            } else {
                let _ = writeln!(out, "##{key}={value}");
            }
        }
    }
    out.push_str(FIXED_HEADER);
    if !header.samples.is_empty() {
        out.push_str("\tFORMAT");
        for sample in &header.samples {
            out.push('\t');
            out.push_str(sample);
        }
    }
    out.push('\n');
    out
}

/// Render one record as a tab-delimited line, without terminator.
#[must_use]
pub fn format_record(record: &Record) -> String {
    let mut line = String::with_capacity(64);
    line.push_str(record.chrom());
    let _ = write!(line, "\t{}\t", record.pos());
    line.push_str(record.id().unwrap_or(MISSING));
    line.push('\t');
    line.push_str(record.reference());
    line.push('\t');
    push_list(&mut line, record.alternates(), ",");
    line.push('\t');
    match record.quality() {
        Some(q) => {
            let _ = write!(line, "{q}");
        },
        None => line.push_str(MISSING),
    }
    line.push('\t');
    push_list(&mut line, record.filters(), ";");
    line.push('\t');
    line.push_str(&format_info(record));

    if let Some(keys) = record.format() {
        line.push('\t');
        push_list(&mut line, keys, ":");
        for sample in record.samples().unwrap_or_default() {
            line.push('\t');
            let values: Vec<&str> = keys
                .iter()
                .map(|key| match sample.get(key).map(String::as_str) {
                    None | Some("") => MISSING,
                    Some(value) => value,
                })
                .collect();
            line.push_str(&values.join(":"));
        }
    }
    line
}

/// Render the INFO column: flags as bare keys, others as `key=value`.
#[must_use]
pub fn format_info(record: &Record) -> String {
    if record.info().is_empty() {
        return MISSING.to_string();
    }
    record
        .info()
        .iter()
        .map(|(key, value)| {
            if value.is_flag() {
                key.clone()
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn push_list(line: &mut String, items: &[String], separator: &str) {
    if items.is_empty() {
        line.push_str(MISSING);
    } else {
        line.push_str(&items.join(separator));
    }
}
