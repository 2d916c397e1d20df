//! Export dispatcher.
//!
//! [`serialize`] turns a header and a sequence of records (a whole
//! [`VcfData`], or a query [`View`](crate::query::View)) into an in-memory
//! [`ExportPayload`] with a suggested filename and content type. Writing the
//! payload anywhere is left to the caller.
//!
//! # Examples
//!
//! ```
//! use vcfscope::export::{serialize, ExportOptions};
//! use vcfscope::formats::Format;
//! use vcfscope::query::{QuerySpec, SortKey};
//!
//! let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//!             chr1\t200\t.\tC\tT\t20\tPASS\t.\n\
//!             chr1\t100\t.\tA\tG\t50\tPASS\t.\n";
//! let data = vcfscope::decode(text)?;
//! let view = data.query(&QuerySpec::new().with_sort(SortKey::ascending("POS")));
//!
//! let options = ExportOptions::new(Format::Csv).with_columns(["POS", "QUAL"]);
//! let payload = serialize(data.header(), view.iter(), &options)?;
//!
//! assert_eq!(payload.filename, "vcf_export.csv");
//! assert_eq!(payload.content_type, "text/csv;charset=utf-8");
//! assert_eq!(payload.text(), "POS,QUAL\n100,50\n200,20\n");
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use std::borrow::Cow;

use crate::error::Result;
use crate::formats::Format;
use crate::header::Header;
use crate::record::{Record, VcfData};
use crate::writer::VcfWriter;

/// Options for an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Target encoding.
    pub format: Format,
    /// Emit header lines (VCF only).
    pub include_header: bool,
    /// Column allow-list for CSV and JSON; empty selects everything. Ignored by VCF.
    pub selected_columns: Vec<String>,
    /// Suggested filename; [`Format::default_filename`] when unset.
    pub filename: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions::new(Format::Vcf)
    }
}

impl ExportOptions {
    /// Options for `format` with header lines and every column.
    #[must_use]
    pub fn new(format: Format) -> Self {
        ExportOptions {
            format,
            include_header: true,
            selected_columns: Vec::new(),
            filename: None,
        }
    }

    /// Whether to emit header lines.
    #[must_use]
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Restrict and order output columns.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the suggested filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Encoded bytes (UTF-8 text for every format).
    pub bytes: Vec<u8>,
    /// Suggested filename.
    pub filename: String,
    /// Suggested content type.
    pub content_type: &'static str,
}

impl ExportPayload {
    /// The payload as text.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode `records` in the format named by `options`.
///
/// # Errors
///
/// Returns an export error if the encoder or its destination fails.
pub fn serialize<'a, I>(header: &Header, records: I, options: &ExportOptions) -> Result<ExportPayload>
where
    I: IntoIterator<Item = &'a Record>,
{
    let bytes = match options.format {
        Format::Vcf => {
            let mut writer = VcfWriter::new(Vec::new());
            if options.include_header {
                writer.write_header(header)?;
            }
            for record in records {
                writer.write_record(record)?;
            }
            writer.finish()?;
            writer.into_inner()
        },
        Format::Csv => crate::csv::records_to_csv(header, records, &options.selected_columns)?,
        Format::Json => {
            crate::json::records_to_json_bytes(header, records, &options.selected_columns)?
        },
    };

    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| options.format.default_filename());
    tracing::debug!(format = %options.format, bytes = bytes.len(), %filename, "serialized export");

    Ok(ExportPayload {
        bytes,
        filename,
        content_type: options.format.content_type(),
    })
}

/// Like [`serialize`], with the format given by its identifier.
///
/// # Errors
///
/// Returns [`VcfError::UnsupportedFormat`](crate::VcfError::UnsupportedFormat)
/// for identifiers other than `vcf`, `csv` and `json`.
pub fn serialize_as<'a, I>(
    header: &Header,
    records: I,
    format: &str,
    options: &ExportOptions,
) -> Result<ExportPayload>
where
    I: IntoIterator<Item = &'a Record>,
{
    let options = ExportOptions {
        format: format.parse()?,
        ..options.clone()
    };
    serialize(header, records, &options)
}

impl VcfData {
    /// Export every record.
    ///
    /// # Errors
    ///
    /// As [`serialize`].
    pub fn export(&self, options: &ExportOptions) -> Result<ExportPayload> {
        serialize(self.header(), self.records(), options)
    }
}
