//! Export formats and the reader/writer traits shared by their implementations.
//!
//! # Supported Formats
//!
//! | Format | Module | Description |
//! |--------|--------|-------------|
//! | VCF | [`writer`](crate::writer) | Format-native re-encoding |
//! | CSV | [`csv`](crate::csv) | Flat tabular encoding, one row per record |
//! | JSON | [`json`](crate::json) | Structured encoding preserving value types |
//!
//! # Usage
//!
//! ```
//! use std::str::FromStr;
//! use vcfscope::formats::Format;
//!
//! let format = Format::from_str("csv")?;
//! assert_eq!(format.content_type(), "text/csv;charset=utf-8");
//! assert!(Format::from_str("xlsx").is_err());
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

mod traits;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VcfError;

pub use traits::{FormatReader, FormatReaderExt, FormatWriter, RecordIterator};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// VCF text (`.vcf`)
    Vcf,
    /// Comma-separated values (`.csv`)
    Csv,
    /// JSON array of records (`.json`)
    Json,
}

/// All supported formats, in menu order.
#[must_use]
pub const fn supported_formats() -> [Format; 3] {
    [Format::Vcf, Format::Csv, Format::Json]
}

impl Format {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    ///
    /// # Example
    ///
    /// ```
    /// use vcfscope::formats::Format;
    ///
    /// assert_eq!(Format::from_extension("VCF"), Some(Format::Vcf));
    /// assert_eq!(Format::from_extension("bcf"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "vcf" => Some(Self::Vcf),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Canonical file extension, also the format's identifier.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Vcf => "vcf",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Content type suggested for the payload.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Vcf => "text/plain;charset=utf-8",
            Self::Csv => "text/csv;charset=utf-8",
            Self::Json => "application/json;charset=utf-8",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Vcf => "VCF",
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }

    /// Filename suggested when the caller supplies none.
    #[must_use]
    pub fn default_filename(&self) -> String {
        format!("vcf_export.{}", self.extension())
    }
}

impl FromStr for Format {
    type Err = VcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| VcfError::UnsupportedFormat(s.to_string()))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("vcf"), Some(Format::Vcf));
        assert_eq!(Format::from_extension("CSV"), Some(Format::Csv));
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("unknown"), None);
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = "parquet".parse::<Format>().unwrap_err();
        assert!(matches!(err, VcfError::UnsupportedFormat(ref f) if f == "parquet"));
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(Format::Json.content_type(), "application/json;charset=utf-8");
        assert_eq!(Format::Csv.default_filename(), "vcf_export.csv");
        assert_eq!(format!("{}", Format::Vcf), "VCF");
        assert_eq!(supported_formats().len(), 3);
    }

    #[test]
    fn test_format_serde_identifier() {
        assert_eq!(serde_json::to_string(&Format::Csv).unwrap(), "\"csv\"");
        let format: Format = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, Format::Json);
    }
}
