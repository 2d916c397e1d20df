//! Error types for VCF operations.
//!
//! This module provides the [`VcfError`] type for all fatal failures and the
//! [`Result`] convenience type. Per-line problems found while decoding are not
//! errors; they are reported as [`DecodeWarning`](crate::recovery::DecodeWarning)
//! values and the offending line is skipped.

use thiserror::Error;

/// Error type for all fatal VCF library operations.
#[derive(Error, Debug)]
pub enum VcfError {
    /// The raw input could not be acquired (read failure on the source).
    #[error("Acquisition error: {0}")]
    Acquisition(String),

    /// The input as a whole cannot be interpreted as VCF text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decoding was stopped by the progress observer.
    #[error("Decode cancelled at {progress}%")]
    Cancelled {
        /// Last progress value emitted before cancellation.
        progress: u8,
    },

    /// A record violates a model invariant at construction time.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The requested export format is not one of `vcf`, `csv`, `json`.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Tabular serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Structured serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an encoded payload to its destination failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`VcfError`] for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input could not be read.
    Acquisition,
    /// The input could not be decoded, or decoding was cancelled.
    Decode,
    /// The export format identifier is not supported.
    UnsupportedFormat,
    /// An export payload could not be produced.
    Export,
}

impl VcfError {
    /// Classify this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            VcfError::Acquisition(_) => ErrorCategory::Acquisition,
            VcfError::Decode(_) | VcfError::Cancelled { .. } | VcfError::InvalidRecord(_) => {
                ErrorCategory::Decode
            },
            VcfError::UnsupportedFormat(_) => ErrorCategory::UnsupportedFormat,
            VcfError::Csv(_) | VcfError::Json(_) | VcfError::Io(_) => ErrorCategory::Export,
        }
    }

    /// Render a single human-readable message suitable for showing to a user.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcfscope::VcfError;
    ///
    /// let err = VcfError::UnsupportedFormat("xlsx".to_string());
    /// assert_eq!(err.user_message(), "Unsupported export format: xlsx");
    /// ```
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VcfError::Acquisition(msg) => format!("Failed to load VCF data: {msg}"),
            VcfError::Decode(msg) | VcfError::InvalidRecord(msg) => {
                format!("Failed to parse VCF data: {msg}")
            },
            VcfError::Cancelled { progress } => {
                format!("Failed to parse VCF data: cancelled at {progress}%")
            },
            VcfError::UnsupportedFormat(format) => format!("Unsupported export format: {format}"),
            VcfError::Csv(e) => format!("Failed to export: {e}"),
            VcfError::Json(e) => format!("Failed to export: {e}"),
            VcfError::Io(e) => format!("Failed to export: {e}"),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`VcfError`].
pub type Result<T> = std::result::Result<T, VcfError>;
