//! Recovery strategies for malformed record lines.
//!
//! Decoding is tolerant by default: a line that cannot become a [`Record`](crate::Record)
//! is skipped and reported as a [`DecodeWarning`], and a field whose numeric
//! parse fails degrades to absent/text. [`RecoveryMode::Strict`] turns the first
//! skipped line into a fatal [`VcfError::Decode`].

use std::fmt;

use crate::error::{Result, VcfError};

/// Strategy for handling malformed record lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Skip malformed lines and keep decoding (default)
    #[default]
    Lenient,
    /// Fail the whole decode on the first malformed line
    Strict,
}

/// A non-fatal issue found while decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// A record line was dropped.
    RecordSkipped {
        /// 1-based input line number.
        line: usize,
        /// Chromosome column, if the line had one.
        chrom: Option<String>,
        /// Raw position column, if the line had one.
        pos: Option<String>,
        /// Why the line was dropped.
        reason: String,
    },
    /// A field failed its numeric parse and was kept as absent or text.
    CoercionFallback {
        /// 1-based input line number.
        line: usize,
        /// Column name (`QUAL`).
        field: &'static str,
        /// The raw value that did not parse.
        value: String,
    },
    /// The sample block width disagrees with the header's sample names.
    SampleColumns {
        /// 1-based input line number.
        line: usize,
        /// Samples declared by the header.
        expected: usize,
        /// Sample columns present on the line.
        found: usize,
    },
}

impl DecodeWarning {
    /// Input line the warning refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            DecodeWarning::RecordSkipped { line, .. }
            | DecodeWarning::CoercionFallback { line, .. }
            | DecodeWarning::SampleColumns { line, .. } => *line,
        }
    }

    /// Whether the warning dropped a record.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, DecodeWarning::RecordSkipped { .. })
    }
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::RecordSkipped {
                line,
                chrom,
                pos,
                reason,
            } => {
                write!(f, "line {line}")?;
                if let Some(chrom) = chrom {
                    write!(f, " ({chrom}")?;
                    if let Some(pos) = pos {
                        write!(f, ":{pos}")?;
                    }
                    f.write_str(")")?;
                }
                write!(f, ": skipped record: {reason}")
            },
            DecodeWarning::CoercionFallback { line, field, value } => {
                write!(f, "line {line}: {field} value '{value}' is not a number, treated as absent")
            },
            DecodeWarning::SampleColumns {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: {found} sample columns, header declares {expected}"
            ),
        }
    }
}

/// Recovery context collecting warnings during one decode.
#[derive(Debug, Default)]
pub struct RecoveryContext {
    /// Current recovery mode
    pub mode: RecoveryMode,
    /// Warnings in input order
    pub warnings: Vec<DecodeWarning>,
    /// Number of record lines dropped
    pub records_skipped: usize,
}

impl RecoveryContext {
    /// Create a new recovery context with the given mode
    #[must_use]
    pub fn new(mode: RecoveryMode) -> Self {
        RecoveryContext {
            mode,
            warnings: Vec::new(),
            records_skipped: 0,
        }
    }

    /// Report a skipped record line.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Decode`] in strict mode; otherwise records the
    /// warning and returns `Ok(())`.
    pub fn skip(&mut self, warning: DecodeWarning) -> Result<()> {
        match self.mode {
            RecoveryMode::Strict => Err(VcfError::Decode(warning.to_string())),
            RecoveryMode::Lenient => {
                tracing::warn!(line = warning.line(), "{warning}");
                self.records_skipped += 1;
                self.warnings.push(warning);
                Ok(())
            },
        }
    }

    /// Report a non-fatal field-level issue. Never fails, in either mode.
    pub fn note(&mut self, warning: DecodeWarning) {
        tracing::debug!(line = warning.line(), "{warning}");
        self.warnings.push(warning);
    }

    /// Whether any warning was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(line: usize) -> DecodeWarning {
        DecodeWarning::RecordSkipped {
            line,
            chrom: Some("chr2".to_string()),
            pos: Some("abc".to_string()),
            reason: "invalid position".to_string(),
        }
    }

    #[test]
    fn test_recovery_context_default() {
        let ctx = RecoveryContext::default();
        assert_eq!(ctx.mode, RecoveryMode::Lenient);
        assert!(!ctx.has_warnings());
        assert_eq!(ctx.records_skipped, 0);
    }

    #[test]
    fn test_lenient_mode_collects() {
        let mut ctx = RecoveryContext::new(RecoveryMode::Lenient);
        assert!(ctx.skip(skipped(7)).is_ok());
        ctx.note(DecodeWarning::CoercionFallback {
            line: 8,
            field: "QUAL",
            value: "high".to_string(),
        });
        assert_eq!(ctx.records_skipped, 1);
        assert_eq!(ctx.warnings.len(), 2);
        assert!(ctx.warnings[0].is_skip());
        assert!(!ctx.warnings[1].is_skip());
    }

    #[test]
    fn test_strict_mode_fails() {
        let mut ctx = RecoveryContext::new(RecoveryMode::Strict);
        let err = ctx.skip(skipped(3)).unwrap_err();
        assert!(matches!(err, VcfError::Decode(_)));
        assert!(err.to_string().contains("line 3 (chr2:abc)"));
    }

    #[test]
    fn test_warning_display() {
        let warning = DecodeWarning::RecordSkipped {
            line: 12,
            chrom: None,
            pos: None,
            reason: "expected at least 8 columns, found 3".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "line 12: skipped record: expected at least 8 columns, found 3"
        );
    }
}
