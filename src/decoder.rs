//! Decoding VCF text into the record model.
//!
//! Decoding is a single pass over the input lines. `##` and `#CHROM` lines
//! are consumed into the [`Header`] until the first record line; every
//! following non-empty, non-`#` line becomes a [`Record`]. Lines that cannot
//! be decoded are skipped and reported (see [`recovery`](crate::recovery)).
//!
//! # Examples
//!
//! ```
//! use vcfscope::decoder::decode;
//!
//! let text = "##fileformat=VCFv4.2\n\
//!             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//!             chr1\t100\trs1\tA\tG\t30\tPASS\tDP=10;DB\n";
//! let data = decode(text)?;
//!
//! assert_eq!(data.len(), 1);
//! assert_eq!(data.records()[0].id(), Some("rs1"));
//! assert!(data.records()[0].has_flag("DB"));
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, VcfError};
use crate::header::Header;
use crate::progress::{NoProgress, ProgressObserver, ProgressTracker, COMPLETE, RECORDS_START};
use crate::record::{parse_number, InfoValue, Record, VcfData, MISSING, REQUIRED_COLUMNS};
use crate::recovery::{DecodeWarning, RecoveryContext, RecoveryMode};

lazy_static! {
    static ref INFO_LINE: Regex =
        Regex::new(r#"^##INFO=<ID=([^,>]+),[^>]*Description="([^"]*)""#).expect("valid regex");
    static ref FORMAT_LINE: Regex =
        Regex::new(r#"^##FORMAT=<ID=([^,>]+),[^>]*Description="([^"]*)""#).expect("valid regex");
    static ref CONTIG_LINE: Regex =
        Regex::new(r"^##contig=<ID=([^,>]+)(?:,(.*))?>$").expect("valid regex");
}

const UTF8_BOM: &str = "\u{feff}";

/// Default number of records between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Options controlling a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// How malformed record lines are handled.
    pub recovery_mode: RecoveryMode,
    /// Records decoded between two progress reports.
    pub progress_interval: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            recovery_mode: RecoveryMode::Lenient,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl DecodeOptions {
    /// Set the recovery mode.
    #[must_use]
    pub fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery_mode = mode;
        self
    }

    /// Set the progress interval (clamped to at least one record).
    #[must_use]
    pub fn with_progress_interval(mut self, records: usize) -> Self {
        self.progress_interval = records.max(1);
        self
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Header and records.
    pub data: VcfData,
    /// Non-fatal issues in input order.
    pub warnings: Vec<DecodeWarning>,
    /// Number of record lines dropped.
    pub records_skipped: usize,
}

/// VCF text decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Create a decoder with the given options.
    #[must_use]
    pub fn new(options: DecodeOptions) -> Self {
        Decoder { options }
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode VCF text.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Decode`] in strict mode when a line is malformed.
    /// Lenient decodes of text do not fail.
    pub fn decode(&self, text: &str) -> Result<Decoded> {
        self.decode_with_progress(text, &mut NoProgress)
    }

    /// Decode raw bytes, which must be UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Decode`] if the input is not valid UTF-8, plus the
    /// errors of [`decode`](Self::decode).
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Decoded> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| VcfError::Decode(format!("input is not valid UTF-8: {e}")))?;
        self.decode(text)
    }

    /// Decode VCF text, reporting progress to `observer`.
    ///
    /// Progress starts at 0, reaches 50 when the first record line is seen,
    /// rises every `progress_interval` records and ends at 100.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::Cancelled`] if the observer breaks; nothing decoded
    /// so far is returned. Otherwise as [`decode`](Self::decode).
    pub fn decode_with_progress<O>(&self, text: &str, observer: &mut O) -> Result<Decoded>
    where
        O: ProgressObserver + ?Sized,
    {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let total_lines = memchr::memchr_iter(b'\n', text.as_bytes()).count() + 1;
        let interval = self.options.progress_interval.max(1);
        tracing::debug!(bytes = text.len(), lines = total_lines, "decoding VCF text");

        let mut tracker = ProgressTracker::new(observer);
        tracker.emit(0)?;

        let mut lines = LineDecoder::new(self.options.recovery_mode);
        let mut records = Vec::new();
        let mut records_started = false;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let record = lines.push_line(line_no, line)?;
            if !records_started && !lines.in_header() {
                records_started = true;
                tracker.emit(RECORDS_START)?;
            }
            if let Some(record) = record {
                records.push(record);
                if records.len() % interval == 0 {
                    tracker.emit_fraction(line_no, total_lines)?;
                }
            }
        }

        let (header, recovery) = lines.finish();
        let data = VcfData::new(header, records)?;
        tracker.emit(RECORDS_START)?;
        tracker.emit(COMPLETE)?;
        tracing::debug!(
            records = data.len(),
            skipped = recovery.records_skipped,
            "decoded VCF text"
        );

        Ok(Decoded {
            data,
            warnings: recovery.warnings,
            records_skipped: recovery.records_skipped,
        })
    }
}

/// Decode VCF text with default options.
///
/// Warnings are logged through `tracing`; use [`Decoder`] to inspect them.
///
/// # Errors
///
/// Never fails for text input under the default (lenient) options; the
/// signature matches the other decode entry points.
pub fn decode(text: &str) -> Result<VcfData> {
    Decoder::default().decode(text).map(|decoded| decoded.data)
}

/// Decode UTF-8 bytes with default options.
///
/// # Errors
///
/// Returns [`VcfError::Decode`] if the input is not valid UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> Result<VcfData> {
    Decoder::default()
        .decode_bytes(bytes)
        .map(|decoded| decoded.data)
}

/// Line-at-a-time decoding state shared by [`Decoder`] and
/// [`VcfReader`](crate::reader::VcfReader).
#[derive(Debug)]
pub(crate) struct LineDecoder {
    header: Header,
    in_header: bool,
    recovery: RecoveryContext,
}

impl LineDecoder {
    pub(crate) fn new(mode: RecoveryMode) -> Self {
        LineDecoder {
            header: Header::default(),
            in_header: true,
            recovery: RecoveryContext::new(mode),
        }
    }

    pub(crate) fn in_header(&self) -> bool {
        self.in_header
    }

    pub(crate) fn header(&self) -> &Header {
        &self.header
    }

    pub(crate) fn recovery(&self) -> &RecoveryContext {
        &self.recovery
    }

    pub(crate) fn finish(self) -> (Header, RecoveryContext) {
        (self.header, self.recovery)
    }

    /// Feed one line (without its terminator). Returns the decoded record, if any.
    pub(crate) fn push_line(&mut self, line_no: usize, line: &str) -> Result<Option<Record>> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.starts_with('#') {
            if self.in_header {
                self.header_line(line);
            } else {
                tracing::debug!(line = line_no, "ignoring '#' line after first record");
            }
            return Ok(None);
        }
        if line.trim().is_empty() {
            return Ok(None);
        }

        self.in_header = false;
        match self.record_line(line_no, line) {
            Ok(record) => Ok(Some(record)),
            Err(warning) => {
                self.recovery.skip(warning)?;
                Ok(None)
            },
        }
    }

    fn header_line(&mut self, line: &str) {
        if let Some(format) = line.strip_prefix("##fileformat=") {
            self.header.fileformat = format.to_string();
        } else if line.starts_with("##INFO=") {
            if !register(&INFO_LINE, line, &mut self.header.info) {
                self.keep_as_meta(line);
            }
        } else if line.starts_with("##FORMAT=") {
            if !register(&FORMAT_LINE, line, &mut self.header.format) {
                self.keep_as_meta(line);
            }
        } else if line.starts_with("##contig=") {
            match CONTIG_LINE.captures(line) {
                Some(caps) => {
                    let attributes = caps.get(2).map_or("", |m| m.as_str());
                    self.header
                        .contigs
                        .insert(caps[1].to_string(), attributes.to_string());
                },
                None => self.keep_as_meta(line),
            }
        } else if line.starts_with("##") {
            self.keep_as_meta(line);
        } else if line.starts_with("#CHROM") {
            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() > 9 {
                self.header.samples = columns[9..].iter().map(|s| (*s).to_string()).collect();
            }
        }
    }

    fn keep_as_meta(&mut self, line: &str) {
        let body = &line[2..];
        match body.split_once('=') {
            Some((key, value)) => self.header.add_meta(key, value),
            None => self.header.add_meta(body, ""),
        }
    }

    fn record_line(&mut self, line_no: usize, line: &str) -> std::result::Result<Record, DecodeWarning> {
        let columns: Vec<&str> = line.split('\t').collect();
        let skipped = |reason: String| DecodeWarning::RecordSkipped {
            line: line_no,
            chrom: columns.first().filter(|c| !c.is_empty()).map(|c| (*c).to_string()),
            pos: columns.get(1).map(|p| (*p).to_string()),
            reason,
        };

        if columns.len() < REQUIRED_COLUMNS {
            return Err(skipped(format!(
                "expected at least {REQUIRED_COLUMNS} tab-delimited columns, found {}",
                columns.len()
            )));
        }

        let pos = columns[1]
            .trim()
            .parse::<u64>()
            .map_err(|_| skipped(format!("invalid position '{}'", columns[1])))?;

        let quality = match columns[5] {
            MISSING => None,
            raw => {
                let parsed = parse_number(raw);
                if parsed.is_none() {
                    self.recovery.note(DecodeWarning::CoercionFallback {
                        line: line_no,
                        field: "QUAL",
                        value: raw.to_string(),
                    });
                }
                parsed
            },
        };

        let mut builder = Record::builder(columns[0], pos, columns[3])
            .id(match columns[2] {
                MISSING => None,
                id => Some(id.to_string()),
            })
            .alternates(split_list(columns[4], ','))
            .quality(quality)
            .filters(split_list(columns[6], ';'));

        for (key, value) in parse_info(columns[7]) {
            builder = builder.info(key, value);
        }

        let declared = self.header.sample_count();
        if declared > 0 && columns.len() > REQUIRED_COLUMNS && !columns[8].is_empty() {
            let sample_columns = &columns[REQUIRED_COLUMNS + 1..];
            if sample_columns.len() != declared {
                self.recovery.note(DecodeWarning::SampleColumns {
                    line: line_no,
                    expected: declared,
                    found: sample_columns.len(),
                });
            }
            builder = builder.format(columns[8].split(':'));
            for index in 0..declared {
                let values = sample_columns
                    .get(index)
                    .map(|column| column.split(':').collect::<Vec<_>>())
                    .unwrap_or_default();
                builder = builder.sample(values);
            }
        }

        builder.build().map_err(|e| match e {
            VcfError::InvalidRecord(reason) => skipped(reason),
            other => skipped(other.to_string()),
        })
    }
}

fn register(pattern: &Regex, line: &str, registry: &mut IndexMap<String, String>) -> bool {
    match pattern.captures(line) {
        Some(caps) => {
            registry.insert(caps[1].to_string(), caps[2].to_string());
            true
        },
        None => false,
    }
}

/// Split a list column; `.` is the empty list.
fn split_list(column: &str, separator: char) -> Vec<&str> {
    if column == MISSING {
        Vec::new()
    } else {
        column.split(separator).collect()
    }
}

/// Parse an INFO column into typed entries. Empty segments are ignored and
/// values are split at the first `=`.
pub(crate) fn parse_info(column: &str) -> Vec<(&str, InfoValue)> {
    if column == MISSING {
        return Vec::new();
    }
    column
        .split(';')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some(("", _)) => None,
            Some((key, value)) => Some((key, InfoValue::parse(value))),
            None => Some((pair, InfoValue::Flag)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::*;

    const TWO_SAMPLES: &str = "##fileformat=VCFv4.3\n\
        ##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
        ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
        ##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Read Depth\">\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\n\
        chr1\t100\t.\tA\tG\t30\tPASS\tDP=10\tGT:DP\t0/1:5\t1/1:7\n";

    #[test]
    fn test_decode_two_sample_record() {
        let data = decode(TWO_SAMPLES).unwrap();
        assert_eq!(data.header().fileformat, "VCFv4.3");
        assert_eq!(data.header().samples, vec!["S1", "S2"]);
        assert_eq!(data.header().info_description("DP"), Some("Total Depth"));
        assert_eq!(data.header().format_description("GT"), Some("Genotype"));

        let record = &data.records()[0];
        assert_eq!(record.chrom(), "chr1");
        assert_eq!(record.pos(), 100);
        assert_eq!(record.id(), None);
        assert_eq!(record.alternates(), ["G"]);
        assert_eq!(record.quality(), Some(30.0));
        assert_eq!(record.filters(), ["PASS"]);
        assert_eq!(record.info_value("DP"), Some(&InfoValue::Number(10.0)));
        assert_eq!(record.format().unwrap(), ["GT", "DP"]);
        assert_eq!(record.sample_value(0, "GT"), Some("0/1"));
        assert_eq!(record.sample_value(0, "DP"), Some("5"));
        assert_eq!(record.sample_value(1, "GT"), Some("1/1"));
        assert_eq!(record.sample_value(1, "DP"), Some("7"));
    }

    #[test]
    fn test_missing_sentinels_become_absent() {
        let data = decode("chr1\t5\t.\tA\t.\t.\t.\t.\n").unwrap();
        let record = &data.records()[0];
        assert_eq!(record.id(), None);
        assert!(record.alternates().is_empty());
        assert_eq!(record.quality(), None);
        assert!(record.filters().is_empty());
        assert!(record.info().is_empty());
        assert!(record.format().is_none());
    }

    #[test]
    fn test_lists_and_info_kinds() {
        let data = decode("chr1\t5\trs9\tA\tG,T\t12.5\tq10;s50\tAF=0.5,0.25;DB;NOTE=x=y;;\n").unwrap();
        let record = &data.records()[0];
        assert_eq!(record.alternates(), ["G", "T"]);
        assert_eq!(record.filters(), ["q10", "s50"]);
        assert_eq!(
            record.info_value("AF"),
            Some(&InfoValue::Text("0.5,0.25".to_string()))
        );
        assert!(record.has_flag("DB"));
        assert_eq!(
            record.info_value("NOTE"),
            Some(&InfoValue::Text("x=y".to_string()))
        );
        assert_eq!(record.info().len(), 3);
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let text = "chr1\t1\t.\tA\tG\t.\t.\t.\n\
                    chr1\t2\t.\tA\n\
                    chr1\t3\t.\tC\tT\t.\t.\t.\n";
        let decoded = Decoder::default().decode(text).unwrap();
        assert_eq!(decoded.data.len(), 2);
        assert_eq!(decoded.records_skipped, 1);
        match &decoded.warnings[0] {
            DecodeWarning::RecordSkipped {
                line, chrom, pos, ..
            } => {
                assert_eq!(*line, 2);
                assert_eq!(chrom.as_deref(), Some("chr1"));
                assert_eq!(pos.as_deref(), Some("2"));
            },
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn test_bad_position_is_skipped_bad_quality_degrades() {
        let text = "chr1\tabc\t.\tA\tG\t.\t.\t.\n\
                    chr1\t7\t.\tA\tG\thigh\t.\t.\n";
        let decoded = Decoder::default().decode(text).unwrap();
        assert_eq!(decoded.data.len(), 1);
        assert_eq!(decoded.data.records()[0].quality(), None);
        assert_eq!(decoded.records_skipped, 1);
        assert!(decoded.warnings.iter().any(|w| matches!(
            w,
            DecodeWarning::CoercionFallback { field: "QUAL", .. }
        )));
    }

    #[test]
    fn test_strict_mode_fails_on_malformed_line() {
        let decoder = Decoder::new(DecodeOptions::default().with_recovery_mode(RecoveryMode::Strict));
        let err = decoder.decode("chr1\t1\t.\tA\n").unwrap_err();
        assert!(matches!(err, VcfError::Decode(_)));
    }

    #[test]
    fn test_short_and_missing_samples_are_padded() {
        let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\tS3\n\
                    chr1\t100\t.\tA\tG\t.\t.\t.\tGT:DP:GQ\t0/1\t1/1:7\n";
        let decoded = Decoder::default().decode(text).unwrap();
        let record = &decoded.data.records()[0];
        assert_eq!(record.sample_count(), 3);
        assert_eq!(record.sample_value(0, "DP"), Some("."));
        assert_eq!(record.sample_value(1, "GQ"), Some("."));
        assert_eq!(record.sample_value(2, "GT"), Some("."));
        assert!(matches!(
            decoded.warnings[0],
            DecodeWarning::SampleColumns {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_sample_block_ignored_without_sample_names() {
        let data = decode("chr1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/1\n").unwrap();
        assert!(data.records()[0].format().is_none());
        assert!(data.records()[0].samples().is_none());
    }

    #[test]
    fn test_header_extras() {
        let text = "##fileformat=VCFv4.2\n\
                    ##source=caller-1.0\n\
                    ##FILTER=<ID=q10,Description=\"Quality below 10\">\n\
                    ##contig=<ID=chr1,length=248956422>\n\
                    ##INFO=<ID=END>\n";
        let data = decode(text).unwrap();
        let header = data.header();
        assert_eq!(header.contigs["chr1"], "length=248956422");
        assert_eq!(header.meta["source"], vec!["caller-1.0"]);
        assert_eq!(header.meta["FILTER"].len(), 1);
        assert_eq!(header.meta["INFO"], vec!["<ID=END>"]);
        assert!(header.info.is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn test_empty_input_is_valid() {
        let data = decode("").unwrap();
        assert!(data.is_empty());
        assert_eq!(data.header().fileformat, "VCFv4.2");
    }

    #[test]
    fn test_crlf_and_bom() {
        let data = decode("\u{feff}##fileformat=VCFv4.1\r\nchr1\t1\t.\tA\tG\t.\t.\t.\r\n").unwrap();
        assert_eq!(data.header().fileformat, "VCFv4.1");
        assert_eq!(data.records()[0].info().len(), 0);
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = decode_bytes(&[b'#', 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, VcfError::Decode(_)));
    }

    #[test]
    fn test_progress_marks() {
        let mut text = String::from("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n");
        for pos in 1..=10 {
            text.push_str(&format!("chr1\t{pos}\t.\tA\tG\t.\t.\t.\n"));
        }
        let mut seen = Vec::new();
        let decoder = Decoder::new(DecodeOptions::default().with_progress_interval(2));
        decoder
            .decode_with_progress(&text, &mut |p: u8| {
                seen.push(p);
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(seen.first(), Some(&0));
        assert!(seen.contains(&50));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.len() > 3);
    }

    #[test]
    fn test_cancellation_discards_partial_state() {
        let text = "chr1\t1\t.\tA\tG\t.\t.\t.\nchr1\t2\t.\tA\tG\t.\t.\t.\n";
        let decoder = Decoder::new(DecodeOptions::default().with_progress_interval(1));
        let result = decoder.decode_with_progress(text, &mut |p: u8| {
            if p > 50 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(matches!(result, Err(VcfError::Cancelled { .. })));
    }
}
