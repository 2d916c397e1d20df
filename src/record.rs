//! VCF record structures.
//!
//! This module provides the typed record model:
//! - [`Record`] - one variant line (the eight fixed columns plus optional samples)
//! - [`InfoValue`] - a typed INFO value (flag, number or text)
//! - [`VcfData`] - a [`Header`] together with its decoded records
//!
//! Records are immutable once built; [`RecordBuilder`] validates the model
//! invariants and is the only way to construct one.
//!
//! # Examples
//!
//! ```
//! use vcfscope::{InfoValue, Record};
//!
//! let record = Record::builder("chr1", 100, "A")
//!     .alternate("G")
//!     .quality(Some(30.0))
//!     .filter("PASS")
//!     .info("DP", InfoValue::Number(10.0))
//!     .build()?;
//!
//! assert_eq!(record.alternates(), ["G"]);
//! assert_eq!(record.info_value("DP").and_then(InfoValue::as_number), Some(10.0));
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{Result, VcfError};
use crate::header::Header;

/// The literal that marks an absent value in VCF text.
pub const MISSING: &str = ".";

/// Number of tab-delimited columns every record line must carry
/// (CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO).
pub const REQUIRED_COLUMNS: usize = 8;

/// Per-sample values keyed by FORMAT field name, in FORMAT order.
pub type SampleValues = IndexMap<String, String>;

/// A typed INFO value.
///
/// Keys absent from a record's INFO map are implicitly false/absent; a key
/// present as [`InfoValue::Flag`] is a set flag.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    /// Key present without a value.
    Flag,
    /// Value that parsed as a finite number.
    Number(f64),
    /// Any other value, kept verbatim.
    Text(String),
}

impl InfoValue {
    /// Classify a raw `key=value` value: numeric if it parses as a finite
    /// number, text otherwise.
    ///
    /// Digit-only identifiers are classified as numbers as well; the header's
    /// `Type` attribute is not consulted.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => InfoValue::Number(n),
            None => InfoValue::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InfoValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InfoValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a flag.
    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self, InfoValue::Flag)
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => f.write_str("true"),
            InfoValue::Number(n) => write!(f, "{n}"),
            InfoValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for InfoValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            InfoValue::Flag => serializer.serialize_bool(true),
            InfoValue::Number(n) => serialize_number(*n, serializer),
            InfoValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Parse a finite number; `NaN` and infinities are rejected.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Serialize integral values as integers so `10` does not become `10.0`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn serialize_number<S: Serializer>(
    n: f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < MAX_EXACT {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

#[allow(clippy::ref_option)]
fn serialize_quality<S: Serializer>(
    quality: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match quality {
        Some(q) => serialize_number(*q, serializer),
        None => serializer.serialize_none(),
    }
}

/// One variant record.
///
/// Empty `alternates` means "no alternate allele" and empty `filters` means
/// "filters not evaluated"; both are distinct from a one-element sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "CHROM")]
    chrom: String,
    #[serde(rename = "POS")]
    pos: u64,
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "REF")]
    reference: String,
    #[serde(rename = "ALT")]
    alternates: SmallVec<[String; 2]>,
    #[serde(rename = "QUAL", serialize_with = "serialize_quality")]
    quality: Option<f64>,
    #[serde(rename = "FILTER")]
    filters: SmallVec<[String; 1]>,
    #[serde(rename = "INFO")]
    info: IndexMap<String, InfoValue>,
    #[serde(rename = "FORMAT", skip_serializing_if = "Option::is_none")]
    format: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<SampleValues>>,
}

impl Record {
    /// Start building a record from its three mandatory values.
    #[must_use]
    pub fn builder(chrom: impl Into<String>, pos: u64, reference: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            chrom: chrom.into(),
            pos,
            id: None,
            reference: reference.into(),
            alternates: SmallVec::new(),
            quality: None,
            filters: SmallVec::new(),
            info: IndexMap::new(),
            format: None,
            samples: Vec::new(),
        }
    }

    /// Chromosome name.
    #[must_use]
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// 1-based position.
    #[must_use]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Variant identifier; `None` when the line carried `.`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Reference allele.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Alternate alleles in column order.
    #[must_use]
    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    /// Quality score; `None` when absent (distinct from `Some(0.0)`).
    #[must_use]
    pub fn quality(&self) -> Option<f64> {
        self.quality
    }

    /// Filter tags in column order.
    #[must_use]
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// INFO entries in column order.
    #[must_use]
    pub fn info(&self) -> &IndexMap<String, InfoValue> {
        &self.info
    }

    /// INFO value for a key.
    #[must_use]
    pub fn info_value(&self, key: &str) -> Option<&InfoValue> {
        self.info.get(key)
    }

    /// Whether an INFO flag is set. Absent keys are false.
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.info.get(key).is_some_and(InfoValue::is_flag)
    }

    /// FORMAT field names, when the record carries a sample block.
    #[must_use]
    pub fn format(&self) -> Option<&[String]> {
        self.format.as_deref()
    }

    /// Per-sample values, one mapping per declared sample.
    #[must_use]
    pub fn samples(&self) -> Option<&[SampleValues]> {
        self.samples.as_deref()
    }

    /// Value of one FORMAT field for the sample at `index`.
    #[must_use]
    pub fn sample_value(&self, index: usize, key: &str) -> Option<&str> {
        self.samples
            .as_ref()
            .and_then(|samples| samples.get(index))
            .and_then(|values| values.get(key))
            .map(String::as_str)
    }

    /// Number of per-sample mappings (zero without a sample block).
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.as_ref().map_or(0, Vec::len)
    }
}

/// Builder for [`Record`].
///
/// Sample values are given positionally; [`build`](RecordBuilder::build) zips
/// them against the FORMAT names and pads short samples with [`MISSING`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    chrom: String,
    pos: u64,
    id: Option<String>,
    reference: String,
    alternates: SmallVec<[String; 2]>,
    quality: Option<f64>,
    filters: SmallVec<[String; 1]>,
    info: IndexMap<String, InfoValue>,
    format: Option<Vec<String>>,
    samples: Vec<Vec<String>>,
}

impl RecordBuilder {
    /// Set the identifier.
    #[must_use]
    pub fn id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Append an alternate allele.
    #[must_use]
    pub fn alternate(mut self, allele: impl Into<String>) -> Self {
        self.alternates.push(allele.into());
        self
    }

    /// Append several alternate alleles.
    #[must_use]
    pub fn alternates<I, S>(mut self, alleles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternates.extend(alleles.into_iter().map(Into::into));
        self
    }

    /// Set the quality score.
    #[must_use]
    pub fn quality(mut self, quality: Option<f64>) -> Self {
        self.quality = quality;
        self
    }

    /// Append a filter tag.
    #[must_use]
    pub fn filter(mut self, tag: impl Into<String>) -> Self {
        self.filters.push(tag.into());
        self
    }

    /// Append several filter tags.
    #[must_use]
    pub fn filters<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Insert an INFO entry.
    #[must_use]
    pub fn info(mut self, key: impl Into<String>, value: InfoValue) -> Self {
        self.info.insert(key.into(), value);
        self
    }

    /// Insert an INFO flag.
    #[must_use]
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.info(key, InfoValue::Flag)
    }

    /// Set the FORMAT field names.
    #[must_use]
    pub fn format<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Append one sample's values, positional against the FORMAT names.
    #[must_use]
    pub fn sample<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Validate and build the record.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::InvalidRecord`] if the chromosome is empty, the
    /// position is zero, the reference allele is empty or contains characters
    /// outside the nucleotide/indel alphabet, or samples are given without
    /// FORMAT names.
    pub fn build(self) -> Result<Record> {
        if self.chrom.is_empty() {
            return Err(VcfError::InvalidRecord("empty chromosome".to_string()));
        }
        if self.chrom.starts_with('#') || self.chrom.contains(['\t', '\n', '\r']) {
            return Err(VcfError::InvalidRecord(format!(
                "invalid chromosome name '{}'",
                self.chrom
            )));
        }
        if self.pos == 0 {
            return Err(VcfError::InvalidRecord(format!(
                "{}: position must be 1-based",
                self.chrom
            )));
        }
        if self.reference.is_empty() {
            return Err(VcfError::InvalidRecord(format!(
                "{}:{}: empty reference allele",
                self.chrom, self.pos
            )));
        }
        if let Some(c) = self.reference.chars().find(|c| !is_allele_char(*c)) {
            return Err(VcfError::InvalidRecord(format!(
                "{}:{}: invalid reference allele character '{c}'",
                self.chrom, self.pos
            )));
        }

        let samples = match (&self.format, self.samples.is_empty()) {
            (_, true) => None,
            (None, false) => {
                return Err(VcfError::InvalidRecord(format!(
                    "{}:{}: sample values without FORMAT names",
                    self.chrom, self.pos
                )));
            },
            (Some(keys), false) => Some(
                self.samples
                    .into_iter()
                    .map(|values| zip_sample(keys, values))
                    .collect(),
            ),
        };

        Ok(Record {
            chrom: self.chrom,
            pos: self.pos,
            id: self.id,
            reference: self.reference,
            alternates: self.alternates,
            quality: self.quality,
            filters: self.filters,
            info: self.info,
            format: self.format,
            samples,
        })
    }
}

/// Map positional values onto FORMAT names; short or empty entries become [`MISSING`].
fn zip_sample(keys: &[String], values: Vec<String>) -> SampleValues {
    let mut values = values.into_iter();
    keys.iter()
        .map(|key| {
            let value = values
                .next()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| MISSING.to_string());
            (key.clone(), value)
        })
        .collect()
}

/// IUPAC nucleotide codes plus the `*` (overlapping deletion) and `-` (gap) symbols.
fn is_allele_char(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'A' | 'C' | 'G' | 'T' | 'U' | 'N' | 'R' | 'Y' | 'S' | 'W' | 'K' | 'M' | 'B' | 'D' | 'H'
            | 'V' | '*' | '-'
    )
}

/// A decoded VCF file: its header and records.
///
/// Immutable once constructed; every per-sample block agrees with the
/// header's sample count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VcfData {
    header: Header,
    records: Vec<Record>,
}

impl VcfData {
    /// Assemble a model, checking that sample blocks match the header.
    ///
    /// # Errors
    ///
    /// Returns [`VcfError::InvalidRecord`] if a record's sample count differs
    /// from the number of samples the header declares.
    pub fn new(header: Header, records: Vec<Record>) -> Result<Self> {
        let expected = header.sample_count();
        if let Some(record) = records
            .iter()
            .find(|r| r.samples.is_some() && r.sample_count() != expected)
        {
            return Err(VcfError::InvalidRecord(format!(
                "{}:{}: {} sample columns, header declares {expected}",
                record.chrom,
                record.pos,
                record.sample_count()
            )));
        }
        Ok(VcfData { header, records })
    }

    /// The header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All records in input order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into header and records.
    #[must_use]
    pub fn into_parts(self) -> (Header, Vec<Record>) {
        (self.header, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_value_parse() {
        assert_eq!(InfoValue::parse("10"), InfoValue::Number(10.0));
        assert_eq!(InfoValue::parse("0.25"), InfoValue::Number(0.25));
        assert_eq!(InfoValue::parse("1e3"), InfoValue::Number(1000.0));
        assert_eq!(
            InfoValue::parse("10,20"),
            InfoValue::Text("10,20".to_string())
        );
        assert_eq!(InfoValue::parse("NaN"), InfoValue::Text("NaN".to_string()));
        assert_eq!(InfoValue::parse("inf"), InfoValue::Text("inf".to_string()));
    }

    #[test]
    fn test_digit_identifiers_classify_as_numbers() {
        assert_eq!(InfoValue::parse("007"), InfoValue::Number(7.0));
    }

    #[test]
    fn test_info_value_display() {
        assert_eq!(InfoValue::Number(10.0).to_string(), "10");
        assert_eq!(InfoValue::Number(0.5).to_string(), "0.5");
        assert_eq!(InfoValue::Flag.to_string(), "true");
    }

    #[test]
    fn test_builder_pads_short_samples() {
        let record = Record::builder("chr1", 5, "A")
            .format(["GT", "DP", "GQ"])
            .sample(["0/1", "5"])
            .sample(["1/1", "", "40"])
            .build()
            .unwrap();

        assert_eq!(record.sample_value(0, "GQ"), Some("."));
        assert_eq!(record.sample_value(1, "DP"), Some("."));
        assert_eq!(record.sample_value(1, "GQ"), Some("40"));
        assert_eq!(record.samples().unwrap()[0].len(), 3);
    }

    #[test]
    fn test_builder_rejects_invalid_records() {
        assert!(Record::builder("", 1, "A").build().is_err());
        assert!(Record::builder("chr1", 0, "A").build().is_err());
        assert!(Record::builder("chr1", 1, "").build().is_err());
        assert!(Record::builder("chr1", 1, "AX!").build().is_err());
        assert!(Record::builder("chr1", 1, "A").sample(["0/1"]).build().is_err());
    }

    #[test]
    fn test_absent_and_empty_are_distinct() {
        let record = Record::builder("chr1", 1, "A").build().unwrap();
        assert_eq!(record.id(), None);
        assert_eq!(record.quality(), None);
        assert!(record.alternates().is_empty());
        assert!(record.filters().is_empty());
        assert!(!record.has_flag("DB"));

        let record = Record::builder("chr1", 1, "A")
            .quality(Some(0.0))
            .flag("DB")
            .build()
            .unwrap();
        assert_eq!(record.quality(), Some(0.0));
        assert!(record.has_flag("DB"));
    }

    #[test]
    fn test_vcf_data_checks_sample_count() {
        let header = Header {
            samples: vec!["S1".to_string(), "S2".to_string()],
            ..Header::default()
        };
        let record = Record::builder("chr1", 1, "A")
            .format(["GT"])
            .sample(["0/1"])
            .build()
            .unwrap();
        assert!(VcfData::new(header.clone(), vec![record]).is_err());

        let sites_only = Record::builder("chr1", 1, "A").build().unwrap();
        let data = VcfData::new(header, vec![sites_only]).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_record_serializes_typed_fields() {
        let record = Record::builder("chr1", 100, "A")
            .alternate("G")
            .quality(Some(30.0))
            .filter("PASS")
            .info("DP", InfoValue::Number(10.0))
            .flag("DB")
            .build()
            .unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["POS"], serde_json::json!(100));
        assert_eq!(value["ID"], serde_json::Value::Null);
        assert_eq!(value["QUAL"], serde_json::json!(30));
        assert_eq!(value["ALT"], serde_json::json!(["G"]));
        assert_eq!(value["INFO"]["DP"], serde_json::json!(10));
        assert_eq!(value["INFO"]["DB"], serde_json::json!(true));
        assert!(value.get("FORMAT").is_none());
    }
}
