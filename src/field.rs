//! Addressing record values by column name.
//!
//! Filters, sort keys, tabular columns and projections all name values the
//! same way:
//!
//! | Name | Value |
//! |------|-------|
//! | `CHROM`, `ID`, `REF` | text |
//! | `POS`, `QUAL` | number |
//! | `ALT`, `FILTER`, `FORMAT` | list |
//! | `INFO_<key>` | the INFO value for `<key>` |
//! | `SAMPLE_<index>_<key>` | FORMAT value `<key>` of the sample at `<index>` |
//! | `SAMPLE_<name>_<key>` | same, addressing the sample by header name |
//!
//! Absent values (`.` in the source, unknown keys, empty lists) resolve to `None`.

use std::borrow::Cow;
use std::fmt;

use crate::header::Header;
use crate::record::{parse_number, InfoValue, Record};

/// Prefix of INFO column names.
pub const INFO_PREFIX: &str = "INFO_";

/// Prefix of per-sample column names.
pub const SAMPLE_PREFIX: &str = "SAMPLE_";

/// The fixed columns, in file order.
pub const FIXED_COLUMNS: [&str; 7] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER"];

/// A resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Text value.
    Text(&'a str),
    /// Numeric value.
    Number(f64),
    /// A set INFO flag.
    Flag,
    /// Non-empty list and the separator used in its text form.
    List(&'a [String], char),
}

impl<'a> FieldValue<'a> {
    /// Text form: numbers as written by `Display`, lists joined by their separator.
    #[must_use]
    pub fn as_text(&self) -> Cow<'a, str> {
        match *self {
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Flag => Cow::Borrowed("true"),
            FieldValue::List(items, _) if items.len() == 1 => Cow::Borrowed(items[0].as_str()),
            FieldValue::List(items, separator) => {
                let mut buffer = [0; 4];
                Cow::Owned(items.join(&*separator.encode_utf8(&mut buffer)))
            },
        }
    }

    /// Numeric coercion: numbers as-is, text (or a one-element list) if it
    /// parses as a finite number, `None` otherwise.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::List(items, _) if items.len() == 1 => parse_number(&items[0]),
            FieldValue::List(..) | FieldValue::Flag => None,
        }
    }

    /// List elements, for set membership; scalars yield nothing.
    #[must_use]
    pub fn elements(&self) -> &'a [String] {
        match *self {
            FieldValue::List(items, _) => items,
            _ => &[],
        }
    }
}

impl<'a> From<&'a InfoValue> for FieldValue<'a> {
    fn from(value: &'a InfoValue) -> Self {
        match value {
            InfoValue::Flag => FieldValue::Flag,
            InfoValue::Number(n) => FieldValue::Number(*n),
            InfoValue::Text(s) => FieldValue::Text(s),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// A parsed column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column<'n> {
    /// `CHROM`
    Chrom,
    /// `POS`
    Pos,
    /// `ID`
    Id,
    /// `REF`
    Ref,
    /// `ALT`
    Alt,
    /// `QUAL`
    Qual,
    /// `FILTER`
    Filter,
    /// `FORMAT`
    Format,
    /// `INFO_<key>`
    Info(&'n str),
    /// `SAMPLE_<index or name>_<key>`, unresolved.
    Sample(&'n str),
}

impl<'n> Column<'n> {
    /// Parse a column name. Returns `None` for names outside the scheme.
    #[must_use]
    pub fn parse(name: &'n str) -> Option<Self> {
        let column = match name {
            "CHROM" => Column::Chrom,
            "POS" => Column::Pos,
            "ID" => Column::Id,
            "REF" => Column::Ref,
            "ALT" => Column::Alt,
            "QUAL" => Column::Qual,
            "FILTER" => Column::Filter,
            "FORMAT" => Column::Format,
            _ => {
                if let Some(key) = name.strip_prefix(INFO_PREFIX).filter(|k| !k.is_empty()) {
                    Column::Info(key)
                } else if let Some(rest) = name.strip_prefix(SAMPLE_PREFIX) {
                    Column::Sample(rest)
                } else {
                    return None;
                }
            },
        };
        Some(column)
    }

    /// Resolve this column against a record.
    #[must_use]
    pub fn resolve<'a>(&self, header: &Header, record: &'a Record) -> Option<FieldValue<'a>> {
        match *self {
            Column::Chrom => Some(FieldValue::Text(record.chrom())),
            #[allow(clippy::cast_precision_loss)]
            Column::Pos => Some(FieldValue::Number(record.pos() as f64)),
            Column::Id => record.id().map(FieldValue::Text),
            Column::Ref => Some(FieldValue::Text(record.reference())),
            Column::Alt => list(record.alternates(), ','),
            Column::Qual => record.quality().map(FieldValue::Number),
            Column::Filter => list(record.filters(), ';'),
            Column::Format => record.format().and_then(|keys| list(keys, ':')),
            Column::Info(key) => record.info_value(key).map(FieldValue::from),
            Column::Sample(rest) => {
                let (index, key) = split_sample_column(header, rest)?;
                record.sample_value(index, key).map(FieldValue::Text)
            },
        }
    }
}

/// Resolve a column name against a record in one step.
#[must_use]
pub fn resolve<'a>(header: &Header, record: &'a Record, name: &str) -> Option<FieldValue<'a>> {
    Column::parse(name).and_then(|column| column.resolve(header, record))
}

/// Column name of an INFO key.
#[must_use]
pub fn info_column(key: &str) -> String {
    format!("{INFO_PREFIX}{key}")
}

/// Column name of a FORMAT key for the sample at `index`.
#[must_use]
pub fn sample_column(index: usize, key: &str) -> String {
    format!("{SAMPLE_PREFIX}{index}_{key}")
}

fn list(items: &[String], separator: char) -> Option<FieldValue<'_>> {
    if items.is_empty() {
        None
    } else {
        Some(FieldValue::List(items, separator))
    }
}

/// Split `<index>_<key>` or `<name>_<key>`; the longest matching sample name wins.
fn split_sample_column<'n>(header: &Header, rest: &'n str) -> Option<(usize, &'n str)> {
    if let Some((index, key)) = rest.split_once('_') {
        if let Ok(index) = index.parse::<usize>() {
            return Some((index, key));
        }
    }
    header
        .samples
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            rest.len() > name.len() + 1
                && rest.starts_with(name.as_str())
                && rest.as_bytes()[name.len()] == b'_'
        })
        .max_by_key(|(_, name)| name.len())
        .map(|(index, name)| (index, &rest[name.len() + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            samples: vec!["NA_1".to_string(), "NA".to_string()],
            ..Header::default()
        }
    }

    fn record() -> Record {
        Record::builder("chr1", 100, "A")
            .alternates(["G", "T"])
            .filter("PASS")
            .info("DP", InfoValue::Number(10.0))
            .flag("DB")
            .format(["GT", "DP"])
            .sample(["0/1", "5"])
            .sample(["1/1", "7"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_fixed_columns() {
        let (header, record) = (header(), record());
        assert_eq!(resolve(&header, &record, "CHROM"), Some(FieldValue::Text("chr1")));
        assert_eq!(resolve(&header, &record, "POS").unwrap().as_number(), Some(100.0));
        assert_eq!(resolve(&header, &record, "ID"), None);
        assert_eq!(resolve(&header, &record, "QUAL"), None);
        assert_eq!(resolve(&header, &record, "ALT").unwrap().as_text(), "G,T");
        assert_eq!(resolve(&header, &record, "FILTER").unwrap().as_text(), "PASS");
        assert_eq!(resolve(&header, &record, "FORMAT").unwrap().as_text(), "GT:DP");
    }

    #[test]
    fn test_info_and_sample_columns() {
        let (header, record) = (header(), record());
        assert_eq!(resolve(&header, &record, "INFO_DP"), Some(FieldValue::Number(10.0)));
        assert_eq!(resolve(&header, &record, "INFO_DB"), Some(FieldValue::Flag));
        assert_eq!(resolve(&header, &record, "INFO_AF"), None);
        assert_eq!(resolve(&header, &record, "SAMPLE_1_DP"), Some(FieldValue::Text("7")));
        assert_eq!(resolve(&header, &record, "SAMPLE_NA_1_GT"), Some(FieldValue::Text("0/1")));
        assert_eq!(resolve(&header, &record, "SAMPLE_NA_GT"), Some(FieldValue::Text("1/1")));
        assert_eq!(resolve(&header, &record, "SAMPLE_5_GT"), None);
        assert_eq!(resolve(&header, &record, "nonsense"), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FieldValue::Text("15").as_number(), Some(15.0));
        assert_eq!(FieldValue::Text("abc").as_number(), None);
        assert_eq!(FieldValue::Flag.as_number(), None);
        let items = vec!["3".to_string(), "4".to_string()];
        assert_eq!(FieldValue::List(&items, ',').as_number(), None);
        assert_eq!(FieldValue::List(&items[..1], ',').as_number(), Some(3.0));
    }

    #[test]
    fn test_column_names() {
        assert_eq!(info_column("DP"), "INFO_DP");
        assert_eq!(sample_column(0, "GT"), "SAMPLE_0_GT");
        assert_eq!(Column::parse("INFO_"), None);
    }
}
