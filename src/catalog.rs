//! Column catalog for presentation layers.
//!
//! A read-only projection of the fixed columns plus one entry per INFO key
//! registered in the header. Column names follow the scheme of
//! [`field`](crate::field), so catalog entries can be used directly as filter
//! and sort keys.

use serde::Serialize;

use crate::field::info_column;
use crate::header::Header;

/// Kind of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free text.
    Text,
    /// Numeric.
    Number,
}

/// One column of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name as used by filters, sort keys and exports.
    pub field: String,
    /// Human-readable label.
    pub display_name: String,
    /// Kind of value.
    pub kind: ValueKind,
}

impl ColumnInfo {
    fn new(field: impl Into<String>, display_name: impl Into<String>, kind: ValueKind) -> Self {
        ColumnInfo {
            field: field.into(),
            display_name: display_name.into(),
            kind,
        }
    }
}

const FIXED: [(&str, &str, ValueKind); 7] = [
    ("CHROM", "Chromosome", ValueKind::Text),
    ("POS", "Position", ValueKind::Number),
    ("ID", "ID", ValueKind::Text),
    ("REF", "Reference", ValueKind::Text),
    ("ALT", "Alternative", ValueKind::Text),
    ("QUAL", "Quality", ValueKind::Number),
    ("FILTER", "Filter", ValueKind::Text),
];

/// Derive the column catalog from a header.
///
/// INFO columns are listed in registration order and typed as text, since
/// the header registry does not record value types.
#[must_use]
pub fn column_catalog(header: &Header) -> Vec<ColumnInfo> {
    FIXED
        .iter()
        .map(|&(field, display, kind)| ColumnInfo::new(field, display, kind))
        .chain(
            header
                .info
                .keys()
                .map(|key| ColumnInfo::new(info_column(key), key.as_str(), ValueKind::Text)),
        )
        .collect()
}
