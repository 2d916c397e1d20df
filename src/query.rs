//! Free-text search, per-column filters and multi-key sort over decoded records.
//!
//! [`evaluate`] is a pure function of a header, a record slice and a
//! [`QuerySpec`]. It never reorders or copies the records; the resulting
//! [`View`] is an ordering over indices into the borrowed slice.
//!
//! Stages run in a fixed order:
//!
//! 1. the search term keeps records where any field's text form contains the
//!    term, ignoring case;
//! 2. every active [`FieldFilter`] must accept the record;
//! 3. the survivors are stably sorted by the [`SortKey`]s, lowest priority
//!    first.
//!
//! # Examples
//!
//! ```
//! use vcfscope::query::{Comparison, FieldFilter, QuerySpec, SortKey};
//!
//! let text = "##fileformat=VCFv4.2\n\
//!             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//!             chr1\t100\t.\tA\tG\t50\tPASS\tDP=5\n\
//!             chr1\t200\t.\tC\tT\t20\tPASS\tDP=15\n\
//!             chr2\t300\t.\tG\tA\t90\tPASS\tDP=25\n";
//! let data = vcfscope::decode(text)?;
//!
//! let spec = QuerySpec::new()
//!     .with_filter("INFO_DP", FieldFilter::number(Comparison::Gt, 10.0))
//!     .with_sort(SortKey::descending("QUAL"));
//! let view = data.query(&spec);
//!
//! let positions: Vec<u64> = view.iter().map(|r| r.pos()).collect();
//! assert_eq!(positions, vec![300, 200]);
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::{Column, FieldValue};
use crate::header::Header;
use crate::record::{parse_number, Record, VcfData};

/// Complete query state: search term, per-column filters and sort keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    /// Case-insensitive substring matched against every field; blank disables search.
    pub search: String,
    /// Column name -> filter. All active filters must accept a record.
    pub filters: IndexMap<String, FieldFilter>,
    /// Sort keys; applied by ascending `priority`, list order breaking ties.
    pub sort: Vec<SortKey>,
}

impl QuerySpec {
    /// A query that keeps every record in source order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-text search term.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Add or replace the filter on a column.
    #[must_use]
    pub fn with_filter(mut self, column: impl Into<String>, filter: FieldFilter) -> Self {
        self.filters.insert(column.into(), filter);
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Whether evaluating this query would return the input unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.sort.is_empty()
            && self.filters.values().all(|f| !f.is_active())
    }
}

/// How a filter interprets its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Case-insensitive substring match.
    #[serde(alias = "contains")]
    Text,
    /// Numeric comparison.
    #[serde(alias = "numeric")]
    Number,
    /// Equality with one value, or membership in a set of values.
    #[serde(alias = "set")]
    Select,
}

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// `value > operand`
    Gt,
    /// `value < operand`
    Lt,
    /// `value >= operand`
    Gte,
    /// `value <= operand`
    Lte,
    /// `value == operand`
    #[default]
    #[serde(alias = "equals")]
    Eq,
}

impl Comparison {
    /// Apply the operator.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn test(self, value: f64, operand: f64) -> bool {
        match self {
            Comparison::Gt => value > operand,
            Comparison::Lt => value < operand,
            Comparison::Gte => value >= operand,
            Comparison::Lte => value <= operand,
            Comparison::Eq => value == operand,
        }
    }
}

/// Filter operand: a single value or a set of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A set of strings.
    List(Vec<String>),
}

impl Operand {
    fn is_blank(&self) -> bool {
        match self {
            Operand::Number(_) => false,
            Operand::Text(s) => s.trim().is_empty(),
            Operand::List(items) => items.is_empty(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Operand::Text(s) => parse_number(s),
            Operand::List(items) if items.len() == 1 => parse_number(&items[0]),
            Operand::List(_) => None,
        }
    }

    fn candidates(&self) -> Vec<String> {
        match self {
            Operand::Number(n) => vec![n.to_string()],
            Operand::Text(s) => vec![s.clone()],
            Operand::List(items) => items.clone(),
        }
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Text(s)
    }
}

impl From<Vec<String>> for Operand {
    fn from(items: Vec<String>) -> Self {
        Operand::List(items)
    }
}

/// Filter on one column.
///
/// A filter without an operand (or with a blank one) is inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Interpretation of the operand.
    #[serde(rename = "type", alias = "kind")]
    pub kind: FilterKind,
    /// Operator for [`FilterKind::Number`]; `Eq` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Comparison>,
    /// Operand; `None` makes the filter inert.
    #[serde(default, alias = "value")]
    pub operand: Option<Operand>,
}

impl FieldFilter {
    /// Substring filter.
    #[must_use]
    pub fn text(needle: impl Into<String>) -> Self {
        FieldFilter {
            kind: FilterKind::Text,
            operator: None,
            operand: Some(Operand::Text(needle.into())),
        }
    }

    /// Numeric comparison filter.
    #[must_use]
    pub fn number(operator: Comparison, operand: f64) -> Self {
        FieldFilter {
            kind: FilterKind::Number,
            operator: Some(operator),
            operand: Some(Operand::Number(operand)),
        }
    }

    /// Set-membership filter.
    #[must_use]
    pub fn select<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldFilter {
            kind: FilterKind::Select,
            operator: None,
            operand: Some(Operand::List(values.into_iter().map(Into::into).collect())),
        }
    }

    /// Whether this filter can exclude anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.operand.as_ref().is_some_and(|o| !o.is_blank())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    /// Largest first.
    #[serde(alias = "descending")]
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column name.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
    /// Lower values are compared first.
    #[serde(default)]
    pub priority: i32,
}

impl SortKey {
    /// Ascending key with priority 0.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Asc,
            priority: 0,
        }
    }

    /// Descending key with priority 0.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        SortKey {
            field: field.into(),
            direction: SortDirection::Desc,
            priority: 0,
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// An ordering over records borrowed from a slice.
#[derive(Debug, Clone)]
pub struct View<'a> {
    records: &'a [Record],
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// Every record in source order.
    #[must_use]
    pub fn all(records: &'a [Record]) -> Self {
        View {
            records,
            indices: (0..records.len()).collect(),
        }
    }

    /// Number of records in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of the viewed records in the source slice.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The record at `position` in view order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&'a Record> {
        self.indices.get(position).map(|&i| &self.records[i])
    }

    /// Records in view order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a Record> + '_ {
        let records = self.records;
        self.indices.iter().map(move |&i| &records[i])
    }
}

/// Evaluate a query over `records`.
///
/// Filters and sort keys naming columns outside the column scheme see every
/// value as absent.
#[must_use]
pub fn evaluate<'a>(header: &Header, records: &'a [Record], spec: &QuerySpec) -> View<'a> {
    let needle = spec.search.trim().to_lowercase();
    let filters: Vec<ActiveFilter<'_>> = spec
        .filters
        .iter()
        .filter(|(_, filter)| filter.is_active())
        .map(|(name, filter)| ActiveFilter::new(name, filter))
        .collect();

    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| needle.is_empty() || search_matches(record, &needle))
        .filter(|(_, record)| filters.iter().all(|f| f.accepts(header, record)))
        .map(|(i, _)| i)
        .collect();

    if !spec.sort.is_empty() {
        let mut keys: Vec<&SortKey> = spec.sort.iter().collect();
        keys.sort_by_key(|key| key.priority);
        let keys: Vec<(Option<Column<'_>>, SortDirection)> = keys
            .into_iter()
            .map(|key| (Column::parse(&key.field), key.direction))
            .collect();

        indices.sort_by(|&a, &b| {
            keys.iter()
                .map(|(column, direction)| {
                    let left = column.and_then(|c| c.resolve(header, &records[a]));
                    let right = column.and_then(|c| c.resolve(header, &records[b]));
                    compare_for_sort(left.as_ref(), right.as_ref(), *direction)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    tracing::trace!(total = records.len(), matched = indices.len(), "query evaluated");
    View { records, indices }
}

impl VcfData {
    /// Evaluate a query over this dataset.
    #[must_use]
    pub fn query(&self, spec: &QuerySpec) -> View<'_> {
        evaluate(self.header(), self.records(), spec)
    }
}

struct ActiveFilter<'s> {
    column: Option<Column<'s>>,
    kind: FilterKind,
    operator: Comparison,
    number: Option<f64>,
    candidates: Vec<String>,
}

impl<'s> ActiveFilter<'s> {
    fn new(name: &'s str, filter: &'s FieldFilter) -> Self {
        let operand = filter.operand.as_ref();
        let mut candidates = operand.map(Operand::candidates).unwrap_or_default();
        if filter.kind == FilterKind::Text {
            for candidate in &mut candidates {
                *candidate = candidate.to_lowercase();
            }
        }
        ActiveFilter {
            column: Column::parse(name),
            kind: filter.kind,
            operator: filter.operator.unwrap_or_default(),
            number: operand.and_then(Operand::as_number),
            candidates,
        }
    }

    fn accepts(&self, header: &Header, record: &Record) -> bool {
        let Some(value) = self.column.and_then(|c| c.resolve(header, record)) else {
            return false;
        };
        match self.kind {
            FilterKind::Text => {
                let text = value.as_text().to_lowercase();
                self.candidates.iter().any(|c| text.contains(c.as_str()))
            },
            FilterKind::Number => match (value.as_number(), self.number) {
                (Some(v), Some(operand)) => self.operator.test(v, operand),
                _ => false,
            },
            FilterKind::Select => self.candidates.iter().any(|c| select_matches(&value, c)),
        }
    }
}

#[allow(clippy::float_cmp)]
fn select_matches(value: &FieldValue<'_>, candidate: &str) -> bool {
    if value.as_text() == candidate || value.elements().iter().any(|e| e == candidate) {
        return true;
    }
    match (value.as_number(), parse_number(candidate)) {
        (Some(v), Some(c)) => v == c,
        _ => false,
    }
}

/// Whether any text form of the record contains `needle` (already lowercase).
fn search_matches(record: &Record, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);

    if hit(record.chrom())
        || hit(&record.pos().to_string())
        || record.id().is_some_and(hit)
        || hit(record.reference())
        || hit(&record.alternates().join(","))
        || record.quality().is_some_and(|q| hit(&q.to_string()))
        || hit(&record.filters().join(";"))
    {
        return true;
    }
    if record.info().iter().any(|(key, value)| {
        if value.is_flag() {
            hit(key)
        } else {
            hit(&format!("{key}={value}"))
        }
    }) {
        return true;
    }
    if record.format().is_some_and(|keys| hit(&keys.join(":"))) {
        return true;
    }
    record
        .samples()
        .unwrap_or_default()
        .iter()
        .any(|sample| sample.values().any(|v| hit(v.as_str())))
}

/// Present values before absent ones in either direction; numbers before text.
fn compare_for_sort(
    left: Option<&FieldValue<'_>>,
    right: Option<&FieldValue<'_>>,
    direction: SortDirection,
) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = compare_values(left, right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        },
    }
}

fn compare_values(left: &FieldValue<'_>, right: &FieldValue<'_>) -> Ordering {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.total_cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.as_text().cmp(&right.as_text()),
    }
}
