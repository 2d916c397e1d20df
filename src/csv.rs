//! Flat tabular (CSV) encoding of VCF records.
//!
//! One row per record. The column layout is:
//!
//! - the fixed columns `CHROM`, `POS`, `ID`, `REF`, `ALT`, `QUAL`, `FILTER`;
//! - one `INFO_<key>` column per INFO key present in any record, in first-seen order;
//! - one `SAMPLE_<index>_<key>` column per sample and FORMAT key present in
//!   any record, in first-seen order.
//!
//! Cells hold the text form of each value: lists joined by their separator,
//! flags as `true`, absent values as the empty string.
//!
//! # Examples
//!
//! ```
//! use vcfscope::csv::records_to_csv;
//!
//! let text = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//!             chr1\t100\trs1\tA\tG,T\t30\tPASS\tDP=10;DB\n";
//! let data = vcfscope::decode(text)?;
//!
//! let csv = records_to_csv(data.header(), data.records(), &[])?;
//! let csv = String::from_utf8(csv).unwrap();
//! let mut lines = csv.lines();
//! assert_eq!(lines.next(), Some("CHROM,POS,ID,REF,ALT,QUAL,FILTER,INFO_DP,INFO_DB"));
//! assert_eq!(lines.next(), Some("chr1,100,rs1,A,\"G,T\",30,PASS,10,true"));
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use indexmap::IndexSet;

use crate::error::{Result, VcfError};
use crate::field::{info_column, sample_column, Column, FIXED_COLUMNS};
use crate::header::Header;
use crate::record::Record;

/// Column layout for a set of records.
#[must_use]
pub fn tabular_columns<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut info = IndexSet::new();
    let mut samples = IndexSet::new();
    for record in records {
        for key in record.info().keys() {
            info.insert(info_column(key));
        }
        for (index, sample) in record.samples().unwrap_or_default().iter().enumerate() {
            for key in sample.keys() {
                samples.insert(sample_column(index, key));
            }
        }
    }

    FIXED_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .chain(info)
        .chain(samples)
        .collect()
}

/// Encode records as CSV.
///
/// `selected` restricts and orders the output columns; names outside the
/// layout are dropped and an empty slice selects every column. No records
/// produce an empty payload.
///
/// # Errors
///
/// Returns an error if the CSV cannot be written.
pub fn records_to_csv<'a, I>(header: &Header, records: I, selected: &[String]) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let layout = tabular_columns(records.iter().copied());
    let columns: Vec<String> = if selected.is_empty() {
        layout
    } else {
        selected
            .iter()
            .filter(|name| layout.contains(*name))
            .cloned()
            .collect()
    };
    let parsed: Vec<Option<Column<'_>>> = columns.iter().map(|c| Column::parse(c)).collect();

    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(parsed.iter().map(|column| {
            column
                .and_then(|c| c.resolve(header, record))
                .map(|value| value.as_text().into_owned())
                .unwrap_or_default()
        }))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| VcfError::Io(e.into_error()))
}
