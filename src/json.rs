//! Structured (JSON) encoding of VCF records.
//!
//! Without a column selection each record is written whole, using the
//! column names as keys (`CHROM`, `POS`, `ID`, `REF`, `ALT`, `QUAL`,
//! `FILTER`, `INFO`, and `FORMAT`/`samples` when present). Numbers stay
//! numbers, lists stay arrays and absent values are `null`.
//!
//! With a selection, each record becomes an object holding only the
//! selected keys, in selection order. Selected names may be top-level keys
//! or any column name (`INFO_DP`, `SAMPLE_0_GT`, `SAMPLE_NA001_GT`).

use serde_json::{Map, Value};

use crate::error::Result;
use crate::field::{Column, FieldValue};
use crate::header::Header;
use crate::record::{serialize_number, Record};

/// Top-level keys of a serialized record.
const RECORD_KEYS: [&str; 10] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT", "samples",
];

/// Convert one record to a JSON object.
///
/// # Errors
///
/// Returns an error if the record cannot be represented as JSON.
pub fn record_to_json(record: &Record) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

/// Convert records to a JSON array, optionally projected onto `selected`.
///
/// # Errors
///
/// Returns an error if a record cannot be represented as JSON.
pub fn records_to_json<'a, I>(header: &Header, records: I, selected: &[String]) -> Result<Value>
where
    I: IntoIterator<Item = &'a Record>,
{
    let values = records
        .into_iter()
        .map(|record| {
            if selected.is_empty() {
                record_to_json(record)
            } else {
                project(header, record, selected)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}

/// Encode records as pretty-printed JSON text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn records_to_json_bytes<'a, I>(header: &Header, records: I, selected: &[String]) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let value = records_to_json(header, records, selected)?;
    Ok(serde_json::to_vec_pretty(&value)?)
}

fn project(header: &Header, record: &Record, selected: &[String]) -> Result<Value> {
    let full = record_to_json(record)?;
    let mut object = Map::new();
    for name in selected {
        let value = if RECORD_KEYS.contains(&name.as_str()) {
            full.get(name.as_str()).cloned().unwrap_or(Value::Null)
        } else {
            match Column::parse(name).and_then(|c| c.resolve(header, record)) {
                Some(value) => field_to_json(&value)?,
                None => Value::Null,
            }
        };
        object.insert(name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn field_to_json(value: &FieldValue<'_>) -> Result<Value> {
    Ok(match value {
        FieldValue::Text(s) => Value::String((*s).to_string()),
        FieldValue::Number(n) => serialize_number(*n, serde_json::value::Serializer)?,
        FieldValue::Flag => Value::Bool(true),
        FieldValue::List(items, _) => {
            Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InfoValue;
    use serde_json::json;

    fn record() -> Record {
        Record::builder("chr1", 100, "A")
            .alternates(["G", "T"])
            .quality(Some(29.5))
            .filter("PASS")
            .info("DP", InfoValue::Number(10.0))
            .flag("DB")
            .info("GENE", InfoValue::Text("BRCA1".to_string()))
            .format(["GT"])
            .sample(["0/1"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_record_keeps_types() {
        let value = record_to_json(&record()).unwrap();
        assert_eq!(
            value,
            json!({
                "CHROM": "chr1",
                "POS": 100,
                "ID": null,
                "REF": "A",
                "ALT": ["G", "T"],
                "QUAL": 29.5,
                "FILTER": ["PASS"],
                "INFO": {"DP": 10, "DB": true, "GENE": "BRCA1"},
                "FORMAT": ["GT"],
                "samples": [{"GT": "0/1"}],
            })
        );
    }

    #[test]
    fn test_projection_in_selection_order() {
        let header = Header {
            samples: vec!["NA001".to_string()],
            ..Header::default()
        };
        let selected: Vec<String> = ["POS", "INFO_DP", "ALT", "SAMPLE_NA001_GT", "INFO_AF"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let records = [record()];
        let value = records_to_json(&header, &records, &selected).unwrap();
        assert_eq!(
            value,
            json!([{"POS": 100, "INFO_DP": 10, "ALT": ["G", "T"], "SAMPLE_NA001_GT": "0/1", "INFO_AF": null}])
        );
        let keys: Vec<&String> = value[0].as_object().unwrap().keys().collect();
        assert_eq!(keys[1], "INFO_DP");
    }

    #[test]
    fn test_empty_input_is_empty_array() {
        let none: Vec<Record> = Vec::new();
        let bytes = records_to_json_bytes(&Header::default(), &none, &[]).unwrap();
        assert_eq!(bytes, b"[]");
    }
}
