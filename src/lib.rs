#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Modules
//!
//! - [`record`] - The record model (`Record`, `RecordBuilder`, `InfoValue`, `VcfData`)
//! - [`header`] - Header registries (INFO, FORMAT, contigs, meta, samples)
//! - [`decoder`] - Decoding VCF text into the record model
//! - [`reader`] - Streaming reader over any `BufRead` source
//! - [`recovery`] - Skip-and-report handling of malformed lines
//! - [`progress`] - Progress reporting and cancellation
//! - [`parser_pool`] - Parallel decoding of independent inputs
//! - [`pipeline`] - Background decoding with progress events
//! - [`field`] - Addressing values by column name
//! - [`query`] - Search, filters and multi-key sort producing a `View`
//! - [`catalog`] - Column catalog for presentation layers
//! - [`formats`] - Export formats and reader/writer traits
//! - [`writer`] - VCF re-encoding
//! - [`csv`] - Flat tabular export
//! - [`json`] - Structured export
//! - [`export`] - Export dispatcher and payloads
//! - [`error`] - Error types and result type

pub mod catalog;
pub mod csv;
pub mod decoder;
pub mod error;
pub mod export;
pub mod field;
/// Export formats with unified Reader/Writer traits.
///
/// See the [`formats`] module documentation for the supported formats.
pub mod formats;
pub mod header;
pub mod json;
pub mod parser_pool;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod reader;
/// The record model (`Record`, `InfoValue`, `VcfData`)
pub mod record;
pub mod recovery;
pub mod writer;

pub use catalog::{column_catalog, ColumnInfo, ValueKind};
pub use decoder::{decode, decode_bytes, DecodeOptions, Decoded, Decoder};
pub use error::{ErrorCategory, Result, VcfError};
pub use export::{serialize, serialize_as, ExportOptions, ExportPayload};
pub use field::FieldValue;
pub use formats::{supported_formats, Format};
pub use header::Header;
pub use parser_pool::decode_many;
pub use pipeline::{decode_in_background, BackgroundDecode, DecodeEvent, PipelineConfig};
pub use progress::ProgressObserver;
pub use query::{
    evaluate, Comparison, FieldFilter, FilterKind, Operand, QuerySpec, SortDirection, SortKey, View,
};
pub use reader::VcfReader;
pub use record::{InfoValue, Record, RecordBuilder, SampleValues, VcfData};
pub use recovery::{DecodeWarning, RecoveryContext, RecoveryMode};
pub use writer::VcfWriter;
