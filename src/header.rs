//! VCF header registries.
//!
//! The [`Header`] holds what the `##`/`#CHROM` lines of a VCF file declare: the
//! file-format tag, INFO and FORMAT descriptions keyed by ID, contig metadata,
//! free-form meta lines and the ordered sample names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// File-format tag assumed when the input declares none.
pub const DEFAULT_FILE_FORMAT: &str = "VCFv4.2";

/// Header of a VCF file.
///
/// All registries preserve declaration order, so re-emitting a header writes
/// its lines back in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Value of the `##fileformat=` line.
    pub fileformat: String,
    /// INFO key -> human-readable description.
    pub info: IndexMap<String, String>,
    /// FORMAT key -> human-readable description.
    pub format: IndexMap<String, String>,
    /// Sample names in `#CHROM` column order (columns 10+).
    pub samples: Vec<String>,
    /// Contig ID -> remaining attribute text of its `##contig=<...>` line.
    pub contigs: IndexMap<String, String>,
    /// Any other `##key=value` line; repeated keys keep every value in order.
    pub meta: IndexMap<String, Vec<String>>,
}

impl Default for Header {
    fn default() -> Self {
        Header {
            fileformat: DEFAULT_FILE_FORMAT.to_string(),
            info: IndexMap::new(),
            format: IndexMap::new(),
            samples: Vec::new(),
            contigs: IndexMap::new(),
            meta: IndexMap::new(),
        }
    }
}

impl Header {
    /// Create an empty header with the default file-format tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declared samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Position of a sample name in the declared sample order.
    #[must_use]
    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == name)
    }

    /// Description registered for an INFO key.
    #[must_use]
    pub fn info_description(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Description registered for a FORMAT key.
    #[must_use]
    pub fn format_description(&self, key: &str) -> Option<&str> {
        self.format.get(key).map(String::as_str)
    }

    /// Append a meta line value, keeping earlier values for the same key.
    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.entry(key.into()).or_default().push(value.into());
    }

    /// Whether nothing beyond the default file-format tag has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
            && self.format.is_empty()
            && self.samples.is_empty()
            && self.contigs.is_empty()
            && self.meta.is_empty()
    }
}
