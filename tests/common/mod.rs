//! Common test helpers shared across the integration test suite.

#![allow(dead_code)]

use vcfscope::{InfoValue, Record};

/// Column header line without sample columns.
pub const FIXED_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

/// Path of a fixture under `tests/data`.
pub fn fixture_path(filename: &str) -> String {
    format!("{}/tests/data/{filename}", env!("CARGO_MANIFEST_DIR"))
}

/// Load a fixture under `tests/data` as text.
pub fn load_fixture(filename: &str) -> String {
    let path = fixture_path(filename);
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// The two-sample input used by the decode scenario.
pub fn two_sample_input() -> String {
    format!(
        "##fileformat=VCFv4.2\n{FIXED_HEADER}\tFORMAT\tS1\tS2\n\
         chr1\t100\t.\tA\tG\t30\tPASS\tDP=10\tGT:DP\t0/1:5\t1/1:7\n"
    )
}

/// Build a sites-only VCF text from record lines.
pub fn vcf_text(lines: &[&str]) -> String {
    let mut text = format!("##fileformat=VCFv4.2\n{FIXED_HEADER}\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// A record with a numeric `DP` and the given position and quality.
pub fn depth_record(pos: u64, depth: f64, quality: Option<f64>) -> Record {
    Record::builder("chr1", pos, "A")
        .alternate("G")
        .quality(quality)
        .filter("PASS")
        .info("DP", InfoValue::Number(depth))
        .build()
        .expect("valid record")
}
