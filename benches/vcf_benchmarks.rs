#![allow(missing_docs)]
//! Benchmarks for the vcfscope library.
//!
//! Decoding, query evaluation and export over synthetic inputs, using
//! Criterion.rs for statistical analysis.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcfscope::{
    decode, decode_many, Comparison, DecodeOptions, ExportOptions, FieldFilter, QuerySpec,
    SortKey,
};

/// Synthetic two-sample VCF text with `records` record lines.
fn synthetic_vcf(records: usize) -> String {
    let mut text = String::from(
        "##fileformat=VCFv4.2\n\
         ##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
         ##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele Frequency\">\n\
         ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
         #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\n",
    );
    for i in 0..records {
        let chrom = if i % 3 == 0 { "chr1" } else { "chr2" };
        let filter = if i % 7 == 0 { "q10" } else { "PASS" };
        text.push_str(&format!(
            "{chrom}\t{}\trs{i}\tA\tG\t{}\t{filter}\tDP={};AF=0.{};DB\tGT\t0/1\t1/1\n",
            i + 1,
            i % 100,
            i % 50,
            i % 10
        ));
    }
    text
}

fn benchmark_decode_10k(c: &mut Criterion) {
    let text = black_box(synthetic_vcf(10_000));

    c.bench_function("decode_10k_records", |b| {
        b.iter(|| decode(&text).map(|data| data.len()));
    });
}

fn benchmark_decode_many_4x_10k(c: &mut Criterion) {
    let text = synthetic_vcf(10_000);
    let inputs = black_box(vec![text.clone(), text.clone(), text.clone(), text]);

    c.bench_function("decode_many_4x_10k_records", |b| {
        b.iter(|| decode_many(&inputs, DecodeOptions::default()).len());
    });
}

fn benchmark_query_10k(c: &mut Criterion) {
    let data = decode(&synthetic_vcf(10_000)).expect("synthetic input decodes");
    let spec = QuerySpec::new()
        .with_search("chr2")
        .with_filter("INFO_DP", FieldFilter::number(Comparison::Gt, 10.0))
        .with_sort(SortKey::descending("QUAL"))
        .with_sort(SortKey::ascending("POS").with_priority(1));

    c.bench_function("query_10k_records", |b| {
        b.iter(|| data.query(black_box(&spec)).len());
    });
}

fn benchmark_export_10k(c: &mut Criterion) {
    let data = decode(&synthetic_vcf(10_000)).expect("synthetic input decodes");

    for format in vcfscope::supported_formats() {
        let options = ExportOptions::new(format);
        c.bench_function(&format!("export_10k_to_{}", format.extension()), |b| {
            b.iter(|| data.export(&options).map(|payload| payload.len()));
        });
    }
}

criterion_group!(
    benches,
    benchmark_decode_10k,
    benchmark_decode_many_4x_10k,
    benchmark_query_10k,
    benchmark_export_10k,
);
criterion_main!(benches);
