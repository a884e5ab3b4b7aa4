//! Benchmarks for batch splitting and full sequence analysis
//!
//! Run with: cargo bench --bench parser_benchmark

#![expect(clippy::expect_used, reason = "fixtures come from the built-in catalog and cannot fail")]

use advscope_analysis::prelude::*;
use advscope_catalog::prelude::*;
use advscope_test_helpers::prelude::*;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn catalog_capture(horizon_s: f64) -> (Vec<SeriesDefinition>, ScanTranscript) {
    let series = CatalogSeries::definitions(&[CatalogSeries::A, CatalogSeries::B, CatalogSeries::C]);
    let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
    let transcript = ideal_transcript(&series, &builder, Some(horizon_s)).expect("ideal transcript");
    (series, transcript)
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_into_batches");
    let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
    for horizon_s in [10.0, 60.0, 180.0] {
        let (series, transcript) = catalog_capture(horizon_s);
        let index = PayloadIndex::new(&series, &builder).expect("payload index");
        let config = advscope_analysis::ParserConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(horizon_s), &transcript, |b, t| {
            b.iter(|| split_into_batches(black_box(t), &index, &config));
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
    let (series, transcript) = catalog_capture(60.0);
    let index = PayloadIndex::new(&series, &builder).expect("payload index");
    let analyzer = AdvertisingAnalyzer::default();

    c.bench_function("analyze_sequence_60s", |b| {
        b.iter(|| analyzer.analyze_sequence(black_box(&transcript), &index, Some(60.0)));
    });
}

fn bench_filter(c: &mut Criterion) {
    let classifier = IntervalClassifier::default();
    let intervals: Vec<f64> = (0..10_000).map(|i| if i % 7 == 0 { 40.0 } else { 20.0 }).collect();

    c.bench_function("filter_10k_intervals", |b| {
        b.iter(|| classifier.filter(black_box(&intervals), AdvertisingInterval::EXTRA_SHORT));
    });
}

criterion_group!(benches, bench_split, bench_analyze, bench_filter);
criterion_main!(benches);
