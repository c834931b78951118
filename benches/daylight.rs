//! Daylight classification and grid decoding throughput

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sigact_processor::config::{SigactConfig, SolarConfig};
use sigact_processor::daylight::DaylightClassifier;
use sigact_processor::enrichment::{RecordEnricher, locate_all};
use sigact_processor::ephemeris::SolarEphemeris;
use sigact_processor::mgrs;
use sigact_processor::models::{Coordinates, IncidentRecord};
use sigact_processor::processor::BatchExecutor;
use std::sync::Arc;

fn ephemeris() -> Arc<SolarEphemeris> {
    Arc::new(
        SolarEphemeris::generate(
            NaiveDate::from_ymd_opt(2007, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2008, 1, 1).unwrap(),
        )
        .unwrap(),
    )
}

fn bench_classify(c: &mut Criterion) {
    let classifier = DaylightClassifier::new(ephemeris(), SolarConfig::default());
    let baghdad = Coordinates::new(33.3, 44.4);
    let at = NaiveDate::from_ymd_opt(2007, 6, 15)
        .unwrap()
        .and_hms_opt(13, 0, 0)
        .unwrap();

    c.bench_function("classify_baghdad_midday", |b| {
        b.iter(|| black_box(classifier.classify(black_box(baghdad), black_box(at))))
    });
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("mgrs_decode");
    for reference in ["38SMB4484", "38SMB4460084800", "INVALID123"] {
        group.bench_with_input(BenchmarkId::from_parameter(reference), reference, |b, r| {
            b.iter(|| black_box(mgrs::resolve(black_box(r))))
        });
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2007, 3, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    let records = (0..2_000)
        .map(|row| {
            IncidentRecord::new(
                row,
                start + chrono::Duration::minutes(row as i64 * 173),
                "38SMB4484",
            )
        })
        .collect();
    let incidents = locate_all(records).located;

    let config = SigactConfig::default().with_partitions(64).without_progress();
    let executor = BatchExecutor::new(
        Arc::new(RecordEnricher::new(ephemeris(), SolarConfig::default())),
        &config,
    );

    let mut group = c.benchmark_group("strategies");
    group.sample_size(10);
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(executor.run_sequential(&incidents)))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(executor.run_parallel(&incidents).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_decode, bench_strategies);
criterion_main!(benches);
