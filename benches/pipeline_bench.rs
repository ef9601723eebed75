//! Benchmarks for the dataset pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use covid_dashboard::data::reference::{read_points, read_population, CountyBoundaries};
use covid_dashboard::data::{CaseRecord, Fips, ReferenceData};
use covid_dashboard::pipeline::{build_dataset, rolling_mean, PipelineOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const COUNTIES: u32 = 254;

fn create_reference() -> ReferenceData {
    let mut points = String::from("GEOID,lat,lon\n");
    let mut population = String::from("CTYNAME,2019\n");
    for i in 0..COUNTIES {
        points.push_str(&format!("{},{},{}\n", 48001 + i * 2, 30.0 + i as f64 * 0.01, -99.0));
        population.push_str(&format!("County{} County,{}\n", i, 10_000 + i * 100));
    }

    ReferenceData {
        points: read_points(points.as_bytes(), "bench").unwrap(),
        population: read_population(population.as_bytes(), "bench", "CTYNAME", "2019").unwrap(),
        boundaries: CountyBoundaries::from_value(
            serde_json::json!({"type": "FeatureCollection", "features": []}),
            "GEOID",
            "bench",
        )
        .unwrap(),
    }
}

fn create_cases(days: i64) -> Vec<CaseRecord> {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();

    (0..days)
        .flat_map(|day| {
            (0..COUNTIES).map(move |i| CaseRecord {
                date: start + Duration::days(day),
                county: format!("County{}", i),
                fips: Some(Fips::new(48001 + i * 2)),
                cases: (day as u64 + 1) * u64::from(i + 1),
                deaths: Some(day as u64),
            })
        })
        .collect()
}

fn bench_rolling_mean(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_mean");

    for size in [100, 1000, 10000] {
        let values: Vec<u64> = (0..size).collect();
        group.throughput(Throughput::Elements(size));

        group.bench_function(format!("window7_{}", size), |b| {
            b.iter(|| rolling_mean(black_box(&values), 7))
        });
    }

    group.finish();
}

fn bench_build_dataset(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_dataset");
    group.sample_size(20);

    for days in [30, 180] {
        let cases = create_cases(days);
        let options = PipelineOptions::default();
        group.throughput(Throughput::Elements(cases.len() as u64));

        group.bench_function(format!("{}_days", days), |b| {
            b.iter(|| build_dataset(black_box(&cases), create_reference(), &options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rolling_mean, bench_build_dataset);
criterion_main!(benches);
