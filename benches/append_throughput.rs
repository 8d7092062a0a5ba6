use std::{hint::black_box, time::Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kopi::{
    storage::table::Table,
    types::value::Value,
    utils::mock::create_temp_db_path_with_prefix,
};

const ROW_COUNTS: &[usize] = &[1_000, 10_000, 50_000, 100_000];

fn make_row(i: usize) -> Vec<Value> {
    vec![
        Value::Integer(i as i64),
        Value::Text(format!("event_{}", i)),
        Value::Real(i as f64 * 0.5),
    ]
}

fn benchmark_append_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_throughput");
    for &row_count in ROW_COUNTS {
        group.throughput(Throughput::Elements(row_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(row_count),
            &row_count,
            |b, &row_count| {
                b.iter_custom(|iters| {
                    let mut total = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        let path = create_temp_db_path_with_prefix("bench_append");
                        let mut table = Table::create(
                            &path,
                            "CREATE TABLE events (id INTEGER, name TEXT(32), score REAL)",
                        )
                        .unwrap();
                        let start = Instant::now();
                        for i in 0..row_count {
                            table.append_row(black_box(&make_row(i))).unwrap();
                        }
                        total += start.elapsed();
                        table.close().unwrap();
                        let _ = std::fs::remove_file(&path);
                    }
                    total
                });
            },
        );
    }
    group.finish();
}

fn benchmark_scan_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_throughput");
    for &row_count in ROW_COUNTS {
        let path = create_temp_db_path_with_prefix("bench_scan");
        let mut table = Table::create(
            &path,
            "CREATE TABLE events (id INTEGER, name TEXT(32), score REAL)",
        )
        .unwrap();
        for i in 0..row_count {
            table.append_row(&make_row(i)).unwrap();
        }

        group.throughput(Throughput::Elements(row_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(row_count),
            &row_count,
            |b, &row_count| {
                b.iter(|| {
                    let mut seen = 0usize;
                    table
                        .scan(|values| {
                            black_box(values);
                            seen += 1;
                        })
                        .unwrap();
                    assert_eq!(seen, row_count);
                });
            },
        );

        table.close().unwrap();
        let _ = std::fs::remove_file(&path);
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_append_throughput,
    benchmark_scan_throughput
);
criterion_main!(benches);
