//! Parser performance benchmarks.
//!
//! Measures parsing and type inference across file sizes and formats.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use datarefine::Parser;

/// Generate synthetic CSV data with the specified number of rows.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("id,name,amount,joined,city\n");
    for row in 0..rows {
        data.push_str(&format!(
            "{},Person_{},{:.2},2023-{:02}-{:02},Category_{}\n",
            row,
            row,
            row as f64 * 1.5,
            (row % 12) + 1,
            (row % 28) + 1,
            row % 10
        ));
    }
    data
}

fn bench_parse_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for &rows in &[100usize, 1_000, 10_000] {
        let data = generate_csv_data(rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| parser.from_csv_str(black_box(data)).unwrap());
        });
    }

    group.finish();
}

fn bench_parse_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_json");

    for &rows in &[100usize, 1_000] {
        let records: Vec<String> = (0..rows)
            .map(|row| {
                format!(
                    r#"{{"id": {}, "name": "Person_{}", "amount": {:.2}}}"#,
                    row,
                    row,
                    row as f64 * 1.5
                )
            })
            .collect();
        let data = format!("[{}]", records.join(","));
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| parser.from_json_str(black_box(data)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_csv, bench_parse_json);
criterion_main!(benches);
