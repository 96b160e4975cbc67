//! Cleaning pipeline benchmarks.
//!
//! Measures the full pipeline on tables with realistic dirt: missing
//! values, duplicates, decorated numerics, and mixed date formats.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use datarefine::{DataRefine, Parser, Table};

/// Generate a table where roughly 10% of numeric cells are missing,
/// 5% of rows are duplicated, and formats are mixed.
fn generate_dirty_table(rows: usize) -> Table {
    let mut data = String::from("id,amount,joined,city\n");
    for row in 0..rows {
        let amount = if row % 10 == 3 {
            String::new()
        } else if row % 7 == 0 {
            format!("\"${},{:03}\"", row / 1000 + 1, row % 1000)
        } else {
            format!("{}", row * 2)
        };
        let joined = if row % 2 == 0 {
            format!("2023-{:02}-{:02}", (row % 12) + 1, (row % 28) + 1)
        } else {
            format!("{:02}/{:02}/2023", (row % 12) + 1, (row % 28) + 1)
        };
        data.push_str(&format!(
            "{},{},{},City_{}\n",
            row,
            amount,
            joined,
            row % 25
        ));
        if row % 20 == 0 {
            // Exact duplicate of the row just written.
            data.push_str(&format!(
                "{},{},{},City_{}\n",
                row,
                amount,
                joined,
                row % 25
            ));
        }
    }
    Parser::new().from_csv_str(&data).unwrap()
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");

    for &rows in &[100usize, 1_000, 5_000] {
        let table = generate_dirty_table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            let engine = DataRefine::new();
            b.iter(|| engine.clean(black_box(table.clone())).unwrap());
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for &rows in &[1_000usize, 10_000] {
        let table = generate_dirty_table(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            let engine = DataRefine::new();
            b.iter(|| engine.validate(black_box(table)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clean, bench_validate);
criterion_main!(benches);
