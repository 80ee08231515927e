//! FILENAME: pivot-engine/benches/pivot_calculations.rs

use std::hint::black_box;

use criterion::*;
use pivot_engine::{AggregationType, PivotField, PivotTable, Row, Value};

const ROWS_SMALL: usize = 1_000;
const ROWS_MED: usize = 50_000;

/// Synthetic sales rows spread over 5 years x 12 months x 20 customers.
fn make_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let mut row = Row::default();
            row.insert("year".to_string(), Value::from(format!("{}", 2020 + i % 5)));
            row.insert("month".to_string(), Value::from(format!("{:02}", 1 + i % 12)));
            row.insert("customer".to_string(), Value::from(format!("C{:03}", i % 20)));
            row.insert("amount".to_string(), Value::Float((i % 997) as f64 * 0.25));
            row
        })
        .collect()
}

fn make_table() -> PivotTable {
    let mut amount = PivotField::new("amount");
    amount.method = pivot_engine::FieldMethod::Float;
    PivotTable::new(
        vec![
            PivotField::new("year"),
            PivotField::new("month"),
            PivotField::new("customer"),
        ],
        amount,
        AggregationType::Sum,
    )
}

fn build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot_build");

    for &count in &[ROWS_SMALL, ROWS_MED] {
        let rows = make_rows(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::new("fold_rows", count), |b| {
            b.iter_batched(
                make_table,
                |mut table| {
                    table.add_rows(rows.iter());
                    black_box(table.grand_total());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn serialize_benchmark(c: &mut Criterion) {
    let rows = make_rows(ROWS_SMALL);
    let mut table = make_table();
    table.add_rows(rows.iter());

    c.bench_function("pivot_serialize", |b| {
        b.iter(|| {
            let view = table.view();
            black_box(serde_json::to_string(&view).unwrap());
        });
    });
}

criterion_group!(benches, build_benchmark, serialize_benchmark);
criterion_main!(benches);
