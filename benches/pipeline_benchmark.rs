//! Benchmark of pipeline fitting and cross-validated search
//!
//! Run with: cargo bench --bench pipeline_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use credit_default::pipeline::{
    FeatureTable, GridSearch, Kernel, ParamGrid, PcaComponents, PipelineSpec, SearchConfig,
    DEFAULT_MEMORY_BUDGET_MB,
};

/// Synthetic credit-like features: three categorical codes and twenty numerics
fn generate_credit_table(n_rows: usize, seed: u64) -> (FeatureTable, Vec<bool>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let labels: Vec<bool> = (0..n_rows).map(|_| rng.gen_bool(0.22)).collect();

    let mut names = vec!["SEX".to_string(), "EDUCATION".to_string(), "MARRIAGE".to_string()];
    let mut columns: Vec<Vec<f64>> = vec![
        (0..n_rows).map(|i| (1 + i % 2) as f64).collect(),
        (0..n_rows).map(|i| (1 + i % 4) as f64).collect(),
        (0..n_rows).map(|i| (1 + i % 3) as f64).collect(),
    ];

    for j in 0..20 {
        names.push(format!("X{}", j));
        let values = labels
            .iter()
            .map(|&default| {
                // Shift a few columns with the label so the F-test has signal
                let shift = if default && j % 5 == 0 { 1.5 } else { 0.0 };
                rng.gen::<f64>() * 3.0 + shift
            })
            .collect();
        columns.push(values);
    }

    (FeatureTable::new(names, columns).expect("valid table"), labels)
}

fn bench_pipeline_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_fit");
    group.sample_size(10);

    for n_rows in [250, 500, 1000] {
        let (x, y) = generate_credit_table(n_rows, 42);
        let spec = PipelineSpec {
            pca_components: PcaComponents::All,
            k: 12,
            gamma: 0.1,
            kernel: Kernel::Rbf,
        };

        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("rbf", n_rows), &n_rows, |b, _| {
            b.iter(|| spec.fit(black_box(&x), black_box(&y)).expect("fit"))
        });
    }

    group.finish();
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);

    let (x, y) = generate_credit_table(400, 7);
    let search = GridSearch::new(
        ParamGrid::default(),
        SearchConfig {
            cv_folds: 5,
            jobs: 0,
            memory_budget_mb: DEFAULT_MEMORY_BUDGET_MB,
            show_progress: false,
        },
    );

    group.bench_function("default_grid_5_folds", |b| {
        b.iter(|| search.fit(black_box(&x), black_box(&y)).expect("search"))
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline_fit, bench_grid_search);
criterion_main!(benches);
