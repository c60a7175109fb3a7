//! # Graph Benchmarks
//!
//! Performance benchmarks for cardgraph-core graph construction and layout.
//!
//! Run with: `cargo bench -p cardgraph-core`

use cardgraph_core::{
    BuildConfig, GraphStatistics, LayoutSettings, PairStrategy, Table, build_graph, spring_layout,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const DISEASES: [&str; 8] = ["AD", "PD", "ALS", "MS", "FTD", "LBD", "HD", "MCI"];
const MODALITIES: [&str; 6] = ["MRI", "PET", "EEG", "CSF", "Blood", "Genomics"];

/// Create a table of `size` studies with a deterministic spread of features.
fn create_table(size: usize) -> Table {
    let columns = ["Study Name", "Diseases Included", "Data Modalities"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = (0..size)
        .map(|i| {
            vec![
                format!("study-{}", i),
                format!("{}; {}", DISEASES[i % DISEASES.len()], DISEASES[(i / 3) % DISEASES.len()]),
                format!("{}; {}", MODALITIES[i % MODALITIES.len()], MODALITIES[(i / 2) % MODALITIES.len()]),
            ]
        })
        .collect();

    Table::from_rows(columns, rows).expect("table")
}

fn config(strategy: PairStrategy) -> BuildConfig {
    BuildConfig::new("Study Name")
        .with_features(["Diseases Included", "Data Modalities"])
        .with_min_shared_features(2)
        .with_strategy(strategy)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");

    for size in [100, 500, 1000].iter() {
        let table = create_table(*size);

        group.bench_with_input(BenchmarkId::new("pairwise", size), &table, |b, table| {
            b.iter(|| black_box(build_graph(table, &config(PairStrategy::Pairwise))));
        });

        group.bench_with_input(BenchmarkId::new("inverted_index", size), &table, |b, table| {
            b.iter(|| black_box(build_graph(table, &config(PairStrategy::InvertedIndex))));
        });
    }

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [100, 500, 1000].iter() {
        let graph = build_graph(&create_table(*size), &config(PairStrategy::InvertedIndex));

        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(GraphStatistics::from_graph(graph)));
        });
    }

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring_layout");
    let settings = LayoutSettings::default();

    for size in [50, 200].iter() {
        let graph = build_graph(&create_table(*size), &config(PairStrategy::InvertedIndex));

        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(spring_layout(graph, &settings)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_statistics, bench_layout);
criterion_main!(benches);
