//! # Property-Based Tests
//!
//! Invariants of graph construction, parsing, filtering and statistics
//! over randomly generated tables.

use cardgraph_core::{
    BuildConfig, GraphDocument, GraphStatistics, NodeKey, PairStrategy, Table, build_graph,
    filter_by_degree, join_tokens, parse_field,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::subsequence;

const COLUMNS: [&str; 3] = ["Diseases Included", "Data Modalities", "Country"];
const TOKENS: [&str; 6] = ["AD", "PD", "MRI", "PET", "EEG", "USA"];

/// Rows of three cells, each a random subset of `TOKENS`.
fn rows_strategy() -> impl Strategy<Value = Vec<Vec<Vec<&'static str>>>> {
    vec(vec(subsequence(TOKENS.to_vec(), 0..=3), 3), 0..12)
}

fn make_table(rows: &[Vec<Vec<&str>>]) -> Table {
    let mut columns = vec!["Study Name".to_string()];
    columns.extend(COLUMNS.iter().map(|c| (*c).to_string()));

    let body = rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let mut row = vec![format!("study-{}", i)];
            row.extend(cells.iter().map(|tokens| tokens.join("; ")));
            row
        })
        .collect();

    Table::from_rows(columns, body).expect("table")
}

fn config(min: usize) -> BuildConfig {
    BuildConfig::new("Study Name")
        .with_features(COLUMNS)
        .with_min_shared_features(min)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The contribution set of an edge does not depend on row order.
    #[test]
    fn shared_features_are_symmetric(rows in rows_strategy()) {
        let table = make_table(&rows);
        let forward = build_graph(&table, &config(1));

        // Same keys, opposite insertion order
        let mut reversed = Table::new(table.kind(), table.columns().to_vec());
        for record in table.records().iter().rev() {
            reversed.push(record.clone());
        }
        let backward = build_graph(&reversed, &config(1));

        prop_assert_eq!(forward.edge_count(), backward.edge_count());
        for (a, b, connection) in forward.edges() {
            let ka = &forward.node(a).expect("node").key;
            let kb = &forward.node(b).expect("node").key;
            let ia = backward.index_of(ka).expect("present");
            let ib = backward.index_of(kb).expect("present");
            prop_assert_eq!(backward.connection(ib, ia), Some(connection));
        }
    }

    /// Raising the threshold never adds edges.
    #[test]
    fn threshold_is_monotone(rows in rows_strategy(), min in 1usize..4) {
        let table = make_table(&rows);
        let looser = build_graph(&table, &config(min));
        let stricter = build_graph(&table, &config(min + 1));
        prop_assert!(stricter.edge_count() <= looser.edge_count());
    }

    /// Edge weight equals the number of contributing columns and meets the threshold.
    #[test]
    fn weight_counts_contributing_columns(rows in rows_strategy(), min in 1usize..4) {
        let graph = build_graph(&make_table(&rows), &config(min));
        for (_, _, connection) in graph.edges() {
            prop_assert_eq!(connection.weight.value() as usize, connection.shared_features.len());
            prop_assert!(connection.shared_features.len() >= min);
            prop_assert!(connection.shared_features.iter().all(|f| !f.shared_values.is_empty()));
        }
    }

    /// Both pair strategies build the same graph.
    #[test]
    fn strategies_agree(rows in rows_strategy(), min in 1usize..4) {
        let table = make_table(&rows);
        let pairwise = build_graph(&table, &config(min).with_strategy(PairStrategy::Pairwise));
        let indexed = build_graph(&table, &config(min).with_strategy(PairStrategy::InvertedIndex));
        prop_assert_eq!(
            GraphDocument::from_graph(&pairwise),
            GraphDocument::from_graph(&indexed)
        );
    }

    /// Parsing a rejoined parse result is stable.
    #[test]
    fn parse_is_idempotent(
        tokens in vec("[A-Za-z][A-Za-z0-9']{0,8}", 0..8),
        remove_stopwords in any::<bool>(),
    ) {
        let raw = tokens.join(" ; ");
        let once = parse_field(&raw, ";", remove_stopwords);
        let twice = parse_field(&join_tokens(&once, ";"), ";", remove_stopwords);
        prop_assert_eq!(once, twice);
    }

    /// The degree filter keeps exactly the nodes with original degree >= k.
    #[test]
    fn degree_filter_is_exact(rows in rows_strategy(), k in 0usize..5) {
        let graph = build_graph(&make_table(&rows), &config(1));
        let filtered = filter_by_degree(&graph, k);

        for node in graph.nodes() {
            let kept = filtered.node_by_key(&node.key).is_some();
            prop_assert_eq!(kept, graph.degree(node.index) >= k);
        }
        for (a, b, connection) in filtered.edges() {
            let ka: &NodeKey = &filtered.node(a).expect("node").key;
            let kb: &NodeKey = &filtered.node(b).expect("node").key;
            let oa = graph.index_of(ka).expect("original");
            let ob = graph.index_of(kb).expect("original");
            prop_assert_eq!(graph.connection(oa, ob), Some(connection));
        }
    }

    /// Density stays in [0, 1] and is 0 below two nodes.
    #[test]
    fn density_is_bounded(rows in rows_strategy(), min in 1usize..4) {
        let graph = build_graph(&make_table(&rows), &config(min));
        let stats = GraphStatistics::from_graph(&graph);

        prop_assert!((0.0..=1.0).contains(&stats.density));
        if stats.num_nodes < 2 {
            prop_assert_eq!(stats.density, 0.0);
        }
        prop_assert!(stats.top_nodes.len() <= 10);
        prop_assert!(stats.num_components <= stats.num_nodes);
    }
}
