//! # Scenario Tests
//!
//! End-to-end behaviour on small, hand-checked tables: build, statistics,
//! render and export of each.

use cardgraph_core::{
    AdjacencyMatrix, BuildConfig, ColorBy, DelimitedExport, GraphStatistics, NodeKey, NodeKind,
    RenderSettings, Table, build_graph, edge_details, parse_field, render, text_summary,
};
use std::collections::BTreeSet;

fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
    Table::from_rows(
        columns.iter().map(|c| (*c).to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| (*v).to_string()).collect())
            .collect(),
    )
    .expect("table")
}

/// Rows 1 and 2 share two of three feature columns, row 3 shares none.
fn three_studies() -> Table {
    table(
        &["Study Name", "Diseases Included", "Coarse Data Types", "Granular Data Types"],
        &[
            &["ADNI", "Alzheimer's; MCI", "Imaging; Clinical", "MRI"],
            &["AIBL", "Alzheimer's", "Imaging", "Amyloid PET"],
            &["PPMI", "Parkinson's", "Biospecimen", "CSF"],
        ],
    )
}

fn three_study_config(min: usize) -> BuildConfig {
    BuildConfig::new("Study Name")
        .with_features(["Diseases Included", "Coarse Data Types", "Granular Data Types"])
        .with_min_shared_features(min)
}

// =============================================================================
// SCENARIO A: TWO OF THREE COLUMNS SHARED
// =============================================================================

mod scenario_a {
    use super::*;

    #[test]
    fn one_edge_and_one_isolate() {
        let graph = build_graph(&three_studies(), &three_study_config(2));
        let stats = GraphStatistics::from_graph(&graph);

        assert_eq!(stats.num_nodes, 3);
        assert_eq!(stats.num_edges, 1);
        assert_eq!(stats.num_components, 2);

        let adni = graph.index_of(&NodeKey::from("ADNI")).expect("ADNI");
        let aibl = graph.index_of(&NodeKey::from("AIBL")).expect("AIBL");
        let ppmi = graph.index_of(&NodeKey::from("PPMI")).expect("PPMI");
        assert!(graph.contains_edge(adni, aibl));
        assert_eq!(graph.degree(ppmi), 0);
    }

    #[test]
    fn summary_names_the_connection() {
        let graph = build_graph(&three_studies(), &three_study_config(2));
        let stats = GraphStatistics::from_graph(&graph);
        let text = text_summary(&stats, &edge_details(&graph), NodeKind::Dataset);

        assert!(text.contains("Connected Components: 2"));
        assert!(text.contains("ADNI <-> AIBL"));
        assert!(text.contains("Shared: Diseases Included: Alzheimer's; Coarse Data Types: Imaging"));
    }
}

// =============================================================================
// SCENARIO B: THRESHOLD ABOVE OVERLAP
// =============================================================================

mod scenario_b {
    use super::*;

    #[test]
    fn no_edges_three_components() {
        let graph = build_graph(&three_studies(), &three_study_config(3));
        let stats = GraphStatistics::from_graph(&graph);

        assert_eq!(stats.num_nodes, 3);
        assert_eq!(stats.num_edges, 0);
        assert_eq!(stats.num_components, 3);
        assert_eq!(stats.density, 0.0);
        assert_eq!(stats.max_degree, 0);
    }
}

// =============================================================================
// SCENARIO C: SINGLE RECORD
// =============================================================================

mod scenario_c {
    use super::*;

    #[test]
    fn single_node_statistics_and_render() {
        let single = table(&["Study Name", "Diseases Included"], &[&["ADNI", "Alzheimer's"]]);
        let graph = build_graph(
            &single,
            &BuildConfig::new("Study Name").with_features(["Diseases Included"]),
        );
        let stats = GraphStatistics::from_graph(&graph);

        assert_eq!(stats.num_nodes, 1);
        assert_eq!(stats.num_edges, 0);
        assert_eq!(stats.avg_degree, 0.0);
        assert_eq!(stats.max_degree, 0);
        assert_eq!(stats.num_components, 1);

        let settings = RenderSettings::default();
        let figure = render(&graph, "Single", ColorBy::FairCompliance, &settings);
        assert!(!figure.is_placeholder());
        assert_eq!(figure.nodes.len(), 1);
        assert_eq!(figure.nodes[0].size, settings.node_size_min);
        assert!(figure.nodes[0].x.is_finite() && figure.nodes[0].y.is_finite());
    }

    #[test]
    fn empty_table_renders_placeholder() {
        let empty = table(&["Study Name"], &[]);
        let graph = build_graph(&empty, &BuildConfig::new("Study Name").with_features(["X"]));
        let stats = GraphStatistics::from_graph(&graph);

        assert_eq!(stats, GraphStatistics::empty());
        assert!(render(&graph, "Empty", ColorBy::Completeness, &RenderSettings::default()).is_placeholder());
        assert!(AdjacencyMatrix::from_graph(&graph).is_empty());
        assert!(edge_details(&graph).is_empty());
    }
}

// =============================================================================
// SCENARIO D: ADJACENCY OF A WEIGHT-3 PAIR
// =============================================================================

mod scenario_d {
    use super::*;

    #[test]
    fn two_by_two_matrix() {
        let pair = table(
            &["Study Name", "Diseases Included", "Coarse Data Types", "Granular Data Types"],
            &[
                &["ADNI", "Alzheimer's", "Imaging", "MRI"],
                &["OASIS", "Alzheimer's", "Imaging", "MRI"],
            ],
        );
        let graph = build_graph(&pair, &three_study_config(2));
        let matrix = AdjacencyMatrix::from_graph(&graph);

        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.get(0, 1), Some(3));
        assert_eq!(matrix.get(1, 0), Some(3));
        assert_eq!(matrix.get(0, 0), Some(0));
        assert_eq!(matrix.get(1, 1), Some(0));
        assert_eq!(
            matrix.to_delimited_string(',').expect("render"),
            ",ADNI,OASIS\nADNI,0,3\nOASIS,3,0\n"
        );
    }
}

// =============================================================================
// STOPWORDS & DUPLICATES
// =============================================================================

mod parsing {
    use super::*;

    #[test]
    fn stopwords_and_short_tokens_are_excluded() {
        let tokens = parse_field("the; data; Alzheimer's; a", ";", true);
        let expected: BTreeSet<String> = ["Alzheimer's".to_string()].into_iter().collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn text_columns_ignore_generic_terms() {
        let notes = table(
            &["Study Name", "Summary"],
            &[
                &["A", "data; analysis; tau"],
                &["B", "data; analysis; amyloid"],
            ],
        );
        let graph = build_graph(
            &notes,
            &BuildConfig::new("Study Name")
                .with_features(["Summary"])
                .with_min_shared_features(1),
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn duplicate_identifiers_collapse_last_write_wins() {
        let dup = table(
            &["Study Name", "Diseases Included"],
            &[&["ADNI", "AD"], &["PPMI", "PD"], &["ADNI", "PD"]],
        );
        let graph = build_graph(
            &dup,
            &BuildConfig::new("Study Name")
                .with_features(["Diseases Included"])
                .with_min_shared_features(1),
        );

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.collapsed_duplicates(), 1);
        assert_eq!(graph.edge_count(), 1);
        let adni = graph.node_by_key(&NodeKey::from("ADNI")).expect("ADNI");
        assert_eq!(adni.record.value("Diseases Included"), "PD");
    }
}
