//! # Graph Summary Prompt
//!
//! Formats the knowledge-graph statistics into the prompt handed to an
//! external language model. No request is made from here.

use cardgraph_core::NodeKind;
use cardgraph_core::stats::GraphStatistics;
use std::fmt::Write as _;

/// Drivers named when no edges exist to count.
const DEFAULT_DRIVERS: &str =
    "Shared diseases, coarse data types, granular data types, and FAIR compliance characteristics";

/// Number of connection drivers listed.
const DRIVER_LIMIT: usize = 3;

/// The leading drivers as `column (n connections)`, comma-separated.
///
/// `drivers` is expected in ranked order, as produced by
/// [`cardgraph_core::connection_drivers`].
#[must_use]
pub fn format_drivers(drivers: &[(String, usize)]) -> String {
    if drivers.is_empty() {
        return DEFAULT_DRIVERS.to_string();
    }
    drivers
        .iter()
        .take(DRIVER_LIMIT)
        .map(|(column, n)| format!("{} ({} connections)", column, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the graph summary prompt.
///
/// `catalog_size` is the row count of the unfiltered table; a comparative
/// block is appended when the graph covers fewer entities than that.
#[must_use]
pub fn graph_summary_prompt(
    stats: &GraphStatistics,
    drivers: &[(String, usize)],
    kind: NodeKind,
    catalog_size: usize,
) -> String {
    let plural = kind.plural().to_lowercase();

    let top_nodes = stats
        .top_nodes
        .iter()
        .map(|(key, degree)| format!("- {}: {} connections", key, degree))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "You have a knowledge graph representing relationships between neuroscience {plural}.

Graph Statistics:
- Number of {plural}: {nodes}
- Number of connections: {edges}
- Connection drivers: {drivers}

Top connected {plural}:
{top_nodes}

Provide a detailed summary with these sections:
1. **Network Overview**: What the main clusters or groups represent
2. **Central Nodes**: Which {plural} are most connected and why (mention specific connection strengths)
3. **Connection Drivers**: What features/characteristics are driving the connections (based on the connection drivers listed above)
4. **Notable Patterns**: Interesting patterns in how {plural} relate to each other
5. **Comparative Insights** (if comparative context provided): How this graph compares to the full catalog

Use clear section headers and bullet points. Be specific about connection strengths and drivers.",
        nodes = stats.num_nodes,
        edges = stats.num_edges,
        drivers = format_drivers(drivers),
    );

    if stats.num_nodes < catalog_size {
        let _ = write!(
            prompt,
            "\n\nComparative Context:\n- Graph shows {} of {} total {}\n- Connection density: {:.2}%",
            stats.num_nodes,
            catalog_size,
            plural,
            stats.density * 100.0
        );
    }

    prompt
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cardgraph_core::NodeKey;

    #[test]
    fn drivers_take_the_top_three() {
        let drivers = vec![
            ("Data Types".to_string(), 2),
            ("Diseases Included".to_string(), 2),
            ("Languages".to_string(), 1),
            ("Tooling".to_string(), 1),
        ];
        assert_eq!(
            format_drivers(&drivers),
            "Data Types (2 connections), Diseases Included (2 connections), Languages (1 connections)"
        );
    }

    #[test]
    fn drivers_default_without_edges() {
        assert_eq!(format_drivers(&[]), DEFAULT_DRIVERS);
    }

    #[test]
    fn prompt_includes_statistics_and_context() {
        let stats = GraphStatistics {
            num_nodes: 4,
            num_edges: 3,
            density: 0.5,
            avg_degree: 1.5,
            max_degree: 3,
            num_components: 1,
            top_nodes: vec![(NodeKey::from("ADNI"), 3)],
        };
        let drivers = vec![("Diseases Included".to_string(), 3)];
        let prompt = graph_summary_prompt(&stats, &drivers, NodeKind::Dataset, 10);

        assert!(prompt.contains("- Number of datasets: 4"));
        assert!(prompt.contains("- Number of connections: 3"));
        assert!(prompt.contains("- Connection drivers: Diseases Included (3 connections)"));
        assert!(prompt.contains("- ADNI: 3 connections"));
        assert!(prompt.ends_with("- Graph shows 4 of 10 total datasets\n- Connection density: 50.00%"));

        let full = graph_summary_prompt(&stats, &drivers, NodeKind::Dataset, 4);
        assert!(!full.contains("Comparative Context"));
    }

    #[test]
    fn prompt_uses_the_kind_plural() {
        let prompt = graph_summary_prompt(&GraphStatistics::empty(), &[], NodeKind::Repository, 0);
        assert!(prompt.contains("neuroscience repositories"));
        assert!(prompt.contains(DEFAULT_DRIVERS));
    }
}
