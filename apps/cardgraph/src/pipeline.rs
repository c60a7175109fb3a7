//! # Graph Pipeline
//!
//! One view of a table: cap the input, build, filter, measure. Every
//! command goes through here so they all see the same graph.
//!
//! ```text
//! Table ──► truncate ──► build_graph ──► filter_by_degree ──► GraphStatistics
//! ```

use crate::config::ResolvedOptions;
use crate::prompt::graph_summary_prompt;
use crate::table::truncate;
use cardgraph_core::{
    AdjacencyMatrix, CardGraphError, DelimitedExport, Figure, Graph, GraphStatistics, NodeKind,
    Table, build_graph, connection_drivers, edge_details, filter_by_degree, render, text_summary,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// =============================================================================
// GRAPH VIEW
// =============================================================================

/// A built, filtered graph and what callers report about it.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// Entity kind of the source table.
    pub kind: NodeKind,
    /// Row count of the table before the input cap.
    pub catalog_size: usize,
    /// The graph after degree filtering.
    pub graph: Graph,
    /// Statistics of `graph`.
    pub stats: GraphStatistics,
}

impl GraphView {
    /// Build the view of `table` under `options`.
    pub fn build(table: &Table, options: &ResolvedOptions) -> Self {
        let catalog_size = table.len();
        let mut table = table.clone();

        let dropped = truncate(&mut table, options.max_nodes);
        if dropped > 0 {
            info!(
                kept = table.len(),
                dropped,
                max_nodes = options.max_nodes,
                "Input capped"
            );
        }

        for column in &options.build.feature_columns {
            if !table.has_column(&column.name) {
                debug!(column = %column.name, "Feature column not in table, skipped");
            }
        }
        if !table.has_column(&options.build.id_column) {
            warn!(
                column = %options.build.id_column,
                "Identifier column missing, nodes are keyed by row"
            );
        }

        let built = build_graph(&table, &options.build);
        if built.collapsed_duplicates() > 0 {
            warn!(
                collapsed = built.collapsed_duplicates(),
                column = %options.build.id_column,
                "Duplicate identifiers collapsed onto one node (last row wins)"
            );
        }

        let graph = if options.min_degree > 0 {
            filter_by_degree(&built, options.min_degree)
        } else {
            built
        };
        let stats = GraphStatistics::from_graph(&graph);

        info!(
            nodes = stats.num_nodes,
            edges = stats.num_edges,
            strategy = ?options.build.strategy,
            "Graph built"
        );

        Self {
            kind: table.kind(),
            catalog_size,
            graph,
            stats,
        }
    }

    /// Render the figure with the resolved title and colouring.
    #[must_use]
    pub fn figure(&self, options: &ResolvedOptions) -> Figure {
        render(&self.graph, &options.title, options.color_by, &options.render)
    }

    /// The plain-text graph summary.
    #[must_use]
    pub fn summary(&self) -> String {
        text_summary(&self.stats, &edge_details(&self.graph), self.kind)
    }

    /// The language-model summary prompt.
    #[must_use]
    pub fn prompt(&self) -> String {
        graph_summary_prompt(
            &self.stats,
            &connection_drivers(&self.graph),
            self.kind,
            self.catalog_size,
        )
    }
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// Write a delimited export to `path`.
pub fn write_table<E: DelimitedExport>(
    export: &E,
    path: &Path,
    separator: char,
) -> Result<(), CardGraphError> {
    let file = File::create(path)
        .map_err(|e| CardGraphError::Io(format!("Cannot create '{}': {}", path.display(), e)))?;
    let mut sink = BufWriter::new(file);
    export.write_delimited(&mut sink, separator)?;
    sink.flush()?;
    Ok(())
}

/// Write every report of `view` into `dir`, named after `name`.
///
/// Produces `<name>_stats.json`, `<name>_edges.csv`, `<name>_adjacency.csv`,
/// `<name>_summary.txt` and `<name>.svg`. Returns the written paths.
pub fn write_artifacts(
    view: &GraphView,
    options: &ResolvedOptions,
    dir: &Path,
    name: &str,
    figure_size: (u32, u32),
) -> Result<Vec<PathBuf>, CardGraphError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        CardGraphError::Io(format!("Cannot create output directory '{}': {}", dir.display(), e))
    })?;

    let stats_path = dir.join(format!("{}_stats.json", name));
    let stats_json = serde_json::to_string_pretty(&view.stats)
        .map_err(|e| CardGraphError::Serialization(e.to_string()))?;
    std::fs::write(&stats_path, stats_json)?;

    let edges_path = dir.join(format!("{}_edges.csv", name));
    write_table(&edge_details(&view.graph), &edges_path, ',')?;

    let adjacency_path = dir.join(format!("{}_adjacency.csv", name));
    write_table(&AdjacencyMatrix::from_graph(&view.graph), &adjacency_path, ',')?;

    let summary_path = dir.join(format!("{}_summary.txt", name));
    std::fs::write(&summary_path, view.summary())?;

    let svg_path = dir.join(format!("{}.svg", name));
    let (width, height) = figure_size;
    std::fs::write(&svg_path, view.figure(options).to_svg(width, height))?;

    let written = vec![stats_path, edges_path, adjacency_path, summary_path, svg_path];
    info!(view = name, files = written.len(), dir = %dir.display(), "Artifacts written");
    Ok(written)
}

// =============================================================================
// TESTS
// =============================================================================
