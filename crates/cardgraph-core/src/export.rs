//! # Graph Exporters
//!
//! Derived artifacts a caller can hand to a user as-is:
//!
//! - `AdjacencyMatrix`: weight of every node pair, 0 where unconnected
//! - `EdgeDetails`: one row per edge with its shared features as text
//! - `text_summary`: a plain-text report of statistics and connections
//! - `GraphDocument`: node-link JSON snapshot of the whole graph
//!
//! Tabular artifacts implement `DelimitedExport` and can be written as
//! CSV or TSV with RFC 4180 quoting.

use crate::graph::{Graph, SharedFeature};
use crate::primitives::SUMMARY_EDGE_LIMIT;
use crate::stats::GraphStatistics;
use crate::{CardGraphError, NodeKey, NodeKind, Record};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Width of the text summary rulers.
const SUMMARY_WIDTH: usize = 80;

// =============================================================================
// DELIMITED OUTPUT
// =============================================================================

/// A table that can be written as delimiter-separated text.
pub trait DelimitedExport {
    /// Header cells. An empty header means there is nothing to write.
    fn header(&self) -> Vec<String>;

    /// Body rows, each as long as the header.
    fn rows(&self) -> Vec<Vec<String>>;

    /// Write header and rows to `sink`, one record per `\n`-terminated line.
    fn write_delimited<W: Write>(&self, sink: &mut W, separator: char) -> Result<(), CardGraphError> {
        let header = self.header();
        if header.is_empty() {
            return Ok(());
        }
        write_line(sink, &header, separator)?;
        for row in self.rows() {
            write_line(sink, &row, separator)?;
        }
        Ok(())
    }

    /// Render to a string.
    fn to_delimited_string(&self, separator: char) -> Result<String, CardGraphError> {
        let mut buf = Vec::new();
        self.write_delimited(&mut buf, separator)?;
        String::from_utf8(buf).map_err(|e| CardGraphError::Serialization(e.to_string()))
    }
}

fn write_line<W: Write>(sink: &mut W, fields: &[String], separator: char) -> Result<(), CardGraphError> {
    let line = fields
        .iter()
        .map(|f| quote_field(f, separator))
        .collect::<Vec<_>>()
        .join(&separator.to_string());
    writeln!(sink, "{}", line)?;
    Ok(())
}

/// Quote a field if it contains the separator, a quote or a line break.
#[must_use]
pub fn quote_field(field: &str, separator: char) -> String {
    if field.contains(separator) || field.contains(['"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// ADJACENCY MATRIX
// =============================================================================

/// Square weight matrix indexed by node key in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    keys: Vec<NodeKey>,
    cells: Vec<Vec<u32>>,
}

impl AdjacencyMatrix {
    /// Build the matrix: edge weight where connected, 0 elsewhere and on the diagonal.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut cells = vec![vec![0_u32; n]; n];
        for (a, b, connection) in graph.edges() {
            let w = connection.weight.value();
            cells[a.value()][b.value()] = w;
            cells[b.value()][a.value()] = w;
        }
        Self {
            keys: graph.nodes().map(|n| n.key.clone()).collect(),
            cells,
        }
    }

    /// Row/column labels.
    #[must_use]
    pub fn keys(&self) -> &[NodeKey] {
        &self.keys
    }

    /// Cell value, or `None` outside the matrix.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Number of rows (= columns).
    #[must_use]
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl DelimitedExport for AdjacencyMatrix {
    fn header(&self) -> Vec<String> {
        if self.keys.is_empty() {
            return Vec::new();
        }
        std::iter::once(String::new())
            .chain(self.keys.iter().map(ToString::to_string))
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.keys
            .iter()
            .zip(&self.cells)
            .map(|(key, row)| {
                std::iter::once(key.to_string())
                    .chain(row.iter().map(ToString::to_string))
                    .collect()
            })
            .collect()
    }
}

// =============================================================================
// EDGE DETAILS
// =============================================================================

/// One edge as a flat row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDetail {
    pub node1: NodeKey,
    pub node2: NodeKey,
    pub weight: u32,
    /// `column: v1, v2` per contributing column, joined by `; `.
    pub shared_features: String,
}

/// All edges of a graph in edge order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeDetails(pub Vec<EdgeDetail>);

impl EdgeDetails {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeDetail> {
        self.0.iter()
    }
}

impl DelimitedExport for EdgeDetails {
    fn header(&self) -> Vec<String> {
        ["Node 1", "Node 2", "Weight", "Shared Features"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|d| {
                vec![
                    d.node1.to_string(),
                    d.node2.to_string(),
                    d.weight.to_string(),
                    d.shared_features.clone(),
                ]
            })
            .collect()
    }
}

/// Render shared features as `column: v1, v2; column: v3`.
#[must_use]
pub fn shared_features_text(features: &[SharedFeature]) -> String {
    features
        .iter()
        .map(|f| format!("{}: {}", f.column, f.shared_values.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Flatten every edge of `graph` into a detail row.
#[must_use]
pub fn edge_details(graph: &Graph) -> EdgeDetails {
    EdgeDetails(
        graph
            .edges()
            .filter_map(|(a, b, connection)| {
                let (na, nb) = (graph.node(a)?, graph.node(b)?);
                Some(EdgeDetail {
                    node1: na.key.clone(),
                    node2: nb.key.clone(),
                    weight: connection.weight.value(),
                    shared_features: shared_features_text(&connection.shared_features),
                })
            })
            .collect(),
    )
}

// =============================================================================
// TEXT SUMMARY
// =============================================================================

/// Center `text` in `width` columns the way fixed-width reports do:
/// the extra space of an odd margin goes right unless both are odd.
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let margin = width - len;
    let left = margin / 2 + (margin & width & 1);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(margin - left))
}

/// Plain-text report: statistics, top-connected nodes, then up to
/// twenty connections with a note on how many were left out.
#[must_use]
pub fn text_summary(stats: &GraphStatistics, details: &EdgeDetails, kind: NodeKind) -> String {
    let heavy = "=".repeat(SUMMARY_WIDTH);
    let light = "-".repeat(SUMMARY_WIDTH);

    let mut lines = vec![
        heavy.clone(),
        center("Knowledge Graph Summary", SUMMARY_WIDTH),
        heavy.clone(),
        String::new(),
        format!("Nodes ({}): {}", kind.plural(), stats.num_nodes),
        format!("Edges (Connections): {}", stats.num_edges),
        format!("Graph Density: {:.4}", stats.density),
        format!("Average Connections per Node: {:.2}", stats.avg_degree),
        format!("Maximum Connections: {}", stats.max_degree),
        format!("Connected Components: {}", stats.num_components),
        String::new(),
        heavy.clone(),
        format!("Most Connected {}:", kind.plural()),
        light.clone(),
    ];

    for (key, degree) in &stats.top_nodes {
        lines.push(format!("  {}: {} connections", key, degree));
    }

    if !details.is_empty() {
        lines.extend([String::new(), heavy, "Connection Details:".to_string(), light]);

        for detail in details.iter().take(SUMMARY_EDGE_LIMIT) {
            lines.push(format!("\n{} <-> {}", detail.node1, detail.node2));
            lines.push(format!("  Weight: {}", detail.weight));
            lines.push(format!("  Shared: {}", detail.shared_features));
        }

        if details.len() > SUMMARY_EDGE_LIMIT {
            lines.push(format!(
                "\n... and {} more connections",
                details.len() - SUMMARY_EDGE_LIMIT
            ));
        }
    }

    lines.join("\n")
}

// =============================================================================
// NODE-LINK DOCUMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub degree: usize,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEdge {
    pub source: NodeKey,
    pub target: NodeKey,
    pub weight: u32,
    pub shared_features: Vec<SharedFeature>,
}

/// Serializable node-link snapshot of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<DocumentEdge>,
    pub collapsed_duplicates: usize,
}

impl GraphDocument {
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| DocumentNode {
                key: n.key.clone(),
                kind: n.kind,
                degree: graph.degree(n.index),
                record: n.record.clone(),
            })
            .collect();

        let edges = graph
            .edges()
            .filter_map(|(a, b, connection)| {
                Some(DocumentEdge {
                    source: graph.node(a)?.key.clone(),
                    target: graph.node(b)?.key.clone(),
                    weight: connection.weight.value(),
                    shared_features: connection.shared_features.clone(),
                })
            })
            .collect();

        Self {
            nodes,
            edges,
            collapsed_duplicates: graph.collapsed_duplicates(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CardGraphError> {
        serde_json::to_string_pretty(self).map_err(|e| CardGraphError::Serialization(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
