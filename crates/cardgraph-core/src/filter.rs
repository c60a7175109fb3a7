//! # Degree Filter
//!
//! Drops weakly connected nodes to reduce clutter.

use crate::graph::Graph;

/// Keep only nodes whose degree in `graph` is at least `min_degree`.
///
/// Degrees are measured on the input graph, not recomputed after removal,
/// so a kept node may end up with a lower degree in the result. The input
/// is never modified; `min_degree = 0` returns an equivalent copy.
#[must_use]
pub fn filter_by_degree(graph: &Graph, min_degree: usize) -> Graph {
    let degrees = graph.degrees();
    graph.induced_subgraph(|node| degrees.get(node.index.value()).copied().unwrap_or(0) >= min_degree)
}
