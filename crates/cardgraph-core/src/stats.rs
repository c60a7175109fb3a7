//! # Graph Statistics
//!
//! Aggregate figures shown next to the graph and handed to summaries:
//! counts, density, degree profile, components, most connected nodes.
//!
//! ## Degenerate graphs
//!
//! | Graph | density | avg_degree | max_degree | components |
//! |-------|---------|------------|------------|------------|
//! | empty | 0 | 0 | 0 | 0 |
//! | one node | 0 | 0 | 0 | 1 |
//!
//! Nothing here returns an error.

use crate::graph::Graph;
use crate::primitives::TOP_NODES_LIMIT;
use crate::{NodeIndex, NodeKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

// =============================================================================
// GRAPH STATISTICS
// =============================================================================

/// Summary statistics of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphStatistics {
    /// Total number of nodes.
    pub num_nodes: usize,
    /// Total number of edges.
    pub num_edges: usize,
    /// Simple-graph density `2E / (N(N-1))`, 0 when N < 2.
    pub density: f64,
    /// Mean node degree.
    pub avg_degree: f64,
    /// Largest node degree.
    pub max_degree: usize,
    /// Number of connected components.
    pub num_components: usize,
    /// Up to ten `(key, degree)` pairs, highest degree first, ties in insertion order.
    pub top_nodes: Vec<(NodeKey, usize)>,
}

impl GraphStatistics {
    /// Statistics of an empty graph.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute statistics from a graph.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        if graph.is_empty() {
            return Self::empty();
        }

        let num_nodes = graph.node_count();
        let num_edges = graph.edge_count();
        let degrees = graph.degrees();

        let density = if num_nodes < 2 {
            0.0
        } else {
            (2 * num_edges) as f64 / (num_nodes * (num_nodes - 1)) as f64
        };

        let avg_degree = degrees.iter().sum::<usize>() as f64 / num_nodes as f64;

        Self {
            num_nodes,
            num_edges,
            density,
            avg_degree,
            max_degree: graph.max_degree(),
            num_components: connected_components(graph).len(),
            top_nodes: top_nodes(graph, TOP_NODES_LIMIT),
        }
    }
}

/// The `limit` highest-degree nodes.
///
/// The sort is stable, so equal degrees keep insertion order.
#[must_use]
pub fn top_nodes(graph: &Graph, limit: usize) -> Vec<(NodeKey, usize)> {
    let mut ranked: Vec<(NodeKey, usize)> = graph
        .nodes()
        .map(|node| (node.key.clone(), graph.degree(node.index)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// CONNECTED COMPONENTS
// =============================================================================

/// Union-Find over dense node indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = i;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return;
        }
        match self.rank[root_i].cmp(&self.rank[root_j]) {
            std::cmp::Ordering::Less => self.parent[root_i] = root_j,
            std::cmp::Ordering::Greater => self.parent[root_j] = root_i,
            std::cmp::Ordering::Equal => {
                self.parent[root_j] = root_i;
                self.rank[root_i] = self.rank[root_i].saturating_add(1);
            }
        }
    }
}

/// Connected components (clusters), largest first.
///
/// Members are listed in insertion order. Components of equal size are
/// ordered by their earliest member.
#[must_use]
pub fn connected_components(graph: &Graph) -> Vec<Vec<NodeKey>> {
    let mut uf = UnionFind::new(graph.node_count());
    for (a, b, _) in graph.edges() {
        uf.union(a.value(), b.value());
    }

    // root -> members; keyed by first-seen position to keep insertion order
    let mut by_root: BTreeMap<usize, usize> = BTreeMap::new();
    let mut components: Vec<Vec<NodeKey>> = Vec::new();
    for node in graph.nodes() {
        let root = uf.find(node.index.value());
        let slot = *by_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(node.key.clone());
    }

    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

// =============================================================================
// BETWEENNESS CENTRALITY
// =============================================================================

/// Normalized betweenness centrality of every node, in insertion order.
///
/// Brandes' algorithm on the unweighted graph. Scores are scaled by
/// `1 / ((n-1)(n-2))`; graphs with two or fewer nodes score 0 everywhere.
#[must_use]
pub fn betweenness_centrality(graph: &Graph) -> Vec<f64> {
    let n = graph.node_count();
    let mut centrality = vec![0.0_f64; n];

    for source in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();

        sigma[source] = 1.0;
        distance[source] = Some(0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = distance[v].unwrap_or(0);
            for w in graph.neighbors(NodeIndex(v)).map(NodeIndex::value) {
                if distance[w].is_none() {
                    distance[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if distance[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut centrality {
            *value *= scale;
        }
    } else {
        centrality.iter_mut().for_each(|v| *v = 0.0);
    }

    centrality
}

/// The `limit` most central nodes by betweenness, highest first.
#[must_use]
pub fn central_nodes(graph: &Graph, limit: usize) -> Vec<(NodeKey, f64)> {
    let scores = betweenness_centrality(graph);
    let mut ranked: Vec<(NodeKey, f64)> = graph
        .nodes()
        .map(|node| {
            let score = scores.get(node.index.value()).copied().unwrap_or(0.0);
            (node.key.clone(), score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// CONNECTION DRIVERS
// =============================================================================

/// How many edges each feature column contributes to.
///
/// Sorted by count descending, ties by column name.
#[must_use]
pub fn connection_drivers(graph: &Graph) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, _, connection) in graph.edges() {
        for feature in &connection.shared_features {
            *counts.entry(feature.column.as_str()).or_insert(0) += 1;
        }
    }

    let mut drivers: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(column, count)| (column.to_string(), count))
        .collect();
    drivers.sort_by(|a, b| b.1.cmp(&a.1));
    drivers
}

// =============================================================================
// TESTS
// =============================================================================
