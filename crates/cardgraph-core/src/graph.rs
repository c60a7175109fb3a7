//! # Graph
//!
//! The undirected similarity graph produced by the builder.
//!
//! Nodes keep their insertion order and are addressed by a dense
//! `NodeIndex`. Edges are stored once per unordered pair under the key
//! `(low, high)`, so self-loops and duplicate edges cannot exist.
//! All maps are `BTreeMap`/`BTreeSet` for deterministic iteration.

use crate::{EdgeWeight, NodeIndex, NodeKey, NodeKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// NODE & EDGE PAYLOADS
// =============================================================================

/// A node: one entity of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Position in insertion order.
    pub index: NodeIndex,
    /// Identity (identifier-column value).
    pub key: NodeKey,
    /// Entity kind, decided at table-load time.
    pub kind: NodeKind,
    /// The full source row, including non-feature columns.
    pub record: Record,
}

/// One feature column two entities share tokens in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedFeature {
    /// The feature column name.
    pub column: String,
    /// Tokens present on both sides, in sorted order.
    pub shared_values: Vec<String>,
}

/// Payload of an undirected edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Number of contributing feature columns.
    pub weight: EdgeWeight,
    /// Contributing columns, in feature-column order.
    pub shared_features: Vec<SharedFeature>,
}

impl Connection {
    /// Create a connection whose weight is the number of shared features.
    #[must_use]
    pub fn new(shared_features: Vec<SharedFeature>) -> Self {
        Self {
            weight: EdgeWeight::new(u32::try_from(shared_features.len()).unwrap_or(u32::MAX)),
            shared_features,
        }
    }
}

/// Canonical key for an unordered pair.
fn pair(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Undirected, simple, node-attributed graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node storage in insertion order.
    nodes: Vec<Node>,

    /// Reverse lookup: NodeKey -> NodeIndex
    key_index: BTreeMap<NodeKey, NodeIndex>,

    /// Edge storage: (low, high) -> payload
    edges: BTreeMap<(NodeIndex, NodeIndex), Connection>,

    /// Neighbour sets, aligned with `nodes`.
    adjacency: Vec<BTreeSet<NodeIndex>>,

    /// Rows whose key was already present when inserted.
    collapsed_duplicates: usize,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or overwrite the record of an existing node with the same key.
    ///
    /// An overwritten node keeps its original position. Each overwrite is
    /// counted in `collapsed_duplicates`.
    pub fn upsert_node(&mut self, key: NodeKey, kind: NodeKind, record: Record) -> NodeIndex {
        if let Some(&index) = self.key_index.get(&key) {
            if let Some(node) = self.nodes.get_mut(index.0) {
                node.kind = kind;
                node.record = record;
            }
            self.collapsed_duplicates = self.collapsed_duplicates.saturating_add(1);
            return index;
        }

        let index = NodeIndex(self.nodes.len());
        self.key_index.insert(key.clone(), index);
        self.nodes.push(Node {
            index,
            key,
            kind,
            record,
        });
        self.adjacency.push(BTreeSet::new());
        index
    }

    /// Insert or replace the edge between two nodes.
    ///
    /// Self-loops and edges touching unknown nodes are silently ignored.
    /// Returns `true` if a new edge was created.
    pub fn insert_edge(&mut self, a: NodeIndex, b: NodeIndex, connection: Connection) -> bool {
        if a == b || a.0 >= self.nodes.len() || b.0 >= self.nodes.len() {
            return false;
        }
        let created = self.edges.insert(pair(a, b), connection).is_none();
        if created {
            self.adjacency[a.0].insert(b);
            self.adjacency[b.0].insert(a);
        }
        created
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of source rows that collapsed onto an existing key.
    #[must_use]
    pub fn collapsed_duplicates(&self) -> usize {
        self.collapsed_duplicates
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Get a node by index.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    /// Get a node by key.
    #[must_use]
    pub fn node_by_key(&self, key: &NodeKey) -> Option<&Node> {
        self.index_of(key).and_then(|i| self.node(i))
    }

    /// Get the index of a key.
    #[must_use]
    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    /// All edges as `(low, high, payload)`, ordered by `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &Connection)> + '_ {
        self.edges.iter().map(|(&(a, b), c)| (a, b, c))
    }

    /// Get the payload of the edge between two nodes, in either order.
    #[must_use]
    pub fn connection(&self, a: NodeIndex, b: NodeIndex) -> Option<&Connection> {
        self.edges.get(&pair(a, b))
    }

    /// Check if two nodes are adjacent.
    #[must_use]
    pub fn contains_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.edges.contains_key(&pair(a, b))
    }

    /// Neighbours of a node in index order.
    pub fn neighbors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.adjacency
            .get(index.0)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of edges incident to a node (0 for unknown nodes).
    #[must_use]
    pub fn degree(&self, index: NodeIndex) -> usize {
        self.adjacency.get(index.0).map_or(0, BTreeSet::len)
    }

    /// Degrees of all nodes, aligned with insertion order.
    #[must_use]
    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(BTreeSet::len).collect()
    }

    /// Largest degree in the graph (0 for an empty graph).
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).max().unwrap_or(0)
    }

    /// Build the subgraph induced by the nodes accepted by `keep`.
    ///
    /// Kept nodes retain their relative order and are re-indexed densely.
    /// Every edge whose endpoints are both kept is copied. `self` is not
    /// modified.
    #[must_use]
    pub fn induced_subgraph<F>(&self, keep: F) -> Graph
    where
        F: Fn(&Node) -> bool,
    {
        let mut sub = Graph::new();
        let mut remap: BTreeMap<NodeIndex, NodeIndex> = BTreeMap::new();

        for node in self.nodes.iter().filter(|n| keep(n)) {
            let new_index = sub.upsert_node(node.key.clone(), node.kind, node.record.clone());
            remap.insert(node.index, new_index);
        }

        for (a, b, connection) in self.edges() {
            if let (Some(&na), Some(&nb)) = (remap.get(&a), remap.get(&b)) {
                sub.insert_edge(na, nb, connection.clone());
            }
        }

        sub.collapsed_duplicates = self.collapsed_duplicates;
        sub
    }
}

// =============================================================================
// TESTS
// =============================================================================
