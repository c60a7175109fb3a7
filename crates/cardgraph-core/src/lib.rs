//! # cardgraph-core
//!
//! The knowledge-graph engine for CardGraph.
//!
//! Given a table of entities and a list of feature columns, this crate
//! builds an undirected similarity graph (nodes = entities, edges =
//! "share enough selected attributes") and derives everything shown
//! about it: statistics, a spring layout, a drawable figure and exports.
//!
//! ## Pipeline
//!
//! ```text
//! Table -> build_graph -> [filter_by_degree] -> GraphStatistics
//!                                            -> render -> Figure (JSON / SVG)
//!                                            -> AdjacencyMatrix / EdgeDetails / text_summary
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no logging
//! - Deterministic: ordered collections only, layout randomness is seeded
//! - Never fails on data: missing columns and values degrade to empty results
//! - Stateless: every call is a function of its inputs, nothing is mutated in place

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod export;
pub mod filter;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod primitives;
pub mod render;
pub mod stats;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CardGraphError, ColorBy, EdgeWeight, NodeIndex, NodeKey, NodeKind, Record, Table};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use builder::{BuildConfig, FeatureColumn, PairStrategy, build_graph};
pub use filter::filter_by_degree;
pub use graph::{Connection, Graph, Node, SharedFeature};
pub use parser::{is_stopword, is_text_column, join_tokens, parse_field};
pub use stats::{
    GraphStatistics, betweenness_centrality, central_nodes, connected_components,
    connection_drivers,
};

// =============================================================================
// RE-EXPORTS: Presentation & Export
// =============================================================================

pub use export::{
    AdjacencyMatrix, DelimitedExport, EdgeDetail, EdgeDetails, GraphDocument, edge_details,
    text_summary,
};
pub use layout::{Layout, LayoutSettings, Point, spring_layout};
pub use render::{Figure, FigureEdge, FigureNode, RenderSettings, render};
