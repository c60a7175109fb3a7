//! # cardgraph
//!
//! The caller layer around `cardgraph-core`: everything that touches the
//! filesystem, the environment or the terminal.
//!
//! - [`table`]: TSV/CSV loading and the mtime-keyed table cache
//! - [`config`]: `cardgraph.toml`, page presets, option precedence
//! - [`pipeline`]: table → graph → statistics, and report files
//! - [`prompt`]: summary prompt text for an external language model
//! - [`cli`]: the `cardgraph` command line

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod prompt;
pub mod table;
