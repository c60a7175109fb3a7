//! # CardGraph CLI Module
//!
//! This module implements the CLI interface for CardGraph.
//!
//! ## Available Commands
//!
//! - `stats` - Show graph statistics of a table
//! - `components` - List connected clusters
//! - `central` - Rank nodes by betweenness centrality
//! - `export` - Write adjacency, edge details, summary or graph JSON
//! - `render` - Write the figure as SVG or JSON
//! - `prompt` - Print the language-model summary prompt
//! - `run` - Build every `[[views]]` entry of the config file

mod commands;

use crate::config::{ConfigFile, GraphOptions, Preset};
use cardgraph_core::{CardGraphError, ColorBy, FeatureColumn, PairStrategy};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// CardGraph - biomedical knowledge graphs from curated tables
///
/// Links datasets, publications or code repositories that share
/// diseases, data types, tools or other features.
#[derive(Parser, Debug)]
#[command(name = "cardgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a cardgraph.toml
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Graph options shared by every command
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Graph options. Each one overrides the config file and the preset.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Page preset (datasets, publications, code)
    #[arg(short, long, global = true)]
    pub preset: Option<String>,

    /// Identifier column
    #[arg(long, global = true)]
    pub id_column: Option<String>,

    /// Feature columns, text handling inferred from the name
    #[arg(long, global = true, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Feature columns parsed as free text (stopwords removed)
    #[arg(long, global = true, value_delimiter = ',')]
    pub text_features: Vec<String>,

    /// Separator between items in a cell
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// Shared feature columns required for an edge
    #[arg(long, global = true)]
    pub min_shared: Option<usize>,

    /// Drop nodes with fewer connections
    #[arg(long, global = true)]
    pub min_degree: Option<usize>,

    /// Input row cap (0 = unlimited)
    #[arg(long, global = true)]
    pub max_nodes: Option<usize>,

    /// Pair strategy (pairwise, inverted_index)
    #[arg(long, global = true)]
    pub strategy: Option<String>,
}

impl GraphArgs {
    /// The CLI layer of the option stack.
    pub fn to_options(&self) -> Result<GraphOptions, CardGraphError> {
        let preset = self.preset.as_deref().map(str::parse::<Preset>).transpose()?;
        let strategy = self
            .strategy
            .as_deref()
            .map(str::parse::<PairStrategy>)
            .transpose()?;

        let features: Vec<FeatureColumn> = self
            .features
            .iter()
            .map(FeatureColumn::new)
            .chain(self.text_features.iter().map(FeatureColumn::text))
            .collect();

        Ok(GraphOptions {
            preset,
            id_column: self.id_column.clone(),
            delimiter: self.delimiter.clone(),
            min_shared_features: self.min_shared,
            min_degree: self.min_degree,
            max_nodes: self.max_nodes,
            strategy,
            features: if features.is_empty() { None } else { Some(features) },
            ..GraphOptions::default()
        })
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show graph statistics
    Stats {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,
    },

    /// List connected clusters, largest first
    Components {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,
    },

    /// Rank nodes by betweenness centrality
    Central {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,

        /// Number of nodes to list
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Export the graph
    Export {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,

        /// What to export (adjacency, edges, summary, graph)
        #[arg(short, long, default_value = "edges")]
        what: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Field separator for tabular exports (csv, tsv)
        #[arg(short, long, default_value = "csv")]
        sep: String,
    },

    /// Render the graph figure
    Render {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Figure format (svg, json)
        #[arg(short = 't', long, default_value = "svg")]
        format: String,

        /// Node colouring (fair_compliance, completeness)
        #[arg(long)]
        color_by: Option<String>,

        /// Figure title
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the graph summary prompt for a language model
    Prompt {
        /// Table file (.tsv, .txt or .csv)
        table: PathBuf,
    },

    /// Build every view of the config file
    Run {
        /// Directory receiving the reports
        #[arg(short, long, default_value = "cardgraph-out")]
        out_dir: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CardGraphError> {
    let json_mode = cli.json_mode;
    let config = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let options = cli.graph.to_options()?;

    match cli.command {
        Some(Commands::Stats { table }) => cmd_stats(&table, &options, &config, json_mode),
        Some(Commands::Components { table }) => {
            cmd_components(&table, &options, &config, json_mode)
        }
        Some(Commands::Central { table, limit }) => {
            cmd_central(&table, &options, &config, json_mode, limit)
        }
        Some(Commands::Export {
            table,
            what,
            output,
            sep,
        }) => cmd_export(&table, &options, &config, &what, &output, &sep),
        Some(Commands::Render {
            table,
            output,
            format,
            color_by,
            title,
        }) => {
            let color_by = color_by.as_deref().map(str::parse::<ColorBy>).transpose()?;
            let options = GraphOptions {
                color_by,
                title,
                ..options
            };
            cmd_render(&table, &options, &config, &output, &format)
        }
        Some(Commands::Prompt { table }) => cmd_prompt(&table, &options, &config),
        Some(Commands::Run { out_dir }) => cmd_run(&options, &config, json_mode, &out_dir),
        None => {
            // No subcommand - show help
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
