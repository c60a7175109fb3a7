//! # CardGraph - Biomedical Knowledge Graphs
//!
//! The command-line binary around the `cardgraph-core` engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    apps/cardgraph (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐     │
//! │  │   CLI       │    │  Config     │    │  Table Loader    │     │
//! │  │  (clap)     │    │  (toml)     │    │  + Cache         │     │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘     │
//! │         │                  │                    │               │
//! │         └──────────────────┼────────────────────┘               │
//! │                            ▼                                    │
//! │                   ┌────────────────┐                            │
//! │                   │ cardgraph-core │                            │
//! │                   │  (THE ENGINE)  │                            │
//! │                   └────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Statistics of a dataset table
//! cardgraph --preset datasets stats datasets.tsv
//!
//! # Figure and exports
//! cardgraph --preset code render code.tsv -o code.svg
//! cardgraph --preset publications export pubs.csv --what edges -o edges.csv
//!
//! # Every view of a config file
//! cardgraph --config cardgraph.toml run --out-dir reports
//! ```

use cardgraph::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing: CARDGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CARDGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "cardgraph=debug"
    } else {
        "cardgraph=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Banner on stderr, stdout carries the command output
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the CardGraph startup banner.
fn print_banner() {
    eprintln!(
        r#"
   ___              _  ___                 _
  / __|__ _ _ _ __| |/ __|_ _ __ _ _ __| |_
 | (__/ _` | '_/ _` | (_ | '_/ _` | '_ \ ' \
  \___\__,_|_| \__,_|\___|_| \__,_| .__/_||_|
                                  |_|
  Biomedical Knowledge Graphs v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
