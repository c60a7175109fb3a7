//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{ConfigFile, GraphOptions, ResolvedOptions, resolve};
use crate::pipeline::{GraphView, write_artifacts, write_table};
use crate::table::{TableCache, load_table};
use cardgraph_core::{
    AdjacencyMatrix, CardGraphError, GraphDocument, central_nodes, connected_components,
    edge_details,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

// =============================================================================
// PATH VALIDATION
// =============================================================================

/// Validate an input table path.
///
/// Canonicalizes the path and ensures it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CardGraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        CardGraphError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CardGraphError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CardGraphError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CardGraphError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CardGraphError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CardGraphError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Load `table_path` and build its view with CLI options over the file.
fn prepare(
    table_path: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
) -> Result<(GraphView, ResolvedOptions), CardGraphError> {
    let options = resolve(cli.clone(), config.layer(None), config.layout)?;
    let table = load_table(&validate_file_path(table_path)?)?;
    Ok((GraphView::build(&table, &options), options))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CardGraphError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CardGraphError::Serialization(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn separator(sep: &str) -> Result<char, CardGraphError> {
    match sep {
        "csv" => Ok(','),
        "tsv" => Ok('\t'),
        other => Err(CardGraphError::InvalidConfig(format!(
            "Unknown separator '{}'. Use: csv, tsv",
            other
        ))),
    }
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show graph statistics.
pub fn cmd_stats(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
    json_mode: bool,
) -> Result<(), CardGraphError> {
    let (view, _) = prepare(table, cli, config)?;
    let stats = &view.stats;

    if json_mode {
        return print_json(stats);
    }

    println!("CardGraph Statistics");
    println!("====================");
    println!("Table:  {}", table.display());
    println!("Kind:   {}", view.kind.plural());
    println!();
    println!("Nodes:          {}", stats.num_nodes);
    println!("Edges:          {}", stats.num_edges);
    println!("Density:        {:.3}", stats.density);
    println!("Avg Degree:     {:.2}", stats.avg_degree);
    println!("Max Degree:     {}", stats.max_degree);
    println!("Components:     {}", stats.num_components);
    if !stats.top_nodes.is_empty() {
        println!();
        println!("Most Connected {}:", view.kind.plural());
        for (key, degree) in &stats.top_nodes {
            println!("  {}: {} connections", key, degree);
        }
    }

    Ok(())
}

// =============================================================================
// COMPONENTS COMMAND
// =============================================================================

/// List connected clusters, largest first.
pub fn cmd_components(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
    json_mode: bool,
) -> Result<(), CardGraphError> {
    let (view, _) = prepare(table, cli, config)?;
    let components = connected_components(&view.graph);

    if json_mode {
        let output = serde_json::json!({
            "num_components": components.len(),
            "components": components,
        });
        return print_json(&output);
    }

    let noun = view.kind.plural().to_lowercase();
    println!("{} connected components", components.len());
    for (i, members) in components.iter().enumerate() {
        let names: Vec<&str> = members.iter().map(|k| k.as_str()).collect();
        println!("  [{}] {} {}: {}", i + 1, members.len(), noun, names.join(", "));
    }

    Ok(())
}

// =============================================================================
// CENTRAL COMMAND
// =============================================================================

/// Rank nodes by betweenness centrality.
pub fn cmd_central(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
    json_mode: bool,
    limit: usize,
) -> Result<(), CardGraphError> {
    let (view, _) = prepare(table, cli, config)?;
    let ranked = central_nodes(&view.graph, limit);

    if json_mode {
        let output: Vec<serde_json::Value> = ranked
            .iter()
            .map(|(key, score)| serde_json::json!({ "node": key, "betweenness": score }))
            .collect();
        return print_json(&output);
    }

    println!("Most Central {}:", view.kind.plural());
    for (key, score) in &ranked {
        println!("  {}: {:.4}", key, score);
    }

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the graph as adjacency matrix, edge details, text summary or JSON.
pub fn cmd_export(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
    what: &str,
    output: &Path,
    sep: &str,
) -> Result<(), CardGraphError> {
    let output = validate_output_path(output)?;
    let (view, _) = prepare(table, cli, config)?;

    match what {
        "adjacency" => {
            write_table(&AdjacencyMatrix::from_graph(&view.graph), &output, separator(sep)?)?;
        }
        "edges" => {
            write_table(&edge_details(&view.graph), &output, separator(sep)?)?;
        }
        "summary" => {
            std::fs::write(&output, view.summary())?;
        }
        "graph" => {
            std::fs::write(&output, GraphDocument::from_graph(&view.graph).to_json()?)?;
        }
        other => {
            return Err(CardGraphError::InvalidConfig(format!(
                "Unknown export '{}'. Use: adjacency, edges, summary, graph",
                other
            )));
        }
    }

    info!(what, path = %output.display(), "Exported");
    println!("Exported {} to {}", what, output.display());
    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Render the figure to SVG or JSON.
pub fn cmd_render(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
    output: &Path,
    format: &str,
) -> Result<(), CardGraphError> {
    let output = validate_output_path(output)?;
    let (view, options) = prepare(table, cli, config)?;
    let figure = view.figure(&options);

    let content = match format {
        "svg" => {
            let (width, height) = config.render.figure_size();
            figure.to_svg(width, height)
        }
        "json" => figure.to_json()?,
        other => {
            return Err(CardGraphError::InvalidConfig(format!(
                "Unknown format '{}'. Use: svg, json",
                other
            )));
        }
    };
    std::fs::write(&output, content)?;

    info!(format, nodes = figure.nodes.len(), path = %output.display(), "Rendered");
    println!("Rendered '{}' to {}", figure.title, output.display());
    Ok(())
}

// =============================================================================
// PROMPT COMMAND
// =============================================================================

/// Print the summary prompt for an external language model.
pub fn cmd_prompt(
    table: &Path,
    cli: &GraphOptions,
    config: &ConfigFile,
) -> Result<(), CardGraphError> {
    let (view, _) = prepare(table, cli, config)?;
    println!("{}", view.prompt());
    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Build every `[[views]]` entry and write its reports under `out_dir`.
///
/// Views naming the same table share one load.
pub fn cmd_run(
    cli: &GraphOptions,
    config: &ConfigFile,
    json_mode: bool,
    out_dir: &Path,
) -> Result<(), CardGraphError> {
    if config.views.is_empty() {
        return Err(CardGraphError::InvalidConfig(
            "No [[views]] to run. Pass --config with at least one view".to_string(),
        ));
    }

    let mut cache = TableCache::new();
    let mut report = Vec::with_capacity(config.views.len());

    for view_config in &config.views {
        let options = resolve(cli.clone(), config.layer(Some(view_config)), config.layout)?;
        let table = cache.get_or_load(&view_config.table)?;
        let view = GraphView::build(table, &options);
        let files = write_artifacts(
            &view,
            &options,
            out_dir,
            &view_config.name,
            config.render.figure_size(),
        )?;

        if !json_mode {
            println!(
                "{}: {} nodes, {} edges -> {} files",
                view_config.name,
                view.stats.num_nodes,
                view.stats.num_edges,
                files.len()
            );
        }
        report.push(serde_json::json!({
            "name": view_config.name,
            "nodes": view.stats.num_nodes,
            "edges": view.stats.num_edges,
            "files": files,
        }));
    }

    info!(views = report.len(), tables = cache.len(), "Run complete");

    if json_mode {
        return print_json(&report);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_names() {
        assert_eq!(separator("csv").ok(), Some(','));
        assert_eq!(separator("tsv").ok(), Some('\t'));
        assert!(separator("pipe").is_err());
    }

    #[test]
    fn output_path_without_parent_uses_cwd() {
        let path = validate_output_path(Path::new("out.csv")).expect("cwd exists");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("out.csv"));
    }

    #[test]
    fn output_path_rejects_missing_directory() {
        assert!(validate_output_path(Path::new("/no/such/dir/out.csv")).is_err());
    }

    #[test]
    fn input_path_must_exist() {
        assert!(validate_file_path(Path::new("/no/such/table.tsv")).is_err());
    }
}
