//! # Table Loading
//!
//! Reads curated tables from disk and keeps them in an explicit cache.
//!
//! `.tsv` and `.txt` files are tab-separated, `.csv` files comma-separated.
//! Both accept RFC 4180 quoting. The node kind of a table is decided here,
//! once, from its header.

use cardgraph_core::{CardGraphError, NodeKind, Table};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Longest title prefix used in a derived publication identifier.
const PUBLICATION_TITLE_PREFIX: usize = 50;

// =============================================================================
// PARSING
// =============================================================================

/// Pick the field separator from the file extension.
pub fn separator_for(path: &Path) -> Result<char, CardGraphError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ => Err(CardGraphError::InvalidConfig(format!(
            "Unsupported table format '{}': expected .tsv, .txt or .csv",
            path.display()
        ))),
    }
}

/// Split delimited text into a header and body rows.
///
/// Quoted fields may contain the separator, doubled quotes and line
/// breaks. Empty lines are skipped.
pub fn parse_delimited(
    text: &str,
    separator: char,
) -> Result<(Vec<String>, Vec<Vec<String>>), CardGraphError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            c if c == separator => row.push(std::mem::take(&mut field)),
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(CardGraphError::MalformedTable(
            "unterminated quoted field".to_string(),
        ));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| CardGraphError::MalformedTable("table has no header".to_string()))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    Ok((header, rows.collect()))
}

/// Keep `row` unless it came from an empty line. Whitespace is content.
fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let empty_line = row.len() == 1 && row[0].is_empty();
    if !empty_line {
        rows.push(row);
    }
}

/// Load a table file.
pub fn load_table(path: &Path) -> Result<Table, CardGraphError> {
    let separator = separator_for(path)?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| CardGraphError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;

    let (header, rows) = parse_delimited(&text, separator)?;
    let mut table = Table::from_rows(header, rows)?;
    derive_identifiers(&mut table);

    info!(
        path = %path.display(),
        rows = table.len(),
        kind = %table.kind(),
        "Loaded table"
    );
    Ok(table)
}

// =============================================================================
// PREPARATION
// =============================================================================

/// Add the identifier columns the page presets key on, when missing.
///
/// - publications: `Publication ID` = `Study Name - <first 50 chars of Title>`
/// - repositories: `Repo ID` = last `/` segment of `Repository Link`
pub fn derive_identifiers(table: &mut Table) {
    match table.kind() {
        NodeKind::Publication => {
            if table.has_column("Study Name") {
                table.derive_column("Publication ID", |r| {
                    let title: String = r.value("Title").chars().take(PUBLICATION_TITLE_PREFIX).collect();
                    format!("{} - {}", r.value("Study Name"), title)
                });
            }
        }
        NodeKind::Repository => {
            table.derive_column("Repo ID", |r| {
                let link = r.value("Repository Link");
                link.rsplit('/').next().unwrap_or(link).to_string()
            });
        }
        NodeKind::Dataset => {}
    }
}

/// Keep at most `max_nodes` rows (0 keeps everything).
///
/// Returns the number of rows dropped.
pub fn truncate(table: &mut Table, max_nodes: usize) -> usize {
    if max_nodes == 0 || table.len() <= max_nodes {
        return 0;
    }
    let dropped = table.len() - max_nodes;
    table.truncate(max_nodes);
    dropped
}

// =============================================================================
// CACHE
// =============================================================================

struct CachedTable {
    modified: SystemTime,
    table: Table,
}

/// Loaded tables keyed by canonical path.
///
/// An entry is reused while the file's modification time is unchanged.
#[derive(Default)]
pub struct TableCache {
    entries: BTreeMap<PathBuf, CachedTable>,
}

impl TableCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it if absent or stale.
    pub fn get_or_load(&mut self, path: &Path) -> Result<&Table, CardGraphError> {
        let canonical = path
            .canonicalize()
            .map_err(|e| CardGraphError::Io(format!("Invalid table path '{}': {}", path.display(), e)))?;
        let modified = std::fs::metadata(&canonical)?.modified()?;

        let fresh = self
            .entries
            .get(&canonical)
            .is_some_and(|entry| entry.modified == modified);

        if fresh {
            debug!(path = %canonical.display(), "Table cache hit");
        } else {
            let table = load_table(&canonical)?;
            self.entries
                .insert(canonical.clone(), CachedTable { modified, table });
        }

        self.entries
            .get(&canonical)
            .map(|entry| &entry.table)
            .ok_or_else(|| CardGraphError::Io(format!("Table '{}' vanished from cache", canonical.display())))
    }

    /// Drop the entry for `path`. Returns `true` if one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
