//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the CardGraph engine:
//! - Graph identifiers (`NodeKey`, `NodeIndex`, `EdgeWeight`)
//! - Tabular input (`Record`, `Table`, `NodeKind`)
//! - Rendering selector (`ColorBy`)
//! - Error types (`CardGraphError`)
//!
//! ## Determinism Guarantees
//!
//! All collections in this module are ordered (`BTreeMap`, `Vec`), so every
//! iteration over a record or a table is reproducible across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Identity of a node: the value of the identifier column of its source row.
///
/// Keys are used as-is. Two rows with the same identifier map to the same node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(pub String);

impl NodeKey {
    /// Create a new node key.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Dense position of a node in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    /// Get the raw index.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

/// Weight of an undirected edge: the number of feature columns two
/// entities share at least one token in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EdgeWeight(pub u32);

impl EdgeWeight {
    /// Create a new edge weight with the given value.
    #[must_use]
    pub const fn new(weight: u32) -> Self {
        Self(weight)
    }

    /// Get the raw weight value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

// =============================================================================
// NODE KIND
// =============================================================================

/// The kind of entity a table holds.
///
/// Decided once when a table is loaded, then carried by every node built
/// from it. Rendering and summaries switch on it instead of probing
/// attribute names per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A research dataset (the default).
    #[default]
    Dataset,
    /// A publication with title and authors.
    Publication,
    /// A code repository with a link and languages.
    Repository,
}

impl NodeKind {
    /// Infer the kind from a table header.
    ///
    /// `Repository Link` + `Languages` marks a repository table,
    /// `Title` + `Authors` a publication table, anything else is a dataset table.
    #[must_use]
    pub fn infer<S: AsRef<str>>(columns: &[S]) -> Self {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);

        if has("Repository Link") && has("Languages") {
            NodeKind::Repository
        } else if has("Title") && has("Authors") {
            NodeKind::Publication
        } else {
            NodeKind::Dataset
        }
    }

    /// Singular display noun.
    #[must_use]
    pub fn noun(&self) -> &'static str {
        match self {
            NodeKind::Dataset => "Dataset",
            NodeKind::Publication => "Publication",
            NodeKind::Repository => "Repository",
        }
    }

    /// Plural display noun.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            NodeKind::Dataset => "Datasets",
            NodeKind::Publication => "Publications",
            NodeKind::Repository => "Repositories",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

// =============================================================================
// RECORD & TABLE
// =============================================================================

/// One row of a table: column name -> raw string value.
///
/// A column that is not present reads as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a column value, replacing any previous one.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Get a column value if the column is present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Get a column value, or "" if the column is missing.
    #[must_use]
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Get a column value only if it holds non-whitespace text.
    #[must_use]
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.trim().is_empty())
    }

    /// Iterate over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of columns in this record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An ordered table of records sharing one header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    kind: NodeKind,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Create an empty table with the given header.
    #[must_use]
    pub fn new(kind: NodeKind, columns: Vec<String>) -> Self {
        Self {
            kind,
            columns,
            records: Vec::new(),
        }
    }

    /// Build a table from a header and positional rows.
    ///
    /// The kind is inferred from the header. Short rows are padded with
    /// empty values; a row longer than the header is malformed.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, CardGraphError> {
        let kind = NodeKind::infer(&columns);
        let mut table = Self::new(kind, columns);

        for (line, row) in rows.into_iter().enumerate() {
            if row.len() > table.columns.len() {
                return Err(CardGraphError::MalformedTable(format!(
                    "row {} has {} fields, header has {}",
                    line.saturating_add(1),
                    row.len(),
                    table.columns.len()
                )));
            }
            let mut record = Record::new();
            for (i, column) in table.columns.iter().enumerate() {
                record.insert(column.clone(), row.get(i).cloned().unwrap_or_default());
            }
            table.records.push(record);
        }

        Ok(table)
    }

    /// Append a record.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// The kind of entity this table holds.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Override the inferred kind.
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// The header, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Check whether the header contains a column (case-sensitive).
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// All records in table order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Append a column computed from each record.
    ///
    /// Does nothing if the column already exists.
    pub fn derive_column<F>(&mut self, name: &str, derive: F)
    where
        F: Fn(&Record) -> String,
    {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for record in &mut self.records {
            let value = derive(record);
            record.insert(name, value);
        }
    }

    /// Keep only the first `max` records.
    pub fn truncate(&mut self, max: usize) {
        self.records.truncate(max);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// COLOR SELECTOR
// =============================================================================

/// Which per-node quality metric drives node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorBy {
    /// Keyword grade of `FAIR Compliance Notes`.
    #[default]
    FairCompliance,
    /// Numeric `Data Completeness` percentage.
    Completeness,
}

impl FromStr for ColorBy {
    type Err = CardGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fair_compliance" | "fair" => Ok(ColorBy::FairCompliance),
            "completeness" => Ok(ColorBy::Completeness),
            other => Err(CardGraphError::InvalidConfig(format!(
                "unknown color mode '{}' (expected fair_compliance or completeness)",
                other
            ))),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the CardGraph system.
///
/// Graph construction, statistics and filtering never produce these:
/// degenerate input yields empty results. Errors are reserved for
/// input-contract violations and failing output sinks.
#[derive(Debug, Error)]
pub enum CardGraphError {
    /// A configuration value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input is not a well-formed table.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CardGraphError {
    fn from(e: std::io::Error) -> Self {
        CardGraphError::Io(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_inference_prefers_repository() {
        let cols = ["Repo ID", "Repository Link", "Languages", "Title", "Authors"];
        assert_eq!(NodeKind::infer(&cols), NodeKind::Repository);
    }

    #[test]
    fn kind_inference_publication_and_default() {
        assert_eq!(
            NodeKind::infer(&["Publication ID", "Title", "Authors"]),
            NodeKind::Publication
        );
        assert_eq!(NodeKind::infer(&["Study Name", "Title"]), NodeKind::Dataset);
        assert_eq!(NodeKind::infer::<&str>(&[]), NodeKind::Dataset);
    }

    #[test]
    fn record_missing_column_reads_empty() {
        let record = Record::from_pairs([("A", "x")]);
        assert_eq!(record.value("A"), "x");
        assert_eq!(record.value("B"), "");
        assert!(record.get("B").is_none());
    }

    #[test]
    fn record_non_empty_skips_whitespace() {
        let record = Record::from_pairs([("A", "   "), ("B", "y")]);
        assert!(record.non_empty("A").is_none());
        assert_eq!(record.non_empty("B"), Some("y"));
    }

    #[test]
    fn table_from_rows_pads_short_rows() {
        let table = Table::from_rows(
            vec!["Study Name".into(), "Diseases Included".into()],
            vec![vec!["ADNI".into()]],
        )
        .expect("table");
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].get("Diseases Included"), Some(""));
    }

    #[test]
    fn table_from_rows_rejects_long_rows() {
        let result = Table::from_rows(
            vec!["Study Name".into()],
            vec![vec!["ADNI".into(), "extra".into()]],
        );
        assert!(matches!(result, Err(CardGraphError::MalformedTable(_))));
    }

    #[test]
    fn derive_column_appends_once() {
        let mut table = Table::from_rows(
            vec!["Study Name".into(), "Title".into()],
            vec![vec!["ADNI".into(), "Amyloid".into()]],
        )
        .expect("table");

        table.derive_column("ID", |r| format!("{}-{}", r.value("Study Name"), r.value("Title")));
        table.derive_column("ID", |_| "ignored".to_string());

        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.records()[0].value("ID"), "ADNI-Amyloid");
    }

    #[test]
    fn color_by_parses() {
        assert_eq!("completeness".parse::<ColorBy>().ok(), Some(ColorBy::Completeness));
        assert_eq!(
            "fair_compliance".parse::<ColorBy>().ok(),
            Some(ColorBy::FairCompliance)
        );
        assert!("rainbow".parse::<ColorBy>().is_err());
    }
}
