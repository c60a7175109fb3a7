//! # Graph Builder
//!
//! Builds the similarity graph of a table.
//!
//! Two entities are linked when their parsed token sets intersect in at
//! least `min_shared_features` feature columns. The edge weight is the number
//! of such columns, and the edge records which tokens were shared per column.
//!
//! Construction never fails:
//! - feature columns missing from the table are skipped
//! - missing values parse to the empty set
//! - rows with a repeated identifier collapse onto one node (last write wins)

use crate::graph::{Connection, Graph, SharedFeature};
use crate::parser::{is_text_column, parse_field};
use crate::primitives::{DEFAULT_DELIMITER, DEFAULT_ID_COLUMN, DEFAULT_MIN_SHARED_FEATURES};
use crate::{CardGraphError, NodeIndex, NodeKey, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

// =============================================================================
// FEATURE COLUMNS
// =============================================================================

/// A column used to connect entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFeatureColumn")]
pub struct FeatureColumn {
    /// Column name, matched case-sensitively against the table header.
    pub name: String,
    /// Whether stopwording applies to this column.
    pub treat_as_text: bool,
}

impl FeatureColumn {
    /// Create a feature column, defaulting `treat_as_text` from the column name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let treat_as_text = is_text_column(&name);
        Self {
            name,
            treat_as_text,
        }
    }

    /// A free-text column (stopwording on).
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            treat_as_text: true,
        }
    }

    /// A categorical column (stopwording off).
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            treat_as_text: false,
        }
    }
}

/// Accepts either `"Column"` or `{ name = "Column", treat_as_text = true }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeatureColumn {
    Name(String),
    Full {
        name: String,
        treat_as_text: Option<bool>,
    },
}

impl From<RawFeatureColumn> for FeatureColumn {
    fn from(raw: RawFeatureColumn) -> Self {
        match raw {
            RawFeatureColumn::Name(name) => FeatureColumn::new(name),
            RawFeatureColumn::Full {
                name,
                treat_as_text: Some(flag),
            } => FeatureColumn {
                name,
                treat_as_text: flag,
            },
            RawFeatureColumn::Full {
                name,
                treat_as_text: None,
            } => FeatureColumn::new(name),
        }
    }
}

// =============================================================================
// BUILD CONFIGURATION
// =============================================================================

/// How candidate pairs are enumerated.
///
/// Both strategies produce identical graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PairStrategy {
    /// Compare every unordered pair: O(n² · k).
    #[default]
    Pairwise,
    /// Only compare pairs that share a token in some column.
    InvertedIndex,
}

impl FromStr for PairStrategy {
    type Err = CardGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairwise" => Ok(PairStrategy::Pairwise),
            "inverted_index" | "index" => Ok(PairStrategy::InvertedIndex),
            other => Err(CardGraphError::InvalidConfig(format!(
                "unknown pair strategy '{}' (expected pairwise or inverted_index)",
                other
            ))),
        }
    }
}

/// Parameters of one graph build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Column whose value identifies a node.
    pub id_column: String,
    /// Columns compared between entities, in reporting order.
    pub feature_columns: Vec<FeatureColumn>,
    /// Separator between items in a cell.
    pub delimiter: String,
    /// Contributing columns required for an edge (values below 1 act as 1).
    pub min_shared_features: usize,
    /// Candidate enumeration strategy.
    pub strategy: PairStrategy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            feature_columns: Vec::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            min_shared_features: DEFAULT_MIN_SHARED_FEATURES,
            strategy: PairStrategy::Pairwise,
        }
    }
}

impl BuildConfig {
    /// Create a config for the given identifier column.
    #[must_use]
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            ..Self::default()
        }
    }

    /// Add feature columns by name (text flag inferred from the name).
    #[must_use]
    pub fn with_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_columns
            .extend(names.into_iter().map(FeatureColumn::new));
        self
    }

    /// Add one explicitly configured feature column.
    #[must_use]
    pub fn with_feature(mut self, column: FeatureColumn) -> Self {
        self.feature_columns.push(column);
        self
    }

    /// Set the cell delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set the edge threshold.
    #[must_use]
    pub fn with_min_shared_features(mut self, min: usize) -> Self {
        self.min_shared_features = min;
        self
    }

    /// Set the pair enumeration strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: PairStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check the config for values a caller should reject.
    ///
    /// The builder itself tolerates all of these.
    pub fn validate(&self) -> Result<(), CardGraphError> {
        if self.id_column.trim().is_empty() {
            return Err(CardGraphError::InvalidConfig(
                "identifier column must not be empty".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(CardGraphError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }
        if self.min_shared_features == 0 {
            return Err(CardGraphError::InvalidConfig(
                "min_shared_features must be at least 1".to_string(),
            ));
        }
        if self.feature_columns.is_empty() {
            return Err(CardGraphError::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Build the similarity graph of `table`.
#[must_use]
pub fn build_graph(table: &Table, config: &BuildConfig) -> Graph {
    let mut graph = Graph::new();

    for (row, record) in table.records().iter().enumerate() {
        let key = record
            .get(&config.id_column)
            .map(NodeKey::new)
            .unwrap_or_else(|| NodeKey::new(format!("Item_{}", row)));
        graph.upsert_node(key, table.kind(), record.clone());
    }

    let columns: Vec<&FeatureColumn> = config
        .feature_columns
        .iter()
        .filter(|c| table.has_column(&c.name))
        .collect();

    // tokens[node][column], parsed once from each node's final record
    let tokens: Vec<Vec<BTreeSet<String>>> = graph
        .nodes()
        .map(|node| {
            columns
                .iter()
                .map(|c| parse_field(node.record.value(&c.name), &config.delimiter, c.treat_as_text))
                .collect()
        })
        .collect();

    let threshold = config.min_shared_features.max(1);
    let candidates = match config.strategy {
        PairStrategy::Pairwise => all_pairs(tokens.len()),
        PairStrategy::InvertedIndex => indexed_pairs(&tokens, columns.len(), threshold),
    };

    for (i, j) in candidates {
        let shared = shared_features(&columns, &tokens[i], &tokens[j]);
        if shared.len() >= threshold {
            graph.insert_edge(NodeIndex(i), NodeIndex(j), Connection::new(shared));
        }
    }

    graph
}

/// Contributing columns between two token rows, in feature-column order.
fn shared_features(
    columns: &[&FeatureColumn],
    left: &[BTreeSet<String>],
    right: &[BTreeSet<String>],
) -> Vec<SharedFeature> {
    columns
        .iter()
        .zip(left.iter().zip(right.iter()))
        .filter_map(|(column, (a, b))| {
            let shared: Vec<String> = a.intersection(b).cloned().collect();
            (!shared.is_empty()).then(|| SharedFeature {
                column: column.name.clone(),
                shared_values: shared,
            })
        })
        .collect()
}

/// Every unordered pair `(i, j)` with `i < j`.
fn all_pairs(n: usize) -> Box<dyn Iterator<Item = (usize, usize)>> {
    Box::new((0..n).flat_map(move |i| (i.saturating_add(1)..n).map(move |j| (i, j))))
}

/// Pairs that share a token in at least `threshold` columns.
///
/// Postings map each token to the nodes holding it, per column. A pair is
/// counted once per column regardless of how many tokens it shares there.
fn indexed_pairs(
    tokens: &[Vec<BTreeSet<String>>],
    column_count: usize,
    threshold: usize,
) -> Box<dyn Iterator<Item = (usize, usize)>> {
    let mut column_hits: BTreeMap<(usize, usize), usize> = BTreeMap::new();

    for column in 0..column_count {
        let mut postings: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (node, row) in tokens.iter().enumerate() {
            if let Some(set) = row.get(column) {
                for token in set {
                    postings.entry(token.as_str()).or_default().push(node);
                }
            }
        }

        let mut pairs_in_column: BTreeSet<(usize, usize)> = BTreeSet::new();
        for holders in postings.values() {
            for (k, &i) in holders.iter().enumerate() {
                for &j in &holders[k.saturating_add(1)..] {
                    pairs_in_column.insert((i, j));
                }
            }
        }

        for pair in pairs_in_column {
            *column_hits.entry(pair).or_insert(0) += 1;
        }
    }

    Box::new(
        column_hits
            .into_iter()
            .filter(move |&(_, hits)| hits >= threshold)
            .map(|(pair, _)| pair),
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, Record};

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
        .expect("table")
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!("pairwise".parse::<PairStrategy>().ok(), Some(PairStrategy::Pairwise));
        assert_eq!(
            "inverted_index".parse::<PairStrategy>().ok(),
            Some(PairStrategy::InvertedIndex)
        );
        assert!(matches!(
            "greedy".parse::<PairStrategy>(),
            Err(CardGraphError::InvalidConfig(_))
        ));
    }

    fn scenario() -> Table {
        table(
            &["Study Name", "Diseases Included", "Data Modalities", "Country"],
            &[
                &["ADNI", "AD; MCI", "MRI; PET", "USA"],
                &["AIBL", "AD", "PET; Blood", "Australia"],
                &["PPMI", "PD", "DaTscan", "Europe"],
            ],
        )
    }

    fn config(min: usize) -> BuildConfig {
        BuildConfig::new("Study Name")
            .with_features(["Diseases Included", "Data Modalities", "Country"])
            .with_min_shared_features(min)
    }

    #[test]
    fn two_shared_columns_make_one_edge() {
        let graph = build_graph(&scenario(), &config(2));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);

        let adni = graph.index_of(&NodeKey::from("ADNI")).expect("adni");
        let aibl = graph.index_of(&NodeKey::from("AIBL")).expect("aibl");
        let connection = graph.connection(adni, aibl).expect("edge");
        assert_eq!(connection.weight.value(), 2);
        assert_eq!(connection.shared_features.len(), 2);
        assert_eq!(connection.shared_features[0].column, "Diseases Included");
        assert_eq!(connection.shared_features[0].shared_values, vec!["AD"]);
        assert_eq!(connection.shared_features[1].column, "Data Modalities");
        assert_eq!(connection.shared_features[1].shared_values, vec!["PET"]);
    }

    #[test]
    fn higher_threshold_removes_edge() {
        let graph = build_graph(&scenario(), &config(3));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn threshold_zero_acts_as_one() {
        let graph = build_graph(&scenario(), &config(0));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|(_, _, c)| c.weight.value() >= 1));
    }

    #[test]
    fn missing_feature_columns_are_skipped() {
        let cfg = BuildConfig::new("Study Name")
            .with_features(["Diseases Included", "Nope", "Data Modalities"])
            .with_min_shared_features(2);
        let graph = build_graph(&scenario(), &cfg);
        assert_eq!(graph.edge_count(), 1);
        let (_, _, c) = graph.edges().next().expect("edge");
        assert!(c.shared_features.iter().all(|f| f.column != "Nope"));
    }

    #[test]
    fn node_attributes_carry_full_record() {
        let graph = build_graph(&scenario(), &config(2));
        let node = graph.node_by_key(&NodeKey::from("PPMI")).expect("node");
        assert_eq!(node.record.value("Country"), "Europe");
        assert_eq!(node.kind, NodeKind::Dataset);
    }

    #[test]
    fn duplicate_identifiers_collapse_last_write_wins() {
        let t = table(
            &["Study Name", "Diseases Included", "Data Modalities"],
            &[
                &["ADNI", "AD", "MRI"],
                &["OASIS", "PD", "CT"],
                &["ADNI", "PD", "CT"],
            ],
        );
        let cfg = BuildConfig::new("Study Name")
            .with_features(["Diseases Included", "Data Modalities"])
            .with_min_shared_features(2);
        let graph = build_graph(&t, &cfg);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.collapsed_duplicates(), 1);
        // The surviving ADNI row matches OASIS in both columns
        assert_eq!(graph.edge_count(), 1);
        let first = graph.nodes().next().expect("first");
        assert_eq!(first.key.as_str(), "ADNI");
    }

    #[test]
    fn missing_id_column_falls_back_to_row_label() {
        let t = table(&["Name"], &[&["x"], &["y"]]);
        let graph = build_graph(&t, &BuildConfig::new("Study Name").with_features(["Name"]));
        let keys: Vec<_> = graph.nodes().map(|n| n.key.as_str().to_string()).collect();
        assert_eq!(keys, vec!["Item_0", "Item_1"]);
    }

    #[test]
    fn text_columns_ignore_stopwords() {
        let t = table(
            &["Repo ID", "Code Summary", "Diseases Included"],
            &[
                &["r1", "data; analysis; tool; Alzheimer's", "AD"],
                &["r2", "data; analysis; tool; Parkinson", "AD"],
            ],
        );
        let cfg = BuildConfig::new("Repo ID")
            .with_features(["Code Summary", "Diseases Included"])
            .with_min_shared_features(2);
        assert_eq!(build_graph(&t, &cfg).edge_count(), 0);

        let forced = BuildConfig::new("Repo ID")
            .with_feature(FeatureColumn::plain("Code Summary"))
            .with_features(["Diseases Included"])
            .with_min_shared_features(2);
        assert_eq!(build_graph(&t, &forced).edge_count(), 1);
    }

    #[test]
    fn comma_delimited_repository_tables() {
        let t = table(
            &["Repo ID", "Repository Link", "Languages", "Tooling"],
            &[
                &["r1", "https://x/r1", "Python, R", "pandas, numpy"],
                &["r2", "https://x/r2", "Python", "numpy"],
            ],
        );
        let cfg = BuildConfig::new("Repo ID")
            .with_features(["Languages", "Tooling"])
            .with_delimiter(",");
        let graph = build_graph(&t, &cfg);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.nodes().all(|n| n.kind == NodeKind::Repository));
    }

    #[test]
    fn inverted_index_matches_pairwise() {
        let t = scenario();
        for min in 1..=3 {
            let pairwise = build_graph(&t, &config(min));
            let indexed = build_graph(&t, &config(min).with_strategy(PairStrategy::InvertedIndex));
            let a: Vec<_> = pairwise.edges().map(|(x, y, c)| (x, y, c.clone())).collect();
            let b: Vec<_> = indexed.edges().map(|(x, y, c)| (x, y, c.clone())).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_table_builds_empty_graph() {
        let t = Table::new(NodeKind::Dataset, vec!["Study Name".into()]);
        let graph = build_graph(&t, &config(2));
        assert!(graph.is_empty());
    }

    #[test]
    fn records_pushed_without_header_column_are_skipped_for_features() {
        let mut t = Table::new(NodeKind::Dataset, vec!["Study Name".into()]);
        t.push(Record::from_pairs([("Study Name", "a"), ("Diseases Included", "AD")]));
        t.push(Record::from_pairs([("Study Name", "b"), ("Diseases Included", "AD")]));
        let cfg = BuildConfig::new("Study Name")
            .with_features(["Diseases Included"])
            .with_min_shared_features(1);
        assert_eq!(build_graph(&t, &cfg).edge_count(), 0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(BuildConfig::new("Study Name").validate().is_err());
        assert!(config(0).validate().is_err());
        assert!(config(2).with_delimiter("").validate().is_err());
        assert!(BuildConfig::new(" ").with_features(["a"]).validate().is_err());
        assert!(config(2).validate().is_ok());
    }

    #[test]
    fn feature_column_deserializes_both_forms() {
        let plain: FeatureColumn = serde_json::from_str("\"Code Summary\"").expect("name");
        assert!(plain.treat_as_text);
        let explicit: FeatureColumn =
            serde_json::from_str(r#"{"name":"Code Summary","treat_as_text":false}"#).expect("full");
        assert!(!explicit.treat_as_text);
        let inferred: FeatureColumn =
            serde_json::from_str(r#"{"name":"Diseases Included"}"#).expect("full");
        assert!(!inferred.treat_as_text);
    }
}
