//! # Primitives
//!
//! Hardcoded runtime constants for the CardGraph engine.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Callers tune behavior through configuration structs, never by mutating
//! these tables.

/// Default separator between items in a multi-value cell.
pub const DEFAULT_DELIMITER: &str = ";";

/// Default number of feature columns two entities must share to be linked.
pub const DEFAULT_MIN_SHARED_FEATURES: usize = 2;

/// Default identifier column of dataset tables.
pub const DEFAULT_ID_COLUMN: &str = "Study Name";

/// Tokens this short or shorter are dropped when stopwording is active.
pub const MIN_TOKEN_LENGTH: usize = 2;

/// Number of top-connected nodes reported by statistics.
pub const TOP_NODES_LIMIT: usize = 10;

/// Number of connection rows included in a text summary.
pub const SUMMARY_EDGE_LIMIT: usize = 20;

/// Placeholder shown when there is nothing to draw.
pub const EMPTY_FIGURE_MESSAGE: &str = "No data to display";

// =============================================================================
// STOPWORD TABLE
// =============================================================================

/// Tokens excluded from text-like feature comparisons.
///
/// Lookups are made on the lowercased token.
pub const STOPWORDS: &[&str] = &[
    // Articles, prepositions, conjunctions, auxiliaries
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "should", "could", "may", "might", "must", "can",
    // Domain-generic words
    "data", "analysis", "study", "research", "using", "based", "method", "methods", "approach",
    "approaches", "model", "models", "system", "systems", "tool", "tools", "use", "used", "uses",
    "application", "applications", "code", "software", "program", "programs", "package",
    "packages", "library", "libraries", "framework", "frameworks",
    // Roman numerals and abbreviations
    "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "vs", "etc", "eg", "ie",
];

/// Column-name fragments that mark a feature column as free text.
///
/// Matching is a case-sensitive substring test against the column name.
/// Only used to default `FeatureColumn::treat_as_text`.
pub const TEXT_FIELD_MARKERS: &[&str] = &[
    "Code Summary",
    "Summary",
    "Description",
    "Abstract",
    "Languages",
    "Tools/Packages",
    "Tooling",
    "Data Types",
    "FAIR Issues",
    "Biomedical Relevance",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn stopwords_are_lowercase_and_unique() {
        let unique: BTreeSet<_> = STOPWORDS.iter().collect();
        assert_eq!(unique.len(), STOPWORDS.len());
        assert!(STOPWORDS.iter().all(|w| w.to_lowercase() == *w));
    }

    #[test]
    fn default_delimiter_is_semicolon() {
        assert_eq!(DEFAULT_DELIMITER, ";");
    }
}
