//! # Field Parser
//!
//! Splits multi-value cells into normalized token sets.
//!
//! - Pieces are trimmed and empty pieces dropped
//! - Stopwording removes table entries and tokens of length <= 2
//! - Retained tokens keep their case; matching is case-sensitive
//! - Never fails: missing or empty input yields the empty set

use crate::primitives::{MIN_TOKEN_LENGTH, STOPWORDS, TEXT_FIELD_MARKERS};
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn stopword_set() -> &'static BTreeSet<&'static str> {
    static SET: OnceLock<BTreeSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Check whether a token is in the stopword table (case-insensitive).
#[must_use]
pub fn is_stopword(token: &str) -> bool {
    stopword_set().contains(token.to_lowercase().as_str())
}

/// Check whether a column name looks like a free-text column.
#[must_use]
pub fn is_text_column(name: &str) -> bool {
    TEXT_FIELD_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Parse a delimited cell into its set of tokens.
///
/// An empty delimiter treats the whole cell as a single item.
#[must_use]
pub fn parse_field(value: &str, delimiter: &str, remove_stopwords: bool) -> BTreeSet<String> {
    let pieces: Box<dyn Iterator<Item = &str>> = if delimiter.is_empty() {
        Box::new(std::iter::once(value))
    } else {
        Box::new(value.split(delimiter))
    };

    pieces
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| {
            !remove_stopwords || (item.chars().count() > MIN_TOKEN_LENGTH && !is_stopword(item))
        })
        .map(str::to_string)
        .collect()
}

/// Rejoin a token set with a delimiter.
///
/// Parsing the result again with the same delimiter yields the same set.
#[must_use]
pub fn join_tokens(tokens: &BTreeSet<String>, delimiter: &str) -> String {
    tokens
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(delimiter)
}

// =============================================================================
// TESTS
// =============================================================================
