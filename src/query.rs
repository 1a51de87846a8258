//! Boolean query construction for Scopus searches.
//!
//! Turns up to three keyword slots plus the operator selected between each
//! pair into a single `TITLE-ABS-KEY(...)` expression. Construction is
//! deterministic and side-effect free; all input problems surface as
//! [`ValidationError`] before any string is built.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed field scope every query is wrapped in (title, abstract, keywords)
pub const SEARCH_FIELD: &str = "TITLE-ABS-KEY";

/// Maximum number of keyword slots
pub const MAX_TERMS: usize = 3;

/// Boolean operator between two adjacent keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    /// Wire form of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Connector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Connector::And),
            "OR" => Ok(Connector::Or),
            other => Err(format!("Unknown operator: {other} (expected AND or OR)")),
        }
    }
}

/// A fully constructed boolean search expression.
///
/// Immutable once built; the inner string is the exact query sent to the
/// search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanQuery(String);

impl BooleanQuery {
    /// The rendered query string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BooleanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build a boolean query from keyword slots and per-position operators.
///
/// Slots are trimmed before validation and must be filled front to back:
/// a blank slot in front of a filled one is rejected rather than silently
/// reordered. `connectors[i]` joins slot `i` and slot `i + 1`; a missing
/// selection defaults to `AND`.
///
/// # Errors
///
/// * [`ValidationError::EmptyQuery`] - no slot holds a keyword after trimming
/// * [`ValidationError::TooManyTerms`] - more than [`MAX_TERMS`] slots given
/// * [`ValidationError::NonContiguousTerms`] - a blank slot precedes a filled one
/// * [`ValidationError::InvalidCharacter`] - a keyword contains a double quote
pub fn build(terms: &[&str], connectors: &[Connector]) -> Result<BooleanQuery, ValidationError> {
    if terms.len() > MAX_TERMS {
        return Err(ValidationError::TooManyTerms);
    }

    let trimmed: Vec<&str> = terms.iter().map(|t| t.trim()).collect();

    let last_filled = match trimmed.iter().rposition(|t| !t.is_empty()) {
        Some(idx) => idx,
        None => return Err(ValidationError::EmptyQuery),
    };

    let used = &trimmed[..=last_filled];
    if used.iter().any(|t| t.is_empty()) {
        return Err(ValidationError::NonContiguousTerms);
    }
    if used.iter().any(|t| t.contains('"')) {
        return Err(ValidationError::InvalidCharacter);
    }

    let mut expr = format!("(\"{}\")", used[0]);
    for (idx, term) in used.iter().enumerate().skip(1) {
        let connector = connectors.get(idx - 1).copied().unwrap_or(Connector::And);
        expr.push_str(&format!(" {} \"{}\"", connector, term));
    }

    Ok(BooleanQuery(format!("{SEARCH_FIELD}({expr})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term() {
        let q = build(&["deferiprone"], &[]).expect("valid query");
        assert_eq!(q.as_str(), "TITLE-ABS-KEY((\"deferiprone\"))");
    }

    #[test]
    fn test_three_terms_all_and() {
        let q = build(
            &["deferiprone", "parkinson", "disease"],
            &[Connector::And, Connector::And],
        )
        .expect("valid query");
        assert_eq!(
            q.as_str(),
            "TITLE-ABS-KEY((\"deferiprone\") AND \"parkinson\" AND \"disease\")"
        );
    }

    #[test]
    fn test_mixed_connectors_in_position_order() {
        let q = build(
            &["iron", "chelator", "therapy"],
            &[Connector::Or, Connector::And],
        )
        .expect("valid query");
        assert_eq!(
            q.as_str(),
            "TITLE-ABS-KEY((\"iron\") OR \"chelator\" AND \"therapy\")"
        );
    }

    #[test]
    fn test_terms_are_trimmed() {
        let q = build(&["  iron  ", "\tchelator "], &[Connector::Or]).expect("valid query");
        assert_eq!(q.as_str(), "TITLE-ABS-KEY((\"iron\") OR \"chelator\")");
    }

    #[test]
    fn test_missing_connector_defaults_to_and() {
        let q = build(&["iron", "chelator"], &[]).expect("valid query");
        assert_eq!(q.as_str(), "TITLE-ABS-KEY((\"iron\") AND \"chelator\")");
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(build(&[], &[]), Err(ValidationError::EmptyQuery));
        assert_eq!(build(&["", "  ", ""], &[]), Err(ValidationError::EmptyQuery));
    }

    #[test]
    fn test_too_many_terms_rejected() {
        assert_eq!(
            build(&["a", "b", "c", "d"], &[Connector::And, Connector::And, Connector::And]),
            Err(ValidationError::TooManyTerms)
        );
    }

    #[test]
    fn test_gap_rejected() {
        assert_eq!(
            build(&["iron", "", "disease"], &[Connector::And, Connector::And]),
            Err(ValidationError::NonContiguousTerms)
        );
        assert_eq!(
            build(&["", "parkinson"], &[Connector::And]),
            Err(ValidationError::NonContiguousTerms)
        );
    }

    #[test]
    fn test_embedded_quote_rejected() {
        assert_eq!(
            build(&["iron\" OR \"x"], &[]),
            Err(ValidationError::InvalidCharacter)
        );
        assert_eq!(
            build(&["iron", "par\"kinson"], &[Connector::And]),
            Err(ValidationError::InvalidCharacter)
        );
    }

    #[test]
    fn test_quoted_term_count_matches_input() {
        for n in 1..=3 {
            let terms: Vec<String> = (0..n).map(|i| format!("term{i}")).collect();
            let refs: Vec<&str> = terms.iter().map(String::as_str).collect();
            let q = build(&refs, &[Connector::And, Connector::Or]).expect("valid query");
            let quoted = q.as_str().matches('"').count();
            assert_eq!(quoted, n * 2, "each term contributes one quoted literal");
        }
    }
}
