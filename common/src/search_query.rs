//! Shared search query models and helpers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Selected values per facet name. An empty set imposes no constraint.
pub type FacetSelections = BTreeMap<String, BTreeSet<String>>;

/// Settled, trimmed search text. Empty means "no text filter".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SearchTerm {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SearchTerm {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SearchTerm> for String {
    fn from(value: SearchTerm) -> Self {
        value.0
    }
}

impl std::fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-insensitive "contains" test, OR-ed across `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPredicate {
    pub term: String,
    pub fields: Vec<String>,
}

/// True when the record's array `field` shares at least one element with `values`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlapPredicate {
    pub field: String,
    pub values: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    pub column: String,
    pub ascending: bool,
}

impl OrderKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self { column: column.into(), ascending: true }
    }
}

/// Everything the query service needs to produce one result page.
///
/// All predicates combine with AND. `page_index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub table: String,
    pub columns: Vec<String>,
    pub text_predicate: Option<TextPredicate>,
    pub overlap_predicates: Vec<OverlapPredicate>,
    pub order: OrderKey,
    pub page_index: u64,
    pub page_size: u64,
}

impl QueryDescriptor {
    /// Saturates rather than wrapping for pages no result set can reach.
    pub fn offset(&self) -> u64 {
        (self.page_index.max(1) - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn search_term(&self) -> Option<&str> {
        self.text_predicate.as_ref().map(|p| p.term.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_is_trimmed() {
        assert_eq!(SearchTerm::new("  slack bot \n").as_str(), "slack bot");
        assert!(SearchTerm::new("   ").is_empty());
    }

    #[test]
    fn search_term_trims_when_deserialized() {
        let term: SearchTerm = serde_json::from_str("\"  crm  \"").unwrap();
        assert_eq!(term.as_str(), "crm");
    }
}
