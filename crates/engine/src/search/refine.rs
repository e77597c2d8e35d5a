//! Client-side refinement
//!
//! Filters the store cannot combine with the rest of a query are applied to
//! every fetched page here. Pure and idempotent: refining a refined page
//! changes nothing, and the input is never mutated.

use recdex_core::{Document, Locale, RangeFilter};

/// Checks deferred from the store query
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementSpec {
    /// Locale whose keyword field `required_keywords` are looked up in
    pub locale: Locale,
    /// Keywords every record must carry
    pub required_keywords: Vec<String>,
    /// Deferred numeric range
    pub range: Option<RangeFilter>,
}

impl RefinementSpec {
    /// No checks
    pub fn new(locale: Locale) -> Self {
        RefinementSpec {
            locale,
            required_keywords: Vec::new(),
            range: None,
        }
    }

    /// Whether refinement lets every record through
    pub fn is_empty(&self) -> bool {
        self.required_keywords.is_empty() && self.range.is_none()
    }

    /// Whether one record passes every check
    pub fn matches(&self, doc: &Document) -> bool {
        self.required_keywords
            .iter()
            .all(|kw| doc.has_keyword(self.locale, kw))
            && self.range.as_ref().map_or(true, |r| r.matches(doc))
    }
}

/// Records of `records` passing `spec`, in their original order
pub fn refine(records: &[Document], spec: &RefinementSpec) -> Vec<Document> {
    records.iter().filter(|d| spec.matches(d)).cloned().collect()
}
