//! Searchable record
//!
//! A `Document` is one owner-scoped record as the store holds it: raw fields
//! plus the derived `keywords_<locale>` arrays, all inline in one field map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Locale, RecordId, ScopeId, KEYWORD_FIELD_PREFIX};
use crate::value::Value;

/// Owner-scoped record with raw and derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Record id, unique inside `scope`
    pub id: RecordId,
    /// Owning scope
    pub scope: ScopeId,
    /// Field map (raw fields and keyword fields)
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new(scope: impl Into<ScopeId>, id: impl Into<RecordId>) -> Self {
        Document {
            id: id.into(),
            scope: scope.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder: set a top-level field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a top-level field, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Remove a top-level field
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Resolve a dotted field path (`owner.name`)
    pub fn get(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((head, rest)) => self.fields.get(head)?.get_path(rest),
        }
    }

    /// Stored keyword array for a locale, if present
    pub fn keywords(&self, locale: Locale) -> Option<&[Value]> {
        self.fields.get(locale.keyword_field())?.as_array()
    }

    /// Whether the keyword array for `locale` holds `keyword`
    pub fn has_keyword(&self, locale: Locale, keyword: &str) -> bool {
        self.fields
            .get(locale.keyword_field())
            .map(|v| v.array_contains_str(keyword))
            .unwrap_or(false)
    }

    /// Drop every derived keyword field, leaving only raw fields
    pub fn strip_keywords(&mut self) {
        self.fields
            .retain(|name, _| !name.starts_with(KEYWORD_FIELD_PREFIX));
    }

    /// Raw fields only, without derived keyword arrays
    pub fn raw_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(|(name, _)| !name.starts_with(KEYWORD_FIELD_PREFIX))
    }
}
