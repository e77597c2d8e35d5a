//! Locale index builder
//!
//! Turns a record into one flat keyword set per locale:
//!
//! 1. Collect the text of every schema field (enum codes are replaced by the
//!    locale's label first; free text is used as is)
//! 2. Descend into child collections with their own schema
//! 3. Tokenize everything, expand each token into its prefixes, union
//!
//! The result is a pure function of the record's raw fields, the schema and
//! the translation table. Derived `keywords_*` fields already on the record
//! are never read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use recdex_core::{Document, Locale, Value};
use tracing::debug;

use super::prefix::expand_into;
use super::schema::{FieldKind, IndexSchema};
use super::tokenizer::tokenize;
use super::translation::Translations;

/// Where field paths are resolved: the record itself or one child object
#[derive(Clone, Copy)]
enum Source<'a> {
    Record(&'a Document),
    Child(&'a Value),
}

impl<'a> Source<'a> {
    fn get(&self, path: &str) -> Option<&'a Value> {
        match self {
            Source::Record(doc) => doc.get(path),
            Source::Child(value) => value.get_path(path),
        }
    }
}

/// Builds per-locale keyword sets for one record type
#[derive(Clone)]
pub struct KeywordBuilder {
    schema: Arc<IndexSchema>,
    translations: Arc<dyn Translations>,
    min_prefix_len: usize,
}

impl fmt::Debug for KeywordBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordBuilder")
            .field("schema", &self.schema)
            .field("min_prefix_len", &self.min_prefix_len)
            .finish_non_exhaustive()
    }
}

impl KeywordBuilder {
    /// Create a builder
    pub fn new(
        schema: Arc<IndexSchema>,
        translations: Arc<dyn Translations>,
        min_prefix_len: usize,
    ) -> Self {
        KeywordBuilder {
            schema,
            translations,
            min_prefix_len,
        }
    }

    /// Schema in use
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Minimum indexed prefix length
    pub fn min_prefix_len(&self) -> usize {
        self.min_prefix_len
    }

    /// Keyword set of `doc` for one locale
    pub fn build_keyword_sets(&self, doc: &Document, locale: Locale) -> BTreeSet<String> {
        let mut texts = Vec::new();
        self.collect(&self.schema, Source::Record(doc), locale, &mut texts);

        let mut keywords = BTreeSet::new();
        for text in &texts {
            expand_into(tokenize(text), self.min_prefix_len, &mut keywords);
        }
        keywords
    }

    /// Keyword sets of `doc` for every locale in `locales`
    pub fn build_all_locales(
        &self,
        doc: &Document,
        locales: &[Locale],
    ) -> BTreeMap<Locale, BTreeSet<String>> {
        locales
            .iter()
            .map(|&locale| (locale, self.build_keyword_sets(doc, locale)))
            .collect()
    }

    fn collect(&self, schema: &IndexSchema, source: Source<'_>, locale: Locale, out: &mut Vec<String>) {
        for field in schema.fields() {
            if let Some(value) = source.get(&field.path) {
                self.push_text(value, field.kind, &field.path, locale, out);
            }
        }
        for child in schema.children() {
            match source.get(&child.path) {
                Some(Value::Array(items)) => {
                    for item in items.iter().filter(|v| v.as_object().is_some()) {
                        self.collect(&child.schema, Source::Child(item), locale, out);
                    }
                }
                Some(item) if item.as_object().is_some() => {
                    self.collect(&child.schema, Source::Child(item), locale, out);
                }
                _ => {}
            }
        }
    }

    fn push_text(&self, value: &Value, kind: FieldKind, path: &str, locale: Locale, out: &mut Vec<String>) {
        match value {
            Value::Null | Value::Bool(_) | Value::Object(_) => {}
            Value::Int(i) => out.push(i.to_string()),
            Value::Float(f) if f.is_finite() => out.push(f.to_string()),
            Value::Float(_) => {}
            Value::String(s) => match kind {
                FieldKind::Text => out.push(s.clone()),
                FieldKind::Enum => match self.translations.lookup(s, locale) {
                    Some(label) => out.push(label.to_string()),
                    None => {
                        debug!(
                            target: "recdex::search",
                            field = path,
                            code = %s,
                            locale = %locale,
                            "No label for enum code, indexing the raw code"
                        );
                        out.push(s.clone());
                    }
                },
            },
            Value::Array(items) => {
                for item in items {
                    self.push_text(item, kind, path, locale, out);
                }
            }
        }
    }
}
