//! Index writer
//!
//! Attaches the derived `keywords_<locale>` fields to a record and hands the
//! whole record to the store in ONE write. Keywords are never written on
//! their own, so a record cannot be observed with content newer than its
//! keywords, or the other way round. If the store write fails, neither the
//! content nor the keywords change.

use std::sync::Arc;

use recdex_core::{Document, Locale, RecdexResult, RecordId, ScopeId, Value};
use recdex_storage::{DocumentStore, WriteOp};
use tracing::debug;

use super::keywords::KeywordBuilder;

/// Writes records together with their keyword fields
#[derive(Clone)]
pub struct IndexWriter {
    store: Arc<dyn DocumentStore>,
    builder: KeywordBuilder,
    locales: Vec<Locale>,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("builder", &self.builder)
            .field("locales", &self.locales)
            .finish_non_exhaustive()
    }
}

impl IndexWriter {
    /// Create a writer maintaining keyword fields for `locales`
    pub fn new(store: Arc<dyn DocumentStore>, builder: KeywordBuilder, locales: Vec<Locale>) -> Self {
        IndexWriter {
            store,
            builder,
            locales,
        }
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Keyword builder in use
    pub fn builder(&self) -> &KeywordBuilder {
        &self.builder
    }

    /// Locales with a maintained keyword field
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Return `doc` with freshly derived keyword fields.
    ///
    /// Existing `keywords_*` fields are discarded first, so fields of
    /// locales no longer configured disappear too. Pure: nothing is written.
    pub fn prepare(&self, mut doc: Document) -> Document {
        doc.strip_keywords();
        for (locale, keywords) in self.builder.build_all_locales(&doc, &self.locales) {
            let array = keywords.into_iter().map(Value::String).collect();
            doc.set(locale.keyword_field(), Value::Array(array));
        }
        doc
    }

    /// Insert a new record; fails if it already exists
    pub fn create(&self, doc: Document) -> RecdexResult<Document> {
        self.commit(doc, WriteOp::Create)
    }

    /// Replace an existing record; fails if it does not exist
    pub fn update(&self, doc: Document) -> RecdexResult<Document> {
        self.commit(doc, WriteOp::Update)
    }

    /// Insert or replace a record
    pub fn upsert(&self, doc: Document) -> RecdexResult<Document> {
        self.commit(doc, WriteOp::Upsert)
    }

    /// Delete a record; its keyword fields go with it
    pub fn delete(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<()> {
        self.store.write(WriteOp::Delete {
            scope: scope.clone(),
            id: id.clone(),
        })
    }

    fn commit(&self, doc: Document, op: fn(Document) -> WriteOp) -> RecdexResult<Document> {
        let prepared = self.prepare(doc);
        let write = op(prepared.clone());
        debug!(
            target: "recdex::search",
            op = write.name(),
            scope = %prepared.scope,
            id = %prepared.id,
            "Writing record with keyword fields"
        );
        self.store.write(write)?;
        Ok(prepared)
    }
}
