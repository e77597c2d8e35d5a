//! High-level search facade.
//!
//! [`Recdex`] wires the engine components over one store: writes go through
//! the index writer and invalidate cached pages of their scope, first pages
//! are served from the result cache when fresh, and reindexing runs through
//! the batch reindexer.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use recdex_core::{Document, Locale, RecdexResult, RecordId, ScopeId};
use recdex_engine::search::{
    Cursor, IndexSchema, IndexWriter, KeywordBuilder, PageResult, Paginator, QueryPlanner,
    SearchSpec, Translations,
};
use recdex_engine::{
    BatchReindexer, CacheStats, Clock, ReindexProgress, ReindexReport, ResultCache, SearchConfig,
    SystemClock,
};
use recdex_storage::{DocumentStore, MemoryStore};
use tracing::debug;

/// Searchable collection over a document store.
///
/// # Example
///
/// ```text
/// use std::sync::Arc;
/// use recdex::{IndexSchema, Locale, Recdex, SearchSpec, TranslationTable, Document};
///
/// let recdex = Recdex::in_memory(
///     IndexSchema::new().text("serialNumber").text("brand"),
///     Arc::new(TranslationTable::new()),
/// )?;
/// recdex.create(Document::new("team-1", "ski-1").with_field("brand", "Salomon"))?;
///
/// let page = recdex.query(&SearchSpec::new("team-1", Locale::En).term("salo"))?;
/// assert_eq!(page.records.len(), 1);
/// ```
pub struct Recdex {
    config: SearchConfig,
    writer: IndexWriter,
    paginator: Paginator,
    reindexer: BatchReindexer,
    cache: ResultCache,
}

impl std::fmt::Debug for Recdex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recdex")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Recdex {
    /// Create a facade over `store`.
    ///
    /// # Errors
    ///
    /// `Config` if `config` is invalid, `InvalidInput` if `schema` is.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        schema: IndexSchema,
        translations: Arc<dyn Translations>,
        config: SearchConfig,
    ) -> RecdexResult<Self> {
        Self::with_clock(store, schema, translations, config, Arc::new(SystemClock))
    }

    /// Like [`new`](Self::new), with the cache reading time from `clock`
    pub fn with_clock(
        store: Arc<dyn DocumentStore>,
        schema: IndexSchema,
        translations: Arc<dyn Translations>,
        config: SearchConfig,
        clock: Arc<dyn Clock>,
    ) -> RecdexResult<Self> {
        config.validate()?;
        schema.validate()?;

        let builder = KeywordBuilder::new(Arc::new(schema), translations, config.min_prefix_len);
        let writer = IndexWriter::new(store.clone(), builder, config.locales.clone());
        let paginator = Paginator::new(store, QueryPlanner::from_config(&config));
        let reindexer = BatchReindexer::new(
            writer.clone(),
            config.reindex_chunk_size,
            config.retry.clone(),
        );
        let cache = ResultCache::new(Duration::from_secs(config.cache_ttl_secs), clock);

        debug!(
            target: "recdex::search",
            locales = ?config.locales,
            min_prefix_len = config.min_prefix_len,
            cache_ttl_secs = config.cache_ttl_secs,
            "Search facade ready"
        );

        Ok(Recdex {
            config,
            writer,
            paginator,
            reindexer,
            cache,
        })
    }

    /// Facade over a fresh [`MemoryStore`] with default configuration
    pub fn in_memory(schema: IndexSchema, translations: Arc<dyn Translations>) -> RecdexResult<Self> {
        Self::new(
            Arc::new(MemoryStore::new()),
            schema,
            translations,
            SearchConfig::default(),
        )
    }

    /// Configuration in use
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.writer.store()
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    /// Keyword set `doc` would be indexed under for `locale`
    pub fn build_keyword_sets(&self, doc: &Document, locale: Locale) -> BTreeSet<String> {
        self.writer.builder().build_keyword_sets(doc, locale)
    }

    /// Insert a new record with its keyword fields
    pub fn create(&self, doc: Document) -> RecdexResult<Document> {
        let scope = doc.scope.clone();
        let written = self.writer.create(doc)?;
        self.cache.invalidate_scope(&scope);
        Ok(written)
    }

    /// Replace an existing record and its keyword fields
    pub fn update(&self, doc: Document) -> RecdexResult<Document> {
        let scope = doc.scope.clone();
        let written = self.writer.update(doc)?;
        self.cache.invalidate_scope(&scope);
        Ok(written)
    }

    /// Insert or replace a record with its keyword fields
    pub fn upsert(&self, doc: Document) -> RecdexResult<Document> {
        let scope = doc.scope.clone();
        let written = self.writer.upsert(doc)?;
        self.cache.invalidate_scope(&scope);
        Ok(written)
    }

    /// Delete a record
    pub fn delete(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<()> {
        self.writer.delete(scope, id)?;
        self.cache.invalidate_scope(scope);
        Ok(())
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// First page of `spec`, from the cache when fresh
    pub fn query(&self, spec: &SearchSpec) -> RecdexResult<PageResult> {
        let page_size = spec.page_size.unwrap_or(self.config.default_page_size);
        let signature = spec.signature()?;
        if let Some(page) = self.cache.get(&signature, page_size) {
            debug!(target: "recdex::search", signature = %signature, "Serving cached first page");
            return Ok(page);
        }
        // read before the fetch so a write landing mid-fetch voids the insert
        let generation = self.cache.generation(&spec.scope);
        let page = self.paginator.query(spec)?;
        self.cache
            .insert(&spec.scope, generation, page_size, page.clone());
        Ok(page)
    }

    /// Page following `cursor`; never cached
    pub fn load_more(&self, cursor: &Cursor, spec: &SearchSpec) -> RecdexResult<PageResult> {
        self.paginator.load_more(cursor, spec)
    }

    /// [`load_more`](Self::load_more) with a cursor in token form
    pub fn load_more_token(&self, token: &str, spec: &SearchSpec) -> RecdexResult<PageResult> {
        let cursor = Cursor::decode(token)?;
        self.paginator.load_more(&cursor, spec)
    }

    /// Cache counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // =========================================================================
    // Reindexing
    // =========================================================================

    /// Recompute keyword fields of every record in `scope`
    pub fn reindex_all(&self, scope: &ScopeId) -> RecdexResult<ReindexReport> {
        self.reindex_all_with_progress(scope, |_| {})
    }

    /// [`reindex_all`](Self::reindex_all) reporting progress after each chunk
    pub fn reindex_all_with_progress<F>(
        &self,
        scope: &ScopeId,
        on_progress: F,
    ) -> RecdexResult<ReindexReport>
    where
        F: FnMut(ReindexProgress),
    {
        let report = self.reindexer.reindex_all_with_progress(scope, on_progress)?;
        if report.chunks_committed > 0 {
            self.cache.invalidate_scope(scope);
        }
        Ok(report)
    }
}
