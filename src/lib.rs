//! recdex - prefix search indexing and cursor-paginated retrieval
//!
//! recdex makes owner-scoped records searchable by prefix on a document
//! store that only offers exact array membership, equality filters and
//! cursor pagination. Every record carries one derived keyword array per
//! locale, written atomically with the record itself.
//!
//! # Quick Start
//!
//! ```text
//! use std::sync::Arc;
//! use recdex::{Document, IndexSchema, Locale, Recdex, SearchSpec, TranslationTable};
//!
//! let recdex = Recdex::in_memory(
//!     IndexSchema::new().text("serialNumber").enumeration("category"),
//!     Arc::new(TranslationTable::new()),
//! )?;
//! recdex.create(Document::new("team-1", "ski-1").with_field("serialNumber", "SL240192"))?;
//!
//! let spec = SearchSpec::new("team-1", Locale::En).term("sl24").page_size(20);
//! let page = recdex.query(&spec)?;
//! if let Some(cursor) = &page.cursor {
//!     let next = recdex.load_more(cursor, &spec)?;
//! }
//! ```
//!
//! # Architecture
//!
//! - `recdex-core`: records, values, store query shape, errors
//! - `recdex-storage`: the `DocumentStore` capability trait and an
//!   in-memory implementation
//! - `recdex-engine`: keyword derivation, planning, pagination, reindexing
//!
//! The [`Recdex`] facade ties them together over one store.

mod recdex;

pub use crate::recdex::Recdex;

pub use recdex_core::{
    Document, EqualityFilter, Locale, OrderBy, RangeFilter, RecdexError, RecdexResult, RecordId,
    ScopeId, SortDirection, StoreQuery, Value, ID_FIELD,
};
pub use recdex_engine::search::{
    Cursor, IndexSchema, PageResult, SearchSession, SearchSpec, Signature, TranslationTable,
    Translations,
};
pub use recdex_engine::{
    CacheStats, ChunkFailure, Clock, ManualClock, ReindexProgress, ReindexReport, RetryConfig,
    SearchConfig, SystemClock,
};
pub use recdex_storage::{DocumentStore, MemoryStore, WriteOp};
