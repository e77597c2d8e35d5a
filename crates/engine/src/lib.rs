//! Search engine for recdex
//!
//! This crate builds on the store capability surface in `recdex-storage`:
//! - Keyword indexing: tokenization, prefix expansion, per-locale sets
//! - Query planning and cursor pagination with client-side refinement
//! - Batch reindexing through a bounded work queue
//! - First-page result caching with an injectable clock
//!
//! Configuration is explicit (`SearchConfig`); nothing here holds global
//! state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod reindex;
pub mod retry;
pub mod search;

pub use cache::{CacheStats, ResultCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SearchConfig, CONFIG_FILE_NAME};
pub use reindex::{BatchReindexer, ChunkFailure, ReindexProgress, ReindexReport};
pub use retry::RetryConfig;
pub use search::{
    Cursor, IndexSchema, IndexWriter, KeywordBuilder, PageResult, Paginator, QueryPlanner,
    SearchSession, SearchSpec, Signature, TranslationTable, Translations,
};
