//! Search module for keyword indexing and paginated retrieval
//!
//! This module contains:
//! - `tokenizer`, `prefix`: text normalization and prefix expansion
//! - `schema`, `translation`, `keywords`: per-locale keyword sets
//! - `writer`: atomic record + keyword writes
//! - `planner`, `refine`, `cursor`, `pager`: query planning and pagination
//! - `session`: caller-side accumulation of pages

pub mod cursor;
pub mod keywords;
pub mod pager;
pub mod planner;
pub mod prefix;
pub mod refine;
pub mod schema;
pub mod session;
pub mod tokenizer;
pub mod translation;
pub mod writer;

pub use cursor::{Cursor, Signature};
pub use keywords::KeywordBuilder;
pub use pager::{PageResult, Paginator};
pub use planner::{QueryPlan, QueryPlanner, SearchSpec};
pub use prefix::{expand, expand_token};
pub use refine::{refine, RefinementSpec};
pub use schema::{ChildSpec, FieldKind, FieldSpec, IndexSchema};
pub use session::SearchSession;
pub use tokenizer::{tokenize, tokenize_unique};
pub use translation::{TranslationTable, Translations};
pub use writer::IndexWriter;
