//! Core types for recdex
//!
//! This crate defines the foundational types shared by the store, the
//! indexer and the planner:
//! - RecordId, ScopeId, Locale: identifiers
//! - Value: raw field values with a total sort order
//! - Document: one owner-scoped record (raw fields + keyword fields)
//! - StoreQuery and its predicates: the store-executable query shape
//! - RecdexError: error type hierarchy
//! - limits: reference defaults

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod limits;
pub mod query;
pub mod types;
pub mod value;

pub use document::Document;
pub use error::{RecdexError, RecdexResult};
pub use query::{
    ArrayContains, EqualityFilter, OrderBy, RangeBound, RangeFilter, SortDirection, StartAfter,
    StoreQuery, ID_FIELD,
};
pub use types::{Locale, RecordId, ScopeId, KEYWORD_FIELD_PREFIX};
pub use value::Value;
