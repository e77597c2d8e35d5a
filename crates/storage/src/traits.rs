//! Document store capability surface
//!
//! The subsystem only relies on what a managed document store offers:
//! atomic single-record writes, atomic bounded batches, and the narrow
//! query shape described by [`StoreQuery`]. Every backend implements
//! [`DocumentStore`]; the in-memory [`MemoryStore`](crate::MemoryStore)
//! is the reference implementation.

use recdex_core::{Document, RecdexError, RecdexResult, RecordId, ScopeId, StoreQuery};

/// A single record mutation
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert; fails with `AlreadyExists` if the record exists
    Create(Document),
    /// Replace; fails with `NotFound` if the record does not exist
    Update(Document),
    /// Insert or replace
    Upsert(Document),
    /// Remove; fails with `NotFound` if the record does not exist
    Delete {
        /// Owning scope
        scope: ScopeId,
        /// Record to remove
        id: RecordId,
    },
}

impl WriteOp {
    /// Scope the operation touches
    pub fn scope(&self) -> &ScopeId {
        match self {
            WriteOp::Create(doc) | WriteOp::Update(doc) | WriteOp::Upsert(doc) => &doc.scope,
            WriteOp::Delete { scope, .. } => scope,
        }
    }

    /// Record the operation touches
    pub fn id(&self) -> &RecordId {
        match self {
            WriteOp::Create(doc) | WriteOp::Update(doc) | WriteOp::Upsert(doc) => &doc.id,
            WriteOp::Delete { id, .. } => id,
        }
    }

    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            WriteOp::Create(_) => "create",
            WriteOp::Update(_) => "update",
            WriteOp::Upsert(_) => "upsert",
            WriteOp::Delete { .. } => "delete",
        }
    }
}

/// Backend a searchable collection lives in
///
/// # Atomicity
///
/// `write` and `batch_write` are all-or-nothing: a failed call leaves no
/// trace. Batches larger than [`max_batch_size`](Self::max_batch_size) are
/// rejected up front with `BatchTooLarge`.
pub trait DocumentStore: Send + Sync {
    /// Fetch one record
    fn get(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<Option<Document>>;

    /// Apply one mutation atomically
    fn write(&self, op: WriteOp) -> RecdexResult<()>;

    /// Apply up to `max_batch_size()` mutations atomically
    fn batch_write(&self, ops: Vec<WriteOp>) -> RecdexResult<()>;

    /// Execute a query; see [`validate_query`] for the accepted shape
    fn query(&self, query: &StoreQuery) -> RecdexResult<Vec<Document>>;

    /// Number of records in a scope
    fn count(&self, scope: &ScopeId) -> RecdexResult<usize>;

    /// Largest batch `batch_write` accepts
    fn max_batch_size(&self) -> usize;
}

/// Reject query shapes a document store cannot serve.
///
/// - `limit` must be positive
/// - a range predicate must be on the order-by field
/// - a range predicate cannot be combined with array membership
pub fn validate_query(query: &StoreQuery) -> RecdexResult<()> {
    if query.limit == 0 {
        return Err(RecdexError::invalid_input("query limit must be positive"));
    }
    if let Some(range) = &query.range {
        if query.array_contains.is_some() {
            return Err(RecdexError::unsupported_query(format!(
                "range on '{}' cannot be combined with an array-membership predicate",
                range.field
            )));
        }
        if range.field != query.order_by.field {
            return Err(RecdexError::unsupported_query(format!(
                "range on '{}' requires ordering by that field, not '{}'",
                range.field, query.order_by.field
            )));
        }
    }
    Ok(())
}
