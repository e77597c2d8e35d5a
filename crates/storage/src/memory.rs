//! MemoryStore: reference document store on a BTreeMap
//!
//! This module implements the [`DocumentStore`] trait using:
//! - `BTreeMap<(ScopeId, RecordId), Document>` so a scope is one contiguous range
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` counters for write/commit/query statistics
//!
//! # Design Notes
//!
//! - **Atomic batches**: preconditions of every operation are checked under
//!   the write lock before anything is applied, so a batch either commits
//!   entirely or leaves the map untouched.
//! - **Query shape**: queries are validated with [`validate_query`] first,
//!   so the in-memory store refuses exactly what a managed store refuses.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use recdex_core::limits::MAX_BATCH_WRITES;
use recdex_core::{Document, RecdexError, RecdexResult, RecordId, ScopeId, StoreQuery};

use crate::traits::{validate_query, DocumentStore, WriteOp};

type RecordKey = (ScopeId, RecordId);

/// Counters exposed for tests and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Single-record writes committed
    pub writes: u64,
    /// Batches committed
    pub batch_commits: u64,
    /// Operations committed through batches
    pub batched_ops: u64,
    /// Queries executed
    pub queries: u64,
}

/// In-memory document store
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<RecordKey, Document>>,
    max_batch_size: usize,
    writes: AtomicU64,
    batch_commits: AtomicU64,
    batched_ops: AtomicU64,
    queries: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the reference batch limit
    pub fn new() -> Self {
        Self::with_max_batch_size(MAX_BATCH_WRITES)
    }

    /// Create an empty store with a custom batch limit
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        MemoryStore {
            data: RwLock::new(BTreeMap::new()),
            max_batch_size: max_batch_size.max(1),
            writes: AtomicU64::new(0),
            batch_commits: AtomicU64::new(0),
            batched_ops: AtomicU64::new(0),
            queries: AtomicU64::new(0),
        }
    }

    /// Snapshot of the statistics counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            writes: self.writes.load(Ordering::Relaxed),
            batch_commits: self.batch_commits.load(Ordering::Relaxed),
            batched_ops: self.batched_ops.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
        }
    }

    /// Total records across all scopes
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn scope_start(scope: &ScopeId) -> RecordKey {
        (scope.clone(), RecordId::new(String::new()))
    }

    /// Check every precondition against the current map plus the effects of
    /// earlier operations in the same batch.
    fn check_preconditions(
        data: &BTreeMap<RecordKey, Document>,
        ops: &[WriteOp],
    ) -> RecdexResult<()> {
        let mut overlay: HashMap<RecordKey, bool> = HashMap::new();
        for op in ops {
            let key = (op.scope().clone(), op.id().clone());
            let exists = overlay
                .get(&key)
                .copied()
                .unwrap_or_else(|| data.contains_key(&key));
            match op {
                WriteOp::Create(_) if exists => {
                    return Err(RecdexError::AlreadyExists {
                        scope: key.0,
                        id: key.1,
                    });
                }
                WriteOp::Update(_) | WriteOp::Delete { .. } if !exists => {
                    return Err(RecdexError::NotFound {
                        scope: key.0,
                        id: key.1,
                    });
                }
                _ => {}
            }
            let exists_after = !matches!(op, WriteOp::Delete { .. });
            overlay.insert(key, exists_after);
        }
        Ok(())
    }

    fn apply(data: &mut BTreeMap<RecordKey, Document>, op: WriteOp) {
        match op {
            WriteOp::Create(doc) | WriteOp::Update(doc) | WriteOp::Upsert(doc) => {
                data.insert((doc.scope.clone(), doc.id.clone()), doc);
            }
            WriteOp::Delete { scope, id } => {
                data.remove(&(scope, id));
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<Option<Document>> {
        Ok(self.data.read().get(&(scope.clone(), id.clone())).cloned())
    }

    fn write(&self, op: WriteOp) -> RecdexResult<()> {
        let mut data = self.data.write();
        Self::check_preconditions(&data, std::slice::from_ref(&op))?;
        Self::apply(&mut data, op);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn batch_write(&self, ops: Vec<WriteOp>) -> RecdexResult<()> {
        if ops.len() > self.max_batch_size {
            return Err(RecdexError::BatchTooLarge {
                size: ops.len(),
                max: self.max_batch_size,
            });
        }
        if ops.is_empty() {
            return Ok(());
        }

        let count = ops.len();
        let mut data = self.data.write();
        Self::check_preconditions(&data, &ops)?;
        for op in ops {
            Self::apply(&mut data, op);
        }
        drop(data);

        self.batch_commits.fetch_add(1, Ordering::Relaxed);
        self.batched_ops.fetch_add(count as u64, Ordering::Relaxed);
        debug!(target: "recdex::storage", ops = count, "Batch committed");
        Ok(())
    }

    fn query(&self, query: &StoreQuery) -> RecdexResult<Vec<Document>> {
        validate_query(query)?;
        self.queries.fetch_add(1, Ordering::Relaxed);

        let data = self.data.read();
        let mut hits: Vec<Document> = data
            .range(Self::scope_start(&query.scope)..)
            .take_while(|((scope, _), _)| scope == &query.scope)
            .map(|(_, doc)| doc)
            .filter(|doc| query.matches(doc) && query.is_after_start(doc))
            .cloned()
            .collect();
        drop(data);

        hits.sort_by(|a, b| query.order_by.compare(a, b));
        hits.truncate(query.limit);
        Ok(hits)
    }

    fn count(&self, scope: &ScopeId) -> RecdexResult<usize> {
        Ok(self
            .data
            .read()
            .range(Self::scope_start(scope)..)
            .take_while(|((s, _), _)| s == scope)
            .count())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recdex_core::{ArrayContains, EqualityFilter, OrderBy, StartAfter, Value};

    fn doc(scope: &str, id: &str) -> Document {
        Document::new(scope, id)
    }

    fn put(store: &MemoryStore, d: Document) {
        store.write(WriteOp::Upsert(d)).unwrap();
    }

    #[test]
    fn test_create_then_get() {
        let store = MemoryStore::new();
        store
            .write(WriteOp::Create(doc("t", "a").with_field("brand", "Atomic")))
            .unwrap();
        let got = store.get(&ScopeId::new("t"), &RecordId::new("a")).unwrap();
        assert_eq!(got.unwrap().get("brand"), Some(&Value::from("Atomic")));
        assert_eq!(store.stats().writes, 1);
    }

    #[test]
    fn test_create_existing_fails() {
        let store = MemoryStore::new();
        put(&store, doc("t", "a"));
        let err = store.write(WriteOp::Create(doc("t", "a"))).unwrap_err();
        assert!(matches!(err, RecdexError::AlreadyExists { .. }));
    }

    #[test]
    fn test_update_missing_fails() {
        let store = MemoryStore::new();
        let err = store.write(WriteOp::Update(doc("t", "a"))).unwrap_err();
        assert!(matches!(err, RecdexError::NotFound { .. }));
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let store = MemoryStore::new();
        put(&store, doc("t", "exists"));
        let ops = vec![
            WriteOp::Create(doc("t", "new")),
            WriteOp::Update(doc("t", "missing")),
        ];
        assert!(store.batch_write(ops).is_err());
        assert!(store
            .get(&ScopeId::new("t"), &RecordId::new("new"))
            .unwrap()
            .is_none());
        assert_eq!(store.stats().batch_commits, 0);
    }

    #[test]
    fn test_batch_sees_its_own_earlier_ops() {
        let store = MemoryStore::new();
        let ops = vec![
            WriteOp::Create(doc("t", "a")),
            WriteOp::Update(doc("t", "a").with_field("n", 2)),
            WriteOp::Delete {
                scope: ScopeId::new("t"),
                id: RecordId::new("a"),
            },
        ];
        store.batch_write(ops).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_limit_enforced() {
        let store = MemoryStore::with_max_batch_size(2);
        let ops = (0..3)
            .map(|i| WriteOp::Upsert(doc("t", &i.to_string())))
            .collect();
        let err = store.batch_write(ops).unwrap_err();
        assert!(matches!(err, RecdexError::BatchTooLarge { size: 3, max: 2 }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_query_scope_isolation_and_count() {
        let store = MemoryStore::new();
        put(&store, doc("t1", "a"));
        put(&store, doc("t1", "b"));
        put(&store, doc("t2", "a"));
        put(&store, doc("t10", "z"));
        assert_eq!(store.count(&ScopeId::new("t1")).unwrap(), 2);
        let q = StoreQuery::new(ScopeId::new("t1"), OrderBy::asc(recdex_core::ID_FIELD), 10);
        let ids: Vec<_> = store
            .query(&q)
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_query_filters_order_and_limit() {
        let store = MemoryStore::new();
        for (id, brand, price, kw) in [
            ("a", "Salomon", 300, "sal"),
            ("b", "Atomic", 100, "ato"),
            ("c", "Salomon", 200, "sal"),
            ("d", "Salomon", 100, "sal"),
        ] {
            put(
                &store,
                doc("t", id)
                    .with_field("brand", brand)
                    .with_field("price", price)
                    .with_field("keywords_en", Value::Array(vec![Value::from(kw)])),
            );
        }
        let q = StoreQuery::new(ScopeId::new("t"), OrderBy::desc("price"), 2)
            .with_equals(EqualityFilter::new("brand", "Salomon"))
            .with_array_contains(ArrayContains::new("keywords_en", "sal"));
        let ids: Vec<_> = store
            .query(&q)
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        let next = q.clone().with_start_after(StartAfter {
            sort_value: Value::Int(200),
            id: RecordId::new("c"),
        });
        let ids: Vec<_> = store
            .query(&next)
            .unwrap()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["d"]);
    }

    #[test]
    fn test_query_rejects_unsupported_shape() {
        let store = MemoryStore::new();
        let q = StoreQuery::new(ScopeId::new("t"), OrderBy::asc("name"), 10)
            .with_range(recdex_core::RangeFilter::new("price").at_least(0.0));
        assert!(matches!(
            store.query(&q),
            Err(RecdexError::UnsupportedQuery { .. })
        ));
        assert_eq!(store.stats().queries, 0);
    }
}
