//! Fault injection wrapper for store failure tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use recdex_core::{Document, RecdexError, RecdexResult, RecordId, ScopeId, StoreQuery};

use crate::traits::{DocumentStore, WriteOp};

/// Wraps a store and fails chosen calls with `StoreUnavailable`
///
/// Batch calls are numbered from 1 in the order they arrive, including
/// calls that were failed on purpose.
#[derive(Debug)]
pub struct FaultyStore<S> {
    inner: S,
    failing_batches: Mutex<HashSet<usize>>,
    fail_batches_from: Mutex<Option<usize>>,
    batch_calls: AtomicUsize,
    queries_down: AtomicBool,
    writes_down: AtomicBool,
}

impl<S: DocumentStore> FaultyStore<S> {
    /// Wrap a store; no faults are armed
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            failing_batches: Mutex::new(HashSet::new()),
            fail_batches_from: Mutex::new(None),
            batch_calls: AtomicUsize::new(0),
            queries_down: AtomicBool::new(false),
            writes_down: AtomicBool::new(false),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail the `n`-th batch call (1-based)
    pub fn fail_batch(&self, n: usize) {
        self.failing_batches.lock().insert(n);
    }

    /// Fail every batch call from the `n`-th on (1-based)
    pub fn fail_batches_from(&self, n: usize) {
        *self.fail_batches_from.lock() = Some(n);
    }

    /// Make every query fail (or recover)
    pub fn set_queries_unavailable(&self, down: bool) {
        self.queries_down.store(down, Ordering::SeqCst);
    }

    /// Make every single-record write fail (or recover)
    pub fn set_writes_unavailable(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    /// Batch calls seen so far, failed ones included
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl<S: DocumentStore> DocumentStore for FaultyStore<S> {
    fn get(&self, scope: &ScopeId, id: &RecordId) -> RecdexResult<Option<Document>> {
        if self.queries_down.load(Ordering::SeqCst) {
            return Err(RecdexError::store_unavailable("injected read failure"));
        }
        self.inner.get(scope, id)
    }

    fn write(&self, op: WriteOp) -> RecdexResult<()> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(RecdexError::store_unavailable("injected write failure"));
        }
        self.inner.write(op)
    }

    fn batch_write(&self, ops: Vec<WriteOp>) -> RecdexResult<()> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let from = *self.fail_batches_from.lock();
        if self.failing_batches.lock().contains(&call) || from.map_or(false, |n| call >= n) {
            return Err(RecdexError::store_unavailable(format!(
                "injected failure on batch call {}",
                call
            )));
        }
        self.inner.batch_write(ops)
    }

    fn query(&self, query: &StoreQuery) -> RecdexResult<Vec<Document>> {
        if self.queries_down.load(Ordering::SeqCst) {
            return Err(RecdexError::store_unavailable("injected query failure"));
        }
        self.inner.query(query)
    }

    fn count(&self, scope: &ScopeId) -> RecdexResult<usize> {
        if self.queries_down.load(Ordering::SeqCst) {
            return Err(RecdexError::store_unavailable("injected count failure"));
        }
        self.inner.count(scope)
    }

    fn max_batch_size(&self) -> usize {
        self.inner.max_batch_size()
    }
}
