//! Batch reindexer
//!
//! Recomputes the keyword fields of every record in a scope, e.g. after a
//! translation table or schema change. Work flows through a bounded queue of
//! capacity one:
//!
//! ```text
//! producer thread              calling thread
//! page scan by id -> [ 1 ] -> re-read + prepare -> batch_write (retry) -> progress
//! ```
//!
//! So at most one chunk is being committed while the next one is staged.
//! The producer only stages ids. Each record is read again and its keywords
//! derived right before its chunk is written, so edits made while the chunk
//! sat in the queue are kept, and records deleted meanwhile are skipped.
//! Every chunk is one atomic batch; a chunk that still fails after its
//! retries stops the run, and chunks committed before it stay committed.
//! Running again is safe: keyword derivation is deterministic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread;

use recdex_core::{OrderBy, RecdexResult, RecordId, ScopeId, StartAfter, StoreQuery, ID_FIELD};
use recdex_storage::WriteOp;
use tracing::{debug, info, warn};

use crate::retry::RetryConfig;
use crate::search::IndexWriter;

/// Progress after a committed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReindexProgress {
    /// Records committed so far
    pub processed: usize,
    /// Records counted in the scope when the run started
    pub total: usize,
}

/// A chunk that could not be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    /// Zero-based chunk index
    pub chunk: usize,
    /// First record of the chunk, if the chunk was enumerated
    pub first_id: Option<RecordId>,
    /// Records in the chunk
    pub records: usize,
    /// Commit attempts made
    pub attempts: usize,
    /// Error of the last attempt
    pub error: String,
}

/// Outcome of a reindex run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexReport {
    /// Scope reindexed
    pub scope: ScopeId,
    /// Records committed
    pub processed: usize,
    /// Records counted when the run started
    pub total: usize,
    /// Chunks committed
    pub chunks_committed: usize,
    /// Failures; at most one, since a failure stops the run
    pub failures: Vec<ChunkFailure>,
}

impl ReindexReport {
    /// Whether every enumerated record was committed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rewrites keyword fields for whole scopes.
///
/// Writes are `Update`s of freshly read records. A record edited between
/// that read and the chunk's commit is overwritten with the version read;
/// one deleted in that window fails the chunk with `NotFound`.
#[derive(Debug, Clone)]
pub struct BatchReindexer {
    writer: IndexWriter,
    chunk_size: usize,
    retry: RetryConfig,
}

type Chunk = RecdexResult<Vec<RecordId>>;

impl BatchReindexer {
    /// Create a reindexer; `chunk_size` is clamped to the store's batch limit
    pub fn new(writer: IndexWriter, chunk_size: usize, retry: RetryConfig) -> Self {
        BatchReindexer {
            writer,
            chunk_size,
            retry,
        }
    }

    /// Records per chunk actually used
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size
            .min(self.writer.store().max_batch_size())
            .max(1)
    }

    /// Reindex `scope`
    pub fn reindex_all(&self, scope: &ScopeId) -> RecdexResult<ReindexReport> {
        self.reindex_all_with_progress(scope, |_| {})
    }

    /// Reindex `scope`, calling `on_progress` after every committed chunk.
    ///
    /// # Errors
    ///
    /// Only if the scope cannot be counted. Failures after that are
    /// reported in [`ReindexReport::failures`].
    pub fn reindex_all_with_progress<F>(
        &self,
        scope: &ScopeId,
        mut on_progress: F,
    ) -> RecdexResult<ReindexReport>
    where
        F: FnMut(ReindexProgress),
    {
        let total = self.writer.store().count(scope)?;
        let chunk_size = self.effective_chunk_size();
        info!(
            target: "recdex::reindex",
            scope = %scope,
            total,
            chunk_size,
            "Reindex started"
        );

        let (tx, rx) = sync_channel::<Chunk>(1);
        let stop = AtomicBool::new(false);
        let report = thread::scope(|s| {
            let writer = &self.writer;
            let stop = &stop;
            s.spawn(move || produce(writer, scope, chunk_size, tx, stop));
            self.consume(scope, total, rx, &mut on_progress, stop)
        });

        if report.is_complete() {
            info!(
                target: "recdex::reindex",
                scope = %scope,
                processed = report.processed,
                chunks = report.chunks_committed,
                "Reindex finished"
            );
        } else {
            warn!(
                target: "recdex::reindex",
                scope = %scope,
                processed = report.processed,
                total,
                "Reindex stopped after a failed chunk"
            );
        }
        Ok(report)
    }

    // Takes `rx` by value so the channel closes on return, unblocking the
    // producer before the scope joins it.
    fn consume<F>(
        &self,
        scope: &ScopeId,
        total: usize,
        rx: Receiver<Chunk>,
        on_progress: &mut F,
        stop: &AtomicBool,
    ) -> ReindexReport
    where
        F: FnMut(ReindexProgress),
    {
        let mut report = ReindexReport {
            scope: scope.clone(),
            processed: 0,
            total,
            chunks_committed: 0,
            failures: Vec::new(),
        };

        for (chunk, staged) in rx.iter().enumerate() {
            let ids = match staged {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(target: "recdex::reindex", chunk, error = %e, "Enumeration failed");
                    report.failures.push(ChunkFailure {
                        chunk,
                        first_id: None,
                        records: 0,
                        attempts: 0,
                        error: e.to_string(),
                    });
                    break;
                }
            };

            match self.commit_chunk(scope, chunk, &ids) {
                Ok(0) => {
                    debug!(target: "recdex::reindex", chunk, "Chunk records all deleted");
                }
                Ok(records) => {
                    report.processed += records;
                    report.chunks_committed += 1;
                    report.total = report.total.max(report.processed);
                    debug!(
                        target: "recdex::reindex",
                        chunk,
                        records,
                        processed = report.processed,
                        "Chunk committed"
                    );
                    on_progress(ReindexProgress {
                        processed: report.processed,
                        total: report.total,
                    });
                }
                Err(failure) => {
                    report.failures.push(ChunkFailure {
                        first_id: ids.first().cloned(),
                        ..failure
                    });
                    break;
                }
            }
        }

        stop.store(true, Ordering::SeqCst);
        report
    }

    /// Current versions of `ids` with fresh keyword fields; deleted ones
    /// are left out
    fn stage_updates(&self, scope: &ScopeId, ids: &[RecordId]) -> RecdexResult<Vec<WriteOp>> {
        let store = self.writer.store();
        let mut ops = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(doc) = store.get(scope, id)? {
                ops.push(WriteOp::Update(self.writer.prepare(doc)));
            }
        }
        Ok(ops)
    }

    /// Write one chunk, retrying retryable errors; returns records written
    fn commit_chunk(
        &self,
        scope: &ScopeId,
        chunk: usize,
        ids: &[RecordId],
    ) -> Result<usize, ChunkFailure> {
        let store = self.writer.store();
        let mut attempt = 0;
        loop {
            let result = self.stage_updates(scope, ids).and_then(|ops| {
                let records = ops.len();
                if records > 0 {
                    store.batch_write(ops)?;
                }
                Ok(records)
            });
            match result {
                Ok(records) => return Ok(records),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.calculate_delay(attempt);
                    debug!(
                        target: "recdex::reindex",
                        chunk,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying chunk"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        target: "recdex::reindex",
                        chunk,
                        attempts = attempt + 1,
                        error = %e,
                        "Chunk commit failed"
                    );
                    return Err(ChunkFailure {
                        chunk,
                        first_id: None,
                        records: ids.len(),
                        attempts: attempt + 1,
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Enumerate the ids of `scope`, one chunk per page, until the scan ends,
/// the consumer hangs up or `stop` is raised.
fn produce(
    writer: &IndexWriter,
    scope: &ScopeId,
    chunk_size: usize,
    tx: SyncSender<Chunk>,
    stop: &AtomicBool,
) {
    let order = OrderBy::asc(ID_FIELD);
    let mut after: Option<StartAfter> = None;
    while !stop.load(Ordering::SeqCst) {
        let mut query = StoreQuery::new(scope.clone(), order.clone(), chunk_size);
        query.start_after = after.take();

        let page = match writer.store().query(&query) {
            Ok(page) => page,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        };
        let last_page = page.len() < chunk_size;
        after = page.last().map(|last| StartAfter {
            sort_value: order.sort_value(last),
            id: last.id.clone(),
        });

        if !page.is_empty() {
            let ids = page.into_iter().map(|doc| doc.id).collect();
            if tx.send(Ok(ids)).is_err() {
                return;
            }
        }
        if last_page {
            return;
        }
    }
}
