//! Caller-side pagination state
//!
//! A `SearchSession` accumulates the pages of ONE request. Requests are not
//! cancellable, so responses to an earlier request can arrive after the
//! user already changed the term; `apply` drops those by signature.

use std::collections::HashSet;

use recdex_core::{Document, RecdexResult, RecordId};
use tracing::debug;

use super::cursor::{Cursor, Signature};
use super::pager::PageResult;
use super::planner::SearchSpec;

/// Accumulated results of the active request
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    signature: Option<Signature>,
    records: Vec<Document>,
    seen: HashSet<RecordId>,
    cursor: Option<Cursor>,
    exhausted: bool,
    pages: usize,
}

impl SearchSession {
    /// Session with no active request
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `spec` the active request.
    ///
    /// Returns `true` when the request changed and the accumulated state was
    /// reset; the caller should then fetch the first page.
    pub fn begin(&mut self, spec: &SearchSpec) -> RecdexResult<bool> {
        let signature = spec.signature()?;
        if self.signature.as_ref() == Some(&signature) {
            return Ok(false);
        }
        *self = SearchSession {
            signature: Some(signature),
            ..Self::default()
        };
        Ok(true)
    }

    /// Whether `result` answers the active request
    pub fn is_current(&self, result: &PageResult) -> bool {
        self.signature.as_ref() == Some(&result.signature)
    }

    /// Append a page. Returns `false` (and changes nothing) for a stale page.
    ///
    /// Records already accumulated are skipped, so applying the same page
    /// twice is harmless.
    pub fn apply(&mut self, result: PageResult) -> bool {
        if !self.is_current(&result) {
            debug!(
                target: "recdex::search",
                page = %result.signature,
                active = ?self.signature.as_ref().map(Signature::as_str),
                "Discarding stale page"
            );
            return false;
        }
        for doc in result.records {
            if self.seen.insert(doc.id.clone()) {
                self.records.push(doc);
            }
        }
        self.cursor = result.cursor;
        self.exhausted = result.exhausted;
        self.pages += 1;
        true
    }

    /// Accumulated visible records
    pub fn records(&self) -> &[Document] {
        &self.records
    }

    /// Cursor for the next `load_more`, `None` before the first page or
    /// once exhausted
    pub fn next_cursor(&self) -> Option<&Cursor> {
        if self.exhausted {
            None
        } else {
            self.cursor.as_ref()
        }
    }

    /// Whether the stream has ended
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Pages applied since the last reset
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Active request signature
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Whether fewer than `min_visible` records are showing and more can be
    /// fetched. Refinement can leave pages short, so callers filling a view
    /// keep calling `load_more` while this holds.
    pub fn needs_backfill(&self, min_visible: usize) -> bool {
        self.records.len() < min_visible && self.next_cursor().is_some()
    }
}
