//! Paginated search execution
//!
//! Each call plans the request, fetches exactly one page of raw records from
//! the store, refines it client-side and derives the next cursor from the
//! last RAW record. Refinement can shrink a page, even to zero records,
//! without ending the stream: only a short raw fetch means exhaustion.

use std::sync::Arc;

use recdex_core::{Document, RecdexResult};
use recdex_storage::DocumentStore;
use tracing::debug;

use super::cursor::{Cursor, Signature};
use super::planner::{QueryPlan, QueryPlanner, SearchSpec};
use super::refine::refine;

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Visible records, after refinement, in store order
    pub records: Vec<Document>,
    /// Continuation, `None` once exhausted
    pub cursor: Option<Cursor>,
    /// Whether the store has no further records for this request
    pub exhausted: bool,
    /// Raw records fetched before refinement
    pub fetched: usize,
    /// Signature of the request that produced the page
    pub signature: Signature,
}

/// Executes [`SearchSpec`]s page by page
#[derive(Clone)]
pub struct Paginator {
    store: Arc<dyn DocumentStore>,
    planner: QueryPlanner,
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("planner", &self.planner)
            .finish_non_exhaustive()
    }
}

impl Paginator {
    /// Create a paginator over `store`
    pub fn new(store: Arc<dyn DocumentStore>, planner: QueryPlanner) -> Self {
        Paginator { store, planner }
    }

    /// Planner in use
    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// First page of `spec`
    pub fn query(&self, spec: &SearchSpec) -> RecdexResult<PageResult> {
        let plan = self.planner.plan(spec)?;
        self.fetch(plan, None)
    }

    /// Page following `cursor`.
    ///
    /// # Errors
    ///
    /// `CursorMismatch` if `spec` is not the request the cursor came from;
    /// the caller must restart with [`query`](Self::query).
    pub fn load_more(&self, cursor: &Cursor, spec: &SearchSpec) -> RecdexResult<PageResult> {
        let plan = self.planner.plan(spec)?;
        cursor.ensure_matches(&plan.signature)?;
        self.fetch(plan, Some(cursor))
    }

    fn fetch(&self, plan: QueryPlan, after: Option<&Cursor>) -> RecdexResult<PageResult> {
        let page_size = plan.page_size();
        let mut store_query = plan.store_query;
        if let Some(cursor) = after {
            store_query.start_after = Some(cursor.start_after());
        }

        let raw = self.store.query(&store_query)?;
        let fetched = raw.len();
        let exhausted = fetched < page_size;
        let cursor = match raw.last() {
            Some(last) if !exhausted => Some(Cursor::after(
                last,
                &store_query.order_by,
                plan.signature.clone(),
            )),
            _ => None,
        };
        let records = if plan.refinement.is_empty() {
            raw
        } else {
            refine(&raw, &plan.refinement)
        };

        debug!(
            target: "recdex::search",
            signature = %plan.signature,
            resumed = after.is_some(),
            fetched,
            visible = records.len(),
            exhausted,
            "Fetched page"
        );

        Ok(PageResult {
            records,
            cursor,
            exhausted,
            fetched,
            signature: plan.signature,
        })
    }
}
