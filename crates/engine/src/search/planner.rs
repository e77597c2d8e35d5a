//! Query planner
//!
//! Translates a caller's [`SearchSpec`] into what the store can execute plus
//! what must be checked client-side:
//!
//! | Request part          | Store                           | Client-side   |
//! |-----------------------|---------------------------------|---------------|
//! | term shorter than MIN | (ordered scan)                  |               |
//! | first long token      | `keywords_<locale>` contains it |               |
//! | further long tokens   |                                 | keyword check |
//! | equality filters      | all of them                     |               |
//! | range on sort field   | when no membership predicate    | otherwise     |
//! | range on other field  |                                 | always        |
//!
//! A term never produces an empty result just because it is short: below
//! MIN the request degrades to an ordered listing.

use serde::Serialize;
use tracing::debug;

use recdex_core::{
    ArrayContains, EqualityFilter, Locale, OrderBy, RangeFilter, RecdexError, RecdexResult,
    ScopeId, SortDirection, StoreQuery, Value, ID_FIELD,
};

use super::cursor::Signature;
use super::prefix::char_len;
use super::refine::RefinementSpec;
use super::tokenizer::tokenize_unique;
use crate::config::SearchConfig;

/// A caller's search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpec {
    /// Scope searched
    pub scope: ScopeId,
    /// Locale whose keyword field is matched
    pub locale: Locale,
    /// Raw search term as typed
    pub term: String,
    /// Equality filters (all must hold)
    pub equals: Vec<EqualityFilter>,
    /// Optional numeric range
    pub range: Option<RangeFilter>,
    /// Sort order, ties broken by record id
    pub sort: OrderBy,
    /// Page size, or the configured default
    pub page_size: Option<usize>,
}

impl SearchSpec {
    /// Unfiltered listing of `scope` ordered by record id
    pub fn new(scope: impl Into<ScopeId>, locale: Locale) -> Self {
        SearchSpec {
            scope: scope.into(),
            locale,
            term: String::new(),
            equals: Vec::new(),
            range: None,
            sort: OrderBy::asc(ID_FIELD),
            page_size: None,
        }
    }

    /// Builder: set the search term
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Builder: require `field == value`
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push(EqualityFilter::new(field, value));
        self
    }

    /// Builder: set the numeric range
    pub fn range(mut self, range: RangeFilter) -> Self {
        self.range = Some(range);
        self
    }

    /// Builder: set the sort order
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = OrderBy {
            field: field.into(),
            direction,
        };
        self
    }

    /// Builder: set the page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Normalized term tokens, in order of first appearance
    pub fn term_tokens(&self) -> Vec<String> {
        tokenize_unique(&self.term)
    }

    /// Fingerprint of everything that determines the result stream.
    ///
    /// The page size is excluded: it changes how the stream is cut into
    /// pages, not which records it yields or in which order.
    pub fn signature(&self) -> RecdexResult<Signature> {
        let mut equals: Vec<(&str, String)> = self
            .equals
            .iter()
            .map(|f| -> RecdexResult<(&str, String)> {
                Ok((f.field.as_str(), serde_json::to_string(&f.value)?))
            })
            .collect::<RecdexResult<_>>()?;
        equals.sort();

        let body = SignatureBody {
            scope: self.scope.as_str(),
            locale: self.locale,
            term: self.term_tokens(),
            equals,
            range: self.range.as_ref(),
            sort: &self.sort,
        };
        Ok(Signature::from_bytes(&serde_json::to_vec(&body)?))
    }
}

#[derive(Serialize)]
struct SignatureBody<'a> {
    scope: &'a str,
    locale: Locale,
    term: Vec<String>,
    equals: Vec<(&'a str, String)>,
    range: Option<&'a RangeFilter>,
    sort: &'a OrderBy,
}

/// Store query plus client-side work for one request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// What the store executes (without a start-after position)
    pub store_query: StoreQuery,
    /// What is checked on every fetched page
    pub refinement: RefinementSpec,
    /// Request fingerprint
    pub signature: Signature,
}

impl QueryPlan {
    /// Resolved page size
    pub fn page_size(&self) -> usize {
        self.store_query.limit
    }
}

/// Builds [`QueryPlan`]s; stateless between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPlanner {
    min_prefix_len: usize,
    default_page_size: usize,
    max_page_size: usize,
}

impl QueryPlanner {
    /// Create a planner
    pub fn new(min_prefix_len: usize, default_page_size: usize, max_page_size: usize) -> Self {
        QueryPlanner {
            min_prefix_len,
            default_page_size,
            max_page_size,
        }
    }

    /// Planner using the limits of `config`
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.min_prefix_len,
            config.default_page_size,
            config.max_page_size,
        )
    }

    /// Plan `spec`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the page size is outside `1..=max_page_size`.
    pub fn plan(&self, spec: &SearchSpec) -> RecdexResult<QueryPlan> {
        let page_size = spec.page_size.unwrap_or(self.default_page_size);
        if page_size == 0 || page_size > self.max_page_size {
            return Err(RecdexError::invalid_input(format!(
                "page_size must be in 1..={}, got {}",
                self.max_page_size, page_size
            )));
        }

        let mut store_query = StoreQuery::new(spec.scope.clone(), spec.sort.clone(), page_size);
        store_query.equals = spec.equals.clone();
        let mut refinement = RefinementSpec::new(spec.locale);

        if char_len(spec.term.trim()) >= self.min_prefix_len {
            let mut long_tokens = spec
                .term_tokens()
                .into_iter()
                .filter(|t| char_len(t) >= self.min_prefix_len);
            if let Some(first) = long_tokens.next() {
                store_query.array_contains =
                    Some(ArrayContains::new(spec.locale.keyword_field(), first));
            }
            refinement.required_keywords.extend(long_tokens);
        }

        if let Some(range) = &spec.range {
            if store_query.array_contains.is_none() && range.field == spec.sort.field {
                store_query.range = Some(range.clone());
            } else {
                refinement.range = Some(range.clone());
            }
        }

        let signature = spec.signature()?;
        debug!(
            target: "recdex::search",
            scope = %spec.scope,
            locale = %spec.locale,
            signature = %signature,
            membership = ?store_query.array_contains.as_ref().map(|p| p.value.as_str()),
            store_range = store_query.range.is_some(),
            deferred_range = refinement.range.is_some(),
            extra_keywords = refinement.required_keywords.len(),
            page_size,
            "Planned search"
        );

        Ok(QueryPlan {
            store_query,
            refinement,
            signature,
        })
    }
}
