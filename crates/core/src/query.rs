//! Store query types
//!
//! A `StoreQuery` is the exact shape the document store can execute:
//! - equality predicates on any number of fields
//! - at most one array-membership predicate
//! - at most one numeric range predicate, on the order-by field only,
//!   and never together with array membership
//! - one order-by (ties broken by record id in the same direction)
//! - a limit and an optional start-after position
//!
//! Anything richer is the planner's problem, not the store's.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::document::Document;
use crate::types::{RecordId, ScopeId};
use crate::value::Value;

/// Pseudo field that orders by record id
pub const ID_FIELD: &str = "__id__";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    /// Apply the direction to an ascending comparison
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Single order-by clause
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field path, or [`ID_FIELD`]
    pub field: String,
    /// Direction
    pub direction: SortDirection,
}

impl OrderBy {
    /// Ascending order on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Descending order on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Sort key of a document for this clause.
    ///
    /// Missing fields sort as `Null`.
    pub fn sort_value(&self, doc: &Document) -> Value {
        if self.field == ID_FIELD {
            return Value::String(doc.id.as_str().to_string());
        }
        doc.get(&self.field).cloned().unwrap_or(Value::Null)
    }

    /// Compare two `(sort value, id)` keys in this clause's direction
    pub fn compare_keys(&self, a: (&Value, &RecordId), b: (&Value, &RecordId)) -> Ordering {
        let ord = a.0.sort_cmp(b.0).then_with(|| a.1.cmp(b.1));
        self.direction.apply(ord)
    }

    /// Compare two documents in this clause's direction
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let va = self.sort_value(a);
        let vb = self.sort_value(b);
        self.compare_keys((&va, &a.id), (&vb, &b.id))
    }
}

/// Field equals value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualityFilter {
    /// Field path
    pub field: String,
    /// Required value
    pub value: Value,
}

impl EqualityFilter {
    /// Create an equality filter
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        EqualityFilter {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the document satisfies the filter
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Array field contains string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayContains {
    /// Array field path
    pub field: String,
    /// Required element
    pub value: String,
}

impl ArrayContains {
    /// Create a membership predicate
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        ArrayContains {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the document satisfies the predicate
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field)
            .map(|v| v.array_contains_str(&self.value))
            .unwrap_or(false)
    }
}

/// One end of a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBound {
    /// Bound value
    pub value: f64,
    /// Whether the bound itself is included
    pub inclusive: bool,
}

/// Numeric range on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Field path
    pub field: String,
    /// Lower bound, if any
    pub lower: Option<RangeBound>,
    /// Upper bound, if any
    pub upper: Option<RangeBound>,
}

impl RangeFilter {
    /// Unbounded range on `field`; narrow it with the builder methods
    pub fn new(field: impl Into<String>) -> Self {
        RangeFilter {
            field: field.into(),
            lower: None,
            upper: None,
        }
    }

    /// Builder: `field >= value`
    pub fn at_least(mut self, value: f64) -> Self {
        self.lower = Some(RangeBound {
            value,
            inclusive: true,
        });
        self
    }

    /// Builder: `field > value`
    pub fn greater_than(mut self, value: f64) -> Self {
        self.lower = Some(RangeBound {
            value,
            inclusive: false,
        });
        self
    }

    /// Builder: `field <= value`
    pub fn at_most(mut self, value: f64) -> Self {
        self.upper = Some(RangeBound {
            value,
            inclusive: true,
        });
        self
    }

    /// Builder: `field < value`
    pub fn less_than(mut self, value: f64) -> Self {
        self.upper = Some(RangeBound {
            value,
            inclusive: false,
        });
        self
    }

    /// Whether a number lies inside the range
    pub fn contains(&self, n: f64) -> bool {
        let above = match self.lower {
            Some(b) if b.inclusive => n >= b.value,
            Some(b) => n > b.value,
            None => true,
        };
        let below = match self.upper {
            Some(b) if b.inclusive => n <= b.value,
            Some(b) => n < b.value,
            None => true,
        };
        above && below
    }

    /// Whether the document's field is numeric and inside the range.
    ///
    /// Non-numeric or missing fields never match.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field)
            .and_then(Value::as_number)
            .map(|n| self.contains(n))
            .unwrap_or(false)
    }
}

/// Position to resume after: the last record of the previous page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartAfter {
    /// Sort key value of the last record
    pub sort_value: Value,
    /// Id of the last record (tie-breaker)
    pub id: RecordId,
}

/// A query the store executes as-is
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    /// Scope to search in
    pub scope: ScopeId,
    /// Equality predicates (all must hold)
    pub equals: Vec<EqualityFilter>,
    /// Optional array-membership predicate
    pub array_contains: Option<ArrayContains>,
    /// Optional range on the order-by field
    pub range: Option<RangeFilter>,
    /// Order
    pub order_by: OrderBy,
    /// Maximum records returned
    pub limit: usize,
    /// Resume position
    pub start_after: Option<StartAfter>,
}

impl StoreQuery {
    /// Ordered scan of a scope
    pub fn new(scope: ScopeId, order_by: OrderBy, limit: usize) -> Self {
        StoreQuery {
            scope,
            equals: Vec::new(),
            array_contains: None,
            range: None,
            order_by,
            limit,
            start_after: None,
        }
    }

    /// Builder: add an equality predicate
    pub fn with_equals(mut self, filter: EqualityFilter) -> Self {
        self.equals.push(filter);
        self
    }

    /// Builder: set the membership predicate
    pub fn with_array_contains(mut self, predicate: ArrayContains) -> Self {
        self.array_contains = Some(predicate);
        self
    }

    /// Builder: set the range predicate
    pub fn with_range(mut self, range: RangeFilter) -> Self {
        self.range = Some(range);
        self
    }

    /// Builder: resume after a position
    pub fn with_start_after(mut self, start_after: StartAfter) -> Self {
        self.start_after = Some(start_after);
        self
    }

    /// Whether a document satisfies every predicate (ignores order and limit)
    pub fn matches(&self, doc: &Document) -> bool {
        doc.scope == self.scope
            && self.equals.iter().all(|f| f.matches(doc))
            && self.array_contains.as_ref().map_or(true, |p| p.matches(doc))
            && self.range.as_ref().map_or(true, |r| r.matches(doc))
    }

    /// Whether a document sorts strictly after the start-after position
    pub fn is_after_start(&self, doc: &Document) -> bool {
        match &self.start_after {
            None => true,
            Some(start) => {
                let value = self.order_by.sort_value(doc);
                self.order_by
                    .compare_keys((&value, &doc.id), (&start.sort_value, &start.id))
                    == Ordering::Greater
            }
        }
    }
}
