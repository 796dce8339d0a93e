//! # Filtering, Search & Sorting
//!
//! Translates the clauses of a [`TableQuery`](crate::query::TableQuery) into
//! `sea_query` expressions.
//!
//! ## Column paths
//!
//! - `title` compares the column on the root table directly.
//! - `author.name` compares `name` inside an `EXISTS` subquery over the
//!   `author` relation, so the root rows are constrained without joining
//!   related rows into the result.
//!
//! ## Predicates
//!
//! ```text
//! {"column": "status", "value": "draft"}                                   status = 'draft'
//! {"column": "status", "values": ["draft", "review"]}                      status IN ('draft', 'review')
//! {"column": "views", "values": [10, 100], "modifiers": {"range": true}}   views BETWEEN 10 AND 100
//! {"column": "author.name", "value": "Jane"}                               EXISTS (SELECT 1 FROM authors ... AND name = 'Jane')
//! ```
//!
//! Search terms become `UPPER(column) LIKE '%TERM%'` predicates joined with
//! `OR`; LIKE wildcards inside the term are escaped.
//!
//! Sorting on a relational path orders by `MIN(attribute)` (ascending) or
//! `MAX(attribute)` (descending) over the related rows.

pub mod conditions;
pub mod relations;
pub mod search;
pub mod sort;

// Re-export commonly used items
pub use conditions::{apply_filters, filter_expr, json_to_value};
pub use relations::{related_aggregate, related_count, where_has};
pub use search::{build_like_condition, build_search_condition};
pub use sort::build_order_expr;
