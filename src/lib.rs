//! # tablecrate
//!
//! Turns the parameters a data-table component sends (column definitions,
//! filters, sort directives, a free-text search term and a page size) into a
//! Sea-ORM query, runs it through Sea-ORM's paginator and returns a
//! [`Page`] of JSON rows.
//!
//! ```rust,ignore
//! use tablecrate::{TableParams, TableRequest, TableResource, RelationLink};
//!
//! pub struct PostTable;
//!
//! impl TableResource for PostTable {
//!     type EntityType = post::Entity;
//!     const RESOURCE_NAME: &'static str = "posts";
//!
//!     fn relations() -> Vec<RelationLink> {
//!         vec![
//!             RelationLink::belongs_to("author", "authors", "author_id", "id"),
//!             RelationLink::has_many("comments", "comments", "id", "post_id"),
//!         ]
//!     }
//! }
//!
//! async fn list(db: &DatabaseConnection, params: TableParams) -> Result<Page<JsonValue>, TableError> {
//!     TableRequest::<PostTable>::new(params)
//!         .with_count(["comments"])
//!         .paginated(db)
//!         .await
//! }
//! ```

pub mod core;
pub mod errors;
pub mod execution;
pub mod filtering;
pub mod models;
pub mod pagination;
pub mod query;
pub mod request;
pub mod routes;

pub use crate::core::{RelationKind, RelationLink, TableResource};
pub use errors::TableError;
pub use models::{ColumnSpec, FilterSpec, FilterValue, Modifiers, SortSpec, TableParams, TableQueryParams};
pub use pagination::Page;
pub use query::{ColumnPath, FilterClause, FilterPredicate, Projection, SearchClause, SortClause, SortDirection, TableQuery};
pub use request::TableRequest;
pub use routes::{table_index, table_search};
