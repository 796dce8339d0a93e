use sea_orm::{EntityName, EntityTrait};

use super::relations::RelationLink;
use crate::query::TableQuery;

/// Page length used when a request does not carry a usable `perPage`.
pub const DEFAULT_PER_PAGE: u64 = 15;

/// Largest value that binds as a SQL `LIMIT`/`OFFSET` (a signed 64-bit integer).
pub const MAX_SQL_INTEGER: u64 = i64::MAX.unsigned_abs();

/// Binds table requests to a Sea-ORM entity.
///
/// Implementors describe the relations that dotted column paths
/// (`author.name`, `author.profile.city`) may traverse and may tune the
/// page size limits. Everything else is read from the request.
///
/// ```rust,ignore
/// pub struct PostTable;
///
/// impl TableResource for PostTable {
///     type EntityType = post::Entity;
///     const RESOURCE_NAME: &'static str = "posts";
///
///     fn relations() -> Vec<RelationLink> {
///         vec![RelationLink::has_many("comments", "comments", "id", "post_id")]
///     }
///
///     fn max_per_page() -> Option<u64> {
///         Some(100)
///     }
/// }
/// ```
pub trait TableResource: Send + Sync + 'static {
    type EntityType: EntityTrait + Sync;

    /// Name used in log records and error messages.
    const RESOURCE_NAME: &'static str;

    /// Relations reachable from the root entity.
    #[must_use]
    fn relations() -> Vec<RelationLink> {
        Vec::new()
    }

    /// Query every request for this resource starts from. Host-side
    /// constraints, eager loads and relation counts registered here are
    /// applied before the request parameters.
    #[must_use]
    fn base_query() -> TableQuery {
        TableQuery::new()
    }

    #[must_use]
    fn default_per_page() -> u64 {
        DEFAULT_PER_PAGE
    }

    /// Upper bound applied to the requested page size. `None` leaves it unbounded.
    #[must_use]
    fn max_per_page() -> Option<u64> {
        None
    }

    #[must_use]
    fn table_name() -> String {
        Self::EntityType::default().table_name().to_owned()
    }

    /// Resolve the page size for a request, falling back to
    /// [`default_per_page`](Self::default_per_page) for missing or zero values.
    /// The result never exceeds [`MAX_SQL_INTEGER`].
    #[must_use]
    fn resolve_per_page(requested: Option<u64>) -> u64 {
        let per_page = requested
            .filter(|size| *size > 0)
            .unwrap_or_else(Self::default_per_page)
            .clamp(1, MAX_SQL_INTEGER);
        match Self::max_per_page() {
            Some(max) => per_page.min(max.max(1)),
            None => per_page,
        }
    }
}
