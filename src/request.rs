use std::marker::PhantomData;

use sea_orm::ConnectionTrait;
use serde_json::Value as JsonValue;

use crate::core::TableResource;
use crate::errors::TableError;
use crate::execution;
use crate::models::{ColumnSpec, FilterSpec, FilterValue, SortSpec, TableParams};
use crate::pagination::Page;
use crate::query::{Projection, SortDirection, TableQuery};

/// A data-table request bound to a resource.
///
/// Construction applies every parameter to the query right away: filters,
/// then sorts, then the search group, then the projection. Afterwards the
/// wrapped [`TableQuery`] can be inspected, extended or paginated.
///
/// ```rust,ignore
/// let request = TableRequest::<PostTable>::from_query(
///     TableQuery::new().filter(post::Column::Published.eq(true)),
///     params,
/// )
/// .with_count(["comments"]);
///
/// let page = request.paginated(&db).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TableRequest<R: TableResource> {
    query: TableQuery,
    page: u64,
    per_page: u64,
    _resource: PhantomData<fn() -> R>,
}

impl<R: TableResource> TableRequest<R> {
    #[must_use]
    pub fn new(params: TableParams) -> Self {
        Self::from_query(TableQuery::new(), params)
    }

    /// Apply `params` on top of a query that already carries host-side
    /// constraints and eager loads.
    #[must_use]
    pub fn from_query(base: TableQuery, params: TableParams) -> Self {
        let TableParams {
            columns,
            filters,
            sorting,
            search,
            per_page,
            page,
        } = params;

        let query = filter_columns::<R>(base, &filters, &columns);
        let query = sort_columns::<R>(query, &sorting, &columns);

        let (searchable, relations) = search_columns(&columns);
        let query = query
            .add_search_clause(&search, &searchable)
            .with(relations);

        let query = query.project(extract_column_names(&columns));

        Self {
            query,
            page: page.filter(|page| *page > 0).unwrap_or(1),
            per_page: R::resolve_per_page(per_page),
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub const fn query(&self) -> &TableQuery {
        &self.query
    }

    #[must_use]
    pub fn into_query(self) -> TableQuery {
        self.query
    }

    /// Extend the wrapped query.
    #[must_use]
    pub fn map_query<F>(mut self, f: F) -> Self
    where
        F: FnOnce(TableQuery) -> TableQuery,
    {
        self.query = f(self.query);
        self
    }

    /// Attach a `<relation>_count` column for each relation without loading
    /// the related rows.
    #[must_use]
    pub fn with_count<I, S>(self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.map_query(|query| {
            relations
                .into_iter()
                .fold(query, |query, relation| query.add_count(relation.as_ref()))
        })
    }

    /// 1-based page number
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Count and fetch the requested page.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::QueryExecution`] when the query cannot be built
    /// or the database rejects it.
    pub async fn paginated<C: ConnectionTrait>(&self, db: &C) -> Result<Page<JsonValue>, TableError> {
        Ok(execution::paginate::<R, C>(db, &self.query, self.page, self.per_page).await?)
    }
}

/// Explicit filters first, then the filters carried by columns.
fn filter_columns<R: TableResource>(
    query: TableQuery,
    filters: &[FilterSpec],
    columns: &[ColumnSpec],
) -> TableQuery {
    filters
        .iter()
        .cloned()
        .chain(columns.iter().filter_map(ColumnSpec::filter_spec))
        .fold(query, |query, spec| match spec.value {
            Some(FilterValue::List(values)) if spec.modifiers.range => match values.as_slice() {
                [lower, upper, ..] => query.add_range_filter(&spec.column, lower.clone(), upper.clone()),
                _ => {
                    tracing::debug!(
                        resource = R::RESOURCE_NAME,
                        column = %spec.column,
                        "Skipping range filter with fewer than two values"
                    );
                    query
                }
            },
            Some(FilterValue::List(values)) => query.add_set_filter(&spec.column, values),
            Some(FilterValue::Scalar(value)) => query.add_equality_filter(&spec.column, value),
            None => {
                tracing::debug!(
                    resource = R::RESOURCE_NAME,
                    column = %spec.column,
                    "Skipping filter without a value"
                );
                query
            }
        })
}

/// Explicit sort directives first, then the directions carried by columns.
fn sort_columns<R: TableResource>(
    query: TableQuery,
    sorting: &[SortSpec],
    columns: &[ColumnSpec],
) -> TableQuery {
    sorting
        .iter()
        .cloned()
        .chain(columns.iter().filter_map(ColumnSpec::sort_spec))
        .fold(query, |query, spec| {
            let column = spec.column.as_deref().filter(|column| !column.is_empty());
            let direction = spec.direction.as_deref().and_then(SortDirection::parse);
            match (column, direction) {
                (Some(column), Some(direction)) => query.add_sort(column, direction),
                _ => {
                    tracing::debug!(
                        resource = R::RESOURCE_NAME,
                        column = ?spec.column,
                        direction = ?spec.direction,
                        "Skipping invalid sort directive"
                    );
                    query
                }
            }
        })
}

/// Searchable column paths, and the relations their dotted paths traverse.
fn search_columns(columns: &[ColumnSpec]) -> (Vec<String>, Vec<String>) {
    let mut searchable = Vec::new();
    let mut relations: Vec<String> = Vec::new();

    for column in columns.iter().filter(|column| column.searchable) {
        if let Some((relation, _)) = column.name.rsplit_once('.')
            && !relations.iter().any(|known| known == relation)
        {
            relations.push(relation.to_string());
        }
        searchable.push(column.name.clone());
    }

    (searchable, relations)
}

/// Non-dotted column names in order, without duplicates. No names means
/// every column.
fn extract_column_names(columns: &[ColumnSpec]) -> Projection {
    let mut names: Vec<String> = Vec::new();
    for column in columns.iter().filter(|column| !column.name.contains('.')) {
        if !names.contains(&column.name) {
            names.push(column.name.clone());
        }
    }

    if names.is_empty() {
        Projection::All
    } else {
        Projection::Columns(names)
    }
}
