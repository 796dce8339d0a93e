use axum::{
    Json,
    extract::{Query, State},
    http::header::HeaderMap,
};
use sea_orm::DatabaseConnection;
use serde_json::Value as JsonValue;

use crate::core::TableResource;
use crate::errors::TableError;
use crate::models::{TableParams, TableQueryParams};
use crate::pagination::Page;
use crate::request::TableRequest;

/// List a resource as a data-table page, reading JSON-encoded parameters
/// from the query string.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/posts", get(table_index::<PostTable>).post(table_search::<PostTable>))
///     .with_state(db);
/// ```
///
/// # Errors
///
/// Returns [`TableError::QueryExecution`] when the query fails.
pub async fn table_index<R: TableResource>(
    Query(params): Query<TableQueryParams>,
    State(db): State<DatabaseConnection>,
) -> Result<(HeaderMap, Json<Page<JsonValue>>), TableError> {
    respond::<R>(&db, params.into()).await
}

/// Same as [`table_index`], with the parameters in a JSON body.
///
/// # Errors
///
/// Returns [`TableError::QueryExecution`] when the query fails.
pub async fn table_search<R: TableResource>(
    State(db): State<DatabaseConnection>,
    Json(params): Json<TableParams>,
) -> Result<(HeaderMap, Json<Page<JsonValue>>), TableError> {
    respond::<R>(&db, params).await
}

async fn respond<R: TableResource>(
    db: &DatabaseConnection,
    params: TableParams,
) -> Result<(HeaderMap, Json<Page<JsonValue>>), TableError> {
    let request = TableRequest::<R>::from_query(R::base_query(), params);
    let page = request.paginated(db).await?;
    let headers = page.content_range(R::RESOURCE_NAME);
    Ok((headers, Json(page)))
}
