//! # Error Handling
//!
//! Request parameters are parsed permissively: anything that cannot be
//! understood falls back to a default or is skipped. The only failure a
//! table request reports is a failed query, [`TableError::QueryExecution`],
//! which wraps the `DbErr` raised while building or running it (an unknown
//! relation, an unknown column, a lost connection).
//!
//! As an Axum response the error becomes `500 Internal Server Error` with a
//! sanitized body. The underlying `DbErr` is logged through `tracing` and
//! never sent to the client:
//!
//! ```json
//! {"error": "A database error occurred"}
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum TableError {
    /// The query could not be built or executed (details logged, not exposed)
    QueryExecution(DbErr),
}

impl TableError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::QueryExecution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message, free of database details
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::QueryExecution(_) => "A database error occurred".to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::QueryExecution(internal) => {
                tracing::error!(error = ?internal, "Table query failed");
            }
        }
    }
}

/// Error body sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for TableError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryExecution(err) => write!(f, "table query failed: {err}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::QueryExecution(err) => Some(err),
        }
    }
}

impl From<DbErr> for TableError {
    fn from(err: DbErr) -> Self {
        Self::QueryExecution(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_db_errors_convert_to_query_execution() {
        let err: TableError = DbErr::Custom("no such column: bogus".to_string()).into();
        assert!(matches!(err, TableError::QueryExecution(DbErr::Custom(_))));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_user_message_hides_database_details() {
        let err = TableError::from(DbErr::Custom("no such column: secret_column".to_string()));
        assert_eq!(err.user_message(), "A database error occurred");
        assert!(!err.user_message().contains("secret_column"));
    }

    #[test]
    fn test_display_and_source_keep_details() {
        let err = TableError::from(DbErr::Custom("relation `editor` is not defined".to_string()));
        assert!(err.to_string().contains("editor"));
        assert!(err.source().is_some());
    }

    // ============================================================================
    // IntoResponse
    // ============================================================================

    #[test]
    fn test_into_response_is_500() {
        let err = TableError::from(DbErr::Custom("boom".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
