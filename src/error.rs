//! # Error Handling
//!
//! This module provides unified error handling for the Servyre IT service,
//! implementing a consistent problem+json response format with trace ID propagation.
//!
//! Errors are layered: repositories return [`RepositoryError`], services return
//! [`ServiceError`], and handlers surface everything as [`ApiError`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    #[schema(value_type = String, example = "VALIDATION_FAILED")]
    pub code: Box<str>,
    /// Human-readable error message
    #[schema(value_type = String)]
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Current request trace ID, falling back to a generated correlation ID
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Returns true when the database rejected a write because of a unique index.
pub fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    match db_error.code() {
        Some(code) => {
            let code = code.as_ref();
            code == PG_UNIQUE
                || MYSQL_DUPLICATE_CODES.contains(&code)
                || SQLITE_DUPLICATE_CODES.contains(&code)
        }
        None => false,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        if let Some(trace_id) = self.trace_id.as_deref()
            && let Ok(header_value) = HeaderValue::from_str(trace_id)
        {
            headers.insert("x-trace-id", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

/// Errors raised by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("{0} not found")]
    NotFound(String),
}

impl RepositoryError {
    /// Wraps a SeaORM error (for use with `map_err`)
    pub fn database_error(err: sea_orm::DbErr) -> Self {
        Self::Database(err)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Errors raised by the domain services.
///
/// Messages carried by the client-facing variants are safe to show to users.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Convenience alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;

// Error mappers for common sources

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Invalid path parameter")
            .with_details(serde_json::json!({ "reason": rejection.body_text() }))
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            sea_orm::DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Record not found: {}", record),
            ),
            sea_orm::DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            sea_orm::DbErr::ConnectionAcquire(acquire_err) => {
                tracing::error!("Database pool exhausted: {:?}", acquire_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
                .with_retry_after(1)
            }
            _ => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(db_err) => db_err.into(),
            RepositoryError::NotFound(what) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", what),
            ),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::BadRequest(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
            }
            ServiceError::Unauthorized(message) => unauthorized(Some(&message)),
            ServiceError::Forbidden(message) => forbidden(Some(&message)),
            ServiceError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            }
            ServiceError::Conflict(message) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            ServiceError::Internal(message) => {
                tracing::error!(error = %message, "Service internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    message,
                )
            }
            ServiceError::Repository(repo_err) => repo_err.into(),
            ServiceError::Database(db_err) => db_err.into(),
        }
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create a forbidden error (403)
pub fn forbidden(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Insufficient permissions");
    ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_api_error_basic() {
        let error = ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Test error message",
        );

        assert_eq!(error.code, Box::from("VALIDATION_FAILED"));
        assert_eq!(error.message, Box::from("Test error message"));
        assert_eq!(error.details, None);
        assert_eq!(error.retry_after, None);
    }

    #[test]
    fn test_api_error_with_details() {
        let error = ApiError::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Test error message")
            .with_details(json!({"field": "value"}));

        assert_eq!(error.details, Some(Box::new(json!({"field": "value"}))));
    }

    #[test]
    fn test_from_anyhow() {
        let anyhow_error = anyhow::anyhow!("Something went wrong");
        let api_error: ApiError = anyhow_error.into();

        assert_eq!(api_error.code, Box::from("INTERNAL_SERVER_ERROR"));
        assert_eq!(api_error.message, Box::from("An internal error occurred"));
    }

    #[test]
    fn test_content_type_and_trace_headers() {
        let error = ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Test error");
        let trace_id = error.trace_id.clone().unwrap();

        let response = error.into_response();

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
        assert_eq!(
            response.headers().get("x-trace-id").unwrap(),
            trace_id.as_ref()
        );
    }

    #[test]
    fn test_status_code_preservation() {
        let error = ApiError::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_trace_id_generation() {
        let error = ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "Test error",
        );

        assert!(error.trace_id.is_some());
        let trace_id = error.trace_id.unwrap();
        assert!(trace_id.starts_with("corr-"));
        assert_eq!(trace_id.len(), 13);
    }

    #[tokio::test]
    async fn test_trace_id_from_active_context() {
        let context = telemetry::TraceContext {
            trace_id: "trace-abc".to_string(),
        };

        let error = telemetry::with_trace_context(context, async {
            ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "missing")
        })
        .await;

        assert_eq!(error.trace_id.as_deref(), Some("trace-abc"));
    }

    #[test]
    fn test_database_error_mapping() {
        let db_error = sea_orm::DbErr::RecordNotFound("test_record".to_string());
        let api_error: ApiError = db_error.into();

        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code, Box::from("NOT_FOUND"));
        assert!(api_error.message.contains("test_record"));

        let api_error: ApiError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.message, Box::from("Database error occurred"));
    }

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::bad_request("bad"), StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            (ServiceError::forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ServiceError::not_found("gone"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                ServiceError::Conflict("dup".to_string()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                ServiceError::internal("broken"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
            (
                ServiceError::Unauthorized("who".to_string()),
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
        ];

        for (error, status, code) in cases {
            let api_error: ApiError = error.into();
            assert_eq!(api_error.status, status);
            assert_eq!(api_error.code.as_ref(), code);
        }
    }

    #[test]
    fn test_repository_error_mapping() {
        let api_error: ApiError = RepositoryError::not_found("Ticket 7").into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.message, Box::from("Ticket 7 not found"));

        let api_error: ApiError = ServiceError::bad_request("name is required").into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.code, Box::from("VALIDATION_FAILED"));
    }

    #[test]
    fn test_auth_error_helpers() {
        let auth_error = unauthorized(None);
        assert_eq!(auth_error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(auth_error.code, Box::from("UNAUTHORIZED"));
        assert_eq!(auth_error.message, Box::from("Authentication required"));

        let custom_auth_error = unauthorized(Some("Invalid session"));
        assert_eq!(custom_auth_error.message, Box::from("Invalid session"));

        let forbidden_error = forbidden(None);
        assert_eq!(forbidden_error.status, StatusCode::FORBIDDEN);
        assert_eq!(
            forbidden_error.message,
            Box::from("Insufficient permissions")
        );
    }

    #[test]
    fn test_problem_json_body_shape() {
        let error = ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", "Admins only");
        let body = serde_json::to_value(&error).unwrap();

        assert_eq!(body["code"], "FORBIDDEN");
        assert_eq!(body["message"], "Admins only");
        assert!(body.get("status").is_none());
        assert!(body.get("retryAfter").is_none());
        assert!(body["traceId"].is_string());
    }
}
