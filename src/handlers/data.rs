//! # Lookup Handlers
//!
//! Active taxonomy rows for ticket forms. Any signed-in user may read them.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::Json,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::category::CategoryResponse;
use crate::models::category_failure::CategoryFailureResponse;
use crate::models::department::DepartmentResponse;
use crate::models::priority::PriorityResponse;
use crate::models::ticket_status::TicketStatusResponse;
use crate::models::user::UserResponse;
use crate::server::AppState;
use crate::services::TaxonomyService;

fn into_responses<M, R: From<M>>(rows: Vec<M>) -> Json<Vec<R>> {
    Json(rows.into_iter().map(R::from).collect())
}

/// Active categories
#[utoipa::path(
    get,
    path = "/api/data/categories",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active categories", body = Vec<CategoryResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db).categories().await?;
    Ok(into_responses(rows))
}

/// Active failure types of a category
#[utoipa::path(
    get,
    path = "/api/data/categories/{id}/failures",
    params(("id" = i32, Path, description = "Category id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active failure types", body = Vec<CategoryFailureResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn category_failures(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<CategoryFailureResponse>>, ApiError> {
    let Path(category_id) = path?;
    let rows = TaxonomyService::new(&state.db)
        .category_failures(category_id)
        .await?;
    Ok(into_responses(rows))
}

/// Active statuses in display order
#[utoipa::path(
    get,
    path = "/api/data/statuses",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active statuses", body = Vec<TicketStatusResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn statuses(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<TicketStatusResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db).statuses().await?;
    Ok(into_responses(rows))
}

/// Active priorities, most urgent first
#[utoipa::path(
    get,
    path = "/api/data/priorities",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active priorities", body = Vec<PriorityResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn priorities(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<PriorityResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db).priorities().await?;
    Ok(into_responses(rows))
}

/// Active technicians
#[utoipa::path(
    get,
    path = "/api/data/technicians",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active technicians", body = Vec<UserResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn technicians(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db).technicians().await?;
    Ok(into_responses(rows))
}

/// Active departments
#[utoipa::path(
    get,
    path = "/api/data/departments",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Active departments", body = Vec<DepartmentResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "data"
)]
pub async fn departments(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db).departments().await?;
    Ok(into_responses(rows))
}
