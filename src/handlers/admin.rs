//! # Administration Handlers
//!
//! Dashboard counters, the user directory and taxonomy maintenance. Every
//! endpoint here requires the admin role; the check lives in the services.
//! Deletes are soft: rows are deactivated so historical tickets keep their
//! labels.

use axum::{
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::category::CategoryResponse;
use crate::models::category_failure::CategoryFailureResponse;
use crate::models::department::DepartmentResponse;
use crate::models::priority::PriorityResponse;
use crate::models::user::UserResponse;
use crate::server::AppState;
use crate::services::admin::{CreateUserInput, DashboardStats, UpdateUserInput};
use crate::services::taxonomy::{
    CreateCategoryInput, CreateDepartmentInput, CreateFailureInput, CreatePriorityInput,
    UpdateCategoryInput, UpdateDepartmentInput, UpdateFailureInput, UpdatePriorityInput,
};
use crate::services::{AdminService, TaxonomyService};

/// Ticket counters for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Global counters", body = DashboardStats),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = AdminService::new(&state.db)
        .dashboard_stats(&user.actor())
        .await?;
    Ok(Json(stats))
}

// Users

/// All users, including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Users", body = Vec<UserResponse>),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = AdminService::new(&state.db).list_users(&user.actor()).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid name or email", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(input) = payload?;
    let created = AdminService::new(&state.db)
        .create_user(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateUserInput,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let updated = AdminService::new(&state.db)
        .update_user(&user.actor(), id, input)
        .await?;
    Ok(Json(updated.into()))
}

/// Deactivate a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 400, description = "Admins cannot deactivate themselves", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    AdminService::new(&state.db)
        .delete_user(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Categories

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid name or color", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateCategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let Json(input) = payload?;
    let created = TaxonomyService::new(&state.db)
        .create_category(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateCategoryInput>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let updated = TaxonomyService::new(&state.db)
        .update_category(&user.actor(), id, input)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Category deactivated"),
        (status = 404, description = "Category not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    TaxonomyService::new(&state.db)
        .delete_category(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Category failures

#[utoipa::path(
    post,
    path = "/api/admin/category-failures",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateFailureInput,
    responses(
        (status = 201, description = "Failure type created", body = CategoryFailureResponse),
        (status = 400, description = "Invalid name or unknown category", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_failure(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateFailureInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryFailureResponse>), ApiError> {
    let Json(input) = payload?;
    let created = TaxonomyService::new(&state.db)
        .create_failure(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/category-failures/{id}",
    params(("id" = i32, Path, description = "Failure type id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateFailureInput,
    responses(
        (status = 200, description = "Failure type updated", body = CategoryFailureResponse),
        (status = 404, description = "Failure type not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_failure(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateFailureInput>, JsonRejection>,
) -> Result<Json<CategoryFailureResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let updated = TaxonomyService::new(&state.db)
        .update_failure(&user.actor(), id, input)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/category-failures/{id}",
    params(("id" = i32, Path, description = "Failure type id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Failure type deactivated"),
        (status = 404, description = "Failure type not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_failure(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    TaxonomyService::new(&state.db)
        .delete_failure(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Priorities

/// All priorities, including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/priorities",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Priorities, most urgent first", body = Vec<PriorityResponse>),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_priorities(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PriorityResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db)
        .all_priorities(&user.actor())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/priorities",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreatePriorityInput,
    responses(
        (status = 201, description = "Priority created", body = PriorityResponse),
        (status = 400, description = "Invalid name or color", body = ApiError),
        (status = 409, description = "Priority name already exists", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_priority(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreatePriorityInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PriorityResponse>), ApiError> {
    let Json(input) = payload?;
    let created = TaxonomyService::new(&state.db)
        .create_priority(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/priorities/{id}",
    params(("id" = i32, Path, description = "Priority id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdatePriorityInput,
    responses(
        (status = 200, description = "Priority updated", body = PriorityResponse),
        (status = 404, description = "Priority not found", body = ApiError),
        (status = 409, description = "Priority name already exists", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_priority(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdatePriorityInput>, JsonRejection>,
) -> Result<Json<PriorityResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let updated = TaxonomyService::new(&state.db)
        .update_priority(&user.actor(), id, input)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/priorities/{id}",
    params(("id" = i32, Path, description = "Priority id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Priority deactivated"),
        (status = 404, description = "Priority not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_priority(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    TaxonomyService::new(&state.db)
        .delete_priority(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Departments

/// All departments, including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/departments",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Departments", body = Vec<DepartmentResponse>),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let rows = TaxonomyService::new(&state.db)
        .all_departments(&user.actor())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/departments",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateDepartmentInput,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 409, description = "Department name already exists", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_department(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateDepartmentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    let Json(input) = payload?;
    let created = TaxonomyService::new(&state.db)
        .create_department(&user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/admin/departments/{id}",
    params(("id" = i32, Path, description = "Department id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateDepartmentInput,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_department(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateDepartmentInput>, JsonRejection>,
) -> Result<Json<DepartmentResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let updated = TaxonomyService::new(&state.db)
        .update_department(&user.actor(), id, input)
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/departments/{id}",
    params(("id" = i32, Path, description = "Department id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Department deactivated"),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    TaxonomyService::new(&state.db)
        .delete_department(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
