//! # Notification Handlers

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::notification::NotificationResponse;
use crate::server::AppState;
use crate::services::NotificationService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    /// Notifications that changed from unread to read
    pub updated: u64,
}

/// Caller's unread notifications
#[utoipa::path(
    get,
    path = "/api/notifications/unread",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Unread notifications, newest first", body = Vec<NotificationResponse>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn unread(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let rows = NotificationService::new(&state.db)
        .get_unread(&user.actor())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Mark one notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = i32, Path, description = "Notification id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "No such notification for the caller", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    NotificationService::new(&state.db)
        .mark_as_read(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every notification of the caller as read
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Number of notifications marked", body = MarkAllReadResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = NotificationService::new(&state.db)
        .mark_all_as_read(&user.actor())
        .await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
