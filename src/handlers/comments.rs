//! # Comment Moderation Handlers

use axum::{
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::CommentService;
use crate::services::comments::CommentView;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommentInput {
    pub content: String,
}

/// Edit a comment's text (admins)
#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i32, Path, description = "Comment id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateCommentInput,
    responses(
        (status = 200, description = "Comment updated", body = CommentView),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "Comment not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateCommentInput>, JsonRejection>,
) -> Result<Json<CommentView>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let comment = CommentService::new(&state.db, state.attachments.as_ref())
        .update_comment(&user.actor(), id, input.content)
        .await?;
    Ok(Json(comment))
}

/// Delete a comment (admins)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i32, Path, description = "Comment id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "Comment not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    CommentService::new(&state.db, state.attachments.as_ref())
        .delete_comment(&user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
