//! # Ticket Handlers
//!
//! Ticket lifecycle endpoints plus the per-ticket comment thread and history.

use axum::{
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::ticket::TicketResponse;
use crate::models::ticket_history::HistoryEntryResponse;
use crate::server::AppState;
use crate::services::comments::{AddCommentInput, CommentView, CreatedComment};
use crate::services::tickets::{
    AdminUpdateTicketInput, CreateTicketInput, CreatedTicket, TicketListItem, UpdateTicketInput,
};
use crate::services::{CommentService, TicketService};

fn ticket_service(state: &AppState) -> TicketService<'_> {
    TicketService::new(&state.db, &state.config.requester_email_domain)
}

/// File a new ticket
#[utoipa::path(
    post,
    path = "/api/tickets",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateTicketInput,
    responses(
        (status = 201, description = "Ticket created", body = CreatedTicket),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 409, description = "Folio collision; retry", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateTicketInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedTicket>), ApiError> {
    let Json(input) = payload?;
    let created = ticket_service(&state).create(&user.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// All tickets (technicians and admins)
#[utoipa::path(
    get,
    path = "/api/tickets",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "All tickets, newest first", body = Vec<TicketListItem>),
        (status = 401, description = "No valid session", body = ApiError),
        (status = 403, description = "Caller is not staff", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TicketListItem>>, ApiError> {
    Ok(Json(ticket_service(&state).list_all(&user.actor()).await?))
}

/// Tickets filed by the caller
#[utoipa::path(
    get,
    path = "/api/tickets/mine",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Caller's tickets, newest first", body = Vec<TicketListItem>),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn list_my_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TicketListItem>>, ApiError> {
    Ok(Json(ticket_service(&state).list_mine(&user.actor()).await?))
}

/// One ticket
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 403, description = "Not the creator and not staff", body = ApiError),
        (status = 404, description = "Ticket not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<TicketResponse>, ApiError> {
    let Path(id) = path?;
    let ticket = ticket_service(&state).get_by_id(&user.actor(), id).await?;
    Ok(Json(ticket.into()))
}

/// Triage update (technicians and admins)
#[utoipa::path(
    patch,
    path = "/api/tickets/{id}",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = UpdateTicketInput,
    responses(
        (status = 200, description = "Updated ticket", body = TicketResponse),
        (status = 400, description = "Unknown status, priority or assignee", body = ApiError),
        (status = 403, description = "Caller is not staff", body = ApiError),
        (status = 404, description = "Ticket not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn update_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateTicketInput>, JsonRejection>,
) -> Result<Json<TicketResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let ticket = ticket_service(&state)
        .update(&user.actor(), id, input)
        .await?;
    Ok(Json(ticket.into()))
}

/// Administrative overwrite (admins)
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = AdminUpdateTicketInput,
    responses(
        (status = 200, description = "Updated ticket", body = TicketResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "Ticket not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn admin_update_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AdminUpdateTicketInput>, JsonRejection>,
) -> Result<Json<TicketResponse>, ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let ticket = ticket_service(&state)
        .admin_update(&user.actor(), id, input)
        .await?;
    Ok(Json(ticket.into()))
}

/// Delete a ticket with its comments, history and notifications (admins)
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 204, description = "Ticket deleted"),
        (status = 403, description = "Caller is not an admin", body = ApiError),
        (status = 404, description = "Ticket not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn delete_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    ticket_service(&state).delete_admin(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Comment on a ticket, optionally with an attachment
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/comments",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = AddCommentInput,
    responses(
        (status = 201, description = "Comment added", body = CreatedComment),
        (status = 400, description = "Empty comment or invalid attachment", body = ApiError),
        (status = 403, description = "No access, or internal comment by a non-staff user", body = ApiError),
        (status = 404, description = "Ticket not found", body = ApiError)
    ),
    tag = "tickets"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AddCommentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedComment>), ApiError> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let created = CommentService::new(&state.db, state.attachments.as_ref())
        .add_comment(&user.actor(), id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Comment thread, newest first
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/comments",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Visible comments; empty when the ticket is not accessible", body = Vec<CommentView>)
    ),
    tag = "tickets"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let Path(id) = path?;
    let comments = CommentService::new(&state.db, state.attachments.as_ref())
        .get_comments(&user.actor(), id)
        .await?;
    Ok(Json(comments))
}

/// Change history in chronological order
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/history",
    params(("id" = i32, Path, description = "Ticket id")),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "History entries; empty when the ticket is not accessible", body = Vec<HistoryEntryResponse>)
    ),
    tag = "tickets"
)]
pub async fn get_history(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<HistoryEntryResponse>>, ApiError> {
    let Path(id) = path?;
    let entries = ticket_service(&state).get_history(&user.actor(), id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
