//! # Session Handlers

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::Json,
};

use crate::auth::{AuthUser, clear_session_cookie, session_cookie};
use crate::error::ApiError;
use crate::models::user::UserResponse;
use crate::server::AppState;
use crate::services::sessions::{DevLoginInput, SessionService, SessionTokenResponse};

fn cookie_headers(value: String) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&value)
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", "Invalid cookie"))?;
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "auth"
)]
pub async fn logout() -> Result<(StatusCode, HeaderMap), ApiError> {
    Ok((StatusCode::NO_CONTENT, cookie_headers(clear_session_cookie())?))
}

/// Sign in as the local account for a role (development only)
#[utoipa::path(
    post,
    path = "/api/auth/dev-login",
    request_body = DevLoginInput,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionTokenResponse),
        (status = 403, description = "Development login disabled", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn dev_login(
    State(state): State<AppState>,
    Json(input): Json<DevLoginInput>,
) -> Result<(HeaderMap, Json<SessionTokenResponse>), ApiError> {
    let grant = SessionService::new(&state.db, &state.config)
        .dev_login(input.role)
        .await?;

    let headers = cookie_headers(session_cookie(&grant.token, !state.config.is_development()))?;
    Ok((
        headers,
        Json(SessionTokenResponse {
            token: grant.token,
            user: grant.user.into(),
        }),
    ))
}
