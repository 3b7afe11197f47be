//! # Authentication
//!
//! Session tokens bind a user's `open_id` to an HMAC-SHA256 signature made
//! with the configured session secret:
//!
//! ```text
//! base64url(open_id) "." hex(hmac_sha256(secret, open_id))
//! ```
//!
//! Tokens are accepted from `Authorization: Bearer <token>` or from the
//! `servyre_session` cookie. The [`AuthUser`] extractor resolves the token to
//! an active user row; anything else is rejected with 401.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sea_orm::DatabaseConnection;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized};
use crate::models::user;
use crate::repositories::UserRepository;
use crate::services::Actor;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "servyre_session";

/// One year, in seconds
const SESSION_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

fn signature(key: &[u8], open_id: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(open_id.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

/// Issue a session token for `open_id`
pub fn sign_session(key: &[u8], open_id: &str) -> Option<String> {
    let sig = signature(key, open_id)?;
    Some(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(open_id.as_bytes()),
        hex::encode(sig)
    ))
}

/// Return the `open_id` a token was issued for, if the signature checks out
pub fn verify_session(key: &[u8], token: &str) -> Option<String> {
    let (encoded_id, encoded_sig) = token.trim().split_once('.')?;
    let open_id = String::from_utf8(URL_SAFE_NO_PAD.decode(encoded_id).ok()?).ok()?;
    let provided = hex::decode(encoded_sig).ok()?;
    let expected = signature(key, &open_id)?;

    if bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
        Some(open_id)
    } else {
        None
    }
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Bearer token first, then the session cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// The authenticated, active user behind a request
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppConfig>: FromRef<S>,
    DatabaseConnection: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        let db = DatabaseConnection::from_ref(state);

        let token = extract_session_token(&parts.headers)
            .ok_or_else(|| unauthorized(Some("Missing session token")))?;
        let open_id = verify_session(config.session_key(), &token)
            .ok_or_else(|| unauthorized(Some("Invalid session token")))?;

        let user = UserRepository::new(&db)
            .find_by_open_id(&open_id)
            .await?
            .ok_or_else(|| unauthorized(Some("Unknown user")))?;

        if !user.is_active {
            tracing::warn!(user_id = user.id, "Rejected session for inactive user");
            return Err(unauthorized(Some("User account is inactive")));
        }

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        routing::get,
    };
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use tower::ServiceExt;

    use crate::models::Role;
    use crate::repositories::{NewUser, UserChanges};

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn token_round_trip() {
        let token = sign_session(KEY, "dev-admin").unwrap();
        assert_eq!(verify_session(KEY, &token).as_deref(), Some("dev-admin"));
    }

    #[test]
    fn rejects_tampered_tokens() {
        let token = sign_session(KEY, "dev-user").unwrap();
        let (_, sig) = token.split_once('.').unwrap();

        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode("dev-admin"), sig);
        assert!(verify_session(KEY, &forged).is_none());
        assert!(verify_session(b"another-key-another-key-another!", &token).is_none());
        assert!(verify_session(KEY, "no-dot").is_none());
        assert!(verify_session(KEY, "!!!.zz").is_none());
        assert!(verify_session(KEY, "").is_none());
    }

    #[test]
    fn token_from_bearer_or_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; servyre_session=abc.def"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz.123"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("xyz.123"));

        assert!(extract_session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("abc.def", true);
        assert!(cookie.starts_with("servyre_session=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[derive(Clone)]
    struct TestState {
        config: Arc<AppConfig>,
        db: DatabaseConnection,
    }

    impl FromRef<TestState> for Arc<AppConfig> {
        fn from_ref(state: &TestState) -> Self {
            Arc::clone(&state.config)
        }
    }

    impl FromRef<TestState> for DatabaseConnection {
        fn from_ref(state: &TestState) -> Self {
            state.db.clone()
        }
    }

    async fn whoami(AuthUser(user): AuthUser) -> String {
        user.open_id
    }

    async fn call(state: TestState, token: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri("/whoami");
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = Router::new()
            .route("/whoami", get(whoami))
            .with_state(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[tokio::test]
    async fn extractor_resolves_active_users_only() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let state = TestState {
            config: Arc::new(AppConfig {
                session_secret: Some(String::from_utf8(KEY.to_vec()).unwrap()),
                ..Default::default()
            }),
            db: db.clone(),
        };

        let users = UserRepository::new(&db);
        let user = users
            .create(NewUser {
                open_id: "dev-user".to_string(),
                name: Some("Usuario Local".to_string()),
                email: Some("user@local.test".to_string()),
                login_method: Some("dev".to_string()),
                role: Role::User,
                department: None,
            })
            .await
            .unwrap();
        let token = sign_session(KEY, "dev-user").unwrap();

        assert_eq!(call(state.clone(), Some(&token)).await, (StatusCode::OK, "dev-user".to_string()));
        assert_eq!(call(state.clone(), None).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(call(state.clone(), Some("garbage")).await.0, StatusCode::UNAUTHORIZED);

        let stranger = sign_session(KEY, "nobody").unwrap();
        assert_eq!(call(state.clone(), Some(&stranger)).await.0, StatusCode::UNAUTHORIZED);

        users
            .update(
                user.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(call(state, Some(&token)).await.0, StatusCode::UNAUTHORIZED);
    }
}
