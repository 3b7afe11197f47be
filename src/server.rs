//! # Server Configuration
//!
//! This module contains the router, shared state and startup sequence for the
//! Servyre IT API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::attachments::{AttachmentStore, LocalAttachmentStore, UPLOADS_URL_PREFIX};
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{self, trace_context_middleware};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub attachments: Arc<dyn AttachmentStore>,
}

impl AppState {
    /// State backed by a local uploads directory taken from `config`
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let attachments = LocalAttachmentStore::new(
            config.uploads_dir.clone(),
            config.max_attachment_bytes,
        );
        Self {
            config: Arc::new(config),
            db,
            attachments: Arc::new(attachments),
        }
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

fn api_routes() -> Router<AppState> {
    use handlers::{admin, auth, comments, data, notifications, reports, tickets};

    Router::new()
        // Session
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/dev-login", post(auth::dev_login))
        // Lookups
        .route("/data/categories", get(data::categories))
        .route("/data/categories/{id}/failures", get(data::category_failures))
        .route("/data/statuses", get(data::statuses))
        .route("/data/priorities", get(data::priorities))
        .route("/data/technicians", get(data::technicians))
        .route("/data/departments", get(data::departments))
        // Tickets
        .route("/tickets", post(tickets::create_ticket).get(tickets::list_tickets))
        .route("/tickets/mine", get(tickets::list_my_tickets))
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket)
                .patch(tickets::update_ticket)
                .put(tickets::admin_update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route(
            "/tickets/{id}/comments",
            post(tickets::add_comment).get(tickets::list_comments),
        )
        .route("/tickets/{id}/history", get(tickets::get_history))
        .route(
            "/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        // Notifications
        .route("/notifications/unread", get(notifications::unread))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        // Administration
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/admin/users/{id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/admin/categories", post(admin::create_category))
        .route(
            "/admin/categories/{id}",
            patch(admin::update_category).delete(admin::delete_category),
        )
        .route("/admin/category-failures", post(admin::create_failure))
        .route(
            "/admin/category-failures/{id}",
            patch(admin::update_failure).delete(admin::delete_failure),
        )
        .route(
            "/admin/priorities",
            get(admin::list_priorities).post(admin::create_priority),
        )
        .route(
            "/admin/priorities/{id}",
            patch(admin::update_priority).delete(admin::delete_priority),
        )
        .route(
            "/admin/departments",
            get(admin::list_departments).post(admin::create_department),
        )
        .route(
            "/admin/departments/{id}",
            patch(admin::update_department).delete(admin::delete_department),
        )
        .route("/admin/reports", post(reports::generate_report))
        .route("/admin/reports/{year}/{month}", get(reports::download_report))
        .route("/admin/reports/{year}/{month}/data", get(reports::report_data))
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    // Base64 inflates attachments by a third; leave room for the JSON envelope.
    let body_limit = state.config.max_attachment_bytes / 3 * 4 + 64 * 1024;
    let uploads = ServeDir::new(state.config.uploads_dir.clone());

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api_routes())
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    telemetry::init_tracing(&config).context("Failed to initialize tracing")?;

    let addr = config.bind_addr().context("Invalid server address")?;

    let db = crate::db::init_pool(&config).await?;
    crate::db::prepare(&db, &config).await?;

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("Failed to create uploads dir {}", config.uploads_dir.display()))?;

    tracing::info!(
        profile = %config.profile,
        dev_login = config.dev_login_enabled,
        "Starting Servyre IT API"
    );

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                crate::auth::SESSION_COOKIE,
            ))),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::me,
        crate::handlers::auth::logout,
        crate::handlers::auth::dev_login,
        crate::handlers::data::categories,
        crate::handlers::data::category_failures,
        crate::handlers::data::statuses,
        crate::handlers::data::priorities,
        crate::handlers::data::technicians,
        crate::handlers::data::departments,
        crate::handlers::tickets::create_ticket,
        crate::handlers::tickets::list_tickets,
        crate::handlers::tickets::list_my_tickets,
        crate::handlers::tickets::get_ticket,
        crate::handlers::tickets::update_ticket,
        crate::handlers::tickets::admin_update_ticket,
        crate::handlers::tickets::delete_ticket,
        crate::handlers::tickets::add_comment,
        crate::handlers::tickets::list_comments,
        crate::handlers::tickets::get_history,
        crate::handlers::comments::update_comment,
        crate::handlers::comments::delete_comment,
        crate::handlers::notifications::unread,
        crate::handlers::notifications::mark_read,
        crate::handlers::notifications::mark_all_read,
        crate::handlers::admin::dashboard,
        crate::handlers::admin::list_users,
        crate::handlers::admin::create_user,
        crate::handlers::admin::update_user,
        crate::handlers::admin::delete_user,
        crate::handlers::admin::create_category,
        crate::handlers::admin::update_category,
        crate::handlers::admin::delete_category,
        crate::handlers::admin::create_failure,
        crate::handlers::admin::update_failure,
        crate::handlers::admin::delete_failure,
        crate::handlers::admin::list_priorities,
        crate::handlers::admin::create_priority,
        crate::handlers::admin::update_priority,
        crate::handlers::admin::delete_priority,
        crate::handlers::admin::list_departments,
        crate::handlers::admin::create_department,
        crate::handlers::admin::update_department,
        crate::handlers::admin::delete_department,
        crate::handlers::reports::generate_report,
        crate::handlers::reports::download_report,
        crate::handlers::reports::report_data,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::models::user::UserResponse,
            crate::models::Role,
            crate::models::Branch,
            crate::models::ChangeType,
            crate::models::NotificationType,
            crate::models::category::CategoryResponse,
            crate::models::category_failure::CategoryFailureResponse,
            crate::models::priority::PriorityResponse,
            crate::models::department::DepartmentResponse,
            crate::models::ticket_status::TicketStatusResponse,
            crate::models::ticket::TicketResponse,
            crate::models::ticket_history::HistoryEntryResponse,
            crate::models::notification::NotificationResponse,
            crate::attachments::AttachmentUpload,
            crate::services::tickets::CreateTicketInput,
            crate::services::tickets::CreatedTicket,
            crate::services::tickets::UpdateTicketInput,
            crate::services::tickets::AdminUpdateTicketInput,
            crate::services::tickets::TicketListItem,
            crate::services::comments::AddCommentInput,
            crate::services::comments::CreatedComment,
            crate::services::comments::CommentView,
            crate::services::admin::DashboardStats,
            crate::services::admin::CreateUserInput,
            crate::services::admin::UpdateUserInput,
            crate::services::taxonomy::CreateCategoryInput,
            crate::services::taxonomy::UpdateCategoryInput,
            crate::services::taxonomy::CreateFailureInput,
            crate::services::taxonomy::UpdateFailureInput,
            crate::services::taxonomy::CreatePriorityInput,
            crate::services::taxonomy::UpdatePriorityInput,
            crate::services::taxonomy::CreateDepartmentInput,
            crate::services::taxonomy::UpdateDepartmentInput,
            crate::services::reports::ReportData,
            crate::services::reports::ReportBucket,
            crate::services::reports::TechnicianScore,
            crate::services::sessions::DevLoginInput,
            crate::services::sessions::SessionTokenResponse,
            crate::handlers::comments::UpdateCommentInput,
            crate::handlers::notifications::MarkAllReadResponse,
            crate::handlers::reports::GenerateReportInput,
            crate::handlers::reports::GenerateReportResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "auth", description = "Sessions"),
        (name = "data", description = "Lookup data for ticket forms"),
        (name = "tickets", description = "Ticket lifecycle, comments and history"),
        (name = "notifications", description = "Per-user notifications"),
        (name = "admin", description = "Administration"),
        (name = "reports", description = "Monthly reports"),
    ),
    info(
        title = "Servyre IT API",
        description = "Role-based IT support ticketing",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
