//! # Report Handlers
//!
//! Monthly reports for admins: a generate call that returns the rendered
//! size, a PDF download and the raw figures as JSON.

use axum::{
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::server::AppState;
use crate::services::ReportService;
use crate::services::reports::ReportData;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportInput {
    /// 1..=12
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportResponse {
    pub success: bool,
    #[schema(example = "reporte-tickets-3-2025.pdf")]
    pub file_name: String,
    /// PDF size in bytes
    pub size: usize,
}

/// Render a monthly report
#[utoipa::path(
    post,
    path = "/api/admin/reports",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = GenerateReportInput,
    responses(
        (status = 200, description = "Report rendered", body = GenerateReportResponse),
        (status = 400, description = "Month or year out of range", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn generate_report(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<GenerateReportInput>, JsonRejection>,
) -> Result<Json<GenerateReportResponse>, ApiError> {
    let Json(input) = payload?;
    let report = ReportService::new(&state.db)
        .generate(&user.actor(), input.month, input.year)
        .await?;

    Ok(Json(GenerateReportResponse {
        success: true,
        file_name: report.file_name,
        size: report.bytes.len(),
    }))
}

/// Download a monthly report as PDF
#[utoipa::path(
    get,
    path = "/api/admin/reports/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Year, 2000..=2100"),
        ("month" = u32, Path, description = "Month, 1..=12")
    ),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Month or year out of range", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn download_report(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path((year, month)) = path?;
    let report = ReportService::new(&state.db)
        .generate(&user.actor(), month, year)
        .await?;

    let headers = [
        (CONTENT_TYPE, "application/pdf".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.file_name),
        ),
    ];
    Ok((headers, report.bytes))
}

/// Monthly figures as JSON
#[utoipa::path(
    get,
    path = "/api/admin/reports/{year}/{month}/data",
    params(
        ("year" = i32, Path, description = "Year, 2000..=2100"),
        ("month" = u32, Path, description = "Month, 1..=12")
    ),
    security(("bearer_auth" = []), ("session_cookie" = [])),
    responses(
        (status = 200, description = "Report figures", body = ReportData),
        (status = 400, description = "Month or year out of range", body = ApiError),
        (status = 403, description = "Caller is not an admin", body = ApiError)
    ),
    tag = "reports"
)]
pub async fn report_data(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Result<Json<ReportData>, ApiError> {
    let Path((year, month)) = path?;
    let data = ReportService::new(&state.db)
        .report_data(&user.actor(), month, year)
        .await?;
    Ok(Json(data))
}
