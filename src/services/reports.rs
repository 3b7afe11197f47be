//! Monthly ticket report: figures and their one-page PDF rendering.
//!
//! Buckets are keyed by the taxonomy tables, so custom priorities and
//! statuses show up under their configured display names.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{category, priority, ticket, ticket_status};
use crate::pdf::{Font, LETTER, PdfDocument};
use crate::repositories::{TaxonomyRepository, TicketRepository, UserRepository};

use super::Actor;

pub const MIN_REPORT_YEAR: i32 = 2000;
pub const MAX_REPORT_YEAR: i32 = 2100;
pub const TOP_TECHNICIANS: usize = 5;
pub const UNKNOWN_BUCKET: &str = "Unknown";

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Count of tickets under one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportBucket {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianScore {
    pub name: String,
    pub tickets_resolved: u64,
}

/// Figures for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Spanish month name, e.g. `marzo`
    pub month: String,
    pub month_number: u32,
    pub year: i32,
    pub total_tickets: u64,
    pub resolved_tickets: u64,
    pub open_tickets: u64,
    /// Mean hours from creation to resolution, two decimals, or `N/A`
    #[schema(example = "3.00")]
    pub average_resolution_time: String,
    #[schema(example = "66.67")]
    pub resolution_rate: String,
    pub tickets_by_category: Vec<ReportBucket>,
    /// Most urgent first
    pub tickets_by_priority: Vec<ReportBucket>,
    /// In status display order
    pub tickets_by_status: Vec<ReportBucket>,
    pub top_technicians: Vec<TechnicianScore>,
}

/// Rendered report ready to download
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Taxonomy rows used to label buckets
#[derive(Debug, Clone, Default)]
pub struct ReportTaxonomy {
    pub categories: Vec<category::Model>,
    pub priorities: Vec<priority::Model>,
    pub statuses: Vec<ticket_status::Model>,
}

/// `reporte-tickets-{month}-{year}.pdf`
pub fn report_file_name(month: u32, year: i32) -> String {
    format!("reporte-tickets-{month}-{year}.pdf")
}

/// Two-decimal percentage; `"0.00"` when `total` is zero
pub fn format_rate(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 / total as f64 * 100.0)
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// `[first instant of month, first instant of next month)` in UTC
pub fn month_window(month: u32, year: i32) -> ServiceResult<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(ServiceError::bad_request(format!(
            "Month must be between 1 and 12, got {month}"
        )));
    }
    if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        return Err(ServiceError::bad_request(format!(
            "Year must be between {MIN_REPORT_YEAR} and {MAX_REPORT_YEAR}, got {year}"
        )));
    }

    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ServiceError::bad_request(format!("Invalid period {month}/{year}"))),
    }
}

/// Bucket counts in the order of `labels`. Labels of inactive rows are only
/// kept when they have tickets; ids not found in `labels` go to `Unknown`.
fn bucketize(
    ids: impl Iterator<Item = i32>,
    labels: &[(i32, String, bool)],
) -> Vec<ReportBucket> {
    let mut counts: HashMap<i32, u64> = HashMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }

    let mut buckets: Vec<ReportBucket> = labels
        .iter()
        .filter_map(|(id, name, is_active)| {
            let count = counts.remove(id).unwrap_or(0);
            (*is_active || count > 0).then(|| ReportBucket {
                name: name.clone(),
                count,
            })
        })
        .collect();

    let unknown: u64 = counts.values().sum();
    if unknown > 0 {
        buckets.push(ReportBucket {
            name: UNKNOWN_BUCKET.to_string(),
            count: unknown,
        });
    }

    buckets
}

/// Compute the figures for `tickets`, all created within the month.
///
/// `technician_names` maps assignee ids to display names.
pub fn compute_report(
    month: u32,
    year: i32,
    tickets: &[ticket::Model],
    taxonomy: &ReportTaxonomy,
    technician_names: &HashMap<i32, String>,
) -> ReportData {
    let total = tickets.len() as u64;
    let resolved: Vec<&ticket::Model> = tickets.iter().filter(|t| t.resolved_at.is_some()).collect();
    let resolved_count = resolved.len() as u64;

    let hours: Vec<f64> = resolved
        .iter()
        .filter_map(|t| t.resolved_at.map(|r| (r - t.created_at).num_milliseconds() as f64 / 3_600_000.0))
        .collect();
    let average_resolution_time = if hours.is_empty() {
        "N/A".to_string()
    } else {
        format!("{:.2}", hours.iter().sum::<f64>() / hours.len() as f64)
    };

    let category_labels: Vec<(i32, String, bool)> = taxonomy
        .categories
        .iter()
        .map(|c| (c.id, c.name.clone(), c.is_active))
        .collect();
    let priority_labels: Vec<(i32, String, bool)> = taxonomy
        .priorities
        .iter()
        .map(|p| (p.id, p.display_name.clone(), p.is_active))
        .collect();
    let status_labels: Vec<(i32, String, bool)> = taxonomy
        .statuses
        .iter()
        .map(|s| (s.id, s.display_name.clone(), s.is_active))
        .collect();

    let mut per_technician: HashMap<i32, u64> = HashMap::new();
    for assignee in resolved.iter().filter_map(|t| t.assigned_to_user_id) {
        *per_technician.entry(assignee).or_default() += 1;
    }
    let mut top_technicians: Vec<TechnicianScore> = per_technician
        .into_iter()
        .map(|(id, count)| TechnicianScore {
            name: technician_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("Usuario #{id}")),
            tickets_resolved: count,
        })
        .collect();
    top_technicians.sort_by(|a, b| {
        b.tickets_resolved
            .cmp(&a.tickets_resolved)
            .then_with(|| a.name.cmp(&b.name))
    });
    top_technicians.truncate(TOP_TECHNICIANS);

    ReportData {
        month: month_name(month).to_string(),
        month_number: month,
        year,
        total_tickets: total,
        resolved_tickets: resolved_count,
        open_tickets: total - resolved_count,
        average_resolution_time,
        resolution_rate: format_rate(resolved_count, total),
        tickets_by_category: bucketize(tickets.iter().map(|t| t.category_id), &category_labels),
        tickets_by_priority: bucketize(tickets.iter().map(|t| t.priority_id), &priority_labels),
        tickets_by_status: bucketize(tickets.iter().map(|t| t.status_id), &status_labels),
        top_technicians,
    }
}

/// Lay the figures out on a single Letter page
pub fn render_pdf(data: &ReportData, generated_at: DateTime<Utc>) -> Vec<u8> {
    const MARGIN: f64 = 50.0;
    const LINE_HEIGHT: f64 = 20.0;
    const FOOTER_Y: f64 = 30.0;

    let (width, height) = LETTER;
    let mut pdf = PdfDocument::new("Reporte Mensual de Tickets");
    pdf.add_page(width, height);
    pdf.add_metadata(
        &format!("Reporte Mensual de Tickets - {} {}", data.month, data.year),
        &generated_at.format("D:%Y%m%d%H%M%SZ").to_string(),
    );

    let mut y = height - MARGIN;

    pdf.set_font(Font::HelveticaBold);
    pdf.draw_text("Reporte Mensual de Tickets", MARGIN, y, 24.0);
    y -= 30.0;

    pdf.set_font(Font::Helvetica);
    pdf.set_fill_gray(0.4);
    pdf.draw_text(
        &format!("Período: {} de {}", data.month, data.year),
        MARGIN,
        y,
        12.0,
    );
    pdf.set_fill_gray(0.0);
    y -= 30.0;

    let summary = [
        format!("Total de Tickets: {}", data.total_tickets),
        format!("Tickets Resueltos: {}", data.resolved_tickets),
        format!("Tickets Abiertos: {}", data.open_tickets),
        format!(
            "Tiempo Promedio de Resolución: {} horas",
            data.average_resolution_time
        ),
        format!("Tasa de Resolución: {}%", data.resolution_rate),
    ];

    let section = |pdf: &mut PdfDocument, y: &mut f64, title: &str, lines: &[String]| {
        pdf.set_font(Font::HelveticaBold);
        pdf.draw_text(title, MARGIN, *y, 14.0);
        *y -= 20.0;

        pdf.set_font(Font::Helvetica);
        let room = ((*y - FOOTER_Y) / LINE_HEIGHT).floor().max(0.0) as usize;
        let (shown, hidden) = if lines.len() > room {
            let shown = room.saturating_sub(1);
            (shown, lines.len() - shown)
        } else {
            (lines.len(), 0)
        };

        for line in &lines[..shown] {
            pdf.draw_text(line, MARGIN + 20.0, *y, 11.0);
            *y -= LINE_HEIGHT;
        }
        if hidden > 0 {
            tracing::warn!(section = title, hidden, "Report section truncated to fit the page");
            if room > 0 {
                pdf.set_fill_gray(0.4);
                pdf.draw_text(&format!("... y {hidden} más"), MARGIN + 20.0, *y, 11.0);
                pdf.set_fill_gray(0.0);
                *y -= LINE_HEIGHT;
            }
        }
        *y -= 20.0;
    };

    let bucket_lines = |buckets: &[ReportBucket]| -> Vec<String> {
        buckets
            .iter()
            .map(|b| format!("{}: {}", b.name, b.count))
            .collect()
    };

    section(&mut pdf, &mut y, "Resumen Ejecutivo", &summary);
    section(
        &mut pdf,
        &mut y,
        "Distribución por Prioridad",
        &bucket_lines(&data.tickets_by_priority),
    );
    section(
        &mut pdf,
        &mut y,
        "Distribución por Estado",
        &bucket_lines(&data.tickets_by_status),
    );

    pdf.set_font(Font::Helvetica);
    pdf.set_fill_gray(0.6);
    pdf.draw_text(
        &format!("Generado: {}", generated_at.format("%d/%m/%Y")),
        MARGIN,
        FOOTER_Y,
        10.0,
    );
    pdf.draw_text(
        "Servyre IT - Sistema de Gestión de Tickets",
        width - MARGIN - 200.0,
        FOOTER_Y,
        10.0,
    );

    pdf.to_bytes()
}

pub struct ReportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Figures for a month without an access check (used by the CLI)
    pub async fn compute(&self, month: u32, year: i32) -> ServiceResult<ReportData> {
        let (start, end) = month_window(month, year)?;

        let tickets = TicketRepository::new(self.db)
            .list_created_between(start, end)
            .await?;

        let repo = TaxonomyRepository::new(self.db);
        let taxonomy = ReportTaxonomy {
            categories: repo.list_all_categories().await?,
            priorities: repo.list_all_priorities().await?,
            statuses: repo.list_all_statuses().await?,
        };

        let mut assignees: Vec<i32> = tickets
            .iter()
            .filter(|t| t.resolved_at.is_some())
            .filter_map(|t| t.assigned_to_user_id)
            .collect();
        assignees.sort_unstable();
        assignees.dedup();
        let names = UserRepository::new(self.db).display_names(&assignees).await?;

        Ok(compute_report(month, year, &tickets, &taxonomy, &names))
    }

    /// Raw figures (admin only)
    pub async fn report_data(&self, actor: &Actor, month: u32, year: i32) -> ServiceResult<ReportData> {
        actor.require_admin()?;
        self.compute(month, year).await
    }

    /// Render the month's PDF (admin only)
    pub async fn generate(&self, actor: &Actor, month: u32, year: i32) -> ServiceResult<GeneratedReport> {
        actor.require_admin()?;
        self.render(month, year).await
    }

    /// Render without an access check (used by the CLI)
    pub async fn render(&self, month: u32, year: i32) -> ServiceResult<GeneratedReport> {
        let data = self.compute(month, year).await?;
        let bytes = render_pdf(&data, Utc::now());

        counter!("reports_generated_total").increment(1);
        tracing::info!(
            month,
            year,
            total_tickets = data.total_tickets,
            size = bytes.len(),
            "Monthly report generated"
        );

        Ok(GeneratedReport {
            file_name: report_file_name(month, year),
            bytes,
        })
    }
}
