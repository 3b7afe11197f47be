//! Writes the monthly ticket report PDF to disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use servyre_it::{config::ConfigLoader, db, services::ReportService};

#[derive(Debug, Parser)]
#[command(name = "generate_report", about = "Render a monthly ticket report")]
struct Args {
    /// Month 1..=12, defaults to the current month
    #[arg(long)]
    month: Option<u32>,
    /// Year 2000..=2100, defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let now = Utc::now();
    let month = args.month.unwrap_or_else(|| now.month());
    let year = args.year.unwrap_or_else(|| now.year());

    let config = ConfigLoader::new().load().context("loading configuration")?;
    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    let report = ReportService::new(&db)
        .render(month, year)
        .await
        .with_context(|| format!("generating report for {month}/{year}"))?;

    let path = args.out.join(&report.file_name);
    tokio::fs::write(&path, &report.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Report written to {} ({} bytes)", path.display(), report.bytes.len());
    Ok(())
}
