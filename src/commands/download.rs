use crate::error::{Error, Result};
use crate::models::DownloadConfig;
use crate::services::{download_vacancies, DownloadSummary};
use chrono::NaiveDate;
use std::path::PathBuf;

pub fn run(date: String, output: PathBuf, from_hour: u32, to_hour: u32) {
    let date = match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            eprintln!("❌ Invalid date '{}': {}", date, e);
            eprintln!("   Expected format: YYYY-MM-DD");
            std::process::exit(1);
        }
    };

    let mut config = DownloadConfig::new(date, output);
    config.from_hour = from_hour;
    config.to_hour = to_hour;

    println!(
        "📥 Downloading vacancies published on {} ({:02}:00 → {:02}:00)",
        config.date, config.from_hour, config.to_hour
    );

    match run_download(&config) {
        Ok(summary) => {
            println!(
                "\n✅ Saved {} of {} vacancies ({} pages) to {}",
                summary.kept,
                summary.fetched,
                summary.pages,
                config.output.display()
            );
        }
        Err(e) => {
            eprintln!("❌ Download failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_download(config: &DownloadConfig) -> Result<DownloadSummary> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;
    runtime.block_on(download_vacancies(config))
}
