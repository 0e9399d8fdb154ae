//! hh.ru vacancy downloader
//!
//! Splits a day into one-hour publication windows (the API caps the number of
//! results per query), walks every page of each window and keeps the vacancies
//! that state a salary.

use crate::constants::{DOWNLOAD_HEADER, HH_PER_PAGE, HH_SPECIALIZATION};
use crate::error::{Error, Result};
use crate::models::DownloadConfig;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One page of `/vacancies`
#[derive(Debug, Deserialize)]
pub struct VacancyPage {
    pub pages: u32,
    #[serde(default)]
    pub items: Vec<HhItem>,
}

#[derive(Debug, Deserialize)]
pub struct HhItem {
    pub name: String,
    pub salary: Option<HhSalary>,
    pub area: HhArea,
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
pub struct HhSalary {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HhArea {
    pub name: String,
}

/// A downloaded vacancy in the six-column dataset layout
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedVacancy {
    pub name: String,
    pub salary_from: Option<f64>,
    pub salary_to: Option<f64>,
    pub salary_currency: String,
    pub area_name: String,
    pub published_at: String,
}

impl HhItem {
    /// `None` for vacancies without a salary block
    pub fn into_vacancy(self) -> Option<DownloadedVacancy> {
        let salary = self.salary?;
        Some(DownloadedVacancy {
            name: self.name,
            salary_from: salary.from,
            salary_to: salary.to,
            salary_currency: salary.currency.unwrap_or_default(),
            area_name: self.area.name,
            published_at: self.published_at,
        })
    }
}

/// Publication window `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl HourWindow {
    pub fn date_from(&self) -> String {
        self.from.format(QUERY_TIME_FORMAT).to_string()
    }

    pub fn date_to(&self) -> String {
        self.to.format(QUERY_TIME_FORMAT).to_string()
    }
}

/// One-hour windows covering `[from_hour, to_hour)` of `date`
pub fn hour_windows(date: NaiveDate, from_hour: u32, to_hour: u32) -> Result<Vec<HourWindow>> {
    if from_hour >= to_hour || to_hour > 24 {
        return Err(Error::InvalidInput(format!(
            "Invalid hour range {}..{}: expected 0 <= from < to <= 24",
            from_hour, to_hour
        )));
    }

    (from_hour..to_hour)
        .map(|hour| {
            let from = date
                .and_hms_opt(hour, 0, 0)
                .ok_or_else(|| Error::InvalidInput(format!("Invalid hour {}", hour)))?;
            Ok(HourWindow {
                from,
                to: from + Duration::hours(1),
            })
        })
        .collect()
}

/// Summary of a download run
#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub windows: usize,
    pub pages: usize,
    pub fetched: usize,
    pub kept: usize,
}

pub struct HhClient {
    base_url: String,
    client: reqwest::Client,
}

impl HhClient {
    pub fn new(base_url: String) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid hh.ru base URL: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        // hh.ru rejects requests without a User-Agent
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Fetch one page of a window; `page = None` lets the API pick the first page
    pub async fn fetch_page(&self, window: &HourWindow, page: Option<u32>) -> Result<VacancyPage> {
        let url = format!("{}/vacancies", self.base_url);
        let mut query = vec![
            ("date_from", window.date_from()),
            ("date_to", window.date_to()),
            ("specialization", HH_SPECIALIZATION.to_string()),
            ("per_page", HH_PER_PAGE.to_string()),
        ];
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Network(format!("hh.ru request failed: {} (url: {})", e, url)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(Error::Network(format!(
                "hh.ru returned error status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        parse_page(&body)
    }

    /// Every page of one window
    async fn fetch_window(&self, window: &HourWindow, summary: &mut DownloadSummary) -> Result<Vec<DownloadedVacancy>> {
        let first = self.fetch_page(window, None).await?;
        let pages = first.pages;
        debug!(from = %window.date_from(), pages, "Window page count");

        let mut items = first.items;
        for page in 1..pages {
            items.extend(self.fetch_page(window, Some(page)).await?.items);
        }

        summary.pages += pages.max(1) as usize;
        summary.fetched += items.len();
        Ok(items.into_iter().filter_map(HhItem::into_vacancy).collect())
    }
}

pub fn parse_page(body: &str) -> Result<VacancyPage> {
    serde_json::from_str(body).map_err(|e| Error::Parse(format!("Failed to parse vacancies page: {}", e)))
}

/// Download every window of `config.date` and write the CSV
pub async fn download_vacancies(config: &DownloadConfig) -> Result<DownloadSummary> {
    let start = Instant::now();
    let windows = hour_windows(config.date, config.from_hour, config.to_hour)?;
    let client = HhClient::new(config.base_url.clone())?;

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| Error::Other(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"),
    );

    let mut summary = DownloadSummary {
        windows: windows.len(),
        ..DownloadSummary::default()
    };
    let mut vacancies = Vec::new();
    for window in &windows {
        pb.set_message(window.date_from());
        vacancies.extend(client.fetch_window(window, &mut summary).await?);
        pb.inc(1);
    }
    pb.finish_with_message("Download complete");

    summary.kept = vacancies.len();
    write_vacancies(&config.output, &vacancies)?;

    info!(
        windows = summary.windows,
        pages = summary.pages,
        fetched = summary.fetched,
        kept = summary.kept,
        duration_s = start.elapsed().as_secs_f64(),
        "Downloaded vacancies"
    );
    Ok(summary)
}

/// Write downloaded vacancies with the dataset header
pub fn write_vacancies(path: &Path, vacancies: &[DownloadedVacancy]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(DOWNLOAD_HEADER)?;
    for vacancy in vacancies {
        let salary_from = format_amount(vacancy.salary_from);
        let salary_to = format_amount(vacancy.salary_to);
        writer.write_record([
            vacancy.name.as_str(),
            salary_from.as_str(),
            salary_to.as_str(),
            vacancy.salary_currency.as_str(),
            vacancy.area_name.as_str(),
            vacancy.published_at.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map_or(String::new(), |a| a.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowPolicy;
    use crate::services::dataset::load_records;

    const PAGE: &str = r#"{
        "found": 3,
        "pages": 2,
        "per_page": 100,
        "page": 0,
        "items": [
            {
                "id": "1",
                "name": "Rust Developer",
                "salary": {"from": 150000, "to": null, "currency": "RUR", "gross": false},
                "area": {"id": "1", "name": "Moscow"},
                "published_at": "2022-12-19T10:15:00+0300"
            },
            {
                "id": "2",
                "name": "Volunteer",
                "salary": null,
                "area": {"id": "2", "name": "Saint Petersburg"},
                "published_at": "2022-12-19T10:20:00+0300"
            },
            {
                "id": "3",
                "name": "Go Developer",
                "salary": {"from": 2000, "to": 3000, "currency": "USD", "gross": true},
                "area": {"id": "160", "name": "Almaty"},
                "published_at": "2022-12-19T10:45:00+0300"
            }
        ]
    }"#;

    #[test]
    fn test_hour_windows() {
        let date = NaiveDate::from_ymd_opt(2022, 12, 19).unwrap();
        let windows = hour_windows(date, 8, 10).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].date_from(), "2022-12-19T08:00:00");
        assert_eq!(windows[0].date_to(), "2022-12-19T09:00:00");
        assert_eq!(windows[1].date_to(), "2022-12-19T10:00:00");
    }

    #[test]
    fn test_last_window_ends_next_day() {
        let date = NaiveDate::from_ymd_opt(2022, 12, 19).unwrap();
        let windows = hour_windows(date, 0, 24).unwrap();
        assert_eq!(windows.len(), 24);
        assert_eq!(windows[23].date_to(), "2022-12-20T00:00:00");
    }

    #[test]
    fn test_invalid_hour_range() {
        let date = NaiveDate::from_ymd_opt(2022, 12, 19).unwrap();
        assert!(matches!(hour_windows(date, 5, 5), Err(Error::InvalidInput(_))));
        assert!(matches!(hour_windows(date, 0, 25), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_page_skips_items_without_salary() {
        let page = parse_page(PAGE).unwrap();
        assert_eq!(page.pages, 2);

        let vacancies: Vec<_> = page.items.into_iter().filter_map(HhItem::into_vacancy).collect();
        assert_eq!(vacancies.len(), 2);
        assert_eq!(vacancies[0].salary_from, Some(150000.0));
        assert_eq!(vacancies[0].salary_to, None);
        assert_eq!(vacancies[1].area_name, "Almaty");
    }

    #[test]
    fn test_written_csv_loads_as_dataset() {
        let page = parse_page(PAGE).unwrap();
        let vacancies: Vec<_> = page.items.into_iter().filter_map(HhItem::into_vacancy).collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloaded.csv");
        write_vacancies(&path, &vacancies).unwrap();

        let records = load_records(&path, RowPolicy::Lenient).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].salary_midpoint(), Some(150000.0));
        assert_eq!(records[1].salary_currency, "USD");
    }
}
