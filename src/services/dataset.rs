//! Vacancy CSV Loading
//!
//! Reads a vacancy export into raw rows (for partitioning) and parsed
//! `VacancyRecord`s (for aggregation). Rows that do not match the header shape are
//! dropped silently; value errors abort the load.

use crate::constants::csv_column;
use crate::error::{Error, Result};
use crate::models::{RowPolicy, VacancyRecord};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::debug;

/// Header and accepted rows of a vacancy CSV, values untouched
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    /// Rows rejected by the row policy
    pub dropped: usize,
}

impl RawDataset {
    /// Read a CSV file, screening rows with `policy`
    pub fn read(path: &Path, policy: RowPolicy) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let headers: StringRecord = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}'))
            .collect();

        let mut rows = Vec::new();
        let mut dropped = 0;
        for result in reader.records() {
            let record = result?;
            if policy.accepts(headers.len(), &record) {
                rows.push(record);
            } else {
                dropped += 1;
            }
        }

        debug!(
            path = %path.display(),
            rows = rows.len(),
            dropped,
            "Loaded vacancy CSV"
        );

        Ok(Self {
            headers,
            rows,
            dropped,
        })
    }

    /// Index of a named column
    pub fn column(&self, name: &str) -> Result<usize> {
        column_index(&self.headers, name)
    }

    /// Parse every row into a `VacancyRecord`
    ///
    /// Rows without any salary bound are kept; they count as vacancies but stay out of
    /// salary means.
    pub fn records(&self) -> Result<Vec<VacancyRecord>> {
        let columns = RecordColumns::resolve(&self.headers)?;
        self.rows.iter().map(|row| columns.parse(row)).collect()
    }
}

/// Load and parse a vacancy CSV in one step
pub fn load_records(path: &Path, policy: RowPolicy) -> Result<Vec<VacancyRecord>> {
    RawDataset::read(path, policy)?.records()
}

pub(crate) fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::Parse(format!("Missing required column '{}'", name)))
}

/// Positions of the statistics columns within a header
struct RecordColumns {
    name: usize,
    salary_from: usize,
    salary_to: usize,
    salary_currency: usize,
    area_name: usize,
    published_at: usize,
}

impl RecordColumns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            name: column_index(headers, csv_column::NAME)?,
            salary_from: column_index(headers, csv_column::SALARY_FROM)?,
            salary_to: column_index(headers, csv_column::SALARY_TO)?,
            salary_currency: column_index(headers, csv_column::SALARY_CURRENCY)?,
            area_name: column_index(headers, csv_column::AREA_NAME)?,
            published_at: column_index(headers, csv_column::PUBLISHED_AT)?,
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<VacancyRecord> {
        Ok(VacancyRecord {
            name: field(row, self.name).to_string(),
            area_name: field(row, self.area_name).to_string(),
            published_at: field(row, self.published_at).to_string(),
            salary_from: parse_amount(field(row, self.salary_from))?,
            salary_to: parse_amount(field(row, self.salary_to))?,
            salary_currency: field(row, self.salary_currency).to_string(),
        })
    }
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("").trim()
}

/// Empty and NaN cells are missing values
fn parse_amount(raw: &str) -> Result<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::Parse(format!("Invalid salary amount '{}'", raw)))
}
