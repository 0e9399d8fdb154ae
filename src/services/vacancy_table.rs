//! Vacancy Table
//!
//! Loads a full-format vacancy export, then filters, sorts, slices and renders it as
//! a text grid. Query parameters use the column display names ("Salary: 100000",
//! "Experience", ...).

use crate::constants::{csv_column, TABLE_CELL_MAX_CHARS, TABLE_COLUMN_WIDTH};
use crate::error::{Error, Result};
use crate::models::listing::{
    currency_code, currency_display, experience_code, experience_display, experience_rank, yes_no,
};
use crate::models::{CurrencyConverter, ListedSalary, ListedVacancy, RowPolicy};
use crate::services::dataset::{column_index, RawDataset};
use crate::services::statistics::sort_by_value;
use crate::utils::format_thousands;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

const INDEX_COLUMN: &str = "No.";
const NOTHING_FOUND: &str = "Nothing found";

/// A column of the vacancy table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableField {
    Name,
    Description,
    Skills,
    Experience,
    Premium,
    Company,
    Salary,
    Region,
    PublishedAt,
    /// Filter and sort key only, shown inside the salary column
    Currency,
}

impl TableField {
    /// Columns in display order
    pub const DISPLAYED: [TableField; 9] = [
        TableField::Name,
        TableField::Description,
        TableField::Skills,
        TableField::Experience,
        TableField::Premium,
        TableField::Company,
        TableField::Salary,
        TableField::Region,
        TableField::PublishedAt,
    ];

    const ALL: [TableField; 10] = [
        TableField::Name,
        TableField::Description,
        TableField::Skills,
        TableField::Experience,
        TableField::Premium,
        TableField::Company,
        TableField::Salary,
        TableField::Region,
        TableField::PublishedAt,
        TableField::Currency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TableField::Name => "Name",
            TableField::Description => "Description",
            TableField::Skills => "Skills",
            TableField::Experience => "Experience",
            TableField::Premium => "Premium vacancy",
            TableField::Company => "Company",
            TableField::Salary => "Salary",
            TableField::Region => "Region",
            TableField::PublishedAt => "Publication date",
            TableField::Currency => "Salary currency",
        }
    }

    pub fn from_label(label: &str) -> Option<TableField> {
        Self::ALL.into_iter().find(|field| field.label() == label)
    }
}

/// Row window, 1-based; `end` is exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl RowRange {
    /// "" (all rows), "3" (from row 3) or "3 10" (rows 3 to 9)
    pub fn parse(input: &str) -> Result<Self> {
        let bounds: Vec<usize> = input
            .split_whitespace()
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| Error::InvalidInput(format!("Output range is invalid: '{}'", input)))
            })
            .collect::<Result<_>>()?;

        match bounds.as_slice() {
            [] => Ok(Self::default()),
            [start] => Ok(Self {
                start: Some(*start),
                end: None,
            }),
            [start, end] => Ok(Self {
                start: Some(*start),
                end: Some(*end),
            }),
            _ => Err(Error::InvalidInput(format!("Output range is invalid: '{}'", input))),
        }
    }

    /// Zero-based slice bounds over `len` rows, clamped like a slice
    fn bounds(&self, len: usize) -> (usize, usize) {
        let start = self.start.map_or(0, |s| s.saturating_sub(1)).min(len);
        let end = self.end.map_or(len, |e| e.saturating_sub(1)).min(len);
        (start, end.max(start))
    }
}

/// Everything the user asked the table for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    pub filter: Option<(TableField, String)>,
    pub sort: Option<TableField>,
    pub reverse: bool,
    pub range: RowRange,
    /// Empty means every displayed column
    pub columns: Vec<TableField>,
}

impl TableQuery {
    /// Build a query from the raw prompt answers; empty strings mean "not set"
    pub fn parse(filter: &str, sort: &str, reverse: &str, range: &str, columns: &str) -> Result<Self> {
        let reverse = match reverse {
            "" | "No" => false,
            "Yes" => true,
            _ => return Err(Error::InvalidInput("Sort order is invalid".to_string())),
        };

        let sort = match sort {
            "" => None,
            label => Some(
                TableField::from_label(label)
                    .ok_or_else(|| Error::InvalidInput("Sort parameter is invalid".to_string()))?,
            ),
        };

        let filter = match filter {
            "" => None,
            raw => {
                let (key, value) = raw
                    .split_once(": ")
                    .ok_or_else(|| Error::InvalidInput("Filter format is invalid".to_string()))?;
                let field = TableField::from_label(key)
                    .ok_or_else(|| Error::InvalidInput("Filter parameter is invalid".to_string()))?;
                Some((field, value.to_string()))
            }
        };

        let columns = match columns {
            "" => Vec::new(),
            raw => raw
                .split(", ")
                .map(|label| {
                    TableField::from_label(label)
                        .filter(|field| TableField::DISPLAYED.contains(field))
                        .ok_or_else(|| Error::InvalidInput(format!("Unknown column '{}'", label)))
                })
                .collect::<Result<_>>()?,
        };

        Ok(Self {
            filter,
            sort,
            reverse,
            range: RowRange::parse(range)?,
            columns,
        })
    }
}

/// Load a full-format export
///
/// Rows with a wrong field count or any empty field are dropped. HTML tags are
/// removed and whitespace collapsed in every column except `key_skills`.
pub fn load_listing(path: &Path) -> Result<Vec<ListedVacancy>> {
    let dataset = RawDataset::read(path, RowPolicy::Strict)?;
    if dataset.headers.is_empty() {
        return Err(Error::InvalidInput("Empty file".to_string()));
    }
    if dataset.rows.is_empty() && dataset.dropped == 0 {
        return Err(Error::InvalidInput("No data".to_string()));
    }

    let idx = |name: &str| column_index(&dataset.headers, name);
    let name = idx(csv_column::NAME)?;
    let description = idx(csv_column::DESCRIPTION)?;
    let key_skills = idx(csv_column::KEY_SKILLS)?;
    let experience_id = idx(csv_column::EXPERIENCE_ID)?;
    let premium = idx(csv_column::PREMIUM)?;
    let employer_name = idx(csv_column::EMPLOYER_NAME)?;
    let salary_from = idx(csv_column::SALARY_FROM)?;
    let salary_to = idx(csv_column::SALARY_TO)?;
    let salary_gross = idx(csv_column::SALARY_GROSS)?;
    let salary_currency = idx(csv_column::SALARY_CURRENCY)?;
    let area_name = idx(csv_column::AREA_NAME)?;
    let published_at = idx(csv_column::PUBLISHED_AT)?;

    let mut vacancies = Vec::with_capacity(dataset.rows.len());
    for row in &dataset.rows {
        let text = |i: usize| clean_text(row.get(i).unwrap_or(""));
        vacancies.push(ListedVacancy {
            name: text(name),
            description: text(description),
            key_skills: row.get(key_skills).unwrap_or("").to_string(),
            experience_id: text(experience_id),
            premium: parse_flag(&text(premium)),
            employer_name: text(employer_name),
            salary: ListedSalary {
                salary_from: parse_amount(&text(salary_from))?,
                salary_to: parse_amount(&text(salary_to))?,
                gross: parse_flag(&text(salary_gross)),
                currency: text(salary_currency),
            },
            area_name: text(area_name),
            published_at: text(published_at),
        });
    }

    debug!(path = %path.display(), vacancies = vacancies.len(), dropped = dataset.dropped, "Loaded listing");
    Ok(vacancies)
}

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("Valid regex pattern"));

/// Strip HTML tags and collapse runs of whitespace
pub fn clean_text(raw: &str) -> String {
    HTML_TAG
        .replace_all(raw, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_flag(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| Error::Parse(format!("Invalid salary amount '{}'", raw)))
}

fn publication_date(published_at: &str) -> Result<String> {
    DateTime::parse_from_str(published_at, "%Y-%m-%dT%H:%M:%S%z")
        .map(|dt| dt.format("%d.%m.%Y").to_string())
        .map_err(|e| Error::Parse(format!("Malformed publication date '{}': {}", published_at, e)))
}

fn matches_filter(vacancy: &ListedVacancy, field: TableField, sample: &str) -> Result<bool> {
    Ok(match field {
        TableField::Skills => {
            let skills = vacancy.skills();
            sample.split(", ").all(|skill| skills.contains(&skill))
        }
        TableField::Salary => {
            let amount: f64 = sample
                .parse()
                .map_err(|_| Error::InvalidInput(format!("Salary filter is not a number: '{}'", sample)))?;
            vacancy.salary.salary_from <= amount && amount <= vacancy.salary.salary_to
        }
        TableField::PublishedAt => publication_date(&vacancy.published_at)? == sample,
        TableField::Experience => vacancy.experience_id == experience_code(sample),
        TableField::Premium => match sample {
            "Yes" | "True" => vacancy.premium,
            "No" | "False" => !vacancy.premium,
            _ => false,
        },
        TableField::Currency => vacancy.salary.currency == currency_code(sample),
        TableField::Name => vacancy.name == sample,
        TableField::Description => vacancy.description == sample,
        TableField::Company => vacancy.employer_name == sample,
        TableField::Region => vacancy.area_name == sample,
    })
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(vacancy: &ListedVacancy, field: TableField, converter: &CurrencyConverter) -> Result<SortKey> {
    Ok(match field {
        TableField::Skills => SortKey::Number(vacancy.skills().len() as f64),
        TableField::Salary => {
            let salary = &vacancy.salary;
            let from = converter.to_rubles(salary.salary_from, &salary.currency, "")?;
            let to = converter.to_rubles(salary.salary_to, &salary.currency, "")?;
            SortKey::Number((from + to) / 2.0)
        }
        TableField::Experience => SortKey::Number(experience_rank(&vacancy.experience_id) as f64),
        TableField::Premium => SortKey::Number(if vacancy.premium { 1.0 } else { 0.0 }),
        TableField::PublishedAt => SortKey::Text(vacancy.published_at.clone()),
        TableField::Currency => SortKey::Text(vacancy.salary.currency.clone()),
        TableField::Name => SortKey::Text(vacancy.name.clone()),
        TableField::Description => SortKey::Text(vacancy.description.clone()),
        TableField::Company => SortKey::Text(vacancy.employer_name.clone()),
        TableField::Region => SortKey::Text(vacancy.area_name.clone()),
    })
}

/// Apply the filter and the sort of a query
///
/// Sorting is stable in both directions. Salaries are compared in rubles using
/// the static rate table.
pub fn select(vacancies: Vec<ListedVacancy>, query: &TableQuery) -> Result<Vec<ListedVacancy>> {
    let mut selected = Vec::with_capacity(vacancies.len());
    for vacancy in vacancies {
        let keep = match &query.filter {
            Some((field, sample)) => matches_filter(&vacancy, *field, sample)?,
            None => true,
        };
        if keep {
            selected.push(vacancy);
        }
    }

    let Some(field) = query.sort else {
        return Ok(selected);
    };

    let converter = CurrencyConverter::static_rates();
    let mut keyed = selected
        .into_iter()
        .map(|vacancy| {
            let key = sort_key(&vacancy, field, &converter)?;
            Ok((vacancy, key))
        })
        .collect::<Result<Vec<_>>>()?;
    sort_by_value(&mut keyed, query.reverse);

    Ok(keyed.into_iter().map(|(vacancy, _)| vacancy).collect())
}

fn format_salary(salary: &ListedSalary) -> String {
    format!(
        "{} - {} ({}) ({})",
        format_thousands(salary.salary_from.trunc() as i64, ' '),
        format_thousands(salary.salary_to.trunc() as i64, ' '),
        currency_display(&salary.currency),
        if salary.gross { "Before tax" } else { "After tax" }
    )
}

/// Display value of one cell, before truncation
fn cell_value(vacancy: &ListedVacancy, field: TableField) -> Result<String> {
    Ok(match field {
        TableField::Name => vacancy.name.clone(),
        TableField::Description => vacancy.description.clone(),
        TableField::Skills => vacancy.key_skills.clone(),
        TableField::Experience => experience_display(&vacancy.experience_id).to_string(),
        TableField::Premium => yes_no(vacancy.premium).to_string(),
        TableField::Company => vacancy.employer_name.clone(),
        TableField::Salary => format_salary(&vacancy.salary),
        TableField::Region => vacancy.area_name.clone(),
        TableField::PublishedAt => publication_date(&vacancy.published_at)?,
        TableField::Currency => currency_display(&vacancy.salary.currency).to_string(),
    })
}

/// Cut values longer than the cell limit and mark the cut with "..."
pub fn truncate_cell(value: &str) -> String {
    if value.chars().count() > TABLE_CELL_MAX_CHARS {
        let cut: String = value.chars().take(TABLE_CELL_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

/// Filter, sort, slice and render vacancies as a grid
///
/// Row numbers count the selected vacancies before the range is applied.
pub fn render_table(vacancies: Vec<ListedVacancy>, query: &TableQuery) -> Result<String> {
    let selected = select(vacancies, query)?;
    if selected.is_empty() {
        return Ok(NOTHING_FOUND.to_string());
    }

    let fields: &[TableField] = if query.columns.is_empty() {
        &TableField::DISPLAYED
    } else {
        &query.columns
    };

    let mut header = vec![INDEX_COLUMN.to_string()];
    header.extend(fields.iter().map(|f| f.label().to_string()));

    let (start, end) = query.range.bounds(selected.len());
    let mut rows = Vec::with_capacity(end - start);
    for (idx, vacancy) in selected.iter().enumerate().take(end).skip(start) {
        let mut row = vec![(idx + 1).to_string()];
        for field in fields {
            row.push(truncate_cell(&cell_value(vacancy, *field)?));
        }
        rows.push(row);
    }

    Ok(render_grid(&header, &rows))
}

/// Wrap a cell into lines of at most `width` characters, breaking on spaces where possible
fn wrap_cell(value: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in value.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let mut word = word.to_string();
            loop {
                let line_len = line.chars().count();
                let word_len = word.chars().count();
                let needed = if line.is_empty() { word_len } else { line_len + 1 + word_len };
                if needed <= width {
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(&word);
                    break;
                }
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    continue;
                }
                // Word longer than the column: hard break
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                lines.push(head);
            }
        }
        lines.push(line);
    }
    lines
}

/// Left-aligned grid with a rule between every row
fn render_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let wrapped_header: Vec<Vec<String>> = header.iter().map(|h| wrap_cell(h, TABLE_COLUMN_WIDTH)).collect();
    let wrapped_rows: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| wrap_cell(cell, TABLE_COLUMN_WIDTH)).collect())
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            std::iter::once(&wrapped_header[col])
                .chain(wrapped_rows.iter().map(|row| &row[col]))
                .flat_map(|lines| lines.iter().map(|l| l.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut out = vec![rule.clone()];
    for row in std::iter::once(&wrapped_header).chain(wrapped_rows.iter()) {
        let height = row.iter().map(Vec::len).max().unwrap_or(1);
        for line_idx in 0..height {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(lines, width)| {
                    let text = lines.get(line_idx).map_or("", String::as_str);
                    format!(" {}{} ", text, " ".repeat(width - text.chars().count()))
                })
                .collect();
            out.push(format!("|{}|", cells.join("|")));
        }
        out.push(rule.clone());
    }

    out.join("\n")
}
