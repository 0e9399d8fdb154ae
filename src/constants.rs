//! CSV Format and Statistics Constants
//!
//! Column names of the vacancy exports and the calibration values used by the
//! aggregators.
//!
//! ## Vacancy CSV formats
//!
//! **Statistics format**: 6 columns
//! - name, salary_from, salary_to, salary_currency, area_name, published_at
//!
//! **Full format** (used by the vacancy table): 12 columns
//! - adds description, key_skills, experience_id, premium, employer_name, salary_gross

/// Number of leading columns copied into each year partition
pub const PARTITION_COLUMNS: usize = 6;

/// Column names shared by every vacancy export
pub mod csv_column {
    pub const NAME: &str = "name";
    pub const SALARY_FROM: &str = "salary_from";
    pub const SALARY_TO: &str = "salary_to";
    pub const SALARY_CURRENCY: &str = "salary_currency";
    pub const AREA_NAME: &str = "area_name";
    pub const PUBLISHED_AT: &str = "published_at";

    // Full format only
    pub const DESCRIPTION: &str = "description";
    pub const KEY_SKILLS: &str = "key_skills";
    pub const EXPERIENCE_ID: &str = "experience_id";
    pub const PREMIUM: &str = "premium";
    pub const EMPLOYER_NAME: &str = "employer_name";
    pub const SALARY_GROSS: &str = "salary_gross";
}

/// Header written by the vacancy downloader, in partition column order
pub const DOWNLOAD_HEADER: [&str; 6] = [
    csv_column::NAME,
    csv_column::SALARY_FROM,
    csv_column::SALARY_TO,
    csv_column::SALARY_CURRENCY,
    csv_column::AREA_NAME,
    csv_column::PUBLISHED_AT,
];

/// A city is reported only when it holds at least this percentage of all vacancies (1%)
pub const CITY_SHARE_THRESHOLD_PERCENT: usize = 1;

/// Number of cities kept in each city ranking
pub const TOP_CITIES: usize = 10;

/// Decimal places of a vacancy share (0.0123 = 1.23%)
pub const SHARE_DECIMALS: i32 = 4;

/// Currency every salary is converted into before averaging
pub const BASE_CURRENCY: &str = "RUR";

/// Fixed ruble multipliers used when no monthly rate table is supplied
pub const STATIC_RUB_RATES: &[(&str, f64)] = &[
    ("RUR", 1.0),
    ("AZN", 35.68),
    ("BYR", 23.91),
    ("EUR", 59.90),
    ("GEL", 21.74),
    ("KGS", 0.76),
    ("KZT", 0.13),
    ("UAH", 1.64),
    ("USD", 60.66),
    ("UZS", 0.0055),
];

/// Currencies collected into the monthly rate table by default
pub const RATE_TABLE_CURRENCIES: &[&str] = &["BYR", "EUR", "KZT", "UAH", "USD"];

/// Belarusian ruble was redenominated in 2016; the feed switches from BYR to BYN
pub const BYR_SUCCESSOR: &str = "BYN";

/// File name pattern for year partitions: chunk_{year}.csv
pub const PARTITION_FILE_PREFIX: &str = "chunk_";

/// Output file names
pub const WORKBOOK_FILE: &str = "report.xlsx";
pub const CHART_FILE: &str = "graph.svg";
pub const HTML_REPORT_FILE: &str = "report.html";
pub const PDF_REPORT_FILE: &str = "report.pdf";

/// Label of the synthesized remainder slice in the city share pie chart
pub const OTHER_CITIES_LABEL: &str = "Other";

/// Vacancy table cells longer than this are truncated with "..."
pub const TABLE_CELL_MAX_CHARS: usize = 100;

/// Column wrap width of the rendered vacancy table
pub const TABLE_COLUMN_WIDTH: usize = 20;

/// Public endpoints
pub const DEFAULT_CBR_BASE_URL: &str = "https://www.cbr.ru";
pub const DEFAULT_HH_BASE_URL: &str = "https://api.hh.ru";

/// hh.ru "Information technology" specialization used by the downloader
pub const HH_SPECIALIZATION: u32 = 1;

/// hh.ru page size (the API caps it at 100)
pub const HH_PER_PAGE: u32 = 100;
