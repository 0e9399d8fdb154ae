use crate::models::RowPolicy;
use crate::utils::{get_hh_base_url, get_partition_dir, get_report_dir};
use chrono::NaiveDate;
use std::path::PathBuf;

/// How year tasks are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExecutionMode {
    /// Every year task in flight at once (bounded by `max_workers`)
    #[default]
    Parallel,
    /// One year task at a time, each awaited before the next is issued
    Sequential,
}

/// Which report artifacts to produce besides console output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutputs {
    pub workbook: bool,
    pub chart: bool,
    pub pdf: bool,
}

impl ReportOutputs {
    pub fn all() -> Self {
        Self {
            workbook: true,
            chart: true,
            pdf: true,
        }
    }

    pub fn any(&self) -> bool {
        self.workbook || self.chart || self.pdf
    }
}

/// Configuration for a statistics run
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Source dataset; `None` reuses existing partitions in `partition_dir`
    pub source: Option<PathBuf>,

    /// Directory holding chunk_{year}.csv files
    pub partition_dir: PathBuf,

    /// Profession substring
    pub profession: String,

    /// Match the profession ignoring case
    pub case_insensitive: bool,

    /// Row screening for every CSV read
    pub row_policy: RowPolicy,

    /// Monthly rate table; `None` uses the static table
    pub rates_file: Option<PathBuf>,

    pub mode: ExecutionMode,

    /// Maximum year tasks in flight
    pub max_workers: usize,

    pub outputs: ReportOutputs,

    /// Directory the report artifacts are written to
    pub report_dir: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            source: None,
            partition_dir: get_partition_dir(),
            profession: String::new(),
            case_insensitive: false,
            row_policy: RowPolicy::Lenient,
            rates_file: None,
            mode: ExecutionMode::Parallel,
            max_workers: default_workers(),
            outputs: ReportOutputs::default(),
            report_dir: get_report_dir(),
        }
    }
}

impl StatsConfig {
    /// Create new config for a source file and profession, other values default
    pub fn new(source: Option<PathBuf>, profession: String) -> Self {
        Self {
            source,
            profession,
            ..Self::default()
        }
    }
}

/// Number of CPUs, at least 1
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration for downloading one day of vacancies from hh.ru
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Publication date to download
    pub date: NaiveDate,

    /// First hour window start (inclusive)
    pub from_hour: u32,

    /// Last hour window end (exclusive), at most 24
    pub to_hour: u32,

    pub base_url: String,

    /// Output CSV path
    pub output: PathBuf,
}

impl DownloadConfig {
    pub fn new(date: NaiveDate, output: PathBuf) -> Self {
        Self {
            date,
            from_hour: 0,
            to_hour: 24,
            base_url: get_hh_base_url(),
            output,
        }
    }
}
