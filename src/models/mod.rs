mod currency;
mod stats_config;
mod statistics;
mod vacancy;
pub mod listing;

pub use currency::{CurrencyConverter, MonthlyRates, RateTable};
pub use listing::{ListedSalary, ListedVacancy};
pub use stats_config::{default_workers, DownloadConfig, ExecutionMode, ReportOutputs, StatsConfig};
pub use statistics::{CityStats, StatisticsReport, YearPartialStats, YearlyStats};
pub use vacancy::{parse_year, ProfessionMatcher, RowPolicy, VacancyRecord};
