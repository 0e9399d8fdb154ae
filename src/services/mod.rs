pub mod city_aggregator;
pub mod coordinator;
pub mod dataset;
pub mod partitioner;
pub mod rate_fetcher;
pub mod statistics;
pub mod vacancy_fetcher;
pub mod vacancy_table;
pub mod year_aggregator;

pub use city_aggregator::aggregate_cities;
pub use coordinator::{run_year_jobs, FanInResult, YearJob};
pub use dataset::{load_records, RawDataset};
pub use partitioner::{list_partitions, partition_file, partition_path, write_partitions, PartitionSummary};
pub use rate_fetcher::{currency_frequencies, months_in_dataset, parse_daily_rates, CbrClient};
pub use vacancy_fetcher::{download_vacancies, hour_windows, DownloadSummary, HhClient};
pub use vacancy_table::{load_listing, render_table, TableQuery};
pub use year_aggregator::{aggregate_partition, aggregate_year, AggregationContext, YearOutcome};
