use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::models::ExecutionMode;

#[derive(Parser)]
#[command(name = "vacancy-stats")]
#[command(about = "Salary and vacancy statistics from job-posting CSV exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a vacancy CSV into one file per publication year
    Split {
        /// Source CSV file
        file: PathBuf,

        /// Directory for the year files
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Drop rows with any empty field (default drops only short rows)
        #[arg(long)]
        strict: bool,
    },
    /// Compute year and city statistics for a profession
    Stats(StatsArgs),
    /// Fetch monthly exchange rates for the months covered by a dataset
    Rates {
        /// Source CSV file
        file: PathBuf,

        /// Where to write the rate table
        #[arg(short, long, default_value = "currency_rates.csv")]
        output: PathBuf,
    },
    /// Download one day of vacancies from the job board API
    Download {
        /// Publication date (YYYY-MM-DD)
        date: String,

        /// Where to write the downloaded vacancies
        #[arg(short, long, default_value = "vacancies.csv")]
        output: PathBuf,

        /// First hour of the day to fetch
        #[arg(long, default_value_t = 0)]
        from_hour: u32,

        /// Hour to stop at (exclusive)
        #[arg(long, default_value_t = 24)]
        to_hour: u32,
    },
    /// Print a filtered, sorted vacancy table
    Table(TableArgs),
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Source CSV file (prompted for when missing)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Profession substring to match against vacancy titles (prompted for when missing)
    #[arg(short, long)]
    pub profession: Option<String>,

    /// Reuse year files already in the partition directory instead of splitting a source
    #[arg(long, conflicts_with = "file")]
    pub use_partitions: bool,

    /// Match the profession ignoring case
    #[arg(short = 'i', long)]
    pub case_insensitive: bool,

    /// Drop rows with any empty field
    #[arg(long)]
    pub strict: bool,

    /// Monthly rate table produced by the `rates` command
    #[arg(long)]
    pub rates: Option<PathBuf>,

    /// How year tasks are dispatched
    #[arg(long, value_enum, default_value_t = ExecutionMode::Parallel)]
    pub mode: ExecutionMode,

    /// Maximum number of year tasks in flight
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Directory for chunk_{year}.csv files (default: $VACANCY_PARTITION_DIR)
    #[arg(long)]
    pub partition_dir: Option<PathBuf>,

    /// Directory for report files (default: $REPORT_DIR)
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Produce the workbook, chart and PDF
    #[arg(long)]
    pub report: bool,

    /// Write report.xlsx
    #[arg(long)]
    pub xlsx: bool,

    /// Write graph.svg
    #[arg(long)]
    pub chart: bool,

    /// Write report.html and report.pdf (needs wkhtmltopdf, implies --chart)
    #[arg(long)]
    pub pdf: bool,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Listing CSV file; every parameter is prompted for when missing
    pub file: Option<PathBuf>,

    /// Filter as "Column: value", e.g. "Salary currency: Rubles"
    #[arg(long)]
    pub filter: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(short, long)]
    pub reverse: bool,

    /// 1-based row range, "start" or "start end"
    #[arg(long)]
    pub range: Option<String>,

    /// Comma separated column names
    #[arg(long)]
    pub columns: Option<String>,
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split { file, out_dir, strict } => {
            commands::split::run(file, out_dir, strict);
        }
        Commands::Stats(args) => {
            commands::stats::run(args);
        }
        Commands::Rates { file, output } => {
            commands::rates::run(file, output);
        }
        Commands::Download {
            date,
            output,
            from_hour,
            to_hour,
        } => {
            commands::download::run(date, output, from_hour, to_hour);
        }
        Commands::Table(args) => {
            commands::table::run(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_flags() {
        let cli = Cli::parse_from([
            "vacancy-stats",
            "stats",
            "--file",
            "vacancies.csv",
            "--profession",
            "Developer",
            "--mode",
            "sequential",
            "--xlsx",
        ]);
        match cli.command {
            Commands::Stats(args) => {
                assert_eq!(args.file, Some(PathBuf::from("vacancies.csv")));
                assert_eq!(args.mode, ExecutionMode::Sequential);
                assert!(args.xlsx && !args.pdf);
            }
            _ => panic!("expected stats"),
        }
    }

    #[test]
    fn test_every_stats_flag_has_help() {
        let command = Cli::command();
        let stats = command.find_subcommand("stats").unwrap();
        for arg in stats.get_arguments().filter(|a| a.get_id() != "help") {
            assert!(arg.get_help().is_some(), "--{} has no help", arg.get_id());
        }
    }

    #[test]
    fn test_use_partitions_conflicts_with_file() {
        let result = Cli::try_parse_from(["vacancy-stats", "stats", "--use-partitions", "--file", "a.csv"]);
        assert!(result.is_err());
    }
}
