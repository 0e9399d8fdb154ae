use crate::cli::StatsArgs;
use crate::error::{Error, Result};
use crate::models::{
    CurrencyConverter, ProfessionMatcher, RateTable, ReportOutputs, RowPolicy, StatisticsReport, StatsConfig,
};
use crate::report::{print_report, write_outputs};
use crate::services::{aggregate_cities, list_partitions, partition_file, run_year_jobs, AggregationContext, YearJob};
use crate::utils::prompt_line;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub fn run(args: StatsArgs) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match run_stats(&config) {
        Ok(report) => {
            print_report(&report);

            if config.outputs.any() {
                match write_outputs(&report, config.outputs, &config.report_dir) {
                    Ok(paths) => {
                        for path in paths {
                            eprintln!("📄 {}", path.display());
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ Report generation failed: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Statistics failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Turn command line arguments into a config, prompting for what is missing
fn build_config(args: StatsArgs) -> Result<StatsConfig> {
    let source = if args.use_partitions {
        None
    } else {
        match args.file {
            Some(file) => Some(file),
            None => Some(PathBuf::from(prompt_line("Enter file name")?)),
        }
    };

    let profession = match args.profession {
        Some(profession) => profession,
        None => prompt_line("Enter profession name")?,
    };

    let mut config = StatsConfig::new(source, profession);
    config.case_insensitive = args.case_insensitive;
    config.row_policy = if args.strict { RowPolicy::Strict } else { RowPolicy::Lenient };
    config.rates_file = args.rates;
    config.mode = args.mode;
    if let Some(workers) = args.workers {
        config.max_workers = workers.max(1);
    }
    if let Some(dir) = args.partition_dir {
        config.partition_dir = dir;
    }
    if let Some(dir) = args.report_dir {
        config.report_dir = dir;
    }
    config.outputs = if args.report {
        ReportOutputs::all()
    } else {
        ReportOutputs {
            workbook: args.xlsx,
            chart: args.chart,
            pdf: args.pdf,
        }
    };

    Ok(config)
}

/// Partition, aggregate every year, rank cities
pub fn run_stats(config: &StatsConfig) -> Result<StatisticsReport> {
    let start = Instant::now();

    let partitions = match &config.source {
        Some(source) => {
            let summary = partition_file(source, &config.partition_dir, config.row_policy)?;
            if summary.dropped > 0 {
                info!(dropped = summary.dropped, "Dropped malformed rows");
            }
            summary.files
        }
        None => list_partitions(&config.partition_dir)?,
    };

    if partitions.is_empty() {
        return Err(Error::NotFound(format!(
            "No year partitions in {}",
            config.partition_dir.display()
        )));
    }

    let converter = match &config.rates_file {
        Some(path) => CurrencyConverter::monthly(RateTable::from_file(path)?),
        None => CurrencyConverter::static_rates(),
    };

    let ctx = Arc::new(AggregationContext::new(
        ProfessionMatcher::new(&config.profession, config.case_insensitive),
        converter,
        config.row_policy,
    ));

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    let fan_in = runtime.block_on(run_year_jobs(
        YearJob::from_partitions(&partitions),
        Arc::clone(&ctx),
        config.mode,
        config.max_workers,
    ))?;

    let cities = aggregate_cities(&fan_in.records, &ctx.converter)?;

    info!(
        years = fan_in.yearly.years().len(),
        vacancies = fan_in.records.len(),
        duration_s = start.elapsed().as_secs_f64(),
        "Statistics computed"
    );

    Ok(StatisticsReport {
        profession: config.profession.clone(),
        yearly: fan_in.yearly,
        cities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExecutionMode;
    use std::collections::BTreeMap;

    const DATASET: &str = "\
name,salary_from,salary_to,salary_currency,area_name,published_at
Python Developer,10000,20000,RUR,Moscow,2020-01-10T10:00:00+0300
Manager,30000,50000,RUR,Moscow,2020-02-10T10:00:00+0300
Java Developer,60000,80000,RUR,Kazan,2021-03-10T10:00:00+0300
Analyst,20000,30000,RUR,Kazan,2020-03-10T10:00:00+0300
Manager,50000,70000,RUR,Moscow,2021-04-10T10:00:00+0300
Designer,10000,10000,RUR,Perm,2020-04-10T10:00:00+0300
Accountant,20000,40000,RUR,Perm,2021-05-10T10:00:00+0300
Tester,40000,60000,RUR,Moscow,2020-05-10T10:00:00+0300
Lawyer,30000,50000,RUR,Kazan,2021-06-10T10:00:00+0300
Driver,25000,35000,RUR,Moscow,2021-07-10T10:00:00+0300
";

    fn config_for(dir: &std::path::Path) -> StatsConfig {
        let source = dir.join("vacancies.csv");
        std::fs::write(&source, DATASET).unwrap();

        let mut config = StatsConfig::new(Some(source), "Developer".to_string());
        config.partition_dir = dir.join("parts");
        config.report_dir = dir.join("out");
        config
    }

    #[test]
    fn test_run_stats_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_stats(&config_for(dir.path())).unwrap();

        assert_eq!(report.yearly.salary_by_year, BTreeMap::from([(2020, 28000), (2021, 46000)]));
        assert_eq!(report.yearly.count_by_year, BTreeMap::from([(2020, 5), (2021, 5)]));
        assert_eq!(
            report.yearly.profession_salary_by_year,
            BTreeMap::from([(2020, 15000), (2021, 70000)])
        );

        // Moscow 5, Kazan 3, Perm 2 of 10
        assert_eq!(
            report.cities.share_by_city,
            vec![
                ("Moscow".to_string(), 0.5),
                ("Kazan".to_string(), 0.3),
                ("Perm".to_string(), 0.2)
            ]
        );
        // Kazan (70000 + 25000 + 40000) / 3 = 45000
        assert_eq!(report.cities.salary_by_city[0], ("Kazan".to_string(), 45000));
    }

    #[test]
    fn test_reuse_partitions_matches_fresh_split() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path());
        let fresh = run_stats(&config).unwrap();

        config.source = None;
        config.mode = ExecutionMode::Sequential;
        let reused = run_stats(&config).unwrap();
        assert_eq!(fresh, reused);
    }

    #[test]
    fn test_no_partitions_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StatsConfig::new(None, "Developer".to_string());
        config.partition_dir = dir.path().to_path_buf();

        assert!(matches!(run_stats(&config), Err(Error::NotFound(_))));
    }
}
