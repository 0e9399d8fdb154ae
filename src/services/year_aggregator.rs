use crate::error::{Error, Result};
use crate::models::{CurrencyConverter, ProfessionMatcher, RowPolicy, VacancyRecord, YearPartialStats};
use crate::services::dataset::load_records;
use crate::services::statistics::{floored_mean, mean};
use std::path::Path;
use tracing::debug;

/// Read-only inputs shared by every year task
#[derive(Debug, Clone)]
pub struct AggregationContext {
    pub matcher: ProfessionMatcher,
    pub converter: CurrencyConverter,
    pub row_policy: RowPolicy,
}

impl AggregationContext {
    pub fn new(matcher: ProfessionMatcher, converter: CurrencyConverter, row_policy: RowPolicy) -> Self {
        Self {
            matcher,
            converter,
            row_policy,
        }
    }
}

/// Result of one year task: its statistics plus the records it aggregated
#[derive(Debug, Clone)]
pub struct YearOutcome {
    pub stats: YearPartialStats,
    pub records: Vec<VacancyRecord>,
}

/// Aggregate the records of one publication year
///
/// Counts include records without a salary; means cover salaried records only.
/// Salaried records in a currency the converter does not cover are left out. A year
/// without any salary is an `EmptyGroup` error; a year without a profession match
/// reports a zero count and a zero mean.
pub fn aggregate_year(year: i32, records: &[VacancyRecord], ctx: &AggregationContext) -> Result<YearPartialStats> {
    let mut vacancy_count = 0;
    let mut profession_vacancy_count = 0;
    let mut salaries = Vec::with_capacity(records.len());
    let mut profession_salaries = Vec::new();

    for record in records.iter().filter(|r| ctx.converter.accepts(r)) {
        let is_profession = ctx.matcher.matches(&record.name);
        vacancy_count += 1;
        if is_profession {
            profession_vacancy_count += 1;
        }

        if let Some(salary) = ctx.converter.record_salary(record)? {
            salaries.push(salary);
            if is_profession {
                profession_salaries.push(salary);
            }
        }
    }

    let mean_salary = floored_mean(&salaries, &format!("year {}", year))?;
    let profession_mean_salary = mean(&profession_salaries).map_or(0, |m| m.floor() as i64);

    debug!(
        year,
        vacancies = vacancy_count,
        salaried = salaries.len(),
        profession_vacancies = profession_vacancy_count,
        "Aggregated year"
    );

    Ok(YearPartialStats {
        year,
        vacancy_count,
        mean_salary,
        profession_vacancy_count,
        profession_mean_salary,
    })
}

/// Load one year partition file and aggregate it
///
/// Every record must belong to `year`; a stray row means the partition is corrupt.
pub fn aggregate_partition(year: i32, path: &Path, ctx: &AggregationContext) -> Result<YearOutcome> {
    let records = load_records(path, ctx.row_policy)?;

    if let Some(stray) = records.iter().find(|r| r.year().ok() != Some(year)) {
        return Err(Error::Parse(format!(
            "Partition {} holds a record published at '{}'",
            path.display(),
            stray.published_at
        )));
    }

    let stats = aggregate_year(year, &records, ctx)?;
    Ok(YearOutcome { stats, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthlyRates, RateTable};
    use std::collections::HashMap;

    fn vacancy(name: &str, from: f64, to: f64, currency: &str, published_at: &str) -> VacancyRecord {
        VacancyRecord {
            name: name.to_string(),
            area_name: "Moscow".to_string(),
            published_at: published_at.to_string(),
            salary_from: Some(from),
            salary_to: Some(to),
            salary_currency: currency.to_string(),
        }
    }

    fn ctx(profession: &str, case_insensitive: bool) -> AggregationContext {
        AggregationContext::new(
            ProfessionMatcher::new(profession, case_insensitive),
            CurrencyConverter::static_rates(),
            RowPolicy::Lenient,
        )
    }

    #[test]
    fn test_aggregate_year_counts_and_means() {
        let records = vec![
            vacancy("Python Developer", 10000.0, 20000.0, "RUR", "2020-01-01"),
            vacancy("Manager", 30000.0, 50000.0, "RUR", "2020-02-01"),
            vacancy("Java Developer", 20000.0, 21000.0, "RUR", "2020-03-01"),
        ];

        let stats = aggregate_year(2020, &records, &ctx("Developer", false)).unwrap();
        assert_eq!(stats.vacancy_count, 3);
        // (15000 + 40000 + 20500) / 3 = 25166.67
        assert_eq!(stats.mean_salary, 25166);
        assert_eq!(stats.profession_vacancy_count, 2);
        assert_eq!(stats.profession_mean_salary, 17750);
    }

    #[test]
    fn test_no_profession_match_reports_zero() {
        let records = vec![vacancy("Manager", 30000.0, 50000.0, "RUR", "2020-02-01")];
        let stats = aggregate_year(2020, &records, &ctx("Developer", false)).unwrap();
        assert_eq!(stats.profession_vacancy_count, 0);
        assert_eq!(stats.profession_mean_salary, 0);
    }

    #[test]
    fn test_empty_year_is_error() {
        let result = aggregate_year(2020, &[], &ctx("Developer", false));
        assert!(matches!(result, Err(Error::EmptyGroup(_))));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let records = vec![vacancy("senior DEVELOPER", 10000.0, 10000.0, "RUR", "2020-01-01")];
        assert_eq!(
            aggregate_year(2020, &records, &ctx("developer", false)).unwrap().profession_vacancy_count,
            0
        );
        assert_eq!(
            aggregate_year(2020, &records, &ctx("developer", true)).unwrap().profession_vacancy_count,
            1
        );
    }

    #[test]
    fn test_monthly_rates_skip_unsupported_currencies() {
        let mut table = RateTable::new(vec!["USD".to_string()]);
        table.insert(MonthlyRates {
            month: "2020-01".to_string(),
            rates: HashMap::from([("USD".to_string(), 60.0)]),
        });
        let ctx = AggregationContext::new(
            ProfessionMatcher::new("Developer", false),
            CurrencyConverter::monthly(table),
            RowPolicy::Lenient,
        );

        let records = vec![
            vacancy("Developer", 1000.0, 1000.0, "USD", "2020-01-10T10:00:00+0300"),
            vacancy("Manager", 30000.0, 30000.0, "RUR", "2020-01-11T10:00:00+0300"),
            vacancy("Driver", 500.0, 500.0, "KZT", "2020-01-12T10:00:00+0300"),
        ];

        let stats = aggregate_year(2020, &records, &ctx).unwrap();
        assert_eq!(stats.vacancy_count, 2);
        assert_eq!(stats.mean_salary, 45000);
        assert_eq!(stats.profession_mean_salary, 60000);
    }

    #[test]
    fn test_rows_without_salary_count_but_skip_means() {
        let mut intern = vacancy("Junior Developer", 0.0, 0.0, "", "2020-03-01");
        intern.salary_from = None;
        intern.salary_to = None;
        let records = vec![
            vacancy("Python Developer", 10000.0, 20000.0, "RUR", "2020-01-01"),
            vacancy("Manager", 30000.0, 50000.0, "RUR", "2020-02-01"),
            intern,
        ];

        let stats = aggregate_year(2020, &records, &ctx("Developer", false)).unwrap();
        assert_eq!(stats.vacancy_count, 3);
        assert_eq!(stats.mean_salary, 27500);
        assert_eq!(stats.profession_vacancy_count, 2);
        assert_eq!(stats.profession_mean_salary, 15000);
    }

    #[test]
    fn test_partition_row_count_matches_vacancy_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunk_2020.csv");
        std::fs::write(
            &path,
            "name,salary_from,salary_to,salary_currency,area_name,published_at\n\
             Python Developer,10000,20000,RUR,Moscow,2020-01-10T10:00:00+0300\n\
             Developer,,,RUR,Kazan,2020-02-10T10:00:00+0300\n\
             Manager,30000,50000,RUR,Moscow,2020-03-10T10:00:00+0300\n",
        )
        .unwrap();

        let outcome = aggregate_partition(2020, &path, &ctx("Developer", false)).unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.stats.vacancy_count, 3);
        assert_eq!(outcome.stats.profession_vacancy_count, 2);
        assert_eq!(outcome.stats.mean_salary, 27500);
        assert_eq!(outcome.stats.profession_mean_salary, 15000);
    }

    #[test]
    fn test_monthly_rates_floor_each_salary() {
        let monthly = AggregationContext::new(
            ProfessionMatcher::new("Developer", false),
            CurrencyConverter::monthly(RateTable::new(vec!["USD".to_string()])),
            RowPolicy::Lenient,
        );
        let records = vec![
            vacancy("Developer", 10001.0, 10000.0, "RUR", "2020-01-10T10:00:00+0300"),
            vacancy("Developer", 10001.0, 10002.0, "RUR", "2020-01-11T10:00:00+0300"),
        ];

        // floor(10000.5) = 10000, floor(10001.5) = 10001, mean 10000.5
        let stats = aggregate_year(2020, &records, &monthly).unwrap();
        assert_eq!(stats.mean_salary, 10000);

        let static_stats = aggregate_year(2020, &records, &ctx("Developer", false)).unwrap();
        assert_eq!(static_stats.mean_salary, 10001);
    }

    #[test]
    fn test_aggregate_partition_rejects_foreign_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunk_2020.csv");
        std::fs::write(
            &path,
            "name,salary_from,salary_to,salary_currency,area_name,published_at\n\
             Developer,1,2,RUR,Moscow,2021-01-01T00:00:00+0300\n",
        )
        .unwrap();

        let result = aggregate_partition(2020, &path, &ctx("Developer", false));
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
