use crate::models::StatisticsReport;
use std::collections::BTreeMap;
use std::fmt::Display;

fn format_years<V: Display>(values: &BTreeMap<i32, V>) -> String {
    let entries: Vec<String> = values.iter().map(|(year, v)| format!("{}: {}", year, v)).collect();
    format!("{{{}}}", entries.join(", "))
}

fn format_cities<V: Display>(values: &[(String, V)]) -> String {
    let entries: Vec<String> = values
        .iter()
        .map(|(city, v)| format!("'{}': {}", city, v))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// The six labelled statistics lines
pub fn format_console(report: &StatisticsReport) -> String {
    let yearly = &report.yearly;
    [
        format!("Salary dynamics by year: {}", format_years(&yearly.salary_by_year)),
        format!("Vacancy count dynamics by year: {}", format_years(&yearly.count_by_year)),
        format!(
            "Salary dynamics by year for the selected profession: {}",
            format_years(&yearly.profession_salary_by_year)
        ),
        format!(
            "Vacancy count dynamics by year for the selected profession: {}",
            format_years(&yearly.profession_count_by_year)
        ),
        format!(
            "Salary level by city (descending): {}",
            format_cities(&report.cities.salary_by_city)
        ),
        format!(
            "Vacancy share by city (descending): {}",
            format_cities(&report.cities.share_by_city)
        ),
    ]
    .join("\n")
}

pub fn print_report(report: &StatisticsReport) {
    println!("{}", format_console(report));
}
