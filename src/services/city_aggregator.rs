use crate::constants::{CITY_SHARE_THRESHOLD_PERCENT, SHARE_DECIMALS, TOP_CITIES};
use crate::error::Result;
use crate::models::{CityStats, CurrencyConverter, VacancyRecord};
use crate::services::statistics::{floored_mean, round_to, sort_by_value};
use std::collections::HashMap;
use tracing::debug;

/// Per-city salary level and vacancy share over the whole dataset
///
/// Only cities holding at least 1% of all vacancies are ranked. Records without a
/// salary count towards shares and are left out of salary means; a city with no
/// salaried record has no salary level. Both rankings are sorted by value
/// descending (ties keep first-appearance order) and truncated to the top ten.
pub fn aggregate_cities(records: &[VacancyRecord], converter: &CurrencyConverter) -> Result<CityStats> {
    // City order follows first appearance so equal values stay in input order
    let mut order: Vec<&str> = Vec::new();
    let mut cities: HashMap<&str, CityTally> = HashMap::new();
    let mut total = 0usize;

    for record in records.iter().filter(|r| converter.accepts(r)) {
        let city = record.area_name.as_str();
        let tally = cities.entry(city).or_insert_with(|| {
            order.push(city);
            CityTally::default()
        });
        tally.count += 1;
        if let Some(salary) = converter.record_salary(record)? {
            tally.salaries.push(salary);
        }
        total += 1;
    }

    let mut salary_by_city: Vec<(String, i64)> = Vec::new();
    let mut share_by_city: Vec<(String, f64)> = Vec::new();

    for city in order {
        let tally = &cities[city];
        if !meets_threshold(tally.count, total) {
            continue;
        }
        if !tally.salaries.is_empty() {
            salary_by_city.push((city.to_string(), floored_mean(&tally.salaries, city)?));
        }
        share_by_city.push((
            city.to_string(),
            round_to(tally.count as f64 / total as f64, SHARE_DECIMALS),
        ));
    }

    debug!(
        total_vacancies = total,
        ranked_cities = share_by_city.len(),
        "Aggregated cities"
    );

    sort_by_value(&mut salary_by_city, true);
    sort_by_value(&mut share_by_city, true);
    salary_by_city.truncate(TOP_CITIES);
    share_by_city.truncate(TOP_CITIES);

    Ok(CityStats {
        salary_by_city,
        share_by_city,
    })
}

#[derive(Default)]
struct CityTally {
    count: usize,
    salaries: Vec<f64>,
}

/// `count / total >= 1%`, compared in integers so the boundary is exact
fn meets_threshold(count: usize, total: usize) -> bool {
    count * 100 >= total * CITY_SHARE_THRESHOLD_PERCENT
}
