use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregates of a single publication year, produced by one year task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPartialStats {
    pub year: i32,
    pub vacancy_count: usize,
    pub mean_salary: i64,
    pub profession_vacancy_count: usize,
    pub profession_mean_salary: i64,
}

/// Year-indexed statistics; `BTreeMap` keeps years ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub salary_by_year: BTreeMap<i32, i64>,
    pub count_by_year: BTreeMap<i32, usize>,
    pub profession_salary_by_year: BTreeMap<i32, i64>,
    pub profession_count_by_year: BTreeMap<i32, usize>,
}

impl YearlyStats {
    /// Fold one year's result into the accumulator
    pub fn merge(mut self, partial: YearPartialStats) -> Self {
        if self.count_by_year.contains_key(&partial.year) {
            warn!(year = partial.year, "Year merged twice, keeping the latest result");
        }

        self.salary_by_year.insert(partial.year, partial.mean_salary);
        self.count_by_year.insert(partial.year, partial.vacancy_count);
        self.profession_salary_by_year
            .insert(partial.year, partial.profession_mean_salary);
        self.profession_count_by_year
            .insert(partial.year, partial.profession_vacancy_count);
        self
    }

    pub fn from_partials<I>(partials: I) -> Self
    where
        I: IntoIterator<Item = YearPartialStats>,
    {
        partials
            .into_iter()
            .fold(YearlyStats::default(), |acc, partial| acc.merge(partial))
    }

    pub fn years(&self) -> Vec<i32> {
        self.count_by_year.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.count_by_year.is_empty()
    }
}

/// City rankings, each sorted by value descending and truncated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    pub salary_by_city: Vec<(String, i64)>,
    pub share_by_city: Vec<(String, f64)>,
}

impl CityStats {
    /// Share left over for cities outside the ranking
    pub fn remaining_share(&self) -> f64 {
        1.0 - self.share_by_city.iter().map(|(_, share)| share).sum::<f64>()
    }
}

/// The six finished mappings handed to every presenter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub profession: String,
    pub yearly: YearlyStats,
    pub cities: CityStats,
}
