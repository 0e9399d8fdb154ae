use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One job posting as used by the statistics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    /// Vacancy title
    pub name: String,

    /// Region (city) name
    pub area_name: String,

    /// Publication timestamp as exported, e.g. "2022-07-05T18:19:30+0300"
    pub published_at: String,

    /// Lower salary bound; both bounds may be missing
    pub salary_from: Option<f64>,

    /// Upper salary bound
    pub salary_to: Option<f64>,

    /// Currency code of the salary bounds (RUR, USD, ...)
    pub salary_currency: String,
}

impl VacancyRecord {
    /// Publication year, taken from the first four characters of the timestamp
    pub fn year(&self) -> Result<i32> {
        parse_year(&self.published_at)
    }

    /// Publication month key "YYYY-MM", used to look up monthly exchange rates
    pub fn month_key(&self) -> Result<String> {
        self.published_at
            .get(..7)
            .filter(|key| key.as_bytes()[4] == b'-')
            .map(|key| key.to_string())
            .ok_or_else(|| {
                Error::Parse(format!("Malformed publication date: '{}'", self.published_at))
            })
    }

    /// Salary before currency conversion
    ///
    /// Both bounds give their midpoint, a single bound is used as-is.
    pub fn salary_midpoint(&self) -> Option<f64> {
        match (self.salary_from, self.salary_to) {
            (Some(from), Some(to)) => Some((from + to) / 2.0),
            (Some(from), None) => Some(from),
            (None, Some(to)) => Some(to),
            (None, None) => None,
        }
    }
}

/// Extract the year from the first four characters of a publication timestamp
pub fn parse_year(published_at: &str) -> Result<i32> {
    published_at
        .get(..4)
        .and_then(|prefix| prefix.parse::<i32>().ok())
        .ok_or_else(|| Error::Parse(format!("Malformed publication date: '{}'", published_at)))
}

/// Substring matcher for the profession filter
#[derive(Debug, Clone)]
pub struct ProfessionMatcher {
    needle: String,
    case_insensitive: bool,
}

impl ProfessionMatcher {
    pub fn new(profession: &str, case_insensitive: bool) -> Self {
        let needle = if case_insensitive {
            profession.to_lowercase()
        } else {
            profession.to_string()
        };
        Self {
            needle,
            case_insensitive,
        }
    }

    /// An empty profession matches every title
    pub fn matches(&self, title: &str) -> bool {
        if self.case_insensitive {
            title.to_lowercase().contains(&self.needle)
        } else {
            title.contains(&self.needle)
        }
    }
}

/// How rows of an input CSV are screened before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RowPolicy {
    /// Drop rows whose field count differs from the header
    #[default]
    Lenient,
    /// Additionally drop rows that contain any empty field
    Strict,
}

impl RowPolicy {
    pub fn accepts(&self, header_len: usize, row: &csv::StringRecord) -> bool {
        if row.len() != header_len {
            return false;
        }
        match self {
            RowPolicy::Lenient => true,
            RowPolicy::Strict => row.iter().all(|field| !field.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(published_at: &str, from: Option<f64>, to: Option<f64>) -> VacancyRecord {
        VacancyRecord {
            name: "Python Developer".to_string(),
            area_name: "Moscow".to_string(),
            published_at: published_at.to_string(),
            salary_from: from,
            salary_to: to,
            salary_currency: "RUR".to_string(),
        }
    }

    #[test]
    fn test_year_and_month_extraction() {
        let vacancy = record("2022-07-05T18:19:30+0300", Some(1.0), None);
        assert_eq!(vacancy.year().unwrap(), 2022);
        assert_eq!(vacancy.month_key().unwrap(), "2022-07");
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        assert!(parse_year("20x2-01-01").is_err());
        assert!(parse_year("202").is_err());
        assert!(record("2022/07/05", Some(1.0), None).month_key().is_err());
    }

    #[test]
    fn test_salary_midpoint_fallback() {
        assert_eq!(record("2022", Some(10000.0), Some(20000.0)).salary_midpoint(), Some(15000.0));
        assert_eq!(record("2022", Some(10000.0), None).salary_midpoint(), Some(10000.0));
        assert_eq!(record("2022", None, Some(30000.0)).salary_midpoint(), Some(30000.0));
        assert_eq!(record("2022", None, None).salary_midpoint(), None);
    }

    #[test]
    fn test_profession_matcher_case_rules() {
        let exact = ProfessionMatcher::new("Developer", false);
        assert!(exact.matches("Senior Developer"));
        assert!(!exact.matches("senior developer"));

        let relaxed = ProfessionMatcher::new("Developer", true);
        assert!(relaxed.matches("senior developer"));
        assert!(relaxed.matches("DEVELOPER"));
        assert!(!relaxed.matches("Designer"));

        assert!(ProfessionMatcher::new("", false).matches("anything"));
    }

    #[test]
    fn test_row_policy() {
        let full = csv::StringRecord::from(vec!["a", "b", "c"]);
        let gap = csv::StringRecord::from(vec!["a", "", "c"]);
        let short = csv::StringRecord::from(vec!["a", "b"]);

        assert!(RowPolicy::Lenient.accepts(3, &full));
        assert!(RowPolicy::Lenient.accepts(3, &gap));
        assert!(!RowPolicy::Lenient.accepts(3, &short));
        assert!(RowPolicy::Strict.accepts(3, &full));
        assert!(!RowPolicy::Strict.accepts(3, &gap));
    }
}
