use serde::{Deserialize, Serialize};

/// Salary block of a full-format vacancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedSalary {
    pub salary_from: f64,
    pub salary_to: f64,
    /// Salary is stated before tax ("True"/"False" in the export)
    pub gross: bool,
    pub currency: String,
}

/// A vacancy of the full export format, shown by the vacancy table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedVacancy {
    pub name: String,
    pub description: String,
    /// Skills separated by newlines
    pub key_skills: String,
    /// noExperience, between1And3, between3And6, moreThan6
    pub experience_id: String,
    pub premium: bool,
    pub employer_name: String,
    pub salary: ListedSalary,
    pub area_name: String,
    pub published_at: String,
}

impl ListedVacancy {
    pub fn skills(&self) -> Vec<&str> {
        self.key_skills.split('\n').collect()
    }
}

/// Experience codes with their display name and the upper bound of years used for sorting
const EXPERIENCE_LEVELS: &[(&str, &str, u32)] = &[
    ("noExperience", "No experience", 0),
    ("between1And3", "1 to 3 years", 3),
    ("between3And6", "3 to 6 years", 6),
    ("moreThan6", "More than 6 years", 7),
];

/// Currency codes with their display name
const CURRENCY_NAMES: &[(&str, &str)] = &[
    ("AZN", "Manats"),
    ("BYR", "Belarusian rubles"),
    ("EUR", "Euro"),
    ("GEL", "Georgian lari"),
    ("KGS", "Kyrgyz som"),
    ("KZT", "Tenge"),
    ("RUR", "Rubles"),
    ("UAH", "Hryvnias"),
    ("USD", "Dollars"),
    ("UZS", "Uzbek sum"),
];

pub fn experience_display(code: &str) -> &str {
    EXPERIENCE_LEVELS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or(code, |(_, name, _)| *name)
}

/// Accepts either the display name or the raw code
pub fn experience_code(display: &str) -> &str {
    EXPERIENCE_LEVELS
        .iter()
        .find(|(_, name, _)| *name == display)
        .map_or(display, |(code, _, _)| *code)
}

/// Unknown codes rank after every known level
pub fn experience_rank(code: &str) -> u32 {
    EXPERIENCE_LEVELS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map_or(7, |(_, _, rank)| *rank)
}

pub fn currency_display(code: &str) -> &str {
    CURRENCY_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(code, |(_, name)| *name)
}

/// Accepts either the display name or the raw code
pub fn currency_code(display: &str) -> &str {
    CURRENCY_NAMES
        .iter()
        .find(|(_, name)| *name == display)
        .map_or(display, |(code, _)| *code)
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_lookups() {
        assert_eq!(experience_display("between1And3"), "1 to 3 years");
        assert_eq!(experience_code("More than 6 years"), "moreThan6");
        assert_eq!(experience_code("noExperience"), "noExperience");
        assert_eq!(experience_rank("noExperience"), 0);
        assert_eq!(experience_rank("between3And6"), 6);
        assert_eq!(experience_rank("unknown"), 7);
    }

    #[test]
    fn test_currency_lookups() {
        assert_eq!(currency_display("RUR"), "Rubles");
        assert_eq!(currency_code("Euro"), "EUR");
        assert_eq!(currency_code("XYZ"), "XYZ");
    }
}
