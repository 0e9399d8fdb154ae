use crate::constants::{BASE_CURRENCY, STATIC_RUB_RATES};
use crate::error::{Error, Result};
use crate::models::VacancyRecord;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Ruble multipliers for one publication month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRates {
    /// Month key "YYYY-MM"
    pub month: String,
    /// Currency code -> rubles per unit
    pub rates: HashMap<String, f64>,
}

/// Monthly exchange rates, as written by the `rates` command
///
/// CSV layout: `date,BYR,EUR,KZT,UAH,USD` with one row per month (`2022-07`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    currencies: Vec<String>,
    months: BTreeMap<String, HashMap<String, f64>>,
}

impl RateTable {
    pub fn new(currencies: Vec<String>) -> Self {
        Self {
            currencies,
            months: BTreeMap::new(),
        }
    }

    /// Load a rate table CSV
    ///
    /// Columns other than `date` are currency codes; unnamed index columns are ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();

        let date_idx = headers
            .iter()
            .position(|h| h == "date")
            .ok_or_else(|| Error::Parse("Rate table has no 'date' column".to_string()))?;

        let currency_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, h)| *idx != date_idx && !h.is_empty() && !h.starts_with("Unnamed"))
            .map(|(idx, h)| (idx, h.to_string()))
            .collect();

        let mut table = RateTable::new(currency_columns.iter().map(|(_, c)| c.clone()).collect());

        for result in reader.records() {
            let record = result?;
            let month = record.get(date_idx).unwrap_or("").trim().to_string();
            if month.is_empty() {
                continue;
            }

            let mut rates = HashMap::new();
            for (idx, currency) in &currency_columns {
                let raw = record.get(*idx).unwrap_or("").trim();
                if raw.is_empty() {
                    continue;
                }
                let rate: f64 = raw.parse().map_err(|_| {
                    Error::Parse(format!("Invalid {} rate '{}' for {}", currency, raw, month))
                })?;
                rates.insert(currency.clone(), rate);
            }
            table.insert(MonthlyRates { month, rates });
        }

        Ok(table)
    }

    /// Write the table with a `date` column followed by one column per currency
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;

        let mut header = vec!["date".to_string()];
        header.extend(self.currencies.iter().cloned());
        writer.write_record(&header)?;

        for (month, rates) in &self.months {
            let mut row = vec![month.clone()];
            for currency in &self.currencies {
                row.push(rates.get(currency).map_or(String::new(), |r| r.to_string()));
            }
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn insert(&mut self, monthly: MonthlyRates) {
        self.months.insert(monthly.month, monthly.rates);
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    pub fn rate(&self, currency: &str, month: &str) -> Option<f64> {
        self.months.get(month).and_then(|rates| rates.get(currency)).copied()
    }
}

/// Converts salaries into rubles
#[derive(Debug, Clone)]
pub enum CurrencyConverter {
    /// Fixed multipliers, see `STATIC_RUB_RATES`
    Static(HashMap<String, f64>),
    /// Rates looked up by publication month
    Monthly(RateTable),
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::static_rates()
    }
}

impl CurrencyConverter {
    pub fn static_rates() -> Self {
        CurrencyConverter::Static(
            STATIC_RUB_RATES
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        )
    }

    pub fn monthly(table: RateTable) -> Self {
        CurrencyConverter::Monthly(table)
    }

    /// Whether records in this currency take part in the statistics
    ///
    /// The static table rejects unknown codes with an error at conversion time instead,
    /// so every currency is "supported" there. The monthly table only covers the
    /// currencies it was built for.
    pub fn supports(&self, currency: &str) -> bool {
        match self {
            CurrencyConverter::Static(_) => true,
            CurrencyConverter::Monthly(table) => {
                currency == BASE_CURRENCY || table.currencies().iter().any(|c| c == currency)
            }
        }
    }

    /// Whether a record takes part in the statistics at all
    ///
    /// Records without a salary always count; salaried records need a supported currency.
    pub fn accepts(&self, record: &VacancyRecord) -> bool {
        record.salary_midpoint().is_none() || self.supports(&record.salary_currency)
    }

    /// Convert `amount` of `currency` published in `month` ("YYYY-MM") into rubles
    pub fn to_rubles(&self, amount: f64, currency: &str, month: &str) -> Result<f64> {
        if currency == BASE_CURRENCY {
            return Ok(amount);
        }

        let rate = match self {
            CurrencyConverter::Static(rates) => rates
                .get(currency)
                .copied()
                .ok_or_else(|| Error::UnknownCurrency(currency.to_string()))?,
            CurrencyConverter::Monthly(table) => {
                table.rate(currency, month).ok_or_else(|| Error::MissingRate {
                    currency: currency.to_string(),
                    month: month.to_string(),
                })?
            }
        };

        Ok(amount * rate)
    }

    /// Unified ruble salary of a record, `None` when the record has no salary bounds
    ///
    /// Monthly conversion floors the midpoint and the converted amount of every record;
    /// static conversion keeps fractions until the mean is floored.
    pub fn record_salary(&self, record: &VacancyRecord) -> Result<Option<f64>> {
        let Some(midpoint) = record.salary_midpoint() else {
            return Ok(None);
        };

        match self {
            CurrencyConverter::Static(_) => self.to_rubles(midpoint, &record.salary_currency, "").map(Some),
            CurrencyConverter::Monthly(_) => {
                let month = record.month_key()?;
                let rubles = self.to_rubles(midpoint.floor(), &record.salary_currency, &month)?;
                Ok(Some(rubles.floor()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_table() -> RateTable {
        let mut table = RateTable::new(vec!["USD".to_string(), "EUR".to_string()]);
        table.insert(MonthlyRates {
            month: "2022-07".to_string(),
            rates: HashMap::from([("USD".to_string(), 57.5), ("EUR".to_string(), 58.9)]),
        });
        table
    }

    #[test]
    fn test_base_currency_is_identity() {
        let static_conv = CurrencyConverter::static_rates();
        assert_eq!(static_conv.to_rubles(12345.6, "RUR", "").unwrap(), 12345.6);

        let monthly_conv = CurrencyConverter::monthly(sample_table());
        assert_eq!(monthly_conv.to_rubles(100.0, "RUR", "1999-01").unwrap(), 100.0);
    }

    #[test]
    fn test_static_conversion() {
        let conv = CurrencyConverter::static_rates();
        assert!((conv.to_rubles(100.0, "USD", "").unwrap() - 6066.0).abs() < 1e-9);
        assert!(matches!(
            conv.to_rubles(100.0, "XXX", ""),
            Err(Error::UnknownCurrency(code)) if code == "XXX"
        ));
    }

    #[test]
    fn test_monthly_conversion_and_missing_rate() {
        let conv = CurrencyConverter::monthly(sample_table());
        assert!((conv.to_rubles(10.0, "USD", "2022-07").unwrap() - 575.0).abs() < 1e-9);
        assert!(matches!(
            conv.to_rubles(10.0, "USD", "2022-08"),
            Err(Error::MissingRate { .. })
        ));
        assert!(conv.supports("EUR"));
        assert!(conv.supports("RUR"));
        assert!(!conv.supports("KZT"));
    }

    #[test]
    fn test_record_salary_uses_publication_month() {
        let conv = CurrencyConverter::monthly(sample_table());
        let record = VacancyRecord {
            name: "Developer".to_string(),
            area_name: "Moscow".to_string(),
            published_at: "2022-07-14T10:00:00+0300".to_string(),
            salary_from: Some(1000.0),
            salary_to: Some(3000.0),
            salary_currency: "USD".to_string(),
        };
        assert_eq!(conv.record_salary(&record).unwrap(), Some(115000.0));
    }

    #[test]
    fn test_monthly_salary_is_floored_per_record() {
        let conv = CurrencyConverter::monthly(sample_table());
        let mut record = VacancyRecord {
            name: "Developer".to_string(),
            area_name: "Moscow".to_string(),
            published_at: "2022-07-14T10:00:00+0300".to_string(),
            salary_from: Some(10001.0),
            salary_to: Some(10000.0),
            salary_currency: "RUR".to_string(),
        };
        assert_eq!(conv.record_salary(&record).unwrap(), Some(10000.0));

        // floor(3.5) = 3 dollars, 3 * 57.5 = 172.5 -> 172
        record.salary_from = Some(3.0);
        record.salary_to = Some(4.0);
        record.salary_currency = "USD".to_string();
        assert_eq!(conv.record_salary(&record).unwrap(), Some(172.0));

        let static_conv = CurrencyConverter::static_rates();
        record.salary_currency = "RUR".to_string();
        assert_eq!(static_conv.record_salary(&record).unwrap(), Some(3.5));
    }

    #[test]
    fn test_salaryless_record_is_accepted_in_any_currency() {
        let conv = CurrencyConverter::monthly(sample_table());
        let record = VacancyRecord {
            name: "Developer".to_string(),
            area_name: "Moscow".to_string(),
            published_at: "2022-07-14T10:00:00+0300".to_string(),
            salary_from: None,
            salary_to: None,
            salary_currency: String::new(),
        };
        assert!(conv.accepts(&record));
        assert_eq!(conv.record_salary(&record).unwrap(), None);
    }

    #[test]
    fn test_rate_table_from_file_skips_index_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ",date,BYR,USD").unwrap();
        writeln!(file, "0,2005-09,13.2,28.5").unwrap();
        writeln!(file, "1,2005-10,,28.6").unwrap();

        let table = RateTable::from_file(file.path()).unwrap();
        assert_eq!(table.currencies(), &["BYR".to_string(), "USD".to_string()]);
        assert_eq!(table.month_count(), 2);
        assert_eq!(table.rate("USD", "2005-10"), Some(28.6));
        assert_eq!(table.rate("BYR", "2005-10"), None);
    }
}
