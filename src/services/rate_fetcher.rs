//! Central Bank of Russia exchange rates
//!
//! Builds the monthly `RateTable` used by the monthly currency converter: one CBR
//! daily quote (first day of the month) for every publication month of a dataset.

use crate::constants::BYR_SUCCESSOR;
use crate::error::{Error, Result};
use crate::models::{MonthlyRates, RateTable, VacancyRecord};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, info, warn};

/// `<ValCurs>` root of `XML_daily.asp`
#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Nominal")]
    nominal: String,
    /// Comma decimal, e.g. "57,4247"
    #[serde(rename = "Value")]
    value: String,
}

impl Valute {
    fn rubles_per_unit(&self) -> Result<f64> {
        let value: f64 = self
            .value
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| Error::Parse(format!("Invalid {} rate '{}'", self.char_code, self.value)))?;
        let nominal: f64 = self
            .nominal
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("Invalid {} nominal '{}'", self.char_code, self.nominal)))?;
        if nominal <= 0.0 {
            return Err(Error::Parse(format!("Zero nominal for {}", self.char_code)));
        }
        Ok(value / nominal)
    }
}

/// Parse a CBR daily quote into rubles-per-unit rates for `currencies`
///
/// BYR is quoted as BYN after the 2016 redenomination; whichever of the two is
/// present fills the BYR column. Currencies absent from the quote are left out.
pub fn parse_daily_rates(xml: &str, currencies: &[String]) -> Result<HashMap<String, f64>> {
    let quote: ValCurs = quick_xml::de::from_str(xml)?;
    let by_code: HashMap<&str, &Valute> = quote
        .valutes
        .iter()
        .map(|v| (v.char_code.trim(), v))
        .collect();

    let mut rates = HashMap::new();
    for currency in currencies {
        let valute = by_code.get(currency.as_str()).or_else(|| {
            if currency == "BYR" {
                by_code.get(BYR_SUCCESSOR)
            } else {
                None
            }
        });

        match valute {
            Some(valute) => {
                rates.insert(currency.clone(), valute.rubles_per_unit()?);
            }
            None => debug!(currency = %currency, "Currency missing from daily quote"),
        }
    }

    Ok(rates)
}

/// Sorted distinct publication months of a dataset
///
/// Uses the same local "YYYY-MM" key the monthly converter looks rates up by.
pub fn months_in_dataset(records: &[VacancyRecord]) -> Result<Vec<String>> {
    let months = records
        .iter()
        .map(|record| record.month_key())
        .collect::<Result<BTreeSet<String>>>()?;
    Ok(months.into_iter().collect())
}

/// Number of vacancies per salary currency
pub fn currency_frequencies(records: &[VacancyRecord]) -> BTreeMap<String, usize> {
    let mut frequencies = BTreeMap::new();
    for record in records {
        *frequencies.entry(record.salary_currency.clone()).or_insert(0) += 1;
    }
    frequencies
}

/// Client for the CBR daily quote endpoint
pub struct CbrClient {
    base_url: String,
    client: reqwest::Client,
}

impl CbrClient {
    pub fn new(base_url: String) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid CBR base URL: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Daily quote URL for the first day of `month` ("YYYY-MM")
    pub fn quote_url(&self, month: &str) -> Result<String> {
        let (year, month_num) = month
            .split_once('-')
            .ok_or_else(|| Error::Parse(format!("Malformed month key '{}'", month)))?;
        Ok(format!(
            "{}/scripts/XML_daily.asp?date_req=01/{}/{}",
            self.base_url, month_num, year
        ))
    }

    /// Fetch the rates of the first day of `month`
    pub async fn fetch_month(&self, month: &str, currencies: &[String]) -> Result<MonthlyRates> {
        let url = self.quote_url(month)?;
        debug!(url = %url, "Fetching CBR daily quote");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("CBR request failed: {} (url: {})", e, url)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Network(format!(
                "CBR returned error status {} for {}",
                status, month
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        let rates = parse_daily_rates(&body, currencies)?;
        if rates.len() < currencies.len() {
            warn!(month, found = rates.len(), expected = currencies.len(), "Incomplete daily quote");
        }

        Ok(MonthlyRates {
            month: month.to_string(),
            rates,
        })
    }

    /// Fetch one quote per month, in month order
    pub async fn build_rate_table(&self, months: &[String], currencies: &[String]) -> Result<RateTable> {
        let mut table = RateTable::new(currencies.to_vec());
        for month in months {
            let monthly = self.fetch_month(month, currencies).await?;
            info!(month = %month, currencies = monthly.rates.len(), "Fetched monthly rates");
            table.insert(monthly);
        }
        Ok(table)
    }
}
