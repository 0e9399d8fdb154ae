use crate::constants::RATE_TABLE_CURRENCIES;
use crate::error::{Error, Result};
use crate::models::RowPolicy;
use crate::services::{currency_frequencies, load_records, months_in_dataset, CbrClient};
use crate::utils::get_cbr_base_url;
use std::path::{Path, PathBuf};

pub fn run(file: PathBuf, output: PathBuf) {
    println!("💱 Collecting monthly exchange rates for {}", file.display());

    match collect_rates(&file, &output) {
        Ok(months) => {
            println!("\n✅ Wrote {} months of rates to {}", months, output.display());
        }
        Err(e) => {
            eprintln!("❌ Rate collection failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn collect_rates(file: &Path, output: &Path) -> Result<usize> {
    let records = load_records(file, RowPolicy::Lenient)?;

    println!("   Vacancies per currency:");
    for (currency, count) in currency_frequencies(&records) {
        println!("   {:>6} {}", currency, count);
    }

    let months = months_in_dataset(&records)?;
    match (months.first(), months.last()) {
        (Some(first), Some(last)) => println!("   Months: {} → {} ({})", first, last, months.len()),
        _ => return Err(Error::InvalidInput(format!("No vacancies in {}", file.display()))),
    }

    let currencies: Vec<String> = RATE_TABLE_CURRENCIES.iter().map(|c| c.to_string()).collect();
    let client = CbrClient::new(get_cbr_base_url())?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;
    let table = runtime.block_on(client.build_rate_table(&months, &currencies))?;

    table.write_csv(output)?;
    Ok(table.month_count())
}
