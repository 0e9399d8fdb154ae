use crate::constants::{DEFAULT_CBR_BASE_URL, DEFAULT_HH_BASE_URL};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Get year partition directory from environment variable or use default
pub fn get_partition_dir() -> PathBuf {
    std::env::var("VACANCY_PARTITION_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("created_csv_by_year"))
}

/// Get report output directory from environment variable or use default
pub fn get_report_dir() -> PathBuf {
    std::env::var("REPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Path of the wkhtmltopdf binary used for PDF conversion
pub fn get_wkhtmltopdf_path() -> PathBuf {
    std::env::var("WKHTMLTOPDF_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("wkhtmltopdf"))
}

pub fn get_cbr_base_url() -> String {
    std::env::var("CBR_BASE_URL").unwrap_or_else(|_| DEFAULT_CBR_BASE_URL.to_string())
}

pub fn get_hh_base_url() -> String {
    std::env::var("HH_BASE_URL").unwrap_or_else(|_| DEFAULT_HH_BASE_URL.to_string())
}

/// Ask for a value on stdin when it was not passed on the command line
pub fn prompt_line(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Format an integer with thousands separators (1234567 -> "1 234 567")
pub fn format_thousands(n: i64, separator: char) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, separator);
        }
        result.insert(0, c);
    }
    if n < 0 {
        result.insert(0, '-');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0, ' '), "0");
        assert_eq!(format_thousands(999, ' '), "999");
        assert_eq!(format_thousands(1000, ' '), "1 000");
        assert_eq!(format_thousands(1234567, ','), "1,234,567");
        assert_eq!(format_thousands(-45000, ' '), "-45 000");
    }
}
