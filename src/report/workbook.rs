//! Two-sheet xlsx workbook: statistics by year and by city

use crate::error::Result;
use crate::models::StatisticsReport;
use rust_xlsxwriter::{ColNum, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

pub const YEAR_SHEET: &str = "Statistics by year";
pub const CITY_SHEET: &str = "Statistics by city";

struct Formats {
    header: Format,
    cell: Format,
    percent: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold().set_border(FormatBorder::Thin),
            cell: Format::new().set_border(FormatBorder::Thin),
            percent: Format::new().set_border(FormatBorder::Thin).set_num_format("0.00%"),
        }
    }
}

/// Tracks the longest text per column; width = longest + 2
#[derive(Default)]
struct ColumnWidths(Vec<usize>);

impl ColumnWidths {
    fn observe(&mut self, col: usize, text: &str) {
        if self.0.len() <= col {
            self.0.resize(col + 1, 0);
        }
        self.0[col] = self.0[col].max(text.chars().count());
    }

    fn apply(&self, sheet: &mut Worksheet) -> Result<()> {
        for (col, width) in self.0.iter().enumerate() {
            sheet.set_column_width(col as ColNum, (*width + 2) as f64)?;
        }
        Ok(())
    }
}

fn write_header(sheet: &mut Worksheet, headers: &[String], formats: &Formats, widths: &mut ColumnWidths) -> Result<()> {
    for (col, title) in headers.iter().enumerate() {
        if title.is_empty() {
            continue;
        }
        sheet.write_string_with_format(0, col as ColNum, title, &formats.header)?;
        widths.observe(col, title);
    }
    Ok(())
}

fn write_year_sheet(sheet: &mut Worksheet, report: &StatisticsReport, formats: &Formats) -> Result<()> {
    sheet.set_name(YEAR_SHEET)?;
    let mut widths = ColumnWidths::default();
    let headers = vec![
        "Year".to_string(),
        "Mean salary".to_string(),
        format!("Mean salary - {}", report.profession),
        "Vacancies".to_string(),
        format!("Vacancies - {}", report.profession),
    ];
    write_header(sheet, &headers, formats, &mut widths)?;

    let yearly = &report.yearly;
    for (idx, year) in yearly.years().into_iter().enumerate() {
        let row = (idx + 1) as u32;
        let values = [
            year as f64,
            yearly.salary_by_year.get(&year).copied().unwrap_or(0) as f64,
            yearly.profession_salary_by_year.get(&year).copied().unwrap_or(0) as f64,
            yearly.count_by_year.get(&year).copied().unwrap_or(0) as f64,
            yearly.profession_count_by_year.get(&year).copied().unwrap_or(0) as f64,
        ];
        for (col, value) in values.iter().enumerate() {
            sheet.write_number_with_format(row, col as ColNum, *value, &formats.cell)?;
            widths.observe(col, &value.to_string());
        }
    }

    widths.apply(sheet)
}

fn write_city_sheet(sheet: &mut Worksheet, report: &StatisticsReport, formats: &Formats) -> Result<()> {
    sheet.set_name(CITY_SHEET)?;
    let mut widths = ColumnWidths::default();
    let headers: Vec<String> = ["City", "Salary level", "", "City", "Vacancy share"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    write_header(sheet, &headers, formats, &mut widths)?;

    let cities = &report.cities;
    for (idx, ((salary_city, salary), (share_city, share))) in cities
        .salary_by_city
        .iter()
        .zip(cities.share_by_city.iter())
        .enumerate()
    {
        let row = (idx + 1) as u32;
        sheet.write_string_with_format(row, 0, salary_city, &formats.cell)?;
        sheet.write_number_with_format(row, 1, *salary as f64, &formats.cell)?;
        sheet.write_string_with_format(row, 3, share_city, &formats.cell)?;
        sheet.write_number_with_format(row, 4, *share, &formats.percent)?;

        widths.observe(0, salary_city);
        widths.observe(1, &salary.to_string());
        widths.observe(3, share_city);
        widths.observe(4, &share.to_string());
    }

    widths.apply(sheet)
}

/// Write the workbook to `path`
pub fn write_workbook(report: &StatisticsReport, path: &Path) -> Result<()> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    write_year_sheet(workbook.add_worksheet(), report, &formats)?;
    write_city_sheet(workbook.add_worksheet(), report, &formats)?;

    workbook.save(path)?;
    info!(path = %path.display(), "Wrote workbook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_write_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        write_workbook(&sample_report(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_column_widths_track_longest_text() {
        let mut widths = ColumnWidths::default();
        widths.observe(2, "Mean salary - Developer");
        widths.observe(0, "Year");
        widths.observe(0, "2022");
        assert_eq!(widths.0, vec![4, 0, 23]);
    }
}
