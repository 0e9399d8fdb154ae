//! Presenters over a finished `StatisticsReport`
//!
//! Every renderer is independent: console lines, xlsx workbook, SVG chart grid and
//! the HTML/PDF report.

pub mod chart;
pub mod console;
pub mod pdf;
pub mod workbook;

pub use chart::{render_chart_svg, write_chart};
pub use console::{format_console, print_report};
pub use pdf::PdfExporter;
pub use workbook::write_workbook;

use crate::constants::{CHART_FILE, HTML_REPORT_FILE, PDF_REPORT_FILE, WORKBOOK_FILE};
use crate::error::{Error, Result};
use crate::models::{ReportOutputs, StatisticsReport};
use crate::utils::get_wkhtmltopdf_path;
use std::path::{Path, PathBuf};

/// Write the requested artifacts into `report_dir` and return their paths
///
/// The PDF embeds the chart, so asking for a PDF writes the chart too.
pub fn write_outputs(report: &StatisticsReport, outputs: ReportOutputs, report_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(report_dir)
        .map_err(|e| Error::Io(format!("Failed to create {}: {}", report_dir.display(), e)))?;

    let mut written = Vec::new();

    if outputs.workbook {
        let path = report_dir.join(WORKBOOK_FILE);
        write_workbook(report, &path)?;
        written.push(path);
    }

    let chart_path = report_dir.join(CHART_FILE);
    if outputs.chart || outputs.pdf {
        write_chart(report, &chart_path)?;
        written.push(chart_path.clone());
    }

    if outputs.pdf {
        let html_path = report_dir.join(HTML_REPORT_FILE);
        let pdf_path = report_dir.join(PDF_REPORT_FILE);
        PdfExporter::new(get_wkhtmltopdf_path())?.export(report, &chart_path, &html_path, &pdf_path)?;
        written.push(html_path);
        written.push(pdf_path);
    }

    Ok(written)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{CityStats, YearlyStats};
    use std::collections::BTreeMap;

    pub fn sample_report() -> StatisticsReport {
        StatisticsReport {
            profession: "Developer".to_string(),
            yearly: YearlyStats {
                salary_by_year: BTreeMap::from([(2020, 28000), (2021, 46000)]),
                count_by_year: BTreeMap::from([(2020, 5), (2021, 5)]),
                profession_salary_by_year: BTreeMap::from([(2020, 15000), (2021, 70000)]),
                profession_count_by_year: BTreeMap::from([(2020, 1), (2021, 1)]),
            },
            cities: CityStats {
                salary_by_city: vec![
                    ("Kazan".to_string(), 46666),
                    ("Moscow".to_string(), 37000),
                    ("Perm".to_string(), 20000),
                ],
                share_by_city: vec![
                    ("Moscow".to_string(), 0.5),
                    ("Kazan".to_string(), 0.3333),
                    ("Perm".to_string(), 0.1667),
                ],
            },
        }
    }

    #[test]
    fn test_write_outputs_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = ReportOutputs {
            workbook: true,
            chart: true,
            pdf: false,
        };

        let written = write_outputs(&sample_report(), outputs, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join(WORKBOOK_FILE), dir.path().join(CHART_FILE)]);
        assert!(written.iter().all(|p| p.exists()));
    }
}
