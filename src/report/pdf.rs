//! PDF report
//!
//! The report is rendered to HTML with tera and converted by an external
//! `wkhtmltopdf` binary. The HTML file is kept next to the PDF.

use crate::error::{Error, Result};
use crate::models::StatisticsReport;
use crate::services::statistics::round_to;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tera::{Context, Tera};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct YearRow {
    year: i32,
    salary: i64,
    count: usize,
    profession_salary: i64,
    profession_count: usize,
}

#[derive(Debug, Serialize)]
struct CitySalaryRow {
    city: String,
    salary: i64,
}

#[derive(Debug, Serialize)]
struct CityShareRow {
    city: String,
    /// Percent with two decimals, e.g. "12.34%"
    share: String,
}

pub struct PdfExporter {
    template_engine: Tera,
    wkhtmltopdf: PathBuf,
}

impl PdfExporter {
    pub fn new(wkhtmltopdf: PathBuf) -> Result<Self> {
        let mut template_engine = Tera::default();
        template_engine.add_raw_template("report.html", REPORT_TEMPLATE)?;

        Ok(Self {
            template_engine,
            wkhtmltopdf,
        })
    }

    /// Render the report page; `chart_path` is embedded as an image
    pub fn render_html(&self, report: &StatisticsReport, chart_path: &Path) -> Result<String> {
        let yearly = &report.yearly;
        let years: Vec<YearRow> = yearly
            .years()
            .into_iter()
            .map(|year| YearRow {
                year,
                salary: yearly.salary_by_year.get(&year).copied().unwrap_or(0),
                count: yearly.count_by_year.get(&year).copied().unwrap_or(0),
                profession_salary: yearly.profession_salary_by_year.get(&year).copied().unwrap_or(0),
                profession_count: yearly.profession_count_by_year.get(&year).copied().unwrap_or(0),
            })
            .collect();

        let city_salaries: Vec<CitySalaryRow> = report
            .cities
            .salary_by_city
            .iter()
            .map(|(city, salary)| CitySalaryRow {
                city: city.clone(),
                salary: *salary,
            })
            .collect();

        let city_shares: Vec<CityShareRow> = report
            .cities
            .share_by_city
            .iter()
            .map(|(city, share)| CityShareRow {
                city: city.clone(),
                share: format!("{:.2}%", round_to(share * 100.0, 2)),
            })
            .collect();

        let mut context = Context::new();
        context.insert("profession", &report.profession);
        context.insert("chart_path", &chart_path.display().to_string());
        context.insert("years", &years);
        context.insert("city_salaries", &city_salaries);
        context.insert("city_shares", &city_shares);

        Ok(self.template_engine.render("report.html", &context)?)
    }

    /// Write the HTML page to `html_path` and convert it to `pdf_path`
    pub fn export(&self, report: &StatisticsReport, chart_path: &Path, html_path: &Path, pdf_path: &Path) -> Result<()> {
        let chart_path = chart_path
            .canonicalize()
            .map_err(|e| Error::NotFound(format!("Chart {}: {}", chart_path.display(), e)))?;

        let html = self.render_html(report, &chart_path)?;
        std::fs::write(html_path, html)
            .map_err(|e| Error::Io(format!("Failed to write {}: {}", html_path.display(), e)))?;
        debug!(path = %html_path.display(), "Wrote HTML report");

        let output = Command::new(&self.wkhtmltopdf)
            .arg("--enable-local-file-access")
            .arg(html_path)
            .arg(pdf_path)
            .output()
            .map_err(|e| {
                Error::Report(format!(
                    "Failed to run {}: {} (set WKHTMLTOPDF_PATH)",
                    self.wkhtmltopdf.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Report(format!(
                "wkhtmltopdf exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!(path = %pdf_path.display(), "Wrote PDF report");
        Ok(())
    }
}

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Vacancy analytics: {{ profession }}</title>
    <style>
        body { font-family: Verdana, sans-serif; }
        h1, h2 { text-align: center; }
        table { border-collapse: collapse; margin: 0 auto 24px auto; }
        th, td { border: 1px solid black; padding: 4px 8px; text-align: center; }
        img { display: block; margin: 0 auto; width: 100%; }
    </style>
</head>
<body>
    <h1>Vacancy analytics for the profession {{ profession }}</h1>
    <img src="file://{{ chart_path | safe }}" alt="Charts">

    <h2>Statistics by year</h2>
    <table>
        <tr>
            <th>Year</th>
            <th>Mean salary</th>
            <th>Mean salary - {{ profession }}</th>
            <th>Vacancies</th>
            <th>Vacancies - {{ profession }}</th>
        </tr>
        {% for row in years %}
        <tr>
            <td>{{ row.year }}</td>
            <td>{{ row.salary }}</td>
            <td>{{ row.profession_salary }}</td>
            <td>{{ row.count }}</td>
            <td>{{ row.profession_count }}</td>
        </tr>
        {% endfor %}
    </table>

    <h2>Statistics by city</h2>
    <table>
        <tr><th>City</th><th>Salary level</th></tr>
        {% for row in city_salaries %}
        <tr><td>{{ row.city }}</td><td>{{ row.salary }}</td></tr>
        {% endfor %}
    </table>
    <table>
        <tr><th>City</th><th>Vacancy share</th></tr>
        {% for row in city_shares %}
        <tr><td>{{ row.city }}</td><td>{{ row.share }}</td></tr>
        {% endfor %}
    </table>
</body>
</html>
"#;
