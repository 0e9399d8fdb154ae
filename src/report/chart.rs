//! 2x2 chart grid rendered to SVG
//!
//! Top row: salary and vacancy count by year, all vacancies next to the selected
//! profession. Bottom row: salary by city (highest on top) and the city share pie
//! with the remainder collected into one slice.

use crate::constants::OTHER_CITIES_LABEL;
use crate::error::{Error, Result};
use crate::models::{CityStats, StatisticsReport};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

type ChartResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const CHART_SIZE: (u32, u32) = (1200, 900);
const TITLE_FONT: (&str, u32) = ("sans-serif", 18);
const LABEL_FONT: (&str, u32) = ("sans-serif", 12);
const BAR_WIDTH: f64 = 0.4;

const ALL_COLOR: RGBColor = RGBColor(31, 119, 180);
const PROFESSION_COLOR: RGBColor = RGBColor(255, 127, 14);

const PIE_PALETTE: [RGBColor; 11] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
    RGBColor(174, 199, 232),
];

/// One year series pair: (year, all vacancies, selected profession)
fn year_pairs<V: Copy>(
    all: &BTreeMap<i32, V>,
    profession: &BTreeMap<i32, V>,
    as_f64: fn(V) -> f64,
) -> Vec<(i32, f64, f64)> {
    all.iter()
        .map(|(year, value)| {
            let prof = profession.get(year).map_or(0.0, |v| as_f64(*v));
            (*year, as_f64(*value), prof)
        })
        .collect()
}

fn draw_year_bars(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    series: &[(i32, f64, f64)],
    labels: (&str, String),
) -> ChartResult<()> {
    let (x_min, x_max) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first.0 as f64 - 1.0, last.0 as f64 + 1.0),
        _ => (0.0, 1.0),
    };
    let y_max = series
        .iter()
        .map(|(_, all, prof)| all.max(*prof))
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(title, TITLE_FONT)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(series.len() + 2)
        .x_label_formatter(&|x| {
            if x.fract().abs() < 1e-9 {
                format!("{}", *x as i64)
            } else {
                String::new()
            }
        })
        .y_label_formatter(&|y| format!("{:.0}", y))
        .label_style(LABEL_FONT)
        .draw()?;

    chart
        .draw_series(series.iter().map(|(year, all, _)| {
            let x = *year as f64;
            Rectangle::new([(x - BAR_WIDTH, 0.0), (x, *all)], ALL_COLOR.filled())
        }))?
        .label(labels.0)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], ALL_COLOR.filled()));

    chart
        .draw_series(series.iter().map(|(year, _, prof)| {
            let x = *year as f64;
            Rectangle::new([(x, 0.0), (x + BAR_WIDTH, *prof)], PROFESSION_COLOR.filled())
        }))?
        .label(labels.1)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PROFESSION_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(LABEL_FONT)
        .draw()?;

    Ok(())
}

fn draw_city_salaries(area: &DrawingArea<SVGBackend<'_>, Shift>, cities: &[(String, i64)]) -> ChartResult<()> {
    let count = cities.len().max(1);
    let x_max = cities.iter().map(|(_, v)| *v as f64).fold(0.0, f64::max).max(1.0) * 1.1;

    // Rank 0 is drawn in the top segment
    let names: Vec<&str> = cities.iter().rev().map(|(name, _)| name.as_str()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption("Salary level by city", TITLE_FONT)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(130)
        .build_cartesian_2d(0.0..x_max, (0..count).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(count)
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(idx) => names.get(*idx).map_or(String::new(), |n| n.to_string()),
            _ => String::new(),
        })
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(cities.iter().rev().enumerate().map(|(idx, (_, salary))| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(idx)),
                (*salary as f64, SegmentValue::Exact(idx + 1)),
            ],
            ALL_COLOR.filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    Ok(())
}

/// Pie slices: shares ascending, then the remainder
pub fn pie_slices(cities: &CityStats) -> Vec<(String, f64)> {
    let mut slices: Vec<(String, f64)> = cities.share_by_city.clone();
    slices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    slices.push((OTHER_CITIES_LABEL.to_string(), cities.remaining_share().max(0.0)));
    slices
}

fn draw_city_shares(area: &DrawingArea<SVGBackend<'_>, Shift>, cities: &CityStats) -> ChartResult<()> {
    let area = area.titled("Vacancy share by city", TITLE_FONT)?;
    let slices = pie_slices(cities);
    if slices.iter().all(|(_, share)| *share <= 0.0) {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.35;

    let sizes: Vec<f64> = slices.iter().map(|(_, share)| *share).collect();
    let labels: Vec<String> = slices.iter().map(|(city, _)| city.clone()).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(|i| PIE_PALETTE[i % PIE_PALETTE.len()]).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(LABEL_FONT.into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

fn draw_grid(root: &DrawingArea<SVGBackend<'_>, Shift>, report: &StatisticsReport) -> ChartResult<()> {
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));
    let yearly = &report.yearly;
    let profession = report.profession.to_lowercase();

    draw_year_bars(
        &panels[0],
        "Salary level by year",
        &year_pairs(&yearly.salary_by_year, &yearly.profession_salary_by_year, |v| v as f64),
        ("mean salary", format!("salary {}", profession)),
    )?;
    draw_year_bars(
        &panels[1],
        "Vacancy count by year",
        &year_pairs(&yearly.count_by_year, &yearly.profession_count_by_year, |v| v as f64),
        ("vacancies", format!("vacancies {}", profession)),
    )?;

    draw_city_salaries(&panels[2], &report.cities.salary_by_city)?;
    draw_city_shares(&panels[3], &report.cities)?;

    root.present()?;
    Ok(())
}

/// Render the chart grid into an SVG document
pub fn render_chart_svg(report: &StatisticsReport) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_grid(&root, report).map_err(|e| Error::Report(format!("Chart rendering failed: {}", e)))?;
    }
    Ok(svg)
}

pub fn write_chart(report: &StatisticsReport, path: &Path) -> Result<()> {
    let svg = render_chart_svg(report)?;
    std::fs::write(path, svg).map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Wrote chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_pie_slices_sorted_with_remainder() {
        let cities = CityStats {
            salary_by_city: vec![],
            share_by_city: vec![("Moscow".to_string(), 0.5), ("Kazan".to_string(), 0.2), ("Perm".to_string(), 0.1)],
        };
        let slices = pie_slices(&cities);

        let labels: Vec<&str> = slices.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(labels, vec!["Perm", "Kazan", "Moscow", "Other"]);
        assert!((slices[3].1 - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_pie_remainder_never_negative() {
        let cities = CityStats {
            salary_by_city: vec![],
            share_by_city: vec![("Moscow".to_string(), 0.5), ("Kazan".to_string(), 0.5001)],
        };
        assert_eq!(pie_slices(&cities).last().unwrap().1, 0.0);
    }

    #[test]
    fn test_render_chart_svg() {
        let svg = render_chart_svg(&sample_report()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Salary level by year"));
        assert!(svg.contains("Vacancy share by city"));
    }

    #[test]
    fn test_write_chart_with_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.svg");
        write_chart(&StatisticsReport::default(), &path).unwrap();
        assert!(path.exists());
    }
}
