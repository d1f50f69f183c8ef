//! Chart export to PNG (plotters bitmap) and SVG (plotters svg).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::TAU;
use std::path::Path;

use crate::chart_data::{ChartSeries, ChartStyle};
use crate::error::DashboardError;

const SIZE: (u32, u32) = (800, 600);
const LINE_COLOR: RGBColor = RGBColor(128, 0, 128);
/// Pie slices start at this angle, counter-clockwise
const PIE_START_DEG: f64 = 140.0;

/// Export format for chart: PNG or SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Svg,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Svg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        Self::ALL
            .into_iter()
            .find(|f| ext.as_deref() == Some(f.extension()))
            .ok_or_else(|| {
                DashboardError::UnsupportedFormat(format!(
                    "chart export needs a .png or .svg file, got {}",
                    path.display()
                ))
                .into()
            })
    }
}

/// Write `series` to `path`; the format follows the extension.
pub fn write_chart(path: &Path, series: &ChartSeries) -> Result<()> {
    let format = ChartExportFormat::from_path(path)?;
    if series.is_empty() {
        return Err(eyre!("No data to export"));
    }

    match format {
        ChartExportFormat::Png => {
            let root = BitMapBackend::new(path, SIZE).into_drawing_area();
            draw(&root, series)?;
            root.present()?;
        }
        ChartExportFormat::Svg => {
            std::fs::write(path, render_svg(series)?)?;
        }
    }
    log::info!("Exported '{}' to {}", series.title, path.display());
    Ok(())
}

/// Render `series` as an SVG document.
pub fn render_svg(series: &ChartSeries) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        draw(&root, series)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, series: &ChartSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match series.style {
        ChartStyle::Bar => draw_bars(root, series),
        ChartStyle::HorizontalBar => draw_horizontal_bars(root, series),
        ChartStyle::Line => draw_line(root, series),
        ChartStyle::Pie => draw_pie(root, series),
    }
}

/// Value axis covering zero and every point, with a little headroom.
fn value_range(series: &ChartSeries) -> (f64, f64) {
    let lo = series.min_value();
    let hi = series.max_value();
    let pad = ((hi - lo) * 0.05).max(f64::EPSILON);
    if hi - lo == 0.0 {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo.min(0.0) - if lo < 0.0 { pad } else { 0.0 }, hi + pad)
    }
}

/// Category name at an axis position, empty between categories.
fn category_label(labels: &[String], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() > 0.01 || idx < 0.0 || idx as usize >= labels.len() {
        return String::new();
    }
    labels[idx as usize].clone()
}

fn labels(series: &ChartSeries) -> Vec<String> {
    series.points.iter().map(|p| p.label.clone()).collect()
}

fn draw_bars<DB>(root: &DrawingArea<DB, Shift>, series: &ChartSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = series.points.len();
    let (lo, hi) = value_range(series);
    let labels = labels(series);

    let mut chart = ChartBuilder::on(root)
        .caption(series.title.as_str(), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), lo..hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(series.x_label.as_str())
        .y_desc(series.y_label.as_str())
        .draw()?;

    chart.draw_series(series.points.iter().enumerate().map(|(i, p)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, p.value)], Palette99::pick(i).filled())
    }))?;
    Ok(())
}

fn draw_horizontal_bars<DB>(root: &DrawingArea<DB, Shift>, series: &ChartSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = series.points.len();
    let (lo, hi) = value_range(series);
    // First point on top
    let labels: Vec<String> = labels(series).into_iter().rev().collect();

    let mut chart = ChartBuilder::on(root)
        .caption(series.title.as_str(), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(lo..hi, -0.5f64..(n as f64 - 0.5))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&|y| category_label(&labels, *y))
        .x_desc(series.y_label.as_str())
        .y_desc(series.x_label.as_str())
        .draw()?;

    chart.draw_series(series.points.iter().enumerate().map(|(i, p)| {
        let y = (n - 1 - i) as f64;
        Rectangle::new([(0.0, y - 0.4), (p.value, y + 0.4)], Palette99::pick(i).filled())
    }))?;
    Ok(())
}

fn draw_line<DB>(root: &DrawingArea<DB, Shift>, series: &ChartSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = series.points.len();
    let (lo, hi) = value_range(series);
    let labels = labels(series);
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();

    let mut chart = ChartBuilder::on(root)
        .caption(series.title.as_str(), ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), lo..hi)?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(series.x_label.as_str())
        .y_desc(series.y_label.as_str())
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), LINE_COLOR.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, LINE_COLOR.filled())),
    )?;
    Ok(())
}

/// Slices are polygons approximating each arc, labelled with their share.
fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, series: &ChartSeries) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(root)
        .caption(series.title.as_str(), ("sans-serif", 24))
        .margin(20)
        .build_cartesian_2d(-1.6f64..1.6, -1.2f64..1.2)?;

    let mut start = PIE_START_DEG.to_radians();
    for (i, (point, share)) in series.points.iter().zip(series.proportions()).enumerate() {
        let sweep = share * TAU;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / TAU) * 180.0).ceil().max(2.0) as usize;
        let mut outline = vec![(0.0, 0.0)];
        outline.extend((0..=steps).map(|s| {
            let angle = start + sweep * s as f64 / steps as f64;
            (angle.cos(), angle.sin())
        }));
        chart.draw_series(std::iter::once(Polygon::new(
            outline,
            Palette99::pick(i).filled(),
        )))?;

        let mid = start + sweep / 2.0;
        chart.draw_series(std::iter::once(Text::new(
            format!("{} ({:.1}%)", point.label, share * 100.0),
            (1.1 * mid.cos(), 1.1 * mid.sin()),
            ("sans-serif", 14).into_font(),
        )))?;
        start += sweep;
    }
    Ok(())
}
