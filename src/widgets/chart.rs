//! Chart area: bar, horizontal bar, line, and pie (as share bars) in the terminal.

use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
        Widget,
    },
};

use crate::chart_data::{ChartSeries, ChartStyle};
use crate::report::format_thousands;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
];

pub struct ChartView<'a> {
    pub series: &'a ChartSeries,
}

impl<'a> ChartView<'a> {
    pub fn new(series: &'a ChartSeries) -> Self {
        Self { series }
    }
}

fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Bar heights are unsigned; negative values draw as empty bars but keep their text.
fn bars(series: &ChartSeries, scale: f64) -> Vec<Bar<'_>> {
    series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let text = if series.style == ChartStyle::Pie {
                let total = series.total();
                let share = if total == 0.0 { 0.0 } else { p.value / total };
                format!("{} ({:.1}%)", format_thousands(p.value, 0), share * 100.0)
            } else {
                format_thousands(p.value, 0)
            };
            Bar::default()
                .label(Line::from(p.label.as_str()))
                .value((p.value.max(0.0) * scale).round() as u64)
                .text_value(text)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
        })
        .collect()
}

impl Widget for &ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let series = self.series;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", series.title));

        if series.is_empty() {
            Paragraph::new("No data to chart")
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        // Scale small sums up so fractional values still get visible bars
        let scale = if series.max_value() < 100.0 { 100.0 } else { 1.0 };

        match series.style {
            ChartStyle::Bar => {
                let bars = bars(series, scale);
                let width = (area.width.saturating_sub(2) / series.points.len().max(1) as u16)
                    .saturating_sub(1)
                    .clamp(1, 12);
                BarChart::default()
                    .block(block)
                    .data(BarGroup::default().bars(&bars))
                    .bar_width(width)
                    .bar_gap(1)
                    .render(area, buf);
            }
            ChartStyle::HorizontalBar | ChartStyle::Pie => {
                let bars = bars(series, scale);
                BarChart::default()
                    .block(block)
                    .direction(Direction::Horizontal)
                    .data(BarGroup::default().bars(&bars))
                    .bar_width(1)
                    .bar_gap(0)
                    .render(area, buf);
            }
            ChartStyle::Line => render_line(series, block, area, buf),
        }
    }
}

fn render_line(series: &ChartSeries, block: Block, area: Rect, buf: &mut Buffer) {
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();

    let y_min = series.min_value();
    let y_max = if series.max_value() > y_min {
        series.max_value()
    } else {
        y_min + 1.0
    };
    let x_max = (points.len().max(2) - 1) as f64;

    let datasets = vec![Dataset::default()
        .name(series.y_label.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Magenta))
        .data(&points)];

    let x_labels: Vec<Span> = match series.points.as_slice() {
        [] => vec![],
        [only] => vec![Span::raw(only.label.as_str())],
        [first, .., last] => vec![Span::raw(first.label.as_str()), Span::raw(last.label.as_str())],
    };
    let y_labels = vec![
        Span::raw(format_axis_label(y_min)),
        Span::raw(format_axis_label((y_min + y_max) / 2.0)),
        Span::raw(format_axis_label(y_max)),
    ];

    Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(series.x_label.as_str())
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(series.y_label.as_str())
                .bounds([y_min, y_max])
                .labels(y_labels),
        )
        .render(area, buf);
}
