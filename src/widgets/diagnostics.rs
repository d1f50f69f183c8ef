//! Data view: raw preview, cleaning diagnostics, data types and summary statistics.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, Widget, Wrap},
};

use crate::Dashboard;

pub struct DiagnosticsView<'a> {
    pub dashboard: &'a Dashboard,
}

impl<'a> DiagnosticsView<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self { dashboard }
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

impl DiagnosticsView<'_> {
    fn render_preview(&self, area: Rect, buf: &mut Buffer) {
        let preview = &self.dashboard.raw_preview;
        let widths = vec![Constraint::Min(8); preview.columns.len().max(1)];
        let rows = preview.rows.iter().map(|r| Row::new(r.clone()));
        Widget::render(
            Table::new(rows, widths)
                .header(Row::new(preview.columns.clone()).style(header_style()))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Raw Data Preview "),
                ),
            area,
            buf,
        );
    }

    fn render_cleaning(&self, area: Rect, buf: &mut Buffer) {
        let cleaning = &self.dashboard.cleaning;
        let normalization = &self.dashboard.normalization;

        let mut lines = vec![
            Line::styled("Missing values before cleaning", header_style()),
        ];
        lines.extend(
            cleaning
                .nulls_before
                .iter()
                .map(|n| Line::from(format!("  {:<16} {}", n.column, n.nulls))),
        );
        lines.push(Line::from(format!(
            "Duplicate rows before cleaning: {}",
            cleaning.duplicates_before
        )));
        lines.push(Line::from(format!(
            "Rows {} -> {} (missing after: {}, duplicates after: {})",
            cleaning.rows_before,
            cleaning.rows_after,
            cleaning.total_nulls_after(),
            cleaning.duplicates_after
        )));
        if normalization.skipped_count() > 0 {
            lines.push(Line::styled(
                format!(
                    "{} rows skipped: unparseable Order Date",
                    normalization.skipped_count()
                ),
                Style::default().fg(Color::Red),
            ));
        }
        let missing = self.dashboard.missing_expected_columns();
        if !missing.is_empty() {
            lines.push(Line::styled(
                format!("Not found: {}", missing.join(", ")),
                Style::default().fg(Color::Red),
            ));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Data Cleaning "))
            .render(area, buf);
    }

    fn render_dtypes(&self, area: Rect, buf: &mut Buffer) {
        let rows = self
            .dashboard
            .dtypes
            .iter()
            .map(|t| Row::new(vec![t.name.clone(), t.dtype.clone()]));
        Widget::render(
            Table::new(rows, [Constraint::Fill(2), Constraint::Fill(1)])
                .header(Row::new(vec!["Column", "Type"]).style(header_style()))
                .block(Block::default().borders(Borders::ALL).title(" Data Types ")),
            area,
            buf,
        );
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let rows = self.dashboard.summary.iter().map(|s| {
            Row::new(vec![
                s.name.clone(),
                s.count.to_string(),
                opt(s.mean),
                opt(s.std),
                opt(s.min),
                opt(s.q25),
                opt(s.median),
                opt(s.q75),
                opt(s.max),
            ])
        });
        let mut widths = vec![Constraint::Min(12), Constraint::Length(6)];
        widths.extend([Constraint::Min(10); 7]);
        Widget::render(
            Table::new(rows, widths)
                .header(
                    Row::new(vec![
                        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
                    ])
                    .style(header_style()),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Summary Statistics "),
                ),
            area,
            buf,
        );
    }
}

/// Rows plus header and borders, saturating at `u16::MAX`.
fn preview_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
}

impl Widget for &DiagnosticsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = preview_height(self.dashboard.raw_preview.rows.len());
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(height),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .split(area);
        let middle = Layout::new(
            Direction::Horizontal,
            [Constraint::Fill(1), Constraint::Fill(1)],
        )
        .split(layout[1]);

        self.render_preview(layout[0], buf);
        self.render_cleaning(middle[0], buf);
        self.render_dtypes(middle[1], buf);
        self.render_summary(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_height_saturates() {
        assert_eq!(preview_height(5), 8);
        assert_eq!(preview_height(65_533), u16::MAX);
        assert_eq!(preview_height(70_000), u16::MAX);
        assert_eq!(preview_height(usize::MAX), u16::MAX);
    }
}
