//! Key Business Indicators: a 3x3 grid of labelled values.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::metrics::KpiSet;
use crate::report::kpi_entries;

const COLUMNS: usize = 3;

pub struct KpiPanel<'a> {
    pub kpis: &'a KpiSet,
    pub currency: &'a str,
}

impl<'a> KpiPanel<'a> {
    pub fn new(kpis: &'a KpiSet, currency: &'a str) -> Self {
        Self { kpis, currency }
    }
}

impl Widget for &KpiPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Key Business Indicators ");
        let inner = block.inner(area);
        block.render(area, buf);

        let entries = kpi_entries(self.kpis, self.currency);
        let row_count = entries.len().div_ceil(COLUMNS);
        let rows = Layout::new(
            Direction::Vertical,
            vec![Constraint::Length(1); row_count],
        )
        .split(inner);

        for (row_area, chunk) in rows.iter().zip(entries.chunks(COLUMNS)) {
            let cells = Layout::new(
                Direction::Horizontal,
                vec![Constraint::Ratio(1, COLUMNS as u32); COLUMNS],
            )
            .split(*row_area);
            for (cell, (label, value)) in cells.iter().zip(chunk) {
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
                    Span::styled(
                        value.clone(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
                .render(*cell, buf);
            }
        }
    }
}
