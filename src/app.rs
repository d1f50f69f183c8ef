//! Interactive dashboard state. The pipeline is re-run in full on every chart selection.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use polars::prelude::DataFrame;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use std::path::PathBuf;

use crate::chart_export::write_chart;
use crate::error::user_message_from_report;
use crate::widgets::chart::ChartView;
use crate::widgets::controls::Controls;
use crate::widgets::diagnostics::DiagnosticsView;
use crate::widgets::kpi::KpiPanel;
use crate::widgets::selector::ChartSelector;
use crate::{build_dashboard, ChartKind, Dashboard, PipelineOptions};

const SIDEBAR_WIDTH: u16 = 40;
const KPI_HEIGHT: u16 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Select(ChartKind),
    Export,
    Exit,
}

pub struct App {
    raw: DataFrame,
    source: String,
    options: PipelineOptions,
    currency: String,
    selection: ChartKind,
    dashboard: Option<Dashboard>,
    error: Option<String>,
    status: Option<String>,
    show_data: bool,
    export_dir: PathBuf,
}

impl App {
    pub fn new(
        raw: DataFrame,
        source: impl Into<String>,
        options: PipelineOptions,
        currency: impl Into<String>,
        initial: ChartKind,
    ) -> Self {
        let mut app = Self {
            raw,
            source: source.into(),
            options,
            currency: currency.into(),
            selection: initial,
            dashboard: None,
            error: None,
            status: None,
            show_data: false,
            export_dir: PathBuf::from("."),
        };
        app.select(initial);
        app
    }

    /// Directory chart exports are written to (default: current directory).
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn selection(&self) -> ChartKind {
        self.selection
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Rebuild the dashboard for `kind`. A failed run leaves no dashboard, only the message.
    pub fn select(&mut self, kind: ChartKind) {
        self.selection = kind;
        self.status = None;
        match build_dashboard(&self.raw, kind, &self.options) {
            Ok(dashboard) => {
                self.dashboard = Some(dashboard);
                self.error = None;
            }
            Err(e) => {
                log::error!("Dashboard build failed: {:?}", e);
                self.dashboard = None;
                self.error = Some(user_message_from_report(&e, None));
            }
        }
    }

    /// Write the current chart as PNG into the export directory.
    pub fn export(&mut self) -> Option<PathBuf> {
        let dashboard = self.dashboard.as_ref()?;
        let path = self
            .export_dir
            .join(format!("{}.png", self.selection.value_name()));
        match write_chart(&path, &dashboard.chart) {
            Ok(()) => {
                self.status = Some(format!("Saved {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.status = Some(format!(
                    "Export failed: {}",
                    user_message_from_report(&e, Some(&path))
                ));
                None
            }
        }
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(AppEvent::Exit)
            }
            KeyCode::Down | KeyCode::Char('j') => Some(AppEvent::Select(self.selection.next())),
            KeyCode::Up | KeyCode::Char('k') => {
                Some(AppEvent::Select(self.selection.previous()))
            }
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                Some(AppEvent::Select(ChartKind::ALL[idx]))
            }
            KeyCode::Char('e') => Some(AppEvent::Export),
            KeyCode::Tab => {
                self.show_data = !self.show_data;
                None
            }
            _ => None,
        }
    }

    /// Handle one event; may return a follow-up event for the loop to dispatch.
    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Select(kind) => {
                self.select(*kind);
                None
            }
            AppEvent::Export => {
                self.export();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn render_main(&self, area: Rect, buf: &mut Buffer) {
        let Some(dashboard) = &self.dashboard else {
            let message = self.error.as_deref().unwrap_or("No dashboard");
            Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Error "))
                .render(area, buf);
            return;
        };

        if self.show_data {
            (&DiagnosticsView::new(dashboard)).render(area, buf);
            return;
        }

        let layout = Layout::new(
            Direction::Vertical,
            [Constraint::Length(KPI_HEIGHT), Constraint::Fill(1)],
        )
        .split(area);
        (&KpiPanel::new(&dashboard.kpis, &self.currency)).render(layout[0], buf);
        (&ChartView::new(&dashboard.chart)).render(layout[1], buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::new(
            Direction::Vertical,
            [
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ],
        )
        .split(area);

        Paragraph::new(format!("Sales Dashboard: {}", self.source))
            .style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .render(layout[0], buf);

        let body = Layout::new(
            Direction::Horizontal,
            [Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)],
        )
        .split(layout[1]);
        (&ChartSelector {
            selected: self.selection,
        })
            .render(body[0], buf);
        self.render_main(body[1], buf);

        let skipped = self
            .dashboard
            .as_ref()
            .map(|d| d.normalization.skipped_count())
            .unwrap_or(0);
        let status = match (&self.status, skipped) {
            (Some(status), _) => status.clone(),
            (None, 0) => String::new(),
            (None, n) => format!("{n} rows skipped: unparseable Order Date"),
        };
        Paragraph::new(status)
            .style(Style::default().fg(Color::Yellow))
            .render(layout[2], buf);

        let controls = match &self.dashboard {
            Some(d) => Controls::with_row_count(d.cleaned.height()),
            None => Controls::new(),
        }
        .with_showing_data(self.show_data);
        (&controls).render(layout[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn raw() -> DataFrame {
        df!(
            "Order ID" => &["A1", "A2", "A3"],
            "Order Date" => &["2023-01-05 10:00", "2023-02-05 11:00", "bad"],
            "Amount" => &[100i64, 200, 50],
            "Profit" => &[10i64, 30, 5],
            "Quantity" => &[1i64, 3, 2],
            "City" => &["X", "Y", "X"],
            "State" => &["S1", "S2", "S1"],
            "Category" => &["Tech", "Home", "Tech"],
            "Sub-Category" => &["Phones", "Beds", "Phones"],
            "PaymentMode" => &["UPI", "Card", "UPI"]
        )
        .unwrap()
    }

    fn app() -> App {
        App::new(
            raw(),
            "sales.csv",
            PipelineOptions::default(),
            "₹",
            ChartKind::SalesByMonth,
        )
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_keys_map_to_events() {
        let mut app = app();
        assert_eq!(
            app.event(&press(KeyCode::Down)),
            Some(AppEvent::Select(ChartKind::SalesByCity))
        );
        assert_eq!(
            app.event(&press(KeyCode::Up)),
            Some(AppEvent::Select(ChartKind::PaymentModes))
        );
        assert_eq!(
            app.event(&press(KeyCode::Char('5'))),
            Some(AppEvent::Select(ChartKind::OrdersByCategory))
        );
        assert_eq!(app.event(&press(KeyCode::Char('q'))), Some(AppEvent::Exit));
        assert_eq!(app.event(&press(KeyCode::Char('e'))), Some(AppEvent::Export));
    }

    #[test]
    fn test_select_reruns_pipeline() {
        let mut app = app();
        assert_eq!(app.dashboard().unwrap().chart.points.len(), 2);
        app.event(&AppEvent::Select(ChartKind::SalesByCity));
        let dashboard = app.dashboard().unwrap();
        assert_eq!(app.selection(), ChartKind::SalesByCity);
        assert_eq!(dashboard.chart.points[0].label, "Y");
        assert_eq!(dashboard.normalization.skipped_count(), 1);
    }

    #[test]
    fn test_missing_column_shows_error() {
        let raw = raw().drop("Profit").unwrap();
        let app = App::new(
            raw,
            "sales.csv",
            PipelineOptions::default(),
            "₹",
            ChartKind::SalesByMonth,
        );
        assert!(app.dashboard().is_none());
        assert!(app.error().unwrap().contains("Profit"));
    }

    #[test]
    fn test_export_failure_reported_in_status() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let mut app = app().with_export_dir(missing.clone());
        assert_eq!(app.export(), None);
        assert!(
            app.status().unwrap().starts_with("Export failed"),
            "{:?}",
            app.status()
        );
        assert!(!missing.join("sales-by-month.png").exists());
    }

    #[test]
    fn test_render_shows_selector_and_kpis() {
        let mut app = app();
        let area = Rect::new(0, 0, 140, 40);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Sales Dashboard: sales.csv"));
        assert!(text.contains("Total Amount by City"));
        assert!(text.contains("Key Business Indicators"));
        assert!(text.contains("1 rows skipped"));

        app.event(&press(KeyCode::Tab));
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Summary Statistics"));
    }
}
