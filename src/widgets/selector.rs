use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Widget},
};
use salesdash_cli::ChartKind;

/// Sidebar list of the six chart choices with the current one highlighted.
pub struct ChartSelector {
    pub selected: ChartKind,
}

impl Widget for &ChartSelector {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = ChartKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let text = format!("{} {}", i + 1, kind.label());
                if *kind == self.selected {
                    ListItem::new(format!("> {text}")).style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    ListItem::new(format!("  {text}"))
                }
            })
            .collect();

        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Choose Analysis Type "),
            )
            .render(area, buf);
    }
}
