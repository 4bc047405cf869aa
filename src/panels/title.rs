//! src/panels/title.rs
//!
//! Header panel: app name, current view, and what's loaded.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct TitlePanel<'a> {
    pub title: &'a str,
    pub subtitle: String,
}

impl<'a> TitlePanel<'a> {
    pub fn new(title: &'a str, subtitle: impl Into<String>) -> Self {
        Self {
            title,
            subtitle: subtitle.into(),
        }
    }
}

impl crate::ui::Panel for TitlePanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                self.title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.subtitle.as_str(), Style::default().fg(Color::Gray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().title("World in Windows").borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
