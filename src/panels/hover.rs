//! src/panels/hover.rs
//!
//! Preview of the link under the cursor in a detail view.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub struct HoverPanel<'a> {
    /// `(heading, body)` of the hovered entity, if a link is selected.
    pub preview: Option<(String, &'a str)>,
}

impl<'a> HoverPanel<'a> {
    pub fn new(preview: Option<(String, &'a str)>) -> Self {
        Self { preview }
    }
}

impl crate::ui::Panel for HoverPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = match &self.preview {
            Some((heading, body)) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        heading.as_str(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::default(),
                ];
                lines.extend(body.lines().map(Line::raw));
                lines
            }
            None => vec![Line::from(Span::styled(
                "Tab to select a link.",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Preview").borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
