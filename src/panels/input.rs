//! src/panels/input.rs
//!
//! Single text field: search boxes and the campaign-notes editor.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub struct InputPanel<'a> {
    pub title: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub focused: bool,
}

impl<'a> InputPanel<'a> {
    pub fn new(title: &'a str, value: &'a str, placeholder: &'a str, focused: bool) -> Self {
        Self {
            title,
            value,
            placeholder,
            focused,
        }
    }
}

impl crate::ui::Panel for InputPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = if self.value.is_empty() && !self.focused {
            vec![Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.value.split('\n').map(Line::raw).collect()
        };
        if self.focused {
            // block cursor at the end of the text
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
            }
        }

        let mut block = Block::default().title(self.title).borders(Borders::ALL);
        if self.focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
    }
}
