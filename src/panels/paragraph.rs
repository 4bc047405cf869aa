//! src/panels/paragraph.rs
//!
//! Simple paragraph panel used for help, status, prompts and error text.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Small reusable paragraph panel.
pub struct ParagraphPanel {
    pub text: String,
    pub title: String,
    pub error: bool,
}

impl ParagraphPanel {
    pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
            error: false,
        }
    }

    pub fn error(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::new(text, title)
        }
    }
}

impl crate::ui::Panel for ParagraphPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let mut block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL);
        let mut p = Paragraph::new(self.text.as_str()).wrap(Wrap { trim: true });
        if self.error {
            block = block.border_style(Style::default().fg(Color::Red));
            p = p.style(Style::default().fg(Color::Red));
        }
        f.render_widget(p.block(block), area);
    }
}
