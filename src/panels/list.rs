//! src/panels/list.rs
//!
//! Selectable name list with a dimmed secondary column. Used for the NPCs of
//! the selected location, the browse views, and the NPC picker.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub struct ListRow<'a> {
    pub name: &'a str,
    pub subtitle: String,
}

pub struct ListPanel<'a> {
    pub title: String,
    pub rows: Vec<ListRow<'a>>,
    pub selected: Option<usize>,
    pub focused: bool,
    pub empty_text: &'a str,
}

impl<'a> ListPanel<'a> {
    pub fn new(title: impl Into<String>, rows: Vec<ListRow<'a>>, selected: Option<usize>, focused: bool) -> Self {
        Self {
            title: title.into(),
            rows,
            selected,
            focused,
            empty_text: "Nothing to show.",
        }
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }
}

impl crate::ui::Panel for ListPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let mut block = Block::default().title(self.title.as_str()).borders(Borders::ALL);
        if self.focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }

        let items: Vec<ListItem> = if self.rows.is_empty() {
            vec![ListItem::new(Span::styled(
                self.empty_text,
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.rows
                .iter()
                .map(|r| {
                    let mut spans = vec![Span::styled(r.name, Style::default().fg(Color::Cyan))];
                    if !r.subtitle.is_empty() {
                        spans.push(Span::raw("  "));
                        spans.push(Span::styled(r.subtitle.as_str(), Style::default().fg(Color::Gray)));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect()
        };

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));
        let selected = if self.rows.is_empty() { None } else { self.selected };
        let mut state = ListState::default().with_selected(selected);
        f.render_stateful_widget(list, area, &mut state);
    }
}
