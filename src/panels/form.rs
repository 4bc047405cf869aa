//! src/panels/form.rs
//!
//! Add/edit form: one "Label: value" row per field. The focused row is
//! highlighted and carries the cursor; the list scrolls to keep it in view.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::form::{EntryForm, FieldKind};

pub struct FormPanel<'a> {
    pub form: &'a EntryForm,
}

impl<'a> FormPanel<'a> {
    pub fn new(form: &'a EntryForm) -> Self {
        Self { form }
    }

    fn items(&self) -> Vec<ListItem<'a>> {
        let label_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        self.form
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let hint = match field.kind {
                    FieldKind::List => " (; separated)",
                    FieldKind::Flag => " (yes/no)",
                    _ => "",
                };
                let mut spans = vec![
                    Span::styled(field.label, label_style),
                    Span::styled(hint, Style::default().fg(Color::DarkGray)),
                    Span::raw(": "),
                    Span::raw(field.value.as_str()),
                ];
                if i == self.form.focused {
                    spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    }
}

impl crate::ui::Panel for FormPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.form.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let list = List::new(self.items())
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray));
        let mut state = ListState::default().with_selected(Some(self.form.focused));
        f.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::ui::Panel;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn renders_title_and_fields() {
        let mut form = EntryForm::new(EntityKind::Condition);
        for c in "Prone".chars() {
            form.push(c);
        }
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal.draw(|f| FormPanel::new(&form).draw(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Add Condition"));
        assert!(text.contains("Name: Prone"));
        assert!(text.contains("Aliases (; separated): "));
    }
}
