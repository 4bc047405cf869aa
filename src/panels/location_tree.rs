//! src/panels/location_tree.rs
//!
//! Location tree panel: two columns, indented name and short description.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::location_tree::{LocationTree, TreeRow};

const NAME_COLUMN: usize = 28;
const SHORT_DESCRIPTION_LEN: usize = 80;

pub struct LocationTreePanel<'a> {
    pub tree: &'a LocationTree,
    pub rows: &'a [TreeRow],
    pub selected: Option<usize>,
    pub focused: bool,
}

impl<'a> LocationTreePanel<'a> {
    pub fn new(tree: &'a LocationTree, rows: &'a [TreeRow], selected: Option<usize>, focused: bool) -> Self {
        Self {
            tree,
            rows,
            selected,
            focused,
        }
    }
}

/// Indented label for a row, padded to the name column.
fn name_cell(name: &str, depth: usize, has_children: bool) -> String {
    let marker = if has_children { "▾ " } else { "  " };
    let label = format!("{}{}{}", "  ".repeat(depth), marker, name);
    let width = label.chars().count();
    if width >= NAME_COLUMN {
        format!("{} ", label)
    } else {
        format!("{}{}", label, " ".repeat(NAME_COLUMN - width))
    }
}

impl crate::ui::Panel for LocationTreePanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .filter_map(|row| {
                let loc = self.tree.location(row.id)?;
                let has_children = !self.tree.children(row.id).is_empty();
                Some(ListItem::new(Line::from(vec![
                    Span::styled(
                        name_cell(&loc.name, row.depth, has_children),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(
                        loc.short_description(SHORT_DESCRIPTION_LEN),
                        Style::default().fg(Color::Gray),
                    ),
                ])))
            })
            .collect();

        let title = format!("Locations ({})", self.rows.len());
        let mut block = Block::default().title(title).borders(Borders::ALL);
        if self.focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

        let mut state = ListState::default().with_selected(self.selected);
        f.render_stateful_widget(list, area, &mut state);
    }
}
