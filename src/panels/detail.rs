//! src/panels/detail.rs
//!
//! Detail panel: renders a `DetailView` as a labelled stat block. Link spans
//! are underlined; the link under the keyboard cursor is highlighted.

use std::cell::Cell;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::detail::{DetailView, Row};
use crate::knowledge::Segment;

const WRAP: Wrap = Wrap { trim: false };

pub struct DetailPanel<'a> {
    pub view: &'a DetailView,
    pub selected_link: Option<usize>,
    pub scroll: u16,
    /// Receives the text area (width, height) on every draw.
    pub viewport: Option<&'a Cell<(u16, u16)>>,
}

impl<'a> DetailPanel<'a> {
    pub fn new(view: &'a DetailView, selected_link: Option<usize>, scroll: u16) -> Self {
        Self {
            view,
            selected_link,
            scroll,
            viewport: None,
        }
    }

    pub fn viewport(mut self, cell: &'a Cell<(u16, u16)>) -> Self {
        self.viewport = Some(cell);
        self
    }

    /// Wrapped row (from the top, before scrolling) where the selected link
    /// ends when the text is `width` columns wide.
    pub fn selected_row(&self, width: u16) -> Option<usize> {
        let (lines, (line, span)) = match self.layout() {
            (lines, Some(at)) => (lines, at),
            (_, None) => return None,
        };
        let before = Paragraph::new(lines[..line].to_vec()).wrap(WRAP).line_count(width);
        let prefix = Line::from(lines[line].spans[..=span].to_vec());
        let within = Paragraph::new(prefix).wrap(WRAP).line_count(width);
        Some(before + within.saturating_sub(1))
    }

    fn lines(&self) -> Vec<Line<'a>> {
        self.layout().0
    }

    /// Rendered lines, plus the (line, span) index of the selected link.
    fn layout(&self) -> (Vec<Line<'a>>, Option<(usize, usize)>) {
        let link_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);
        let selected_style = link_style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        let label_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let view = self.view;
        let mut out = Vec::new();
        if let Some(image) = &view.image {
            let note = if view.image_exists { "" } else { " (not found)" };
            out.push(Line::from(Span::styled(
                format!("Image: {}{}", image.display(), note),
                Style::default().fg(Color::DarkGray),
            )));
            out.push(Line::default());
        }

        let mut link_idx = 0usize;
        let mut selected_at = None;
        for row in &view.rows {
            match row {
                Row::Heading(text) => {
                    out.push(Line::default());
                    out.push(Line::from(Span::styled(
                        text.as_str(),
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    )));
                }
                Row::Field { label, segments } => {
                    let mut spans = Vec::new();
                    if !label.is_empty() {
                        spans.push(Span::styled(format!("{}: ", label), label_style));
                    }
                    if segments.is_empty() {
                        spans.push(Span::styled("—", Style::default().fg(Color::DarkGray)));
                    }
                    for seg in segments {
                        match seg {
                            Segment::Text(t) => spans.push(Span::raw(t.as_str())),
                            Segment::Link { label, .. } => {
                                let style = if self.selected_link == Some(link_idx) {
                                    selected_at = Some((out.len(), spans.len()));
                                    selected_style
                                } else {
                                    link_style
                                };
                                spans.push(Span::styled(label.as_str(), style));
                                link_idx += 1;
                            }
                        }
                    }
                    out.push(Line::from(spans));
                }
            }
        }
        (out, selected_at)
    }
}

impl crate::ui::Panel for DetailPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.view.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        if let Some(cell) = self.viewport {
            let inner = block.inner(area);
            cell.set((inner.width, inner.height));
        }
        let p = Paragraph::new(self.lines())
            .wrap(WRAP)
            .scroll((self.scroll, 0))
            .block(block);
        f.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, EntityRef};
    use crate::ui::Panel;
    use ratatui::{Terminal, backend::TestBackend};

    fn view() -> DetailView {
        DetailView {
            target: EntityRef::new(EntityKind::Spell, "Fireball"),
            title: "Spell — Fireball".into(),
            image: None,
            image_exists: false,
            rows: vec![
                Row::Field {
                    label: "Description".into(),
                    segments: vec![
                        Segment::text("Knocks targets "),
                        Segment::link("Prone", EntityRef::new(EntityKind::Condition, "Prone")),
                    ],
                },
                Row::Heading("Notes".into()),
                Row::Field {
                    label: "Tags".into(),
                    segments: vec![],
                },
            ],
        }
    }

    fn render(panel: &DetailPanel<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| panel.draw(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn renders_labels_links_and_headings() {
        let v = view();
        let text = render(&DetailPanel::new(&v, Some(0), 0));
        assert!(text.contains("Spell — Fireball"));
        assert!(text.contains("Description: Knocks targets Prone"));
        assert!(text.contains("Notes"));
        assert!(text.contains("Tags: —"));
    }

    #[test]
    fn selected_link_is_highlighted() {
        let v = view();
        let lines = DetailPanel::new(&v, Some(0), 0).lines();
        let prone = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "Prone")
            .unwrap();
        assert!(prone.style.add_modifier.contains(Modifier::REVERSED));

        let lines = DetailPanel::new(&v, None, 0).lines();
        let prone = lines[0].spans.iter().find(|s| s.content == "Prone").unwrap();
        assert!(!prone.style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn selected_row_counts_wrapped_lines() {
        let mut v = view();
        v.rows.insert(
            0,
            Row::Field {
                label: "Lore".into(),
                segments: vec![Segment::text("word ".repeat(40))],
            },
        );
        let panel = DetailPanel::new(&v, Some(0), 0);
        // 6 + 200 columns of lore wrap onto several rows at width 40
        let narrow = panel.selected_row(40).unwrap();
        let wide = panel.selected_row(1000).unwrap();
        assert_eq!(wide, 1);
        assert!(narrow > 5, "link row {} should sit below the wrapped lore", narrow);
        assert_eq!(DetailPanel::new(&v, None, 0).selected_row(40), None);
    }

    #[test]
    fn draw_reports_viewport() {
        let v = view();
        let cell = Cell::new((0, 0));
        render(&DetailPanel::new(&v, None, 0).viewport(&cell));
        assert_eq!(cell.get(), (58, 10));
    }
}
