//! src/ui/node.rs
//!
//! Recursive layout Node + Panel trait used across the UI.
//!
//! Panels borrow from the app state for the duration of one frame, so the tree
//! carries that lifetime instead of cloning entity data into every panel.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};

/// Panel trait: any renderable surface implements this.
pub trait Panel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect);
}

/// Node tree used to compose the UI each frame.
pub enum Node<'a> {
    Group {
        direction: Direction,
        constraints: Vec<Constraint>,
        children: Vec<Node<'a>>,
    },
    Leaf {
        panel: Box<dyn Panel + 'a>,
    },
    /// Draws `base`, then `popup` over a centered rectangle of the given
    /// percentage size.
    Overlay {
        base: Box<Node<'a>>,
        popup: Box<Node<'a>>,
        percent_x: u16,
        percent_y: u16,
    },
}

impl<'a> Node<'a> {
    /// Draw the node into the given area.
    pub fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        match self {
            Node::Group {
                direction,
                constraints,
                children,
            } => {
                let chunks = Layout::default()
                    .direction(*direction)
                    .constraints(constraints.clone())
                    .split(area);
                for (child, chunk) in children.iter().zip(chunks.iter()) {
                    child.draw(f, *chunk);
                }
            }
            Node::Leaf { panel } => {
                panel.draw(f, area);
            }
            Node::Overlay {
                base,
                popup,
                percent_x,
                percent_y,
            } => {
                base.draw(f, area);
                let rect = centered_rect(area, *percent_x, *percent_y);
                f.render_widget(ratatui::widgets::Clear, rect);
                popup.draw(f, rect);
            }
        }
    }
}

/// Helper: create a group node.
pub fn group<'a>(direction: Direction, constraints: Vec<Constraint>, children: Vec<Node<'a>>) -> Node<'a> {
    Node::Group {
        direction,
        constraints,
        children,
    }
}

/// Helper: create a leaf node.
pub fn leaf<'a>(panel: impl Panel + 'a) -> Node<'a> {
    Node::Leaf {
        panel: Box::new(panel),
    }
}

/// Helper: draw `popup` centered over `base`.
pub fn overlay<'a>(base: Node<'a>, popup: Node<'a>, percent_x: u16, percent_y: u16) -> Node<'a> {
    Node::Overlay {
        base: Box::new(base),
        popup: Box::new(popup),
        percent_x,
        percent_y,
    }
}

/// Centered sub-rectangle covering the given percentages of `area`.
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y.min(100))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x.min(100))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
