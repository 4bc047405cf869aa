//! src/panels.rs
//!
//! Top-level panels module and re-exports.

pub mod detail;
pub mod form;
pub mod hover;
pub mod input;
pub mod list;
pub mod location_tree;
pub mod paragraph;
pub mod title;

pub use detail::DetailPanel;
pub use form::FormPanel;
pub use hover::HoverPanel;
pub use input::InputPanel;
pub use list::{ListPanel, ListRow};
pub use location_tree::LocationTreePanel;
pub use paragraph::ParagraphPanel;
pub use title::TitlePanel;
