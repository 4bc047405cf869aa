//! src/lib.rs
//!
//! World in Windows: a terminal browser for a D&D campaign kept as JSON files.
//! NPCs, locations, spells, items, class actions and conditions are loaded
//! into a repo, cross-linked by name, and browsed through a ratatui UI.

pub mod app;
pub mod config;
pub mod detail;
pub mod edit;
pub mod error;
pub mod form;
pub mod knowledge;
pub mod location_tree;
pub mod media;
pub mod model;
pub mod panels;
pub mod repo;
pub mod search;
pub mod ui;

pub use config::Config;
pub use error::{Result, WorldError};
