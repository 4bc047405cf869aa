//! src/model/class_action.rs

use serde::Deserialize;

use super::{loose_string, string_list};

/// A class feature or action (Rage, Cunning Action, Channel Divinity...).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ClassAction {
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: String,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
}
