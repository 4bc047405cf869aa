//! src/model/condition.rs

use serde::Deserialize;

use super::{loose_string, string_list};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: String,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
}
