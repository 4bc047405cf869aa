//! src/model/spell.rs

use serde::{Deserialize, Deserializer};

use super::{loose_level, loose_opt_string, loose_string, string_list};

pub const DEFAULT_UPCAST_INFO: &str =
    "Casting this spell at higher levels provides no additional benefit.";

fn default_upcast_info() -> String {
    DEFAULT_UPCAST_INFO.to_string()
}

/// Null or blank upcast text reads as the default sentence.
fn upcast_info<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = loose_string(deserializer)?;
    if s.trim().is_empty() {
        Ok(default_upcast_info())
    } else {
        Ok(s)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Spell {
    pub name: String,
    #[serde(deserialize_with = "loose_level")]
    pub level: u8,
    #[serde(default, deserialize_with = "loose_string")]
    pub school: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub casting_time: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub range: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub components: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: String,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub damage: Option<String>,
    #[serde(default = "default_upcast_info", deserialize_with = "upcast_info")]
    pub upcast_info: String,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
}

impl Spell {
    /// "Cantrip" or "Level N".
    pub fn level_label(&self) -> String {
        if self.level == 0 {
            "Cantrip".to_string()
        } else {
            format!("Level {}", self.level)
        }
    }
}
