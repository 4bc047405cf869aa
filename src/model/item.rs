//! src/model/item.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{loose_opt_string, loose_string, string_list};

/// Item rarity. Unrecognized strings survive as `Other` so homebrew tiers
/// still display.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
    Artifact,
    Other(String),
}

impl Rarity {
    pub fn label(&self) -> &str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::VeryRare => "Very Rare",
            Rarity::Legendary => "Legendary",
            Rarity::Artifact => "Artifact",
            Rarity::Other(s) => s,
        }
    }
}

impl From<String> for Rarity {
    fn from(value: String) -> Self {
        match value.trim().replace('_', " ").to_ascii_lowercase().as_str() {
            "common" => Rarity::Common,
            "uncommon" => Rarity::Uncommon,
            "rare" => Rarity::Rare,
            "very rare" => Rarity::VeryRare,
            "legendary" => Rarity::Legendary,
            "artifact" => Rarity::Artifact,
            _ => Rarity::Other(value),
        }
    }
}

impl From<Rarity> for String {
    fn from(value: Rarity) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: String,
    #[serde(default)]
    pub attunement: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_keeps_unknown_tiers() {
        assert_eq!(Rarity::from("Very_Rare".to_string()), Rarity::VeryRare);
        assert_eq!(Rarity::from("very rare".to_string()), Rarity::VeryRare);
        let odd = Rarity::from("Mythic".to_string());
        assert_eq!(odd.label(), "Mythic");
    }

    #[test]
    fn attunement_defaults_to_false() {
        let item: Item =
            serde_json::from_str(r#"{"name": "Rope", "rarity": "Common", "description": "50 ft"}"#)
                .unwrap();
        assert!(!item.attunement);
        assert_eq!(item.id, None);
    }
}
