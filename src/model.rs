//! src/model.rs
//!
//! Entity records loaded from the campaign JSON files, and the small amount of
//! shared vocabulary (entity kinds, references) the rest of the crate speaks.

pub mod alignment;
pub mod class_action;
pub mod condition;
pub mod item;
pub mod location;
pub mod npc;
pub mod pc_class;
pub mod spell;
pub mod stat_block;

pub use alignment::Alignment;
pub use class_action::ClassAction;
pub use condition::Condition;
pub use item::{Item, Rarity};
pub use location::Location;
pub use npc::Npc;
pub use pc_class::{AbilityScores, CasterType, PcClass, PcClassName, SpellSlot};
pub use spell::Spell;
pub use stat_block::StatBlock;

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The six entity types, one per data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Npc,
    Location,
    Spell,
    Item,
    ClassAction,
    Condition,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Npc,
        EntityKind::Location,
        EntityKind::Spell,
        EntityKind::Item,
        EntityKind::Condition,
        EntityKind::ClassAction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Npc => "NPC",
            EntityKind::Location => "Location",
            EntityKind::Spell => "Spell",
            EntityKind::Item => "Item",
            EntityKind::ClassAction => "Class Action",
            EntityKind::Condition => "Condition",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Npc => "NPCs",
            EntityKind::Location => "Locations",
            EntityKind::Spell => "Spells",
            EntityKind::Item => "Items",
            EntityKind::ClassAction => "Class Actions",
            EntityKind::Condition => "Conditions",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            EntityKind::Npc => "npcs.json",
            EntityKind::Location => "locations.json",
            EntityKind::Spell => "spells.json",
            EntityKind::Item => "items.json",
            EntityKind::ClassAction => "class_actions.json",
            EntityKind::Condition => "conditions.json",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A by-name pointer to an entity of a given kind. Resolution goes through
/// the repo, so a reference may dangle.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub name: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Accept strings, numbers, booleans or null for free-text fields.
/// `"age": 45` and `"age": "45"` both land as `"45"`.
pub(crate) fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Like [`loose_string`] but keeps absence distinct from an empty string.
pub(crate) fn loose_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Levels stored as a number or a numeric string.
pub(crate) fn level_from(value: &Value) -> Result<u8, String> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    n.and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| format!("invalid level {}", value))
}

pub(crate) fn loose_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    level_from(&value).map_err(serde::de::Error::custom)
}

/// String lists that tolerate `null`.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
