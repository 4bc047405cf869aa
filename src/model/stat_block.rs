//! src/model/stat_block.rs
//!
//! NPC stat blocks are either a player-class build or a pointer to a Monster
//! Manual page. Anything else (or nothing) is an empty block.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::level_from;
use super::pc_class::{AbilityScores, PcClass, PcClassName};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum StatBlock {
    #[default]
    Empty,
    MonsterManual {
        monster_name: String,
    },
    PcClass(PcClass),
}

impl StatBlock {
    pub fn summary(&self) -> String {
        match self {
            StatBlock::Empty => "None".to_string(),
            StatBlock::MonsterManual { monster_name } => format!("Monster Manual: {}", monster_name),
            StatBlock::PcClass(pc) => pc.title(),
        }
    }

    /// Spell names referenced by the block.
    pub fn spells(&self) -> &[String] {
        match self {
            StatBlock::PcClass(pc) => &pc.spells,
            _ => &[],
        }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let obj = match value {
            Value::Null => return Ok(StatBlock::Empty),
            Value::Object(obj) if obj.is_empty() => return Ok(StatBlock::Empty),
            Value::Object(obj) => obj,
            other => return Err(format!("stat_block must be an object, got {}", other)),
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        match kind.as_str() {
            "monstermanual" => {
                let monster_name = obj
                    .get("monster_name")
                    .and_then(Value::as_str)
                    .ok_or("monstermanual stat_block needs a monster_name")?;
                Ok(StatBlock::MonsterManual {
                    monster_name: monster_name.to_string(),
                })
            }
            "pc_class" => {
                let class_label = obj.get("class").and_then(Value::as_str).unwrap_or("Wizard");
                let class = PcClassName::parse(class_label)
                    .ok_or_else(|| format!("unknown class '{}'", class_label))?;
                let level = match obj.get("level") {
                    None | Some(Value::Null) => 1,
                    Some(v) => level_from(v)?,
                };
                let ability_scores = match obj.get("ability_scores") {
                    None | Some(Value::Null) => AbilityScores::default(),
                    Some(v) => AbilityScores::deserialize(v).map_err(|e| e.to_string())?,
                };
                let armor_class = obj
                    .get("armor_class")
                    .and_then(Value::as_i64)
                    .and_then(|ac| i32::try_from(ac).ok());
                let spells = match obj.get("spells") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(v) => Vec::<String>::deserialize(v).map_err(|e| e.to_string())?,
                };
                Ok(StatBlock::PcClass(PcClass::new(
                    class,
                    level,
                    ability_scores,
                    armor_class,
                    spells,
                )))
            }
            _ => Ok(StatBlock::Empty),
        }
    }
}

impl<'de> Deserialize<'de> for StatBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        StatBlock::from_value(value).map_err(D::Error::custom)
    }
}
