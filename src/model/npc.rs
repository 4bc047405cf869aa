//! src/model/npc.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{Alignment, StatBlock, loose_opt_string, loose_string, string_list};

fn default_alive() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Npc {
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub race: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub sex: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub age: String,
    pub alignment: Alignment,
    #[serde(default)]
    pub stat_block: StatBlock,
    #[serde(default, deserialize_with = "loose_string")]
    pub appearance: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub backstory: String,
    #[serde(default, deserialize_with = "traits")]
    pub additional_traits: Vec<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub campaign_notes: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub portrait_path: Option<String>,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub image_path: Option<String>,
}

impl Npc {
    /// Short blurb for previews: appearance, else backstory, capped at
    /// `max_len` characters.
    pub fn summary(&self, max_len: usize) -> String {
        let text = match self.appearance.trim() {
            "" => self.backstory.trim(),
            appearance => appearance,
        };
        if text.chars().count() <= max_len {
            return text.to_string();
        }
        let cut: String = text.chars().take(max_len).collect();
        format!("{}…", cut.trim_end())
    }

    pub fn status_label(&self) -> &'static str {
        if self.alive { "Alive" } else { "Deceased" }
    }
}

/// Traits arrive either as plain strings or as `{"description": ...}`
/// objects; anything else is dropped.
fn traits<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|t| match t {
            Value::String(s) => Some(s),
            Value::Object(mut obj) => match obj.remove("description") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_accept_strings_and_objects() {
        let npc: Npc = serde_json::from_str(
            r#"{"name": "Mara Quill", "race": "Human", "alignment": "Neutral Good",
                "additional_traits": ["Keen eye", {"description": "Knows every ship"}, 4, {"name": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(npc.additional_traits, vec!["Keen eye", "Knows every ship"]);
        assert!(npc.alive);
        assert_eq!(npc.stat_block, StatBlock::Empty);
    }

    #[test]
    fn unknown_alignment_rejects_record() {
        let res = serde_json::from_str::<Npc>(r#"{"name": "X", "alignment": "Sideways"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn summary_prefers_appearance() {
        let mut npc: Npc = serde_json::from_str(
            r#"{"name": "Orrin", "alignment": "Unaligned", "backstory": "Former smuggler."}"#,
        )
        .unwrap();
        assert_eq!(npc.summary(180), "Former smuggler.");
        npc.appearance = "Tall, grey-bearded, one eye".into();
        assert_eq!(npc.summary(5), "Tall,…");
    }
}
