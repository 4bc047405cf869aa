//! src/model/location.rs
//!
//! A location record as stored in `locations.json`. Nesting is expressed by
//! the `parent` name; the tree itself lives in `crate::location_tree`.

use serde::Deserialize;

use super::{loose_opt_string, loose_string, string_list};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "LocationRecord")]
pub struct Location {
    pub name: String,
    pub description: String,
    pub region: Option<String>,
    pub tags: Vec<String>,
    /// Names of NPCs placed directly here (not inherited from children).
    pub npcs: Vec<String>,
    pub parent: Option<String>,
}

/// On-disk shape. Older files list NPCs under `npc_ids`, and some carry both
/// keys; the two lists are merged.
#[derive(Deserialize)]
struct LocationRecord {
    name: String,
    #[serde(default, deserialize_with = "loose_string")]
    description: String,
    #[serde(default, deserialize_with = "loose_opt_string")]
    region: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    npcs: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    npc_ids: Vec<String>,
    #[serde(default, deserialize_with = "loose_opt_string")]
    parent: Option<String>,
}

impl From<LocationRecord> for Location {
    fn from(r: LocationRecord) -> Self {
        let mut npcs = r.npcs;
        for id in r.npc_ids {
            if !npcs.contains(&id) {
                npcs.push(id);
            }
        }
        Location {
            name: r.name,
            description: r.description,
            region: r.region,
            tags: r.tags,
            npcs,
            parent: r.parent,
        }
    }
}

impl Location {
    /// Shortened description for list columns, ending in "…" when cut.
    pub fn short_description(&self, max_len: usize) -> String {
        let d = self.description.trim();
        if d.chars().count() <= max_len {
            return d.to_string();
        }
        let cut: String = d.chars().take(max_len).collect();
        format!("{}…", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(description: &str) -> Location {
        Location {
            name: "Port Virellon".into(),
            description: description.into(),
            region: None,
            tags: vec![],
            npcs: vec![],
            parent: None,
        }
    }

    #[test]
    fn short_description_truncates_on_chars() {
        assert_eq!(loc("  A harbour town.  ").short_description(80), "A harbour town.");
        assert_eq!(loc("Salt and tar everywhere").short_description(9), "Salt and…");
        assert_eq!(loc("ééééé").short_description(3), "ééé…");
    }

    #[test]
    fn npc_ids_is_accepted_as_alias() {
        let l: Location =
            serde_json::from_str(r#"{"name": "Inn", "npc_ids": ["Mara"], "parent": "Town"}"#)
                .unwrap();
        assert_eq!(l.npcs, vec!["Mara".to_string()]);
        assert_eq!(l.parent.as_deref(), Some("Town"));
    }

    #[test]
    fn both_npc_keys_are_merged() {
        let l: Location = serde_json::from_str(
            r#"{"name": "Inn", "npcs": ["Mara", "Bram"], "npc_ids": ["Bram", "Oskar"]}"#,
        )
        .unwrap();
        assert_eq!(l.npcs, vec!["Mara", "Bram", "Oskar"]);

        let l: Location =
            serde_json::from_str(r#"{"name": "Inn", "npcs": ["Mara"], "npc_ids": []}"#).unwrap();
        assert_eq!(l.npcs, vec!["Mara"]);
    }
}
