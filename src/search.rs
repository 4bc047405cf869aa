//! src/search.rs
//!
//! Per-entity searchable text and the case-insensitive substring filter used
//! by the browse views and the location tree.

use crate::model::{ClassAction, Condition, Item, Location, Npc, Spell};

/// Anything a browse view can list and filter.
pub trait Searchable {
    fn name(&self) -> &str;

    /// Lowercased text a query is matched against.
    fn haystack(&self) -> String;

    /// Secondary column shown next to the name in list views.
    fn subtitle(&self) -> String {
        String::new()
    }
}

fn join_lower(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub(crate) fn haystack_location(loc: &Location) -> String {
    let tags = loc.tags.join(" ");
    join_lower(&[
        &loc.name,
        &loc.description,
        loc.region.as_deref().unwrap_or_default(),
        &tags,
    ])
}

impl Searchable for Spell {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        let level = self.level.to_string();
        let tags = self.tags.join(" ");
        let aliases = self.aliases.join(" ");
        join_lower(&[
            &self.name,
            &level,
            &self.school,
            &self.casting_time,
            &self.range,
            &self.components,
            &self.duration,
            &self.description,
            &tags,
            &aliases,
        ])
    }

    fn subtitle(&self) -> String {
        format!("{} {}", self.level_label(), self.school).trim().to_string()
    }
}

impl Searchable for Item {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        let tags = self.tags.join(" ");
        let aliases = self.aliases.join(" ");
        let attunement = if self.attunement { "attunement" } else { "" };
        join_lower(&[
            &self.name,
            self.rarity.label(),
            &self.description,
            &tags,
            &aliases,
            attunement,
        ])
    }

    fn subtitle(&self) -> String {
        if self.attunement {
            format!("{} (requires attunement)", self.rarity)
        } else {
            self.rarity.to_string()
        }
    }
}

impl Searchable for Npc {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        let traits = self.additional_traits.join(" ");
        join_lower(&[
            &self.name,
            &self.race,
            self.alignment.label(),
            &self.appearance,
            &self.backstory,
            &traits,
        ])
    }

    fn subtitle(&self) -> String {
        let mut s = format!("{} · {}", self.race, self.alignment);
        if !self.alive {
            s.push_str(" · deceased");
        }
        s
    }
}

impl Searchable for Location {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        haystack_location(self)
    }

    fn subtitle(&self) -> String {
        self.short_description(60)
    }
}

impl Searchable for Condition {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        let aliases = self.aliases.join(" ");
        join_lower(&[&self.name, &self.description, &aliases])
    }
}

impl Searchable for ClassAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn haystack(&self) -> String {
        let aliases = self.aliases.join(" ");
        join_lower(&[&self.name, &self.description, &aliases])
    }
}

/// Trimmed, lowercased substring match. Empty queries match everything.
pub fn matches<T: Searchable + ?Sized>(entry: &T, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || entry.haystack().contains(&q)
}

/// Matching entries sorted by lowercased name.
pub fn filter_sorted<'a, T, I>(entries: I, query: &str) -> Vec<&'a T>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out: Vec<&T> = entries.into_iter().filter(|e| matches(*e, query)).collect();
    out.sort_by_key(|e| e.name().to_lowercase());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rarity;

    fn item(name: &str, attunement: bool) -> Item {
        Item {
            id: None,
            name: name.into(),
            rarity: Rarity::Rare,
            description: "Glows faintly.".into(),
            attunement,
            tags: vec!["weapon".into()],
            aliases: vec![],
        }
    }

    #[test]
    fn item_haystack_mentions_attunement() {
        assert!(matches(&item("Sunblade", true), "ATTUNE"));
        assert!(!matches(&item("Sunblade", false), "attune"));
        assert!(matches(&item("Sunblade", false), "  weapon "));
        assert!(matches(&item("Sunblade", false), ""));
    }

    #[test]
    fn results_sort_case_insensitively() {
        let items = vec![item("zephyr cloak", false), item("Amulet", false), item("bracers", false)];
        let names: Vec<_> = filter_sorted(&items, "").into_iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Amulet", "bracers", "zephyr cloak"]);
    }

    #[test]
    fn spell_level_is_searchable() {
        let spell: Spell = serde_json::from_str(
            r#"{"name": "Fireball", "level": 3, "school": "Evocation", "description": "Boom."}"#,
        )
        .unwrap();
        assert!(matches(&spell, "3"));
        assert!(matches(&spell, "evoc"));
        assert_eq!(spell.subtitle(), "Level 3 Evocation");
    }
}
