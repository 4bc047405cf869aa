//! src/form.rs
//!
//! Add/edit forms for every entity kind.
//!
//! A form is a flat list of text fields. Saving validates the fields and turns
//! them into the JSON record handed to [`crate::edit::save_record`]; a `null`
//! value in that record means "remove this key". List fields take `;`
//! separated values.

use serde_json::{Map, Value, json};

use crate::error::{Result, WorldError};
use crate::model::spell::DEFAULT_UPCAST_INFO;
use crate::model::{Alignment, EntityKind, EntityRef, PcClassName, Rarity, StatBlock};
use crate::repo::Repo;

pub const LIST_SEPARATOR: char = ';';

const SCORES: [&str; 6] = [
    "Strength",
    "Dexterity",
    "Constitution",
    "Intelligence",
    "Wisdom",
    "Charisma",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Whole number in `min..=max`. Blank is allowed where the record has a
    /// default.
    Number { min: i64, max: i64 },
    /// yes/no
    Flag,
    List,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl Field {
    fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            value: value.into(),
        }
    }

    fn number(key: &'static str, label: &'static str, min: i64, max: i64, value: impl ToString) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number { min, max },
            value: value.to_string(),
        }
    }

    fn flag(key: &'static str, label: &'static str, value: bool) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Flag,
            value: if value { "yes" } else { "no" }.to_string(),
        }
    }

    fn list(key: &'static str, label: &'static str, values: &[String]) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::List,
            value: values.join(&format!("{} ", LIST_SEPARATOR)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryForm {
    pub kind: EntityKind,
    /// Name of the record being edited. `None` adds a new record.
    pub original: Option<String>,
    pub fields: Vec<Field>,
    pub focused: usize,
}

impl EntryForm {
    /// Blank form for a new entry.
    pub fn new(kind: EntityKind) -> Self {
        let fields = match kind {
            EntityKind::Npc => npc_fields(&NpcDraft::default()),
            EntityKind::Location => location_fields("", "", "", "", &[]),
            EntityKind::Spell => spell_fields(&SpellDraft::default()),
            EntityKind::Item => vec![
                Field::text("name", "Name", ""),
                Field::text("rarity", "Rarity", Rarity::Common.label()),
                Field::text("description", "Description", ""),
                Field::flag("attunement", "Requires Attunement", false),
                Field::list("tags", "Tags", &[]),
                Field::list("aliases", "Aliases", &[]),
            ],
            EntityKind::Condition | EntityKind::ClassAction => described_fields("", "", &[]),
        };
        Self {
            kind,
            original: None,
            fields,
            focused: 0,
        }
    }

    /// New location nested under `parent`.
    pub fn new_location_in(parent: &str) -> Self {
        let mut form = Self::new(EntityKind::Location);
        form.set("parent", parent);
        form
    }

    /// Form prefilled from the current record, or `None` if it is gone.
    pub fn edit(repo: &Repo, target: &EntityRef) -> Option<Self> {
        let fields = match target.kind {
            EntityKind::Npc => {
                let npc = repo.npc(&target.name)?;
                let mut draft = NpcDraft {
                    name: npc.name.clone(),
                    race: npc.race.clone(),
                    sex: npc.sex.clone(),
                    age: npc.age.clone(),
                    alignment: npc.alignment,
                    appearance: npc.appearance.clone(),
                    backstory: npc.backstory.clone(),
                    traits: npc.additional_traits.clone(),
                    alive: npc.alive,
                    ..NpcDraft::default()
                };
                match &npc.stat_block {
                    StatBlock::Empty => {}
                    StatBlock::MonsterManual { monster_name } => {
                        draft.stat_block = "monster manual";
                        draft.monster_name = monster_name.clone();
                    }
                    StatBlock::PcClass(pc) => {
                        draft.stat_block = "pc class";
                        draft.class = pc.name.label().to_string();
                        draft.level = pc.level;
                        draft.scores = pc.ability_scores.rows().map(|(_, score, _)| score);
                        draft.spells = pc.spells.clone();
                    }
                }
                npc_fields(&draft)
            }
            EntityKind::Location => {
                let (_, loc) = repo.location(&target.name)?;
                location_fields(
                    &loc.name,
                    &loc.description,
                    loc.region.as_deref().unwrap_or_default(),
                    loc.parent.as_deref().unwrap_or_default(),
                    &loc.tags,
                )
            }
            EntityKind::Spell => {
                let s = repo.spell(&target.name)?;
                spell_fields(&SpellDraft {
                    name: s.name.clone(),
                    level: s.level,
                    school: s.school.clone(),
                    casting_time: s.casting_time.clone(),
                    range: s.range.clone(),
                    components: s.components.clone(),
                    duration: s.duration.clone(),
                    description: s.description.clone(),
                    damage: s.damage.clone().unwrap_or_default(),
                    upcast_info: s.upcast_info.clone(),
                    tags: s.tags.clone(),
                    aliases: s.aliases.clone(),
                })
            }
            EntityKind::Item => {
                let it = repo.item(&target.name)?;
                vec![
                    Field::text("name", "Name", it.name.as_str()),
                    Field::text("rarity", "Rarity", it.rarity.label()),
                    Field::text("description", "Description", it.description.as_str()),
                    Field::flag("attunement", "Requires Attunement", it.attunement),
                    Field::list("tags", "Tags", &it.tags),
                    Field::list("aliases", "Aliases", &it.aliases),
                ]
            }
            EntityKind::Condition => {
                let c = repo.condition(&target.name)?;
                described_fields(&c.name, &c.description, &c.aliases)
            }
            EntityKind::ClassAction => {
                let a = repo.class_action(&target.name)?;
                described_fields(&a.name, &a.description, &a.aliases)
            }
        };
        Some(Self {
            kind: target.kind,
            original: Some(target.name.clone()),
            fields,
            focused: 0,
        })
    }

    pub fn title(&self) -> String {
        match &self.original {
            Some(name) => format!("Edit {} — {}", self.kind, name),
            None => format!("Add {}", self.kind),
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map_or("", |f| f.value.trim())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(f) = self.fields.iter_mut().find(|f| f.key == key) {
            f.value = value.to_string();
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len().max(1);
    }

    pub fn focus_prev(&mut self) {
        let n = self.fields.len().max(1);
        self.focused = (self.focused + n - 1) % n;
    }

    pub fn push(&mut self, c: char) {
        if let Some(f) = self.fields.get_mut(self.focused) {
            f.value.push(c);
        }
    }

    pub fn pop(&mut self) {
        if let Some(f) = self.fields.get_mut(self.focused) {
            f.value.pop();
        }
    }

    fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    fn required(&self, key: &str) -> Result<String> {
        let v = self.value(key);
        if v.is_empty() {
            let label = self.field(key).map_or(key, |f| f.label);
            return Err(invalid(format!("{} is required", label)));
        }
        Ok(v.to_string())
    }

    fn number(&self, key: &str) -> Result<Option<i64>> {
        let Some(field) = self.field(key) else {
            return Ok(None);
        };
        let raw = field.value.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let FieldKind::Number { min, max } = field.kind else {
            return Ok(raw.parse().ok());
        };
        match raw.parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => Ok(Some(n)),
            _ => Err(invalid(format!(
                "{} must be a whole number from {} to {}",
                field.label, min, max
            ))),
        }
    }

    fn flag(&self, key: &str) -> Result<bool> {
        match self.value(key).to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" => Ok(true),
            "" | "n" | "no" | "false" => Ok(false),
            other => Err(invalid(format!("Answer yes or no, not '{}'", other))),
        }
    }

    fn list(&self, key: &str) -> Value {
        Value::Array(
            self.value(key)
                .split(LIST_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )
    }

    /// Empty text becomes `null`.
    fn optional(&self, key: &str) -> Value {
        match self.value(key) {
            "" => Value::Null,
            v => Value::String(v.to_string()),
        }
    }

    fn text(&self, key: &str) -> Value {
        Value::String(self.value(key).to_string())
    }

    /// Validate the fields and build the record to save.
    pub fn to_record(&self, repo: &Repo) -> Result<Map<String, Value>> {
        let name = self.required("name")?;
        let record = match self.kind {
            EntityKind::Spell => {
                let level = self.number("level")?.unwrap_or(0);
                let upcast = match self.value("upcast_info") {
                    "" => DEFAULT_UPCAST_INFO,
                    v => v,
                };
                json!({
                    "name": name,
                    "level": level,
                    "school": self.text("school"),
                    "casting_time": self.text("casting_time"),
                    "range": self.text("range"),
                    "components": self.text("components"),
                    "duration": self.text("duration"),
                    "description": self.text("description"),
                    "damage": self.optional("damage"),
                    "upcast_info": upcast,
                    "tags": self.list("tags"),
                    "aliases": self.list("aliases"),
                })
            }
            EntityKind::Item => {
                let rarity = Rarity::from(self.value("rarity").to_string());
                json!({
                    "name": name,
                    "rarity": rarity.label(),
                    "description": self.text("description"),
                    "attunement": self.flag("attunement")?,
                    "tags": self.list("tags"),
                    "aliases": self.list("aliases"),
                })
            }
            EntityKind::Condition | EntityKind::ClassAction => json!({
                "name": name,
                "description": self.text("description"),
                "aliases": self.list("aliases"),
            }),
            EntityKind::Location => {
                let parent = self.parent(repo, &name)?;
                json!({
                    "name": name,
                    "description": self.text("description"),
                    "region": self.optional("region"),
                    "parent": parent,
                    "tags": self.list("tags"),
                })
            }
            EntityKind::Npc => {
                let alignment = match self.value("alignment") {
                    "" => Alignment::Unaligned,
                    v => Alignment::parse(v)
                        .ok_or_else(|| invalid(format!("Unknown alignment '{}'", v)))?,
                };
                let age = match self.value("age") {
                    "" => Value::Null,
                    v => v
                        .parse::<u64>()
                        .map_or_else(|_| Value::String(v.to_string()), Value::from),
                };
                json!({
                    "name": name,
                    "race": self.text("race"),
                    "sex": self.text("sex"),
                    "age": age,
                    "alignment": alignment.label(),
                    "appearance": self.text("appearance"),
                    "backstory": self.text("backstory"),
                    "additional_traits": self.list("additional_traits"),
                    "alive": self.flag("alive")?,
                    "stat_block": self.stat_block()?,
                })
            }
        };
        match record {
            Value::Object(map) => Ok(map),
            _ => Err(invalid("record must be an object")),
        }
    }

    /// The parent must exist and must not sit inside the location itself.
    fn parent(&self, repo: &Repo, name: &str) -> Result<Value> {
        let parent = self.value("parent");
        if parent.is_empty() {
            return Ok(Value::Null);
        }
        if parent == name || self.original.as_deref() == Some(parent) {
            return Err(invalid("A location cannot be its own parent"));
        }
        let Some((parent_id, _)) = repo.location(parent) else {
            return Err(invalid(format!("No location named '{}'", parent)));
        };
        if let Some((own_id, _)) = self.original.as_deref().and_then(|o| repo.location(o)) {
            if repo.locations.descendants(own_id).contains(&parent_id) {
                return Err(invalid(format!("'{}' is inside {}", parent, name)));
            }
        }
        Ok(Value::String(parent.to_string()))
    }

    fn stat_block(&self) -> Result<Value> {
        let kind = self
            .value("stat_block")
            .to_ascii_lowercase()
            .replace([' ', '_'], "");
        match kind.as_str() {
            "" | "none" => Ok(Value::Null),
            "monstermanual" => {
                let monster = self.required("monster_name")?;
                Ok(json!({"type": "monstermanual", "monster_name": monster}))
            }
            "pcclass" => {
                let class_label = self.required("class")?;
                let class = PcClassName::parse(&class_label)
                    .ok_or_else(|| invalid(format!("Unknown class '{}'", class_label)))?;
                let level = self.number("level")?.unwrap_or(1);
                let mut scores = Map::new();
                for key in SCORES {
                    let score = self.number(key)?.unwrap_or(10);
                    scores.insert(key.to_string(), Value::from(score));
                }
                Ok(json!({
                    "type": "pc_class",
                    "class": class.label(),
                    "level": level,
                    "ability_scores": scores,
                    "spells": self.list("spells"),
                }))
            }
            _ => Err(invalid(
                "Stat block must be none, monster manual or pc class",
            )),
        }
    }
}

fn invalid(message: impl Into<String>) -> WorldError {
    WorldError::Invalid(message.into())
}

fn described_fields(name: &str, description: &str, aliases: &[String]) -> Vec<Field> {
    vec![
        Field::text("name", "Name", name),
        Field::text("description", "Description", description),
        Field::list("aliases", "Aliases", aliases),
    ]
}

fn location_fields(name: &str, description: &str, region: &str, parent: &str, tags: &[String]) -> Vec<Field> {
    vec![
        Field::text("name", "Name", name),
        Field::text("description", "Description", description),
        Field::text("region", "Region", region),
        Field::text("parent", "Parent Location", parent),
        Field::list("tags", "Tags", tags),
    ]
}

struct SpellDraft {
    name: String,
    level: u8,
    school: String,
    casting_time: String,
    range: String,
    components: String,
    duration: String,
    description: String,
    damage: String,
    upcast_info: String,
    tags: Vec<String>,
    aliases: Vec<String>,
}

impl Default for SpellDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            school: String::new(),
            casting_time: "1 action".into(),
            range: String::new(),
            components: String::new(),
            duration: "Instantaneous".into(),
            description: String::new(),
            damage: String::new(),
            upcast_info: String::new(),
            tags: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

fn spell_fields(d: &SpellDraft) -> Vec<Field> {
    vec![
        Field::text("name", "Name", d.name.as_str()),
        Field::number("level", "Level", 0, 9, d.level),
        Field::text("school", "School", d.school.as_str()),
        Field::text("casting_time", "Casting Time", d.casting_time.as_str()),
        Field::text("range", "Range", d.range.as_str()),
        Field::text("components", "Components", d.components.as_str()),
        Field::text("duration", "Duration", d.duration.as_str()),
        Field::text("description", "Description", d.description.as_str()),
        Field::text("damage", "Damage", d.damage.as_str()),
        Field::text("upcast_info", "Upcast Info", d.upcast_info.as_str()),
        Field::list("tags", "Tags", &d.tags),
        Field::list("aliases", "Aliases", &d.aliases),
    ]
}

struct NpcDraft {
    name: String,
    race: String,
    sex: String,
    age: String,
    alignment: Alignment,
    appearance: String,
    backstory: String,
    traits: Vec<String>,
    alive: bool,
    stat_block: &'static str,
    monster_name: String,
    class: String,
    level: u8,
    scores: [i32; 6],
    spells: Vec<String>,
}

impl Default for NpcDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            race: String::new(),
            sex: String::new(),
            age: String::new(),
            alignment: Alignment::Unaligned,
            appearance: String::new(),
            backstory: String::new(),
            traits: Vec::new(),
            alive: true,
            stat_block: "none",
            monster_name: String::new(),
            class: String::new(),
            level: 1,
            scores: [10; 6],
            spells: Vec::new(),
        }
    }
}

fn npc_fields(d: &NpcDraft) -> Vec<Field> {
    let mut fields = vec![
        Field::text("name", "Name", d.name.as_str()),
        Field::text("race", "Race", d.race.as_str()),
        Field::text("sex", "Sex", d.sex.as_str()),
        Field::text("age", "Age", d.age.as_str()),
        Field::text("alignment", "Alignment", d.alignment.label()),
        Field::text("appearance", "Appearance", d.appearance.as_str()),
        Field::text("backstory", "Backstory", d.backstory.as_str()),
        Field::list("additional_traits", "Traits", &d.traits),
        Field::flag("alive", "Alive", d.alive),
        Field::text("stat_block", "Stat Block (none / monster manual / pc class)", d.stat_block),
        Field::text("monster_name", "Monster Name", d.monster_name.as_str()),
        Field::text("class", "Class", d.class.as_str()),
        Field::number("level", "Level", 1, 20, d.level),
    ];
    for (key, score) in SCORES.into_iter().zip(d.scores) {
        fields.push(Field::number(key, key, 1, 30, score));
    }
    fields.push(Field::list("spells", "Spells", &d.spells));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn repo() -> (tempfile::TempDir, Repo) {
        let dir = tempfile::tempdir().unwrap();
        let write = |file: &str, v: Value| fs::write(dir.path().join(file), v.to_string()).unwrap();
        write(
            "npcs.json",
            json!([{"name": "Mara", "race": "Human", "age": 41, "alignment": "Neutral Good",
                    "additional_traits": ["Sly", "Loyal"],
                    "stat_block": {"type": "pc_class", "class": "Rogue", "level": 4,
                                   "ability_scores": {"Dexterity": 16}}}]),
        );
        write(
            "locations.json",
            json!([
                {"name": "Port", "description": "Harbour"},
                {"name": "Inn", "parent": "Port"}
            ]),
        );
        let repo = Repo::load(dir.path()).unwrap();
        (dir, repo)
    }

    fn fill(form: &mut EntryForm, pairs: &[(&str, &str)]) {
        for (k, v) in pairs {
            form.set(k, v);
        }
    }

    #[test]
    fn name_is_required() {
        let (_dir, repo) = repo();
        let form = EntryForm::new(EntityKind::Condition);
        let err = form.to_record(&repo).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn spell_record_uses_defaults_for_blanks() {
        let (_dir, repo) = repo();
        let mut form = EntryForm::new(EntityKind::Spell);
        fill(&mut form, &[("name", " Shield "), ("level", "1"), ("tags", "defense; ; reaction")]);
        let rec = form.to_record(&repo).unwrap();
        assert_eq!(rec["name"], "Shield");
        assert_eq!(rec["level"], 1);
        assert_eq!(rec["damage"], Value::Null);
        assert_eq!(rec["upcast_info"], DEFAULT_UPCAST_INFO);
        assert_eq!(rec["tags"], json!(["defense", "reaction"]));

        form.set("level", "12");
        let err = form.to_record(&repo).unwrap_err();
        assert!(err.to_string().contains("from 0 to 9"));
    }

    #[test]
    fn npc_form_prefills_and_builds_a_class_block() {
        let (_dir, repo) = repo();
        let mut form = EntryForm::edit(&repo, &EntityRef::new(EntityKind::Npc, "Mara")).unwrap();
        assert_eq!(form.title(), "Edit NPC — Mara");
        assert_eq!(form.value("stat_block"), "pc class");
        assert_eq!(form.value("Dexterity"), "16");
        assert_eq!(form.value("additional_traits"), "Sly; Loyal");

        form.set("spells", "Shield; Mage Armor");
        let rec = form.to_record(&repo).unwrap();
        assert_eq!(rec["age"], 41);
        assert_eq!(rec["alignment"], "Neutral Good");
        assert_eq!(rec["stat_block"]["class"], "Rogue");
        assert_eq!(rec["stat_block"]["ability_scores"]["Dexterity"], 16);
        assert_eq!(rec["stat_block"]["spells"], json!(["Shield", "Mage Armor"]));

        form.set("stat_block", "Monster_Manual");
        assert!(form.to_record(&repo).is_err());
        form.set("monster_name", "Bandit");
        let rec = form.to_record(&repo).unwrap();
        assert_eq!(rec["stat_block"], json!({"type": "monstermanual", "monster_name": "Bandit"}));

        form.set("alignment", "Sideways");
        assert!(form.to_record(&repo).is_err());
    }

    #[test]
    fn location_parent_must_exist_and_not_loop() {
        let (_dir, repo) = repo();
        let mut form = EntryForm::new_location_in("Port");
        form.set("name", "Docks");
        assert_eq!(form.to_record(&repo).unwrap()["parent"], "Port");

        form.set("parent", "Atlantis");
        assert!(form.to_record(&repo).is_err());

        let mut port = EntryForm::edit(&repo, &EntityRef::new(EntityKind::Location, "Port")).unwrap();
        port.set("parent", "Inn");
        let err = port.to_record(&repo).unwrap_err();
        assert!(err.to_string().contains("inside"));
        port.set("parent", "Port");
        assert!(port.to_record(&repo).is_err());
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut form = EntryForm::new(EntityKind::Item);
        for c in "Rope".chars() {
            form.push(c);
        }
        form.focus_prev();
        assert_eq!(form.fields[form.focused].key, "aliases");
        form.focus_next();
        form.pop();
        assert_eq!(form.value("name"), "Rop");
        assert!(EntryForm::edit(&Repo::empty("x"), &EntityRef::new(EntityKind::Item, "Rope")).is_none());
    }
}
