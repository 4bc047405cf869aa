//! src/repo.rs
//!
//! Loads the six campaign JSON files into memory.
//!
//! A missing file is an empty collection. A file that is not a JSON array is an
//! error surfaced to the user. A single bad record is logged and skipped so one
//! typo doesn't hide the rest of the campaign.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, WorldError};
use crate::location_tree::{LocationId, LocationTree};
use crate::model::{ClassAction, Condition, EntityKind, EntityRef, Item, Location, Npc, Spell};

#[derive(Debug, Default)]
pub struct Repo {
    pub data_dir: PathBuf,
    pub spells: Vec<Spell>,
    pub items: Vec<Item>,
    pub class_actions: Vec<ClassAction>,
    pub conditions: Vec<Condition>,
    pub npcs: Vec<Npc>,
    pub locations: LocationTree,
    spells_by_name: HashMap<String, usize>,
    items_by_name: HashMap<String, usize>,
    class_actions_by_name: HashMap<String, usize>,
    conditions_by_name: HashMap<String, usize>,
    npcs_by_name: HashMap<String, usize>,
}

/// Read a top-level JSON array. `Ok(None)` when the file doesn't exist.
pub(crate) fn read_array(path: &Path) -> Result<Option<Vec<Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| WorldError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| WorldError::json(path, e))?;
    match value {
        Value::Array(rows) => Ok(Some(rows)),
        _ => Err(WorldError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

/// Decode every record, skipping (and logging) the ones that don't fit `T`.
fn load_records<T: DeserializeOwned>(data_dir: &Path, kind: EntityKind) -> Result<Vec<T>> {
    let path = data_dir.join(kind.file_name());
    let Some(rows) = read_array(&path)? else {
        tracing::info!("{} not found, no {} loaded", path.display(), kind.plural());
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(row) {
            Ok(record) => out.push(record),
            Err(e) => tracing::warn!("Skipping {}[{}]: {}", kind.file_name(), i, e),
        }
    }
    tracing::debug!("Loaded {} {}", out.len(), kind.plural());
    Ok(out)
}

/// Later records win, matching a plain name -> record map.
fn index_by_name<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    names
        .enumerate()
        .map(|(i, n)| (n.to_string(), i))
        .collect()
}

impl Repo {
    /// An empty repo rooted at `data_dir`, used when loading fails.
    pub fn empty(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tracing::info!("Loading campaign data from {}", data_dir.display());

        let spells: Vec<Spell> = load_records(&data_dir, EntityKind::Spell)?;
        let items: Vec<Item> = load_records(&data_dir, EntityKind::Item)?;
        let class_actions: Vec<ClassAction> = load_records(&data_dir, EntityKind::ClassAction)?;
        let conditions: Vec<Condition> = load_records(&data_dir, EntityKind::Condition)?;
        let npcs: Vec<Npc> = load_records(&data_dir, EntityKind::Npc)?;
        let location_records: Vec<Location> = load_records(&data_dir, EntityKind::Location)?;

        let npcs_by_name = index_by_name(npcs.iter().map(|n| n.name.as_str()));
        let locations = LocationTree::build(location_records, |n| npcs_by_name.contains_key(n));

        let repo = Self {
            spells_by_name: index_by_name(spells.iter().map(|s| s.name.as_str())),
            items_by_name: index_by_name(items.iter().map(|s| s.name.as_str())),
            class_actions_by_name: index_by_name(class_actions.iter().map(|s| s.name.as_str())),
            conditions_by_name: index_by_name(conditions.iter().map(|s| s.name.as_str())),
            npcs_by_name,
            data_dir,
            spells,
            items,
            class_actions,
            conditions,
            npcs,
            locations,
        };
        tracing::info!(
            "Loaded {} NPCs, {} locations, {} spells, {} items, {} class actions, {} conditions",
            repo.npcs.len(),
            repo.locations.len(),
            repo.spells.len(),
            repo.items.len(),
            repo.class_actions.len(),
            repo.conditions.len()
        );
        Ok(repo)
    }

    /// Re-read everything from the same directory.
    pub fn reload(&self) -> Result<Self> {
        Self::load(self.data_dir.clone())
    }

    pub fn spell(&self, name: &str) -> Option<&Spell> {
        self.spells_by_name.get(name).map(|&i| &self.spells[i])
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items_by_name.get(name).map(|&i| &self.items[i])
    }

    pub fn class_action(&self, name: &str) -> Option<&ClassAction> {
        self.class_actions_by_name
            .get(name)
            .map(|&i| &self.class_actions[i])
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions_by_name.get(name).map(|&i| &self.conditions[i])
    }

    pub fn npc(&self, name: &str) -> Option<&Npc> {
        self.npcs_by_name.get(name).map(|&i| &self.npcs[i])
    }

    pub fn location(&self, name: &str) -> Option<(LocationId, &Location)> {
        let id = self.locations.find(name)?;
        self.locations.location(id).map(|l| (id, l))
    }

    /// Whether a reference still points at something.
    pub fn contains(&self, target: &EntityRef) -> bool {
        let name = target.name.as_str();
        match target.kind {
            EntityKind::Npc => self.npc(name).is_some(),
            EntityKind::Location => self.location(name).is_some(),
            EntityKind::Spell => self.spell(name).is_some(),
            EntityKind::Item => self.item(name).is_some(),
            EntityKind::ClassAction => self.class_action(name).is_some(),
            EntityKind::Condition => self.condition(name).is_some(),
        }
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Npc => self.npcs.len(),
            EntityKind::Location => self.locations.len(),
            EntityKind::Spell => self.spells.len(),
            EntityKind::Item => self.items.len(),
            EntityKind::ClassAction => self.class_actions.len(),
            EntityKind::Condition => self.conditions.len(),
        }
    }

    /// Locations whose own (non-inherited) NPC list contains `npc`.
    pub fn locations_of_npc(&self, npc: &str) -> Vec<&Location> {
        self.locations
            .iter()
            .filter(|(_, l)| l.npcs.iter().any(|n| n == npc))
            .map(|(_, l)| l)
            .collect()
    }
}
