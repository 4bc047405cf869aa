//! src/media.rs
//!
//! Image path derivation. Media files live in per-kind folders under the media
//! root and are named after the entity: lowercased, spaces to underscores,
//! `.png` (e.g. "Mara Quill" -> `NPCs/mara_quill.png`).

use std::path::PathBuf;

use crate::config::Config;
use crate::model::{EntityKind, Npc, StatBlock};

pub fn image_file_name(name: &str) -> String {
    format!("{}.png", name.replace(' ', "_").to_lowercase())
}

/// Folder holding images for `kind`. Locations have none.
pub fn folder_for(config: &Config, kind: EntityKind) -> Option<PathBuf> {
    match kind {
        EntityKind::Npc => Some(config.npc_portraits()),
        EntityKind::Spell => Some(config.spell_icons()),
        EntityKind::Item => Some(config.item_icons()),
        EntityKind::ClassAction => Some(config.ability_icons()),
        EntityKind::Condition => Some(config.condition_icons()),
        EntityKind::Location => None,
    }
}

/// Where the image for `name` would be, whether or not it exists.
pub fn expected_image(config: &Config, kind: EntityKind, name: &str) -> Option<PathBuf> {
    folder_for(config, kind).map(|dir| dir.join(image_file_name(name)))
}

/// Existing image for an entity, if any.
pub fn resolve_image(config: &Config, kind: EntityKind, name: &str) -> Option<PathBuf> {
    expected_image(config, kind, name).filter(|p| p.is_file())
}

/// NPC portraits honour an explicit `portrait_path` / `image_path` first.
pub fn resolve_npc_portrait(config: &Config, npc: &Npc) -> Option<PathBuf> {
    [&npc.portrait_path, &npc.image_path]
        .into_iter()
        .flatten()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .or_else(|| resolve_image(config, EntityKind::Npc, &npc.name))
}

/// Where the Monster Manual page for a stat block would be. Pages are stored
/// under their monster name verbatim.
pub fn expected_monster_manual_page(config: &Config, stat_block: &StatBlock) -> Option<PathBuf> {
    match stat_block {
        StatBlock::MonsterManual { monster_name } => {
            Some(config.monster_manual_pages().join(format!("{}.png", monster_name)))
        }
        _ => None,
    }
}

/// Existing Monster Manual page, if any.
pub fn monster_manual_page(config: &Config, stat_block: &StatBlock) -> Option<PathBuf> {
    expected_monster_manual_page(config, stat_block).filter(|p| p.is_file())
}
