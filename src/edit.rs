//! src/edit.rs
//!
//! Editing: add, replace and rewrite records in the data files.
//!
//! Edits go through raw `serde_json::Value`s so fields this crate doesn't model
//! survive the round trip. Files are written pretty-printed with two-space
//! indentation and unescaped non-ASCII.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, WorldError};
use crate::model::EntityKind;
use crate::repo::read_array;

fn record_name(record: &Value) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}

fn write_array(path: &Path, rows: &[Value]) -> Result<()> {
    let mut text = serde_json::to_string_pretty(rows).map_err(|e| WorldError::json(path, e))?;
    text.push('\n');
    fs::write(path, text).map_err(|e| WorldError::io(path, e))
}

/// Load `kind`'s file, hand the rows to `f`, and write them back.
fn rewrite<F>(data_dir: &Path, kind: EntityKind, f: F) -> Result<()>
where
    F: FnOnce(&mut Vec<Value>) -> Result<()>,
{
    let path = data_dir.join(kind.file_name());
    let mut rows = read_array(&path)?.ok_or_else(|| WorldError::MissingFile(path.clone()))?;
    f(&mut rows)?;
    write_array(&path, &rows)
}

/// Apply `update` to the first record named `name`.
fn update_record<F>(data_dir: &Path, kind: EntityKind, name: &str, update: F) -> Result<()>
where
    F: FnOnce(&mut Map<String, Value>),
{
    rewrite(data_dir, kind, |rows| {
        let record = rows
            .iter_mut()
            .find(|r| record_name(r) == Some(name))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| WorldError::RecordNotFound {
                file: kind.file_name().to_string(),
                name: name.to_string(),
            })?;
        update(record);
        Ok(())
    })
}

pub fn set_npc_campaign_notes(data_dir: &Path, name: &str, notes: &str) -> Result<()> {
    let notes = notes.trim().to_string();
    update_record(data_dir, EntityKind::Npc, name, |npc| {
        npc.insert("campaign_notes".into(), Value::String(notes));
    })?;
    tracing::info!("Saved campaign notes for {}", name);
    Ok(())
}

pub fn set_npc_alive(data_dir: &Path, name: &str, alive: bool) -> Result<()> {
    update_record(data_dir, EntityKind::Npc, name, |npc| {
        npc.insert("alive".into(), Value::Bool(alive));
    })?;
    tracing::info!("Marked {} as {}", name, if alive { "alive" } else { "deceased" });
    Ok(())
}

/// Remove every record named `name` from `npcs.json`.
pub fn delete_npc(data_dir: &Path, name: &str) -> Result<()> {
    rewrite(data_dir, EntityKind::Npc, |rows| {
        let before = rows.len();
        rows.retain(|r| record_name(r) != Some(name));
        if rows.len() == before {
            return Err(WorldError::RecordNotFound {
                file: EntityKind::Npc.file_name().to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    })?;
    tracing::info!("Deleted NPC {}", name);
    Ok(())
}

/// Replace a location's direct NPC list. Any legacy `npc_ids` key is dropped
/// so the record has a single source of truth.
pub fn set_location_npcs(data_dir: &Path, location: &str, npcs: &[String]) -> Result<()> {
    let list = Value::Array(npcs.iter().cloned().map(Value::String).collect());
    update_record(data_dir, EntityKind::Location, location, |loc| {
        loc.remove("npc_ids");
        loc.insert("npcs".into(), list);
    })?;
    tracing::info!("Location {} now lists {} NPCs", location, npcs.len());
    Ok(())
}

/// Overlay `update` onto `record`. `null` removes a key, and nested objects
/// are merged so keys the form doesn't show survive.
fn merge(record: &mut Map<String, Value>, update: Map<String, Value>) {
    for (key, value) in update {
        match value {
            Value::Null => {
                record.remove(&key);
            }
            Value::Object(nested) if matches!(record.get(&key), Some(Value::Object(_))) => {
                if let Some(Value::Object(existing)) = record.get_mut(&key) {
                    merge(existing, nested);
                }
            }
            value => {
                record.insert(key, value);
            }
        }
    }
}

/// Add a record, or update the one named `original`. An `original` that is no
/// longer in the file is added as a new record. Names must stay unique within
/// a file. The file and data directory are created when missing.
pub fn save_record(
    data_dir: &Path,
    kind: EntityKind,
    original: Option<&str>,
    record: Map<String, Value>,
) -> Result<()> {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        return Err(WorldError::Invalid(format!("{} name is required", kind)));
    }

    let path = data_dir.join(kind.file_name());
    let mut rows = read_array(&path)?.unwrap_or_default();
    if original != Some(name.as_str()) && rows.iter().any(|r| record_name(r) == Some(name.as_str())) {
        return Err(WorldError::Invalid(format!(
            "{} \"{}\" already exists",
            kind, name
        )));
    }

    let existing = original.and_then(|o| rows.iter().position(|r| record_name(r) == Some(o)));
    match existing {
        Some(i) => {
            if let Some(obj) = rows[i].as_object_mut() {
                merge(obj, record);
            }
            tracing::info!("Updated {} {}", kind, name);
        }
        None => {
            if let Some(o) = original {
                tracing::warn!("{} {} not found, adding it as a new record", kind, o);
            }
            let fresh: Map<String, Value> = record.into_iter().filter(|(_, v)| !v.is_null()).collect();
            rows.push(Value::Object(fresh));
            tracing::info!("Added {} {}", kind, name);
        }
    }

    fs::create_dir_all(data_dir).map_err(|e| WorldError::io(data_dir, e))?;
    write_array(&path, &rows)
}

/// After a rename, point location records at the new name: NPC lists for an
/// NPC, `parent` for a location. Other kinds are referenced only by free text
/// and are left alone.
pub fn rename_references(data_dir: &Path, kind: EntityKind, from: &str, to: &str) -> Result<()> {
    if from == to || !matches!(kind, EntityKind::Npc | EntityKind::Location) {
        return Ok(());
    }
    let path = data_dir.join(EntityKind::Location.file_name());
    let Some(mut rows) = read_array(&path)? else {
        return Ok(());
    };
    let mut changed = 0;
    for loc in rows.iter_mut().filter_map(Value::as_object_mut) {
        match kind {
            EntityKind::Npc => {
                for key in ["npcs", "npc_ids"] {
                    if let Some(Value::Array(list)) = loc.get_mut(key) {
                        for n in list.iter_mut().filter(|n| n.as_str() == Some(from)) {
                            *n = Value::String(to.to_string());
                            changed += 1;
                        }
                    }
                }
            }
            _ => {
                if loc.get("parent").and_then(Value::as_str) == Some(from) {
                    loc.insert("parent".into(), Value::String(to.to_string()));
                    changed += 1;
                }
            }
        }
    }
    if changed > 0 {
        write_array(&path, &rows)?;
        tracing::info!("Renamed {} to {} in {} location references", from, to, changed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(file: &str, body: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(file), body).unwrap();
        dir
    }

    fn read(dir: &Path, file: &str) -> Value {
        serde_json::from_str(&fs::read_to_string(dir.join(file)).unwrap()).unwrap()
    }

    #[test]
    fn notes_are_trimmed_and_unknown_fields_kept() {
        let dir = setup(
            "npcs.json",
            r#"[{"name": "Mara", "alignment": "Neutral Good", "favourite_drink": "rum"}]"#,
        );
        set_npc_campaign_notes(dir.path(), "Mara", "  Owes the party 20gp  \n").unwrap();
        let v = read(dir.path(), "npcs.json");
        assert_eq!(v[0]["campaign_notes"], "Owes the party 20gp");
        assert_eq!(v[0]["favourite_drink"], "rum");
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let dir = setup("npcs.json", r#"[{"name": "Zoë", "alignment": "Unaligned"}]"#);
        set_npc_alive(dir.path(), "Zoë", false).unwrap();
        let text = fs::read_to_string(dir.path().join("npcs.json")).unwrap();
        assert!(text.contains("Zoë"));
        assert!(text.contains("\n  {"));
        assert_eq!(read(dir.path(), "npcs.json")[0]["alive"], false);
    }

    #[test]
    fn unknown_names_and_missing_files_fail() {
        let dir = setup("npcs.json", "[]");
        assert!(matches!(
            set_npc_alive(dir.path(), "Nobody", true),
            Err(WorldError::RecordNotFound { .. })
        ));
        assert!(matches!(delete_npc(dir.path(), "Nobody"), Err(WorldError::RecordNotFound { .. })));
        assert!(matches!(
            set_location_npcs(dir.path(), "Inn", &[]),
            Err(WorldError::MissingFile(_))
        ));
    }

    #[test]
    fn delete_removes_record() {
        let dir = setup(
            "npcs.json",
            r#"[{"name": "A", "alignment": "Unaligned"}, {"name": "B", "alignment": "Unaligned"}]"#,
        );
        delete_npc(dir.path(), "A").unwrap();
        let v = read(dir.path(), "npcs.json");
        assert_eq!(v.as_array().unwrap().len(), 1);
        assert_eq!(v[0]["name"], "B");
    }

    #[test]
    fn location_npcs_replace_legacy_key() {
        let dir = setup(
            "locations.json",
            r#"[{"name": "Inn", "npc_ids": ["Old"], "parent": "Town"}]"#,
        );
        set_location_npcs(dir.path(), "Inn", &["Mara".to_string(), "Orrin".to_string()]).unwrap();
        let v = read(dir.path(), "locations.json");
        assert!(v[0].get("npc_ids").is_none());
        assert_eq!(v[0]["npcs"], serde_json::json!(["Mara", "Orrin"]));
        assert_eq!(v[0]["parent"], "Town");
    }

    #[test]
    fn save_adds_to_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("Data");
        let record = serde_json::json!({"name": "Prone", "description": "Down.", "aliases": null});
        let Value::Object(record) = record else { unreachable!() };
        save_record(&data, EntityKind::Condition, None, record).unwrap();
        let v = read(&data, "conditions.json");
        assert_eq!(v, serde_json::json!([{"name": "Prone", "description": "Down."}]));
    }

    #[test]
    fn save_updates_in_place_and_keeps_unknown_fields() {
        let dir = setup(
            "npcs.json",
            r#"[{"name": "Mara", "alignment": "Unaligned", "campaign_notes": "owes 5gp",
                 "stat_block": {"type": "pc_class", "class": "Rogue", "armor_class": 15}},
                {"name": "Bram", "alignment": "Unaligned"}]"#,
        );
        let Value::Object(record) = serde_json::json!({
            "name": "Mara Quill",
            "race": "Human",
            "stat_block": {"type": "pc_class", "class": "Rogue", "level": 3},
        }) else {
            unreachable!()
        };
        save_record(dir.path(), EntityKind::Npc, Some("Mara"), record).unwrap();
        let v = read(dir.path(), "npcs.json");
        assert_eq!(v.as_array().unwrap().len(), 2);
        assert_eq!(v[0]["name"], "Mara Quill");
        assert_eq!(v[0]["campaign_notes"], "owes 5gp");
        assert_eq!(v[0]["stat_block"]["armor_class"], 15);
        assert_eq!(v[0]["stat_block"]["level"], 3);

        let Value::Object(clear) = serde_json::json!({"name": "Bram", "stat_block": null}) else {
            unreachable!()
        };
        save_record(dir.path(), EntityKind::Npc, Some("Bram"), clear).unwrap();
        assert!(read(dir.path(), "npcs.json")[1].get("stat_block").is_none());
    }

    #[test]
    fn save_rejects_blank_and_duplicate_names() {
        let dir = setup("items.json", r#"[{"name": "Rope"}, {"name": "Lamp"}]"#);
        let record = |name: &str| {
            let mut m = Map::new();
            m.insert("name".into(), Value::String(name.into()));
            m
        };
        assert!(matches!(
            save_record(dir.path(), EntityKind::Item, None, record("  ")),
            Err(WorldError::Invalid(_))
        ));
        assert!(matches!(
            save_record(dir.path(), EntityKind::Item, None, record("Rope")),
            Err(WorldError::Invalid(_))
        ));
        assert!(matches!(
            save_record(dir.path(), EntityKind::Item, Some("Lamp"), record("Rope")),
            Err(WorldError::Invalid(_))
        ));
        // saving under its own name is an update, and a vanished original is appended
        save_record(dir.path(), EntityKind::Item, Some("Rope"), record("Rope")).unwrap();
        save_record(dir.path(), EntityKind::Item, Some("Gone"), record("Torch")).unwrap();
        let v = read(dir.path(), "items.json");
        assert_eq!(v.as_array().unwrap().len(), 3);
        assert_eq!(v[2]["name"], "Torch");
    }

    #[test]
    fn renames_follow_into_locations() {
        let dir = setup(
            "locations.json",
            r#"[{"name": "Port", "npcs": ["Mara", "Bram"]},
                {"name": "Inn", "parent": "Port", "npc_ids": ["Mara"]}]"#,
        );
        rename_references(dir.path(), EntityKind::Npc, "Mara", "Mara Quill").unwrap();
        rename_references(dir.path(), EntityKind::Location, "Port", "Port Virellon").unwrap();
        rename_references(dir.path(), EntityKind::Spell, "Port", "x").unwrap();
        let v = read(dir.path(), "locations.json");
        assert_eq!(v[0]["npcs"], serde_json::json!(["Mara Quill", "Bram"]));
        assert_eq!(v[1]["npc_ids"], serde_json::json!(["Mara Quill"]));
        assert_eq!(v[1]["parent"], "Port Virellon");
        assert_eq!(v[0]["name"], "Port");
    }
}
