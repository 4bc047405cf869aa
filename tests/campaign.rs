//! End-to-end checks over a scratch campaign directory.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use world_in_windows::app::{App, Screen};
use world_in_windows::detail::DetailView;
use world_in_windows::edit;
use world_in_windows::knowledge::{KnowledgeBase, Segment};
use world_in_windows::model::{EntityKind, EntityRef, StatBlock};
use world_in_windows::repo::Repo;
use world_in_windows::{Config, WorldError};

fn write(dir: &Path, file: &str, v: Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(&v).unwrap()).unwrap();
}

fn campaign() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path();
    write(
        d,
        "spells.json",
        json!([
            {"name": "Fireball", "level": 3, "school": "Evocation", "casting_time": "1 action",
             "range": "150 feet", "components": "V, S, M", "duration": "Instantaneous",
             "description": "A bright streak; creatures that fail are left Prone.",
             "damage": "8d6 fire", "tags": ["damage"]},
            {"name": "Mage Armor", "level": 1, "school": "Abjuration",
             "description": "A protective magical force."}
        ]),
    );
    write(
        d,
        "items.json",
        json!([{"id": "i1", "name": "Flame Tongue", "rarity": "Rare", "attunement": true,
                "description": "Speak the command word and it burns like Fireball."}]),
    );
    write(
        d,
        "class_actions.json",
        json!([{"name": "Second Wind", "description": "Regain hit points."}]),
    );
    write(
        d,
        "conditions.json",
        json!([{"name": "Prone", "description": "You are lying down.", "aliases": ["knocked down"]}]),
    );
    write(
        d,
        "npcs.json",
        json!([
            {"name": "Elara Moonwhisper", "race": "Elf", "sex": "F", "age": 212,
             "alignment": "Chaotic_Good",
             "appearance": "Wears a Flame Tongue on her hip.",
             "stat_block": {"type": "pc_class", "class": "Wizard", "level": "9",
                            "ability_scores": {"Intelligence": 18, "Dexterity": 14},
                            "spells": ["Fireball", "Mage Armor"]},
             "secret": "keep me"},
            {"name": "Grub", "race": "Goblin", "alignment": "Neutral Evil",
             "stat_block": {"type": "MonsterManual", "monster_name": "Goblin"},
             "alive": false}
        ]),
    );
    write(
        d,
        "locations.json",
        json!([
            {"name": "Valdris", "description": "A kingdom.", "region": "North"},
            {"name": "Harbour Ward", "description": "Docks where Grub hides.", "parent": "Valdris",
             "npcs": ["Grub"]},
            {"name": "Tower", "description": "Elara Moonwhisper studies here.", "parent": "Harbour Ward",
             "npc_ids": ["Elara Moonwhisper", "Nobody"]}
        ]),
    );
    dir
}

#[test]
fn one_entry_per_record() {
    let dir = campaign();
    let repo = Repo::load(dir.path()).unwrap();
    assert_eq!(repo.count(EntityKind::Spell), 2);
    assert_eq!(repo.count(EntityKind::Item), 1);
    assert_eq!(repo.count(EntityKind::ClassAction), 1);
    assert_eq!(repo.count(EntityKind::Condition), 1);
    assert_eq!(repo.count(EntityKind::Npc), 2);
    assert_eq!(repo.count(EntityKind::Location), 3);

    let elara = repo.npc("Elara Moonwhisper").unwrap();
    assert_eq!(elara.age, "212");
    let StatBlock::PcClass(pc) = &elara.stat_block else {
        panic!("expected a class stat block");
    };
    assert_eq!(pc.level, 9);
    assert_eq!(pc.proficiency_bonus, 4);
    // Mage Armor: 13 + DEX
    assert_eq!(pc.armor_class, 15);
    assert_eq!(pc.spell_save_dc, 8 + 4 + 4);

    // unknown NPC references are dropped, the legacy key still counts
    let (_, tower) = repo.location("Tower").unwrap();
    assert_eq!(tower.npcs, vec!["Elara Moonwhisper"]);
    let (valdris, _) = repo.location("Valdris").unwrap();
    assert_eq!(
        repo.locations.npcs_with_inheritance(valdris),
        vec!["Grub", "Elara Moonwhisper"]
    );
    assert!(repo.contains(&EntityRef::new(EntityKind::Location, "Harbour Ward")));
}

#[test]
fn cross_references_link_across_kinds() {
    let dir = campaign();
    let repo = Repo::load(dir.path()).unwrap();
    let kb = KnowledgeBase::from_repo(&repo);

    let links: Vec<(String, EntityKind)> = kb
        .linkify("Elara Moonwhisper was knocked down by a Fireball.")
        .into_iter()
        .filter_map(|s| match s {
            Segment::Link { label, target } => Some((label, target.kind)),
            Segment::Text(_) => None,
        })
        .collect();
    assert_eq!(
        links,
        vec![
            ("Elara Moonwhisper".to_string(), EntityKind::Npc),
            ("knocked down".to_string(), EntityKind::Condition),
            ("Fireball".to_string(), EntityKind::Spell),
        ]
    );
}

#[test]
fn renamed_reference_does_not_break_navigation() {
    let dir = campaign();
    let config = Config::new(dir.path(), dir.path().join("Media"));
    let mut app = App::new(config);
    app.open(EntityRef::new(EntityKind::Spell, "Fireball"));

    // Rename the condition the spell text mentions, then reload.
    write(
        dir.path(),
        "conditions.json",
        json!([{"name": "Lying Down", "description": "You are lying down."}]),
    );
    assert!(app.load());

    let Some(Screen::Detail { view, .. }) = app.stack.last() else {
        panic!("spell view should survive the reload");
    };
    assert!(view.links().is_empty());

    // A stale reference resolves to nothing rather than panicking.
    let repo = Repo::load(dir.path()).unwrap();
    let kb = KnowledgeBase::from_repo(&repo);
    let gone = EntityRef::new(EntityKind::Condition, "Prone");
    assert!(DetailView::build(&repo, &kb, &app.config, &gone).is_none());
    app.open(gone);
    assert!(app.status.contains("no longer exists"));
}

#[test]
fn edits_round_trip_through_reload() {
    let dir = campaign();
    let d = dir.path();

    edit::set_location_npcs(d, "Valdris", &["Grub".to_string()]).unwrap();
    edit::set_npc_alive(d, "Grub", true).unwrap();
    edit::set_npc_campaign_notes(d, "Elara Moonwhisper", " Knows the way. ").unwrap();

    let repo = Repo::load(d).unwrap();
    assert!(repo.npc("Grub").unwrap().alive);
    assert_eq!(repo.npc("Elara Moonwhisper").unwrap().campaign_notes, "Knows the way.");
    let (_, valdris) = repo.location("Valdris").unwrap();
    assert_eq!(valdris.npcs, vec!["Grub"]);
    assert_eq!(
        repo.locations_of_npc("Grub")
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Valdris", "Harbour Ward"]
    );

    let raw: Value = serde_json::from_str(&fs::read_to_string(d.join("npcs.json")).unwrap()).unwrap();
    assert_eq!(raw[0]["secret"], "keep me");

    let err = edit::delete_npc(d, "Nobody").unwrap_err();
    assert!(matches!(err, WorldError::RecordNotFound { .. }));
    edit::delete_npc(d, "Grub").unwrap();
    let repo = Repo::load(d).unwrap();
    assert!(repo.npc("Grub").is_none());
    let (_, harbour) = repo.location("Harbour Ward").unwrap();
    assert!(harbour.npcs.is_empty());
}

#[test]
fn location_with_both_npc_keys_still_loads() {
    let dir = campaign();
    let d = dir.path();
    write(
        d,
        "locations.json",
        json!([{"name": "Inn", "npcs": ["Grub"], "npc_ids": []}]),
    );
    let repo = Repo::load(d).unwrap();
    assert_eq!(repo.count(EntityKind::Location), 1);
    let (_, inn) = repo.location("Inn").unwrap();
    assert_eq!(inn.npcs, vec!["Grub"]);
}
