//! src/detail.rs
//!
//! Detail views: one entity's full record laid out as headed, labelled rows of
//! linkified text. Built fresh from the repo each time a view is opened or the
//! data reloads, so a view never holds stale entity data.

use std::path::PathBuf;

use crate::config::Config;
use crate::knowledge::{KnowledgeBase, Segment};
use crate::media;
use crate::model::{
    ClassAction, Condition, EntityKind, EntityRef, Item, Npc, Spell, StatBlock,
};
use crate::repo::Repo;

#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Heading(String),
    Field { label: String, segments: Vec<Segment> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetailView {
    pub target: EntityRef,
    pub title: String,
    /// Existing image for the entity, or the expected path if none exists yet.
    pub image: Option<PathBuf>,
    pub image_exists: bool,
    pub rows: Vec<Row>,
}

impl DetailView {
    fn new(target: EntityRef) -> Self {
        let title = format!("{} — {}", target.kind, target.name);
        Self {
            target,
            title,
            image: None,
            image_exists: false,
            rows: Vec::new(),
        }
    }

    fn heading(&mut self, text: &str) {
        self.rows.push(Row::Heading(text.to_string()));
    }

    fn plain(&mut self, label: &str, value: impl Into<String>) {
        let value = value.into();
        let segments = if value.is_empty() { Vec::new() } else { vec![Segment::Text(value)] };
        self.rows.push(Row::Field {
            label: label.to_string(),
            segments,
        });
    }

    fn linked(&mut self, kb: &KnowledgeBase, label: &str, text: &str) {
        self.rows.push(Row::Field {
            label: label.to_string(),
            segments: kb.linkify(text),
        });
    }

    fn segments(&mut self, label: &str, segments: Vec<Segment>) {
        self.rows.push(Row::Field {
            label: label.to_string(),
            segments,
        });
    }

    fn with_image(&mut self, existing: Option<PathBuf>, expected: Option<PathBuf>) {
        self.image_exists = existing.is_some();
        self.image = existing.or(expected);
    }

    /// Link targets in reading order; the index is the keyboard link cursor.
    pub fn links(&self) -> Vec<(&str, &EntityRef)> {
        self.rows
            .iter()
            .filter_map(|r| match r {
                Row::Field { segments, .. } => Some(segments),
                Row::Heading(_) => None,
            })
            .flatten()
            .filter_map(|s| match s {
                Segment::Link { label, target } => Some((label.as_str(), target)),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Build the view for `target`. `None` when the entity no longer exists.
    pub fn build(
        repo: &Repo,
        kb: &KnowledgeBase,
        config: &Config,
        target: &EntityRef,
    ) -> Option<DetailView> {
        let name = target.name.as_str();
        let view = match target.kind {
            EntityKind::Spell => spell_view(kb, config, repo.spell(name)?),
            EntityKind::Item => item_view(kb, config, repo.item(name)?),
            EntityKind::ClassAction => class_action_view(kb, config, repo.class_action(name)?),
            EntityKind::Condition => condition_view(kb, config, repo.condition(name)?),
            EntityKind::Npc => npc_view(repo, kb, config, repo.npc(name)?),
            EntityKind::Location => location_view(repo, kb, name)?,
        };
        Some(view)
    }
}

fn list_links(kind: EntityKind, names: &[&str]) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, n) in names.iter().enumerate() {
        if i > 0 {
            out.push(Segment::text(", "));
        }
        out.push(Segment::link(*n, EntityRef::new(kind, *n)));
    }
    out
}

fn spell_view(kb: &KnowledgeBase, config: &Config, spell: &Spell) -> DetailView {
    let mut v = DetailView::new(EntityRef::new(EntityKind::Spell, &spell.name));
    v.with_image(
        media::resolve_image(config, EntityKind::Spell, &spell.name),
        media::expected_image(config, EntityKind::Spell, &spell.name),
    );
    v.plain("Name", spell.name.clone());
    v.plain("Level", spell.level_label());
    v.plain("School", spell.school.clone());
    v.plain("Casting Time", spell.casting_time.clone());
    v.plain("Range", spell.range.clone());
    v.plain("Components", spell.components.clone());
    v.plain("Duration", spell.duration.clone());
    if let Some(damage) = &spell.damage {
        v.linked(kb, "Damage", damage);
    }
    v.linked(kb, "Description", &spell.description);
    v.linked(kb, "At Higher Levels", &spell.upcast_info);
    if !spell.tags.is_empty() {
        v.plain("Tags", spell.tags.join(", "));
    }
    if !spell.aliases.is_empty() {
        v.plain("Also Known As", spell.aliases.join(", "));
    }
    v
}

fn item_view(kb: &KnowledgeBase, config: &Config, item: &Item) -> DetailView {
    let mut v = DetailView::new(EntityRef::new(EntityKind::Item, &item.name));
    v.with_image(
        media::resolve_image(config, EntityKind::Item, &item.name),
        media::expected_image(config, EntityKind::Item, &item.name),
    );
    v.plain("Name", item.name.clone());
    v.plain("Rarity", item.rarity.to_string());
    v.plain("Attunement", if item.attunement { "Required" } else { "Not required" });
    v.linked(kb, "Description", &item.description);
    if !item.tags.is_empty() {
        v.plain("Tags", item.tags.join(", "));
    }
    v
}

fn class_action_view(kb: &KnowledgeBase, config: &Config, action: &ClassAction) -> DetailView {
    let mut v = DetailView::new(EntityRef::new(EntityKind::ClassAction, &action.name));
    v.with_image(
        media::resolve_image(config, EntityKind::ClassAction, &action.name),
        media::expected_image(config, EntityKind::ClassAction, &action.name),
    );
    v.plain("Name", action.name.clone());
    v.linked(kb, "Description", &action.description);
    v
}

fn condition_view(kb: &KnowledgeBase, config: &Config, condition: &Condition) -> DetailView {
    let mut v = DetailView::new(EntityRef::new(EntityKind::Condition, &condition.name));
    v.with_image(
        media::resolve_image(config, EntityKind::Condition, &condition.name),
        None,
    );
    v.plain("Name", condition.name.clone());
    v.linked(kb, "Description", &condition.description);
    v
}

fn npc_view(repo: &Repo, kb: &KnowledgeBase, config: &Config, npc: &Npc) -> DetailView {
    let mut v = DetailView::new(EntityRef::new(EntityKind::Npc, &npc.name));
    v.with_image(
        media::resolve_npc_portrait(config, npc),
        media::expected_image(config, EntityKind::Npc, &npc.name),
    );
    v.plain("Name", npc.name.clone());
    v.plain("Status", npc.status_label());
    v.plain("Race", npc.race.clone());
    v.plain("Sex", npc.sex.clone());
    v.plain("Age", npc.age.clone());
    v.plain("Alignment", npc.alignment.to_string());

    let places: Vec<&str> = repo
        .locations_of_npc(&npc.name)
        .into_iter()
        .map(|l| l.name.as_str())
        .collect();
    if !places.is_empty() {
        v.segments("Found At", list_links(EntityKind::Location, &places));
    }

    v.linked(kb, "Appearance", &npc.appearance);
    v.linked(kb, "Backstory", &npc.backstory);
    if !npc.additional_traits.is_empty() {
        v.heading("Traits");
        for t in &npc.additional_traits {
            v.linked(kb, "•", t);
        }
    }
    v.linked(kb, "Campaign Notes", &npc.campaign_notes);
    stat_block_rows(&mut v, kb, config, &npc.stat_block);
    v
}

fn signed(n: i32) -> String {
    format!("{:+}", n)
}

fn stat_block_rows(v: &mut DetailView, kb: &KnowledgeBase, config: &Config, sb: &StatBlock) {
    match sb {
        StatBlock::Empty => {}
        StatBlock::MonsterManual { monster_name } => {
            v.heading("Stat Block");
            v.plain("Monster", monster_name.clone());
            match media::monster_manual_page(config, sb) {
                Some(page) => v.plain("Page", page.display().to_string()),
                None => {
                    if let Some(expected) = media::expected_monster_manual_page(config, sb) {
                        v.plain("Page", format!("{} (missing)", expected.display()));
                    }
                }
            }
        }
        StatBlock::PcClass(pc) => {
            v.heading("Stat Block");
            v.plain("Class", pc.title());
            v.plain("Proficiency Bonus", signed(pc.proficiency_bonus));
            let scores = pc
                .ability_scores
                .rows()
                .iter()
                .map(|(name, score, m)| format!("{} {} ({})", name, score, signed(*m)))
                .collect::<Vec<_>>()
                .join("  ");
            v.plain("Abilities", scores);
            v.plain("Hit Points", pc.hit_points.to_string());
            v.plain("Armor Class", pc.armor_class.to_string());
            v.plain("Speed", format!("{} ft.", pc.move_speed));
            v.plain("Caster Type", pc.caster_type.to_string());
            if !pc.spell_slots.is_empty() {
                v.plain("Spell Save DC", pc.spell_save_dc.to_string());
                v.plain("Spell Attack", signed(pc.spell_attack_modifier));
                let slots = pc
                    .spell_slots
                    .iter()
                    .map(|s| format!("L{}×{}", s.level, s.count))
                    .collect::<Vec<_>>()
                    .join("  ");
                v.plain("Spell Slots", slots);
            }
            if !pc.spells.is_empty() {
                v.linked(kb, "Spells", &pc.spells.join(", "));
            }
        }
    }
}

fn location_view(repo: &Repo, kb: &KnowledgeBase, name: &str) -> Option<DetailView> {
    let (id, loc) = repo.location(name)?;
    let tree = &repo.locations;
    let mut v = DetailView::new(EntityRef::new(EntityKind::Location, &loc.name));
    v.plain("Name", loc.name.clone());
    v.plain("Region", loc.region.clone().unwrap_or_else(|| "Unknown".to_string()));
    if let Some(parent) = tree.parent(id).and_then(|p| tree.location(p)) {
        v.segments("Within", list_links(EntityKind::Location, &[parent.name.as_str()]));
    }
    v.linked(kb, "Description", &loc.description);
    if !loc.tags.is_empty() {
        v.plain("Tags", loc.tags.join(", "));
    }

    v.heading("NPCs");
    let npcs = tree.npcs_with_inheritance(id);
    if npcs.is_empty() {
        v.plain("", "No NPCs here.");
    }
    for npc_name in npcs {
        let mut segments = vec![Segment::link(npc_name, EntityRef::new(EntityKind::Npc, npc_name))];
        if let Some(npc) = repo.npc(npc_name) {
            let mut extra = format!("  {} · {}", npc.race, npc.alignment);
            if !loc.npcs.iter().any(|n| n == npc_name) {
                extra.push_str(" · inherited");
            }
            if !npc.alive {
                extra.push_str(" · deceased");
            }
            segments.push(Segment::Text(extra));
        }
        v.segments("•", segments);
    }

    let children: Vec<_> = tree
        .children(id)
        .iter()
        .filter_map(|&c| tree.location(c))
        .collect();
    if !children.is_empty() {
        v.heading("Places Within");
        for child in children {
            v.segments(
                "•",
                vec![
                    Segment::link(&child.name, EntityRef::new(EntityKind::Location, &child.name)),
                    Segment::Text(format!("  {}", child.short_description(60))),
                ],
            );
        }
    }
    Some(v)
}
