//! src/model/pc_class.rs
//!
//! Player-class stat blocks. Only class, level, ability scores, an optional
//! armor class and a spell list are stored; everything else is derived from
//! the 5e class tables when the block is built.

use std::fmt;

use serde::Deserialize;

const BASE_AC: i32 = 10;
const MAGE_ARMOR_BASE_AC: i32 = 13;
const DEFAULT_MOVE_SPEED: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PcClassName {
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
}

impl PcClassName {
    pub const ALL: [PcClassName; 12] = [
        PcClassName::Barbarian,
        PcClassName::Bard,
        PcClassName::Cleric,
        PcClassName::Druid,
        PcClassName::Fighter,
        PcClassName::Monk,
        PcClassName::Paladin,
        PcClassName::Ranger,
        PcClassName::Rogue,
        PcClassName::Sorcerer,
        PcClassName::Warlock,
        PcClassName::Wizard,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PcClassName::Barbarian => "Barbarian",
            PcClassName::Bard => "Bard",
            PcClassName::Cleric => "Cleric",
            PcClassName::Druid => "Druid",
            PcClassName::Fighter => "Fighter",
            PcClassName::Monk => "Monk",
            PcClassName::Paladin => "Paladin",
            PcClassName::Ranger => "Ranger",
            PcClassName::Rogue => "Rogue",
            PcClassName::Sorcerer => "Sorcerer",
            PcClassName::Warlock => "Warlock",
            PcClassName::Wizard => "Wizard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        PcClassName::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(value.trim()))
    }

    fn hit_points_per_level(self) -> i32 {
        match self {
            PcClassName::Barbarian => 7,
            PcClassName::Fighter | PcClassName::Paladin | PcClassName::Ranger => 6,
            PcClassName::Sorcerer | PcClassName::Wizard => 4,
            _ => 5,
        }
    }

    fn caster_type(self) -> CasterType {
        match self {
            PcClassName::Bard
            | PcClassName::Cleric
            | PcClassName::Druid
            | PcClassName::Sorcerer
            | PcClassName::Wizard => CasterType::Full,
            PcClassName::Paladin | PcClassName::Ranger => CasterType::Half,
            PcClassName::Warlock => CasterType::Pact,
            _ => CasterType::None,
        }
    }
}

impl fmt::Display for PcClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CasterType {
    Full,
    Half,
    Third,
    Pact,
    None,
}

impl fmt::Display for CasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CasterType::Full => "Full",
            CasterType::Half => "Half",
            CasterType::Third => "Third",
            CasterType::Pact => "Pact",
            CasterType::None => "None",
        };
        f.write_str(s)
    }
}

fn default_score() -> i32 {
    10
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct AbilityScores {
    #[serde(rename = "Strength", alias = "strength", default = "default_score")]
    pub strength: i32,
    #[serde(rename = "Dexterity", alias = "dexterity", default = "default_score")]
    pub dexterity: i32,
    #[serde(rename = "Constitution", alias = "constitution", default = "default_score")]
    pub constitution: i32,
    #[serde(rename = "Intelligence", alias = "intelligence", default = "default_score")]
    pub intelligence: i32,
    #[serde(rename = "Wisdom", alias = "wisdom", default = "default_score")]
    pub wisdom: i32,
    #[serde(rename = "Charisma", alias = "charisma", default = "default_score")]
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    /// 5e ability modifier, rounding toward negative infinity.
    pub fn modifier(score: i32) -> i32 {
        (score - 10).div_euclid(2)
    }

    /// `(name, score, modifier)` rows in the conventional order.
    pub fn rows(&self) -> [(&'static str, i32, i32); 6] {
        [
            ("STR", self.strength, Self::modifier(self.strength)),
            ("DEX", self.dexterity, Self::modifier(self.dexterity)),
            ("CON", self.constitution, Self::modifier(self.constitution)),
            ("INT", self.intelligence, Self::modifier(self.intelligence)),
            ("WIS", self.wisdom, Self::modifier(self.wisdom)),
            ("CHA", self.charisma, Self::modifier(self.charisma)),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpellSlot {
    pub level: u8,
    pub count: u8,
}

const fn slot(level: u8, count: u8) -> SpellSlot {
    SpellSlot { level, count }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PcClass {
    pub name: PcClassName,
    pub level: u8,
    pub ability_scores: AbilityScores,
    pub spells: Vec<String>,
    pub proficiency_bonus: i32,
    pub hit_points: i32,
    pub armor_class: i32,
    pub move_speed: u32,
    pub caster_type: CasterType,
    pub spell_save_dc: i32,
    pub spell_attack_modifier: i32,
    pub spell_slots: Vec<SpellSlot>,
}

impl PcClass {
    /// Build a PC stat block, deriving every secondary statistic.
    ///
    /// An explicit `armor_class` only wins when it is above the unarmored base
    /// of 10; otherwise the class's unarmored formula applies.
    pub fn new(
        name: PcClassName,
        level: u8,
        ability_scores: AbilityScores,
        armor_class: Option<i32>,
        spells: Vec<String>,
    ) -> Self {
        let proficiency_bonus = proficiency_bonus(level);
        let con = AbilityScores::modifier(ability_scores.constitution);
        let hit_points = i32::from(level) * (name.hit_points_per_level() + con);
        let caster_type = name.caster_type();
        let casting_mod = spellcasting_modifier(name, &ability_scores);
        let armor_class = match armor_class {
            Some(ac) if ac > BASE_AC => ac,
            _ => default_armor_class(name, &ability_scores, &spells),
        };

        Self {
            name,
            level,
            ability_scores,
            spells,
            proficiency_bonus,
            hit_points,
            armor_class,
            move_speed: DEFAULT_MOVE_SPEED,
            caster_type,
            spell_save_dc: 8 + proficiency_bonus + casting_mod,
            spell_attack_modifier: proficiency_bonus + casting_mod,
            spell_slots: spell_slots(level, caster_type),
        }
    }

    pub fn title(&self) -> String {
        format!("{}, Level {}", self.name, self.level)
    }
}

pub fn proficiency_bonus(level: u8) -> i32 {
    match level {
        1..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        17..=20 => 6,
        _ => 2,
    }
}

/// Spell lists are hand-typed, so the name is compared trimmed and ignoring
/// ASCII case: "mage armor" counts.
fn knows_mage_armor(spells: &[String]) -> bool {
    spells.iter().any(|s| s.trim().eq_ignore_ascii_case("Mage Armor"))
}

fn default_armor_class(name: PcClassName, scores: &AbilityScores, spells: &[String]) -> i32 {
    let dex = AbilityScores::modifier(scores.dexterity);
    match name {
        PcClassName::Barbarian => BASE_AC + dex + AbilityScores::modifier(scores.constitution),
        PcClassName::Monk => BASE_AC + dex + AbilityScores::modifier(scores.wisdom),
        PcClassName::Wizard | PcClassName::Sorcerer
            if knows_mage_armor(spells) =>
        {
            MAGE_ARMOR_BASE_AC + dex
        }
        _ => BASE_AC + dex,
    }
}

fn spellcasting_modifier(name: PcClassName, scores: &AbilityScores) -> i32 {
    match name {
        PcClassName::Cleric | PcClassName::Druid | PcClassName::Ranger => {
            AbilityScores::modifier(scores.wisdom)
        }
        PcClassName::Bard | PcClassName::Paladin | PcClassName::Sorcerer | PcClassName::Warlock => {
            AbilityScores::modifier(scores.charisma)
        }
        PcClassName::Wizard => AbilityScores::modifier(scores.intelligence),
        _ => 0,
    }
}

/// Slot table per caster type. Tables stop at level 12; higher levels keep
/// the level-12 row.
pub fn spell_slots(level: u8, caster_type: CasterType) -> Vec<SpellSlot> {
    let level = level.min(12);
    let row: &[SpellSlot] = match caster_type {
        CasterType::Full => match level {
            0 => &[],
            1 => &[slot(1, 2)],
            2 => &[slot(1, 3)],
            3 => &[slot(1, 4), slot(2, 2)],
            4 => &[slot(1, 4), slot(2, 3)],
            5 => &[slot(1, 4), slot(2, 3), slot(3, 2)],
            6 => &[slot(1, 4), slot(2, 3), slot(3, 3)],
            7 => &[slot(1, 4), slot(2, 3), slot(3, 3), slot(4, 1)],
            8 => &[slot(1, 4), slot(2, 3), slot(3, 3), slot(4, 2)],
            9 => &[slot(1, 4), slot(2, 3), slot(3, 3), slot(4, 3), slot(5, 1)],
            10 => &[slot(1, 4), slot(2, 3), slot(3, 3), slot(4, 3), slot(5, 2)],
            _ => &[slot(1, 4), slot(2, 3), slot(3, 3), slot(4, 3), slot(5, 2), slot(6, 1)],
        },
        CasterType::Half => match level {
            0 => &[],
            1 | 2 => &[slot(1, 2)],
            3 | 4 => &[slot(1, 3)],
            5 | 6 => &[slot(1, 4), slot(2, 2)],
            7 | 8 => &[slot(1, 4), slot(2, 3)],
            9 | 10 => &[slot(1, 4), slot(2, 3), slot(3, 2)],
            _ => &[slot(1, 4), slot(2, 3), slot(3, 3)],
        },
        CasterType::Third => match level {
            0..=2 => &[],
            3 => &[slot(1, 2)],
            4..=6 => &[slot(1, 3)],
            7..=9 => &[slot(1, 4), slot(2, 2)],
            _ => &[slot(1, 4), slot(2, 3)],
        },
        CasterType::Pact => match level {
            0 => &[],
            1 => &[slot(1, 1)],
            2 => &[slot(1, 2)],
            3 | 4 => &[slot(2, 2)],
            5 | 6 => &[slot(3, 2)],
            7 | 8 => &[slot(4, 2)],
            9 | 10 => &[slot(5, 2)],
            _ => &[slot(5, 3)],
        },
        CasterType::None => &[],
    };
    row.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(str_: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> AbilityScores {
        AbilityScores {
            strength: str_,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    #[test]
    fn modifiers_round_down() {
        assert_eq!(AbilityScores::modifier(10), 0);
        assert_eq!(AbilityScores::modifier(11), 0);
        assert_eq!(AbilityScores::modifier(9), -1);
        assert_eq!(AbilityScores::modifier(8), -1);
        assert_eq!(AbilityScores::modifier(18), 4);
        assert_eq!(AbilityScores::modifier(1), -5);
    }

    #[test]
    fn proficiency_follows_level_bands() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(12), 4);
        assert_eq!(proficiency_bonus(17), 6);
        assert_eq!(proficiency_bonus(0), 2);
        assert_eq!(proficiency_bonus(30), 2);
    }

    #[test]
    fn wizard_with_mage_armor() {
        let pc = PcClass::new(
            PcClassName::Wizard,
            5,
            scores(8, 14, 12, 18, 12, 10),
            None,
            vec!["Mage Armor".into(), "Fireball".into()],
        );
        assert_eq!(pc.proficiency_bonus, 3);
        assert_eq!(pc.hit_points, 5 * (4 + 1));
        assert_eq!(pc.armor_class, 13 + 2);
        assert_eq!(pc.caster_type, CasterType::Full);
        assert_eq!(pc.spell_save_dc, 8 + 3 + 4);
        assert_eq!(pc.spell_attack_modifier, 3 + 4);
        assert_eq!(pc.spell_slots, vec![slot(1, 4), slot(2, 3), slot(3, 2)]);
        assert_eq!(pc.title(), "Wizard, Level 5");
    }

    #[test]
    fn mage_armor_name_ignores_case_and_padding() {
        let ac = |spells: &[&str]| {
            PcClass::new(
                PcClassName::Sorcerer,
                3,
                scores(8, 16, 12, 10, 10, 16),
                None,
                spells.iter().map(|s| s.to_string()).collect(),
            )
            .armor_class
        };
        assert_eq!(ac(&["mage armor"]), 13 + 3);
        assert_eq!(ac(&[" MAGE ARMOR "]), 13 + 3);
        assert_eq!(ac(&["Mage Armour"]), 10 + 3);
        assert_eq!(ac(&[]), 10 + 3);
    }

    #[test]
    fn barbarian_unarmored_defense_and_explicit_armor() {
        let s = scores(16, 14, 16, 8, 10, 10);
        let unarmored = PcClass::new(PcClassName::Barbarian, 3, s, None, vec![]);
        assert_eq!(unarmored.armor_class, 10 + 2 + 3);
        assert_eq!(unarmored.hit_points, 3 * (7 + 3));
        assert!(unarmored.spell_slots.is_empty());
        assert_eq!(unarmored.spell_save_dc, 8 + 2);

        let armored = PcClass::new(PcClassName::Barbarian, 3, s, Some(18), vec![]);
        assert_eq!(armored.armor_class, 18);

        let ignored = PcClass::new(PcClassName::Barbarian, 3, s, Some(10), vec![]);
        assert_eq!(ignored.armor_class, 15);
    }

    #[test]
    fn monk_adds_wisdom_and_warlock_uses_pact_slots() {
        let monk = PcClass::new(PcClassName::Monk, 1, scores(10, 16, 10, 10, 14, 10), None, vec![]);
        assert_eq!(monk.armor_class, 10 + 3 + 2);

        let warlock = PcClass::new(
            PcClassName::Warlock,
            9,
            scores(10, 10, 10, 10, 10, 16),
            None,
            vec![],
        );
        assert_eq!(warlock.caster_type, CasterType::Pact);
        assert_eq!(warlock.spell_slots, vec![slot(5, 2)]);
        assert_eq!(warlock.spell_attack_modifier, 4 + 3);
    }

    #[test]
    fn slot_tables_cap_at_level_twelve() {
        assert_eq!(spell_slots(20, CasterType::Full), spell_slots(12, CasterType::Full));
        assert_eq!(spell_slots(15, CasterType::Half).len(), 3);
        assert!(spell_slots(2, CasterType::Third).is_empty());
        assert!(spell_slots(9, CasterType::None).is_empty());
    }

    #[test]
    fn scores_deserialize_with_defaults() {
        let s: AbilityScores = serde_json::from_str(r#"{"Strength": 15, "wisdom": 13}"#).unwrap();
        assert_eq!(s.strength, 15);
        assert_eq!(s.wisdom, 13);
        assert_eq!(s.charisma, 10);
    }

    #[test]
    fn class_names_parse_case_insensitively() {
        assert_eq!(PcClassName::parse("ranger"), Some(PcClassName::Ranger));
        assert_eq!(PcClassName::parse("Artificer"), None);
    }
}
