//! src/knowledge.rs
//!
//! Cross-reference knowledge base.
//!
//! Every spell, item, class action, NPC and condition is registered under its
//! exact name, plus any aliases. [`KnowledgeBase::linkify`] scans free text for
//! those names and splits it into plain and link segments; detail views render
//! the links and follow them through [`KnowledgeBase::resolve`].
//!
//! Matching is case-insensitive and longest-first, and a match only counts when
//! the characters on either side are not word characters, so "Shield" does not
//! light up inside "Shielded". When the longest name at a position runs into
//! a word, shorter names starting there are tried before moving on.

use std::cell::OnceCell;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::model::{EntityKind, EntityRef, Npc};
use crate::repo::Repo;

/// NPC hover blurbs are cut to this many characters.
pub const NPC_SUMMARY_LEN: usize = 180;

#[derive(Clone, Debug, PartialEq)]
pub struct KnowledgeEntry {
    pub kind: EntityKind,
    pub name: String,
    pub hover_description: String,
}

impl KnowledgeEntry {
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.kind, self.name.clone())
    }
}

/// A run of rendered text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { label: String, target: EntityRef },
}

impl Segment {
    pub fn text(s: impl Into<String>) -> Self {
        Segment::Text(s.into())
    }

    pub fn link(label: impl Into<String>, target: EntityRef) -> Self {
        Segment::Link {
            label: label.into(),
            target,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(s) => s,
            Segment::Link { label, .. } => label,
        }
    }
}

#[derive(Debug, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, KnowledgeEntry>,
    /// lowercased name -> canonical name
    names_lower: HashMap<String, String>,
    /// lowercased alias -> canonical name
    aliases: HashMap<String, String>,
    matcher: OnceCell<Option<Matcher>>,
}

/// Compiled alternation plus the labels it was built from, longest first.
#[derive(Debug)]
struct Matcher {
    re: Regex,
    labels: Vec<String>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register everything linkable in the repo.
    pub fn from_repo(repo: &Repo) -> Self {
        let mut kb = Self::new();
        for s in &repo.spells {
            kb.add_entry(EntityKind::Spell, &s.name, s.description.trim());
            kb.add_aliases(&s.aliases, &s.name);
        }
        for it in &repo.items {
            kb.add_entry(EntityKind::Item, &it.name, it.description.trim());
            kb.add_aliases(&it.aliases, &it.name);
        }
        for ac in &repo.class_actions {
            kb.add_entry(EntityKind::ClassAction, &ac.name, ac.description.trim());
            kb.add_aliases(&ac.aliases, &ac.name);
        }
        for npc in &repo.npcs {
            kb.add_npc(npc);
        }
        for c in &repo.conditions {
            kb.add_entry(EntityKind::Condition, &c.name, c.description.trim());
            kb.add_aliases(&c.aliases, &c.name);
        }
        tracing::info!(
            "Knowledge base ready: {} entries, {} aliases",
            kb.entries.len(),
            kb.aliases.len()
        );
        kb
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the entry for `name`.
    pub fn add_entry(&mut self, kind: EntityKind, name: &str, hover_description: &str) {
        if name.trim().is_empty() {
            return;
        }
        self.names_lower.insert(name.to_lowercase(), name.to_string());
        self.entries.insert(
            name.to_string(),
            KnowledgeEntry {
                kind,
                name: name.to_string(),
                hover_description: hover_description.to_string(),
            },
        );
        self.matcher = OnceCell::new();
    }

    pub fn add_npc(&mut self, npc: &Npc) {
        self.add_entry(EntityKind::Npc, &npc.name, &npc.summary(NPC_SUMMARY_LEN));
        self.add_aliases(&npc.aliases, &npc.name);
    }

    pub fn add_alias(&mut self, alias: &str, canonical_name: &str) {
        if alias.trim().is_empty() {
            return;
        }
        self.aliases
            .insert(alias.to_lowercase(), canonical_name.to_string());
        self.matcher = OnceCell::new();
    }

    fn add_aliases(&mut self, aliases: &[String], canonical_name: &str) {
        for a in aliases {
            self.add_alias(a, canonical_name);
        }
    }

    /// Exact name, then alias (case-insensitive), then name (case-insensitive).
    pub fn resolve(&self, label: &str) -> Option<&KnowledgeEntry> {
        if let Some(e) = self.entries.get(label) {
            return Some(e);
        }
        let lower = label.to_lowercase();
        self.aliases
            .get(&lower)
            .or_else(|| self.names_lower.get(&lower))
            .and_then(|canon| self.entries.get(canon))
    }

    fn matcher(&self) -> Option<&Matcher> {
        self.matcher
            .get_or_init(|| {
                let mut labels: Vec<&str> = self
                    .entries
                    .keys()
                    .map(String::as_str)
                    .chain(self.aliases.keys().map(String::as_str))
                    .filter(|l| !l.is_empty())
                    .collect();
                if labels.is_empty() {
                    return None;
                }
                // longest first so alternation prefers "Greater Invisibility"
                // over "Invisibility"
                labels.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
                labels.dedup();
                let alternation = labels
                    .iter()
                    .map(|l| regex::escape(l))
                    .collect::<Vec<_>>()
                    .join("|");
                match RegexBuilder::new(&format!("(?:{})", alternation))
                    .case_insensitive(true)
                    .size_limit(64 * (1 << 20))
                    .build()
                {
                    Ok(re) => Some(Matcher {
                        re,
                        labels: labels.into_iter().map(str::to_string).collect(),
                    }),
                    Err(e) => {
                        tracing::warn!("Could not compile link pattern: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Split `text` into plain and link segments. The text's own casing is
    /// kept for the label; the target carries the canonical name.
    pub fn linkify(&self, text: &str) -> Vec<Segment> {
        let Some(matcher) = self.matcher() else {
            return plain(text);
        };

        let mut out = Vec::new();
        let mut last = 0;
        let mut pos = 0;
        while pos < text.len() {
            let Some(m) = matcher.re.find_at(text, pos) else {
                break;
            };
            let hit = if !m.is_empty() && boundary_before(text, m.start()) {
                self.longest_at(matcher, text, m.start(), m.end())
            } else {
                None
            };

            match hit {
                Some((end, entry)) => {
                    if m.start() > last {
                        out.push(Segment::text(&text[last..m.start()]));
                    }
                    out.push(Segment::link(&text[m.start()..end], entry.entity()));
                    last = end;
                    pos = end;
                }
                None => {
                    pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        if last < text.len() {
            out.push(Segment::text(&text[last..]));
        }
        out
    }

    /// The longest label starting at `start` that ends on a word boundary and
    /// resolves. The regex only reports the longest alternative, so when that
    /// one runs into a word ("Magic Missiles") the shorter labels are tried in
    /// turn ("Magic").
    fn longest_at(
        &self,
        matcher: &Matcher,
        text: &str,
        start: usize,
        end: usize,
    ) -> Option<(usize, &KnowledgeEntry)> {
        let accept = |end: usize| {
            if boundary_after(text, end) {
                self.resolve(&text[start..end]).map(|e| (end, e))
            } else {
                None
            }
        };
        if let Some(hit) = accept(end) {
            return Some(hit);
        }
        let rest = &text[start..];
        matcher
            .labels
            .iter()
            .filter_map(|label| prefix_len(rest, label))
            .filter(|&len| len > 0 && start + len < end)
            .find_map(|len| accept(start + len))
    }
}

/// Byte length of the prefix of `hay` that equals `needle` ignoring case.
fn prefix_len(hay: &str, needle: &str) -> Option<usize> {
    let mut chars = hay.char_indices();
    for n in needle.chars() {
        let (_, h) = chars.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map_or(hay.len(), |(i, _)| i))
}

fn plain(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment::text(text)]
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn boundary_before(text: &str, idx: usize) -> bool {
    !text[..idx].chars().next_back().is_some_and(is_word_char)
}

fn boundary_after(text: &str, idx: usize) -> bool {
    !text[idx..].chars().next().is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.add_entry(EntityKind::Spell, "Invisibility", "You vanish.");
        kb.add_entry(EntityKind::Spell, "Greater Invisibility", "You vanish harder.");
        kb.add_entry(EntityKind::Spell, "Shield", "+5 AC until your next turn.");
        kb.add_entry(EntityKind::Condition, "Frightened", "Disadvantage on checks.");
        kb.add_entry(EntityKind::Npc, "Mara Quill", "A sharp-eyed harbour clerk.");
        kb.add_alias("Scared", "Frightened");
        kb
    }

    fn links(segments: &[Segment]) -> Vec<(&str, &str)> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Link { label, target } => Some((label.as_str(), target.name.as_str())),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn prefers_longest_match() {
        let segs = kb().linkify("She casts Greater Invisibility, then invisibility.");
        assert_eq!(
            links(&segs),
            vec![
                ("Greater Invisibility", "Greater Invisibility"),
                ("invisibility", "Invisibility")
            ]
        );
        let rebuilt: String = segs.iter().map(Segment::as_str).collect();
        assert_eq!(rebuilt, "She casts Greater Invisibility, then invisibility.");
    }

    #[test]
    fn respects_word_boundaries() {
        let segs = kb().linkify("Shielded walls, a Shield_wall, and Shield.");
        assert_eq!(links(&segs), vec![("Shield", "Shield")]);
    }

    #[test]
    fn aliases_resolve_to_canonical_entries() {
        let kb = kb();
        let segs = kb.linkify("The goblin is SCARED of Mara Quill");
        assert_eq!(
            links(&segs),
            vec![("SCARED", "Frightened"), ("Mara Quill", "Mara Quill")]
        );
        assert_eq!(kb.resolve("scared").unwrap().kind, EntityKind::Condition);
        assert_eq!(kb.resolve("mara quill").unwrap().name, "Mara Quill");
    }

    #[test]
    fn unknown_labels_resolve_to_none() {
        let kb = kb();
        assert!(kb.resolve("Mara Quil").is_none());
        assert!(kb.resolve("").is_none());
    }

    #[test]
    fn empty_kb_returns_plain_text() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.linkify("nothing here"), vec![Segment::text("nothing here")]);
        assert!(kb.linkify("").is_empty());
    }

    #[test]
    fn pattern_refreshes_after_new_entries() {
        let mut kb = kb();
        assert!(links(&kb.linkify("Counterspell!")).is_empty());
        kb.add_entry(EntityKind::Spell, "Counterspell", "No.");
        assert_eq!(links(&kb.linkify("Counterspell!")), vec![("Counterspell", "Counterspell")]);
    }

    #[test]
    fn falls_back_to_shorter_name_at_same_start() {
        let mut kb = KnowledgeBase::new();
        kb.add_entry(EntityKind::Spell, "Magic Missile", "Three darts.");
        kb.add_entry(EntityKind::Spell, "Magic", "Raw magic.");
        let segs = kb.linkify("Magic Missiles rain down");
        assert_eq!(links(&segs), vec![("Magic", "Magic")]);
        let rebuilt: String = segs.iter().map(Segment::as_str).collect();
        assert_eq!(rebuilt, "Magic Missiles rain down");

        // the longer name still wins when it ends on a boundary
        assert_eq!(
            links(&kb.linkify("MAGIC MISSILE, then magic.")),
            vec![("MAGIC MISSILE", "Magic Missile"), ("magic", "Magic")]
        );
    }

    #[test]
    fn no_fallback_when_no_shorter_name_fits() {
        let segs = kb().linkify("Greater Invisibilityx and Shields");
        assert!(links(&segs).is_empty());
    }

    #[test]
    fn non_ascii_text_is_handled() {
        let segs = kb().linkify("Über-Shield — Shield über alles");
        assert_eq!(links(&segs), vec![("Shield", "Shield"), ("Shield", "Shield")]);
    }
}
