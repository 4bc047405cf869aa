//! src/location_tree.rs
//!
//! Arena tree over locations, built from each record's `parent` name.
//!
//! Nodes are addressed by [`LocationId`] (index into the arena). Roots and
//! children keep file order. A parent that is unknown, is the location itself,
//! or would close a cycle is ignored and the location becomes a root.

use std::collections::{HashMap, HashSet};

use crate::model::Location;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub usize);

#[derive(Clone, Debug)]
pub struct LocationNode {
    pub location: Location,
    pub parent: Option<LocationId>,
    pub children: Vec<LocationId>,
}

/// One display row of a flattened tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeRow {
    pub id: LocationId,
    pub depth: usize,
}

#[derive(Clone, Debug, Default)]
pub struct LocationTree {
    nodes: Vec<LocationNode>,
    by_name: HashMap<String, LocationId>,
    roots: Vec<LocationId>,
}

impl LocationTree {
    /// Build the tree. `known_npc` filters NPC names that don't exist; duplicate
    /// names within one location collapse. A repeated location name replaces
    /// the earlier record but keeps its position.
    pub fn build(records: Vec<Location>, known_npc: impl Fn(&str) -> bool) -> Self {
        let mut nodes: Vec<LocationNode> = Vec::with_capacity(records.len());
        let mut by_name: HashMap<String, LocationId> = HashMap::new();

        for mut loc in records {
            let mut seen = HashSet::new();
            loc.npcs.retain(|n| {
                if !known_npc(n) {
                    tracing::debug!("Location '{}' lists unknown NPC '{}'", loc.name, n);
                    return false;
                }
                seen.insert(n.clone())
            });

            match by_name.get(&loc.name) {
                Some(&id) => {
                    tracing::warn!("Duplicate location '{}', keeping the later record", loc.name);
                    nodes[id.0].location = loc;
                }
                None => {
                    let id = LocationId(nodes.len());
                    by_name.insert(loc.name.clone(), id);
                    nodes.push(LocationNode {
                        location: loc,
                        parent: None,
                        children: Vec::new(),
                    });
                }
            }
        }

        let mut tree = Self {
            nodes,
            by_name,
            roots: Vec::new(),
        };
        tree.link_parents();
        tree
    }

    fn link_parents(&mut self) {
        for i in 0..self.nodes.len() {
            let id = LocationId(i);
            let Some(parent_name) = self.nodes[i].location.parent.clone() else {
                continue;
            };
            let Some(&parent) = self.by_name.get(&parent_name) else {
                tracing::warn!(
                    "Location '{}' has unknown parent '{}'",
                    self.nodes[i].location.name,
                    parent_name
                );
                continue;
            };
            if self.would_cycle(id, parent) {
                tracing::warn!(
                    "Location '{}' -> '{}' would form a cycle; treating as top-level",
                    self.nodes[i].location.name,
                    parent_name
                );
                continue;
            }
            self.nodes[i].parent = Some(parent);
        }

        // children and roots in file order
        for i in 0..self.nodes.len() {
            match self.nodes[i].parent {
                Some(p) => self.nodes[p.0].children.push(LocationId(i)),
                None => self.roots.push(LocationId(i)),
            }
        }
    }

    /// True if making `parent` the parent of `child` closes a loop.
    fn would_cycle(&self, child: LocationId, parent: LocationId) -> bool {
        let mut cur = Some(parent);
        while let Some(id) = cur {
            if id == child {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: LocationId) -> Option<&LocationNode> {
        self.nodes.get(id.0)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.nodes.get(id.0).map(|n| &n.location)
    }

    pub fn find(&self, name: &str) -> Option<LocationId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (LocationId(i), &n.location))
    }

    pub fn roots(&self) -> &[LocationId] {
        &self.roots
    }

    pub fn children(&self, id: LocationId) -> &[LocationId] {
        self.nodes.get(id.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: LocationId) -> Option<LocationId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Nearest parent first.
    pub fn ancestors(&self, id: LocationId) -> Vec<LocationId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Depth-first, pre-order; excludes `id` itself.
    pub fn descendants(&self, id: LocationId) -> Vec<LocationId> {
        let mut out = Vec::new();
        for &child in self.children(id) {
            out.push(child);
            out.extend(self.descendants(child));
        }
        out
    }

    /// NPCs placed here, followed by NPCs from every descendant, without
    /// duplicates.
    pub fn npcs_with_inheritance(&self, id: LocationId) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let own = self.location(id).into_iter();
        let below = self.descendants(id).into_iter().filter_map(|d| self.location(d));
        for loc in own.chain(below) {
            for npc in &loc.npcs {
                if !out.contains(&npc.as_str()) {
                    out.push(npc.as_str());
                }
            }
        }
        out
    }

    /// Visibility per node for a search query. A node is visible if it matches
    /// or any descendant does. An empty query shows everything.
    pub fn filter(&self, query: &str) -> Vec<bool> {
        let q = query.trim().to_lowercase();
        let mut visible = vec![false; self.nodes.len()];
        for &root in &self.roots {
            self.mark_visible(root, &q, &mut visible);
        }
        visible
    }

    fn mark_visible(&self, id: LocationId, q: &str, visible: &mut [bool]) -> bool {
        let mut any_child = false;
        for &child in self.children(id) {
            any_child |= self.mark_visible(child, q, visible);
        }
        let loc = &self.nodes[id.0].location;
        let hit = q.is_empty() || crate::search::haystack_location(loc).contains(q);
        visible[id.0] = hit || any_child;
        visible[id.0]
    }

    /// Pre-order rows for display. With `visible`, hidden nodes and their
    /// subtrees are skipped.
    pub fn rows(&self, visible: Option<&[bool]>) -> Vec<TreeRow> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.push_rows(root, 0, visible, &mut out);
        }
        out
    }

    fn push_rows(&self, id: LocationId, depth: usize, visible: Option<&[bool]>, out: &mut Vec<TreeRow>) {
        if let Some(v) = visible {
            if !v.get(id.0).copied().unwrap_or(false) {
                return;
            }
        }
        out.push(TreeRow { id, depth });
        for &child in self.children(id) {
            self.push_rows(child, depth + 1, visible, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str, parent: Option<&str>, npcs: &[&str]) -> Location {
        Location {
            name: name.into(),
            description: format!("{} description", name),
            region: None,
            tags: vec![],
            npcs: npcs.iter().map(|s| s.to_string()).collect(),
            parent: parent.map(str::to_string),
        }
    }

    fn world() -> LocationTree {
        LocationTree::build(
            vec![
                loc("Port Virellon", None, &["Harbormaster Vell"]),
                loc("The Salty Hound", Some("Port Virellon"), &["Mara", "Mara", "Ghost"]),
                loc("Cellar", Some("The Salty Hound"), &["Orrin"]),
                loc("Mistwood", None, &[]),
                loc("Old Shrine", Some("Mistwood"), &["Orrin"]),
            ],
            |n| n != "Ghost",
        )
    }

    #[test]
    fn builds_roots_and_children_in_file_order() {
        let t = world();
        let names: Vec<_> = t.roots().iter().map(|&r| t.location(r).unwrap().name.as_str()).collect();
        assert_eq!(names, ["Port Virellon", "Mistwood"]);
        let port = t.find("Port Virellon").unwrap();
        let hound = t.find("The Salty Hound").unwrap();
        assert_eq!(t.children(port), [hound]);
        assert_eq!(t.ancestors(t.find("Cellar").unwrap()), vec![hound, port]);
    }

    #[test]
    fn npcs_are_deduplicated_filtered_and_inherited() {
        let t = world();
        let hound = t.find("The Salty Hound").unwrap();
        assert_eq!(t.location(hound).unwrap().npcs, vec!["Mara".to_string()]);
        let port = t.find("Port Virellon").unwrap();
        assert_eq!(t.npcs_with_inheritance(port), vec!["Harbormaster Vell", "Mara", "Orrin"]);
        let mist = t.find("Mistwood").unwrap();
        assert_eq!(t.npcs_with_inheritance(mist), vec!["Orrin"]);
    }

    #[test]
    fn cycles_and_unknown_parents_become_roots() {
        let t = LocationTree::build(
            vec![
                loc("A", Some("B"), &[]),
                loc("B", Some("A"), &[]),
                loc("C", Some("Nowhere"), &[]),
                loc("D", Some("D"), &[]),
            ],
            |_| true,
        );
        let a = t.find("A").unwrap();
        let b = t.find("B").unwrap();
        assert_eq!(t.parent(a), Some(b));
        assert_eq!(t.parent(b), None);
        assert_eq!(t.roots().len(), 3);
        assert!(t.descendants(b).contains(&a));
    }

    #[test]
    fn filter_keeps_ancestors_of_matches() {
        let t = world();
        let visible = t.filter("cellar");
        let rows: Vec<_> = t
            .rows(Some(&visible))
            .into_iter()
            .map(|r| (t.location(r.id).unwrap().name.clone(), r.depth))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Port Virellon".to_string(), 0),
                ("The Salty Hound".to_string(), 1),
                ("Cellar".to_string(), 2),
            ]
        );
        assert_eq!(t.rows(Some(&t.filter("  "))).len(), t.len());
        assert!(t.rows(Some(&t.filter("dragon"))).is_empty());
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let t = LocationTree::build(vec![loc("A", None, &[]), loc("B", None, &[]), loc("A", None, &["x"])], |_| true);
        assert_eq!(t.len(), 2);
        assert_eq!(t.location(LocationId(0)).unwrap().npcs, vec!["x".to_string()]);
    }
}
