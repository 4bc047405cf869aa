//! src/app.rs
//!
//! Application state, key handling and the UI main loop.
//!
//! # Screens
//!
//! The main view is always at the bottom: the location tree on the left (with
//! a search box) and the NPCs of the selected location on the right. Browse
//! lists, detail views and error views are pushed on top of it; `Esc` pops.
//!
//! # Keyboard Controls
//!
//! - **1–6** open the browse views: NPCs, Locations, Spells, Items,
//!   Conditions, Class Actions.
//! - **/** focuses the search box of the main or browse view. `Enter` keeps
//!   the query, `Esc` clears it.
//! - **R** reloads every file from disk.
//! - **q** quits from the main view.
//!
//! Main view: **Tab** switches between the tree and the NPC list, **↑/↓**
//! move, **Enter** opens the selection, **+** adds a location inside the
//! selected one.
//!
//! Browse views: **+** adds an entry of that kind.
//!
//! Detail views: **Tab / Shift-Tab** cycle links and scroll the selected one
//! into view, **Enter** follows the selected link, **↑/↓ PgUp/PgDn** scroll,
//! **e** edits the entry.
//! - NPC: **n** edits campaign notes, **k** toggles alive/deceased, **D**
//!   deletes (confirm with **y**).
//! - Location: **a** assigns an NPC from a searchable picker, **r** removes
//!   the selected NPC link from the location.
//!
//! Add/edit forms: **Tab / ↑↓** move between fields, **Enter** saves, **Esc**
//! cancels. A rejected form stays open with the reason in the status line.
//!
//! Every edit is written straight to the JSON files, after which the repo and
//! knowledge base are reloaded and open views rebuilt. Views whose entity no
//! longer exists are closed.

use std::cell::Cell;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction};
use ratatui::{DefaultTerminal, Frame};

use crate::config::Config;
use crate::detail::DetailView;
use crate::edit;
use crate::error::Result;
use crate::form::EntryForm;
use crate::knowledge::KnowledgeBase;
use crate::location_tree::{LocationId, TreeRow};
use crate::model::{EntityKind, EntityRef};
use crate::panels::{
    DetailPanel, FormPanel, HoverPanel, InputPanel, ListPanel, ListRow, LocationTreePanel,
    ParagraphPanel, TitlePanel,
};
use crate::repo::Repo;
use crate::search::{self, Searchable};
use crate::ui::{Node, group, leaf, overlay};

const FRAME_TIME: Duration = Duration::from_millis(100);
const PAGE: u16 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainFocus {
    Tree,
    Npcs,
}

#[derive(Debug)]
pub enum Screen {
    Browse {
        kind: EntityKind,
        query: String,
        selected: usize,
    },
    Detail {
        view: DetailView,
        selected_link: Option<usize>,
        scroll: u16,
    },
    Error {
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the search box of the top screen.
    Search,
    Notes {
        npc: String,
        buffer: String,
    },
    ConfirmDelete {
        npc: String,
    },
    NpcPicker {
        location: String,
        query: String,
        selected: usize,
    },
    Form(EntryForm),
}

pub struct App {
    pub config: Config,
    pub repo: Repo,
    pub kb: KnowledgeBase,
    /// Screens above the main view, last is on top.
    pub stack: Vec<Screen>,
    pub mode: InputMode,
    pub status: String,
    pub tree_query: String,
    pub tree_selected: usize,
    pub npc_selected: usize,
    pub focus: MainFocus,
    pub running: bool,
    /// Text area of the detail panel as last drawn.
    pub detail_viewport: Cell<(u16, u16)>,
}

fn step(selected: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *selected = 0;
    } else if down {
        *selected = (*selected + 1).min(len - 1);
    } else {
        *selected = selected.saturating_sub(1);
    }
}

/// Smallest change to `scroll` that keeps `row` inside a `height`-row window.
fn scroll_to(scroll: u16, row: usize, height: u16) -> u16 {
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    if row < scroll {
        row
    } else if height > 0 && row >= scroll.saturating_add(height) {
        row - height + 1
    } else {
        scroll
    }
}

fn clamp(selected: &mut usize, len: usize) {
    if *selected >= len {
        *selected = len.saturating_sub(1);
    }
}

fn rows_of<'a, T, I>(entries: I, query: &str) -> Vec<ListRow<'a>>
where
    T: Searchable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    search::filter_sorted(entries, query)
        .into_iter()
        .map(|e| ListRow {
            name: e.name(),
            subtitle: e.subtitle(),
        })
        .collect()
}

impl App {
    /// Build the app and load the campaign. Load failures don't abort: they
    /// become the status line and an error view over an empty repo.
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            repo: Repo::empty(config.data_dir.clone()),
            kb: KnowledgeBase::new(),
            config,
            stack: Vec::new(),
            mode: InputMode::Normal,
            status: String::new(),
            tree_query: String::new(),
            tree_selected: 0,
            npc_selected: 0,
            focus: MainFocus::Tree,
            running: true,
            detail_viewport: Cell::new((80, 20)),
        };
        app.load();
        app
    }

    /// (Re)load the repo and knowledge base. Returns false on failure.
    pub fn load(&mut self) -> bool {
        let ok = match self.repo.reload() {
            Ok(repo) => {
                self.kb = KnowledgeBase::from_repo(&repo);
                self.repo = repo;
                self.status = format!(
                    "Loaded {} NPCs, {} locations, {} spells, {} items from {}",
                    self.repo.npcs.len(),
                    self.repo.locations.len(),
                    self.repo.spells.len(),
                    self.repo.items.len(),
                    self.config.data_dir.display()
                );
                true
            }
            Err(e) => {
                tracing::error!("Load failed: {}", e);
                self.status = format!("Load failed: {}", e);
                // a retry that fails again replaces the error view on top
                match self.stack.last_mut() {
                    Some(Screen::Error { message }) => *message = e.to_string(),
                    _ => self.stack.push(Screen::Error {
                        message: e.to_string(),
                    }),
                }
                false
            }
        };
        self.refresh();
        ok
    }

    /// Rebuild open detail views from the current repo, closing the ones whose
    /// entity is gone, and clamp every selection.
    fn refresh(&mut self) {
        let repo = &self.repo;
        let kb = &self.kb;
        let config = &self.config;
        self.stack.retain_mut(|screen| match screen {
            Screen::Detail {
                view,
                selected_link,
                ..
            } => match DetailView::build(repo, kb, config, &view.target) {
                Some(fresh) => {
                    let n = fresh.links().len();
                    *selected_link = selected_link.filter(|&i| i < n);
                    *view = fresh;
                    true
                }
                None => {
                    tracing::info!("Closing view of {} {}", view.target.kind, view.target.name);
                    false
                }
            },
            _ => true,
        });

        let lens: Vec<Option<usize>> = self
            .stack
            .iter()
            .map(|s| match s {
                Screen::Browse { kind, query, .. } => Some(self.browse_rows(*kind, query).len()),
                _ => None,
            })
            .collect();
        for (screen, len) in self.stack.iter_mut().zip(lens) {
            if let (Screen::Browse { selected, .. }, Some(len)) = (screen, len) {
                clamp(selected, len);
            }
        }

        let tree_len = self.tree_rows().len();
        clamp(&mut self.tree_selected, tree_len);
        let npc_len = self.main_npcs().len();
        clamp(&mut self.npc_selected, npc_len);
    }

    // ---- derived state ----

    pub fn tree_rows(&self) -> Vec<TreeRow> {
        let tree = &self.repo.locations;
        if self.tree_query.trim().is_empty() {
            tree.rows(None)
        } else {
            let visible = tree.filter(&self.tree_query);
            tree.rows(Some(&visible))
        }
    }

    pub fn selected_location(&self) -> Option<LocationId> {
        self.tree_rows().get(self.tree_selected).map(|r| r.id)
    }

    /// NPCs of the selected location, including those of places within it.
    pub fn main_npcs(&self) -> Vec<&str> {
        self.selected_location()
            .map(|id| self.repo.locations.npcs_with_inheritance(id))
            .unwrap_or_default()
    }

    pub fn browse_rows(&self, kind: EntityKind, query: &str) -> Vec<ListRow<'_>> {
        let repo = &self.repo;
        match kind {
            EntityKind::Npc => rows_of(&repo.npcs, query),
            EntityKind::Location => rows_of(repo.locations.iter().map(|(_, l)| l), query),
            EntityKind::Spell => rows_of(&repo.spells, query),
            EntityKind::Item => rows_of(&repo.items, query),
            EntityKind::Condition => rows_of(&repo.conditions, query),
            EntityKind::ClassAction => rows_of(&repo.class_actions, query),
        }
    }

    /// `(heading, description)` for the link under the cursor.
    pub fn hover(&self) -> Option<(String, &str)> {
        let Some(Screen::Detail {
            view,
            selected_link: Some(i),
            ..
        }) = self.stack.last()
        else {
            return None;
        };
        let (_, target) = view.links().get(*i).copied()?;
        if target.kind == EntityKind::Location {
            let (_, loc) = self.repo.location(&target.name)?;
            return Some((format!("{} — {}", target.kind, loc.name), loc.description.as_str()));
        }
        let entry = self.kb.resolve(&target.name)?;
        Some((
            format!("{} — {}", entry.kind, entry.name),
            entry.hover_description.as_str(),
        ))
    }

    // ---- navigation ----

    /// Push the detail view for `target`, or report that it no longer exists.
    pub fn open(&mut self, target: EntityRef) {
        match DetailView::build(&self.repo, &self.kb, &self.config, &target) {
            Some(view) => {
                tracing::debug!("Opening {} {}", target.kind, target.name);
                self.stack.push(Screen::Detail {
                    view,
                    selected_link: None,
                    scroll: 0,
                });
            }
            None => {
                tracing::warn!("Dangling link to {} {}", target.kind, target.name);
                self.status = format!("{} \"{}\" no longer exists", target.kind, target.name);
            }
        }
    }

    pub fn open_browse(&mut self, kind: EntityKind) {
        let fresh = Screen::Browse {
            kind,
            query: String::new(),
            selected: 0,
        };
        match self.stack.last_mut() {
            Some(top @ Screen::Browse { .. }) => *top = fresh,
            _ => self.stack.push(fresh),
        }
    }

    fn active_query(&mut self) -> Option<(&mut String, &mut usize)> {
        match self.stack.last_mut() {
            None => Some((&mut self.tree_query, &mut self.tree_selected)),
            Some(Screen::Browse {
                query, selected, ..
            }) => Some((query, selected)),
            Some(_) => None,
        }
    }

    fn active_len(&self) -> usize {
        match self.stack.last() {
            None => self.tree_rows().len(),
            Some(Screen::Browse { kind, query, .. }) => self.browse_rows(*kind, query).len(),
            Some(_) => 0,
        }
    }

    // ---- edits ----

    fn apply_edit(&mut self, result: Result<()>, done: String) {
        match result {
            Ok(()) => {
                if self.load() {
                    self.status = done;
                }
            }
            Err(e) => {
                tracing::error!("Edit failed: {}", e);
                self.status = format!("Save failed: {}", e);
            }
        }
    }

    fn toggle_alive(&mut self, name: &str) {
        let Some(npc) = self.repo.npc(name) else {
            return;
        };
        let alive = !npc.alive;
        let result = edit::set_npc_alive(&self.repo.data_dir, name, alive);
        let label = if alive { "alive" } else { "deceased" };
        self.apply_edit(result, format!("{} marked {}", name, label));
    }

    fn assign_npc(&mut self, location: &str, query: &str, selected: usize) {
        let Some(name) = rows_of(&self.repo.npcs, query)
            .get(selected)
            .map(|r| r.name.to_string())
        else {
            self.status = "No NPC selected".into();
            return;
        };
        let Some((_, loc)) = self.repo.location(location) else {
            self.status = format!("Location \"{}\" no longer exists", location);
            return;
        };
        if loc.npcs.contains(&name) {
            self.status = format!("{} is already at {}", name, location);
            return;
        }
        let mut npcs = loc.npcs.clone();
        npcs.push(name.clone());
        let result = edit::set_location_npcs(&self.repo.data_dir, location, &npcs);
        self.apply_edit(result, format!("Assigned {} to {}", name, location));
    }

    /// Validate and write the form. A rejected form stays open.
    fn save_form(&mut self) {
        let InputMode::Form(form) = &self.mode else {
            return;
        };
        let form = form.clone();
        let saved = form.to_record(&self.repo).and_then(|record| {
            let name = record
                .get("name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            let data_dir = &self.repo.data_dir;
            edit::save_record(data_dir, form.kind, form.original.as_deref(), record)?;
            if let Some(original) = &form.original {
                edit::rename_references(data_dir, form.kind, original, &name)?;
            }
            Ok(name)
        });
        match saved {
            Ok(name) => {
                self.mode = InputMode::Normal;
                if let Some(original) = &form.original {
                    // keep open views of a renamed entry
                    for screen in &mut self.stack {
                        if let Screen::Detail { view, .. } = screen {
                            if view.target.kind == form.kind && &view.target.name == original {
                                view.target.name = name.clone();
                            }
                        }
                    }
                }
                let verb = if form.original.is_some() { "Saved" } else { "Added" };
                self.apply_edit(Ok(()), format!("{} {} {}", verb, form.kind, name));
            }
            Err(e) => {
                tracing::warn!("Form rejected: {}", e);
                self.status = format!("Not saved: {}", e);
            }
        }
    }

    fn remove_npc(&mut self, location: &str, npc: &str) {
        let Some((_, loc)) = self.repo.location(location) else {
            return;
        };
        if !loc.npcs.iter().any(|n| n == npc) {
            self.status = format!(
                "{} is inherited from a place within {}; remove them there",
                npc, location
            );
            return;
        }
        let npcs: Vec<String> = loc.npcs.iter().filter(|n| *n != npc).cloned().collect();
        let result = edit::set_location_npcs(&self.repo.data_dir, location, &npcs);
        self.apply_edit(result, format!("Removed {} from {}", npc, location));
    }

    // ---- keys ----

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match &self.mode {
            InputMode::Normal => self.normal_key(key),
            InputMode::Search => self.search_key(key),
            InputMode::Notes { .. } => self.notes_key(key),
            InputMode::ConfirmDelete { .. } => self.confirm_key(key),
            InputMode::NpcPicker { .. } => self.picker_key(key),
            InputMode::Form(_) => self.form_key(key),
        }
    }

    fn normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c @ '1'..='6') => {
                let kind = EntityKind::ALL[(c as u8 - b'1') as usize];
                self.open_browse(kind);
                return;
            }
            KeyCode::Char('R') => {
                if self.load() {
                    self.status = "Reloaded from disk".into();
                }
                return;
            }
            _ => {}
        }
        match self.stack.last() {
            None => self.main_key(key),
            Some(Screen::Browse { .. }) => self.browse_key(key),
            Some(Screen::Detail { .. }) => self.detail_key(key),
            Some(Screen::Error { .. }) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    self.stack.pop();
                }
            }
        }
    }

    fn main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('/') => {
                self.focus = MainFocus::Tree;
                self.mode = InputMode::Search;
            }
            KeyCode::Char('+') => {
                let parent = self
                    .selected_location()
                    .and_then(|id| self.repo.locations.location(id))
                    .map(|l| l.name.clone())
                    .unwrap_or_default();
                self.mode = InputMode::Form(EntryForm::new_location_in(&parent));
            }
            KeyCode::Esc => {
                self.tree_query.clear();
                self.refresh();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    MainFocus::Tree => MainFocus::Npcs,
                    MainFocus::Npcs => MainFocus::Tree,
                };
            }
            KeyCode::Up | KeyCode::Down => {
                let down = key.code == KeyCode::Down;
                match self.focus {
                    MainFocus::Tree => {
                        let len = self.tree_rows().len();
                        step(&mut self.tree_selected, len, down);
                        self.npc_selected = 0;
                    }
                    MainFocus::Npcs => {
                        let len = self.main_npcs().len();
                        step(&mut self.npc_selected, len, down);
                    }
                }
            }
            KeyCode::Enter => {
                let target = match self.focus {
                    MainFocus::Tree => self
                        .selected_location()
                        .and_then(|id| self.repo.locations.location(id))
                        .map(|l| EntityRef::new(EntityKind::Location, &l.name)),
                    MainFocus::Npcs => self
                        .main_npcs()
                        .get(self.npc_selected)
                        .map(|n| EntityRef::new(EntityKind::Npc, *n)),
                };
                if let Some(target) = target {
                    self.open(target);
                }
            }
            _ => {}
        }
    }

    fn browse_key(&mut self, key: KeyEvent) {
        let Some(Screen::Browse {
            kind,
            query,
            selected,
        }) = self.stack.last()
        else {
            return;
        };
        let kind = *kind;
        let (len, current) = {
            let rows = self.browse_rows(kind, query);
            (rows.len(), rows.get(*selected).map(|r| r.name.to_string()))
        };

        match key.code {
            KeyCode::Esc => {
                self.stack.pop();
            }
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('+') => self.mode = InputMode::Form(EntryForm::new(kind)),
            KeyCode::Up | KeyCode::Down => {
                if let Some((_, selected)) = self.active_query() {
                    step(selected, len, key.code == KeyCode::Down);
                }
            }
            KeyCode::Enter => {
                if let Some(name) = current {
                    self.open(EntityRef::new(kind, name));
                }
            }
            _ => {}
        }
    }

    fn search_key(&mut self, key: KeyEvent) {
        let len = self.active_len();
        let Some((query, selected)) = self.active_query() else {
            self.mode = InputMode::Normal;
            return;
        };
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                query.clear();
                *selected = 0;
                self.mode = InputMode::Normal;
            }
            KeyCode::Up => step(selected, len, false),
            KeyCode::Down => step(selected, len, true),
            KeyCode::Backspace => {
                query.pop();
                *selected = 0;
            }
            KeyCode::Char(c) => {
                query.push(c);
                *selected = 0;
            }
            _ => {}
        }
        self.npc_selected = 0;
    }

    fn detail_key(&mut self, key: KeyEvent) {
        let Some(Screen::Detail {
            view,
            selected_link,
            ..
        }) = self.stack.last()
        else {
            return;
        };
        let target = view.target.clone();
        let links: Vec<EntityRef> = view.links().into_iter().map(|(_, t)| t.clone()).collect();
        let link = selected_link.and_then(|i| links.get(i).cloned());

        match key.code {
            KeyCode::Esc => {
                self.stack.pop();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if links.is_empty() {
                    self.status = "No links in this view".into();
                    return;
                }
                let n = links.len();
                let forward = key.code == KeyCode::Tab;
                let (width, height) = self.detail_viewport.get();
                if let Some(Screen::Detail {
                    view,
                    selected_link,
                    scroll,
                }) = self.stack.last_mut()
                {
                    *selected_link = Some(match (*selected_link, forward) {
                        (Some(i), true) => (i + 1) % n,
                        (Some(i), false) => (i + n - 1) % n,
                        (None, true) => 0,
                        (None, false) => n - 1,
                    });
                    if let Some(row) = DetailPanel::new(view, *selected_link, *scroll).selected_row(width) {
                        *scroll = scroll_to(*scroll, row, height);
                    }
                }
            }
            KeyCode::Enter => match link {
                Some(link) => self.open(link),
                None => self.status = "Tab to select a link first".into(),
            },
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => {
                if let Some(Screen::Detail { scroll, .. }) = self.stack.last_mut() {
                    *scroll = match key.code {
                        KeyCode::Up => scroll.saturating_sub(1),
                        KeyCode::Down => scroll.saturating_add(1),
                        KeyCode::PageUp => scroll.saturating_sub(PAGE),
                        _ => scroll.saturating_add(PAGE),
                    };
                }
            }
            KeyCode::Char('n') if target.kind == EntityKind::Npc => {
                let buffer = self
                    .repo
                    .npc(&target.name)
                    .map(|n| n.campaign_notes.clone())
                    .unwrap_or_default();
                self.mode = InputMode::Notes {
                    npc: target.name,
                    buffer,
                };
            }
            KeyCode::Char('e') => match EntryForm::edit(&self.repo, &target) {
                Some(form) => self.mode = InputMode::Form(form),
                None => self.status = format!("{} \"{}\" no longer exists", target.kind, target.name),
            },
            KeyCode::Char('k') if target.kind == EntityKind::Npc => self.toggle_alive(&target.name),
            KeyCode::Char('D') if target.kind == EntityKind::Npc => {
                self.mode = InputMode::ConfirmDelete { npc: target.name };
            }
            KeyCode::Char('a') if target.kind == EntityKind::Location => {
                self.mode = InputMode::NpcPicker {
                    location: target.name,
                    query: String::new(),
                    selected: 0,
                };
            }
            KeyCode::Char('r') if target.kind == EntityKind::Location => match link {
                Some(link) if link.kind == EntityKind::Npc => {
                    self.remove_npc(&target.name, &link.name)
                }
                _ => self.status = "Tab to an NPC first".into(),
            },
            _ => {}
        }
    }

    fn notes_key(&mut self, key: KeyEvent) {
        let InputMode::Notes { npc, buffer } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.status = "Notes unchanged".into();
            }
            KeyCode::Enter => {
                let (npc, notes) = (npc.clone(), buffer.clone());
                self.mode = InputMode::Normal;
                let result = edit::set_npc_campaign_notes(&self.repo.data_dir, &npc, &notes);
                self.apply_edit(result, format!("Saved notes for {}", npc));
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    fn confirm_key(&mut self, key: KeyEvent) {
        let InputMode::ConfirmDelete { npc } = std::mem::replace(&mut self.mode, InputMode::Normal)
        else {
            return;
        };
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let result = edit::delete_npc(&self.repo.data_dir, &npc);
            self.apply_edit(result, format!("Deleted {}", npc));
        } else {
            self.status = format!("Kept {}", npc);
        }
    }

    fn picker_key(&mut self, key: KeyEvent) {
        let InputMode::NpcPicker {
            location,
            query,
            selected,
        } = &mut self.mode
        else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Up => *selected = selected.saturating_sub(1),
            KeyCode::Down => *selected += 1,
            KeyCode::Backspace => {
                query.pop();
                *selected = 0;
            }
            KeyCode::Char(c) => {
                query.push(c);
                *selected = 0;
            }
            KeyCode::Enter => {
                let (location, query, selected) = (location.clone(), query.clone(), *selected);
                self.mode = InputMode::Normal;
                self.assign_npc(&location, &query, selected);
            }
            _ => {}
        }
        // keep the cursor on a real row
        let len = match &self.mode {
            InputMode::NpcPicker { query, .. } => rows_of(&self.repo.npcs, query).len(),
            _ => return,
        };
        if let InputMode::NpcPicker { selected, .. } = &mut self.mode {
            clamp(selected, len);
        }
    }

    fn form_key(&mut self, key: KeyEvent) {
        let InputMode::Form(form) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.status = "Nothing saved".into();
            }
            KeyCode::Enter => self.save_form(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.pop(),
            KeyCode::Char(c) => form.push(c),
            _ => {}
        }
    }

    // ---- rendering ----

    fn breadcrumb(&self) -> String {
        let mut parts = vec!["Locations".to_string()];
        for s in &self.stack {
            parts.push(match s {
                Screen::Browse { kind, .. } => kind.plural().to_string(),
                Screen::Detail { view, .. } => view.title.clone(),
                Screen::Error { .. } => "Error".to_string(),
            });
        }
        parts.join(" › ")
    }

    fn hints(&self) -> &'static str {
        match (&self.mode, self.stack.last()) {
            (InputMode::Search, _) => "type to filter  ↑↓ move  Enter keep  Esc clear",
            (InputMode::Notes { .. }, _) => "Enter save  Esc cancel",
            (InputMode::ConfirmDelete { .. }, _) => "y delete  any other key cancels",
            (InputMode::NpcPicker { .. }, _) => "type to filter  ↑↓ move  Enter assign  Esc cancel",
            (InputMode::Form(_), _) => "Tab/↑↓ field  type to edit  Enter save  Esc cancel",
            (_, None) => "/ search  Tab focus  Enter open  + add  1-6 browse  R reload  q quit",
            (_, Some(Screen::Browse { .. })) => "/ search  ↑↓ move  Enter open  + add  Esc back",
            (_, Some(Screen::Detail { view, .. })) => match view.target.kind {
                EntityKind::Npc => "Tab links  Enter follow  e edit  n notes  k alive  D delete  Esc back",
                EntityKind::Location => "Tab links  Enter follow  e edit  a assign NPC  r remove NPC  Esc back",
                _ => "Tab links  Enter follow  ↑↓ scroll  e edit  Esc back",
            },
            (_, Some(Screen::Error { .. })) => "Esc close  R retry",
        }
    }

    fn main_body<'a>(&'a self, rows: &'a [TreeRow]) -> Node<'a> {
        let searching = self.mode == InputMode::Search;
        let selected = (!rows.is_empty()).then_some(self.tree_selected);
        let npc_rows: Vec<ListRow> = self
            .main_npcs()
            .into_iter()
            .filter_map(|n| self.repo.npc(n))
            .map(|npc| ListRow {
                name: &npc.name,
                subtitle: npc.subtitle(),
            })
            .collect();
        let npc_title = match self.selected_location().and_then(|id| self.repo.locations.location(id)) {
            Some(loc) => format!("NPCs at {}", loc.name),
            None => "NPCs".to_string(),
        };
        group(
            Direction::Horizontal,
            vec![Constraint::Percentage(62), Constraint::Percentage(38)],
            vec![
                group(
                    Direction::Vertical,
                    vec![Constraint::Length(3), Constraint::Min(3)],
                    vec![
                        leaf(InputPanel::new("Search", &self.tree_query, "/ to search locations", searching)),
                        leaf(LocationTreePanel::new(
                            &self.repo.locations,
                            rows,
                            selected,
                            self.focus == MainFocus::Tree,
                        )),
                    ],
                ),
                leaf(
                    ListPanel::new(npc_title, npc_rows, Some(self.npc_selected), self.focus == MainFocus::Npcs)
                        .empty_text("No NPCs here."),
                ),
            ],
        )
    }

    fn browse_body<'a>(&'a self, kind: EntityKind, query: &'a str, selected: usize) -> Node<'a> {
        let rows = self.browse_rows(kind, query);
        let title = format!("{} ({})", kind.plural(), rows.len());
        group(
            Direction::Vertical,
            vec![Constraint::Length(3), Constraint::Min(3)],
            vec![
                leaf(InputPanel::new("Search", query, "/ to search", self.mode == InputMode::Search)),
                leaf(ListPanel::new(title, rows, Some(selected), true)),
            ],
        )
    }

    fn modal<'a>(&'a self, base: Node<'a>) -> Node<'a> {
        match &self.mode {
            InputMode::Notes { npc, buffer } => overlay(
                base,
                leaf(InputPanel::new(npc.as_str(), buffer, "", true)),
                70,
                40,
            ),
            InputMode::ConfirmDelete { npc } => overlay(
                base,
                leaf(ParagraphPanel::error(
                    format!("Permanently delete {}? Press y to confirm.", npc),
                    "Delete NPC",
                )),
                50,
                20,
            ),
            InputMode::NpcPicker {
                location,
                query,
                selected,
            } => overlay(
                base,
                group(
                    Direction::Vertical,
                    vec![Constraint::Length(3), Constraint::Min(3)],
                    vec![
                        leaf(InputPanel::new("Find NPC", query, "", true)),
                        leaf(ListPanel::new(
                            format!("Assign to {}", location),
                            rows_of(&self.repo.npcs, query),
                            Some(*selected),
                            true,
                        )),
                    ],
                ),
                60,
                60,
            ),
            InputMode::Form(form) => overlay(base, leaf(FormPanel::new(form)), 70, 80),
            _ => base,
        }
    }

    pub fn draw(&self, f: &mut Frame<'_>) {
        let tree_rows = self.tree_rows();
        let breadcrumb = self.breadcrumb();
        let counts = format!(
            "{} NPCs · {} locations · {} linkable names",
            self.repo.npcs.len(),
            self.repo.locations.len(),
            self.kb.len()
        );

        let body = match self.stack.last() {
            None => self.main_body(&tree_rows),
            Some(Screen::Browse {
                kind,
                query,
                selected,
            }) => self.browse_body(*kind, query, *selected),
            Some(Screen::Detail {
                view,
                selected_link,
                scroll,
            }) => group(
                Direction::Horizontal,
                vec![Constraint::Percentage(65), Constraint::Percentage(35)],
                vec![
                    leaf(DetailPanel::new(view, *selected_link, *scroll).viewport(&self.detail_viewport)),
                    leaf(HoverPanel::new(self.hover())),
                ],
            ),
            Some(Screen::Error { message }) => leaf(ParagraphPanel::error(message.as_str(), "Error")),
        };

        let root = group(
            Direction::Vertical,
            vec![
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ],
            vec![
                leaf(TitlePanel::new(&breadcrumb, counts)),
                self.modal(body),
                leaf(ParagraphPanel::new(self.status.as_str(), self.hints())),
            ],
        );
        root.draw(f, f.area());
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();
            terminal.draw(|f| self.draw(f))?;

            let timeout = FRAME_TIME.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                // drain everything queued so held keys don't lag behind
                loop {
                    if let Event::Key(key) = event::read()? {
                        self.handle_key(key);
                    }
                    if !self.running || !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Load the campaign and run the UI until the user quits. The terminal is
/// restored even when the loop fails.
pub fn run(config: Config) -> io::Result<()> {
    let mut app = App::new(config);
    let mut terminal = ratatui::init();
    let result = app.event_loop(&mut terminal);
    ratatui::restore();
    tracing::info!("UI closed");
    result
}
