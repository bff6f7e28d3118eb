//! Application state: the merged model, the user's mode state, and
//! the engine output currently on screen.

mod actions;
mod filter;
mod merge;
mod navigation;

pub use filter::FilterKeyResult;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::agent::AgentSession;
use crate::config::Config;
use crate::enrich::{NoteCounts, PlanStats};
use crate::git::GitStatus;
use crate::keymap::{KeyBindingStore, KeyMapBackend};
use crate::persist::SessionizerState;
use crate::picker::{filter_projects, PickerInput};
use crate::project::{normalize_path, Project, ProjectKind};

/// Where the displayed list is in its cold-start lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing shown yet, no fetch fired
    Idle,
    /// Cached snapshot shown provisionally, first real scan running
    Loading,
    /// At least one real discovery result applied
    Ready,
}

/// State for tracking multi-key chord sequences ("dd" to kill)
#[derive(Debug, Clone, Default)]
pub enum ChordState {
    #[default]
    None,
    /// First 'd' pressed, waiting for the second
    DeletePending { started_at: Instant },
}

/// Chord state timeout duration (500ms)
const CHORD_TIMEOUT_MS: u64 = 500;

impl ChordState {
    pub fn is_expired(&self) -> bool {
        match self {
            ChordState::None => false,
            ChordState::DeletePending { started_at } => {
                started_at.elapsed().as_millis() as u64 > CHORD_TIMEOUT_MS
            }
        }
    }

    /// Pending key text for UI feedback
    pub fn pending_display(&self) -> Option<&'static str> {
        match self {
            ChordState::None => None,
            ChordState::DeletePending { .. } => Some("d"),
        }
    }
}

/// Transient one-line feedback (yank confirmation, errors).
#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub at: Instant,
}

/// Application state
pub struct App<B: KeyMapBackend> {
    pub config: Config,
    pub state: SessionizerState,

    /// Discovered projects, in discovery order
    pub projects: Vec<Project>,
    /// Synthesized rows for agents running outside any discovered project
    agent_rows: Vec<Project>,
    /// `projects` plus `agent_rows`; the engine input
    combined: Vec<Project>,

    pub git: HashMap<PathBuf, GitStatus>,
    pub running: HashSet<String>,
    pub agents: HashMap<PathBuf, AgentSession>,
    pub notes: HashMap<PathBuf, NoteCounts>,
    pub plans: HashMap<PathBuf, PlanStats>,
    pub keymap: KeyBindingStore<B>,

    /// Filter query text
    pub query: String,
    /// Cursor within the query, insert-mode editing
    pub query_cursor: usize,
    /// Whether the filter input is in insert mode
    pub filter_active: bool,
    /// Ecosystem-picker sub-mode
    pub ecosystem_picker: bool,
    /// Show only dirty projects (session-local, not persisted)
    pub filter_dirty: bool,
    /// Waiting for the key of an `m<key>` assignment
    pub pending_assign: bool,
    pub chord: ChordState,

    /// Current engine output, displayed verbatim
    pub list: Vec<Project>,
    pub cursor: usize,
    pub phase: ListPhase,
    /// Bumped on every visible change; the draw loop skips redraws
    /// when it has not moved
    pub version: u64,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub flash: Option<Flash>,

    #[cfg(test)]
    pub(crate) cache_writes: usize,
}

impl<B: KeyMapBackend> App<B> {
    pub fn new(config: Config, state: SessionizerState, keymap: KeyBindingStore<B>) -> Self {
        let mut app = Self {
            config,
            state,
            projects: Vec::new(),
            agent_rows: Vec::new(),
            combined: Vec::new(),
            git: HashMap::new(),
            running: HashSet::new(),
            agents: HashMap::new(),
            notes: HashMap::new(),
            plans: HashMap::new(),
            keymap,
            query: String::new(),
            query_cursor: 0,
            filter_active: false,
            ecosystem_picker: false,
            filter_dirty: false,
            pending_assign: false,
            chord: ChordState::None,
            list: Vec::new(),
            cursor: 0,
            phase: ListPhase::Idle,
            version: 0,
            spinner_frame: 0,
            should_quit: false,
            flash: None,
            #[cfg(test)]
            cache_writes: 0,
        };
        app.recompute();
        app
    }

    /// Seed the list from the cached snapshot while the first real
    /// scan runs.
    pub fn seed_from_cache(&mut self, cached: Vec<Project>) {
        if cached.is_empty() {
            return;
        }
        self.projects = cached;
        self.phase = ListPhase::Loading;
        self.rebuild_combined();
        self.recompute();
    }

    /// Currently selected project, if the list is non-empty.
    pub fn selected(&self) -> Option<&Project> {
        self.list.get(self.cursor)
    }

    /// Paths the per-path enrichment fetches enumerate over.
    pub fn project_paths(&self) -> Vec<PathBuf> {
        self.combined.iter().map(|p| p.path.clone()).collect()
    }

    /// Re-run the engine and restore the cursor onto the previously
    /// selected project, clamping when it is gone.
    pub fn recompute(&mut self) {
        let previous = self.selected().map(|p| p.path.clone());
        self.list = filter_projects(&PickerInput {
            projects: &self.combined,
            query: &self.query,
            ecosystem_picker: self.ecosystem_picker,
            focused_path: self.state.focused_path.as_deref(),
            filter_dirty: self.filter_dirty,
            worktrees_folded: self.state.worktrees_folded,
            running: &self.running,
            git: &self.git,
        });
        self.restore_cursor(previous.as_deref());
        self.version += 1;
    }

    /// Drop expired transient state; returns true if a redraw is due.
    pub fn tick_transients(&mut self) -> bool {
        let mut changed = false;
        if self.chord.is_expired() {
            self.chord = ChordState::None;
            changed = true;
        }
        if let Some(flash) = &self.flash {
            if flash.at.elapsed().as_secs() >= 2 {
                self.flash = None;
                changed = true;
            }
        }
        if changed {
            self.version += 1;
        }
        changed
    }

    pub fn flash(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            at: Instant::now(),
        });
        self.version += 1;
    }

    /// Rebuild the engine input from discovered projects plus one
    /// synthesized row per agent running outside every known project.
    fn rebuild_combined(&mut self) {
        let known: HashSet<&PathBuf> = self.projects.iter().map(|p| &p.path).collect();
        self.agent_rows = self
            .agents
            .keys()
            .filter(|path| !known.contains(path))
            .map(|path| agent_row(path))
            .collect();
        self.agent_rows.sort_by(|a, b| a.path.cmp(&b.path));
        self.combined = self
            .projects
            .iter()
            .chain(self.agent_rows.iter())
            .cloned()
            .collect();
    }
}

fn agent_row(path: &Path) -> Project {
    let normalized = normalize_path(path);
    Project {
        name: normalized
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| normalized.display().to_string()),
        path: normalized,
        kind: ProjectKind::Standalone,
        parent_path: None,
        parent_ecosystem_path: None,
        worktree_name: None,
    }
}


#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::test_support::app;
    use super::*;

    fn project(path: &str) -> Project {
        Project {
            path: PathBuf::from(path),
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            kind: ProjectKind::Standalone,
            parent_path: None,
            parent_ecosystem_path: None,
            worktree_name: None,
        }
    }

    #[test]
    fn seed_from_cache_enters_loading_phase() {
        let mut app = app();
        app.seed_from_cache(vec![project("/w/app")]);
        assert_eq!(app.phase, ListPhase::Loading);
        assert_eq!(app.list.len(), 1);
    }

    #[test]
    fn seed_with_empty_cache_stays_idle() {
        let mut app = app();
        app.seed_from_cache(Vec::new());
        assert_eq!(app.phase, ListPhase::Idle);
    }

    #[test]
    fn recompute_bumps_the_version() {
        let mut app = app();
        let before = app.version;
        app.recompute();
        assert!(app.version > before);
    }

    #[test]
    fn chord_display_shows_the_pending_key() {
        let chord = ChordState::DeletePending {
            started_at: Instant::now(),
        };
        assert_eq!(chord.pending_display(), Some("d"));
        assert_eq!(ChordState::None.pending_display(), None);
    }
}
