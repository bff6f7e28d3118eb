//! User-triggered actions on the selected project.

use super::*;

use std::path::Path;

use tracing::warn;

use crate::keymap::KEY_ALPHABET;
use crate::mux;

impl<B: KeyMapBackend> App<B> {
    /// Enter: switch to the selected project's session, creating it
    /// first if needed.
    pub fn open_selected(&mut self) {
        let Some(project) = self.selected().cloned() else {
            return;
        };
        self.open_project(&project.identifier(), &project.path);
    }

    /// Second half of the `dd` chord: kill the selected session.
    pub fn kill_selected(&mut self) {
        let Some(project) = self.selected().cloned() else {
            return;
        };
        let identifier = project.identifier();
        if !self.running.contains(&identifier) {
            self.flash(format!("{}: no running session", project.name));
            return;
        }
        match mux::kill_session(&identifier) {
            Ok(()) => {
                // Reflect the kill immediately instead of waiting for
                // the next running-sessions fetch.
                self.running.remove(&identifier);
                self.recompute();
            }
            Err(err) => {
                warn!(%err, identifier, "kill failed");
                self.flash(format!("kill failed: {err}"));
            }
        }
    }

    /// Focus the selected project; focusing an already-focused one
    /// unfocuses.
    pub fn focus_selected(&mut self) {
        let Some(project) = self.selected() else {
            return;
        };
        let path = project.path.clone();
        if self.state.focused_path.as_deref() == Some(path.as_path()) {
            self.state.focused_path = None;
        } else {
            self.state.focused_path = Some(path);
        }
        self.state.save();
        self.recompute();
    }

    pub fn unfocus(&mut self) {
        if self.state.focused_path.take().is_some() {
            self.state.save();
            self.recompute();
        }
    }

    pub fn toggle_dirty_filter(&mut self) {
        self.filter_dirty = !self.filter_dirty;
        self.recompute();
    }

    pub fn toggle_worktree_fold(&mut self) {
        self.state.worktrees_folded = !self.state.worktrees_folded;
        self.state.save();
        self.recompute();
    }

    pub fn toggle_ecosystem_picker(&mut self) {
        self.ecosystem_picker = !self.ecosystem_picker;
        self.recompute();
    }

    pub fn cycle_path_display(&mut self) {
        self.state.path_display_mode = self.state.path_display_mode.cycle();
        self.state.save();
        self.version += 1;
    }

    pub fn toggle_view_mode(&mut self) {
        self.state.view_mode = self.state.view_mode.toggle();
        self.state.save();
        self.version += 1;
    }

    /// Complete an `m<key>` assignment for the selected project.
    pub fn assign_shortcut(&mut self, key: char) {
        self.pending_assign = false;
        if !KEY_ALPHABET.contains(&key) {
            self.flash(format!("'{key}' is not an assignable key"));
            return;
        }
        let Some(project) = self.selected().cloned() else {
            return;
        };
        self.keymap.assign(&project.path, &project.name, key);
        if crate::handlers::keyboard::COMMAND_KEYS.contains(&key) {
            self.flash(format!(
                "{} -> {key} (picker command; jump via tmux binding)",
                project.name
            ));
        } else {
            self.flash(format!("{} -> {key}", project.name));
        }
        self.version += 1;
    }

    /// `M`: drop the selected project's shortcut.
    pub fn clear_shortcut(&mut self) {
        let Some(project) = self.selected().cloned() else {
            return;
        };
        self.keymap.clear(&project.path);
        self.version += 1;
    }

    /// A bare letter with a binding jumps straight to that project.
    /// Returns false when the key is unbound so the caller can ignore
    /// it.
    pub fn open_by_shortcut(&mut self, key: char) -> bool {
        let Some(record) = self
            .keymap
            .records()
            .iter()
            .find(|r| r.key == key && r.project_path.is_some())
        else {
            return false;
        };
        let path = record.project_path.clone().unwrap_or_default();
        self.open_project(&crate::project::identifier_for_path(&path), &path);
        true
    }

    /// `y`: copy the selected project's path to the clipboard.
    pub fn yank_selected(&mut self) {
        let Some(project) = self.selected() else {
            return;
        };
        let path = project.path.display().to_string();
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(path.clone())) {
            Ok(()) => self.flash(format!("yanked {path}")),
            Err(err) => {
                warn!(%err, "clipboard unavailable");
                self.flash("clipboard unavailable");
            }
        }
    }

    fn open_project(&mut self, identifier: &str, path: &Path) {
        if !mux::session_exists(identifier) {
            if let Err(err) = mux::new_session(identifier, path) {
                warn!(%err, identifier, "session creation failed");
                self.flash(format!("create failed: {err}"));
                return;
            }
        }
        if let Err(err) = mux::switch_or_attach(identifier) {
            warn!(%err, identifier, "switch failed");
            self.flash(format!("switch failed: {err}"));
            return;
        }
        self.running.insert(identifier.to_string());
        self.recompute();
    }
}
