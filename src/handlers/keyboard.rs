//! Keyboard handling for the picker.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, ChordState, FilterKeyResult};
use crate::keymap::KeyMapBackend;

/// Lowercase keys the picker consumes itself, in dispatch order
/// below. A shortcut bound to one of these still jumps through the
/// generated tmux bindings, but inside the picker the command wins.
pub const COMMAND_KEYS: &[char] = &[
    'd', 'e', 'f', 'g', 'j', 'k', 'm', 'p', 'q', 'r', 'v', 'w', 'y',
];

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    /// `r`: fire a full refresh tick now
    Refresh,
    Quit,
}

pub fn handle_key_event<B: KeyMapBackend>(app: &mut App<B>, key: KeyEvent) -> KeyAction {
    // Ignore release/repeat events on terminals that report them.
    if key.kind == KeyEventKind::Release {
        return KeyAction::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('q' | 'c') = key.code {
            return KeyAction::Quit;
        }
    }

    // Insert mode: the filter input owns every key.
    if app.filter_active {
        return handle_filter_mode(app, key);
    }

    // `m` waits for exactly one more key.
    if app.pending_assign {
        match key.code {
            KeyCode::Char(c) => app.assign_shortcut(c),
            _ => app.pending_assign = false,
        }
        return KeyAction::Continue;
    }

    // `dd` chord.
    if let ChordState::DeletePending { .. } = app.chord {
        app.chord = ChordState::None;
        if key.code == KeyCode::Char('d') {
            app.kill_selected();
            return KeyAction::Continue;
        }
        // Fall through: the second key gets its normal meaning.
    }

    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.navigate_down(),
        KeyCode::Char('k') | KeyCode::Up => app.navigate_up(),
        KeyCode::Char('g') => app.jump_to_first(),
        KeyCode::Char('G') => app.jump_to_last(),
        KeyCode::Enter => {
            if app.ecosystem_picker {
                // Selecting an ecosystem focuses it and leaves the
                // picker sub-mode.
                app.focus_selected();
                app.ecosystem_picker = false;
                app.clear_filter();
            } else {
                app.open_selected();
            }
        }
        KeyCode::Char('d') => {
            app.chord = ChordState::DeletePending {
                started_at: Instant::now(),
            };
            app.version += 1;
        }
        KeyCode::Char('/') => app.activate_filter(),
        KeyCode::Char('e') => app.toggle_ecosystem_picker(),
        KeyCode::Char('f') => app.focus_selected(),
        KeyCode::Esc => {
            if app.ecosystem_picker {
                app.ecosystem_picker = false;
                app.recompute();
            } else if app.has_filter() {
                app.clear_filter();
            } else {
                app.unfocus();
            }
        }
        KeyCode::Char('D') => app.toggle_dirty_filter(),
        KeyCode::Char('w') => app.toggle_worktree_fold(),
        KeyCode::Char('p') => app.cycle_path_display(),
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('m') => {
            app.pending_assign = true;
            app.version += 1;
        }
        KeyCode::Char('M') => app.clear_shortcut(),
        KeyCode::Char('y') => app.yank_selected(),
        KeyCode::Char('r') => return KeyAction::Refresh,
        KeyCode::Char(c) => {
            // Any other letter may be a one-key shortcut jump.
            app.open_by_shortcut(c);
        }
        _ => {}
    }
    KeyAction::Continue
}

fn handle_filter_mode<B: KeyMapBackend>(app: &mut App<B>, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Esc {
        app.clear_filter();
        return KeyAction::Continue;
    }
    match app.handle_filter_key(key) {
        FilterKeyResult::QueryChanged => {
            app.recompute();
            app.cursor = 0;
        }
        FilterKeyResult::Deactivated => app.deactivate_filter(),
        FilterKeyResult::Continue => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::app::test_support::app;
    use crate::project::{Project, ProjectKind};
    use crate::refresh::RefreshMsg;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

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

    fn worktree(path: &str, parent: &str) -> Project {
        Project {
            parent_path: Some(PathBuf::from(parent)),
            kind: ProjectKind::StandaloneWorktree,
            ..project(path)
        }
    }

    #[test]
    fn q_and_ctrl_q_quit() {
        let mut app = app();
        assert_eq!(handle_key_event(&mut app, key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key_event(&mut app, ctrl('q')), KeyAction::Quit);
        assert_eq!(handle_key_event(&mut app, ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn slash_enters_filter_mode_and_typing_filters() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![
            project("/w/app"),
            project("/w/lib"),
        ]));

        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);

        handle_key_event(&mut app, key(KeyCode::Char('l')));
        let names: Vec<&str> = app.list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lib"]);
        assert_eq!(app.cursor, 0);

        // q in insert mode types, never quits.
        assert_eq!(
            handle_key_event(&mut app, key(KeyCode::Char('q'))),
            KeyAction::Continue
        );
        assert_eq!(app.query, "lq");
    }

    #[test]
    fn enter_leaves_insert_mode_but_keeps_the_query() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        assert_eq!(app.query, "a");
    }

    #[test]
    fn escape_in_insert_mode_clears_the_filter() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.filter_active);
        assert!(app.query.is_empty());
    }

    #[test]
    fn dd_chord_requires_two_ds() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![project("/w/app")]));

        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(app.chord, ChordState::DeletePending { .. }));

        // A different key cancels the chord and acts normally.
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert!(matches!(app.chord, ChordState::None));
    }

    #[test]
    fn m_then_key_assigns_a_shortcut() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![project("/w/app")]));

        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert!(app.pending_assign);
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert!(!app.pending_assign);
        assert_eq!(app.keymap.key_for(Path::new("/w/app")), Some('s'));
    }

    #[test]
    fn m_then_escape_cancels_the_assignment() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![project("/w/app")]));

        handle_key_event(&mut app, key(KeyCode::Char('m')));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.pending_assign);
        assert!(app.keymap.key_for(Path::new("/w/app")).is_none());
    }

    #[test]
    fn escape_priority_is_picker_then_filter_then_focus() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![project("/w/app")]));
        handle_key_event(&mut app, key(KeyCode::Char('f')));
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        handle_key_event(&mut app, key(KeyCode::Enter));
        handle_key_event(&mut app, key(KeyCode::Char('e')));

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.ecosystem_picker);
        assert!(app.has_filter());

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_filter());
        assert!(app.state.focused_path.is_some());

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.state.focused_path.is_none());
    }

    #[test]
    fn w_folds_worktrees_out_of_the_list() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![
            project("/w/app"),
            worktree("/w/app-auth", "/w/app"),
        ]));
        handle_key_event(&mut app, key(KeyCode::Char('f')));

        assert_eq!(app.list.len(), 2);
        handle_key_event(&mut app, key(KeyCode::Char('w')));
        let names: Vec<&str> = app.list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["app"]);
    }

    #[test]
    fn command_keys_keep_their_meaning_even_when_bound() {
        let mut app = app();
        app.apply(RefreshMsg::Projects(vec![
            project("/w/app"),
            project("/w/lib"),
        ]));
        app.keymap.assign(Path::new("/w/lib"), "lib", 'j');

        // `j` navigates; the bound jump is reachable through the
        // generated tmux binding only.
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn r_requests_a_refresh() {
        let mut app = app();
        assert_eq!(
            handle_key_event(&mut app, key(KeyCode::Char('r'))),
            KeyAction::Refresh
        );
    }
}
