//! Building list rows from the engine output.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};

use crate::app::App;
use crate::keymap::KeyMapBackend;
use crate::persist::ViewMode;
use crate::project::Project;

use super::cells;

pub(super) fn build_rows<'a, B: KeyMapBackend>(app: &'a App<B>) -> Vec<ListItem<'a>> {
    app.list.iter().map(|p| row(app, p)).collect()
}

fn row<'a, B: KeyMapBackend>(app: &'a App<B>, project: &'a Project) -> ListItem<'a> {
    let running = app.running.contains(&project.identifier());
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        cells::shortcut_cell(app.keymap.key_for(&project.path)),
        Style::default().fg(Color::Cyan),
    ));

    let indent = indent_for(app, project);
    let name_style = if running {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    match app.state.view_mode {
        ViewMode::Tree => {
            spans.push(Span::raw(indent));
            spans.push(Span::raw(cells::kind_icon(project.kind)));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(project.name.as_str(), name_style));
        }
        ViewMode::Table => {
            spans.push(Span::raw(cells::kind_icon(project.kind)));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{:<28}", project.name),
                name_style,
            ));
        }
    }

    if let Some(path) = cells::path_cell(&project.path, app.state.path_display_mode) {
        spans.push(Span::styled(
            format!("  {path}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if app.state.toggles.git {
        if let Some(status) = app.git.get(&project.path) {
            spans.push(Span::styled(
                format!("  {}", cells::git_cell(status)),
                Style::default().fg(if status.is_dirty() {
                    Color::Yellow
                } else {
                    Color::DarkGray
                }),
            ));
        }
    }

    if app.state.toggles.agents {
        if let Some(session) = app.agents.get(&project.path) {
            spans.push(Span::styled(
                format!("  {}", cells::agent_cell(session)),
                Style::default().fg(Color::Magenta),
            ));
        }
    }

    if app.state.toggles.notes {
        if let Some(counts) = app.notes.get(&project.path) {
            spans.push(Span::styled(
                format!("  {}", cells::notes_cell(counts)),
                Style::default().fg(Color::Blue),
            ));
        }
    }

    if app.state.toggles.plans {
        if let Some(stats) = app.plans.get(&project.path) {
            spans.push(Span::styled(
                format!("  {}", cells::plans_cell(stats)),
                Style::default().fg(Color::Blue),
            ));
        }
    }

    ListItem::new(Line::from(spans))
}

/// Tree indentation: worktrees nest under their parent; sub-projects
/// nest while an ecosystem is focused or the picker groups them.
fn indent_for<B: KeyMapBackend>(app: &App<B>, project: &Project) -> &'static str {
    if project.is_worktree() {
        "  ↳ "
    } else if project.parent_ecosystem_path.is_some() && app.state.focused_path.is_some() {
        "  "
    } else {
        ""
    }
}
