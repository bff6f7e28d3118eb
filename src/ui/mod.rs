//! Terminal UI rendering.
//!
//! Rendering is a pure view of the app state: the list is displayed
//! exactly as the engine produced it, never re-filtered or reordered
//! here.

mod cells;
mod list;

pub use cells::SPINNER_FRAMES;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame,
};

use crate::app::{App, ListPhase};
use crate::keymap::KeyMapBackend;

pub fn draw<B: KeyMapBackend>(f: &mut Frame, app: &App<B>, loading: bool) {
    let show_filter = app.filter_active || app.has_filter();
    let mut constraints = vec![Constraint::Min(1)];
    if show_filter {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_list(f, chunks[0], app, loading);
    if show_filter {
        draw_filter_line(f, chunks[1], app);
    }
    draw_help_bar(f, *chunks.last().unwrap_or(&Rect::default()), app);
}

fn draw_list<B: KeyMapBackend>(f: &mut Frame, area: Rect, app: &App<B>, loading: bool) {
    let title = list_title(app, loading);
    let block = Block::default().title(title).borders(Borders::ALL);

    let items = list::build_rows(app);
    let mut state = ListState::default();
    if !app.list.is_empty() {
        state.select(Some(app.cursor.min(app.list.len() - 1)));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

fn list_title<B: KeyMapBackend>(app: &App<B>, loading: bool) -> String {
    let mut title = String::from(" workmux ");
    if app.ecosystem_picker {
        title.push_str("[ecosystems] ");
    }
    if let Some(focused) = app
        .state
        .focused_path
        .as_deref()
        .and_then(|path| path.file_name())
    {
        title.push_str(&format!("[focus: {}] ", focused.to_string_lossy()));
    }
    if app.filter_dirty {
        title.push_str("[dirty] ");
    }
    if app.state.worktrees_folded {
        title.push_str("[folded] ");
    }
    if loading || app.phase == ListPhase::Loading {
        title.push_str(SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]);
        title.push(' ');
    }
    title
}

fn draw_filter_line<B: KeyMapBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let style = if app.filter_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let line = Line::from(vec![
        Span::styled("/", style),
        Span::styled(app.query.clone(), style),
    ]);
    f.render_widget(Paragraph::new(line), area);
    if app.filter_active {
        // 1 for the leading slash; the query is ASCII-or-wider but the
        // cursor position is a byte offset, so count chars up to it.
        let chars_before = app.query[..app.query_cursor].chars().count() as u16;
        f.set_cursor_position((area.x + 1 + chars_before, area.y));
    }
}

fn draw_help_bar<B: KeyMapBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let text = if let Some(flash) = &app.flash {
        flash.text.clone()
    } else if app.pending_assign {
        "press a key to bind (Esc cancels)".to_string()
    } else if let Some(pending) = app.chord.pending_display() {
        format!("{pending}… (d kills the session)")
    } else if app.filter_active {
        "Enter keep filter  Esc clear".to_string()
    } else {
        "j/k move  Enter open  dd kill  / filter  e ecosystems  f focus  D dirty  w fold  \
         m bind  y yank  r refresh  q quit"
            .to_string()
    };
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
