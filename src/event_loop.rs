//! The single-threaded reducer loop.
//!
//! One turn: expire transients, fire the periodic refresh tick, drain
//! and apply fetch results, redraw if anything visible changed, then
//! poll the terminal for input with a short timeout so background
//! results keep flowing while the user is idle.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{poll, read, Event};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{App, ListPhase};
use crate::handlers::keyboard::{handle_key_event, KeyAction};
use crate::keymap::KeyMapBackend;
use crate::refresh::Orchestrator;
use crate::ui;

const INPUT_POLL: Duration = Duration::from_millis(50);
const SPINNER_PERIOD: Duration = Duration::from_millis(100);

pub fn run_app<B: KeyMapBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<B>,
    orchestrator: &mut Orchestrator,
) -> Result<()> {
    let tick_interval = Duration::from_millis(app.config.tick_interval_ms);
    let mut next_tick = Instant::now();
    let mut next_spin = Instant::now();
    let mut last_drawn = 0u64;

    loop {
        app.tick_transients();

        if Instant::now() >= next_tick {
            fire_tick(app, orchestrator);
            next_tick = Instant::now() + tick_interval;
        }

        for msg in orchestrator.poll() {
            app.apply(msg);
        }

        let loading = orchestrator.any_loading() || app.phase == ListPhase::Loading;
        if loading && Instant::now() >= next_spin {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            app.version += 1;
            next_spin = Instant::now() + SPINNER_PERIOD;
        }

        if app.version != last_drawn {
            terminal.draw(|f| ui::draw(f, app, loading))?;
            last_drawn = app.version;
        }

        if poll(INPUT_POLL)? {
            match read()? {
                Event::Key(key) => match handle_key_event(app, key) {
                    KeyAction::Continue => {}
                    KeyAction::Refresh => {
                        fire_tick(app, orchestrator);
                        next_tick = Instant::now() + tick_interval;
                    }
                    KeyAction::Quit => return Ok(()),
                },
                Event::Resize(..) => {
                    app.version += 1;
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn fire_tick<B: KeyMapBackend>(app: &mut App<B>, orchestrator: &mut Orchestrator) {
    if app.phase == ListPhase::Idle {
        app.phase = ListPhase::Loading;
        app.version += 1;
    }
    let paths = app.project_paths();
    orchestrator.tick(&app.config, &paths);
}
