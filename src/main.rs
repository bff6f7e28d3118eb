use std::io;
use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use workmux::app::App;
use workmux::cli::{parse_duration, Cli, Command};
use workmux::config::Config;
use workmux::event_loop::run_app;
use workmux::keymap::{tmux::TmuxKeyMap, KeyBindingStore, KeyMapBackend};
use workmux::persist::{load_project_cache, SessionizerState};
use workmux::refresh::Orchestrator;
use workmux::{logging, mux, project};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let result = match cli.command {
        Some(Command::Wait { session, timeout }) => cmd_wait(&session, timeout.as_deref()),
        Some(Command::List) => cmd_list(),
        None => run_picker(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_wait(session: &str, timeout: Option<&str>) -> Result<()> {
    let timeout = timeout.map(parse_duration).transpose()?;
    if !mux::session_exists(session) {
        anyhow::bail!("no such session: {session}");
    }
    let closed = mux::wait_for_close(session, timeout)?;
    if !closed {
        anyhow::bail!("timed out waiting for {session}");
    }
    Ok(())
}

fn cmd_list() -> Result<()> {
    let config = Config::load()?;
    for project in project::discover(&config.workspace_roots) {
        println!("{}", project.path.display());
    }
    Ok(())
}

fn run_picker() -> Result<()> {
    if !io::stdin().is_terminal() {
        anyhow::bail!("workmux must be run in an interactive terminal");
    }

    let config = Config::load()?;
    let state = SessionizerState::load();
    let keymap = KeyBindingStore::load(TmuxKeyMap::new()?);

    let mut loader_backend = TmuxKeyMap::new()?;
    let mut orchestrator =
        Orchestrator::new(move || loader_backend.load_records().unwrap_or_default());

    let mut app = App::new(config, state, keymap);
    app.seed_from_cache(load_project_cache());

    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_app(&mut terminal, &mut app, &mut orchestrator);

    // Restore the terminal even when the loop errored.
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}
