//! tmux session lifecycle client.
//!
//! Thin shell-out wrappers keyed by project identifier; every call is
//! a fresh `tmux` invocation, no control-mode connection is held.

use std::collections::HashSet;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Names of all currently running tmux sessions.
///
/// An unreachable server (not running, socket gone) reads as "no
/// sessions" rather than an error: the picker treats that as every
/// group inactive.
pub fn list_running_identifiers() -> HashSet<String> {
    let Ok(output) = Command::new("tmux")
        .args(["list-sessions", "-F", "#{session_name}"])
        .output()
    else {
        return HashSet::new();
    };
    if !output.status.success() {
        return HashSet::new();
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Whether a session with this exact name exists.
pub fn session_exists(identifier: &str) -> bool {
    Command::new("tmux")
        .args(["has-session", "-t", &exact_target(identifier)])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Create a detached session rooted at the project directory.
pub fn new_session(identifier: &str, cwd: &Path) -> Result<()> {
    run_tmux(&[
        "new-session",
        "-d",
        "-s",
        identifier,
        "-c",
        &cwd.display().to_string(),
    ])
}

/// Kill a session by identifier.
pub fn kill_session(identifier: &str) -> Result<()> {
    run_tmux(&["kill-session", "-t", &exact_target(identifier)])
}

/// Bring a session to the foreground: switch the attached client when
/// running inside tmux, otherwise attach this process.
pub fn switch_or_attach(identifier: &str) -> Result<()> {
    let target = exact_target(identifier);
    if std::env::var_os("TMUX").is_some() {
        run_tmux(&["switch-client", "-t", &target])
    } else {
        // attach-session replaces our terminal until the user detaches
        let status = Command::new("tmux")
            .args(["attach-session", "-t", &target])
            .status()
            .context("Failed to run tmux attach-session")?;
        if !status.success() {
            anyhow::bail!("tmux attach-session exited with {status}");
        }
        Ok(())
    }
}

/// Block until the session closes or the timeout elapses.
///
/// Returns Ok(true) if the session closed, Ok(false) on timeout.
pub fn wait_for_close(identifier: &str, timeout: Option<Duration>) -> Result<bool> {
    let started = Instant::now();
    loop {
        if !session_exists(identifier) {
            return Ok(true);
        }
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Ok(false);
            }
        }
        std::thread::sleep(Duration::from_millis(500));
    }
}

/// Prefix-match protection: `-t name` matches by prefix, `=name` is
/// exact.
fn exact_target(identifier: &str) -> String {
    format!("={identifier}")
}

fn run_tmux(args: &[&str]) -> Result<()> {
    let output = Command::new("tmux")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run tmux {}", args.first().copied().unwrap_or("")))?;
    if !output.status.success() {
        anyhow::bail!(
            "tmux {} failed: {}",
            args.first().copied().unwrap_or(""),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
