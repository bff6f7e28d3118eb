//! Interactive-agent discovery.
//!
//! Walks tmux panes and the processes under them looking for
//! configured agent commands (e.g. `claude`, `aider`). A pane running
//! an agent yields an [`AgentSession`] keyed by the pane's working
//! directory, which may point at a directory no workspace root covers.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::project::normalize_path;

/// Coarse agent activity, derived from the process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Running,
    Idle,
    Completed,
    Failed,
    Error,
    #[default]
    Unknown,
}

impl AgentStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            AgentStatus::Running => "●",
            AgentStatus::Idle => "◐",
            AgentStatus::Completed => "✓",
            AgentStatus::Failed | AgentStatus::Error => "✗",
            AgentStatus::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    pub path: PathBuf,
    pub status: AgentStatus,
    /// Time since the agent process started
    pub duration: Duration,
    pub pid: u32,
}

/// Snapshot of agent sessions keyed by normalized pane working
/// directory. One agent per directory; the longest-running wins when a
/// directory somehow hosts several.
pub fn fetch_agent_sessions(agent_commands: &[String]) -> HashMap<PathBuf, AgentSession> {
    let mut out: HashMap<PathBuf, AgentSession> = HashMap::new();
    for pane in list_panes() {
        let Some(found) = find_agent_under(pane.pid, agent_commands) else {
            continue;
        };
        let path = normalize_path(&pane.cwd);
        let session = AgentSession {
            path: path.clone(),
            status: found.status,
            duration: found.duration,
            pid: found.pid,
        };
        match out.get(&path) {
            Some(existing) if existing.duration >= session.duration => {}
            _ => {
                out.insert(path, session);
            }
        }
    }
    out
}

struct Pane {
    pid: u32,
    cwd: PathBuf,
}

fn list_panes() -> Vec<Pane> {
    let Ok(output) = Command::new("tmux")
        .args([
            "list-panes",
            "-a",
            "-F",
            "#{pane_pid} #{pane_current_path}",
        ])
        .output()
    else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(parse_pane_line)
        .collect()
}

fn parse_pane_line(line: &str) -> Option<Pane> {
    let (pid, path) = line.split_once(' ')?;
    Some(Pane {
        pid: pid.parse().ok()?,
        cwd: PathBuf::from(path),
    })
}

struct FoundAgent {
    pid: u32,
    status: AgentStatus,
    duration: Duration,
}

/// Walk the pane's process subtree, matching process names against
/// the configured agent commands.
fn find_agent_under(pane_pid: u32, agent_commands: &[String]) -> Option<FoundAgent> {
    let mut queue = vec![pane_pid];
    while let Some(pid) = queue.pop() {
        let comm = read_comm(pid);
        if agent_commands.iter().any(|cmd| comm.as_deref() == Some(cmd)) {
            if !process_alive(pid) {
                continue;
            }
            return Some(FoundAgent {
                pid,
                status: status_from_state(read_state(pid)),
                duration: process_age(pid).unwrap_or_default(),
            });
        }
        queue.extend(children_of(pid));
    }
    None
}

fn read_comm(pid: u32) -> Option<String> {
    fs::read_to_string(format!("/proc/{pid}/comm"))
        .ok()
        .map(|s| s.trim().to_string())
}

fn read_state(pid: u32) -> Option<char> {
    // /proc/<pid>/stat field 3, after the parenthesized comm which may
    // itself contain spaces.
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let rest = stat.rsplit_once(')')?.1;
    rest.split_whitespace().next()?.chars().next()
}

fn status_from_state(state: Option<char>) -> AgentStatus {
    match state {
        Some('R') => AgentStatus::Running,
        Some('S') | Some('D') => AgentStatus::Idle,
        Some('Z') | Some('X') => AgentStatus::Completed,
        Some('T') => AgentStatus::Failed,
        Some(_) => AgentStatus::Error,
        None => AgentStatus::Unknown,
    }
}

/// Signal 0 probe; the /proc entry can outlive the process briefly.
fn process_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

fn process_age(pid: u32) -> Option<Duration> {
    let meta = fs::metadata(format!("/proc/{pid}")).ok()?;
    let created = meta.modified().ok()?;
    created.elapsed().ok()
}

fn children_of(pid: u32) -> Vec<u32> {
    let task_dir = format!("/proc/{pid}/task");
    let Ok(tasks) = fs::read_dir(&task_dir) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for task in tasks.flatten() {
        let children_path = task.path().join("children");
        let Ok(content) = fs::read_to_string(&children_path) else {
            debug!(pid, "no children file for task");
            continue;
        };
        out.extend(parse_child_pids(&content));
    }
    out
}

fn parse_child_pids(content: &str) -> Vec<u32> {
    content
        .split_whitespace()
        .filter_map(|c| c.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pane_line_parses_pid_and_path() {
        let pane = parse_pane_line("4242 /w/app").unwrap();
        assert_eq!(pane.pid, 4242);
        assert_eq!(pane.cwd, PathBuf::from("/w/app"));
    }

    #[test]
    fn pane_line_keeps_paths_with_spaces() {
        let pane = parse_pane_line("7 /w/my project").unwrap();
        assert_eq!(pane.cwd, PathBuf::from("/w/my project"));
    }

    #[test]
    fn malformed_pane_line_is_skipped() {
        assert!(parse_pane_line("garbage").is_none());
        assert!(parse_pane_line("notanumber /w/app").is_none());
    }

    #[test]
    fn process_states_map_to_closed_statuses() {
        assert_eq!(status_from_state(Some('R')), AgentStatus::Running);
        assert_eq!(status_from_state(Some('S')), AgentStatus::Idle);
        assert_eq!(status_from_state(Some('Z')), AgentStatus::Completed);
        assert_eq!(status_from_state(Some('T')), AgentStatus::Failed);
        assert_eq!(status_from_state(Some('W')), AgentStatus::Error);
        assert_eq!(status_from_state(None), AgentStatus::Unknown);
    }

    #[test]
    fn child_pid_lists_tolerate_junk_entries() {
        assert_eq!(parse_child_pids("12 34 56"), vec![12, 34, 56]);
        assert_eq!(parse_child_pids("12 notapid 56"), vec![12, 56]);
        assert!(parse_child_pids("").is_empty());
    }

    #[test]
    fn unknown_is_the_default_status() {
        assert_eq!(AgentStatus::default(), AgentStatus::Unknown);
    }
}
