//! Pure cell formatting for list rows.

use std::path::Path;
use std::time::Duration;

use crate::agent::AgentSession;
use crate::enrich::{NoteCounts, PlanStats};
use crate::git::GitStatus;
use crate::persist::PathDisplayMode;
use crate::project::ProjectKind;

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Fixed-width shortcut column.
pub(super) fn shortcut_cell(key: Option<char>) -> String {
    match key {
        Some(key) => format!("[{key}] "),
        None => "    ".to_string(),
    }
}

pub(super) fn kind_icon(kind: ProjectKind) -> &'static str {
    match kind {
        ProjectKind::EcosystemRoot => "◆",
        ProjectKind::EcosystemWorktree => "◈",
        ProjectKind::Standalone => "■",
        ProjectKind::EcosystemSubProject => "▪",
        ProjectKind::StandaloneWorktree
        | ProjectKind::EcosystemSubProjectWorktree
        | ProjectKind::EcosystemWorktreeSubProjectWorktree => "▫",
    }
}

pub(super) fn path_cell(path: &Path, mode: PathDisplayMode) -> Option<String> {
    match mode {
        PathDisplayMode::Off => None,
        PathDisplayMode::Full => Some(path.display().to_string()),
        PathDisplayMode::Compact => {
            let display = path.display().to_string();
            let compact = dirs::home_dir()
                .and_then(|home| {
                    path.strip_prefix(&home)
                        .ok()
                        .map(|rest| format!("~/{}", rest.display()))
                })
                .unwrap_or(display);
            Some(compact)
        }
    }
}

/// Branch plus dirty/ahead/behind summary, omitting zero counts.
pub(super) fn git_cell(status: &GitStatus) -> String {
    let mut out = status.branch.clone();
    if status.ahead > 0 {
        out.push_str(&format!(" ↑{}", status.ahead));
    }
    if status.behind > 0 {
        out.push_str(&format!(" ↓{}", status.behind));
    }
    if status.modified > 0 {
        out.push_str(&format!(" ~{}", status.modified));
    }
    if status.staged > 0 {
        out.push_str(&format!(" +{}", status.staged));
    }
    if status.untracked > 0 {
        out.push_str(&format!(" ?{}", status.untracked));
    }
    if status.lines_added > 0 || status.lines_deleted > 0 {
        out.push_str(&format!(" Δ+{}-{}", status.lines_added, status.lines_deleted));
    }
    out
}

pub(super) fn agent_cell(session: &AgentSession) -> String {
    format!(
        "{} {}",
        session.status.glyph(),
        format_duration(session.duration)
    )
}

pub(super) fn notes_cell(counts: &NoteCounts) -> String {
    format!("✎{}/{}", counts.open, counts.total)
}

pub(super) fn plans_cell(stats: &PlanStats) -> String {
    format!("☑{}/{}", stats.done, stats.total)
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentStatus;
    use std::path::PathBuf;

    #[test]
    fn shortcut_cells_are_fixed_width() {
        assert_eq!(shortcut_cell(Some('a')), "[a] ");
        assert_eq!(shortcut_cell(None), "    ");
    }

    #[test]
    fn git_cell_omits_zero_counts() {
        let status = GitStatus {
            branch: "main".to_string(),
            ahead: 2,
            modified: 1,
            ..GitStatus::default()
        };
        assert_eq!(git_cell(&status), "main ↑2 ~1");

        let clean = GitStatus {
            branch: "main".to_string(),
            ..GitStatus::default()
        };
        assert_eq!(git_cell(&clean), "main");
    }

    #[test]
    fn git_cell_shows_line_deltas() {
        let status = GitStatus {
            branch: "fix".to_string(),
            lines_added: 10,
            lines_deleted: 4,
            ..GitStatus::default()
        };
        assert_eq!(git_cell(&status), "fix Δ+10-4");
    }

    #[test]
    fn durations_render_in_the_largest_unit() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(300)), "5m");
        assert_eq!(format_duration(Duration::from_secs(3900)), "1h05m");
    }

    #[test]
    fn agent_cell_pairs_glyph_and_duration() {
        let session = AgentSession {
            path: PathBuf::from("/w/app"),
            status: AgentStatus::Running,
            duration: Duration::from_secs(90),
            pid: 1,
        };
        assert_eq!(agent_cell(&session), "● 1m");
    }

    #[test]
    fn path_cell_modes() {
        let path = PathBuf::from("/somewhere/deep/app");
        assert_eq!(path_cell(&path, PathDisplayMode::Off), None);
        assert_eq!(
            path_cell(&path, PathDisplayMode::Full),
            Some("/somewhere/deep/app".to_string())
        );
        // Compact falls back to the full path outside the home dir.
        assert_eq!(
            path_cell(&path, PathDisplayMode::Compact),
            Some("/somewhere/deep/app".to_string())
        );
    }

    #[test]
    fn notes_and_plans_cells() {
        assert_eq!(notes_cell(&NoteCounts { total: 3, open: 1 }), "✎1/3");
        assert_eq!(plans_cell(&PlanStats { total: 5, done: 2 }), "☑2/5");
    }
}
