//! Per-project git status, fetched by shelling out to `git`.
//!
//! Parsing targets `git status --porcelain=v2 --branch`, which is the
//! stable machine-readable format; line counts come from
//! `git diff --numstat`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::project::normalize_path;

/// Composite git status for one project.
///
/// Every field here is displayed somewhere, so every field takes part
/// in the refresh diff; `PartialEq` must stay in sync with the struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitStatus {
    /// Current branch name (`HEAD` when detached)
    pub branch: String,
    /// Whether an upstream is configured
    pub has_upstream: bool,
    /// Commits ahead of the upstream
    pub ahead: u32,
    /// Commits behind the upstream
    pub behind: u32,
    /// Commits ahead of the configured main branch
    pub ahead_of_main: u32,
    /// Commits behind the configured main branch
    pub behind_of_main: u32,
    /// Files with unstaged modifications
    pub modified: u32,
    /// Files with staged changes
    pub staged: u32,
    /// Untracked files
    pub untracked: u32,
    /// Lines added in the working tree (numstat)
    pub lines_added: u32,
    /// Lines deleted in the working tree (numstat)
    pub lines_deleted: u32,
}

impl GitStatus {
    /// Whether the working tree has any local changes
    pub fn is_dirty(&self) -> bool {
        self.modified > 0 || self.staged > 0 || self.untracked > 0
    }
}

/// Fetch statuses for the given project paths.
///
/// A full replacement map: paths whose status cannot be read are
/// simply absent this cycle. Keys are normalized paths.
pub fn fetch_statuses(paths: &[PathBuf], main_branch: &str) -> HashMap<PathBuf, GitStatus> {
    let mut statuses = HashMap::new();
    for path in paths {
        match fetch_one(path, main_branch) {
            Ok(status) => {
                statuses.insert(normalize_path(path), status);
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "git status unavailable this cycle");
            }
        }
    }
    statuses
}

fn fetch_one(path: &Path, main_branch: &str) -> anyhow::Result<GitStatus> {
    let porcelain = git_output(path, &["status", "--porcelain=v2", "--branch"])?;
    let mut status = parse_porcelain(&porcelain);

    if status.is_dirty() {
        if let Ok(numstat) = git_output(path, &["diff", "--numstat"]) {
            let (added, deleted) = parse_numstat(&numstat);
            status.lines_added = added;
            status.lines_deleted = deleted;
        }
    }

    // Divergence from the main branch is best-effort; a missing main
    // branch just leaves the counts at zero.
    if status.branch != main_branch {
        let range = format!("{main_branch}...HEAD");
        if let Ok(counts) = git_output(path, &["rev-list", "--left-right", "--count", &range]) {
            if let Some((behind, ahead)) = parse_count_pair(&counts) {
                status.behind_of_main = behind;
                status.ahead_of_main = ahead;
            }
        }
    }

    Ok(status)
}

fn git_output(path: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(args)
        .output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.first().copied().unwrap_or(""),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse porcelain v2 output into a status.
fn parse_porcelain(output: &str) -> GitStatus {
    let mut status = GitStatus::default();

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("# branch.head ") {
            status.branch = rest.trim().to_string();
        } else if line.starts_with("# branch.upstream ") {
            status.has_upstream = true;
        } else if let Some(rest) = line.strip_prefix("# branch.ab ") {
            // "+<ahead> -<behind>"
            for part in rest.split_whitespace() {
                if let Some(n) = part.strip_prefix('+') {
                    status.ahead = n.parse().unwrap_or(0);
                } else if let Some(n) = part.strip_prefix('-') {
                    status.behind = n.parse().unwrap_or(0);
                }
            }
        } else if line.starts_with("1 ") || line.starts_with("2 ") {
            // Changed entry: XY field is the third column
            let mut fields = line.split_whitespace();
            let xy = fields.nth(1).unwrap_or("..");
            let mut chars = xy.chars();
            let staged = chars.next().unwrap_or('.');
            let unstaged = chars.next().unwrap_or('.');
            if staged != '.' {
                status.staged += 1;
            }
            if unstaged != '.' {
                status.modified += 1;
            }
        } else if line.starts_with("? ") {
            status.untracked += 1;
        }
    }

    status
}

/// Sum added/deleted lines from `git diff --numstat` output.
fn parse_numstat(output: &str) -> (u32, u32) {
    let mut added = 0;
    let mut deleted = 0;
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        // Binary files report "-" for both counts
        if let Some(a) = fields.next().and_then(|f| f.parse::<u32>().ok()) {
            added += a;
        }
        if let Some(d) = fields.next().and_then(|f| f.parse::<u32>().ok()) {
            deleted += d;
        }
    }
    (added, deleted)
}

/// Parse `git rev-list --left-right --count` output ("<left>\t<right>").
fn parse_count_pair(output: &str) -> Option<(u32, u32)> {
    let mut fields = output.split_whitespace();
    let left = fields.next()?.parse().ok()?;
    let right = fields.next()?.parse().ok()?;
    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porcelain_branch_and_ab_are_parsed() {
        let output = "\
# branch.oid 1234abcd
# branch.head feature/login
# branch.upstream origin/feature/login
# branch.ab +3 -1
";
        let status = parse_porcelain(output);
        assert_eq!(status.branch, "feature/login");
        assert!(status.has_upstream);
        assert_eq!(status.ahead, 3);
        assert_eq!(status.behind, 1);
        assert!(!status.is_dirty());
    }

    #[test]
    fn porcelain_counts_staged_modified_and_untracked() {
        let output = "\
# branch.head main
1 .M N... 100644 100644 100644 abc def src/lib.rs
1 M. N... 100644 100644 100644 abc def src/main.rs
1 MM N... 100644 100644 100644 abc def src/app.rs
? notes.txt
? scratch.rs
";
        let status = parse_porcelain(output);
        assert_eq!(status.modified, 2);
        assert_eq!(status.staged, 2);
        assert_eq!(status.untracked, 2);
        assert!(status.is_dirty());
    }

    #[test]
    fn no_upstream_leaves_flag_unset() {
        let status = parse_porcelain("# branch.head detached\n");
        assert!(!status.has_upstream);
        assert_eq!(status.ahead, 0);
    }

    #[test]
    fn numstat_sums_lines_and_skips_binary_entries() {
        let output = "10\t2\tsrc/lib.rs\n-\t-\tassets/logo.png\n5\t0\tREADME.md\n";
        assert_eq!(parse_numstat(output), (15, 2));
    }

    #[test]
    fn count_pair_parses_tab_separated_counts() {
        assert_eq!(parse_count_pair("4\t7\n"), Some((4, 7)));
        assert_eq!(parse_count_pair("garbage"), None);
    }

    #[test]
    fn identical_statuses_compare_equal_across_allocations() {
        let a = parse_porcelain("# branch.head main\n# branch.ab +1 -0\n");
        let b = parse_porcelain("# branch.head main\n# branch.ab +1 -0\n");
        assert_eq!(a, b);
    }
}
