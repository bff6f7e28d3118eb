//! Project model: the discovered units of work and their relations.

pub mod discovery;

pub use discovery::discover;

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What kind of node a discovered project is.
///
/// The kind drives the hierarchy: worktree kinds always have a
/// `parent_path`, sub-project kinds always have a
/// `parent_ecosystem_path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    /// Root of an ecosystem owning one or more sub-projects
    EcosystemRoot,
    /// Worktree of an ecosystem root
    EcosystemWorktree,
    /// Repository with no ecosystem owner
    Standalone,
    /// Worktree of a standalone repository
    StandaloneWorktree,
    /// Repository owned by an ecosystem
    EcosystemSubProject,
    /// Worktree of an ecosystem sub-project
    EcosystemSubProjectWorktree,
    /// Worktree of a sub-project that lives under an ecosystem worktree
    EcosystemWorktreeSubProjectWorktree,
}

impl ProjectKind {
    /// Whether this kind is a secondary working copy of some repository
    pub fn is_worktree(self) -> bool {
        matches!(
            self,
            ProjectKind::EcosystemWorktree
                | ProjectKind::StandaloneWorktree
                | ProjectKind::EcosystemSubProjectWorktree
                | ProjectKind::EcosystemWorktreeSubProjectWorktree
        )
    }

    /// Whether this kind is an ecosystem node (root or its worktree)
    pub fn is_ecosystem(self) -> bool {
        matches!(
            self,
            ProjectKind::EcosystemRoot | ProjectKind::EcosystemWorktree
        )
    }
}

/// One discovered unit of work: a repository, sub-project, or worktree.
///
/// Identity lives entirely in `path`; enrichment data is merged into
/// app-side maps keyed by the normalized path, never into the value
/// itself. Discovery re-creates these from scratch each cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Absolute, normalized filesystem path; unique across the list
    pub path: PathBuf,
    /// Display name (directory basename by default)
    pub name: String,
    /// Hierarchy kind
    pub kind: ProjectKind,
    /// Path of the repository this is a worktree of (worktrees only)
    #[serde(default)]
    pub parent_path: Option<PathBuf>,
    /// Path of the owning ecosystem root (sub-projects and their worktrees)
    #[serde(default)]
    pub parent_ecosystem_path: Option<PathBuf>,
    /// Label shared by sibling worktrees created for the same feature
    /// across an ecosystem and its sub-projects
    #[serde(default)]
    pub worktree_name: Option<String>,
}

impl Project {
    /// Whether this project is a worktree of another repository
    pub fn is_worktree(&self) -> bool {
        self.kind.is_worktree()
    }

    /// Whether this project is an ecosystem node
    pub fn is_ecosystem(&self) -> bool {
        self.kind.is_ecosystem()
    }

    /// The tmux session name for this project.
    ///
    /// Derived from the full path so two directories with the same
    /// basename never collide; see [`identifier_for_path`].
    pub fn identifier(&self) -> String {
        identifier_for_path(&self.path)
    }

    /// Key used for group-activity: worktrees group under their
    /// parent repository, everything else under itself.
    pub fn group_key(&self) -> &Path {
        match &self.parent_path {
            Some(parent) if self.is_worktree() => parent,
            _ => &self.path,
        }
    }
}

/// Derive the session identifier for an arbitrary path.
///
/// tmux forbids `.` and `:` in session names and prefix-matches
/// targets, so the encoding has to be both tmux-safe and injective:
/// path separators become `_`, a literal `-` doubles to `--`, and any
/// other non-alphanumeric byte becomes `-` plus two hex digits. `_`
/// only ever stands for a separator and `-` only ever opens an
/// escape, so distinct paths never share a session name.
pub fn identifier_for_path(path: &Path) -> String {
    let normalized = normalize_path(path);
    let mut out = String::new();
    for component in normalized.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        if !out.is_empty() {
            out.push('_');
        }
        for &byte in part.to_string_lossy().as_bytes() {
            match byte {
                b'-' => out.push_str("--"),
                b if b.is_ascii_alphanumeric() => out.push(byte as char),
                _ => out.push_str(&format!("-{byte:02x}")),
            }
        }
    }
    out
}

/// Normalize a path for use as a lookup key.
///
/// Makes the path absolute, resolves `.`/`..` components lexically,
/// and case-folds on filesystems that are case-insensitive by
/// default. Every map keyed by project path must go through this at
/// both insertion and lookup time; inconsistent normalization shows
/// up as silently missing enrichment, not as an error.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cfg!(any(target_os = "macos", target_os = "windows")) {
        PathBuf::from(cleaned.to_string_lossy().to_lowercase())
    } else {
        cleaned
    }
}
