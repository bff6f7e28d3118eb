//! Workspace walker producing the flat project snapshot.
//!
//! Layout conventions:
//! - each workspace root contains project directories
//! - a directory with a `.git` directory is a repository
//! - a repository whose immediate children are themselves
//!   repositories is an ecosystem; the children are its sub-projects
//! - a checkout whose `.git` is a gitdir pointer file is a worktree;
//!   the owning repository is resolved from the pointer
//! - worktree directories named `<repo>-<label>` share `label` as
//!   their worktree name across an ecosystem and its sub-projects

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{normalize_path, Project, ProjectKind};

/// How a directory relates to git.
enum GitDirKind {
    /// Primary checkout (`.git` is a directory)
    Repo,
    /// Worktree checkout; the owning repository's workdir
    WorktreeOf(PathBuf),
    /// Not a git checkout
    NotGit,
}

/// Produce a full project snapshot for the given workspace roots.
///
/// Total: unreadable roots or entries are logged and skipped, never
/// propagated. Output order is deterministic (sorted directory
/// listings), which downstream code relies on as the stable
/// tie-break order.
pub fn discover(roots: &[PathBuf]) -> Vec<Project> {
    let mut projects = Vec::new();

    for root in roots {
        let entries = match sorted_subdirs(root) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(root = %root.display(), %err, "skipping unreadable workspace root");
                continue;
            }
        };

        for dir in entries {
            match classify(&dir) {
                GitDirKind::Repo => discover_repo(&dir, &mut projects),
                GitDirKind::WorktreeOf(main) => discover_worktree(&dir, &main, &mut projects),
                GitDirKind::NotGit => {}
            }
        }
    }

    projects
}

/// Discover a primary checkout: standalone repo or ecosystem root
/// plus its sub-projects.
fn discover_repo(dir: &Path, projects: &mut Vec<Project>) {
    let children = git_children(dir);

    if children.is_empty() {
        projects.push(make_project(dir, ProjectKind::Standalone, None, None, None));
        return;
    }

    let eco_path = normalize_path(dir);
    projects.push(make_project(dir, ProjectKind::EcosystemRoot, None, None, None));

    for (child, kind) in children {
        match kind {
            GitDirKind::Repo => {
                projects.push(make_project(
                    &child,
                    ProjectKind::EcosystemSubProject,
                    None,
                    Some(eco_path.clone()),
                    None,
                ));
            }
            GitDirKind::WorktreeOf(main) => {
                let label = worktree_label(&child, &main);
                projects.push(make_project(
                    &child,
                    ProjectKind::EcosystemSubProjectWorktree,
                    Some(normalize_path(&main)),
                    Some(eco_path.clone()),
                    label,
                ));
            }
            GitDirKind::NotGit => {}
        }
    }
}

/// Discover a worktree checkout: ecosystem worktree (with its nested
/// sub-project worktrees) or standalone worktree.
fn discover_worktree(dir: &Path, main: &Path, projects: &mut Vec<Project>) {
    let label = worktree_label(dir, main);
    let children = git_children(dir);

    if children.is_empty() {
        // A worktree whose owning repo is itself a sub-project keeps
        // its ecosystem attribution even when checked out at the
        // workspace root.
        let owning_ecosystem = main
            .parent()
            .filter(|eco| matches!(classify(eco), GitDirKind::Repo))
            .map(normalize_path);
        let kind = if owning_ecosystem.is_some() {
            ProjectKind::EcosystemSubProjectWorktree
        } else {
            ProjectKind::StandaloneWorktree
        };
        projects.push(make_project(
            dir,
            kind,
            Some(normalize_path(main)),
            owning_ecosystem,
            label,
        ));
        return;
    }

    // A worktree containing repositories is an ecosystem worktree;
    // its git children are sub-project copies for the same feature.
    let eco_path = normalize_path(main);
    projects.push(make_project(
        dir,
        ProjectKind::EcosystemWorktree,
        Some(eco_path.clone()),
        None,
        label.clone(),
    ));

    for (child, kind) in children {
        let parent = match kind {
            GitDirKind::WorktreeOf(child_main) => normalize_path(&child_main),
            // A plain repo nested in a worktree maps back to the
            // same-named sub-project of the main ecosystem.
            GitDirKind::Repo => {
                let name = child.file_name().map(Path::new).unwrap_or(&child);
                normalize_path(&eco_path.join(name))
            }
            GitDirKind::NotGit => continue,
        };
        projects.push(make_project(
            &child,
            ProjectKind::EcosystemWorktreeSubProjectWorktree,
            Some(parent),
            Some(eco_path.clone()),
            label.clone(),
        ));
    }
}

fn make_project(
    dir: &Path,
    kind: ProjectKind,
    parent_path: Option<PathBuf>,
    parent_ecosystem_path: Option<PathBuf>,
    worktree_name: Option<String>,
) -> Project {
    Project {
        path: normalize_path(dir),
        name: dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string()),
        kind,
        parent_path,
        parent_ecosystem_path,
        worktree_name,
    }
}

/// List immediate children that are git checkouts, in sorted order.
fn git_children(dir: &Path) -> Vec<(PathBuf, GitDirKind)> {
    let Ok(subdirs) = sorted_subdirs(dir) else {
        return Vec::new();
    };
    subdirs
        .into_iter()
        .filter_map(|child| match classify(&child) {
            GitDirKind::NotGit => None,
            kind => Some((child, kind)),
        })
        .collect()
}

/// Classify a directory by its `.git` entry.
fn classify(dir: &Path) -> GitDirKind {
    let git = dir.join(".git");
    match fs::symlink_metadata(&git) {
        Ok(meta) if meta.is_dir() => GitDirKind::Repo,
        Ok(meta) if meta.is_file() => match resolve_gitdir_pointer(&git) {
            Some(main) => GitDirKind::WorktreeOf(main),
            None => GitDirKind::NotGit,
        },
        _ => GitDirKind::NotGit,
    }
}

/// Resolve a `.git` pointer file to the owning repository's workdir.
///
/// The pointer looks like `gitdir: /path/to/main/.git/worktrees/<name>`;
/// the workdir is everything before the `.git` component.
fn resolve_gitdir_pointer(git_file: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(git_file).ok()?;
    let gitdir = content.strip_prefix("gitdir:")?.trim();
    let gitdir_path = Path::new(gitdir);

    let mut workdir = PathBuf::new();
    for component in gitdir_path.components() {
        if component.as_os_str() == ".git" {
            return if workdir.as_os_str().is_empty() {
                None
            } else {
                Some(workdir)
            };
        }
        workdir.push(component.as_os_str());
    }
    None
}

/// The shared feature label: the directory name with the owning
/// repository's name prefix stripped (`app-auth` of `app` → `auth`).
fn worktree_label(dir: &Path, main: &Path) -> Option<String> {
    let dir_name = dir.file_name()?.to_string_lossy();
    let main_name = main.file_name()?.to_string_lossy();
    dir_name
        .strip_prefix(&format!("{main_name}-"))
        .map(str::to_owned)
}

fn sorted_subdirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
