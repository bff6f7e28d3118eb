//! Focus narrowing, dirty filtering, group activity, and the two
//! query-empty layout branches.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::git::GitStatus;
use crate::project::Project;

/// Narrow the working set by the current focus.
///
/// - No focus (or a focus path that no longer exists): every project
///   except ecosystem-owned ones — sub-projects and their worktrees
///   are reachable only by focusing their ecosystem.
/// - Focus on a non-ecosystem project: that project plus its own
///   worktrees.
/// - Focus on an ecosystem worktree carrying a worktree name: the
///   focused project plus every project sharing that name.
/// - Focus on an ecosystem root: the focused project, its direct
///   sub-projects, and the worktrees of all of those.
pub(crate) fn narrow_by_focus<'a>(
    projects: &'a [Project],
    focused_path: Option<&Path>,
) -> Vec<&'a Project> {
    let focused = focused_path.and_then(|path| projects.iter().find(|p| p.path == path));

    let Some(focused) = focused else {
        return projects
            .iter()
            .filter(|p| p.parent_ecosystem_path.is_none())
            .collect();
    };

    let mut working: Vec<&Project> = vec![focused];

    if !focused.is_ecosystem() {
        extend_with_child_worktrees(&mut working, projects);
        return working;
    }

    if focused.is_worktree() && focused.worktree_name.is_some() {
        let label = focused.worktree_name.as_deref();
        working.extend(
            projects
                .iter()
                .filter(|p| p.path != focused.path && p.worktree_name.as_deref() == label),
        );
    } else {
        working.extend(projects.iter().filter(|p| {
            !p.is_worktree()
                && p.parent_ecosystem_path.as_deref() == Some(focused.path.as_path())
        }));
        extend_with_child_worktrees(&mut working, projects);
    }

    working
}

/// Pull in worktrees of current working-set members from the full
/// project list, preserving discovery order.
fn extend_with_child_worktrees<'a>(working: &mut Vec<&'a Project>, projects: &'a [Project]) {
    let member_paths: HashSet<&Path> = working.iter().map(|p| p.path.as_path()).collect();
    working.extend(projects.iter().filter(|p| {
        p.is_worktree()
            && !member_paths.contains(p.path.as_path())
            && p.parent_path
                .as_deref()
                .is_some_and(|parent| member_paths.contains(parent))
    }));
}

/// Reduce the working set to dirty projects plus their group
/// ancestors, so hierarchy context survives even when the ancestor
/// itself is clean. Runs to a fixpoint so grandparents are retained
/// through intermediate nodes. A membership filter: order is
/// untouched.
pub(crate) fn retain_dirty_with_ancestors(
    working: &mut Vec<&Project>,
    git: &HashMap<PathBuf, GitStatus>,
) {
    let mut keep: HashSet<&Path> = working
        .iter()
        .filter(|p| git.get(&p.path).is_some_and(GitStatus::is_dirty))
        .map(|p| p.path.as_path())
        .collect();

    loop {
        let mut added = false;
        for p in working.iter() {
            if !keep.contains(p.path.as_path()) {
                continue;
            }
            for ancestor in [p.parent_path.as_deref(), p.parent_ecosystem_path.as_deref()]
                .into_iter()
                .flatten()
            {
                if keep.insert(ancestor) {
                    added = true;
                }
            }
        }
        if !added {
            break;
        }
    }

    working.retain(|p| keep.contains(p.path.as_path()));
}

/// Group keys with at least one running member within the working set.
pub(crate) fn active_groups<'a>(
    working: &[&'a Project],
    running: &HashSet<String>,
) -> HashSet<&'a Path> {
    working
        .iter()
        .filter(|p| running.contains(&p.identifier()))
        .map(|p| p.group_key())
        .collect()
}

/// Query empty, no focus: active groups first (stable), then drop
/// worktrees without a running session — only active worktrees earn a
/// place in the default list.
pub(crate) fn browse_unfocused<'a>(
    working: &[&'a Project],
    running: &HashSet<String>,
) -> Vec<&'a Project> {
    let active = active_groups(working, running);

    let mut ordered: Vec<&Project> = Vec::with_capacity(working.len());
    ordered.extend(working.iter().filter(|p| active.contains(p.group_key())));
    ordered.extend(working.iter().filter(|p| !active.contains(p.group_key())));

    ordered
        .into_iter()
        .filter(|p| !p.is_worktree() || running.contains(&p.identifier()))
        .collect()
}

/// Query empty, with focus: the focused project first, its own
/// worktrees right under it, then each non-worktree member with its
/// worktrees, all in original order. Worktrees whose parent is not in
/// the output (ecosystem-worktree focus, dangling parents) are
/// appended ungrouped rather than dropped.
pub(crate) fn layout_focused<'a>(
    working: &[&'a Project],
    focused: &'a Project,
    worktrees_folded: bool,
) -> Vec<&'a Project> {
    let mut worktrees_by_parent: HashMap<&Path, Vec<&Project>> = HashMap::new();
    let mut orphans: Vec<&Project> = Vec::new();

    let parent_paths: HashSet<&Path> = working
        .iter()
        .filter(|p| !p.is_worktree())
        .map(|p| p.path.as_path())
        .collect();

    for p in working {
        if !p.is_worktree() || p.path == focused.path {
            continue;
        }
        match p.parent_path.as_deref() {
            Some(parent) if parent_paths.contains(parent) => {
                worktrees_by_parent.entry(parent).or_default().push(p);
            }
            _ => orphans.push(p),
        }
    }

    let mut out: Vec<&Project> = vec![focused];
    if !worktrees_folded {
        if let Some(own) = worktrees_by_parent.remove(focused.path.as_path()) {
            out.extend(own);
        }
    }

    for p in working {
        if p.is_worktree() || p.path == focused.path {
            continue;
        }
        out.push(p);
        if !worktrees_folded {
            if let Some(children) = worktrees_by_parent.remove(p.path.as_path()) {
                out.extend(children);
            }
        }
    }

    // Never drop: worktrees that found no grouping slot still render.
    out.extend(orphans);
    out
}
