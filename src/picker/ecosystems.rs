//! Ecosystem-picker sub-mode: a flat alphabetical directory of
//! ecosystems and their worktrees, ignoring focus and dirty filters.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::project::Project;

/// Keep only ecosystem nodes matching the query (name or path,
/// case-insensitive), then list each main ecosystem followed by its
/// worktrees, both levels sorted case-insensitively by name. This is
/// the one view with an alphabetical order instead of discovery
/// order.
pub(crate) fn picker_list<'a>(projects: &'a [Project], query: &str) -> Vec<&'a Project> {
    let query_lower = query.to_lowercase();
    let matches = |p: &Project| {
        query_lower.is_empty()
            || p.name.to_lowercase().contains(&query_lower)
            || p.path.to_string_lossy().to_lowercase().contains(&query_lower)
    };

    let mut mains: Vec<&Project> = Vec::new();
    let mut seen: HashSet<&Path> = HashSet::new();
    let mut worktrees_by_parent: HashMap<&Path, Vec<&Project>> = HashMap::new();
    let mut orphans: Vec<&Project> = Vec::new();

    for p in projects.iter().filter(|p| p.is_ecosystem() && matches(p)) {
        if p.is_worktree() {
            match p.parent_path.as_deref() {
                Some(parent) => worktrees_by_parent.entry(parent).or_default().push(p),
                None => orphans.push(p),
            }
        } else if seen.insert(p.path.as_path()) {
            mains.push(p);
        }
    }

    mains.sort_by_key(|p| p.name.to_lowercase());

    let mut out: Vec<&Project> = Vec::new();
    for main in mains {
        out.push(main);
        if let Some(mut children) = worktrees_by_parent.remove(main.path.as_path()) {
            children.sort_by_key(|p| p.name.to_lowercase());
            out.extend(children);
        }
    }

    // Worktrees whose main ecosystem did not match (or is gone) still
    // render, at the end, in the same alphabetical order.
    let mut leftovers: Vec<&Project> = worktrees_by_parent
        .into_values()
        .flatten()
        .chain(orphans)
        .collect();
    leftovers.sort_by_key(|p| p.name.to_lowercase());
    out.extend(leftovers);

    out
}
