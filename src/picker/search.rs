//! Query-ranked view: the three-pass name match over the working set.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::project::Project;

use super::grouping::active_groups;
use super::{match_quality, MatchQuality};

/// Rank the working set against a non-empty query.
///
/// Pass 1 scores every non-worktree name; pass 2 (skipped when
/// worktrees are folded) scores worktrees and records which parents
/// gained a matching child; pass 3 assembles parent-then-worktrees
/// runs inside an active bucket followed by an inactive bucket,
/// descending match quality, stable within equal quality. Matching is
/// against names only, never paths.
pub(crate) fn ranked<'a>(
    working: &[&'a Project],
    query: &str,
    worktrees_folded: bool,
    running: &HashSet<String>,
) -> Vec<&'a Project> {
    let query_lower = query.to_lowercase();

    // Pass 1: parents (all non-worktree projects).
    let mut parent_quality: HashMap<&Path, MatchQuality> = HashMap::new();
    let mut matched_parents: HashSet<&Path> = HashSet::new();
    for p in working.iter().filter(|p| !p.is_worktree()) {
        let quality = match_quality(&p.name, &query_lower);
        parent_quality.insert(p.path.as_path(), quality);
        if quality > MatchQuality::None {
            matched_parents.insert(p.path.as_path());
        }
    }

    // Pass 2: worktrees, remembering parents with a matching child.
    let mut worktree_quality: HashMap<&Path, MatchQuality> = HashMap::new();
    let mut parents_with_matching_child: HashSet<&Path> = HashSet::new();
    if !worktrees_folded {
        for p in working.iter().filter(|p| p.is_worktree()) {
            let quality = match_quality(&p.name, &query_lower);
            worktree_quality.insert(p.path.as_path(), quality);
            if quality > MatchQuality::None {
                if let Some(parent) = p.parent_path.as_deref() {
                    parents_with_matching_child.insert(parent);
                }
            }
        }
    }

    // Pass 3: membership, buckets, and interleaved ordering.
    let mut included_parents: Vec<&Project> = working
        .iter()
        .copied()
        .filter(|p| !p.is_worktree())
        .filter(|p| {
            matched_parents.contains(p.path.as_path())
                || parents_with_matching_child.contains(p.path.as_path())
        })
        .collect();
    included_parents.sort_by_key(|p| {
        std::cmp::Reverse(
            parent_quality
                .get(p.path.as_path())
                .copied()
                .unwrap_or(MatchQuality::None),
        )
    });

    let mut included_worktrees: HashMap<&Path, Vec<&Project>> = HashMap::new();
    if !worktrees_folded {
        for p in working.iter().filter(|p| p.is_worktree()) {
            let own = worktree_quality
                .get(p.path.as_path())
                .copied()
                .unwrap_or(MatchQuality::None);
            let parent_matched = p
                .parent_path
                .as_deref()
                .is_some_and(|parent| matched_parents.contains(parent));
            if own > MatchQuality::None || parent_matched {
                if let Some(parent) = p.parent_path.as_deref() {
                    included_worktrees.entry(parent).or_default().push(p);
                }
            }
        }
        for children in included_worktrees.values_mut() {
            children.sort_by_key(|p| {
                std::cmp::Reverse(
                    worktree_quality
                        .get(p.path.as_path())
                        .copied()
                        .unwrap_or(MatchQuality::None),
                )
            });
        }
    }

    let active = active_groups(working, running);

    let mut out: Vec<&Project> = Vec::new();
    for wanted_active in [true, false] {
        for parent in included_parents
            .iter()
            .filter(|p| active.contains(p.group_key()) == wanted_active)
        {
            out.push(parent);
            if let Some(children) = included_worktrees.get(parent.path.as_path()) {
                out.extend(children.iter().copied());
            }
        }
    }
    out
}
