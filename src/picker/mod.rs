//! The filter/sort/group engine.
//!
//! A pure, total function from the merged model plus the user's mode
//! state to the exact ordered list to display. No caching, no
//! incremental state: it is recomputed eagerly on every input change,
//! and rendering displays its output verbatim.

mod ecosystems;
mod grouping;
mod search;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::git::GitStatus;
use crate::project::Project;

/// Everything the engine looks at. All references; the engine never
/// mutates its inputs.
pub struct PickerInput<'a> {
    /// Full discovered project list, in discovery order
    pub projects: &'a [Project],
    /// Current filter query (empty = browse)
    pub query: &'a str,
    /// Ecosystem-picker sub-mode; ignores focus and dirty filters
    pub ecosystem_picker: bool,
    /// Focused project path (normalized), if any
    pub focused_path: Option<&'a Path>,
    /// Show only dirty projects (plus their group ancestors)
    pub filter_dirty: bool,
    /// Hide worktrees under their parents
    pub worktrees_folded: bool,
    /// Identifiers of sessions currently running in the multiplexer
    pub running: &'a HashSet<String>,
    /// Git statuses keyed by normalized path (drives the dirty filter)
    pub git: &'a HashMap<PathBuf, GitStatus>,
}

/// Compute the ordered list to display.
///
/// Mode precedence: ecosystem picker, then focus narrowing + dirty
/// filter, then one of the three query branches. Stability (original
/// discovery order) is the sole tie-break outside ecosystem-picker
/// mode.
pub fn filter_projects(input: &PickerInput) -> Vec<Project> {
    if input.ecosystem_picker {
        return clone_all(ecosystems::picker_list(input.projects, input.query));
    }

    let mut working = grouping::narrow_by_focus(input.projects, input.focused_path);
    if input.filter_dirty {
        grouping::retain_dirty_with_ancestors(&mut working, input.git);
    }

    let focused = input
        .focused_path
        .and_then(|path| working.iter().copied().find(|p| p.path == path));

    let ordered = if !input.query.is_empty() {
        search::ranked(&working, input.query, input.worktrees_folded, input.running)
    } else if let Some(focused) = focused {
        grouping::layout_focused(&working, focused, input.worktrees_folded)
    } else {
        grouping::browse_unfocused(&working, input.running)
    };

    clone_all(ordered)
}

fn clone_all(projects: Vec<&Project>) -> Vec<Project> {
    projects.into_iter().cloned().collect()
}

/// Match quality of a name against a query, best match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchQuality {
    None,
    Substring,
    Prefix,
    Exact,
}

pub(crate) fn match_quality(name: &str, query_lower: &str) -> MatchQuality {
    let name_lower = name.to_lowercase();
    if name_lower == query_lower {
        MatchQuality::Exact
    } else if name_lower.starts_with(query_lower) {
        MatchQuality::Prefix
    } else if name_lower.contains(query_lower) {
        MatchQuality::Substring
    } else {
        MatchQuality::None
    }
}


#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;

    use super::fixtures::*;
    use super::*;
    use crate::project::ProjectKind;

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    fn input<'a>(
        projects: &'a [Project],
        query: &'a str,
        running: &'a HashSet<String>,
        git: &'a HashMap<PathBuf, GitStatus>,
    ) -> PickerInput<'a> {
        PickerInput {
            projects,
            query,
            ecosystem_picker: false,
            focused_path: None,
            filter_dirty: false,
            worktrees_folded: false,
            running,
            git,
        }
    }

    /// The scenario from the design review: ecosystem root "app" with
    /// sub-project "api", plus a standalone worktree "lib-wt".
    fn scenario_projects() -> Vec<Project> {
        vec![
            project("/w/app", ProjectKind::EcosystemRoot),
            sub_project("/w/app/api", "/w/app"),
            worktree("/w/lib-wt", ProjectKind::StandaloneWorktree, "/w/lib"),
        ]
    }

    #[test]
    fn default_unfocused_view_shows_only_top_level_non_worktrees() {
        let projects = scenario_projects();
        let running: HashSet<String> = ["w_app".to_string()].into();
        let git = HashMap::new();

        let out = filter_projects(&input(&projects, "", &running, &git));

        // "api" is a sub-project (shown only under focus), "lib-wt" is
        // an inactive worktree (hidden by default).
        assert_eq!(names(&out), vec!["app"]);
    }

    #[test]
    fn output_is_always_a_subset_of_the_input() {
        let projects = scenario_projects();
        let running = HashSet::new();
        let git = HashMap::new();

        for query in ["", "ap", "zzz"] {
            let out = filter_projects(&input(&projects, query, &running, &git));
            for p in &out {
                assert!(projects.iter().any(|orig| orig.path == p.path));
            }
        }
    }

    #[test]
    fn engine_is_idempotent() {
        let projects = scenario_projects();
        let running: HashSet<String> = ["w_app".to_string()].into();
        let git = HashMap::new();
        let i = input(&projects, "ap", &running, &git);

        assert_eq!(filter_projects(&i), filter_projects(&i));
    }

    #[test]
    fn empty_project_list_yields_empty_output() {
        let running = HashSet::new();
        let git = HashMap::new();
        let out = filter_projects(&input(&[], "query", &running, &git));
        assert!(out.is_empty());
    }

    #[test]
    fn query_ap_ranks_app_in_active_bucket_without_subprojects() {
        let projects = scenario_projects();
        let running: HashSet<String> = ["w_app".to_string()].into();
        let git = HashMap::new();

        let out = filter_projects(&input(&projects, "ap", &running, &git));

        // "api" would match by name, but sub-projects only enter the
        // working set when a focus narrows to their ecosystem.
        assert_eq!(names(&out), vec!["app"]);
    }

    #[test]
    fn focus_invariant_holds_for_ecosystem_focus() {
        let projects = scenario_projects();
        let running = HashSet::new();
        let git = HashMap::new();
        let focused = PathBuf::from("/w/app");

        let mut i = input(&projects, "", &running, &git);
        i.focused_path = Some(&focused);
        let out = filter_projects(&i);

        for p in &out {
            let reachable = p.path == focused
                || p.parent_ecosystem_path.as_deref() == Some(focused.as_path())
                || p.parent_path.as_deref() == Some(focused.as_path());
            assert!(reachable, "{} not reachable from focus", p.name);
        }
        assert_eq!(out[0].name, "app");
        assert!(out.iter().any(|p| p.name == "api"));
    }

    #[test]
    fn match_quality_ordering() {
        assert_eq!(match_quality("app", "app"), MatchQuality::Exact);
        assert_eq!(match_quality("apple", "app"), MatchQuality::Prefix);
        assert_eq!(match_quality("my-app", "app"), MatchQuality::Substring);
        assert_eq!(match_quality("web", "app"), MatchQuality::None);
        assert!(MatchQuality::Exact > MatchQuality::Prefix);
        assert!(MatchQuality::Prefix > MatchQuality::Substring);
        assert!(MatchQuality::Substring > MatchQuality::None);
    }

    #[test]
    fn match_quality_is_case_insensitive() {
        assert_eq!(match_quality("App", "app"), MatchQuality::Exact);
        assert_eq!(match_quality("APPLE", "app"), MatchQuality::Prefix);
    }
}
