//! Plan checkbox stats per project.
//!
//! Plans are `PLAN.md` at the project root plus any markdown files
//! under `<project>/plans/`; stats count GitHub-style task checkboxes
//! across all of them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::project::normalize_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total: usize,
    pub done: usize,
}

/// Full snapshot over the given project paths. Projects without any
/// plan file are absent from the map.
pub fn fetch_plan_stats(paths: &[PathBuf]) -> HashMap<PathBuf, PlanStats> {
    let mut out = HashMap::new();
    for path in paths {
        if let Some(stats) = collect_stats(path) {
            out.insert(normalize_path(path), stats);
        }
    }
    out
}

fn collect_stats(project: &Path) -> Option<PlanStats> {
    let mut found_any = false;
    let mut stats = PlanStats::default();

    let root_plan = project.join("PLAN.md");
    if let Ok(content) = fs::read_to_string(&root_plan) {
        found_any = true;
        add_checkboxes(&mut stats, &content);
    }

    if let Ok(entries) = fs::read_dir(project.join("plans")) {
        for entry in entries.flatten() {
            if !entry.path().extension().is_some_and(|ext| ext == "md") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(entry.path()) {
                found_any = true;
                add_checkboxes(&mut stats, &content);
            }
        }
    }

    found_any.then_some(stats)
}

fn add_checkboxes(stats: &mut PlanStats, content: &str) {
    for line in content.lines() {
        let trimmed = line.trim_start();
        let trimmed = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .unwrap_or(trimmed);
        if trimmed.starts_with("[ ]") {
            stats.total += 1;
        } else if trimmed.starts_with("[x]") || trimmed.starts_with("[X]") {
            stats.total += 1;
            stats.done += 1;
        }
    }
}
