//! Lightweight per-project metadata: note files and plan checkboxes.

mod notes;
mod plans;

pub use notes::{fetch_note_counts, NoteCounts};
pub use plans::{fetch_plan_stats, PlanStats};
