//! Git status enrichment for discovered projects.

mod status;

pub use status::{fetch_statuses, GitStatus};
