//! Cross-run picker state and the cached project snapshot.
//!
//! Both live as JSON under the workmux config directory. State is
//! written back synchronously after each mutation; failures are logged
//! and swallowed so a read-only disk never blocks the picker.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::project::Project;

/// How the path column renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathDisplayMode {
    #[default]
    Off,
    Compact,
    Full,
}

impl PathDisplayMode {
    pub fn cycle(self) -> Self {
        match self {
            PathDisplayMode::Off => PathDisplayMode::Compact,
            PathDisplayMode::Compact => PathDisplayMode::Full,
            PathDisplayMode::Full => PathDisplayMode::Off,
        }
    }
}

/// Overall list layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Tree,
    Table,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Tree => ViewMode::Table,
            ViewMode::Table => ViewMode::Tree,
        }
    }
}

/// Which enrichment columns render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentToggles {
    #[serde(default = "enabled")]
    pub git: bool,
    #[serde(default = "enabled")]
    pub agents: bool,
    #[serde(default = "enabled")]
    pub notes: bool,
    #[serde(default = "enabled")]
    pub plans: bool,
}

fn enabled() -> bool {
    true
}

impl Default for EnrichmentToggles {
    fn default() -> Self {
        Self {
            git: true,
            agents: true,
            notes: true,
            plans: true,
        }
    }
}

/// Per-user picker state surviving restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionizerState {
    #[serde(default)]
    pub focused_path: Option<PathBuf>,
    #[serde(default)]
    pub worktrees_folded: bool,
    #[serde(default)]
    pub toggles: EnrichmentToggles,
    #[serde(default)]
    pub path_display_mode: PathDisplayMode,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl SessionizerState {
    /// Load state, defaulting (with a warning) on any read or parse
    /// failure.
    pub fn load() -> Self {
        match state_path().map(|p| Self::load_from(&p)) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "no config directory, using default state");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
            .unwrap_or_else(|err| {
                warn!(%err, path = %path.display(), "state unreadable, using defaults");
                Self::default()
            })
    }

    /// Best-effort synchronous write-back.
    pub fn save(&self) {
        let result = state_path().and_then(|path| self.save_to(&path));
        if let Err(err) = result {
            warn!(%err, "failed to save picker state");
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Cached discovery snapshot, shown provisionally while the first real
/// scan runs.
pub fn load_project_cache() -> Vec<Project> {
    let Ok(path) = cache_path() else {
        return Vec::new();
    };
    if !path.exists() {
        return Vec::new();
    }
    fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
        .unwrap_or_else(|err| {
            warn!(%err, "project cache unreadable, cold start");
            Vec::new()
        })
}

/// Best-effort cache write after each successful discovery.
pub fn save_project_cache(projects: &[Project]) {
    let result = cache_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string(projects).context("Failed to serialize cache")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    });
    if let Err(err) = result {
        warn!(%err, "failed to save project cache");
    }
}

fn state_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("workmux")
        .join("state.json"))
}

fn cache_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not find config directory")?
        .join("workmux")
        .join("projects-cache.json"))
}
