//! Configuration management for workmux.
//!
//! Handles persistence and loading of user settings: workspace roots,
//! refresh cadence, agent command names.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directories scanned for projects
    #[serde(default = "default_workspace_roots")]
    pub workspace_roots: Vec<PathBuf>,

    /// Background refresh period in milliseconds (500-60000)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Process names recognized as interactive agents
    #[serde(default = "default_agent_commands")]
    pub agent_commands: Vec<String>,

    /// Branch used for ahead/behind-of-main comparisons
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
}

fn default_workspace_roots() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| vec![home.join("work")])
        .unwrap_or_default()
}

fn default_tick_interval_ms() -> u64 {
    3000
}

fn default_agent_commands() -> Vec<String> {
    vec!["claude".to_string()]
}

fn default_main_branch() -> String {
    "main".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_roots: default_workspace_roots(),
            tick_interval_ms: default_tick_interval_ms(),
            agent_commands: default_agent_commands(),
            main_branch: default_main_branch(),
        }
    }
}

impl Config {
    /// Load configuration from disk, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate();

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Clamp out-of-range values instead of failing the load
    pub fn validate(&mut self) {
        self.tick_interval_ms = self.tick_interval_ms.clamp(500, 60_000);
        if self.main_branch.trim().is_empty() {
            self.main_branch = default_main_branch();
        }
        if self.agent_commands.is_empty() {
            self.agent_commands = default_agent_commands();
        }
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;

        Ok(config_dir.join("workmux").join("config.json"))
    }
}
