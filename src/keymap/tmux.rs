//! tmux-backed key map persistence.
//!
//! Records live as JSON next to the rest of workmux's state; the
//! derived `bindings.conf` is a generated tmux snippet the user
//! sources from their tmux.conf, rebuilt on every change and reloaded
//! into the running server.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};

use crate::project::identifier_for_path;

use super::{KeyMapBackend, SessionRecord};

/// Prefix table the generated bindings hang off (`prefix + o + key`).
const BINDING_TABLE: &str = "workmux";

pub struct TmuxKeyMap {
    records_path: PathBuf,
    bindings_path: PathBuf,
}

impl TmuxKeyMap {
    /// Backend rooted at the workmux config directory.
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("workmux");
        fs::create_dir_all(&dir).context("Failed to create config directory")?;
        Ok(Self::at(dir))
    }

    /// Backend rooted at an explicit directory (tests).
    pub fn at(dir: PathBuf) -> Self {
        Self {
            records_path: dir.join("keymap.json"),
            bindings_path: dir.join("bindings.conf"),
        }
    }
}

impl KeyMapBackend for TmuxKeyMap {
    fn load_records(&mut self) -> Result<Vec<SessionRecord>> {
        if !self.records_path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.records_path)
            .with_context(|| format!("Failed to read {}", self.records_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.records_path.display()))
    }

    fn save_records(&mut self, records: &[SessionRecord]) -> Result<()> {
        if let Some(parent) = self.records_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content =
            serde_json::to_string_pretty(records).context("Failed to serialize key map")?;
        fs::write(&self.records_path, content)
            .with_context(|| format!("Failed to write {}", self.records_path.display()))
    }

    fn regenerate_bindings(&mut self, records: &[SessionRecord]) -> Result<()> {
        let mut out = String::from("# Generated by workmux; do not edit.\n");
        for record in records {
            let Some(path) = &record.project_path else {
                continue;
            };
            let identifier = identifier_for_path(path);
            let command = format!(
                "tmux switch-client -t '{identifier}' \
                 || tmux new-session -d -s '{identifier}' -c {} && tmux switch-client -t '{identifier}'",
                shell_quote(&path.display().to_string()),
            );
            out.push_str(&format!(
                "bind-key -T {BINDING_TABLE} {} run-shell \"{}\"\n",
                record.key,
                tmux_quote(&command),
            ));
        }
        fs::write(&self.bindings_path, out)
            .with_context(|| format!("Failed to write {}", self.bindings_path.display()))
    }

    fn reload_config(&mut self) -> Result<()> {
        let output = Command::new("tmux")
            .arg("source-file")
            .arg(&self.bindings_path)
            .output()
            .context("Failed to run tmux source-file")?;
        if !output.status.success() {
            anyhow::bail!(
                "tmux source-file failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Single-quote a string for the shell, closing around embedded `'`.
/// Identifiers are already shell-safe by construction; paths are not.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Escape a string for a double-quoted tmux config argument.
fn tmux_quote(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}
