//! One-key shortcut bindings: key ↔ project mappings persisted into
//! the multiplexer's configuration.

pub mod tmux;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::project::normalize_path;

/// The fixed shortcut alphabet, in assignment-suggestion order.
pub const KEY_ALPHABET: &[char] = &[
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o',
    'p', 'z', 'x', 'c', 'v', 'b', 'n', 'm',
];

/// One persisted shortcut slot. A record always has a key; a record
/// with no project path is an allocated-but-unbound slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Shortcut character from [`KEY_ALPHABET`]
    pub key: char,
    /// Bound project path; `None` = unbound slot
    #[serde(default)]
    pub project_path: Option<PathBuf>,
    /// Display cache of the bound project's basename
    #[serde(default)]
    pub repository_name: String,
}

/// Persistence seam for the key map: the live store drives a tmux
/// config backend, tests drive an in-memory double.
pub trait KeyMapBackend {
    /// Read the authoritative record list.
    fn load_records(&mut self) -> Result<Vec<SessionRecord>>;
    /// Replace the persisted record list.
    fn save_records(&mut self, records: &[SessionRecord]) -> Result<()>;
    /// Regenerate derived multiplexer bindings from the records.
    fn regenerate_bindings(&mut self, records: &[SessionRecord]) -> Result<()>;
    /// Ask the live multiplexer to reload its configuration.
    fn reload_config(&mut self) -> Result<()>;
}

/// In-memory record list plus a normalized-path lookup, kept in sync
/// with a best-effort persistence backend.
pub struct KeyBindingStore<B: KeyMapBackend> {
    records: Vec<SessionRecord>,
    by_path: HashMap<PathBuf, char>,
    backend: B,
}

impl<B: KeyMapBackend> KeyBindingStore<B> {
    /// Load the store from its backend; an unreadable backend starts
    /// empty rather than failing the picker.
    pub fn load(mut backend: B) -> Self {
        let records = backend.load_records().unwrap_or_else(|err| {
            warn!(%err, "key map unreadable, starting empty");
            Vec::new()
        });
        let by_path = build_lookup(&records);
        Self {
            records,
            by_path,
            backend,
        }
    }

    /// The key currently bound to a project, if any.
    pub fn key_for(&self, path: &Path) -> Option<char> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    /// All records, in slot order.
    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    /// Replace the record list wholesale (refresh from the external
    /// store) and rebuild the lookup.
    pub fn replace_records(&mut self, records: Vec<SessionRecord>) {
        self.by_path = build_lookup(&records);
        self.records = records;
    }

    /// Bind `key` to the project at `path`.
    ///
    /// Conflict resolution: if the project already holds a different
    /// key, the old holder of `key` is evicted (slot kept, binding
    /// blanked) and the project's record moves to `key`; otherwise
    /// the project steals `key` from whatever held it, or a fresh
    /// record is appended. At most one record per key and at most one
    /// record per project survive any sequence of calls.
    pub fn assign(&mut self, path: &Path, name: &str, key: char) {
        let normalized = normalize_path(path);
        let by_key = self.records.iter().position(|r| r.key == key);
        let by_path = self
            .records
            .iter()
            .position(|r| r.project_path.as_deref() == Some(normalized.as_path()));

        match (by_path, by_key) {
            (Some(path_idx), key_idx) if key_idx != Some(path_idx) => {
                // The project moves onto `key`; the key's old holder
                // is evicted to the project's vacated slot, unbound.
                if let Some(key_idx) = key_idx {
                    self.records[key_idx].project_path = None;
                    self.records[key_idx].repository_name = String::new();
                    self.records[key_idx].key = self.records[path_idx].key;
                }
                self.records[path_idx].key = key;
            }
            (Some(_), _) => {
                // Already bound to exactly this key; fall through to
                // persistence so external state converges.
            }
            (None, Some(key_idx)) => {
                self.records[key_idx].project_path = Some(normalized.clone());
                self.records[key_idx].repository_name = name.to_string();
            }
            (None, None) => {
                self.records.push(SessionRecord {
                    key,
                    project_path: Some(normalized.clone()),
                    repository_name: name.to_string(),
                });
            }
        }

        self.persist();
        self.by_path = build_lookup(&self.records);
    }

    /// Unbind the project at `path`, keeping its key slot allocated.
    pub fn clear(&mut self, path: &Path) {
        let normalized = normalize_path(path);
        let Some(idx) = self
            .records
            .iter()
            .position(|r| r.project_path.as_deref() == Some(normalized.as_path()))
        else {
            return;
        };

        self.records[idx].project_path = None;
        self.records[idx].repository_name = String::new();

        self.persist();
        self.by_path.remove(&normalized);

        // Re-read the authoritative list so in-memory state converges
        // with whatever the external store actually accepted.
        match self.backend.load_records() {
            Ok(records) => self.replace_records(records),
            Err(err) => warn!(%err, "key map re-read failed after clear"),
        }
    }

    /// Persist, regenerate, reload — all best-effort. A failure here
    /// leaves in-memory state ahead of disk; the next full reload
    /// corrects it.
    fn persist(&mut self) {
        if let Err(err) = self.backend.save_records(&self.records) {
            warn!(%err, "key map save failed");
        }
        if let Err(err) = self.backend.regenerate_bindings(&self.records) {
            warn!(%err, "key binding regeneration failed");
        }
        if let Err(err) = self.backend.reload_config() {
            warn!(%err, "multiplexer config reload failed");
        }
    }
}

fn build_lookup(records: &[SessionRecord]) -> HashMap<PathBuf, char> {
    records
        .iter()
        .filter_map(|r| r.project_path.clone().map(|path| (path, r.key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend double that remembers what was persisted.
    #[derive(Default)]
    struct MemoryBackend {
        saved: Vec<SessionRecord>,
        regenerations: usize,
        reloads: usize,
        fail_saves: bool,
    }

    impl KeyMapBackend for MemoryBackend {
        fn load_records(&mut self) -> Result<Vec<SessionRecord>> {
            Ok(self.saved.clone())
        }
        fn save_records(&mut self, records: &[SessionRecord]) -> Result<()> {
            if self.fail_saves {
                anyhow::bail!("disk full");
            }
            self.saved = records.to_vec();
            Ok(())
        }
        fn regenerate_bindings(&mut self, _records: &[SessionRecord]) -> Result<()> {
            self.regenerations += 1;
            Ok(())
        }
        fn reload_config(&mut self) -> Result<()> {
            self.reloads += 1;
            Ok(())
        }
    }

    fn store() -> KeyBindingStore<MemoryBackend> {
        KeyBindingStore::load(MemoryBackend::default())
    }

    #[test]
    fn assign_creates_a_record_and_lookup_entry() {
        let mut s = store();
        s.assign(Path::new("/repo"), "repo", 'a');

        assert_eq!(s.key_for(Path::new("/repo")), Some('a'));
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.backend.saved.len(), 1);
        assert_eq!(s.backend.regenerations, 1);
        assert_eq!(s.backend.reloads, 1);
    }

    #[test]
    fn second_project_steals_the_key() {
        let mut s = store();
        s.assign(Path::new("/repo"), "repo", 'a');
        s.assign(Path::new("/repo2"), "repo2", 'a');

        // Exactly one record for 'a', now bound to /repo2; /repo has
        // no key at all.
        let holders: Vec<_> = s.records().iter().filter(|r| r.key == 'a').collect();
        assert_eq!(holders.len(), 1);
        assert_eq!(
            holders[0].project_path.as_deref(),
            Some(normalize_path(Path::new("/repo2")).as_path())
        );
        assert_eq!(holders[0].repository_name, "repo2");
        assert_eq!(s.key_for(Path::new("/repo")), None);
        assert_eq!(s.key_for(Path::new("/repo2")), Some('a'));
    }

    #[test]
    fn rebinding_a_project_evicts_the_keys_old_holder() {
        let mut s = store();
        s.assign(Path::new("/one"), "one", 'a');
        s.assign(Path::new("/two"), "two", 's');
        // Move /two onto 'a': /one's record stays as an unbound slot.
        s.assign(Path::new("/two"), "two", 'a');

        assert_eq!(s.key_for(Path::new("/two")), Some('a'));
        assert_eq!(s.key_for(Path::new("/one")), None);
        // /one's record is now an unbound slot holding /two's vacated
        // key; exactly one record holds 'a'.
        let unbound: Vec<_> = s
            .records()
            .iter()
            .filter(|r| r.project_path.is_none())
            .collect();
        assert_eq!(unbound.len(), 1);
        assert_eq!(unbound[0].key, 's');
        let keys: Vec<char> = s.records().iter().map(|r| r.key).collect();
        assert_eq!(keys.iter().filter(|k| **k == 'a').count(), 1);
    }

    #[test]
    fn no_two_records_share_a_key_or_a_path_after_any_sequence() {
        let mut s = store();
        s.assign(Path::new("/a"), "a", 'a');
        s.assign(Path::new("/b"), "b", 's');
        s.assign(Path::new("/a"), "a", 's');
        s.assign(Path::new("/c"), "c", 'a');
        s.assign(Path::new("/b"), "b", 'a');
        s.clear(Path::new("/c"));
        s.assign(Path::new("/c"), "c", 'd');

        let mut keys: Vec<char> = s.records().iter().map(|r| r.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), s.records().len(), "duplicate key slots");

        let mut paths: Vec<&Path> = s
            .records()
            .iter()
            .filter_map(|r| r.project_path.as_deref())
            .collect();
        paths.sort_unstable();
        let before = paths.len();
        paths.dedup();
        assert_eq!(paths.len(), before, "duplicate bound paths");
    }

    #[test]
    fn clear_keeps_the_slot_but_removes_the_binding() {
        let mut s = store();
        s.assign(Path::new("/repo"), "repo", 'a');
        s.clear(Path::new("/repo"));

        assert_eq!(s.key_for(Path::new("/repo")), None);
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.records()[0].key, 'a');
        assert!(s.records()[0].project_path.is_none());
        assert!(s.records()[0].repository_name.is_empty());
    }

    #[test]
    fn clear_of_unbound_path_is_a_no_op() {
        let mut s = store();
        s.assign(Path::new("/repo"), "repo", 'a');
        s.clear(Path::new("/other"));
        assert_eq!(s.key_for(Path::new("/repo")), Some('a'));
        assert_eq!(s.records().len(), 1);
    }

    #[test]
    fn save_failure_does_not_block_the_in_memory_binding() {
        let mut s = KeyBindingStore::load(MemoryBackend {
            fail_saves: true,
            ..MemoryBackend::default()
        });
        s.assign(Path::new("/repo"), "repo", 'a');
        // Intended-but-unpersisted state is visible locally.
        assert_eq!(s.key_for(Path::new("/repo")), Some('a'));
    }

    #[test]
    fn lookup_uses_normalized_paths() {
        let mut s = store();
        s.assign(Path::new("/repo/./sub/.."), "repo", 'a');
        assert_eq!(s.key_for(Path::new("/repo")), Some('a'));
    }
}
