//! Note-file counts per project.
//!
//! A project's notes are the markdown files under `<project>/notes/`.
//! Notes moved into `notes/archive/` count as closed; everything else
//! is open.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::project::normalize_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteCounts {
    pub total: usize,
    pub open: usize,
}

/// Full snapshot over the given project paths. Projects without a
/// notes directory are absent from the map.
pub fn fetch_note_counts(paths: &[PathBuf]) -> HashMap<PathBuf, NoteCounts> {
    let mut out = HashMap::new();
    for path in paths {
        if let Some(counts) = count_notes(path) {
            out.insert(normalize_path(path), counts);
        }
    }
    out
}

fn count_notes(project: &Path) -> Option<NoteCounts> {
    let notes_dir = project.join("notes");
    let open = markdown_count(&notes_dir)?;
    let archived = markdown_count(&notes_dir.join("archive")).unwrap_or(0);
    Some(NoteCounts {
        total: open + archived,
        open,
    })
}

/// Markdown files directly inside `dir`; None if the directory does
/// not exist or is unreadable.
fn markdown_count(dir: &Path) -> Option<usize> {
    let entries = fs::read_dir(dir).ok()?;
    let count = entries
        .flatten()
        .filter(|e| {
            e.path().extension().is_some_and(|ext| ext == "md")
                && e.file_type().map(|t| t.is_file()).unwrap_or(false)
        })
        .count();
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_open_and_archived_notes() {
        let tmp = tempfile::tempdir().unwrap();
        let notes = tmp.path().join("notes");
        fs::create_dir_all(notes.join("archive")).unwrap();
        fs::write(notes.join("todo.md"), "x").unwrap();
        fs::write(notes.join("ideas.md"), "x").unwrap();
        fs::write(notes.join("archive").join("old.md"), "x").unwrap();
        fs::write(notes.join("not-a-note.txt"), "x").unwrap();

        let counts = count_notes(tmp.path()).unwrap();
        assert_eq!(counts, NoteCounts { total: 3, open: 2 });
    }

    #[test]
    fn project_without_notes_dir_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(count_notes(tmp.path()).is_none());

        let map = fetch_note_counts(&[tmp.path().to_path_buf()]);
        assert!(map.is_empty());
    }

    #[test]
    fn snapshot_keys_are_normalized() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("notes")).unwrap();
        let dotted = tmp.path().join(".");

        let map = fetch_note_counts(&[dotted]);
        assert!(map.contains_key(&normalize_path(tmp.path())));
    }
}
