//! Cursor movement over the displayed list.

use std::path::Path;

use super::*;

impl<B: KeyMapBackend> App<B> {
    /// Move up, wrapping to the bottom.
    pub fn navigate_up(&mut self) {
        if self.list.is_empty() {
            return;
        }
        self.cursor = if self.cursor == 0 {
            self.list.len() - 1
        } else {
            self.cursor - 1
        };
        self.version += 1;
    }

    /// Move down, wrapping to the top.
    pub fn navigate_down(&mut self) {
        if self.list.is_empty() {
            return;
        }
        self.cursor = if self.cursor >= self.list.len() - 1 {
            0
        } else {
            self.cursor + 1
        };
        self.version += 1;
    }

    pub fn jump_to_first(&mut self) {
        self.cursor = 0;
        self.version += 1;
    }

    pub fn jump_to_last(&mut self) {
        self.cursor = self.list.len().saturating_sub(1);
        self.version += 1;
    }

    /// After a list rebuild: find the previously selected project by
    /// path, else clamp into range, defaulting to the top.
    pub(super) fn restore_cursor(&mut self, previous: Option<&Path>) {
        if let Some(previous) = previous {
            if let Some(idx) = self.list.iter().position(|p| p.path == previous) {
                self.cursor = idx;
                return;
            }
        }
        self.cursor = self.cursor.min(self.list.len().saturating_sub(1));
    }
}
