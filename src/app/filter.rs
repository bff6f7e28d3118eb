//! Filter input handling.

use crossterm::event::{KeyCode, KeyEvent};

use super::*;

/// Result of processing a key in the filter input
pub enum FilterKeyResult {
    /// No visual change needed
    Continue,
    /// Query text changed -- re-filter and reset selection
    QueryChanged,
    /// Enter pressed -- exit insert mode, keep filter text visible
    Deactivated,
}

impl<B: KeyMapBackend> App<B> {
    /// Activate the inline filter input (enter insert mode on filter)
    pub fn activate_filter(&mut self) {
        self.filter_active = true;
        self.query_cursor = self.query.len();
        self.version += 1;
    }

    /// Deactivate the filter input, keeping the text visible
    pub fn deactivate_filter(&mut self) {
        self.filter_active = false;
        self.version += 1;
    }

    /// Clear the filter entirely (text, cursor, active state)
    pub fn clear_filter(&mut self) {
        self.query.clear();
        self.query_cursor = 0;
        self.filter_active = false;
        self.recompute();
    }

    pub fn has_filter(&self) -> bool {
        !self.query.is_empty()
    }

    /// Handle a key event while the filter input is active
    pub fn handle_filter_key(&mut self, key: KeyEvent) -> FilterKeyResult {
        match key.code {
            KeyCode::Char(c) => {
                self.query.insert(self.query_cursor, c);
                self.query_cursor += c.len_utf8();
                FilterKeyResult::QueryChanged
            }
            KeyCode::Backspace => {
                if self.query_cursor > 0 {
                    let prev = previous_boundary(&self.query, self.query_cursor);
                    self.query.remove(prev);
                    self.query_cursor = prev;
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Delete => {
                if self.query_cursor < self.query.len() {
                    self.query.remove(self.query_cursor);
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Left => {
                if self.query_cursor > 0 {
                    self.query_cursor = previous_boundary(&self.query, self.query_cursor);
                }
                FilterKeyResult::Continue
            }
            KeyCode::Right => {
                if self.query_cursor < self.query.len() {
                    self.query_cursor = next_boundary(&self.query, self.query_cursor);
                }
                FilterKeyResult::Continue
            }
            KeyCode::Home => {
                self.query_cursor = 0;
                FilterKeyResult::Continue
            }
            KeyCode::End => {
                self.query_cursor = self.query.len();
                FilterKeyResult::Continue
            }
            KeyCode::Enter => FilterKeyResult::Deactivated,
            _ => FilterKeyResult::Continue,
        }
    }
}

fn previous_boundary(s: &str, from: usize) -> usize {
    let mut idx = from - 1;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn next_boundary(s: &str, from: usize) -> usize {
    let mut idx = from + 1;
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
