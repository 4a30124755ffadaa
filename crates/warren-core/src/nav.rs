//! Navigation history: a stack of visited selectors, each carrying its
//! own cursor offset.

use crate::selector::Selector;

/// One visited page: its selector and the cursor offset (highlighted
/// line for menus, top-of-viewport line for text).
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub selector: Selector,
    pub cursor: usize,
}

/// Ordered stack of visited selectors. Once navigation has started the
/// stack never shrinks below one entry: going back from the first page
/// is a no-op.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit a new selector; the cursor starts at the top.
    pub fn push(&mut self, selector: Selector) {
        self.entries.push(HistoryEntry {
            selector,
            cursor: 0,
        });
    }

    /// Remove the top entry unless it is the only one (floor of 1).
    pub fn pop(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
    }

    /// The current navigation position.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.entries.last_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adjust the current cursor by `delta`, clamped to
    /// `[0, content_len - 1]` (0 when the content is empty).
    pub fn move_cursor(&mut self, delta: isize, content_len: usize) {
        let Some(entry) = self.entries.last_mut() else {
            return;
        };
        let max = content_len.saturating_sub(1) as isize;
        let cursor = (entry.cursor as isize + delta).clamp(0, max);
        entry.cursor = cursor as usize;
    }

    /// Place the current cursor at an absolute offset, clamped the same
    /// way as [`move_cursor`](Self::move_cursor).
    pub fn set_cursor(&mut self, offset: usize, content_len: usize) {
        if let Some(entry) = self.entries.last_mut() {
            entry.cursor = offset.min(content_len.saturating_sub(1));
        }
    }
}
