//! Cursor and render-window navigation for the virtualized process list.

use super::constants::{LINES_PER_PROCESS, MIN_PROCESS_VIEW_HEIGHT};

/// Number of entries that fit in a view of `height` lines.
///
/// Each entry takes [`LINES_PER_PROCESS`] lines; the last one may drop its
/// trailing blank line.
pub fn visible_count(height: usize) -> usize {
    (height + 1) / LINES_PER_PROCESS
}

/// Cursor plus the index of the first rendered entry.
///
/// After every move `render_start <= cursor <= render_start + visible - 1`,
/// or both are 0 when the list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListWindow {
    cursor: usize,
    render_start: usize,
}

impl ListWindow {
    /// Currently selected index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the first rendered entry.
    pub fn render_start(&self) -> usize {
        self.render_start
    }

    /// Move the cursor up, wrapping to the last entry.
    pub fn up(&mut self, count: usize, height: usize) {
        let visible = Self::visible(height);
        if count == 0 {
            *self = Self::default();
            return;
        }
        self.clamp(count, visible);

        if self.cursor > 0 {
            self.cursor -= 1;
            if self.cursor < self.render_start {
                self.render_start = self.cursor;
            }
        } else {
            self.cursor = count - 1;
            self.render_start = count.saturating_sub(visible);
        }
    }

    /// Move the cursor down, wrapping to the first entry.
    pub fn down(&mut self, count: usize, height: usize) {
        let visible = Self::visible(height);
        if count == 0 {
            *self = Self::default();
            return;
        }
        self.clamp(count, visible);

        if self.cursor + 1 < count {
            self.cursor += 1;
            if self.cursor > self.render_start + visible - 1 {
                self.render_start = self.cursor + 1 - visible;
            }
        } else {
            self.cursor = 0;
            self.render_start = 0;
        }
    }

    /// Pull the window back over the cursor after the list or view shrank.
    pub fn clamp(&mut self, count: usize, visible: usize) {
        let visible = visible.max(1);
        if count == 0 {
            *self = Self::default();
            return;
        }
        self.cursor = self.cursor.min(count - 1);
        if self.render_start > self.cursor {
            self.render_start = self.cursor;
        }
        if self.cursor >= self.render_start + visible {
            self.render_start = self.cursor + 1 - visible;
        }
    }

    fn visible(height: usize) -> usize {
        visible_count(height.max(MIN_PROCESS_VIEW_HEIGHT)).max(1)
    }
}
