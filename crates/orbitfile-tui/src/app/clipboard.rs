//! Clipboard holding the pending copy or cut selection.

use std::path::PathBuf;

/// Clipboard mode determines paste behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardMode {
    #[default]
    Empty,
    Copy,
    Cut,
}

/// Items waiting to be pasted.
///
/// Paste reads without clearing, so a copy can be pasted repeatedly. A cut is
/// cleared once its paste finishes, and only if nothing new was copied or cut
/// in the meantime.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<PathBuf>,
    mode: ClipboardMode,
}

impl Clipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with items to copy.
    pub fn copy(&mut self, items: impl IntoIterator<Item = PathBuf>) {
        self.set(items, ClipboardMode::Copy);
    }

    /// Replace the contents with items to move.
    pub fn cut(&mut self, items: impl IntoIterator<Item = PathBuf>) {
        self.set(items, ClipboardMode::Cut);
    }

    fn set(&mut self, items: impl IntoIterator<Item = PathBuf>, mode: ClipboardMode) {
        self.items = items.into_iter().collect();
        self.mode = if self.items.is_empty() {
            ClipboardMode::Empty
        } else {
            mode
        };
    }

    /// Paths waiting to be pasted, in selection order.
    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    /// Current clipboard mode.
    pub fn mode(&self) -> ClipboardMode {
        self.mode
    }

    /// Whether a paste should move the items.
    pub fn is_cut(&self) -> bool {
        self.mode == ClipboardMode::Cut
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty the clipboard.
    pub fn clear(&mut self) {
        self.items.clear();
        self.mode = ClipboardMode::Empty;
    }

    /// Clear only if the clipboard still holds exactly `items`.
    pub fn clear_if_matches(&mut self, items: &[PathBuf]) -> bool {
        if self.items.as_slice() == items {
            self.clear();
            true
        } else {
            false
        }
    }
}
