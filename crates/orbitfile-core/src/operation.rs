//! Operation records and progress events.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Correlation id linking a background executor to its registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u64);

impl OperationId {
    /// Create a new operation id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of background work an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum OperationKind {
    Copy,
    Move,
    #[strum(to_string = "Trash")]
    TrashDelete,
    #[strum(to_string = "Delete")]
    PermanentDelete,
    Compress,
    Extract,
    Encrypt,
    Decrypt,
}

impl OperationKind {
    /// Present tense verb, shown while the operation runs.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Copy => "Copying",
            Self::Move => "Moving",
            Self::TrashDelete => "Trashing",
            Self::PermanentDelete => "Deleting",
            Self::Compress => "Compressing",
            Self::Extract => "Extracting",
            Self::Encrypt => "Encrypting",
            Self::Decrypt => "Decrypting",
        }
    }

    /// Past tense verb, shown once the operation is finished.
    pub fn past_verb(self) -> &'static str {
        match self {
            Self::Copy => "Copied",
            Self::Move => "Moved",
            Self::TrashDelete => "Trashed",
            Self::PermanentDelete => "Deleted",
            Self::Compress => "Compressed",
            Self::Extract => "Extracted",
            Self::Encrypt => "Encrypted",
            Self::Decrypt => "Decrypted",
        }
    }

    /// Whether this kind removes its sources.
    pub fn is_delete(self) -> bool {
        matches!(self, Self::TrashDelete | Self::PermanentDelete)
    }
}

/// Lifecycle state of an operation.
///
/// Transitions only move forward: `Queued -> InProgress -> {Successful | Failed}`.
/// `Queued` may jump straight to a terminal state when an executor fails
/// before reporting any progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum OperationState {
    #[default]
    Queued,
    #[strum(to_string = "In progress")]
    InProgress,
    Successful,
    Failed,
}

impl OperationState {
    /// Check if this is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::InProgress => 1,
            Self::Successful | Self::Failed => 2,
        }
    }

    /// Check whether moving from `self` to `next` respects the lifecycle.
    ///
    /// Staying in the same non-terminal state is allowed; terminal states
    /// never change.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

/// One tracked unit of background filesystem work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Correlation id.
    pub id: OperationId,
    /// Name shown in the process list (usually the first source's base name).
    pub display_name: String,
    /// What the operation does.
    pub kind: OperationKind,
    /// Number of items to process.
    pub total: usize,
    /// Number of items processed so far. Never exceeds `total`.
    pub done: usize,
    /// Lifecycle state.
    pub state: OperationState,
    /// When the operation was registered.
    pub start_time: DateTime<Local>,
    /// When the operation reached a terminal state.
    pub done_time: Option<DateTime<Local>>,
    /// Base name of the item currently being processed.
    pub current_item: String,
    /// User-facing error message for failed operations.
    pub error_message: Option<String>,
}

impl Operation {
    /// Create a queued operation.
    pub fn new(
        id: OperationId,
        display_name: impl Into<String>,
        kind: OperationKind,
        total: usize,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            id,
            current_item: display_name.clone(),
            display_name,
            kind,
            total,
            done: 0,
            state: OperationState::Queued,
            start_time: Local::now(),
            done_time: None,
            error_message: None,
        }
    }

    /// Check if the operation is finished.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Check if the operation is queued or running.
    pub fn is_running(&self) -> bool {
        !self.is_terminal()
    }

    /// Completion ratio in `[0.0, 1.0]`.
    ///
    /// An operation with nothing to count (e.g. a tree of empty directories)
    /// reports as complete.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.done.min(self.total) as f64) / (self.total as f64)
        }
    }

    /// Label shown in the process list.
    pub fn label(&self) -> String {
        if let Some(message) = &self.error_message {
            return message.clone();
        }

        if !self.is_terminal() {
            return format!("{} {}", self.kind.verb(), self.current_item);
        }

        if self.total > 1 {
            format!("{} {} files", self.kind.past_verb(), self.total)
        } else {
            format!("{} {}", self.kind.past_verb(), self.current_item)
        }
    }
}

/// A progress update sent from an executor to the render loop.
///
/// The snapshot replaces the registry entry with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub id: OperationId,
    pub snapshot: Operation,
}

impl ProgressEvent {
    /// Wrap an operation snapshot.
    pub fn new(snapshot: Operation) -> Self {
        Self {
            id: snapshot.id,
            snapshot,
        }
    }

    /// Check if this event carries a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.snapshot.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        use OperationState::*;

        assert!(Queued.can_transition_to(InProgress));
        assert!(Queued.can_transition_to(Failed));
        assert!(InProgress.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Successful));
        assert!(!InProgress.can_transition_to(Queued));
        assert!(!Successful.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_label_follows_state() {
        let mut op = Operation::new(OperationId::new(1), "notes.txt", OperationKind::Copy, 1);
        assert_eq!(op.label(), "Copying notes.txt");

        op.state = OperationState::Successful;
        assert_eq!(op.label(), "Copied notes.txt");

        op.total = 4;
        assert_eq!(op.label(), "Copied 4 files");

        op.error_message = Some("Permission denied".into());
        assert_eq!(op.label(), "Permission denied");
    }

    #[test]
    fn test_ratio_empty_total() {
        let op = Operation::new(OperationId::new(2), "empty", OperationKind::Copy, 0);
        assert_eq!(op.ratio(), 1.0);
    }
}
