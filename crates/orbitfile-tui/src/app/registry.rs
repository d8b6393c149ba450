//! Process registry: the render loop's table of background operations.

use indexmap::IndexMap;
use tracing::{debug, warn};

use orbitfile_core::{Operation, OperationId, OperationKind, ProgressEvent};

use super::navigation::{ListWindow, visible_count};

/// Insertion-ordered table of operations, owned by the render loop.
///
/// Executors never write here; their snapshots arrive as
/// [`ProgressEvent`]s and are merged by [`ProcessRegistry::apply_progress`].
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    operations: IndexMap<OperationId, Operation>,
    next_id: u64,
    window: ListWindow,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queued operation and return its fresh id.
    pub fn add_operation(
        &mut self,
        name: impl Into<String>,
        kind: OperationKind,
        total: usize,
    ) -> OperationId {
        self.next_id += 1;
        let id = OperationId::new(self.next_id);
        let op = Operation::new(id, name, kind, total);
        debug!(%id, %kind, total, "Registered operation");
        self.operations.insert(id, op);
        id
    }

    /// Merge a snapshot into the table.
    ///
    /// Returns `false` when the event was ignored: unknown id, an entry that
    /// is already terminal, or a backwards state transition.
    pub fn apply_progress(&mut self, event: ProgressEvent) -> bool {
        let Some(current) = self.operations.get_mut(&event.id) else {
            warn!(id = %event.id, "Progress for unknown operation");
            return false;
        };

        if !current.state.can_transition_to(event.snapshot.state) {
            debug!(
                id = %event.id,
                from = %current.state,
                to = %event.snapshot.state,
                "Ignoring stale progress"
            );
            return false;
        }

        let mut snapshot = event.snapshot;
        snapshot.done = snapshot.done.min(snapshot.total);
        *current = snapshot;
        true
    }

    /// Look up an operation.
    pub fn get(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(&id)
    }

    /// Operations in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Number of registered operations, finished ones included.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Whether any operation is still queued or running.
    pub fn has_running(&self) -> bool {
        self.operations.values().any(Operation::is_running)
    }

    /// Index of the selected entry.
    pub fn cursor(&self) -> usize {
        self.window.cursor()
    }

    /// Index of the first rendered entry.
    pub fn render_start(&self) -> usize {
        self.window.render_start()
    }

    /// Entries drawn in a view of `height` lines, in order.
    pub fn visible(&self, height: usize) -> impl Iterator<Item = (usize, &Operation)> {
        self.operations
            .values()
            .enumerate()
            .skip(self.window.render_start())
            .take(visible_count(height))
    }

    /// Position label such as `3/7`.
    pub fn cursor_label(&self) -> String {
        if self.operations.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.window.cursor() + 1, self.operations.len())
    }

    /// Move the cursor up in a view of `height` lines, wrapping to the end.
    pub fn list_up(&mut self, height: usize) {
        self.window.up(self.operations.len(), height);
    }

    /// Move the cursor down in a view of `height` lines, wrapping to the start.
    pub fn list_down(&mut self, height: usize) {
        self.window.down(self.operations.len(), height);
    }
}
