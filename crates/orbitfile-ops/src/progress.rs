//! Progress channel and per-operation reporting.

use chrono::Local;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{trace, warn};

use orbitfile_core::{Operation, OperationId, OperationState, ProgressEvent};

/// Create the bounded progress channel shared by all executors.
///
/// Non-terminal updates are skipped once `watermark` messages are pending.
pub fn progress_channel(
    capacity: usize,
    watermark: usize,
) -> (ProgressSender, mpsc::Receiver<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender::new(tx, watermark), rx)
}

/// Sending half of the progress channel with the drop policy applied.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
    watermark: usize,
}

impl ProgressSender {
    /// Wrap a channel sender.
    pub fn new(tx: mpsc::Sender<ProgressEvent>, watermark: usize) -> Self {
        Self { tx, watermark }
    }

    /// Number of messages waiting to be drained.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Send a droppable update without blocking.
    ///
    /// Returns `false` when the update was skipped.
    pub fn try_send_update(&self, event: ProgressEvent) -> bool {
        if self.pending() >= self.watermark {
            trace!(id = %event.id, pending = self.pending(), "Dropping progress update");
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                trace!(id = %event.id, "Progress channel full, dropping update");
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(id = %event.id, "Progress channel closed");
                false
            }
        }
    }

    /// Send a terminal update from a blocking context, waiting for room.
    pub fn send_terminal_blocking(&self, event: ProgressEvent) {
        let id = event.id;
        if self.tx.blocking_send(event).is_err() {
            warn!(id = %id, "Progress channel closed before terminal update");
        }
    }

    /// Send a terminal update from an async context, waiting for room.
    pub async fn send_terminal(&self, event: ProgressEvent) {
        let id = event.id;
        if self.tx.send(event).await.is_err() {
            warn!(id = %id, "Progress channel closed before terminal update");
        }
    }
}

/// Owns one operation's snapshot on the executor side and publishes it.
///
/// State only moves forward and `done` never exceeds `total`; calls made after
/// a terminal state are ignored.
#[derive(Debug)]
pub struct ProgressReporter {
    op: Operation,
    sender: ProgressSender,
}

impl ProgressReporter {
    /// Create a reporter for a registered operation.
    pub fn new(op: Operation, sender: ProgressSender) -> Self {
        Self { op, sender }
    }

    /// The operation's id.
    pub fn id(&self) -> OperationId {
        self.op.id
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Operation {
        &self.op
    }

    /// The channel this reporter publishes to.
    pub fn sender(&self) -> &ProgressSender {
        &self.sender
    }

    /// Mark the operation as running.
    pub fn begin(&mut self) {
        if self.op.state == OperationState::Queued {
            self.op.state = OperationState::InProgress;
            self.publish();
        }
    }

    /// Record the item being processed. Published with the next update.
    pub fn set_current(&mut self, name: impl Into<String>) {
        if !self.op.is_terminal() {
            self.op.current_item = name.into();
        }
    }

    /// Replace the total once the real item count is known.
    pub fn set_total(&mut self, total: usize) {
        if !self.op.is_terminal() {
            self.op.total = total;
            self.op.done = self.op.done.min(total);
        }
    }

    /// Count one finished item and publish.
    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Count several finished items and publish.
    pub fn advance_by(&mut self, count: usize) {
        if self.op.is_terminal() {
            return;
        }
        self.op.done = (self.op.done + count).min(self.op.total);
        self.publish();
    }

    /// Publish the current snapshot as a droppable update.
    pub fn publish(&mut self) {
        if self.op.is_terminal() {
            return;
        }
        self.sender.try_send_update(ProgressEvent::new(self.op.clone()));
    }

    /// Finish successfully.
    pub fn succeed(&mut self) {
        if self.op.is_terminal() {
            return;
        }
        self.op.done = self.op.total;
        self.finish(OperationState::Successful);
    }

    /// Finish with a user-facing error message.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.op.is_terminal() {
            return;
        }
        self.op.error_message = Some(message.into());
        self.finish(OperationState::Failed);
    }

    fn finish(&mut self, state: OperationState) {
        self.op.state = state;
        self.op.done_time = Some(Local::now());
        self.sender.send_terminal_blocking(ProgressEvent::new(self.op.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitfile_core::OperationKind;

    fn reporter(
        total: usize,
        capacity: usize,
        watermark: usize,
    ) -> (ProgressReporter, mpsc::Receiver<ProgressEvent>) {
        let (sender, rx) = progress_channel(capacity, watermark);
        let op = Operation::new(OperationId::new(1), "item", OperationKind::Copy, total);
        (ProgressReporter::new(op, sender), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_done_never_exceeds_total() {
        let (mut reporter, mut rx) = reporter(2, 16, 8);
        reporter.begin();
        reporter.advance_by(5);
        assert_eq!(reporter.snapshot().done, 2);

        reporter.set_total(1);
        assert_eq!(reporter.snapshot().done, 1);

        for event in drain(&mut rx) {
            assert!(event.snapshot.done <= event.snapshot.total);
        }
    }

    #[test]
    fn test_terminal_state_is_final() {
        let (mut reporter, mut rx) = reporter(3, 16, 8);
        reporter.begin();
        reporter.fail("boom");
        reporter.succeed();
        reporter.advance();

        let events = drain(&mut rx);
        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].snapshot.state, OperationState::Failed);
        assert_eq!(terminal[0].snapshot.error_message.as_deref(), Some("boom"));
        assert!(terminal[0].snapshot.done_time.is_some());
    }

    #[test]
    fn test_updates_dropped_at_watermark_but_terminal_delivered() {
        let (mut reporter, mut rx) = reporter(10, 8, 3);
        reporter.begin();
        for _ in 0..9 {
            reporter.advance();
        }
        reporter.succeed();

        let events = drain(&mut rx);
        // Three droppable updates fit under the watermark, then the terminal one.
        assert_eq!(events.len(), 4);
        let last = events.last().unwrap();
        assert_eq!(last.snapshot.state, OperationState::Successful);
        assert_eq!(last.snapshot.done, 10);
    }

    #[test]
    fn test_success_completes_count() {
        let (mut reporter, mut rx) = reporter(4, 16, 8);
        reporter.begin();
        reporter.advance();
        reporter.succeed();

        let last = drain(&mut rx).pop().unwrap();
        assert_eq!(last.snapshot.done, 4);
        assert_eq!(last.snapshot.state, OperationState::Successful);
    }
}
