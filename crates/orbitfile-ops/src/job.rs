//! Executor entry points: one background task per operation.

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use orbitfile_core::{OperationState, ProgressEvent};

use crate::progress::ProgressReporter;
use crate::{CompressJob, DecryptJob, DeleteJob, EncryptJob, ExtractJob, OpError, PasteJob};

/// Work an executor can carry out.
#[derive(Debug)]
pub enum Job {
    Paste(PasteJob),
    Delete(DeleteJob),
    Compress(CompressJob),
    Extract(ExtractJob),
    Encrypt(EncryptJob),
    Decrypt(DecryptJob),
}

impl Job {
    fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        match self {
            Self::Paste(job) => job.run(reporter),
            Self::Delete(job) => job.run(reporter),
            Self::Compress(job) => job.run(reporter),
            Self::Extract(job) => job.run(reporter),
            Self::Encrypt(job) => job.run(reporter),
            Self::Decrypt(job) => job.run(reporter),
        }
    }
}

/// Run `job` to completion on the current thread.
///
/// Exactly one terminal event is published, whatever the outcome.
pub fn execute(job: Job, mut reporter: ProgressReporter) {
    let id = reporter.id();
    reporter.begin();
    debug!(%id, kind = %reporter.snapshot().kind, "Operation started");

    match job.run(&mut reporter) {
        Ok(()) => {
            reporter.succeed();
            info!(%id, "Operation finished");
        }
        Err(e) => {
            error!(%id, error = %e, "Operation failed");
            reporter.fail(e.user_message());
        }
    }
}

/// Run `job` on the blocking pool.
///
/// If the executor panics, a failed terminal event is still published.
pub fn spawn_job(job: Job, reporter: ProgressReporter) -> JoinHandle<()> {
    spawn_reported(reporter, move |reporter| execute(job, reporter))
}

fn spawn_reported<F>(reporter: ProgressReporter, work: F) -> JoinHandle<()>
where
    F: FnOnce(ProgressReporter) + Send + 'static,
{
    let mut fallback = reporter.snapshot().clone();
    let sender = reporter.sender().clone();

    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || work(reporter)).await;
        if let Err(e) = result {
            error!(id = %fallback.id, error = %e, "Executor task aborted");
            fallback.state = OperationState::Failed;
            fallback.done_time = Some(Local::now());
            fallback.error_message = Some("Internal error".to_string());
            sender.send_terminal(ProgressEvent::new(fallback)).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::progress_channel;
    use orbitfile_core::{Operation, OperationId, OperationKind};

    #[tokio::test]
    async fn test_panicking_executor_still_fails_visibly() {
        let (sender, mut rx) = progress_channel(8, 4);
        let op = Operation::new(OperationId::new(7), "boom", OperationKind::Copy, 3);
        let reporter = ProgressReporter::new(op, sender);

        let handle = spawn_reported(reporter, |mut reporter| {
            reporter.begin();
            reporter.advance();
            panic!("executor bug");
        });
        handle.await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let last = events.last().unwrap();
        assert!(last.is_terminal());
        assert_eq!(last.id, OperationId::new(7));
        assert_eq!(last.snapshot.state, OperationState::Failed);
        assert_eq!(last.snapshot.error_message.as_deref(), Some("Internal error"));
        assert!(last.snapshot.done_time.is_some());
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_spawned_job_reports_once() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("gone.txt");
        std::fs::write(&target, "x").unwrap();

        let (sender, mut rx) = progress_channel(8, 4);
        let op = Operation::new(OperationId::new(1), "gone.txt", OperationKind::PermanentDelete, 1);
        let job = Job::Delete(DeleteJob::new(vec![target.clone()], crate::DeleteMethod::Permanent));
        spawn_job(job, ProgressReporter::new(op, sender)).await.unwrap();

        let mut terminal = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if event.is_terminal() {
                terminal.push(event);
            }
        }
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].snapshot.state, OperationState::Successful);
        assert!(!target.exists());
    }
}
