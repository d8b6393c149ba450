//! The engine value owned by the render loop.

mod clipboard;
mod constants;
mod dispatch;
mod navigation;
mod registry;

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, info};

use orbitfile_core::{EngineConfig, EngineError, OperationId, OperationKind, ProgressEvent};
use orbitfile_ops::{
    Job, ProgressReporter, ProgressSender, RemovableMounts, progress_channel, spawn_job,
};

pub use clipboard::{Clipboard, ClipboardMode};
pub use constants::{LINES_PER_PROCESS, MIN_PROCESS_VIEW_HEIGHT, TICK_INTERVAL_MS};
pub use dispatch::{Action, ConfirmationRequest, Dispatch};
pub use navigation::{ListWindow, visible_count};
pub use registry::ProcessRegistry;

/// An executor launch waiting for the user's answer to a confirmation.
#[derive(Debug)]
struct PendingLaunch {
    request: ConfirmationRequest,
    name: String,
    kind: OperationKind,
    total: usize,
    job: Job,
}

/// The file-operation engine as seen from the render loop.
///
/// Built once at startup. Owns the receiving end of the progress channel, the
/// process registry, the clipboard and any pending confirmation. Executors get
/// a clone of the sender and nothing else.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    mounts: RemovableMounts,
    sender: ProgressSender,
    receiver: mpsc::Receiver<ProgressEvent>,
    registry: ProcessRegistry,
    clipboard: Clipboard,
    /// Clipboard items of in-flight cut pastes, keyed by operation.
    pending_cuts: HashMap<OperationId, Vec<PathBuf>>,
    pending: Option<PendingLaunch>,
}

impl Engine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let (sender, receiver) =
            progress_channel(config.channel_capacity, config.progress_watermark);
        let mounts = RemovableMounts::from_config(&config);

        Ok(Self {
            config,
            mounts,
            sender,
            receiver,
            registry: ProcessRegistry::new(),
            clipboard: Clipboard::new(),
            pending_cuts: HashMap::new(),
            pending: None,
        })
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every operation registered so far, for drawing.
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Mutable access for list navigation.
    pub fn registry_mut(&mut self) -> &mut ProcessRegistry {
        &mut self.registry
    }

    /// The current copy or cut selection.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The confirmation currently waiting for an answer.
    pub fn pending_confirmation(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    /// Launch the pending action after the user confirmed it.
    pub fn confirm_pending(&mut self) -> Option<OperationId> {
        let pending = self.pending.take()?;
        info!(kind = %pending.kind, "Confirmed {}", pending.request.title);
        Some(self.launch(pending.name, pending.kind, pending.total, pending.job))
    }

    /// Drop the pending action.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                debug!(kind = %pending.kind, "Confirmation cancelled");
                true
            }
            None => false,
        }
    }

    /// Wait for the next progress event.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.receiver.recv().await
    }

    /// Merge a progress event into the registry.
    pub fn handle_event(&mut self, event: ProgressEvent) -> bool {
        let id = event.id;
        let terminal = event.is_terminal();
        let applied = self.registry.apply_progress(event);

        if applied && terminal {
            if let Some(items) = self.pending_cuts.remove(&id) {
                if self.clipboard.clear_if_matches(&items) {
                    debug!(%id, "Cleared clipboard after cut");
                }
            }
        }
        applied
    }

    /// Apply every event already waiting, without blocking.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.receiver.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Process events until no operation is queued or running.
    pub async fn run_until_idle(&mut self) {
        while self.registry.has_running() {
            match self.next_event().await {
                Some(event) => {
                    self.handle_event(event);
                }
                None => break,
            }
        }
    }

    /// Register an operation and start its executor.
    fn launch(&mut self, name: String, kind: OperationKind, total: usize, job: Job) -> OperationId {
        let id = self.registry.add_operation(name, kind, total);
        if let Some(op) = self.registry.get(id) {
            let reporter = ProgressReporter::new(op.clone(), self.sender.clone());
            spawn_job(job, reporter);
        }
        id
    }
}
