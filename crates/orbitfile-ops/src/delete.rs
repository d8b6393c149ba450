//! Delete executor.

use std::path::PathBuf;

use tracing::debug;

use crate::progress::ProgressReporter;
use crate::transfer::remove_path;
use crate::{OpError, TrashBin};

/// How a delete disposes of its targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMethod {
    Trash(TrashBin),
    Permanent,
}

/// Delete a batch of paths. Stops at the first failure.
#[derive(Debug, Clone)]
pub struct DeleteJob {
    pub targets: Vec<PathBuf>,
    pub method: DeleteMethod,
}

impl DeleteJob {
    pub fn new(targets: Vec<PathBuf>, method: DeleteMethod) -> Self {
        Self { targets, method }
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        for target in &self.targets {
            if let Some(name) = target.file_name() {
                reporter.set_current(name.to_string_lossy());
            }
            debug!(path = %target.display(), method = ?self.method, "Deleting");

            match &self.method {
                DeleteMethod::Trash(bin) => bin.discard(target)?,
                DeleteMethod::Permanent => remove_path(target)?,
            }
            reporter.advance();
        }
        Ok(())
    }
}
