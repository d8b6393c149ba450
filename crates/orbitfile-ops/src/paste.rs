//! Paste executor: copy or move clipboard items into a directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::conflict::resolve_conflict;
use crate::count::count_files;
use crate::progress::ProgressReporter;
use crate::transfer::{copy_tree, remove_path};
use crate::{OpError, TrashBin};

/// Copy (or, with `cut`, move) `sources` into `destination`.
#[derive(Debug, Clone)]
pub struct PasteJob {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    pub cut: bool,
    /// Where cut sources go once copied across devices. `None` removes them.
    pub disposal: Option<TrashBin>,
}

impl PasteJob {
    /// Create a copy job.
    pub fn copy(sources: Vec<PathBuf>, destination: PathBuf) -> Self {
        Self {
            sources,
            destination,
            cut: false,
            disposal: None,
        }
    }

    /// Create a move job.
    pub fn cut(sources: Vec<PathBuf>, destination: PathBuf, disposal: Option<TrashBin>) -> Self {
        Self {
            sources,
            destination,
            cut: true,
            disposal,
        }
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let mut copied_sources = Vec::new();
        let mut outcome = Ok(());

        for source in &self.sources {
            let Some(name) = source.file_name() else {
                continue;
            };
            reporter.set_current(name.to_string_lossy());
            let target = self.destination.join(name);

            if self.cut {
                match self.try_rename(source, &target, reporter) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                }
            }

            let result = copy_tree(source, &target, &mut |file: &Path| {
                if let Some(name) = file.file_name() {
                    reporter.set_current(name.to_string_lossy());
                }
                reporter.advance();
            });

            match result {
                Ok(()) if self.cut => copied_sources.push(source.clone()),
                Ok(()) => {}
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        for source in copied_sources {
            if let Err(e) = self.dispose(&source) {
                if outcome.is_ok() {
                    outcome = Err(e);
                }
                break;
            }
        }

        outcome
    }

    /// Same-filesystem fast path for cut. Returns `false` when a copy is needed.
    fn try_rename(
        &self,
        source: &Path,
        target: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<bool, OpError> {
        let target =
            resolve_conflict(target).map_err(|e| OpError::io("Failed to check", target, e))?;
        let files = count_files(source);
        match fs::rename(source, &target) {
            Ok(()) => {
                reporter.advance_by(files);
                Ok(true)
            }
            Err(e) => {
                debug!(source = %source.display(), error = %e, "Rename failed, copying instead");
                Ok(false)
            }
        }
    }

    fn dispose(&self, source: &Path) -> Result<(), OpError> {
        match &self.disposal {
            Some(bin) => bin.discard(source),
            None => remove_path(source),
        }
    }
}
