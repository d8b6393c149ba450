//! Operation dispatcher: turns user actions into registered operations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use orbitfile_core::{EngineError, OperationId, OperationKind};
use orbitfile_ops::{
    CompressJob, DecryptJob, DeleteJob, DeleteMethod, ENCRYPTED_SUFFIX, EncryptJob, ExposeSecret,
    ExtractJob, Job, PasteJob, SecretString, TrashBin, count_files, count_files_all,
    has_encrypted_suffix, is_ancestor,
};

use super::{Engine, PendingLaunch};

/// An entry point invoked with the active selection and panel directory.
#[derive(Debug)]
pub enum Action {
    Copy,
    Cut,
    Paste,
    Delete { permanent: bool },
    Compress,
    Extract,
    Encrypt { passphrase: SecretString },
    Decrypt { passphrase: SecretString },
}

/// What a dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to do (empty selection or clipboard).
    Ignored,
    /// The clipboard was replaced.
    Clipboard,
    /// An executor was launched.
    Started(OperationId),
    /// The action waits for [`Engine::confirm_pending`].
    NeedsConfirmation(ConfirmationRequest),
}

/// Request shown by the confirmation modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    pub content: String,
    pub action_kind: OperationKind,
}

impl Engine {
    /// Run an action against `selection`, with `cwd` as the destination.
    ///
    /// Validation errors are returned before anything is registered. On
    /// success the call returns immediately; executors run in the background.
    pub fn dispatch(
        &mut self,
        action: Action,
        selection: &[PathBuf],
        cwd: &Path,
    ) -> Result<Dispatch, EngineError> {
        match action {
            Action::Copy | Action::Cut if selection.is_empty() => Ok(Dispatch::Ignored),
            Action::Copy => {
                self.clipboard.copy(selection.iter().cloned());
                Ok(Dispatch::Clipboard)
            }
            Action::Cut => {
                self.clipboard.cut(selection.iter().cloned());
                Ok(Dispatch::Clipboard)
            }
            Action::Paste => self.paste(cwd),
            Action::Delete { permanent } => self.delete(selection, permanent),
            Action::Compress => self.compress(selection, cwd),
            Action::Extract => self.extract(selection),
            Action::Encrypt { passphrase } => self.encrypt(selection, passphrase),
            Action::Decrypt { passphrase } => self.decrypt(selection, passphrase),
        }
    }

    fn paste(&mut self, cwd: &Path) -> Result<Dispatch, EngineError> {
        if self.clipboard.is_empty() {
            return Ok(Dispatch::Ignored);
        }
        if !cwd.is_dir() {
            return Err(EngineError::NotADirectory {
                path: cwd.to_path_buf(),
            });
        }

        let items = self.clipboard.items().to_vec();
        let cut = self.clipboard.is_cut();
        for source in &items {
            validate_paste(source, cwd, cut)?;
        }

        let name = display_name(&items[0]);
        let total = count_files_all(&items);
        let (kind, job) = if cut {
            let disposal = self
                .config
                .use_trash
                .then(|| TrashBin::from_config(&self.config));
            let job = PasteJob::cut(items.clone(), cwd.to_path_buf(), disposal);
            (OperationKind::Move, job)
        } else {
            (OperationKind::Copy, PasteJob::copy(items.clone(), cwd.to_path_buf()))
        };

        debug!(%kind, count = items.len(), total, dest = %cwd.display(), "Dispatching paste");
        let id = self.launch(name, kind, total, Job::Paste(job));
        if cut {
            self.pending_cuts.insert(id, items);
        }
        Ok(Dispatch::Started(id))
    }

    fn delete(&mut self, selection: &[PathBuf], permanent: bool) -> Result<Dispatch, EngineError> {
        if selection.is_empty() {
            return Ok(Dispatch::Ignored);
        }

        let targets = selection.to_vec();
        let name = display_name(&targets[0]);
        let total = targets.len();
        let count = describe_count(total);

        if self.mounts.any_removable(&targets) {
            debug!(count = total, "Delete on removable media needs confirmation");
            let request = ConfirmationRequest {
                title: "Permanent delete".to_string(),
                content: format!(
                    "{count} on removable media cannot be moved to trash. Delete permanently?"
                ),
                action_kind: OperationKind::PermanentDelete,
            };
            let job = Job::Delete(DeleteJob::new(targets, DeleteMethod::Permanent));
            return Ok(self.hold(request, name, total, job));
        }

        if permanent || !self.config.use_trash {
            let job = Job::Delete(DeleteJob::new(targets, DeleteMethod::Permanent));
            if self.config.confirm_permanent_delete {
                let request = ConfirmationRequest {
                    title: "Permanent delete".to_string(),
                    content: format!("Delete {count} permanently? This cannot be undone."),
                    action_kind: OperationKind::PermanentDelete,
                };
                return Ok(self.hold(request, name, total, job));
            }
            let id = self.launch(name, OperationKind::PermanentDelete, total, job);
            return Ok(Dispatch::Started(id));
        }

        let bin = TrashBin::from_config(&self.config);
        let job = Job::Delete(DeleteJob::new(targets, DeleteMethod::Trash(bin)));
        let id = self.launch(name, OperationKind::TrashDelete, total, job);
        Ok(Dispatch::Started(id))
    }

    fn compress(&mut self, selection: &[PathBuf], cwd: &Path) -> Result<Dispatch, EngineError> {
        let Some(job) = CompressJob::new(selection.to_vec(), cwd) else {
            return Ok(Dispatch::Ignored);
        };
        let name = display_name(&job.archive);
        let total = count_files_all(selection);
        let id = self.launch(name, OperationKind::Compress, total, Job::Compress(job));
        Ok(Dispatch::Started(id))
    }

    fn extract(&mut self, selection: &[PathBuf]) -> Result<Dispatch, EngineError> {
        let Some(archive) = selection.first() else {
            return Ok(Dispatch::Ignored);
        };
        require_exists(archive)?;
        let job = ExtractJob::new(archive.clone()).ok_or_else(|| EngineError::UnsupportedArchive {
            path: archive.clone(),
        })?;

        // The executor replaces the total once it has read the entry list.
        let id = self.launch(display_name(archive), OperationKind::Extract, 1, Job::Extract(job));
        Ok(Dispatch::Started(id))
    }

    fn encrypt(
        &mut self,
        selection: &[PathBuf],
        passphrase: SecretString,
    ) -> Result<Dispatch, EngineError> {
        let Some(source) = selection.first() else {
            return Ok(Dispatch::Ignored);
        };
        require_exists(source)?;
        require_passphrase(&passphrase)?;

        let total = if source.is_dir() { count_files(source) } else { 1 };
        let job = EncryptJob::new(source.clone(), passphrase, self.config.scrypt_work_factor);
        let id = self.launch(
            display_name(source),
            OperationKind::Encrypt,
            total,
            Job::Encrypt(job),
        );
        Ok(Dispatch::Started(id))
    }

    fn decrypt(
        &mut self,
        selection: &[PathBuf],
        passphrase: SecretString,
    ) -> Result<Dispatch, EngineError> {
        let Some(source) = selection.first() else {
            return Ok(Dispatch::Ignored);
        };
        require_exists(source)?;
        if !has_encrypted_suffix(source) {
            return Err(EngineError::WrongSuffix {
                path: source.clone(),
                expected: ENCRYPTED_SUFFIX,
            });
        }
        require_passphrase(&passphrase)?;

        let job = DecryptJob::new(source.clone(), passphrase);
        let id = self.launch(display_name(source), OperationKind::Decrypt, 1, Job::Decrypt(job));
        Ok(Dispatch::Started(id))
    }

    fn hold(
        &mut self,
        request: ConfirmationRequest,
        name: String,
        total: usize,
        job: Job,
    ) -> Dispatch {
        if self.pending.is_some() {
            debug!("Replacing unanswered confirmation");
        }
        self.pending = Some(PendingLaunch {
            request: request.clone(),
            name,
            kind: request.action_kind,
            total,
            job,
        });
        Dispatch::NeedsConfirmation(request)
    }
}

/// Refuse pastes that would nest a directory in itself or cut in place.
fn validate_paste(source: &Path, dest: &Path, cut: bool) -> Result<(), EngineError> {
    let name = display_name(source);

    if cut {
        if let Some(parent) = source.parent() {
            if same_path(parent, dest) {
                return Err(EngineError::InvalidPasteTarget {
                    reason: format!("{name} is already in this directory"),
                });
            }
        }
    }

    if source.is_dir() && is_ancestor(source, dest) {
        return Err(EngineError::InvalidPasteTarget {
            reason: format!("cannot paste {name} into itself"),
        });
    }
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    let a = fs::canonicalize(a).unwrap_or_else(|_| a.to_path_buf());
    let b = fs::canonicalize(b).unwrap_or_else(|_| b.to_path_buf());
    a == b
}

fn require_exists(path: &Path) -> Result<(), EngineError> {
    if fs::symlink_metadata(path).is_err() {
        return Err(EngineError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn require_passphrase(passphrase: &SecretString) -> Result<(), EngineError> {
    if passphrase.expose_secret().is_empty() {
        return Err(EngineError::MissingPassphrase);
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn describe_count(count: usize) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_paste_rejects_nesting() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir_all(dir.join("sub")).unwrap();

        assert!(validate_paste(&dir, &dir.join("sub"), false).is_err());
        assert!(validate_paste(&dir, &dir, false).is_err());
        assert!(validate_paste(&dir.join("sub"), temp.path(), false).is_ok());
    }

    #[test]
    fn test_validate_paste_rejects_cut_in_place() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        assert!(validate_paste(&file, temp.path(), true).is_err());
        // A copy into the same directory is fine; it gets a (1) name.
        assert!(validate_paste(&file, temp.path(), false).is_ok());
    }

    #[test]
    fn test_describe_count() {
        assert_eq!(describe_count(1), "1 item");
        assert_eq!(describe_count(3), "3 items");
    }
}
