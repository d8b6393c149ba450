//! Trash facility: the OS trash, or a user-level Trash folder.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use orbitfile_core::EngineConfig;

use crate::OpError;
use crate::conflict::resolve_conflict;
use crate::transfer::move_path;

/// Where trash-deleted items go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashBin {
    /// The platform trash integration.
    System,
    /// A plain folder items are moved into.
    Folder(PathBuf),
}

impl TrashBin {
    /// Pick the trash from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        match &config.trash_dir {
            Some(dir) => Self::Folder(dir.clone()),
            None => Self::System,
        }
    }

    /// Move `path` to the trash.
    pub fn discard(&self, path: &Path) -> Result<(), OpError> {
        match self {
            Self::System => {
                debug!(path = %path.display(), "Moving to system trash");
                trash::delete(path).map_err(|e| OpError::Trash {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            Self::Folder(dir) => {
                fs::create_dir_all(dir)
                    .map_err(|e| OpError::io("Failed to create directory", dir, e))?;
                let name = path.file_name().ok_or_else(|| OpError::Trash {
                    path: path.to_path_buf(),
                    message: "path has no file name".into(),
                })?;
                let target = resolve_conflict(&dir.join(name))
                    .map_err(|e| OpError::io("Failed to check", dir, e))?;
                debug!(
                    path = %path.display(),
                    target = %target.display(),
                    "Moving to trash folder"
                );
                move_path(path, &target)
            }
        }
    }
}
