//! Low-level copy, move and removal helpers shared by the executors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::OpError;
use crate::conflict::resolve_conflict;

/// Copy `source` to `dest`, depth-first, resolving name conflicts per entry.
///
/// `on_file` runs after every copied file with the source path. The walk
/// stops at the first error; anything already copied stays on disk.
pub(crate) fn copy_tree(
    source: &Path,
    dest: &Path,
    on_file: &mut dyn FnMut(&Path),
) -> Result<(), OpError> {
    let metadata =
        fs::symlink_metadata(source).map_err(|e| OpError::io("Failed to read", source, e))?;

    if metadata.is_dir() {
        let dest = resolve_conflict(dest).map_err(|e| OpError::io("Failed to check", dest, e))?;
        fs::create_dir_all(&dest)
            .map_err(|e| OpError::io("Failed to create directory", &dest, e))?;

        for child in sorted_children(source)? {
            let name = child.file_name().unwrap_or_default();
            copy_tree(&child, &dest.join(name), on_file)?;
        }
        Ok(())
    } else {
        let dest = resolve_conflict(dest).map_err(|e| OpError::io("Failed to check", dest, e))?;
        fs::copy(source, &dest).map_err(|e| OpError::io("Failed to copy", source, e))?;
        on_file(source);
        Ok(())
    }
}

/// Directory children sorted by name, so walks are deterministic.
pub(crate) fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>, OpError> {
    let entries = fs::read_dir(dir).map_err(|e| OpError::io("Failed to read", dir, e))?;
    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| OpError::io("Failed to read", dir, e))?;
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}

/// Move `source` to `dest`, falling back to copy and remove across devices.
pub(crate) fn move_path(source: &Path, dest: &Path) -> Result<(), OpError> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    copy_tree(source, dest, &mut |_| {})?;
    remove_path(source)
}

/// Remove a file, symlink or whole directory tree.
pub(crate) fn remove_path(path: &Path) -> Result<(), OpError> {
    let metadata =
        fs::symlink_metadata(path).map_err(|e| OpError::io("Failed to read", path, e))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| OpError::io("Failed to remove", path, e))
}

/// Check whether `dest` is `source` itself or lies inside it.
///
/// Symlinks are resolved where possible.
pub fn is_ancestor(source: &Path, dest: &Path) -> bool {
    let source = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
    let dest = fs::canonicalize(dest).unwrap_or_else(|_| dest.to_path_buf());
    dest.starts_with(&source)
}
