//! File counting used to size operations before they start.

use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use tracing::warn;

/// Count the non-directory entries under `path` (a file counts as one).
pub fn count_files(path: &Path) -> usize {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => WalkDir::new(path)
            .skip_hidden(false)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error while counting files");
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir())
            .count(),
        Ok(_) => 1,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot count files");
            0
        }
    }
}

/// Sum of [`count_files`] over several roots.
pub fn count_files_all(paths: &[PathBuf]) -> usize {
    paths.iter().map(|p| count_files(p)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_count_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("one.txt"), "1").unwrap();
        fs::write(root.join("a/.hidden"), "2").unwrap();
        fs::write(root.join("a/b/three.txt"), "3").unwrap();

        assert_eq!(count_files(&root), 3);
        assert_eq!(count_files(&root.join("one.txt")), 1);
        assert_eq!(count_files(&root.join("missing")), 0);
        assert_eq!(
            count_files_all(&[root.join("a"), root.join("one.txt")]),
            3
        );
    }
}
