//! Detection of paths on removable or external media.

use std::path::{Path, PathBuf};

use orbitfile_core::EngineConfig;

/// Mount prefixes treated as removable media.
///
/// Deleting under one of these bypasses trash recovery, so the dispatcher
/// asks for confirmation first.
#[derive(Debug, Clone, Default)]
pub struct RemovableMounts {
    prefixes: Vec<PathBuf>,
    exclusions: Vec<PathBuf>,
}

impl RemovableMounts {
    /// Create a matcher from explicit prefixes.
    pub fn new(prefixes: Vec<PathBuf>, exclusions: Vec<PathBuf>) -> Self {
        Self {
            prefixes,
            exclusions,
        }
    }

    /// Create a matcher from the engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.removable_mount_prefixes.clone(),
            config.removable_mount_exclusions.clone(),
        )
    }

    /// Check whether `path` lives on removable media.
    pub fn is_removable(&self, path: &Path) -> bool {
        if self.exclusions.iter().any(|e| path.starts_with(e)) {
            return false;
        }
        self.prefixes.iter().any(|p| path.starts_with(p))
    }

    /// Check whether any of `paths` lives on removable media.
    pub fn any_removable(&self, paths: &[PathBuf]) -> bool {
        paths.iter().any(|p| self.is_removable(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounts() -> RemovableMounts {
        RemovableMounts::new(
            vec![PathBuf::from("/media"), PathBuf::from("/Volumes")],
            vec![PathBuf::from("/Volumes/.timemachine")],
        )
    }

    #[test]
    fn test_prefix_match_is_component_wise() {
        let mounts = mounts();
        assert!(mounts.is_removable(Path::new("/media/usb/photo.jpg")));
        assert!(!mounts.is_removable(Path::new("/mediafiles/photo.jpg")));
        assert!(!mounts.is_removable(Path::new("/home/user/photo.jpg")));
    }

    #[test]
    fn test_exclusions_win() {
        let mounts = mounts();
        assert!(mounts.is_removable(Path::new("/Volumes/Stick/a")));
        assert!(!mounts.is_removable(Path::new("/Volumes/.timemachine/backup")));
    }

    #[test]
    fn test_any_removable() {
        let mounts = mounts();
        let paths = vec![PathBuf::from("/home/a"), PathBuf::from("/media/b")];
        assert!(mounts.any_removable(&paths));
        assert!(!mounts.any_removable(&paths[..1]));
    }
}
