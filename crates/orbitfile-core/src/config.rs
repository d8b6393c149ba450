//! Engine configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Configuration for the file-operation engine.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the progress channel.
    #[builder(default = "50")]
    pub channel_capacity: usize,

    /// Pending message count at which non-terminal updates are dropped.
    #[builder(default = "5")]
    pub progress_watermark: usize,

    /// Route deletions to the trash instead of removing them outright.
    #[builder(default = "true")]
    pub use_trash: bool,

    /// User-level trash folder used instead of the OS trash facility.
    #[builder(default = "default_trash_dir()")]
    pub trash_dir: Option<PathBuf>,

    /// Mount point prefixes considered removable or external media.
    #[builder(default = "default_removable_prefixes()")]
    pub removable_mount_prefixes: Vec<PathBuf>,

    /// Paths under a removable prefix that are nevertheless internal.
    #[builder(default = "default_removable_exclusions()")]
    pub removable_mount_exclusions: Vec<PathBuf>,

    /// Ask for confirmation before an explicit permanent delete.
    #[builder(default = "true")]
    pub confirm_permanent_delete: bool,

    /// Override for the passphrase key-derivation cost (log2 of scrypt N).
    #[builder(default)]
    pub scrypt_work_factor: Option<u8>,
}

fn default_trash_dir() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| home.join(".Trash"))
    } else {
        None
    }
}

fn default_removable_prefixes() -> Vec<PathBuf> {
    if cfg!(windows) {
        return Vec::new();
    }
    ["/mnt", "/media", "/run/media", "/Volumes"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn default_removable_exclusions() -> Vec<PathBuf> {
    vec![PathBuf::from("/Volumes/.timemachine")]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 50,
            progress_watermark: 5,
            use_trash: true,
            trash_dir: default_trash_dir(),
            removable_mount_prefixes: default_removable_prefixes(),
            removable_mount_exclusions: default_removable_exclusions(),
            confirm_permanent_delete: true,
            scrypt_work_factor: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Check the channel settings of an already constructed configuration
    /// (e.g. one deserialized from a settings file).
    pub fn validate(&self) -> Result<(), EngineError> {
        check_channel(self.channel_capacity, self.progress_watermark)
            .map_err(|message| EngineError::InvalidConfig { message })
    }
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let capacity = self.channel_capacity.unwrap_or(50);
        let watermark = self.progress_watermark.unwrap_or(5);
        check_channel(capacity, watermark)
    }
}

fn check_channel(capacity: usize, watermark: usize) -> Result<(), String> {
    if watermark == 0 {
        return Err("Progress watermark must be at least 1".to_string());
    }
    if watermark >= capacity {
        return Err(format!(
            "Progress watermark ({watermark}) must be below the channel capacity ({capacity})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder().build().unwrap();
        assert_eq!(config.channel_capacity, 50);
        assert_eq!(config.progress_watermark, 5);
        assert!(config.use_trash);
        assert!(config.confirm_permanent_delete);
    }

    #[test]
    fn test_builder_rejects_watermark_at_capacity() {
        let result = EngineConfig::builder()
            .channel_capacity(4usize)
            .progress_watermark(4usize)
            .build();
        assert!(result.is_err());

        let result = EngineConfig::builder().progress_watermark(0usize).build();
        assert!(result.is_err());
    }
}
