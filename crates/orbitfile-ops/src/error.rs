//! Error types for background executors.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// An error that stops an executor and fails its operation.
#[derive(Debug, Error)]
pub enum OpError {
    /// Filesystem failure with path context.
    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A source vanished before it could be processed.
    #[error("Source does not exist: {}", path.display())]
    SourceMissing { path: PathBuf },

    /// The trash facility refused the item.
    #[error("Failed to move {} to trash: {message}", path.display())]
    Trash { path: PathBuf, message: String },

    /// Reading or writing an archive failed.
    #[error("Archive error in {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },

    /// Unrecognized archive extension.
    #[error("Unsupported archive format: {}", path.display())]
    UnsupportedArchive { path: PathBuf },

    /// Decryption input without the expected suffix.
    #[error("{} does not have the {expected} extension", path.display())]
    WrongSuffix { path: PathBuf, expected: &'static str },

    /// Building the encrypted payload failed.
    #[error("Encryption failed: {0}")]
    Encrypt(#[from] age::EncryptError),

    /// Bad passphrase or corrupt payload.
    #[error("Decryption failed - wrong password?")]
    Decrypt(#[source] age::DecryptError),
}

impl OpError {
    /// Create an I/O error with path context.
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound && context == "Failed to read" {
            return Self::SourceMissing { path };
        }
        Self::Io {
            context,
            path,
            source,
        }
    }

    /// Create an archive error from any displayable cause.
    pub fn archive(path: &Path, cause: impl std::fmt::Display) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            message: cause.to_string(),
        }
    }

    /// Message stored on the failed operation and shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                context,
                path,
                source,
            } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("{context} {name}: {source}")
            }
            other => other.to_string(),
        }
    }
}
