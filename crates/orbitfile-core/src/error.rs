//! Error types for dispatching operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised before an operation is registered.
///
/// These never produce a visible process; the caller reports them directly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Paste destination is not a directory.
    #[error("Destination is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Paste would put a directory inside itself, or cut into its own parent.
    #[error("Invalid paste location: {reason}")]
    InvalidPasteTarget { reason: String },

    /// Extraction requested for an unrecognized format.
    #[error("Unsupported archive format: {path}")]
    UnsupportedArchive { path: PathBuf },

    /// Decryption requested for a file without the expected suffix.
    #[error("File does not have the {expected} extension: {path}")]
    WrongSuffix { path: PathBuf, expected: &'static str },

    /// Encryption or decryption requested without a passphrase.
    #[error("A passphrase is required")]
    MissingPassphrase,

    /// Source path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}
