//! File operations engine for orbitfile.
//!
//! Every user action becomes one [`Job`] running on its own background task.
//! Executors never touch the process list directly: they own a
//! [`ProgressReporter`] holding their operation snapshot and push immutable
//! [`orbitfile_core::ProgressEvent`] values through a bounded channel that the
//! render loop drains.
//!
//! Non-terminal updates are dropped when the channel is backed up; terminal
//! updates are always delivered, so every operation ends in a visible
//! `Successful` or `Failed` state.

mod archive;
mod compress;
mod conflict;
mod count;
mod crypt;
mod delete;
mod error;
mod extract;
mod job;
mod mounts;
mod paste;
mod progress;
mod transfer;
mod trash;

pub use archive::{ArchiveFormat, strip_extensions};
pub use compress::CompressJob;
pub use conflict::resolve_conflict;
pub use count::{count_files, count_files_all};
pub use crypt::{
    DecryptJob, ENCRYPTED_ARCHIVE_SUFFIX, ENCRYPTED_SUFFIX, EncryptJob, ExposeSecret, SecretString,
    has_encrypted_suffix,
};
pub use delete::{DeleteJob, DeleteMethod};
pub use error::OpError;
pub use extract::ExtractJob;
pub use job::{Job, execute, spawn_job};
pub use mounts::RemovableMounts;
pub use paste::PasteJob;
pub use progress::{ProgressReporter, ProgressSender, progress_channel};
pub use transfer::is_ancestor;
pub use trash::TrashBin;
