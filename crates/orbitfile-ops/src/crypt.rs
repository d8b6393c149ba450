//! Passphrase encryption with age (scrypt recipients).
//!
//! Files become `name.age`. Directories are packed into an in-memory tar
//! first and become `name.tar.age`. Decryption looks at the payload rather
//! than the name to decide between the two, so an encrypted `backup.tar` file
//! comes back as a file. Everything written here is owner-only.

use std::fs::{self, OpenOptions};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

pub use age::secrecy::{ExposeSecret, SecretString};

use crate::OpError;
use crate::archive::{UnpackMode, is_packed_directory, pack_tar, tar_entry_count, unpack_tar};
use crate::conflict::resolve_conflict;
use crate::progress::ProgressReporter;

/// Suffix of an encrypted file.
pub const ENCRYPTED_SUFFIX: &str = ".age";
/// Suffix of an encrypted directory.
pub const ENCRYPTED_ARCHIVE_SUFFIX: &str = ".tar.age";

const TAR_SUFFIX: &str = ".tar";

/// Whether `path` ends in `.age`, ignoring ASCII case.
pub fn has_encrypted_suffix(path: &Path) -> bool {
    strip_suffix_ignore_case(&file_name(path), ENCRYPTED_SUFFIX).is_some()
}

/// Encrypt one file or directory with a passphrase.
#[derive(Debug)]
pub struct EncryptJob {
    pub source: PathBuf,
    pub passphrase: SecretString,
    /// log2 of the scrypt cost parameter. `None` lets age pick one.
    pub work_factor: Option<u8>,
}

impl EncryptJob {
    pub fn new(source: PathBuf, passphrase: SecretString, work_factor: Option<u8>) -> Self {
        Self {
            source,
            passphrase,
            work_factor,
        }
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let metadata = fs::metadata(&self.source)
            .map_err(|e| OpError::io("Failed to read", &self.source, e))?;

        let (plaintext, suffix) = if metadata.is_dir() {
            (pack_tar(&self.source, reporter)?, ENCRYPTED_ARCHIVE_SUFFIX)
        } else {
            let bytes = fs::read(&self.source)
                .map_err(|e| OpError::io("Failed to read", &self.source, e))?;
            (bytes, ENCRYPTED_SUFFIX)
        };

        let mut recipient = age::scrypt::Recipient::new(self.passphrase);
        if let Some(work_factor) = self.work_factor {
            recipient.set_work_factor(work_factor);
        }
        let ciphertext = age::encrypt(&recipient, &plaintext)?;

        let target = resolve_conflict(&with_suffix(&self.source, suffix))
            .map_err(|e| OpError::io("Failed to check", &self.source, e))?;
        debug!(
            source = %self.source.display(),
            target = %target.display(),
            "Writing encrypted output"
        );
        write_private(&target, &ciphertext)?;

        if !metadata.is_dir() {
            reporter.advance();
        }
        Ok(())
    }
}

/// Decrypt a `.age` file next to it, unpacking encrypted directories.
#[derive(Debug)]
pub struct DecryptJob {
    pub source: PathBuf,
    pub passphrase: SecretString,
}

impl DecryptJob {
    pub fn new(source: PathBuf, passphrase: SecretString) -> Self {
        Self { source, passphrase }
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let name = file_name(&self.source);
        let Some(stem) = strip_suffix_ignore_case(&name, ENCRYPTED_SUFFIX) else {
            return Err(OpError::WrongSuffix {
                path: self.source.clone(),
                expected: ENCRYPTED_SUFFIX,
            });
        };

        let ciphertext =
            fs::read(&self.source).map_err(|e| OpError::io("Failed to read", &self.source, e))?;
        let identity = age::scrypt::Identity::new(self.passphrase);
        let plaintext = age::decrypt(&identity, &ciphertext).map_err(OpError::Decrypt)?;

        let parent = self.source.parent().unwrap_or(Path::new("."));
        if is_packed_directory(Cursor::new(&plaintext)) {
            let dir_name = strip_suffix_ignore_case(stem, TAR_SUFFIX).unwrap_or(stem);
            let output = resolve_conflict(&parent.join(dir_name))
                .map_err(|e| OpError::io("Failed to check", &self.source, e))?;
            UnpackMode::HARDENED
                .create_dir(&output)
                .map_err(|e| OpError::io("Failed to create directory", &output, e))?;

            let total = tar_entry_count(Cursor::new(&plaintext))
                .map_err(|e| OpError::archive(&self.source, e))?;
            reporter.set_total(total);
            debug!(output = %output.display(), entries = total, "Unpacking decrypted archive");
            unpack_tar(
                Cursor::new(&plaintext),
                &output,
                &self.source,
                UnpackMode::HARDENED,
                reporter,
            )
        } else {
            let target = resolve_conflict(&parent.join(stem))
                .map_err(|e| OpError::io("Failed to check", &self.source, e))?;
            write_private(&target, &plaintext)?;
            reporter.advance();
            Ok(())
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    let tail = name.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then_some(&name[..split])
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Write a new file readable only by its owner.
fn write_private(path: &Path, bytes: &[u8]) -> Result<(), OpError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .map_err(|e| OpError::io("Failed to create", path, e))?;
    file.write_all(bytes)
        .map_err(|e| OpError::io("Failed to write", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("/tmp/notes.txt"), ENCRYPTED_SUFFIX),
            PathBuf::from("/tmp/notes.txt.age")
        );
        assert_eq!(
            with_suffix(Path::new("/tmp/photos"), ENCRYPTED_ARCHIVE_SUFFIX),
            PathBuf::from("/tmp/photos.tar.age")
        );
    }

    #[test]
    fn test_encrypted_suffix_ignores_case() {
        assert!(has_encrypted_suffix(Path::new("/tmp/BACKUP.AGE")));
        assert!(has_encrypted_suffix(Path::new("photos.Tar.Age")));
        assert!(!has_encrypted_suffix(Path::new("page")));
        assert!(!has_encrypted_suffix(Path::new("notes.txt")));
        assert_eq!(strip_suffix_ignore_case("BACKUP.AGE", ENCRYPTED_SUFFIX), Some("BACKUP"));
        assert_eq!(strip_suffix_ignore_case("é", ".age"), None);
    }
}
