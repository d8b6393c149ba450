//! Archive format detection and the tar helpers shared by extract and crypt.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::OpError;
use crate::progress::ProgressReporter;
use crate::transfer::sorted_children;

/// Archive formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    /// A single gzip-compressed file.
    Gz,
    Bz2,
    Xz,
}

impl ArchiveFormat {
    /// Detect the format from the file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        let format = if name.ends_with(".zip") {
            Self::Zip
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::TarGz
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Self::TarBz2
        } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
            Self::TarXz
        } else if name.ends_with(".tar") {
            Self::Tar
        } else if name.ends_with(".gz") {
            Self::Gz
        } else if name.ends_with(".bz2") {
            Self::Bz2
        } else if name.ends_with(".xz") {
            Self::Xz
        } else {
            return None;
        };
        Some(format)
    }

    /// Whether the format holds a tar stream.
    pub fn is_tar(self) -> bool {
        matches!(self, Self::Tar | Self::TarGz | Self::TarBz2 | Self::TarXz)
    }
}

/// Strip every extension from a file name: `backup.tar.gz` becomes `backup`.
///
/// A leading dot is part of the name, so `.config.zip` becomes `.config`.
pub fn strip_extensions(name: &str) -> &str {
    let mut stem = name;
    while let Some(pos) = stem.rfind('.') {
        if pos == 0 {
            break;
        }
        stem = &stem[..pos];
    }
    stem
}

/// Join an archive entry name onto `root`, refusing anything that escapes it.
pub(crate) fn contained_path(root: &Path, entry: &Path) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in entry.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(relative))
}

/// Permissions given to unpacked entries. Archive modes are never trusted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnpackMode {
    pub dir: u32,
    pub file: u32,
}

impl UnpackMode {
    /// Owner-only access, for decrypted content.
    pub const HARDENED: Self = Self {
        dir: 0o700,
        file: 0o600,
    };
    pub const STANDARD: Self = Self {
        dir: 0o755,
        file: 0o644,
    };

    pub(crate) fn create_dir(self, path: &Path) -> io::Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.dir);
        }
        builder.create(path)
    }

    pub(crate) fn create_file(self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.file);
        }
        options.open(path)
    }
}

/// PAX record that marks a tar built by [`pack_tar`].
const PACKED_DIRECTORY_KEY: &str = "ORBITFILE.packed-directory";

/// Whether `reader` holds a tar built by [`pack_tar`].
///
/// Anything else, including a tar that was encrypted as a plain file, is
/// treated as opaque bytes.
pub(crate) fn is_packed_directory<R: Read>(reader: R) -> bool {
    let mut archive = tar::Archive::new(reader);
    let Ok(mut entries) = archive.entries() else {
        return false;
    };
    let Some(Ok(mut first)) = entries.next() else {
        return false;
    };
    let marked = match first.pax_extensions() {
        Ok(Some(extensions)) => extensions
            .filter_map(Result::ok)
            .any(|extension| extension.key() == Ok(PACKED_DIRECTORY_KEY)),
        _ => false,
    };
    marked
}

/// Count the entries of a tar stream without unpacking it.
pub(crate) fn tar_entry_count<R: Read>(reader: R) -> io::Result<usize> {
    let mut archive = tar::Archive::new(reader);
    let mut count = 0;
    for entry in archive.entries()? {
        entry?;
        count += 1;
    }
    Ok(count)
}

/// Unpack a tar stream under `root`.
///
/// Only directories and regular files are written. Entries that would land
/// outside `root` are skipped with a warning.
pub(crate) fn unpack_tar<R: Read>(
    reader: R,
    root: &Path,
    archive_path: &Path,
    mode: UnpackMode,
    reporter: &mut ProgressReporter,
) -> Result<(), OpError> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| OpError::archive(archive_path, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| OpError::archive(archive_path, e))?;
        let name = entry
            .path()
            .map_err(|e| OpError::archive(archive_path, e))?
            .into_owned();

        let Some(target) = contained_path(root, &name) else {
            warn!(entry = %name.display(), "Skipping archive entry outside the destination");
            reporter.advance();
            continue;
        };
        reporter.set_current(name.to_string_lossy());

        let kind = entry.header().entry_type();
        if kind.is_dir() {
            mode.create_dir(&target)
                .map_err(|e| OpError::io("Failed to create directory", &target, e))?;
        } else if kind.is_file() {
            if let Some(parent) = target.parent() {
                mode.create_dir(parent)
                    .map_err(|e| OpError::io("Failed to create directory", parent, e))?;
            }
            let mut file = mode
                .create_file(&target)
                .map_err(|e| OpError::io("Failed to write", &target, e))?;
            io::copy(&mut entry, &mut file)
                .map_err(|e| OpError::io("Failed to write", &target, e))?;
        } else {
            debug!(entry = %name.display(), "Skipping unsupported tar entry type");
        }
        reporter.advance();
    }
    Ok(())
}

/// Pack `root` (a directory) into an in-memory tar.
///
/// Entry names are relative to the directory's parent, so the archive holds
/// a single top-level folder. The first entry carries a PAX marker so the
/// result can be told apart from an arbitrary tar file.
pub(crate) fn pack_tar(root: &Path, reporter: &mut ProgressReporter) -> Result<Vec<u8>, OpError> {
    let base = root.parent().unwrap_or(Path::new(""));
    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    builder
        .append_pax_extensions([(PACKED_DIRECTORY_KEY, b"1".as_slice())])
        .map_err(|e| OpError::io("Failed to pack", root, e))?;

    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        let name = path.strip_prefix(base).unwrap_or(&path).to_path_buf();
        let metadata =
            fs::symlink_metadata(&path).map_err(|e| OpError::io("Failed to read", &path, e))?;

        if metadata.is_dir() {
            builder
                .append_dir(&name, &path)
                .map_err(|e| OpError::io("Failed to pack", &path, e))?;
            let mut children = sorted_children(&path)?;
            children.reverse();
            stack.extend(children);
        } else {
            reporter.set_current(name.to_string_lossy());
            builder
                .append_path_with_name(&path, &name)
                .map_err(|e| OpError::io("Failed to pack", &path, e))?;
            reporter.advance();
        }
    }

    builder
        .into_inner()
        .map_err(|e| OpError::io("Failed to pack", root, e))
}
