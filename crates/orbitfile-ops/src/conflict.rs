//! Destination name conflict resolution.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static NUMBERED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)$").expect("valid numbered suffix pattern"));

/// Compute a destination path that does not exist yet.
///
/// A free path is returned unchanged. For an existing `file.txt` the first
/// candidate is `file(1).txt`; an existing `file(3).txt` continues with
/// `file(4).txt`. Extensions are kept for files; directory names are never
/// split on dots.
///
/// The result is only guaranteed free at the moment of the check.
pub fn resolve_conflict(path: &Path) -> io::Result<PathBuf> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(path.to_path_buf()),
        Err(e) => return Err(e),
    };

    let parent = path.parent().unwrap_or(Path::new(""));
    let file_name = path
        .file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();

    let (base, extension) = if metadata.is_dir() {
        (file_name.to_string(), String::new())
    } else {
        split_extension(&file_name)
    };

    // A suffix that cannot be incremented is treated as part of the name.
    let numbered = NUMBERED_SUFFIX.captures(&base).and_then(|caps| {
        let start = caps.get(0)?.start();
        let n = caps[1].parse::<u64>().ok()?;
        n.checked_add(1).map(|_| (start, n))
    });
    let (stem, mut number) = match numbered {
        Some((start, n)) => (base[..start].to_string(), n),
        None => (base, 0),
    };

    loop {
        number = number.checked_add(1).ok_or_else(|| {
            io::Error::other(format!("no free name left for {}", path.display()))
        })?;
        let candidate = parent.join(format!("{stem}({number}){extension}"));
        match fs::symlink_metadata(&candidate) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(candidate),
            Err(e) => return Err(e),
            Ok(_) => continue,
        }
    }
}

/// Split `name` into base and `.ext`, treating a leading dot as part of the name.
fn split_extension(name: &str) -> (String, String) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (name[..pos].to_string(), name[pos..].to_string()),
        _ => (name.to_string(), String::new()),
    }
}
