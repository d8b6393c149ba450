//! Compress executor: pack sources into a zip archive.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::OpError;
use crate::archive::strip_extensions;
use crate::conflict::resolve_conflict;
use crate::progress::ProgressReporter;
use crate::transfer::sorted_children;

/// Zip `sources` into `archive`.
#[derive(Debug, Clone)]
pub struct CompressJob {
    pub sources: Vec<PathBuf>,
    pub archive: PathBuf,
}

impl CompressJob {
    /// Build a job that writes into `dir`.
    ///
    /// The archive is named after the first source without its extension;
    /// the final name is resolved against existing files when the job runs.
    pub fn new(sources: Vec<PathBuf>, dir: &Path) -> Option<Self> {
        let first = sources.first()?;
        let name = first.file_name()?.to_string_lossy().into_owned();
        let stem = match name.rfind('.') {
            Some(pos) if pos > 0 => &name[..pos],
            _ => name.as_str(),
        };
        let archive = dir.join(format!("{stem}.zip"));
        Some(Self { sources, archive })
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let archive = resolve_conflict(&self.archive)
            .map_err(|e| OpError::io("Failed to check", &self.archive, e))?;
        if let Some(name) = archive.file_name() {
            reporter.set_current(strip_extensions(&name.to_string_lossy()).to_string());
        }
        let file = File::create_new(&archive)
            .map_err(|e| OpError::io("Failed to create", &archive, e))?;
        debug!(archive = %archive.display(), "Compressing");

        let result = write_zip(file, &self.sources, &archive, reporter);
        if result.is_err() {
            if let Err(e) = fs::remove_file(&archive) {
                warn!(archive = %archive.display(), error = %e, "Failed to remove partial archive");
            }
        }
        result
    }
}

fn write_zip(
    file: File,
    sources: &[PathBuf],
    archive: &Path,
    reporter: &mut ProgressReporter,
) -> Result<(), OpError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for source in sources {
        let base = source.parent().unwrap_or(Path::new(""));
        add_entry(&mut zip, source, base, options, archive, reporter)?;
    }

    zip.finish().map_err(|e| OpError::archive(archive, e))?;
    Ok(())
}

fn add_entry(
    zip: &mut ZipWriter<File>,
    path: &Path,
    base: &Path,
    options: SimpleFileOptions,
    archive: &Path,
    reporter: &mut ProgressReporter,
) -> Result<(), OpError> {
    let name = entry_name(path, base);
    let metadata = fs::symlink_metadata(path).map_err(|e| OpError::io("Failed to read", path, e))?;

    if metadata.is_dir() {
        zip.add_directory(format!("{name}/"), options)
            .map_err(|e| OpError::archive(archive, e))?;
        for child in sorted_children(path)? {
            add_entry(zip, &child, base, options, archive, reporter)?;
        }
        return Ok(());
    }

    reporter.set_current(name.clone());
    zip.start_file(name, options)
        .map_err(|e| OpError::archive(archive, e))?;
    let mut input = File::open(path).map_err(|e| OpError::io("Failed to read", path, e))?;
    io::copy(&mut input, zip).map_err(|e| OpError::io("Failed to compress", path, e))?;
    reporter.advance();
    Ok(())
}

/// Entry name relative to `base`, always with `/` separators.
fn entry_name(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
