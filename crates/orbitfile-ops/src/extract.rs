//! Extract executor for zip, tar and single-file compressed archives.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tracing::{debug, warn};
use xz2::read::XzDecoder;

use crate::OpError;
use crate::archive::{ArchiveFormat, UnpackMode, strip_extensions, tar_entry_count, unpack_tar};
use crate::conflict::resolve_conflict;
use crate::progress::ProgressReporter;

/// Extract `archive` into a new directory next to it.
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub archive: PathBuf,
    pub format: ArchiveFormat,
}

impl ExtractJob {
    /// Returns `None` for unrecognized extensions.
    pub fn new(archive: PathBuf) -> Option<Self> {
        let format = ArchiveFormat::detect(&archive)?;
        Some(Self { archive, format })
    }

    pub(crate) fn run(self, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let output = self.output_dir()?;
        UnpackMode::STANDARD
            .create_dir(&output)
            .map_err(|e| OpError::io("Failed to create directory", &output, e))?;
        debug!(archive = %self.archive.display(), output = %output.display(), "Extracting");

        match self.format {
            ArchiveFormat::Zip => self.extract_zip(&output, reporter),
            format if format.is_tar() => {
                let total = tar_entry_count(self.decoder()?)
                    .map_err(|e| OpError::archive(&self.archive, e))?;
                reporter.set_total(total);
                unpack_tar(
                    self.decoder()?,
                    &output,
                    &self.archive,
                    UnpackMode::STANDARD,
                    reporter,
                )
            }
            _ => self.extract_single(&output, reporter),
        }
    }

    /// Conflict-free directory named after the archive without extensions.
    fn output_dir(&self) -> Result<PathBuf, OpError> {
        let parent = self.archive.parent().unwrap_or(Path::new("."));
        let name = self
            .archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let candidate = parent.join(strip_extensions(&name));
        resolve_conflict(&candidate).map_err(|e| OpError::io("Failed to check", &candidate, e))
    }

    /// Fresh decompressing reader over the archive file.
    fn decoder(&self) -> Result<Box<dyn Read>, OpError> {
        let file = File::open(&self.archive)
            .map_err(|e| OpError::io("Failed to read", &self.archive, e))?;
        let reader = BufReader::new(file);
        Ok(match self.format {
            ArchiveFormat::Tar | ArchiveFormat::Zip => Box::new(reader),
            ArchiveFormat::TarGz | ArchiveFormat::Gz => Box::new(GzDecoder::new(reader)),
            ArchiveFormat::TarBz2 | ArchiveFormat::Bz2 => Box::new(BzDecoder::new(reader)),
            ArchiveFormat::TarXz | ArchiveFormat::Xz => Box::new(XzDecoder::new(reader)),
        })
    }

    fn extract_zip(&self, output: &Path, reporter: &mut ProgressReporter) -> Result<(), OpError> {
        let file = File::open(&self.archive)
            .map_err(|e| OpError::io("Failed to read", &self.archive, e))?;
        let mut zip = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| OpError::archive(&self.archive, e))?;
        reporter.set_total(zip.len());

        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| OpError::archive(&self.archive, e))?;
            let Some(relative) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "Skipping archive entry outside the destination");
                reporter.advance();
                continue;
            };
            let target = output.join(relative);
            reporter.set_current(entry.name().to_string());

            if entry.is_dir() {
                UnpackMode::STANDARD
                    .create_dir(&target)
                    .map_err(|e| OpError::io("Failed to create directory", &target, e))?;
            } else {
                if let Some(parent) = target.parent() {
                    UnpackMode::STANDARD
                        .create_dir(parent)
                        .map_err(|e| OpError::io("Failed to create directory", parent, e))?;
                }
                let mut out = UnpackMode::STANDARD
                    .create_file(&target)
                    .map_err(|e| OpError::io("Failed to write", &target, e))?;
                io::copy(&mut entry, &mut out)
                    .map_err(|e| OpError::io("Failed to write", &target, e))?;
            }
            reporter.advance();
        }
        Ok(())
    }

    /// `.gz`, `.bz2` and `.xz` files hold one compressed file.
    fn extract_single(
        &self,
        output: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<(), OpError> {
        let name = self
            .archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let target = output.join(&name);
        reporter.set_total(1);
        reporter.set_current(name);

        let mut input = self.decoder()?;
        let mut out = UnpackMode::STANDARD
            .create_file(&target)
            .map_err(|e| OpError::io("Failed to write", &target, e))?;
        io::copy(&mut input, &mut out).map_err(|e| OpError::archive(&self.archive, e))?;
        reporter.advance();
        Ok(())
    }
}
