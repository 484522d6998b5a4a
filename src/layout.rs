//! Output directory provisioning and file naming

use crate::code::Code;
use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of [`ensure_directory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    /// The directory was created by this call
    Created,
    /// The directory was already present
    Existing,
}

/// Create `path` (and missing parents) if absent. Idempotent.
pub fn ensure_directory(path: &Path) -> Result<DirectoryState> {
    if path.is_dir() {
        return Ok(DirectoryState::Existing);
    }

    match fs::create_dir_all(path) {
        Ok(()) => Ok(DirectoryState::Created),
        // Lost a race with another creator
        Err(err) if err.kind() == ErrorKind::AlreadyExists && path.is_dir() => {
            Ok(DirectoryState::Existing)
        }
        Err(source) => Err(Error::DirectoryProvision {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Where a run places its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    folder: PathBuf,
    extension: String,
}

impl OutputLayout {
    /// Images go to `folder/<code>.<extension>`
    pub fn new(folder: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into(),
        }
    }

    /// Image directory
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Image file extension, without the dot
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Destination path for the image of `code`
    pub fn image_path(&self, code: &Code) -> PathBuf {
        self.folder.join(format!("{}.{}", code, self.extension))
    }

    /// Total on-disk size of the images present for `codes`.
    ///
    /// Missing files (failed renders) contribute nothing.
    pub fn disk_usage<'a>(&self, codes: impl IntoIterator<Item = &'a Code>) -> u64 {
        codes
            .into_iter()
            .filter_map(|code| fs::metadata(self.image_path(code)).ok())
            .map(|meta| meta.len())
            .sum()
    }
}
