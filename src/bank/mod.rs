//! DX7/TX bulk dump files and the voices they hold

pub mod name;
pub mod reader;
pub mod variant;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::FileAccessError;

pub use name::decode_name;
pub use reader::{read_patches, VoiceBank};
pub use variant::{InstrumentVariant, Layout};

/// One voice decoded from a bulk dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchRecord {
    /// Voice number, starting at 1
    pub number: usize,
    /// Decoded voice name
    pub name: String,
}

/// A discovered `.syx` file, classified by its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDumpFile {
    /// Location of the file. Absolute when found by a
    /// [`SearchIndex`](crate::SearchIndex) search, otherwise as given.
    pub path: PathBuf,
    /// File size in bytes
    pub len: u64,
    /// Variant implied by `len`
    pub variant: InstrumentVariant,
}

impl BulkDumpFile {
    /// Classifies a file of `len` bytes without touching the disk.
    pub fn new(path: PathBuf, len: u64) -> Self {
        Self {
            path,
            len,
            variant: InstrumentVariant::from_file_len(len),
        }
    }

    /// Stats and classifies the file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, FileAccessError> {
        let metadata = fs::metadata(path).map_err(|e| FileAccessError::new(path, e))?;
        Ok(Self::new(path.to_path_buf(), metadata.len()))
    }

    /// Loads the file and decodes its voices.
    ///
    /// Files of unknown variant are not opened and yield no voices.
    pub fn read_patches(&self) -> Result<Vec<PatchRecord>, FileAccessError> {
        if !self.variant.is_known() {
            log::debug!("{}: unrecognized size {}, skipped", self.path.display(), self.len);
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).map_err(|e| FileAccessError::new(&self.path, e))?;
        let patches = read_patches(&data, self.variant);

        log::debug!(
            "{} ({}): {:?}",
            self.path.display(),
            self.variant,
            patches.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );

        Ok(patches)
    }
}
