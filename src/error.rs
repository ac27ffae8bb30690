//! Error types of the library. The CLI wraps them with `anyhow`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures that reject a search request as a whole.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// The query is empty or only whitespace
    #[error("search query must not be empty")]
    EmptyQuery,
}

/// A single file could not be read. Never aborts a scan.
#[derive(Error, Debug)]
#[error("failed to read '{}': {source}", .path.display())]
pub struct FileAccessError {
    /// File that failed
    pub path: PathBuf,
    /// Underlying I/O error
    #[source]
    pub source: io::Error,
}

impl FileAccessError {
    /// Error for `path` caused by `source`.
    pub fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The config file could not be loaded or saved.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("failed to access config file '{}': {source}", .path.display())]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file is not valid config JSON
    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        /// Config file
        path: PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// A hand-off to the file browser, patch editor or MIDI device failed.
#[derive(Error, Debug)]
pub enum HandoffError {
    /// The external program could not be started
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The external program reported failure
    #[error("'{program}' exited with {status}")]
    Status {
        /// Program that was launched
        program: String,
        /// Its exit status
        status: std::process::ExitStatus,
    },

    /// Patch numbers start at 1
    #[error("patch number {0} is out of range, numbers start at 1")]
    PatchOutOfRange(usize),

    /// The bulk dump could not be read
    #[error(transparent)]
    File(#[from] FileAccessError),

    /// Writing to the device failed
    #[error("failed to transmit SYSEX data: {0}")]
    Transmit(#[source] io::Error),
}
