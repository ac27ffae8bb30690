//! Discovery of bulk dump files below a root directory

use std::path::Path;

use walkdir::WalkDir;

use crate::bank::BulkDumpFile;

/// File extension of SYSEX dumps, compared case-insensitively.
pub const SYSEX_EXTENSION: &str = "syx";

/// Source of candidate bulk dump files.
pub trait Scanner {
    /// Returns every candidate file below `root`, in no particular order.
    fn scan(&self, root: &Path) -> Vec<BulkDumpFile>;
}

/// Recursively walks the filesystem for `.syx` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryScanner;

impl Scanner for DirectoryScanner {
    fn scan(&self, root: &Path) -> Vec<BulkDumpFile> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry below {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_sysex_file(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    let file = BulkDumpFile::new(entry.into_path(), metadata.len());
                    log::debug!("{}: {}", file.path.display(), file.variant);
                    files.push(file);
                }
                Err(e) => log::warn!("skipping {}: {}", entry.path().display(), e),
            }
        }

        log::info!("found {} sysex files below {}", files.len(), root.display());
        files
    }
}

/// True for paths ending in `.syx`, any case.
pub fn is_sysex_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SYSEX_EXTENSION))
        .unwrap_or(false)
}
