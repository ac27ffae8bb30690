//! Catalog and search voice names in Yamaha DX7/TX SYSEX bulk dumps.
//!
//! Bulk dumps are classified by file size into an [`InstrumentVariant`],
//! their fixed 128 byte voice records are decoded into [`PatchRecord`]s and
//! a [`SearchIndex`] answers case-insensitive substring queries across a
//! whole directory tree, in a deterministic order.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let index = dx7cat::SearchIndex::new();
//! let outcome = index.search(Path::new("cartridges"), "brass").unwrap();
//! for hit in outcome.hits {
//!     println!("{} {}: {}", hit.relative_path.display(), hit.number, hit.name);
//! }
//! ```

#![warn(missing_docs)]

pub mod bank;
pub mod config;
pub mod error;
pub mod handoff;
pub mod scan;
pub mod search;

pub use bank::{decode_name, read_patches, BulkDumpFile, InstrumentVariant, PatchRecord, VoiceBank};
pub use config::Config;
pub use error::{ConfigError, FileAccessError, HandoffError, SearchError};
pub use scan::{DirectoryScanner, Scanner};
pub use search::{search_files, sort_hits, Query, SearchHit, SearchIndex, SearchOptions, SearchOutcome};
