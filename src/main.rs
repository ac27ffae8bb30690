use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use dx7cat::config::DEFAULT_CONFIG_FILE;
use dx7cat::handoff::{
    FileRevealer, PatchEditor, SysexRequest, SysexTransmitter, SystemFileBrowser,
    WriterTransmitter,
};
use dx7cat::scan::is_sysex_file;
use dx7cat::{BulkDumpFile, Config, DirectoryScanner, Scanner, SearchHit, SearchIndex};

fn parse_duration(s: &str) -> Result<Duration, std::num::ParseIntError> {
    let ms: u64 = s.parse()?;
    Ok(Duration::from_millis(ms))
}

/// Search voice names in directories of DX7/TX SYSEX bulk dumps
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log debug output unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search all bulk dumps below a directory for a voice name
    Search {
        /// Case-insensitive part of the voice name
        query: String,

        /// Directory to search, defaults to the configured directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Number of worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Maximum number of files to search
        #[arg(long)]
        max_files: Option<usize>,

        /// Stop starting new files after this many milliseconds
        #[arg(long, value_parser = parse_duration)]
        timeout_ms: Option<Duration>,

        /// Print the hits as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// List all voices of a bulk dump, or of every bulk dump below a directory
    List {
        /// File or directory, defaults to the configured directory
        path: Option<PathBuf>,
    },
    /// Show a bulk dump in the file browser
    Reveal {
        /// Path to the bulk dump, absolute or relative to the configured directory
        sysex_file: PathBuf,
    },
    /// Open a voice in the configured patch editor
    Edit {
        /// Path to the bulk dump, absolute or relative to the configured directory
        sysex_file: PathBuf,

        /// Patch number (1-indexed)
        patch_number: usize,

        /// Editor executable, overrides the configured one
        #[arg(long)]
        editor: Option<PathBuf>,
    },
    /// Send the raw bytes of a bulk dump to a MIDI device
    Send {
        /// Path to the bulk dump, absolute or relative to the configured directory
        sysex_file: PathBuf,

        /// Patch number to select on the receiver (1-indexed)
        #[arg(long)]
        patch: Option<usize>,

        /// Raw MIDI device node, overrides the configured one
        #[arg(long)]
        device: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::load(&args.config)?;

    match args.command {
        Commands::Search {
            query,
            dir,
            workers,
            max_files,
            timeout_ms,
            json,
        } => {
            let root = dir
                .or_else(|| config.directory.clone())
                .ok_or_else(|| anyhow!("no directory given and none configured"))?;

            let mut options = config.search_options();
            if let Some(workers) = workers {
                options.workers = workers.max(1);
            }
            if max_files.is_some() {
                options.max_files = max_files;
            }
            if timeout_ms.is_some() {
                options.timeout = timeout_ms;
            }

            let index = SearchIndex::new().with_options(options);
            let outcome = index.search(&root, &query)?;

            if json {
                if outcome.truncated {
                    log::warn!("search stopped early, results are incomplete");
                }
                println!("{}", hits_json(&outcome.hits)?);
                return Ok(());
            }

            if outcome.hits.is_empty() {
                println!("No patches matching '{}' found.", query.trim());
            }
            for hit in &outcome.hits {
                println!(
                    "{}\t{:3}\t{}\t{}",
                    hit.relative_path.display(),
                    hit.number,
                    hit.name,
                    hit.variant
                );
            }
            if outcome.truncated {
                println!(
                    "Search stopped early after {} files, results are incomplete.",
                    outcome.files_searched + outcome.files_failed
                );
            }
        }
        Commands::List { path } => {
            let path = path
                .or_else(|| config.directory.clone())
                .ok_or_else(|| anyhow!("no path given and none configured"))?;

            let mut files = if path.is_dir() {
                DirectoryScanner.scan(&path)
            } else {
                vec![BulkDumpFile::from_path(&path)?]
            };
            files.sort_by(|a, b| a.path.cmp(&b.path));

            for file in files {
                let patches = match file.read_patches() {
                    Ok(patches) => patches,
                    Err(e) => {
                        log::warn!("{}", e);
                        continue;
                    }
                };

                println!("File: {}", file.path.display());
                println!("Instrument: {}", file.variant);
                for patch in patches {
                    println!("  - Voice {:3}: {}", patch.number, patch.name);
                }
                println!();
            }
        }
        Commands::Reveal { sysex_file } => {
            let path = resolve_sysex_path(&sysex_file, &config)?;
            SystemFileBrowser.reveal(&path)?;
        }
        Commands::Edit {
            sysex_file,
            patch_number,
            editor,
        } => {
            let path = resolve_sysex_path(&sysex_file, &config)?;
            let editor = editor
                .or_else(|| config.editor_path.clone())
                .ok_or_else(|| anyhow!("no patch editor given and none configured"))?;

            PatchEditor::new(editor).open(&path, patch_number)?;
        }
        Commands::Send {
            sysex_file,
            patch,
            device,
        } => {
            let path = resolve_sysex_path(&sysex_file, &config)?;
            let device = device
                .or_else(|| config.device_path.clone())
                .ok_or_else(|| anyhow!("no MIDI device given and none configured"))?;

            let request = SysexRequest::load(&path, patch)?;
            let port = OpenOptions::new()
                .write(true)
                .open(&device)
                .with_context(|| format!("unable to open MIDI device '{}'", device.display()))?;

            WriterTransmitter::new(port).transmit(&request)?;
            println!("Sent {} to {}", path.display(), device.display());
        }
    }

    Ok(())
}

/// JSON array of hits, one object per voice.
fn hits_json(hits: &[SearchHit]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(hits)
}

/// Accepts paths as printed by `search`, relative to the configured directory.
fn resolve_sysex_path(path: &Path, config: &Config) -> Result<PathBuf> {
    let candidate = if path.exists() {
        path.to_path_buf()
    } else if let Some(dir) = config.directory.as_ref().filter(|_| path.is_relative()) {
        dir.join(path)
    } else {
        path.to_path_buf()
    };

    if !candidate.is_file() {
        bail!("sysex file '{}' not found", path.display());
    }
    if !is_sysex_file(&candidate) {
        log::warn!("{} does not have a .syx extension", candidate.display());
    }

    candidate
        .canonicalize()
        .with_context(|| format!("unable to resolve '{}'", candidate.display()))
}
