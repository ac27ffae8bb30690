//! Persisted settings shared by the CLI commands

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::search::SearchOptions;

/// Default location of the config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// User settings. Every key is optional and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding the cartridge collection
    pub directory: Option<PathBuf>,
    /// Patch editor executable
    #[serde(alias = "dexed_path")]
    pub editor_path: Option<PathBuf>,
    /// Raw MIDI device receiving SYSEX dumps
    #[serde(alias = "midi_output_port")]
    pub device_path: Option<PathBuf>,
    /// Search worker threads, defaults to the number of CPUs
    pub workers: Option<usize>,
    /// Maximum number of files searched per query
    pub max_files: Option<usize>,
    /// Search time limit in milliseconds
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Loads the config file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Config = serde_json::from_str(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::debug!("loaded {}: {:?}", path.display(), config);

        Ok(config)
    }

    /// Writes the settings to `path` as pretty printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("saved {}", path.display());
        Ok(())
    }

    /// Search options with the configured limits applied to the defaults.
    pub fn search_options(&self) -> SearchOptions {
        let mut options = SearchOptions::default();
        if let Some(workers) = self.workers {
            options.workers = workers.max(1);
        }
        options.max_files = self.max_files;
        options.timeout = self.timeout_ms.map(Duration::from_millis);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_legacy_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "directory": "/carts",
                "dexed_path": "/usr/bin/dexed",
                "midi_output_port": "/dev/snd/midiC1D0",
                "midi_input_port": "",
                "midi_channel": 1
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.directory, Some(PathBuf::from("/carts")));
        assert_eq!(config.editor_path, Some(PathBuf::from("/usr/bin/dexed")));
        assert_eq!(config.device_path, Some(PathBuf::from("/dev/snd/midiC1D0")));
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ directory: ").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let config = Config {
            directory: Some(PathBuf::from("/carts")),
            workers: Some(4),
            timeout_ms: Some(2500),
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);

        let options = loaded.search_options();
        assert_eq!(options.workers, 4);
        assert_eq!(options.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(options.max_files, None);
    }
}
