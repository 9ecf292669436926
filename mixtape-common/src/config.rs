//! Configuration loading
//!
//! Settings are resolved with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default SQLite database file name inside the data directory
pub const DATABASE_FILE_NAME: &str = "mixtape.db";

/// Optional TOML config file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Directory holding the service database
    pub data_dir: Option<PathBuf>,
    /// Port the HTTP server listens on
    pub port: Option<u16>,
    /// Base URL of the aggregated music-data search API
    pub music_api_endpoint: Option<String>,
    /// Token for the music-data search API
    pub music_api_token: Option<String>,
}

impl FileConfig {
    /// Parse a TOML config file. A missing file is not an error; it simply
    /// contributes nothing to the resolution chain.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("parse {}: {}", path.display(), e)))
    }
}

/// Resolve the data directory from the priority chain.
pub fn resolve_data_dir(cli_arg: Option<&Path>, file: &FileConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("MIXTAPE_DATA_DIR") {
        return PathBuf::from(path);
    }
    if let Some(ref path) = file.data_dir {
        return path.clone();
    }
    PathBuf::from("./mixtape_data")
}

/// Resolve the listen port from the priority chain.
pub fn resolve_port(cli_arg: Option<u16>, file: &FileConfig) -> u16 {
    if let Some(port) = cli_arg {
        return port;
    }
    if let Ok(port) = std::env::var("MIXTAPE_PORT") {
        if let Ok(port) = port.parse() {
            return port;
        }
    }
    file.port.unwrap_or(5780)
}

/// Resolve the music-data search API endpoint. Optional: when absent the
/// service runs with search disabled. Env > file; there is no default and no
/// CLI flag (the token pairs with it and does not belong on a command line).
pub fn resolve_music_api_endpoint(file: &FileConfig) -> Option<String> {
    std::env::var("MIXTAPE_MUSIC_API_ENDPOINT")
        .ok()
        .or_else(|| file.music_api_endpoint.clone())
}

/// Resolve the music-data search API token. Env > file, no default.
pub fn resolve_music_api_token(file: &FileConfig) -> Option<String> {
    std::env::var("MIXTAPE_MUSIC_API_TOKEN")
        .ok()
        .or_else(|| file.music_api_token.clone())
}

/// Full path of the database file inside the resolved data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_wins_over_file() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/from/file")),
            port: Some(1234),
            ..Default::default()
        };
        let dir = resolve_data_dir(Some(Path::new("/from/cli")), &file);
        assert_eq!(dir, PathBuf::from("/from/cli"));
        assert_eq!(resolve_port(Some(9999), &file), 9999);
    }

    #[test]
    fn file_value_used_when_no_cli_arg() {
        let file = FileConfig {
            data_dir: Some(PathBuf::from("/from/file")),
            port: Some(1234),
            ..Default::default()
        };
        // Env vars are unset in the test environment for these keys
        if std::env::var("MIXTAPE_DATA_DIR").is_err() {
            assert_eq!(resolve_data_dir(None, &file), PathBuf::from("/from/file"));
        }
        if std::env::var("MIXTAPE_PORT").is_err() {
            assert_eq!(resolve_port(None, &file), 1234);
        }
    }

    #[test]
    fn defaults_when_nothing_configured() {
        let file = FileConfig::default();
        if std::env::var("MIXTAPE_PORT").is_err() {
            assert_eq!(resolve_port(None, &file), 5780);
        }
    }

    #[test]
    fn missing_config_file_is_empty() {
        let file = FileConfig::load(Path::new("/nonexistent/mixtape.toml")).unwrap();
        assert!(file.data_dir.is_none());
        assert!(file.port.is_none());
        assert!(file.music_api_endpoint.is_none());
        assert!(file.music_api_token.is_none());
    }

    #[test]
    fn music_api_settings_come_from_file_without_env() {
        let file = FileConfig {
            music_api_endpoint: Some("https://music-api.example".to_string()),
            music_api_token: Some("secret".to_string()),
            ..Default::default()
        };
        if std::env::var("MIXTAPE_MUSIC_API_ENDPOINT").is_err() {
            assert_eq!(
                resolve_music_api_endpoint(&file).as_deref(),
                Some("https://music-api.example")
            );
        }
        if std::env::var("MIXTAPE_MUSIC_API_TOKEN").is_err() {
            assert_eq!(resolve_music_api_token(&file).as_deref(), Some("secret"));
        }

        // Unconfigured search is a valid state, not an error
        let empty = FileConfig::default();
        if std::env::var("MIXTAPE_MUSIC_API_ENDPOINT").is_err() {
            assert!(resolve_music_api_endpoint(&empty).is_none());
        }
    }
}
