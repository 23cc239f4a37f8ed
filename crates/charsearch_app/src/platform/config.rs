use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use charsearch_core::{parse_api_base, SearchSettings, DEFAULT_API_BASE};
use charsearch_engine::{EngineConfig, FetchSettings};
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "charsearch.ron";

/// charsearch - browse indexed character images page by page
#[derive(Debug, Parser)]
#[command(name = "charsearch")]
#[command(about = "Search indexed character images and scroll through the results", long_about = None)]
pub struct Cli {
    /// Path to a RON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the search API (e.g. http://localhost:8090/api/)
    #[arg(long)]
    pub api: Option<String>,

    /// Results requested per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Directory for downloaded images and saved state
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Character to search for right away
    pub character: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid api base {url:?}: {message}")]
    ApiBase { url: String, message: String },
    #[error("page size must be at least 1")]
    PageSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub api_base: String,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub viewport_rows: u32,
    pub download_dir: PathBuf,
    pub log: LogDestination,
    pub restore_last_search: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let search = SearchSettings::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: search.page_size,
            max_retries: search.max_retries,
            retry_base_delay_ms: search.retry_base_delay.as_millis() as u64,
            request_timeout_secs: FetchSettings::default().request_timeout.as_secs(),
            viewport_rows: 20,
            download_dir: PathBuf::from("downloads"),
            log: LogDestination::File,
            restore_last_search: true,
        }
    }
}

impl ViewerConfig {
    /// Reads `explicit` if given (it must exist), else the default file if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(api) = &cli.api {
            self.api_base = api.clone();
        }
        if let Some(page_size) = cli.page_size {
            self.page_size = page_size;
        }
        if let Some(log) = cli.log {
            self.log = log;
        }
        if let Some(dir) = &cli.download_dir {
            self.download_dir = dir.clone();
        }
    }

    pub fn search_settings(&self) -> Result<SearchSettings, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::PageSize);
        }
        let api_base = parse_api_base(&self.api_base).map_err(|err| ConfigError::ApiBase {
            url: self.api_base.clone(),
            message: err.to_string(),
        })?;
        Ok(SearchSettings {
            api_base,
            page_size: self.page_size,
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_downloads(self.download_dir.clone());
        config.fetch.request_timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("charsearch.ron");
        fs::write(&path, "(page_size: 50, log: both)").unwrap();

        let config = ViewerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.log, LogDestination::Both);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.viewport_rows, 20);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = ViewerConfig::load(Some(&temp.path().join("nope.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(page_size: \"many\")").unwrap();
        assert!(matches!(
            ViewerConfig::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "charsearch",
            "--api",
            "http://example.test/api",
            "--page-size",
            "5",
            "--log",
            "off",
            "monika",
        ]);
        let mut config = ViewerConfig::default();
        config.apply_cli(&cli);

        assert_eq!(config.page_size, 5);
        assert_eq!(config.log, LogDestination::Off);
        assert_eq!(cli.character.as_deref(), Some("monika"));

        let settings = config.search_settings().unwrap();
        assert_eq!(settings.api_base.as_str(), "http://example.test/api/");
        assert_eq!(settings.page_size, 5);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = ViewerConfig {
            page_size: 0,
            ..ViewerConfig::default()
        };
        assert!(matches!(config.search_settings(), Err(ConfigError::PageSize)));
    }

    #[test]
    fn unparsable_api_base_is_rejected() {
        let config = ViewerConfig {
            api_base: "not a url".into(),
            ..ViewerConfig::default()
        };
        assert!(matches!(
            config.search_settings(),
            Err(ConfigError::ApiBase { .. })
        ));
    }
}
