use anyhow::{Context, Result, bail};
use bqpager_engine::{PAGE_SIZE, PagerOptions};
use bqpager_types::{HeaderStyle, NULL_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::Cli;

/// Read-only user settings. The file is optional and never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page_size: usize,
    pub show_required_row: bool,
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub null_marker: String,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            show_required_row: true,
            project_id: None,
            location: None,
            null_marker: NULL_MARKER.to_string(),
            poll_interval_ms: 1000,
        }
    }
}

impl Config {
    /// Loads `explicit` if given (it must exist), else the default path if
    /// present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                Self::load_from(path)
            }
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bqpager").join("config.toml"))
    }

    /// Command-line flags win over file values.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(page_size) = cli.page_size {
            self.page_size = page_size;
        }
        if cli.no_required_row {
            self.show_required_row = false;
        }
        if cli.location.is_some() {
            self.location = cli.location.clone();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be greater than zero");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn pager_options(&self) -> PagerOptions {
        PagerOptions {
            page_size: self.page_size,
            header_style: HeaderStyle::from_flag(self.show_required_row),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 30);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 50\nnull_marker = \"<null>\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.null_marker, "<null>");
        assert!(config.show_required_row);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::parse_from([
            "bqpager",
            "--page-size",
            "10",
            "--no-required-row",
            "--location",
            "EU",
        ]);
        let config = Config {
            page_size: 50,
            ..Config::default()
        }
        .with_cli(&cli);

        assert_eq!(config.page_size, 10);
        assert_eq!(config.location.as_deref(), Some("EU"));
        assert_eq!(config.pager_options().header_style, HeaderStyle::Compact);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let config = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
