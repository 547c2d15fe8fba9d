//! Shared fixture for CLI integration tests.
#![cfg(test)]
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated config file and query directory. Credential variables are
/// cleared so no test can reach BigQuery.
pub struct TestFixture {
    _temp_dir: TempDir,
    config_path: PathBuf,
    root: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let config_path = root.join("config.toml");
        fs::write(&config_path, "").expect("Failed to write config");

        Self {
            _temp_dir: temp_dir,
            config_path,
            root,
        }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).expect("Failed to write config");
    }

    pub fn write_query(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).expect("Failed to write query");
        path
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("bqpager").expect("Failed to find bqpager binary");
        cmd.arg("--config")
            .arg(&self.config_path)
            .env_remove("BQPAGER_ACCESS_TOKEN")
            .env_remove("BQPAGER_PROJECT")
            .env_remove("GOOGLE_CLOUD_PROJECT")
            .env_remove("BQPAGER_LOG");
        cmd
    }
}
