//! Common test utilities and fixtures

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Exported log with users Alex (3 rows) and Sam (1 short row)
pub fn small_log_fixture() -> PathBuf {
    fixture_path("small_log.csv")
}

/// A `metabolic-tracker` command that can't see the developer's own
/// config files or METABOLIC_* variables. Runs inside `home`.
pub fn tracker_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("metabolic-tracker").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    for var in [
        "METABOLIC_CONFIG",
        "METABOLIC_DATA",
        "METABOLIC_DEFAULT_USER",
        "METABOLIC_EXPORT_FILE",
        "METABOLIC_LOG_LEVEL",
        "METABOLIC_LOG_FILE",
        "METABOLIC_LOG_JSON",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Fresh temp dir plus an isolated command rooted in it
pub fn isolated() -> (TempDir, Command) {
    let dir = TempDir::new().unwrap();
    let cmd = tracker_cmd(dir.path());
    (dir, cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_exist() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
        assert!(small_log_fixture().exists());
    }
}
