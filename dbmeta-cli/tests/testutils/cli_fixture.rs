//! CLI test fixture
//!
//! Runs the `dbmeta` binary as a separate process against the sample catalog
//! snapshot, optionally with a model configuration written to a temporary
//! directory. Listings are requested as JSON and parsed from stdout.

use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub struct CliFixture {
    _temp_dir: TempDir,
    snapshot: PathBuf,
    config: Option<PathBuf>,
}

/// Captured result of one CLI invocation
pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CliOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl CliFixture {
    /// Sample catalog with the default configuration
    pub fn sample() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            _temp_dir: tempfile::tempdir()?,
            snapshot: sample_catalog_path(),
            config: None,
        })
    }

    /// Sample catalog with `config_json` passed through `--config`
    pub fn with_config(config_json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let config = temp_dir.path().join("config.json");
        std::fs::write(&config, config_json)?;
        Ok(Self {
            _temp_dir: temp_dir,
            snapshot: sample_catalog_path(),
            config: Some(config),
        })
    }

    /// Run `dbmeta <command> --snapshot .. [--config ..] <args>`
    pub fn run(&self, command: &str, args: &[&str]) -> CliOutput {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dbmeta"));
        cmd.arg(command).arg("--snapshot").arg(&self.snapshot);
        if let Some(config) = &self.config {
            cmd.arg("--config").arg(config);
        }
        cmd.args(args)
            .env("RUST_LOG", "error")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to spawn dbmeta")
            .into()
    }

    /// Run a command with `--format json` and expect a successful listing
    pub fn assert_listing(&self, command: &str, args: &[&str]) -> (JsonValue, CliOutput) {
        let mut json_args = args.to_vec();
        json_args.extend(["--format", "json"]);
        let output = self.run(command, &json_args);
        assert!(
            output.success,
            "dbmeta {} failed: {}",
            command, output.stderr
        );

        let listing: JsonValue = serde_json::from_str(&output.stdout).unwrap_or_else(|e| {
            panic!("stdout of dbmeta {} is not JSON ({}): {}", command, e, output.stdout)
        });
        assert_eq!(listing["status"], "success");
        (listing, output)
    }
}

fn sample_catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/sample_catalog.json")
}
