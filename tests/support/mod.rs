#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Sample data is served without the simulated network latency.
const FAST_CONFIG: &str = "\
[api]
mock_delay_ms = 0

[assistant]
reply_delay_ms = 0
";

/// A throwaway state directory for one test.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("config.toml"), FAST_CONFIG)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    /// `pms --home <dir> --offline` with the ambient PMS_* variables cleared.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pms").expect("binary");
        for var in ["PMS_ROLE", "PMS_HOME", "PMS_API_URL", "PMS_PASSWORD", "RUST_LOG"] {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path());
        cmd.arg("--home").arg(self.dir.path()).arg("--offline");
        cmd
    }

    /// Run with `--json`, expect success and return the envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }

    /// Run with `--json`, expect the given exit code and return the envelope.
    pub fn json_failure(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json error envelope")
    }
}
