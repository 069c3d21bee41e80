// shared utilities for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// scratch directory holding a config file, programs and device status files
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// new workspace with a default config (fast tick, fast polling)
    pub fn new() -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        };
        workspace.write_json(
            "config.json",
            &serde_json::json!({
                "settings": { "tick_hz": 1000, "poll_interval_ms": 20 }
            }),
        );
        workspace
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path("config.json")
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn write_json(&self, name: &str, value: &serde_json::Value) -> PathBuf {
        self.write(name, &serde_json::to_string_pretty(value).unwrap())
    }

    pub fn read_json(&self, name: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.path(name)).expect("Failed to read test file");
        serde_json::from_str(&content).expect("Invalid JSON in test file")
    }

    /// run railblocks with this workspace's config and working directory
    pub fn run(&self, args: &[&str]) -> Output {
        run_railblocks(self.dir.path(), &self.config_path(), args)
    }
}

pub fn railblocks_binary() -> &'static str {
    env!("CARGO_BIN_EXE_railblocks")
}

/// run railblocks command and capture output
pub fn run_railblocks(cwd: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(railblocks_binary())
        .current_dir(cwd)
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RAILBLOCKS_LOG")
        .env_remove("RAILBLOCKS_CONFIG")
        .output()
        .expect("Failed to run railblocks")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// parse the single JSON-RPC line printed by --json
pub fn json_response(output: &Output) -> serde_json::Value {
    let text = stdout(output);
    let line = text
        .lines()
        .rev()
        .find(|l| l.contains("\"jsonrpc\""))
        .unwrap_or_else(|| panic!("no JSON-RPC line in output: {}", text));
    serde_json::from_str(line).expect("Invalid JSON-RPC line")
}

/// program with a setup list and an empty main loop
pub fn sample_program() -> serde_json::Value {
    serde_json::json!([
        { "id": "setup", "type": "once", "position": { "x": 0.0, "y": 0.0 }, "children": [
            { "id": "a", "type": "log", "value": "first" },
            { "id": "b", "type": "log", "value": "second" }
        ]},
        { "id": "main", "type": "forever", "position": { "x": 400.0, "y": 0.0 }, "children": [] }
    ])
}
