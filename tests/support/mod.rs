#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory passed to every command via `--data-dir`.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = todocal_cmd();
        cmd.arg("--data-dir").arg(self.dir.path());
        cmd
    }

    /// Run with `--json`, require success and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).output()?;
        if !output.status.success() {
            return Err(format!(
                "todocal {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stdout)
            )
            .into());
        }
        let envelope: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(envelope["status"], "success");
        Ok(envelope["data"].clone())
    }

    /// Run with `--json`, require failure and return the whole envelope.
    pub fn json_err(&self, args: &[&str]) -> Result<(i32, Value), Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).output()?;
        let code = output.status.code().unwrap_or(-1);
        let envelope: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(envelope["status"], "error");
        Ok((code, envelope))
    }

    /// Rows of a JSONL table in the data directory.
    pub fn rows(&self, name: &str) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
        let path = self.file(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(trimmed)?);
        }
        Ok(rows)
    }

    pub fn id_of(value: &Value) -> u64 {
        value["id"].as_u64().expect("id")
    }
}

pub fn todocal_cmd() -> Command {
    let mut cmd = Command::cargo_bin("todocal").expect("binary");
    cmd.env_remove("TODOCAL_HOME");
    cmd.env_remove("RUST_LOG");
    cmd
}
