//! Patch file, patch text, and patch command sources

use std::path::{Path, PathBuf};
use std::process::Command;

use super::DiffSource;
use crate::error::{ImpactError, Result};

/// A patch file on disk
#[derive(Debug, Clone)]
pub struct PatchFile {
    path: PathBuf,
}

impl PatchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiffSource for PatchFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| ImpactError::DiffUnreadable {
            origin: self.describe(),
            reason: e.to_string(),
        })
    }
}

/// Diff text already in memory
#[derive(Debug, Clone)]
pub struct PatchText(pub String);

impl DiffSource for PatchText {
    fn describe(&self) -> String {
        "<inline patch>".to_string()
    }

    fn read(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A command whose stdout is a unified diff
#[derive(Debug, Clone)]
pub struct PatchCommand {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl PatchCommand {
    /// Split a shell-style command line, e.g. `git diff HEAD~1 HEAD`
    pub fn parse(command_line: &str, cwd: &Path) -> Result<Self> {
        let argv = shell_words::split(command_line).map_err(|e| ImpactError::DiffUnreadable {
            origin: command_line.to_string(),
            reason: format!("cannot split command: {e}"),
        })?;
        if argv.is_empty() {
            return Err(ImpactError::DiffUnreadable {
                origin: command_line.to_string(),
                reason: "empty patch command".to_string(),
            });
        }
        Ok(Self {
            argv,
            cwd: cwd.to_path_buf(),
        })
    }
}

impl DiffSource for PatchCommand {
    fn describe(&self) -> String {
        shell_words::join(&self.argv)
    }

    fn read(&self) -> Result<String> {
        let fail = |reason: String| ImpactError::DiffUnreadable {
            origin: self.describe(),
            reason,
        };
        let output = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .current_dir(&self.cwd)
            .output()
            .map_err(|e| fail(format!("failed to start: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("exited with {}: {}", output.status, stderr.trim())));
        }
        String::from_utf8(output.stdout).map_err(|_| fail("output is not UTF-8".to_string()))
    }
}
