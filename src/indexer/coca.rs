//! Indexer backed by the `coca` static analysis command
//!
//! `coca analysis` writes `<reporter>/deps.json`; `coca call -c <name>` and
//! `coca rcall -c <name>` write `<reporter>/call.dot` and `<reporter>/rcall.dot`.
//! All commands run with the project root as working directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{classify_edges, parse_dot_edges, CodeIndexer, Direction};
use crate::error::{ImpactError, Result};
use crate::impact::CallEdge;
use crate::index::CodeIndex;

/// Inventory document name inside the reporter directory
pub const DEPS_FILE: &str = "deps.json";

/// Drives an external indexer process
#[derive(Debug, Clone)]
pub struct CocaIndexer {
    command: String,
    project_root: PathBuf,
    reporter_dir: PathBuf,
}

impl CocaIndexer {
    /// `reporter_dir` is resolved against `project_root` when relative
    pub fn new(command: impl Into<String>, project_root: &Path, reporter_dir: &Path) -> Self {
        Self {
            command: command.into(),
            project_root: project_root.to_path_buf(),
            reporter_dir: project_root.join(reporter_dir),
        }
    }

    pub fn deps_path(&self) -> PathBuf {
        self.reporter_dir.join(DEPS_FILE)
    }

    /// Run the indexer with `args`, returning a failure reason on error
    fn run(&self, args: &[&str]) -> std::result::Result<(), String> {
        let _span = tracing::debug_span!("indexer_exec", cmd = %self.command, ?args).entered();
        let output = Command::new(&self.command)
            .args(args)
            .current_dir(&self.project_root)
            .output()
            .map_err(|e| format!("failed to start `{}`: {}", self.command, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`{} {}` exited with {}: {}",
                self.command,
                args.join(" "),
                output.status,
                stderr.trim()
            ));
        }
        Ok(())
    }

    fn probe(&self, qualified: &str, direction: Direction) -> Result<Vec<CallEdge>> {
        let (subcommand, dot_name) = match direction {
            Direction::Calls => ("call", "call.dot"),
            Direction::Callers => ("rcall", "rcall.dot"),
        };
        let dot_path = self.reporter_dir.join(dot_name);
        let fail = |reason: String| ImpactError::ProbeFailed {
            function: qualified.to_string(),
            reason,
        };

        // A stale graph from an earlier probe must never be read back
        match std::fs::remove_file(&dot_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(fail(format!("cannot clear {}: {}", dot_path.display(), e))),
        }

        self.run(&[subcommand, "-c", qualified]).map_err(fail)?;

        let dot = std::fs::read_to_string(&dot_path)
            .map_err(|e| fail(format!("missing output {}: {}", dot_path.display(), e)))?;
        let raw = parse_dot_edges(&dot)
            .map_err(|reason| fail(format!("malformed graph {}: {}", dot_path.display(), reason)))?;
        let edges = classify_edges(qualified, direction, raw);
        tracing::debug!(function = qualified, ?direction, edges = edges.len(), "Probed call graph");
        Ok(edges)
    }
}

impl CodeIndexer for CocaIndexer {
    fn analyze(&self) -> Result<()> {
        let _span = tracing::info_span!("indexer_analyze", cmd = %self.command).entered();
        self.run(&["analysis"])
            .map_err(|reason| ImpactError::IndexUnavailable {
                path: self.deps_path(),
                reason,
            })
    }

    fn load_index(&self) -> Result<CodeIndex> {
        CodeIndex::load(&self.deps_path())
    }

    fn query_calls(&self, qualified: &str) -> Result<Vec<CallEdge>> {
        self.probe(qualified, Direction::Calls)
    }

    fn query_callers(&self, qualified: &str) -> Result<Vec<CallEdge>> {
        self.probe(qualified, Direction::Callers)
    }
}
