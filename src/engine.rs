//! Impact engine: diff source + code indexer + frozen settings
//!
//! Pipeline: load diff → analyze (optional) → load code index → build
//! blocks → attach functions → probe call graph → export. Any fatal error
//! stops the run before a single artifact is written.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ImpactError, Result};
use crate::impact::{self, CallMerge, ImpactReport, ProbeOptions};
use crate::indexer::CodeIndexer;
use crate::outline::OutlineDocument;
use crate::source::DiffSource;

/// Default title of the outline sheet's root topic
pub const DEFAULT_OUTLINE_TITLE: &str = "diff impact";

/// Immutable settings for one engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Call/caller namespace prefix; empty disables probing
    pub namespace: String,
    pub merge: CallMerge,
    pub reverse: bool,
    /// Run the indexer's analysis before loading the inventory
    pub run_analysis: bool,
    pub json_out: Option<PathBuf>,
    pub outline_out: Option<PathBuf>,
    pub outline_title: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            merge: CallMerge::default(),
            reverse: true,
            run_analysis: true,
            json_out: None,
            outline_out: None,
            outline_title: DEFAULT_OUTLINE_TITLE.to_string(),
        }
    }
}

/// Result of a completed run
#[derive(Debug)]
pub struct RunOutcome {
    pub report: ImpactReport,
    /// Artifacts written, in the order they were written
    pub written: Vec<PathBuf>,
}

/// A fully rendered artifact waiting to be written
struct Artifact {
    path: PathBuf,
    contents: String,
}

pub struct Engine<D, I> {
    diff: D,
    indexer: I,
    config: EngineConfig,
}

impl<D: DiffSource, I: CodeIndexer> Engine<D, I> {
    pub fn new(diff: D, indexer: I, config: EngineConfig) -> Self {
        Self {
            diff,
            indexer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the report without writing anything
    pub fn analyze(&self) -> Result<ImpactReport> {
        let _span = tracing::info_span!("engine_analyze").entered();

        let hunks = self.diff.load()?;

        if self.config.run_analysis {
            self.indexer.analyze()?;
        }
        let index = self.indexer.load_index()?;

        let mut report = impact::match_hunks(&hunks, &index);

        let options = ProbeOptions {
            namespace: self.config.namespace.clone(),
            merge: self.config.merge,
            reverse: self.config.reverse,
        };
        impact::probe_calls(&mut report, &self.indexer, &options)?;

        let summary = report.summary();
        tracing::info!(
            files = summary.file_count,
            blocks = summary.block_count,
            functions = summary.function_count,
            calls = summary.call_count,
            callers = summary.caller_count,
            "Impact report built"
        );
        Ok(report)
    }

    /// Render every configured export, then write them all or none.
    ///
    /// Rendering and staging (a temp file beside each destination, fully
    /// written) happen before any destination is touched. Only then are the
    /// temp files renamed into place; if a rename fails, destinations already
    /// replaced get their previous contents back.
    pub fn export(&self, report: &ImpactReport) -> Result<Vec<PathBuf>> {
        let _span = tracing::info_span!("engine_export").entered();
        let mut artifacts = Vec::new();

        if let Some(path) = &self.config.json_out {
            artifacts.push(Artifact {
                path: path.clone(),
                contents: impact::report_to_json_string(report)?,
            });
        }
        if let Some(path) = &self.config.outline_out {
            let mut doc = OutlineDocument::load_or_new(path)?;
            doc.add_report(report, &self.config.outline_title);
            artifacts.push(Artifact {
                path: path.clone(),
                contents: doc.to_json_string()?,
            });
        }

        // Dropping a staged file deletes its temp file
        let staged = artifacts
            .iter()
            .map(|a| StagedFile::stage(&a.path, &a.contents))
            .collect::<Result<Vec<_>>>()?;
        let written = commit_all(staged)?;
        for path in &written {
            tracing::info!(path = %path.display(), "Wrote export");
        }
        Ok(written)
    }

    /// Full pipeline: analyze, then export
    pub fn run(&self) -> Result<RunOutcome> {
        let report = self.analyze()?;
        let written = self.export(&report)?;
        Ok(RunOutcome { report, written })
    }
}

/// Contents fully written to a temp file next to its destination
struct StagedFile {
    tmp: tempfile::NamedTempFile,
    path: PathBuf,
    /// What the destination held before, for rollback
    previous: Option<Vec<u8>>,
}

impl StagedFile {
    fn stage(path: &Path, contents: &str) -> Result<Self> {
        let export_err = |source: std::io::Error| ImpactError::Export {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(export_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(export_err)?;
        tmp.write_all(contents.as_bytes()).map_err(export_err)?;
        tmp.flush().map_err(export_err)?;
        let previous = if path.is_file() {
            Some(std::fs::read(path).map_err(export_err)?)
        } else {
            None
        };
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
            previous,
        })
    }
}

/// Rename every staged file into place, undoing earlier renames on failure
fn commit_all(staged: Vec<StagedFile>) -> Result<Vec<PathBuf>> {
    let mut committed: Vec<(PathBuf, Option<Vec<u8>>)> = Vec::with_capacity(staged.len());
    for file in staged {
        let StagedFile {
            tmp,
            path,
            previous,
        } = file;
        if let Err(e) = tmp.persist(&path) {
            for (done, before) in committed.iter().rev() {
                restore(done, before.as_deref());
            }
            return Err(ImpactError::Export {
                path,
                source: e.error,
            });
        }
        committed.push((path, previous));
    }
    Ok(committed.into_iter().map(|(path, _)| path).collect())
}

/// Best-effort rollback of one replaced destination
fn restore(path: &Path, previous: Option<&[u8]>) {
    let outcome = match previous {
        Some(bytes) => std::fs::write(path, bytes),
        None => std::fs::remove_file(path),
    };
    if let Err(e) = outcome {
        tracing::warn!(path = %path.display(), error = %e, "Failed to roll back export");
    }
}

/// Write via a sibling temp file renamed into place
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    commit_all(vec![StagedFile::stage(path, contents)?])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.json");
        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1, "temp files must not linger");
    }

    #[test]
    fn test_failed_rename_restores_earlier_destinations() {
        let dir = tempfile::TempDir::new().unwrap();
        let kept = dir.path().join("kept.json");
        let fresh = dir.path().join("fresh.json");
        std::fs::write(&kept, "old").unwrap();
        // A directory at the destination makes the rename fail
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("inside"), "x").unwrap();

        let staged = vec![
            StagedFile::stage(&kept, "new").unwrap(),
            StagedFile::stage(&fresh, "new").unwrap(),
            StagedFile::stage(&blocked, "new").unwrap(),
        ];
        assert!(matches!(commit_all(staged), Err(ImpactError::Export { .. })));

        assert_eq!(std::fs::read_to_string(&kept).unwrap(), "old");
        assert!(!fresh.exists());
        assert!(blocked.is_dir());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2, "temp files must not linger: {names:?}");
    }

    #[test]
    fn test_default_config_probes_nothing_and_writes_nothing() {
        let config = EngineConfig::default();
        assert!(config.namespace.is_empty());
        assert!(config.json_out.is_none() && config.outline_out.is_none());
        assert_eq!(config.merge, CallMerge::Accumulate);
    }
}
