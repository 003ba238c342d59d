//! Diff sources
//!
//! A `DiffSource` yields the hunks of one unified diff. The patch can come
//! from a file on disk, an in-memory string, or the stdout of a command such
//! as `git diff HEAD~1 HEAD`.

mod patch;

pub use patch::{PatchCommand, PatchFile, PatchText};

use crate::diff_parse::{looks_like_unified_diff, parse_unified_diff, DiffHunk};
use crate::error::{ImpactError, Result};

/// A provider of unified-diff hunks
pub trait DiffSource {
    /// Human-readable origin for error messages and logs
    fn describe(&self) -> String;

    /// Load the raw diff text
    fn read(&self) -> Result<String>;

    /// Load and parse the diff into hunks, in diff order
    fn load(&self) -> Result<Vec<DiffHunk>> {
        let _span = tracing::info_span!("diff_load", origin = %self.describe()).entered();
        let text = self.read()?;
        parse_checked(&self.describe(), &text)
    }
}

/// Parse diff text, rejecting input that carries no diff structure at all
pub fn parse_checked(origin: &str, text: &str) -> Result<Vec<DiffHunk>> {
    if !looks_like_unified_diff(text) {
        return Err(ImpactError::DiffUnreadable {
            origin: origin.to_string(),
            reason: "input is not a unified diff".to_string(),
        });
    }
    let hunks = parse_unified_diff(text);
    tracing::info!(hunks = hunks.len(), "Parsed diff");
    Ok(hunks)
}

impl<T: DiffSource + ?Sized> DiffSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn read(&self) -> Result<String> {
        (**self).read()
    }
}
