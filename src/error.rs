//! Error taxonomy for the impact pipeline
//!
//! Every variant here is fatal for the current run. Recoverable conditions
//! (a changed file missing from the inventory, an empty probe result) are
//! not errors: they surface as empty collections in the report.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    /// Diff input missing, unreadable, or produced by a failing command
    #[error("Diff unreadable ({origin}): {reason}")]
    DiffUnreadable { origin: String, reason: String },

    /// Function inventory or the indexer that produces it is unavailable
    #[error("Code index unavailable ({}): {reason}", path.display())]
    IndexUnavailable { path: PathBuf, reason: String },

    /// Call-graph query failed or produced output we cannot interpret
    #[error("Call graph probe failed for {function}: {reason}")]
    ProbeFailed { function: String, reason: String },

    /// Writing an export artifact failed
    #[error("Failed to write {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing outline document could not be loaded
    #[error("Outline document {} is not readable: {reason}", path.display())]
    Outline { path: PathBuf, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImpactError {
    /// Pipeline stage the error belongs to, for user-facing messages
    pub fn stage(&self) -> &'static str {
        match self {
            ImpactError::DiffUnreadable { .. } => "diff",
            ImpactError::IndexUnavailable { .. } => "index",
            ImpactError::ProbeFailed { .. } => "probe",
            ImpactError::Export { .. } | ImpactError::Outline { .. } | ImpactError::Json(_) => {
                "export"
            }
            ImpactError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImpactError>;
