//! # diffimpact - change-impact reports from diffs
//!
//! Given a unified diff and an external code index (per-file function
//! inventory plus a call-graph query), works out which functions a patch
//! touches and which calls they make into a namespace of interest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use diffimpact::{CocaIndexer, Engine, EngineConfig, PatchFile};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = Path::new(".");
//! let engine = Engine::new(
//!     PatchFile::new("change.patch"),
//!     CocaIndexer::new("coca", root, Path::new("coca_reporter")),
//!     EngineConfig {
//!         namespace: "com.acme".into(),
//!         json_out: Some("impact.json".into()),
//!         ..Default::default()
//!     },
//! );
//! let outcome = engine.run()?;
//! println!("{} files changed", outcome.report.file_count());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diff_parse;
pub mod engine;
pub mod error;
pub mod impact;
pub mod index;
pub mod indexer;
pub mod outline;
pub mod source;

pub use config::Config;
pub use engine::{Engine, EngineConfig, RunOutcome};
pub use error::ImpactError;
pub use impact::{
    CallEdge, CallMerge, ChangeBlock, ChangeRange, EdgeKind, FunctionRecord, ImpactReport,
};
pub use index::CodeIndex;
pub use indexer::{CocaIndexer, CodeIndexer};
pub use outline::OutlineDocument;
pub use source::{DiffSource, PatchCommand, PatchFile, PatchText};
