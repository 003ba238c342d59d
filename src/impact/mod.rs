//! Change-impact core
//!
//! Matches diff ranges against the code index, probes the call graph for
//! each affected function, and serializes the resulting report.

mod format;
mod matcher;
mod probe;
mod types;

pub use types::{
    CallEdge, ChangeBlock, ChangeRange, EdgeKind, FunctionRecord, ImpactReport, ReportSummary,
};

pub use format::{report_from_json, report_to_json, report_to_json_string};
pub use matcher::{attach_functions, build_blocks, match_hunks};
pub use probe::{probe_calls, CallMerge, ProbeOptions};
