//! External code indexer abstraction
//!
//! The indexer owns static analysis. We consume two of its products: the
//! per-file function inventory and, per qualified function name, the set of
//! call edges touching it. `CodeIndexer` is the seam; `CocaIndexer` drives a
//! real indexer process and tests substitute canned data.

mod coca;

pub use coca::CocaIndexer;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::impact::{CallEdge, EdgeKind};
use crate::index::CodeIndex;

/// A source of function inventories and call edges
pub trait CodeIndexer {
    /// Run the analysis that (re)produces the inventory document
    fn analyze(&self) -> Result<()>;

    /// Load the inventory produced by `analyze`
    fn load_index(&self) -> Result<CodeIndex>;

    /// Edges leaving `qualified`, deduplicated, in discovery order
    fn query_calls(&self, qualified: &str) -> Result<Vec<CallEdge>>;

    /// Edges arriving at `qualified`, deduplicated, in discovery order
    fn query_callers(&self, qualified: &str) -> Result<Vec<CallEdge>>;
}

impl<T: CodeIndexer + ?Sized> CodeIndexer for &T {
    fn analyze(&self) -> Result<()> {
        (**self).analyze()
    }

    fn load_index(&self) -> Result<CodeIndex> {
        (**self).load_index()
    }

    fn query_calls(&self, qualified: &str) -> Result<Vec<CallEdge>> {
        (**self).query_calls(qualified)
    }

    fn query_callers(&self, qualified: &str) -> Result<Vec<CallEdge>> {
        (**self).query_callers(qualified)
    }
}

/// Probe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The probed function is the caller
    Calls,
    /// The probed function is the callee
    Callers,
}

static EDGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("(?:[^"\\]|\\.)*"|[\w.$:<>]+)\s*->\s*("(?:[^"\\]|\\.)*"|[\w.$:<>]+)"#)
        .expect("hardcoded edge regex")
});

fn unquote(id: &str) -> String {
    match id.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\""),
        None => id.to_string(),
    }
}

/// Extract `(source, destination)` pairs from a DOT digraph.
///
/// Returns `Err` with a reason when the text is not a digraph at all.
pub fn parse_dot_edges(dot: &str) -> std::result::Result<Vec<(String, String)>, String> {
    if !dot.lines().any(|l| l.trim_start().starts_with("digraph") || l.trim_start().starts_with("strict digraph")) {
        return Err("no digraph header".to_string());
    }
    Ok(dot
        .lines()
        .filter_map(|line| EDGE_RE.captures(line))
        .map(|caps| (unquote(&caps[1]), unquote(&caps[2])))
        .collect())
}

/// Label raw edges relative to the probed name and drop duplicates.
///
/// An edge is `Direct` when the probed name appears textually on its side
/// of the edge (source for `Calls`, destination for `Callers`).
pub fn classify_edges(
    qualified: &str,
    direction: Direction,
    raw: impl IntoIterator<Item = (String, String)>,
) -> Vec<CallEdge> {
    dedup_edges(raw.into_iter().map(|(source, destination)| {
        let own_side = match direction {
            Direction::Calls => &source,
            Direction::Callers => &destination,
        };
        let kind = if own_side.contains(qualified) {
            EdgeKind::Direct
        } else {
            EdgeKind::Indirect
        };
        CallEdge {
            source,
            destination,
            kind,
        }
    }))
}

/// Set semantics over `(source, destination, kind)`, first occurrence wins
pub fn dedup_edges(edges: impl IntoIterator<Item = CallEdge>) -> Vec<CallEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|e| seen.insert(e.clone()))
        .collect()
}
