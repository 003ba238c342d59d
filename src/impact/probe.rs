//! Call-graph probing for affected functions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indexer::{dedup_edges, CodeIndexer, Direction};

use super::types::{CallEdge, ImpactReport};

/// How edges from several functions in one block combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CallMerge {
    /// Union of every function's edges, first occurrence order
    #[default]
    Accumulate,
    /// Only the most recently probed function's edges survive
    Last,
}

/// Settings for one probe pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Destination prefix for calls, source prefix for callers.
    /// Empty disables probing entirely.
    pub namespace: String,
    pub merge: CallMerge,
    /// Also probe reverse edges (who calls the changed function)
    pub reverse: bool,
}

/// Memoized queries: each qualified name is probed at most once per direction
struct ProbeCache<'a, I: CodeIndexer + ?Sized> {
    indexer: &'a I,
    calls: HashMap<String, Vec<CallEdge>>,
    callers: HashMap<String, Vec<CallEdge>>,
}

impl<'a, I: CodeIndexer + ?Sized> ProbeCache<'a, I> {
    fn new(indexer: &'a I) -> Self {
        Self {
            indexer,
            calls: HashMap::new(),
            callers: HashMap::new(),
        }
    }

    fn get(&mut self, qualified: &str, direction: Direction) -> Result<&[CallEdge]> {
        let cache = match direction {
            Direction::Calls => &mut self.calls,
            Direction::Callers => &mut self.callers,
        };
        if !cache.contains_key(qualified) {
            let edges = match direction {
                Direction::Calls => self.indexer.query_calls(qualified)?,
                Direction::Callers => self.indexer.query_callers(qualified)?,
            };
            cache.insert(qualified.to_string(), edges);
        }
        Ok(cache.get(qualified).map(Vec::as_slice).unwrap_or_default())
    }

    fn query_count(&self) -> usize {
        self.calls.len() + self.callers.len()
    }
}

fn merge_into(target: &mut Vec<CallEdge>, found: Vec<CallEdge>, merge: CallMerge) {
    match merge {
        CallMerge::Last => *target = found,
        CallMerge::Accumulate => {
            let combined = dedup_edges(target.drain(..).chain(found));
            *target = combined;
        }
    }
}

/// Fill `affected_calls` (and `affected_callers` when `reverse`) on every block.
///
/// Only edges anchored on the queried function survive: a call must leave it
/// (`source` equals the qualified name) and a caller edge must arrive at it.
/// Transitive edges the indexer reports alongside are dropped. Calls are then
/// kept when their destination starts with the namespace, callers when their
/// source does. Any probe failure aborts the whole pass.
pub fn probe_calls<I: CodeIndexer + ?Sized>(
    report: &mut ImpactReport,
    indexer: &I,
    options: &ProbeOptions,
) -> Result<()> {
    let _span = tracing::info_span!(
        "probe_calls",
        namespace = %options.namespace,
        merge = ?options.merge,
        reverse = options.reverse
    )
    .entered();

    if options.namespace.is_empty() {
        tracing::info!("No namespace filter configured, skipping call graph probe");
        return Ok(());
    }
    let prefix = options.namespace.as_str();
    let mut cache = ProbeCache::new(indexer);

    for block in report.all_blocks_mut() {
        let names: Vec<String> = block
            .affected_functions
            .iter()
            .map(|f| f.qualified_name())
            .collect();
        for name in &names {
            let calls: Vec<CallEdge> = cache
                .get(name, Direction::Calls)?
                .iter()
                .filter(|e| e.source == *name && e.destination.starts_with(prefix))
                .cloned()
                .collect();
            merge_into(&mut block.affected_calls, calls, options.merge);

            if options.reverse {
                let callers: Vec<CallEdge> = cache
                    .get(name, Direction::Callers)?
                    .iter()
                    .filter(|e| e.destination == *name && e.source.starts_with(prefix))
                    .cloned()
                    .collect();
                merge_into(&mut block.affected_callers, callers, options.merge);
            }
        }
    }

    tracing::info!(queries = cache.query_count(), "Call graph probe complete");
    Ok(())
}
