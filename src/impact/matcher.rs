//! Diff hunks → change blocks → affected functions

use crate::diff_parse::DiffHunk;
use crate::index::CodeIndex;

use super::types::{ChangeBlock, ChangeRange, ImpactReport};

/// Pass 1: one block per range, grouped by file, diff order preserved.
///
/// Files without ranges never appear.
pub fn build_blocks(ranges: &[ChangeRange]) -> ImpactReport {
    let _span = tracing::info_span!("build_blocks", range_count = ranges.len()).entered();
    let mut report = ImpactReport::new();
    for range in ranges {
        report.push_block(ChangeBlock::new(range));
    }
    report
}

/// Pass 2: attach every named function overlapping each block.
///
/// A file missing from the index is expected (new or generated files) and
/// leaves its blocks with no functions.
pub fn attach_functions(report: &mut ImpactReport, index: &CodeIndex) {
    let _span = tracing::info_span!("attach_functions", block_count = report.block_count()).entered();
    for block in report.all_blocks_mut() {
        let Some(functions) = index.functions(&block.file) else {
            tracing::debug!(file = %block.file, "File not in code index");
            continue;
        };
        let range = block.range();
        for function in functions {
            // Anonymous entries are synthetic
            if function.name.is_empty() {
                continue;
            }
            if function.overlaps(&range) {
                block.affected_functions.push(function.clone());
            }
        }
    }
}

/// Run both matching passes over parsed hunks
pub fn match_hunks(hunks: &[DiffHunk], index: &CodeIndex) -> ImpactReport {
    let ranges: Vec<ChangeRange> = hunks.iter().map(DiffHunk::range).collect();
    let mut report = build_blocks(&ranges);
    attach_functions(&mut report, index);
    for file in report.files() {
        if !index.contains_file(file) {
            tracing::warn!(file, "Changed file not in code index, no functions attached");
        }
    }
    report
}
