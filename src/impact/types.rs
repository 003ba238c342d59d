//! Data types for change-impact reports

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One contiguous changed region, in target-revision line numbers.
///
/// Half-open: covers `start_line..end_line_exclusive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRange {
    pub file: String,
    pub start_line: u32,
    pub end_line_exclusive: u32,
}

/// A function declared in the code index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub enclosing_type_name: String,
    pub package_name: String,
    /// First line (inclusive)
    pub start_line: u32,
    /// Last line (inclusive)
    pub stop_line: u32,
}

impl FunctionRecord {
    /// `package.Type.name`, the join key for call-graph queries.
    ///
    /// Empty package or type segments are left out rather than producing
    /// a leading or doubled dot.
    pub fn qualified_name(&self) -> String {
        [
            self.package_name.as_str(),
            self.enclosing_type_name.as_str(),
            self.name.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
    }

    /// Interval overlap between this function and a change range.
    ///
    /// `stop_line` is treated as an exclusive bound here, so the rule is
    /// `max(start) < min(stop, end_exclusive)`. Empty or inverted ranges
    /// never overlap.
    pub fn overlaps(&self, range: &ChangeRange) -> bool {
        self.start_line.max(range.start_line) < self.stop_line.min(range.end_line_exclusive)
    }
}

/// How a call edge relates to the function it was probed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// The probed function is textually the caller (or callee, for reverse probes)
    Direct,
    /// Reachable only transitively
    Indirect,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Direct => write!(f, "direct"),
            EdgeKind::Indirect => write!(f, "indirect"),
        }
    }
}

/// A labeled call-graph edge between two qualified names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub source: String,
    pub destination: String,
    pub kind: EdgeKind,
}

/// One changed range plus everything derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    pub file: String,
    pub start_line: u32,
    pub end_line_exclusive: u32,
    #[serde(default)]
    pub affected_functions: Vec<FunctionRecord>,
    #[serde(default)]
    pub affected_calls: Vec<CallEdge>,
    #[serde(default)]
    pub affected_callers: Vec<CallEdge>,
}

impl ChangeBlock {
    pub fn new(range: &ChangeRange) -> Self {
        Self {
            file: range.file.clone(),
            start_line: range.start_line,
            end_line_exclusive: range.end_line_exclusive,
            affected_functions: Vec::new(),
            affected_calls: Vec::new(),
            affected_callers: Vec::new(),
        }
    }

    pub fn range(&self) -> ChangeRange {
        ChangeRange {
            file: self.file.clone(),
            start_line: self.start_line,
            end_line_exclusive: self.end_line_exclusive,
        }
    }

    /// Outline label, `"<start>-<end>"`
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_line, self.end_line_exclusive)
    }
}

/// File path → ordered change blocks, in diff order.
///
/// Serializes as a JSON object whose key order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactReport {
    entries: Vec<(String, Vec<ChangeBlock>)>,
    positions: HashMap<String, usize>,
}

impl ImpactReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block under `file`, creating the file entry on first use
    pub fn push_block(&mut self, block: ChangeBlock) {
        match self.positions.get(&block.file) {
            Some(&idx) => self.entries[idx].1.push(block),
            None => {
                self.positions.insert(block.file.clone(), self.entries.len());
                self.entries.push((block.file.clone(), vec![block]));
            }
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn blocks(&self, file: &str) -> Option<&[ChangeBlock]> {
        self.positions
            .get(file)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ChangeBlock])> {
        self.entries.iter().map(|(f, b)| (f.as_str(), b.as_slice()))
    }

    /// Every block across every file, in report order
    pub fn all_blocks(&self) -> impl Iterator<Item = &ChangeBlock> {
        self.entries.iter().flat_map(|(_, b)| b.iter())
    }

    pub(crate) fn all_blocks_mut(&mut self) -> impl Iterator<Item = &mut ChangeBlock> {
        self.entries.iter_mut().flat_map(|(_, b)| b.iter_mut())
    }

    pub fn file_count(&self) -> usize {
        self.entries.len()
    }

    pub fn block_count(&self) -> usize {
        self.entries.iter().map(|(_, b)| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            file_count: self.file_count(),
            block_count: self.block_count(),
            ..Default::default()
        };
        for block in self.all_blocks() {
            summary.function_count += block.affected_functions.len();
            summary.call_count += block.affected_calls.len();
            summary.caller_count += block.affected_callers.len();
        }
        summary
    }
}

/// Counts across a whole report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub file_count: usize,
    pub block_count: usize,
    pub function_count: usize,
    pub call_count: usize,
    pub caller_count: usize,
}

impl Serialize for ImpactReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (file, blocks) in &self.entries {
            map.serialize_entry(file, blocks)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ImpactReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = ImpactReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of file path to change blocks")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ImpactReport, A::Error> {
                let mut report = ImpactReport::new();
                while let Some((file, blocks)) = access.next_entry::<String, Vec<ChangeBlock>>()? {
                    if report.positions.contains_key(&file) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate file entry: {file}"
                        )));
                    }
                    report.positions.insert(file.clone(), report.entries.len());
                    report.entries.push((file, blocks));
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(name: &str, start: u32, stop: u32) -> FunctionRecord {
        FunctionRecord {
            name: name.into(),
            enclosing_type_name: "Type".into(),
            package_name: "pkg".into(),
            start_line: start,
            stop_line: stop,
        }
    }

    fn range(start: u32, end: u32) -> ChangeRange {
        ChangeRange {
            file: "a.java".into(),
            start_line: start,
            end_line_exclusive: end,
        }
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(func("method", 1, 2).qualified_name(), "pkg.Type.method");
        let mut top_level = func("main", 1, 2);
        top_level.enclosing_type_name.clear();
        assert_eq!(top_level.qualified_name(), "pkg.main");
    }

    #[test]
    fn test_overlap_boundaries() {
        let f = func("m", 10, 20);
        assert!(f.overlaps(&range(15, 18)));
        assert!(f.overlaps(&range(5, 11)));
        assert!(f.overlaps(&range(19, 30)));
        assert!(!f.overlaps(&range(5, 10)), "range ends where function starts");
        assert!(!f.overlaps(&range(20, 30)), "stop line is an exclusive bound");
        assert!(!f.overlaps(&range(12, 12)), "empty range");
        assert!(!f.overlaps(&range(15, 12)), "inverted range");
    }

    #[test]
    fn test_report_groups_by_file_in_insertion_order() {
        let mut report = ImpactReport::new();
        report.push_block(ChangeBlock::new(&ChangeRange {
            file: "z.go".into(),
            start_line: 1,
            end_line_exclusive: 2,
        }));
        report.push_block(ChangeBlock::new(&range(3, 4)));
        report.push_block(ChangeBlock::new(&ChangeRange {
            file: "z.go".into(),
            start_line: 9,
            end_line_exclusive: 12,
        }));
        let files: Vec<_> = report.files().collect();
        assert_eq!(files, ["z.go", "a.java"]);
        assert_eq!(report.blocks("z.go").map(|b| b.len()), Some(2));
        assert_eq!(report.block_count(), 3);
        assert_eq!(report.blocks("z.go").unwrap()[1].label(), "9-12");
    }

    #[test]
    fn test_report_json_keeps_order_and_round_trips() {
        let mut report = ImpactReport::new();
        for file in ["m.rs", "b.rs", "x.rs"] {
            report.push_block(ChangeBlock::new(&ChangeRange {
                file: file.into(),
                start_line: 1,
                end_line_exclusive: 5,
            }));
        }
        let json = serde_json::to_string(&report).unwrap();
        let m = json.find("m.rs").unwrap();
        let b = json.find("b.rs").unwrap();
        let x = json.find("x.rs").unwrap();
        assert!(m < b && b < x, "keys out of order: {json}");

        let back: ImpactReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_report_rejects_duplicate_file_keys() {
        let json = r#"{"a": [], "a": []}"#;
        assert!(serde_json::from_str::<ImpactReport>(json).is_err());
    }
}
