//! Unified diff parser
//!
//! Extracts changed file paths and new-side line ranges from `git diff`
//! output. Only the target revision matters: every range is expressed in
//! post-change line numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::impact::ChangeRange;

/// Hunk header at the start of a line: `@@ -old[,n] +new[,n] @@`
static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hardcoded hunk regex")
});

/// A single hunk from a unified diff, one changed region in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Relative file path (from `+++ b/...`)
    pub file: String,
    /// Start line in the new version (1-based)
    pub start: u32,
    /// Number of lines in the new version (half-open: covers `start..start+count`)
    pub count: u32,
}

impl DiffHunk {
    /// Half-open target-side range covered by this hunk
    pub fn range(&self) -> ChangeRange {
        ChangeRange {
            file: self.file.clone(),
            start_line: self.start,
            end_line_exclusive: self.start.saturating_add(self.count),
        }
    }
}

/// Body lines a hunk header announced and that have not been seen yet
#[derive(Debug, Clone, Copy, Default)]
struct HunkBody {
    old: u32,
    new: u32,
}

impl HunkBody {
    fn is_open(&self) -> bool {
        self.old > 0 || self.new > 0
    }

    /// Account for one line. `false` means the line cannot belong to this
    /// hunk, which closes it early.
    fn take(&mut self, line: &str) -> bool {
        match line.as_bytes().first() {
            // Context; some tools strip the lone space of an empty context line
            Some(b' ') | None if self.old > 0 && self.new > 0 => {
                self.old -= 1;
                self.new -= 1;
            }
            Some(b'-') if self.old > 0 => self.old -= 1,
            Some(b'+') if self.new > 0 => self.new -= 1,
            Some(b'\\') => {}
            _ => return false,
        }
        true
    }
}

/// New-side path from a `+++ ` header; `None` for deletions
fn target_path(header: &str) -> Option<String> {
    // Some tools append a tab and timestamp after the path
    let path = header.split('\t').next().unwrap_or(header).trim_end();
    match path {
        "/dev/null" => None,
        p => Some(p.strip_prefix("b/").unwrap_or(p).to_string()),
    }
}

/// Numeric header field; an absent length means one line
fn header_number(field: Option<regex::Match<'_>>, line: &str) -> u32 {
    match field {
        None => 1,
        Some(m) => m.as_str().parse().unwrap_or_else(|_| {
            tracing::warn!(line, field = m.as_str(), "Hunk header number out of range, using 1");
            1
        }),
    }
}

/// Parse unified diff output into hunks, in diff order.
///
/// Headers are recognized only between hunks: once a header announces its
/// old and new line counts, that many body lines are consumed before the
/// next `+++ ` or `@@` line is interpreted. An added line that happens to
/// look like a header (patches of patches, test fixtures) stays body text.
/// A hunk cut short by a line that cannot be body closes early.
///
/// Deleted files (`+++ /dev/null`) and binary files yield no hunks.
pub fn parse_unified_diff(input: &str) -> Vec<DiffHunk> {
    // Normalize CRLF for Windows git output
    let input = if input.contains('\r') {
        std::borrow::Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(input)
    };

    let mut hunks = Vec::new();
    let mut target: Option<String> = None;
    let mut body = HunkBody::default();

    for line in input.lines() {
        if body.is_open() {
            if body.take(line) {
                continue;
            }
            tracing::debug!(line, "Hunk shorter than its header announced");
            body = HunkBody::default();
        }

        if let Some(header) = line.strip_prefix("+++ ") {
            target = target_path(header);
        } else if line.starts_with("Binary files ") {
            target = None;
        } else if let Some(caps) = HUNK_HEADER_RE.captures(line) {
            let new_count = header_number(caps.get(4), line);
            body = HunkBody {
                old: header_number(caps.get(2), line),
                new: new_count,
            };
            // Deleted files still need their body skipped
            if let Some(file) = &target {
                hunks.push(DiffHunk {
                    file: file.clone(),
                    start: header_number(caps.get(3), line),
                    count: new_count,
                });
            }
        }
    }

    hunks
}

/// Whether `input` has at least one file header a unified diff would carry.
///
/// Empty (or whitespace-only) input counts as a valid, empty diff.
pub fn looks_like_unified_diff(input: &str) -> bool {
    if input.trim().is_empty() {
        return true;
    }
    input.lines().any(|l| {
        l.starts_with("diff --git ") || l.starts_with("+++ ") || l.starts_with("--- ")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modified_file() {
        let diff = "\
diff --git a/src/main/java/Foo.java b/src/main/java/Foo.java
--- a/src/main/java/Foo.java
+++ b/src/main/java/Foo.java
@@ -10,3 +10,5 @@ class Foo {
     int x = 1;
+    int y = 2;
+    int z = 3;
";
        let hunks = parse_unified_diff(diff);
        assert_eq!(
            hunks,
            vec![DiffHunk {
                file: "src/main/java/Foo.java".into(),
                start: 10,
                count: 5
            }]
        );
        let range = hunks[0].range();
        assert_eq!(range.start_line, 10);
        assert_eq!(range.end_line_exclusive, 15);
    }

    #[test]
    fn test_parse_added_file() {
        let diff = "\
diff --git a/src/New.java b/src/New.java
new file mode 100644
--- /dev/null
+++ b/src/New.java
@@ -0,0 +1,15 @@
+class New {}
";
        let hunks = parse_unified_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file, "src/New.java");
        assert_eq!(hunks[0].range().end_line_exclusive, 16);
    }

    #[test]
    fn test_deleted_and_binary_files_skipped() {
        let diff = "\
diff --git a/src/Old.java b/src/Old.java
deleted file mode 100644
--- a/src/Old.java
+++ /dev/null
@@ -1,10 +0,0 @@
-class Old {}
diff --git a/logo.png b/logo.png
Binary files a/logo.png and b/logo.png differ
";
        assert!(parse_unified_diff(diff).is_empty());
    }

    #[test]
    fn test_multiple_files_keep_diff_order() {
        let diff = "\
diff --git a/b.go b/b.go
--- a/b.go
+++ b/b.go
@@ -50,2 +51,3 @@
+x
diff --git a/a.go b/a.go
--- a/a.go
+++ b/a.go
@@ -1 +1 @@
-old
+new
@@ -20,0 +21,0 @@
";
        let hunks = parse_unified_diff(diff);
        let files: Vec<_> = hunks.iter().map(|h| h.file.as_str()).collect();
        assert_eq!(files, ["b.go", "a.go", "a.go"]);
        assert_eq!(hunks[1].count, 1, "Missing count should default to 1");
        assert_eq!(hunks[2].count, 0);
        assert_eq!(hunks[2].range().start_line, hunks[2].range().end_line_exclusive);
    }

    #[test]
    fn test_crlf_and_timestamp_suffix() {
        let diff = "--- a/x.py\r\n+++ b/x.py\t2024-01-01 00:00:00\r\n@@ -3,2 +3,4 @@\r\n+a\r\n";
        let hunks = parse_unified_diff(diff);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].file, "x.py");
        assert_eq!(hunks[0].count, 4);
    }

    #[test]
    fn test_header_lookalike_in_body_is_not_a_hunk() {
        let diff = "\
--- a/fixtures/change.patch
+++ b/fixtures/change.patch
@@ -1,2 +1,3 @@
 --- a/Foo.java
+@@ -100,3 +100,5 @@ class Foo {
 +++ b/Foo.java
";
        let hunks = parse_unified_diff(diff);
        assert_eq!(
            hunks,
            vec![DiffHunk {
                file: "fixtures/change.patch".into(),
                start: 1,
                count: 3
            }]
        );
    }

    #[test]
    fn test_added_plus_plus_line_is_not_a_file_header() {
        let diff = "\
--- a/a.c
+++ b/a.c
@@ -1 +1,2 @@
 int i;
+++ i;
@@ -9,0 +10,1 @@
+x
";
        let hunks = parse_unified_diff(diff);
        let files: Vec<_> = hunks.iter().map(|h| h.file.as_str()).collect();
        assert_eq!(files, ["a.c", "a.c"]);
        assert_eq!(hunks[1].start, 10);
    }

    #[test]
    fn test_deleted_file_body_is_skipped() {
        let diff = "\
--- a/old.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-@@ -5 +5 @@
-gone
--- a/kept.txt
+++ b/kept.txt
@@ -3 +3 @@
-a
+b
";
        let hunks = parse_unified_diff(diff);
        assert_eq!(
            hunks,
            vec![DiffHunk {
                file: "kept.txt".into(),
                start: 3,
                count: 1
            }]
        );
    }

    #[test]
    fn test_truncated_hunk_closes_at_next_header() {
        let diff = "\
--- a/x.go
+++ b/x.go
@@ -1,10 +1,10 @@
 a
@@ -40,2 +40,3 @@
+b
\\ No newline at end of file
";
        let hunks = parse_unified_diff(diff);
        let starts: Vec<_> = hunks.iter().map(|h| h.start).collect();
        assert_eq!(starts, [1, 40]);
    }

    #[test]
    fn test_looks_like_unified_diff() {
        assert!(looks_like_unified_diff(""));
        assert!(looks_like_unified_diff("  \n"));
        assert!(looks_like_unified_diff("--- a/x\n+++ b/x\n"));
        assert!(!looks_like_unified_diff("fatal: bad revision 'HEAD~1'\n"));
    }
}
