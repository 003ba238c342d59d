//! Common test fixtures and helpers
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::FakeIndexer;
//! ```

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

use diffimpact::index::{InventoryEntry, InventoryFunction, InventoryPosition};
use diffimpact::{CallEdge, CodeIndex, CodeIndexer, EdgeKind, ImpactError};

/// Indexer returning canned data, counting every call made to it
#[derive(Default)]
pub struct FakeIndexer {
    pub entries: Vec<InventoryEntry>,
    pub calls: HashMap<String, Vec<CallEdge>>,
    pub callers: HashMap<String, Vec<CallEdge>>,
    /// Make `load_index` fail as if the inventory were missing
    pub inventory_missing: bool,
    /// Make probing this qualified name fail
    pub fail_probe: Option<String>,
    pub analyze_count: Cell<usize>,
    pub load_count: Cell<usize>,
    pub queried: RefCell<Vec<String>>,
}

impl FakeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one inventory entry: `(name, start, stop)` per function
    pub fn with_entry(
        mut self,
        file: &str,
        package: &str,
        node: &str,
        functions: &[(&str, u32, u32)],
    ) -> Self {
        self.entries.push(entry(file, package, node, functions));
        self
    }

    /// Add direct call edges from `source` to each destination
    pub fn with_calls(mut self, source: &str, destinations: &[&str]) -> Self {
        self.calls.insert(
            source.to_string(),
            destinations.iter().map(|d| edge(source, d)).collect(),
        );
        self
    }

    /// Add transitive edges returned by the calls query for `function`
    pub fn with_indirect_calls(mut self, function: &str, edges: &[(&str, &str)]) -> Self {
        self.calls
            .entry(function.to_string())
            .or_default()
            .extend(edges.iter().map(|(s, d)| indirect_edge(s, d)));
        self
    }

    /// Add transitive edges returned by the callers query for `function`
    pub fn with_indirect_callers(mut self, function: &str, edges: &[(&str, &str)]) -> Self {
        self.callers
            .entry(function.to_string())
            .or_default()
            .extend(edges.iter().map(|(s, d)| indirect_edge(s, d)));
        self
    }

    /// Add direct caller edges from each caller to `target`
    pub fn with_callers(mut self, target: &str, callers: &[&str]) -> Self {
        self.callers.insert(
            target.to_string(),
            callers.iter().map(|c| edge(c, target)).collect(),
        );
        self
    }
}

impl CodeIndexer for FakeIndexer {
    fn analyze(&self) -> diffimpact::error::Result<()> {
        self.analyze_count.set(self.analyze_count.get() + 1);
        Ok(())
    }

    fn load_index(&self) -> diffimpact::error::Result<CodeIndex> {
        self.load_count.set(self.load_count.get() + 1);
        if self.inventory_missing {
            return Err(ImpactError::IndexUnavailable {
                path: PathBuf::from("coca_reporter/deps.json"),
                reason: "No such file or directory".to_string(),
            });
        }
        Ok(CodeIndex::from_entries(self.entries.clone()))
    }

    fn query_calls(&self, qualified: &str) -> diffimpact::error::Result<Vec<CallEdge>> {
        self.queried.borrow_mut().push(qualified.to_string());
        if self.fail_probe.as_deref() == Some(qualified) {
            return Err(ImpactError::ProbeFailed {
                function: qualified.to_string(),
                reason: "exit status: 1".to_string(),
            });
        }
        Ok(self.calls.get(qualified).cloned().unwrap_or_default())
    }

    fn query_callers(&self, qualified: &str) -> diffimpact::error::Result<Vec<CallEdge>> {
        Ok(self.callers.get(qualified).cloned().unwrap_or_default())
    }
}

pub fn entry(file: &str, package: &str, node: &str, functions: &[(&str, u32, u32)]) -> InventoryEntry {
    InventoryEntry {
        file_path: file.to_string(),
        package: Some(package.to_string()),
        node_name: Some(node.to_string()),
        functions: Some(
            functions
                .iter()
                .map(|(name, start, stop)| InventoryFunction {
                    name: name.to_string(),
                    position: InventoryPosition {
                        start_line: *start,
                        stop_line: *stop,
                    },
                })
                .collect(),
        ),
    }
}

pub fn edge(source: &str, destination: &str) -> CallEdge {
    CallEdge {
        source: source.to_string(),
        destination: destination.to_string(),
        kind: EdgeKind::Direct,
    }
}

pub fn indirect_edge(source: &str, destination: &str) -> CallEdge {
    CallEdge {
        kind: EdgeKind::Indirect,
        ..edge(source, destination)
    }
}

/// A two-file diff: one modified Java file with two hunks, one new file
pub const SAMPLE_DIFF: &str = "\
diff --git a/src/main/java/com/acme/OrderService.java b/src/main/java/com/acme/OrderService.java
--- a/src/main/java/com/acme/OrderService.java
+++ b/src/main/java/com/acme/OrderService.java
@@ -10,6 +10,8 @@ public class OrderService {
     public void place(Order o) {
+        validate(o);
+        repo.save(o);
     }
@@ -40,3 +42,4 @@ public class OrderService {
     private void audit() {
+        log.info(\"audit\");
     }
diff --git a/src/main/java/com/acme/NewThing.java b/src/main/java/com/acme/NewThing.java
new file mode 100644
--- /dev/null
+++ b/src/main/java/com/acme/NewThing.java
@@ -0,0 +1,5 @@
+package com.acme;
+public class NewThing {}
";

pub const ORDER_SERVICE: &str = "src/main/java/com/acme/OrderService.java";
pub const NEW_THING: &str = "src/main/java/com/acme/NewThing.java";

/// Inventory matching `SAMPLE_DIFF`: `place` spans hunk one, `audit` hunk two.
///
/// `place` also reports one transitive edge in each direction, the way a real
/// call graph query does.
pub fn sample_indexer() -> FakeIndexer {
    FakeIndexer::new()
        .with_entry(
            ORDER_SERVICE,
            "com.acme",
            "OrderService",
            &[("place", 9, 14), ("cancel", 20, 30), ("audit", 41, 45)],
        )
        .with_calls(
            "com.acme.OrderService.place",
            &["com.acme.repo.OrderRepo.save", "java.util.Objects.requireNonNull"],
        )
        .with_indirect_calls(
            "com.acme.OrderService.place",
            &[("com.acme.repo.OrderRepo.save", "com.acme.db.Pool.acquire")],
        )
        .with_calls("com.acme.OrderService.audit", &["org.slf4j.Logger.info"])
        .with_callers("com.acme.OrderService.place", &["com.acme.web.OrderController.post"])
        .with_indirect_callers(
            "com.acme.OrderService.place",
            &[("com.acme.web.Router.dispatch", "com.acme.web.OrderController.post")],
        )
}
