//! In-memory code index built from the indexer's function inventory
//!
//! The inventory document is a JSON array of per-file entries:
//!
//! ```json
//! [{"FilePath": "src/main/java/com/acme/Foo.java",
//!   "Package": "com.acme", "NodeName": "Foo",
//!   "Functions": [{"Name": "run", "Position": {"StartLine": 10, "StopLine": 20}}]}]
//! ```
//!
//! One file may appear in several entries (one per declared type). Entries
//! are grouped under the normalized file path so lookups succeed no matter
//! which platform produced the data.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ImpactError, Result};
use crate::impact::FunctionRecord;

/// One per-file entry of the inventory document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryEntry {
    pub file_path: String,
    #[serde(default)]
    pub package: Option<String>,
    /// Enclosing type (class, struct, module) declared in this entry
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub functions: Option<Vec<InventoryFunction>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryFunction {
    #[serde(default)]
    pub name: String,
    pub position: InventoryPosition,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryPosition {
    pub start_line: u32,
    pub stop_line: u32,
}

/// Normalize a path to forward slashes without a leading `./`
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    match slashed.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => slashed,
    }
}

/// Functions declared per file, keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct CodeIndex {
    by_file: HashMap<String, Vec<FunctionRecord>>,
}

impl CodeIndex {
    /// Load and group an inventory document from disk.
    ///
    /// A missing or malformed document is fatal: nothing useful can be
    /// reported without it.
    pub fn load(path: &Path) -> Result<Self> {
        let _span = tracing::info_span!("code_index_load", path = %path.display()).entered();
        let content = std::fs::read_to_string(path).map_err(|e| ImpactError::IndexUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let entries: Vec<InventoryEntry> =
            serde_json::from_str(&content).map_err(|e| ImpactError::IndexUnavailable {
                path: path.to_path_buf(),
                reason: format!("malformed inventory: {e}"),
            })?;
        let index = Self::from_entries(entries);
        tracing::info!(
            files = index.file_count(),
            functions = index.function_count(),
            "Loaded code index"
        );
        Ok(index)
    }

    /// Group entries by normalized file path.
    ///
    /// Each function is stamped with its entry's package and type name.
    /// Positions are copied verbatim.
    pub fn from_entries(entries: impl IntoIterator<Item = InventoryEntry>) -> Self {
        let mut by_file: HashMap<String, Vec<FunctionRecord>> = HashMap::new();
        for entry in entries {
            let package = entry.package.unwrap_or_default();
            let node_name = entry.node_name.unwrap_or_default();
            let records = by_file.entry(normalize_path(&entry.file_path)).or_default();
            for f in entry.functions.unwrap_or_default() {
                records.push(FunctionRecord {
                    name: f.name,
                    enclosing_type_name: node_name.clone(),
                    package_name: package.clone(),
                    start_line: f.position.start_line,
                    stop_line: f.position.stop_line,
                });
            }
        }
        Self { by_file }
    }

    /// Functions declared in `file`, or `None` if the file is not indexed
    pub fn functions(&self, file: &str) -> Option<&[FunctionRecord]> {
        self.by_file
            .get(&normalize_path(file))
            .map(|v| v.as_slice())
    }

    pub fn contains_file(&self, file: &str) -> bool {
        self.by_file.contains_key(&normalize_path(file))
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    pub fn function_count(&self) -> usize {
        self.by_file.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"[
        {"FilePath": "src\\main\\Foo.java", "Package": "com.acme", "NodeName": "Foo",
         "Functions": [{"Name": "run", "Position": {"StartLine": 10, "StopLine": 20}}]},
        {"FilePath": "src/main/Foo.java", "Package": "com.acme", "NodeName": "Inner",
         "Functions": [{"Name": "", "Position": {"StartLine": 30, "StopLine": 40}},
                       {"Name": "go", "Position": {"StartLine": 41, "StopLine": 50}}],
         "Imports": ["java.util.List"]},
        {"FilePath": "./src/Empty.java", "Package": null, "NodeName": "Empty", "Functions": null}
    ]"#;

    #[test]
    fn test_entries_grouped_by_normalized_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("deps.json");
        std::fs::write(&path, INVENTORY).unwrap();

        let index = CodeIndex::load(&path).unwrap();
        assert_eq!(index.file_count(), 2);
        let foo = index.functions("src/main/Foo.java").unwrap();
        assert_eq!(foo.len(), 3);
        assert_eq!(foo[0].qualified_name(), "com.acme.Foo.run");
        assert_eq!(foo[2].enclosing_type_name, "Inner");
        assert_eq!((foo[2].start_line, foo[2].stop_line), (41, 50));

        assert!(index.contains_file("src\\main\\Foo.java"));
        assert_eq!(index.functions("src/Empty.java").map(|f| f.len()), Some(0));
        assert!(index.functions("src/Missing.java").is_none());
    }

    #[test]
    fn test_missing_document_is_index_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = CodeIndex::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ImpactError::IndexUnavailable { .. }));
    }

    #[test]
    fn test_malformed_document_is_index_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("deps.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = CodeIndex::load(&path).unwrap_err();
        assert!(matches!(err, ImpactError::IndexUnavailable { .. }));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a\\b\\c.rs"), "a/b/c.rs");
        assert_eq!(normalize_path("./a/b.rs"), "a/b.rs");
        assert_eq!(normalize_path("a/b.rs"), "a/b.rs");
    }
}
