//! Mind-map outline export
//!
//! Writes an XMind-style content document: a JSON array of sheets, each with
//! a root topic whose children nest under `children.attached`. Exporting into
//! an existing document appends a sheet and keeps everything already there,
//! including fields this module does not model.
//!
//! Topic tree per report: file → `"<start>-<end>"` block → qualified function
//! name → `"calls"` → call destinations (and `"callers"` → caller sources when
//! the function has any).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImpactError, Result};
use crate::impact::{ChangeBlock, ImpactReport};

/// Title of the grouping topic holding outgoing calls
pub const CALLS_TOPIC: &str = "calls";
/// Title of the grouping topic holding incoming callers
pub const CALLERS_TOPIC: &str = "callers";

/// Length of generated topic ids
const ID_LEN: usize = 26;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Children {
    #[serde(default)]
    pub attached: Vec<Topic>,
    /// e.g. `detached` floating topics
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Children {
    fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Children::is_empty")]
    pub children: Children,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Topic {
    fn new(seed: &str, title: impl Into<String>) -> Self {
        Self {
            id: topic_id(seed),
            title: title.into(),
            children: Children::default(),
            extra: serde_json::Map::new(),
        }
    }

    /// Append a child whose id derives from this topic's position
    fn add_child(&mut self, seed: &str, title: impl Into<String>) -> &mut Topic {
        let idx = self.children.attached.len();
        let child_seed = format!("{seed}/{idx}");
        self.children.attached.push(Topic::new(&child_seed, title));
        &mut self.children.attached[idx]
    }

    pub fn children(&self) -> &[Topic] {
        &self.children.attached
    }

    pub fn child_titles(&self) -> Vec<&str> {
        self.children.attached.iter().map(|t| t.title.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub title: String,
    pub root_topic: Topic,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A whole outline document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineDocument {
    pub sheets: Vec<Sheet>,
}

/// Stable id: the same tree position always yields the same id
fn topic_id(seed: &str) -> String {
    let hash = blake3::hash(seed.as_bytes()).to_hex();
    hash[..ID_LEN].to_string()
}

impl OutlineDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an existing document, or start a new one if `path` does not exist
    pub fn load_or_new(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(ImpactError::Outline {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        let doc: Self = serde_json::from_str(&content).map_err(|e| ImpactError::Outline {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), sheets = doc.sheets.len(), "Loaded outline document");
        Ok(doc)
    }

    /// Append a sheet rendering `report` under a root topic titled `title`
    pub fn add_report(&mut self, report: &ImpactReport, title: &str) -> &Sheet {
        let seed = format!("{}:{}", self.sheets.len(), title);
        let mut root = Topic::new(&seed, title);
        for (file, blocks) in report.iter() {
            let file_seed = format!("{}/{}", seed, root.children.attached.len());
            let file_topic = root.add_child(&seed, file);
            for block in blocks {
                add_block(file_topic, &file_seed, block);
            }
        }
        self.sheets.push(Sheet {
            id: topic_id(&format!("{seed}#sheet")),
            title: title.to_string(),
            root_topic: root,
            extra: serde_json::Map::new(),
        });
        &self.sheets[self.sheets.len() - 1]
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

fn add_block(file_topic: &mut Topic, file_seed: &str, block: &ChangeBlock) {
    let block_seed = format!("{}/{}", file_seed, file_topic.children.attached.len());
    let block_topic = file_topic.add_child(file_seed, block.label());
    for function in &block.affected_functions {
        let name = function.qualified_name();
        let fn_seed = format!("{}/{}", block_seed, block_topic.children.attached.len());
        let fn_topic = block_topic.add_child(&block_seed, name.as_str());

        let calls_seed = format!("{}/{}", fn_seed, fn_topic.children.attached.len());
        let calls_topic = fn_topic.add_child(&fn_seed, CALLS_TOPIC);
        for edge in block.affected_calls.iter().filter(|e| e.source == name) {
            calls_topic.add_child(&calls_seed, edge.destination.as_str());
        }

        let callers: Vec<&str> = block
            .affected_callers
            .iter()
            .filter(|e| e.destination == name)
            .map(|e| e.source.as_str())
            .collect();
        if !callers.is_empty() {
            let callers_seed = format!("{}/{}", fn_seed, fn_topic.children.attached.len());
            let callers_topic = fn_topic.add_child(&fn_seed, CALLERS_TOPIC);
            for caller in callers {
                callers_topic.add_child(&callers_seed, caller);
            }
        }
    }
}
