//! Configuration file support
//!
//! Config files are loaded in order (later overrides earlier):
//! 1. `~/.config/diffimpact/config.toml` (user defaults)
//! 2. `.diffimpact.toml` in project root (project overrides)
//!
//! CLI flags override all config file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, DEFAULT_OUTLINE_TITLE};
use crate::error::{ImpactError, Result};
use crate::impact::CallMerge;

/// Project config file name
pub const CONFIG_FILE_NAME: &str = ".diffimpact.toml";

/// Configuration options loaded from config files
///
/// # Example
///
/// ```toml
/// # .diffimpact.toml
/// indexer_cmd = "coca"
/// patch_cmd = "git diff HEAD~1 HEAD"
/// namespace = "com.acme"      # only report calls into this namespace
/// to_json = "impact.json"     # "" disables
/// to_outline = ""             # "" disables
/// call_merge = "accumulate"   # or "last"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// External analysis command
    pub indexer_cmd: Option<String>,
    /// Directory (relative to project root) holding the indexer's output
    pub reporter_dir: Option<PathBuf>,
    /// Patch file; when unset or missing on disk, `patch_cmd` is used
    pub patch_file: Option<PathBuf>,
    /// Command whose stdout is the diff
    pub patch_cmd: Option<String>,
    /// Namespace prefix filter for call edges
    pub namespace: Option<String>,
    /// Structured export destination ("" disables)
    pub to_json: Option<String>,
    /// Outline export destination ("" disables)
    pub to_outline: Option<String>,
    /// Root topic title of the outline sheet
    pub outline_title: Option<String>,
    pub call_merge: Option<CallMerge>,
    /// Probe callers as well as callees
    pub reverse: Option<bool>,
    /// Reuse an existing inventory instead of running the indexer
    pub skip_analysis: Option<bool>,
}

impl Config {
    pub const DEFAULT_INDEXER_CMD: &'static str = "coca";
    pub const DEFAULT_REPORTER_DIR: &'static str = "coca_reporter";
    pub const DEFAULT_PATCH_CMD: &'static str = "git diff HEAD~1 HEAD";
    pub const DEFAULT_JSON_OUT: &'static str = "impact.json";
    pub const DEFAULT_OUTLINE_OUT: &'static str = "impact.outline.json";

    /// Load configuration from user and project config files.
    ///
    /// A project config that exists but does not parse is an error; a broken
    /// user config is only warned about.
    pub fn load(project_root: &Path) -> Result<Self> {
        let user_config = dirs::config_dir()
            .map(|d| d.join("diffimpact/config.toml"))
            .and_then(|p| match Self::load_file(&p) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring user config");
                    None
                }
            })
            .unwrap_or_default();

        let project_config =
            Self::load_file(&project_root.join(CONFIG_FILE_NAME))?.unwrap_or_default();

        // Project overrides user
        let merged = user_config.override_with(project_config);
        tracing::debug!(config = ?merged, "Effective config after merge");
        Ok(merged)
    }

    /// Load configuration from a specific file; `None` if it does not exist
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ImpactError::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let config = toml::from_str::<Self>(&content).map_err(|e| {
            ImpactError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(Some(config))
    }

    /// Write this config as pretty TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ImpactError::Config(format!("failed to serialize config: {e}")))?;
        crate::engine::write_atomic(path, &text)
    }

    /// Layer another config on top (other overrides self where present)
    pub fn override_with(self, other: Self) -> Self {
        Config {
            indexer_cmd: other.indexer_cmd.or(self.indexer_cmd),
            reporter_dir: other.reporter_dir.or(self.reporter_dir),
            patch_file: other.patch_file.or(self.patch_file),
            patch_cmd: other.patch_cmd.or(self.patch_cmd),
            namespace: other.namespace.or(self.namespace),
            to_json: other.to_json.or(self.to_json),
            to_outline: other.to_outline.or(self.to_outline),
            outline_title: other.outline_title.or(self.outline_title),
            call_merge: other.call_merge.or(self.call_merge),
            reverse: other.reverse.or(self.reverse),
            skip_analysis: other.skip_analysis.or(self.skip_analysis),
        }
    }

    /// Every field filled with its effective value, for `init` and display
    pub fn resolved(&self) -> Self {
        Config {
            indexer_cmd: Some(self.indexer_cmd_or_default().to_string()),
            reporter_dir: Some(self.reporter_dir_or_default()),
            patch_file: Some(self.patch_file.clone().unwrap_or_default()),
            patch_cmd: Some(self.patch_cmd_or_default().to_string()),
            namespace: Some(self.namespace_or_default().to_string()),
            to_json: Some(
                self.to_json
                    .clone()
                    .unwrap_or_else(|| Self::DEFAULT_JSON_OUT.to_string()),
            ),
            to_outline: Some(
                self.to_outline
                    .clone()
                    .unwrap_or_else(|| Self::DEFAULT_OUTLINE_OUT.to_string()),
            ),
            outline_title: Some(self.outline_title_or_default().to_string()),
            call_merge: Some(self.call_merge.unwrap_or_default()),
            reverse: Some(self.reverse.unwrap_or(true)),
            skip_analysis: Some(self.skip_analysis.unwrap_or(false)),
        }
    }

    // ===== Accessors with defaults =====

    pub fn indexer_cmd_or_default(&self) -> &str {
        self.indexer_cmd.as_deref().unwrap_or(Self::DEFAULT_INDEXER_CMD)
    }

    pub fn reporter_dir_or_default(&self) -> PathBuf {
        self.reporter_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_REPORTER_DIR))
    }

    pub fn patch_cmd_or_default(&self) -> &str {
        self.patch_cmd.as_deref().unwrap_or(Self::DEFAULT_PATCH_CMD)
    }

    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    pub fn outline_title_or_default(&self) -> &str {
        self.outline_title.as_deref().unwrap_or(DEFAULT_OUTLINE_TITLE)
    }

    /// Patch file to read, if one is configured and present under `root`
    pub fn existing_patch_file(&self, root: &Path) -> Option<PathBuf> {
        self.patch_file
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| root.join(p))
            .filter(|p| p.is_file())
    }

    /// Resolve an output setting: unset → default, empty → disabled
    fn output_path(value: Option<&str>, default: &str, root: &Path) -> Option<PathBuf> {
        match value {
            None => Some(root.join(default)),
            Some("") => None,
            Some(p) => Some(root.join(p)),
        }
    }

    /// Freeze into engine settings, resolving paths against `root`
    pub fn engine_config(&self, root: &Path) -> EngineConfig {
        EngineConfig {
            namespace: self.namespace_or_default().to_string(),
            merge: self.call_merge.unwrap_or_default(),
            reverse: self.reverse.unwrap_or(true),
            run_analysis: !self.skip_analysis.unwrap_or(false),
            json_out: Self::output_path(self.to_json.as_deref(), Self::DEFAULT_JSON_OUT, root),
            outline_out: Self::output_path(
                self.to_outline.as_deref(),
                Self::DEFAULT_OUTLINE_OUT,
                root,
            ),
            outline_title: self.outline_title_or_default().to_string(),
        }
    }
}
