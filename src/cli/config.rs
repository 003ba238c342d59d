//! Project root detection

use std::path::{Path, PathBuf};

use diffimpact::config::CONFIG_FILE_NAME;

/// Find project root by looking for common markers.
///
/// Walks up from the current directory. A directory holding the project
/// config wins; otherwise the nearest VCS root; otherwise the current
/// directory itself.
pub(crate) fn find_project_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd).unwrap_or_else(|| {
        tracing::debug!("No project root marker found, using current directory");
        cwd
    })
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    // Listed in priority order: the config marker beats a VCS root below it
    for marker in [CONFIG_FILE_NAME, ".git"] {
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(marker).exists() {
                tracing::debug!(root = %dir.display(), marker, "Detected project root");
                return Some(dir.to_path_buf());
            }
            current = dir.parent();
        }
    }
    None
}
