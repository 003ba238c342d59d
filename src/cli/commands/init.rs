//! Init command: write the project config file

use std::path::Path;

use anyhow::{bail, Context, Result};

use diffimpact::config::CONFIG_FILE_NAME;

use crate::cli::{Cli, ConfigArgs};

/// Write `.diffimpact.toml` with every setting resolved.
///
/// Only CLI flags and built-in defaults go in: user-level defaults stay in
/// the user config.
pub(crate) fn cmd_init(cli: &Cli, root: &Path, args: &ConfigArgs, force: bool) -> Result<()> {
    let _span = tracing::info_span!("cmd_init").entered();
    let path = root.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    write_project_config(root, args)?;
    if !cli.quiet {
        println!("Created {}", path.display());
    }
    Ok(())
}

/// Save the resolved CLI layer as the project config
pub(crate) fn write_project_config(root: &Path, args: &ConfigArgs) -> Result<()> {
    let path = root.join(CONFIG_FILE_NAME);
    args.to_config()
        .resolved()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
