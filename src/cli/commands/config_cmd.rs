//! Config command: print the effective configuration

use std::path::Path;

use anyhow::{Context, Result};

use diffimpact::Config;

use crate::cli::ConfigArgs;

pub(crate) fn cmd_config(root: &Path, args: &ConfigArgs) -> Result<()> {
    let config = Config::load(root)?.override_with(args.to_config());
    let text = toml::to_string_pretty(&config.resolved()).context("Failed to render config")?;
    print!("{text}");
    Ok(())
}
