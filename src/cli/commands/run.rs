//! Run command: diff → impact report → exports

use std::path::Path;

use anyhow::{Context, Result};

use diffimpact::config::CONFIG_FILE_NAME;
use diffimpact::impact::report_to_json_string;
use diffimpact::{CocaIndexer, Config, DiffSource, Engine, PatchCommand, PatchFile};

use super::init::write_project_config;
use crate::cli::display::display_report_text;
use crate::cli::{Cli, ConfigArgs};

pub(crate) fn cmd_run(
    cli: &Cli,
    root: &Path,
    args: &ConfigArgs,
    show: bool,
    json: bool,
) -> Result<()> {
    let _span = tracing::info_span!("cmd_run", root = %root.display()).entered();

    // First run in a project leaves a config behind for the next one
    if !root.join(CONFIG_FILE_NAME).exists() {
        write_project_config(root, args)?;
        tracing::info!("Created {}", CONFIG_FILE_NAME);
    }
    let config = Config::load(root)?.override_with(args.to_config());

    let diff: Box<dyn DiffSource> = match config.existing_patch_file(root) {
        Some(path) => Box::new(PatchFile::new(path)),
        None => {
            if let Some(p) = config.patch_file.as_ref().filter(|p| !p.as_os_str().is_empty()) {
                tracing::warn!(
                    patch_file = %p.display(),
                    "Patch file not found, falling back to patch command"
                );
            }
            Box::new(PatchCommand::parse(config.patch_cmd_or_default(), root)?)
        }
    };
    let indexer = CocaIndexer::new(
        config.indexer_cmd_or_default(),
        root,
        &config.reporter_dir_or_default(),
    );
    let engine = Engine::new(diff, indexer, config.engine_config(root));

    let outcome = engine.run().map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} stage failed"))
    })?;

    if json {
        print!(
            "{}",
            report_to_json_string(&outcome.report).context("Failed to render report")?
        );
    }
    if show || (!json && outcome.written.is_empty()) {
        display_report_text(&outcome.report);
    }
    if !cli.quiet && !json {
        for path in &outcome.written {
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}
