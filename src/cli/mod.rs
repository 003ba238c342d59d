//! CLI implementation for diffimpact

mod commands;
mod config;
mod display;

pub(crate) use config::find_project_root;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use diffimpact::{CallMerge, Config, ImpactError};

use commands::{cmd_config, cmd_init, cmd_run};

/// Process exit codes
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    IndexUnavailable = 3,
    DiffUnreadable = 4,
    ProbeFailed = 5,
}

impl ExitCode {
    /// Exit code for an error that ended the run
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ImpactError>() {
            Some(ImpactError::IndexUnavailable { .. }) => ExitCode::IndexUnavailable,
            Some(ImpactError::DiffUnreadable { .. }) => ExitCode::DiffUnreadable,
            Some(ImpactError::ProbeFailed { .. }) => ExitCode::ProbeFailed,
            _ => ExitCode::GeneralError,
        }
    }
}

#[derive(Parser)]
#[command(name = "diffimpact")]
#[command(about = "Which functions a diff touches, and what they call")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root (default: nearest directory with .diffimpact.toml or .git)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

/// Settings shared by every command; each overrides the config files
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ConfigArgs {
    /// External analysis command
    #[arg(long, env = "DIFFIMPACT_INDEXER_CMD")]
    indexer_cmd: Option<String>,
    /// Directory the indexer writes its reports to
    #[arg(long)]
    reporter_dir: Option<PathBuf>,
    /// Patch file to analyze
    #[arg(long)]
    patch_file: Option<PathBuf>,
    /// Command producing the diff when no patch file exists
    #[arg(long)]
    patch_cmd: Option<String>,
    /// Namespace prefix for reported calls (empty: no call probing)
    #[arg(short = 'n', long)]
    namespace: Option<String>,
    /// Structured export destination ("" disables)
    #[arg(long)]
    json_out: Option<String>,
    /// Outline export destination ("" disables)
    #[arg(long)]
    outline_out: Option<String>,
    /// Root topic title of the outline sheet
    #[arg(long)]
    outline_title: Option<String>,
    /// How calls from several functions in one block combine
    #[arg(long, value_enum)]
    call_merge: Option<CallMerge>,
    /// Do not probe callers of changed functions
    #[arg(long)]
    no_reverse: bool,
    /// Reuse the existing inventory instead of running the indexer
    #[arg(long)]
    skip_analysis: bool,
}

impl ConfigArgs {
    /// CLI layer of the config stack; unset flags stay `None`
    fn to_config(&self) -> Config {
        Config {
            indexer_cmd: self.indexer_cmd.clone(),
            reporter_dir: self.reporter_dir.clone(),
            patch_file: self.patch_file.clone(),
            patch_cmd: self.patch_cmd.clone(),
            namespace: self.namespace.clone(),
            to_json: self.json_out.clone(),
            to_outline: self.outline_out.clone(),
            outline_title: self.outline_title.clone(),
            call_merge: self.call_merge,
            reverse: self.no_reverse.then_some(false),
            skip_analysis: self.skip_analysis.then_some(true),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the impact report and write the configured exports
    Run {
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the report as a tree
        #[arg(long)]
        show: bool,
        /// Print the structured export to stdout
        #[arg(long)]
        json: bool,
    },
    /// Write .diffimpact.toml with the given settings
    Init {
        #[command(flatten)]
        config: ConfigArgs,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Log to stderr to keep stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

/// Run CLI with pre-parsed arguments
pub fn run_with(cli: Cli) -> Result<()> {
    init_tracing(&cli);
    let root = match &cli.project {
        Some(p) => p.clone(),
        None => find_project_root(),
    };

    match &cli.command {
        Commands::Run { config, show, json } => cmd_run(&cli, &root, config, *show, *json),
        Commands::Init { config, force } => cmd_init(&cli, &root, config, *force),
        Commands::Config { config } => cmd_config(&root, config),
    }
}
