//! CLI command handlers
//!
//! Each submodule handles one CLI subcommand.

mod config_cmd;
mod init;
mod run;

pub(crate) use config_cmd::cmd_config;
pub(crate) use init::cmd_init;
pub(crate) use run::cmd_run;
