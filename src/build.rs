//! `build_driver`: flags → [`Config`] → [`BuildInfo`] → external tool invocations.

pub mod build_dir;
pub mod config;
pub mod persist;
pub mod resolve;
pub mod steps;

use crate::common::{init_logger, run_exit, tool::ToolCommand, usage_exit};
use anyhow::{Context, Result};
use config::{Config, parse_config};
use resolve::BuildInfo;
use std::env;
use std::path::Path;
use std::process::ExitCode;

pub fn build_main() -> ExitCode {
    init_logger();

    let config = match parse_config(env::args_os()) {
        Ok(config) => config,
        Err(e) => return usage_exit(e),
    };
    log::info!("{config:?}");

    run_exit(run(config))
}

/// The source directory is the one we're invoked from.
pub fn run(config: Config) -> Result<()> {
    let source_dir = env::current_dir().context("Failed to get the current directory.")?;
    run_in(config, &source_dir)
}

pub fn run_in(config: Config, source_dir: &Path) -> Result<()> {
    report_branch(source_dir);

    let mut build_info: BuildInfo = resolve::resolve(config, source_dir);
    log::info!("{build_info:?}");

    build_dir::prepare(&mut build_info)?;

    steps::execute(&build_info, source_dir)
}

/// Informational only: a checkout without git still builds.
fn report_branch(source_dir: &Path) {
    let cmd = ToolCommand::new("git branch", "git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .dir(source_dir);
    match cmd.read() {
        Ok(branch) => println!("Building on branch `{branch}`"),
        Err(e) => log::warn!("Could not determine the git branch: {e:#}"),
    }
}
