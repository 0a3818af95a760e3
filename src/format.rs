//! `format_driver`: run `clang-format` on every source file of the tree, one file at a time.

pub mod config;
pub mod files;

use crate::common::{init_logger, run_exit, tool::ToolCommand, usage_exit};
use anyhow::{Context, Result};
use config::{FormatMode, parse_args};
use std::env;
use std::path::Path;
use std::process::ExitCode;

pub fn format_main() -> ExitCode {
    init_logger();

    let args = match parse_args(env::args_os()) {
        Ok(args) => args,
        Err(e) => return usage_exit(e),
    };

    let res = env::current_dir()
        .context("Failed to get the current directory.")
        .and_then(|cwd| {
            let root = match args.root {
                Some(root) => cwd.join(root),
                None => cwd,
            };
            run(&root, args.mode)
        });
    run_exit(res)
}

pub fn formatter_command(filepath: &Path, mode: FormatMode) -> ToolCommand {
    let cmd = ToolCommand::new("formatter", "clang-format").arg("-style=file");
    let cmd = match mode {
        FormatMode::Check => cmd.args(["--dry-run", "--Werror"]),
        FormatMode::Apply => cmd.arg("-i"),
    };
    cmd.arg(filepath)
}

pub fn run(root: &Path, mode: FormatMode) -> Result<()> {
    run_with(root, mode, |filepath| formatter_command(filepath, mode))
}

/// Stops at the first file the formatter fails on.
pub fn run_with<F>(root: &Path, mode: FormatMode, formatter: F) -> Result<()>
where
    F: Fn(&Path) -> ToolCommand,
{
    match mode {
        FormatMode::Check => log::info!("Checking formatting only; no file will be modified."),
        FormatMode::Apply => log::info!("Formatting will be applied to the source files."),
    }
    log::info!("Excluding directories named {:?}", files::EXCLUDED_DIRNAMES);

    let filepaths = files::collect_source_files(root)?;
    for filepath in filepaths.iter() {
        log::info!("Formatting {filepath:?}");
        formatter(filepath).run()?;
    }

    let verb = match mode {
        FormatMode::Check => "checked",
        FormatMode::Apply => "formatted",
    };
    println!("{} file(s) {verb}.", filepaths.len());
    Ok(())
}
