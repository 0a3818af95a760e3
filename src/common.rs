//! Pieces shared by both binaries: logging setup, exit codes, and external tool invocation.

pub mod tool;

use anyhow::Result;
use std::process::ExitCode;

/// The one exit code reported for any usage error or external tool failure.
pub const FAILURE_EXIT_CODE: u8 = 1;

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Let clap print its own message, then exit with our fixed code.
/// `--help` and `--version` surface here too, and those are successes.
pub fn usage_exit(err: clap::Error) -> ExitCode {
    /* Nowhere left to report a failure to write to stderr. */
    let _ = err.print();
    match err.use_stderr() {
        true => ExitCode::from(FAILURE_EXIT_CODE),
        false => ExitCode::SUCCESS,
    }
}

pub fn run_exit(res: Result<()>) -> ExitCode {
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:?}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}
