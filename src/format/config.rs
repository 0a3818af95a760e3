use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "format_driver", about = "Run clang-format over the project's sources.")]
pub struct CliArgs {
    /// Rewrite the files in place. Without it, only check.
    #[clap(long = "apply")]
    apply: bool,

    /// Directory to walk. Defaults to the current directory.
    #[clap(long = "root")]
    root: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormatMode {
    Check,
    Apply,
}

pub struct Args {
    pub mode: FormatMode,
    pub root: Option<PathBuf>,
}
impl From<CliArgs> for Args {
    fn from(cli_args: CliArgs) -> Self {
        let mode = match cli_args.apply {
            true => FormatMode::Apply,
            false => FormatMode::Check,
        };
        Self {
            mode,
            root: cli_args.root,
        }
    }
}

pub fn parse_args<I, T>(argv: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(argv).map(Args::from)
}
