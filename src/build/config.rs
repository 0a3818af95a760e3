use clap::{ArgGroup, Parser, ValueEnum};
use derive_more::Display;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "build_driver", about = "Configure and build the project with CMake.")]
#[command(group(ArgGroup::new("compiler_choice").args(["gnu", "clang", "compiler"])))]
#[command(group(ArgGroup::new("build_type_choice").args(["debug", "release", "build_type"])))]
#[command(group(ArgGroup::new("sanitizer_choice").args(["asan", "tsan", "gcov", "sanitizer"])))]
pub struct CliArgs {
    /// An already existing build directory. Defaults to `./build`.
    #[clap(long = "dir", value_parser = existing_dir)]
    dir: Option<PathBuf>,

    /// Build with gcc/g++.
    #[clap(long = "gnu")]
    gnu: bool,

    /// Build with clang/clang++ (default).
    #[clap(long = "clang")]
    clang: bool,

    #[clap(long = "compiler", value_enum)]
    compiler: Option<Compiler>,

    /// Debug build (default).
    #[clap(long = "debug")]
    debug: bool,

    #[clap(long = "release")]
    release: bool,

    #[clap(long = "build_type", value_enum)]
    build_type: Option<BuildType>,

    /// Instrument with the address sanitizer.
    #[clap(long = "asan")]
    asan: bool,

    /// Instrument with the thread sanitizer.
    #[clap(long = "tsan")]
    tsan: bool,

    /// Instrument for gcov coverage. Together with `--tests`, also produces an HTML coverage report.
    #[clap(long = "gcov")]
    gcov: bool,

    #[clap(long = "sanitizer", value_enum)]
    sanitizer: Option<Sanitizer>,

    /// Build and run the tests.
    #[clap(long = "tests")]
    tests: bool,

    #[clap(long = "examples")]
    examples: bool,

    /// Run the clean target before building. On its own, rebuilds the last configured build.
    #[clap(long = "clean")]
    clean: bool,

    /// Delete the build directory first.
    #[clap(long = "wipe")]
    wipe: bool,

    /// An extra `NAME=VALUE` definition for the generator. Repeat for more.
    #[clap(long = "custom_defs")]
    custom_defs: Vec<CustomDef>,
}

#[derive(ValueEnum, Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Compiler {
    #[display("GNU")]
    Gnu,
    #[display("CLANG")]
    Clang,
}
impl Compiler {
    /// (C compiler, C++ compiler)
    pub fn tool_names(self) -> (&'static str, &'static str) {
        match self {
            Self::Gnu => ("gcc", "g++"),
            Self::Clang => ("clang", "clang++"),
        }
    }
}

#[derive(ValueEnum, Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuildType {
    #[display("DEBUG")]
    Debug,
    #[display("RELEASE")]
    Release,
}
impl BuildType {
    pub fn build_flag(self) -> &'static str {
        match self {
            Self::Debug => "-DCMAKE_BUILD_TYPE=Debug",
            Self::Release => "-DCMAKE_BUILD_TYPE=Release",
        }
    }
}

#[derive(ValueEnum, Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sanitizer {
    #[display("ASAN")]
    Asan,
    #[display("TSAN")]
    Tsan,
    #[display("UBSAN")]
    Ubsan,
    #[display("GCOV")]
    Gcov,
}
impl Sanitizer {
    pub fn build_flag(self) -> &'static str {
        match self {
            Self::Asan => "-DENABLE_ASAN=ON",
            Self::Tsan => "-DENABLE_TSAN=ON",
            Self::Ubsan => "-DENABLE_UBSAN=ON",
            Self::Gcov => "-DENABLE_COVERAGE=ON",
        }
    }
}

/// A `NAME=VALUE` generator definition.
#[derive(Display, Clone, PartialEq, Eq, Debug)]
#[display("{name}={value}")]
pub struct CustomDef {
    pub name: String,
    pub value: String,
}
impl FromStr for CustomDef {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected `NAME=VALUE`, got `{s}`")),
        }
    }
}
impl CustomDef {
    pub fn build_flag(&self) -> String {
        format!("-D{self}")
    }
}

fn existing_dir(s: &str) -> Result<PathBuf, String> {
    let dir = PathBuf::from(s);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(format!("the directory `{s}` does not exist"))
    }
}

/// The user's choices, before any defaulting.
#[derive(Default, Clone, Debug)]
pub struct Config {
    pub compiler: Option<Compiler>,
    pub build_type: Option<BuildType>,
    pub sanitizer: Option<Sanitizer>,
    pub dir: Option<PathBuf>,
    pub tests: bool,
    pub examples: bool,
    pub clean: bool,
    pub wipe: bool,
    pub custom_defs: Vec<CustomDef>,
}
impl From<CliArgs> for Config {
    fn from(cli_args: CliArgs) -> Self {
        /* The arg groups guarantee at most one candidate per choice. */
        let compiler = if cli_args.gnu {
            Some(Compiler::Gnu)
        } else if cli_args.clang {
            Some(Compiler::Clang)
        } else {
            cli_args.compiler
        };

        let build_type = if cli_args.debug {
            Some(BuildType::Debug)
        } else if cli_args.release {
            Some(BuildType::Release)
        } else {
            cli_args.build_type
        };

        let sanitizer = if cli_args.asan {
            Some(Sanitizer::Asan)
        } else if cli_args.tsan {
            Some(Sanitizer::Tsan)
        } else if cli_args.gcov {
            Some(Sanitizer::Gcov)
        } else {
            cli_args.sanitizer
        };

        Self {
            compiler,
            build_type,
            sanitizer,
            dir: cli_args.dir,
            tests: cli_args.tests,
            examples: cli_args.examples,
            clean: cli_args.clean,
            wipe: cli_args.wipe,
            custom_defs: cli_args.custom_defs,
        }
    }
}
impl Config {
    /// `--clean` and nothing else: rebuild whatever was configured last.
    pub fn is_clean_only(&self) -> bool {
        let Self {
            compiler,
            build_type,
            sanitizer,
            dir,
            tests,
            examples,
            clean,
            wipe,
            custom_defs,
        } = self;
        *clean
            && compiler.is_none()
            && build_type.is_none()
            && sanitizer.is_none()
            && dir.is_none()
            && !tests
            && !examples
            && !wipe
            && custom_defs.is_empty()
    }
}

/// Parse the full argv, program name included. Nothing touches the filesystem besides the `--dir` existence check.
pub fn parse_config<I, T>(argv: I) -> Result<Config, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(argv).map(Config::from)
}
