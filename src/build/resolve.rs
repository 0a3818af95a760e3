use crate::{
    build::{
        build_dir::BuildDir,
        config::{BuildType, Compiler, Config, Sanitizer},
        persist::PersistedBuild,
    },
    common::tool::EnvOverrides,
};
use getset::{CopyGetters, Getters};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BUILD_DIRNAME: &str = "build";
pub const DEFAULT_COMPILER: Compiler = Compiler::Clang;
pub const DEFAULT_BUILD_TYPE: BuildType = BuildType::Debug;

pub const TESTS_FLAG: &str = "-DBUILD_TESTS=ON";
pub const EXAMPLES_FLAG: &str = "-DBUILD_EXAMPLES=ON";

/// Everything the build steps need, with every default already applied.
#[derive(Getters, CopyGetters, Debug)]
pub struct BuildInfo {
    #[getset(get = "pub")]
    build_dir: BuildDir,

    /// Generator flags, in the order they're passed.
    #[getset(get = "pub")]
    build_flags: Vec<String>,

    /// `CC` and `CXX`.
    #[getset(get = "pub")]
    env: EnvOverrides,

    /// Set only when a compiler was asked for explicitly. Then a `CXX` that differs from the one in the generator's cache invalidates the build directory.
    #[getset(get = "pub")]
    expected_cxx: Option<PathBuf>,

    /// The directory is already configured; skip the generator.
    #[getset(get_copy = "pub")]
    cached: bool,

    #[getset(get_copy = "pub")]
    clean: bool,

    #[getset(get_copy = "pub")]
    wipe: bool,

    #[getset(get_copy = "pub")]
    run_tests: bool,

    #[getset(get_copy = "pub")]
    run_coverage: bool,
}
impl BuildInfo {
    pub fn mark_not_cached(&mut self) {
        self.cached = false;
    }

    pub fn persisted(&self) -> PersistedBuild {
        PersistedBuild {
            build_dir: PathBuf::from(&self.build_dir as &PathBuf),
            build_flags: self.build_flags.clone(),
            env: self.env.clone(),
        }
    }
}

pub fn default_build_dir(source_dir: &Path) -> BuildDir {
    BuildDir::from(source_dir.join(DEFAULT_BUILD_DIRNAME))
}

/// Fill in the required choices (build type, build directory, compiler) and derive flags and environment.
///
/// `--clean` alone skips defaulting and reuses the last persisted configuration, if there is one.
pub fn resolve(config: Config, source_dir: &Path) -> BuildInfo {
    if config.is_clean_only() {
        match PersistedBuild::load(source_dir) {
            Ok(Some(persisted)) => {
                log::info!("Reusing the build configured in {:?}", persisted.build_dir);
                return BuildInfo {
                    build_dir: BuildDir::from(persisted.build_dir),
                    build_flags: persisted.build_flags,
                    env: persisted.env,
                    expected_cxx: None,
                    cached: true,
                    clean: true,
                    wipe: false,
                    run_tests: false,
                    run_coverage: false,
                };
            }
            Ok(None) => {
                log::info!("No persisted build; cleaning the default build directory.");
            }
            Err(e) => {
                log::warn!("Ignoring the persisted build: {e:?}");
            }
        }

        let mut build_info = resolve_full(config, source_dir);
        build_info.cached = true;
        build_info.expected_cxx = None;
        return build_info;
    }

    resolve_full(config, source_dir)
}

fn resolve_full(config: Config, source_dir: &Path) -> BuildInfo {
    let Config {
        compiler,
        build_type,
        sanitizer,
        dir,
        tests,
        examples,
        clean,
        wipe,
        custom_defs,
    } = config;

    let build_type = build_type.unwrap_or(DEFAULT_BUILD_TYPE);
    let compiler_requested = compiler.is_some();
    let compiler = compiler.unwrap_or(DEFAULT_COMPILER);
    let build_dir = match dir {
        Some(dir) => BuildDir::from(source_dir.join(dir)),
        None => default_build_dir(source_dir),
    };
    log::info!("Build type {build_type}, compiler {compiler}, sanitizer {sanitizer:?}");

    let mut build_flags = vec![build_type.build_flag().to_string()];
    if let Some(sanitizer) = sanitizer {
        build_flags.push(sanitizer.build_flag().to_string());
    }
    if tests {
        build_flags.push(TESTS_FLAG.to_string());
    }
    if examples {
        build_flags.push(EXAMPLES_FLAG.to_string());
    }
    build_flags.extend(custom_defs.iter().map(|def| def.build_flag()));

    let env = compiler_env(compiler, env::var_os("PATH").as_deref());
    /* Only an explicit compiler choice may invalidate an existing build directory. */
    let expected_cxx = match compiler_requested {
        true => env.get("CXX").cloned(),
        false => None,
    };

    BuildInfo {
        build_dir,
        build_flags,
        env,
        expected_cxx,
        cached: false,
        clean,
        wipe,
        run_tests: tests,
        run_coverage: tests && sanitizer == Some(Sanitizer::Gcov),
    }
}

pub fn compiler_env(compiler: Compiler, path_var: Option<&OsStr>) -> EnvOverrides {
    let (cc, cxx) = compiler.tool_names();
    let mut env = EnvOverrides::new();
    env.insert("CC".to_string(), find_in_path(cc, path_var));
    env.insert("CXX".to_string(), find_in_path(cxx, path_var));
    env
}

/// The first `PATH` entry holding `name`, else the bare name for the generator to look up itself.
pub fn find_in_path(name: &str, path_var: Option<&OsStr>) -> PathBuf {
    path_var
        .into_iter()
        .flat_map(env::split_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}
