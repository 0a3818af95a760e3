use crate::build::{
    config::parse_config,
    resolve::{self, BuildInfo},
};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve as the binary would, from flags given without the program name.
pub fn resolve_flags(flags: &[&str], source_dir: &Path) -> Result<BuildInfo> {
    let argv = std::iter::once("build_driver").chain(flags.iter().copied());
    let config = parse_config(argv)?;
    Ok(resolve::resolve(config, source_dir))
}

pub fn dir_flag(dir: &Path) -> String {
    format!("--dir={}", dir.display())
}

/// A file whose survival tells whether its directory was wiped.
pub fn put_marker(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let marker = dir.join("marker.o");
    fs::write(&marker, "")?;
    Ok(marker)
}

pub fn put_cmake_cache(dir: &Path, cxx: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let content = format!(
        "# This is the CMakeCache file.\n\
        CMAKE_CXX_COMPILER_AR:FILEPATH=/usr/bin/llvm-ar\n\
        CMAKE_CXX_COMPILER:FILEPATH={}\n\
        CMAKE_BUILD_TYPE:STRING=Debug\n",
        cxx.display()
    );
    fs::write(dir.join("CMakeCache.txt"), content)?;
    Ok(())
}

pub fn file_name_of(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap()
}
