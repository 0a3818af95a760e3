use crate::build::resolve::BuildInfo;
use anyhow::{Context, Result};
use derive_more::Deref;
use regex::Regex;
use std::fs;
use std::path::PathBuf;

/// Written by the generator into the build directory. We only ever read it.
pub const CMAKE_CACHE_FILENAME: &str = "CMakeCache.txt";

/// Key prefix of the cache entry that records the C++ compiler, e.g. `CMAKE_CXX_COMPILER:FILEPATH=/usr/bin/g++`.
const CXX_COMPILER_KEY: &str = "CMAKE_CXX_COMPILER:";

#[derive(Deref, Clone, PartialEq, Eq, Debug)]
pub struct BuildDir(PathBuf);
impl From<PathBuf> for BuildDir {
    fn from(dir: PathBuf) -> Self {
        Self(dir)
    }
}
impl BuildDir {
    pub fn cache_filepath(&self) -> PathBuf {
        self.0.join(CMAKE_CACHE_FILENAME)
    }

    /// The C++ compiler recorded in the generator's cache, if both the cache file and the entry exist.
    pub fn recorded_cxx_compiler(&self) -> Result<Option<PathBuf>> {
        let cache_filepath = self.cache_filepath();
        if !cache_filepath.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&cache_filepath)
            .with_context(|| format!("Failed to read {cache_filepath:?}"))?;

        let re = Regex::new(&format!(
            r"(?m)^{}[A-Z]*=(.*)$",
            regex::escape(CXX_COMPILER_KEY)
        ))?;
        let recorded = re
            .captures(&content)
            .map(|caps| PathBuf::from(caps[1].trim()));
        Ok(recorded)
    }
}

/// Bring the build directory into the state the build steps expect:
/// wiped if asked, invalidated on a compiler change, and present.
pub fn prepare(build_info: &mut BuildInfo) -> Result<()> {
    let build_dir = build_info.build_dir().clone();

    if build_info.wipe() && build_dir.exists() {
        log::info!("Wiping {:?}", &build_dir as &PathBuf);
        remove(&build_dir)?;
    }

    if let Some(expected_cxx) = build_info.expected_cxx() {
        match build_dir.recorded_cxx_compiler()? {
            Some(recorded_cxx) if &recorded_cxx != expected_cxx => {
                log::info!(
                    "The compiler changed from {recorded_cxx:?} to {expected_cxx:?}; wiping {:?}",
                    &build_dir as &PathBuf
                );
                remove(&build_dir)?;
            }
            _ => {}
        }
    }

    if !build_dir.exists() {
        log::info!("Creating {:?}", &build_dir as &PathBuf);
        fs::create_dir_all(&build_dir as &PathBuf)
            .with_context(|| format!("Failed to create {:?}", &build_dir as &PathBuf))?;

        if build_info.cached() {
            log::warn!("The cached build directory vanished; it will be configured again.");
            build_info.mark_not_cached();
        }
    }

    Ok(())
}

fn remove(build_dir: &BuildDir) -> Result<()> {
    fs::remove_dir_all(build_dir as &PathBuf)
        .with_context(|| format!("Failed to remove {:?}", build_dir as &PathBuf))
}
