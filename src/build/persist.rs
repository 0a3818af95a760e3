use crate::common::tool::EnvOverrides;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Lives in the source directory, next to the top-level `CMakeLists.txt`.
pub const PERSISTED_BUILD_FILENAME: &str = ".build_driver.json";

/// The last successfully configured build, so that `--clean` alone can rebuild it.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct PersistedBuild {
    pub build_dir: PathBuf,
    pub build_flags: Vec<String>,
    pub env: EnvOverrides,
}
impl PersistedBuild {
    pub fn filepath(source_dir: &Path) -> PathBuf {
        source_dir.join(PERSISTED_BUILD_FILENAME)
    }

    pub fn load(source_dir: &Path) -> Result<Option<Self>> {
        let filepath = Self::filepath(source_dir);
        if !filepath.is_file() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&filepath).with_context(|| format!("Failed to read {filepath:?}"))?;
        let persisted = serde_json::from_str(&content)
            .with_context(|| format!("Malformed persisted build {filepath:?}"))?;
        Ok(Some(persisted))
    }

    pub fn store(&self, source_dir: &Path) -> Result<()> {
        let filepath = Self::filepath(source_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&filepath, content).with_context(|| format!("Failed to write {filepath:?}"))?;
        log::debug!("Persisted the build configuration -> {filepath:?}");
        Ok(())
    }
}
