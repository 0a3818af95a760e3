use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
pub const EXCLUDED_DIRNAMES: &[&str] = &[".git", "third_party", "build"];

pub const SOURCE_SUFFIXES: &[&str] = &[".cxx", ".hxx", ".cpp", ".hpp", ".cc", ".h"];

fn is_excluded_dir(entry: &DirEntry) -> bool {
    /* The root itself is always walked, whatever its name. */
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRNAMES.contains(&name))
}

pub fn is_source_file(filepath: &Path) -> bool {
    filepath
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SOURCE_SUFFIXES.iter().any(|sfx| name.ends_with(sfx)))
}

/// Every source file under `root`, in a stable order, skipping excluded directories without entering them.
pub fn collect_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut filepaths = vec![];
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            filepaths.push(entry.into_path());
        }
    }
    Ok(filepaths)
}
