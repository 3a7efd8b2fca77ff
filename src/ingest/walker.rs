use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All regular files under `root` (recursively) with the given extension.
///
/// Paths are absolute and sorted, so two runs over the same tree visit files
/// in the same order.
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("{} is not a valid directory.", root.display());
    }
    let root = root
        .canonicalize()
        .with_context(|| format!("Error resolving path: {}", root.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|e| e == extension) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
