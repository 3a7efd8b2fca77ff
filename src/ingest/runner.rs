use super::processors::{FileProcessor, FileStats};
use super::walker::discover_files;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Extension (without the dot) of the files to ingest.
    pub extension: String,
    /// Roll back and count a failing file instead of stopping the run.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            continue_on_error: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub root: PathBuf,
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub stats: FileStats,
}

/// Apply `processor` to every file under `root`, one transaction per file.
///
/// A file's rows become visible only once the processor returned Ok and
/// the commit went through, so an aborted run never leaves half a file
/// behind.
pub fn run_batch(
    conn: &mut Connection,
    root: &Path,
    processor: &dyn FileProcessor,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let files = discover_files(root, &options.extension)?;
    let total = files.len();
    info!("{} files found in {}", total, root.display());

    let mut report = BatchReport {
        root: root.to_path_buf(),
        files_found: total,
        ..Default::default()
    };

    for (index, path) in files.iter().enumerate() {
        let tx = conn.transaction()?;
        match processor.process(&tx, path) {
            Ok(stats) => {
                tx.commit()
                    .with_context(|| format!("Failed to commit {}", path.display()))?;
                report.stats += stats;
                report.files_processed += 1;
            }
            Err(e) if options.continue_on_error => {
                error!(
                    "Failed to process {} file {}: {:#}",
                    processor.kind(),
                    path.display(),
                    e
                );
                tx.rollback()?;
                report.files_failed += 1;
            }
            Err(e) => {
                return Err(e.context(format!(
                    "Failed to process {} file {}",
                    processor.kind(),
                    path.display()
                )));
            }
        }
        info!("{}/{} files processed.", index + 1, total);
    }

    Ok(report)
}
