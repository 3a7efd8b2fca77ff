//! Turning raw JSON-lines files into warehouse rows.
//!
//! Transforms are pure: they read one file and return rows, the database is
//! only touched by the loader.

mod log;
mod song;
mod time;

pub use log::{transform_log_file, transform_log_str, LogBatch, PlaybackEvent, SongKey};
pub use song::{transform_song_file, transform_song_str, SongFileRows};
pub use time::{time_row, timestamp_from_epoch_millis};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file or record that could not be turned into rows.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?} line {line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("No record in {0:?}")]
    Empty(PathBuf),

    #[error("Missing field `{field}` in {path:?} line {line}")]
    MissingField {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },

    #[error("Invalid field `{field}` in {path:?} line {line}: {reason}")]
    InvalidField {
        path: PathBuf,
        line: usize,
        field: &'static str,
        reason: String,
    },
}

/// What to do with a malformed record inside a multi-record file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedRecordPolicy {
    /// Log a warning and carry on with the next record.
    #[default]
    Skip,
    /// Fail the whole file.
    Abort,
}

fn read_file(path: &Path) -> Result<String, TransformError> {
    std::fs::read_to_string(path).map_err(|source| TransformError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Non-blank lines with their zero-based line index. A leading byte order
/// mark is dropped.
fn json_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .lines()
        .enumerate()
        .map(|(index, line)| (index, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn require<T>(
    value: Option<T>,
    path: &Path,
    line: usize,
    field: &'static str,
) -> Result<T, TransformError> {
    value.ok_or_else(|| TransformError::MissingField {
        path: path.to_path_buf(),
        line,
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_skips_blank_lines_and_keeps_indices() {
        let content = "{\"a\":1}\n\n  \n{\"b\":2}\r\n";
        let lines: Vec<_> = json_lines(content).collect();
        assert_eq!(lines, vec![(0, "{\"a\":1}"), (3, "{\"b\":2}")]);
    }

    #[test]
    fn json_lines_drops_byte_order_mark() {
        let content = "\u{feff}{\"a\":1}\n{\"b\":2}";
        let lines: Vec<_> = json_lines(content).collect();
        assert_eq!(lines, vec![(0, "{\"a\":1}"), (1, "{\"b\":2}")]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, TransformError::Io { .. }));
    }
}
