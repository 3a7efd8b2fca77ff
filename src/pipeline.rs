//! End-to-end run: prepare the schema, load song files, then log files.

use crate::config::AppConfig;
use crate::ingest::{run_batch, BatchReport, LogFileProcessor, SongFileProcessor};
use crate::warehouse::{create_schema, reset_schema, table_counts, validate_schema, TableCounts};
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

#[derive(Debug)]
pub struct PipelineSummary {
    pub songs: BatchReport,
    pub logs: BatchReport,
    pub counts: TableCounts,
}

impl PipelineSummary {
    pub fn files_failed(&self) -> usize {
        self.songs.files_failed + self.logs.files_failed
    }

    fn log(&self) {
        info!(
            "Song files: {} processed, {} failed ({} songs inserted, {} already present)",
            self.songs.files_processed,
            self.songs.files_failed,
            self.songs.stats.songs.inserted,
            self.songs.stats.songs.ignored
        );
        info!(
            "Log files: {} processed, {} failed ({} records, {} skipped, {} songplays, {} matched)",
            self.logs.files_processed,
            self.logs.files_failed,
            self.logs.stats.records,
            self.logs.stats.skipped_records,
            self.logs.stats.songplays,
            self.logs.stats.songplays_matched
        );
        info!(
            "Table counts: songplays={} users={} songs={} artists={} time={}",
            self.counts.songplays,
            self.counts.users,
            self.counts.songs,
            self.counts.artists,
            self.counts.time
        );
        if self.files_failed() > 0 {
            warn!("{} files failed and were rolled back", self.files_failed());
        }
    }
}

/// Prepare the schema according to `config`, then load every song file
/// followed by every log file.
///
/// Songs go first so playback events can be matched against the catalog.
pub fn run_pipeline(conn: &mut Connection, config: &AppConfig) -> Result<PipelineSummary> {
    if config.keep_schema {
        create_schema(conn)?;
    } else {
        reset_schema(conn)?;
    }
    validate_schema(conn)?;

    let options = config.batch_options();

    let songs = run_batch(conn, &config.song_data, &SongFileProcessor, &options)
        .context("Song data load failed")?;

    let log_processor = LogFileProcessor {
        policy: config.record_policy,
    };
    let logs = run_batch(conn, &config.log_data, &log_processor, &options)
        .context("Log data load failed")?;

    let summary = PipelineSummary {
        songs,
        logs,
        counts: table_counts(conn)?,
    };
    summary.log();
    Ok(summary)
}
