use crate::transform::{
    transform_log_file, transform_song_file, MalformedRecordPolicy, PlaybackEvent,
};
use crate::warehouse::Loader;
use anyhow::Result;
use rusqlite::Connection;
use std::ops::AddAssign;
use std::path::Path;
use tracing::debug;

/// Outcome of inserts guarded by a do-nothing conflict clause.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertCounts {
    pub inserted: usize,
    pub ignored: usize,
}

impl InsertCounts {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.ignored += 1;
        }
    }
}

impl AddAssign for InsertCounts {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.ignored += other.ignored;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub records: usize,
    pub skipped_records: usize,
    pub songs: InsertCounts,
    pub artists: InsertCounts,
    pub time: InsertCounts,
    pub user_upserts: usize,
    pub songplays: usize,
    /// Songplays bound to a catalog song.
    pub songplays_matched: usize,
}

impl AddAssign for FileStats {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.skipped_records += other.skipped_records;
        self.songs += other.songs;
        self.artists += other.artists;
        self.time += other.time;
        self.user_upserts += other.user_upserts;
        self.songplays += other.songplays;
        self.songplays_matched += other.songplays_matched;
    }
}

/// Transform-and-load step applied to every discovered file.
///
/// `conn` is the caller's open transaction; implementations must not commit.
pub trait FileProcessor {
    fn kind(&self) -> &'static str;
    fn process(&self, conn: &Connection, path: &Path) -> Result<FileStats>;
}

/// Song metadata file -> one song row and one artist row.
pub struct SongFileProcessor;

impl FileProcessor for SongFileProcessor {
    fn kind(&self) -> &'static str {
        "song"
    }

    fn process(&self, conn: &Connection, path: &Path) -> Result<FileStats> {
        let rows = transform_song_file(path)?;
        let loader = Loader::new(conn);

        let mut stats = FileStats {
            records: 1,
            ..Default::default()
        };
        stats.songs.record(loader.insert_song(&rows.song)?);
        stats.artists.record(loader.insert_artist(&rows.artist)?);
        Ok(stats)
    }
}

/// Activity log file -> time, user and songplay rows for every playback event.
pub struct LogFileProcessor {
    pub policy: MalformedRecordPolicy,
}

impl LogFileProcessor {
    fn load_songplay(loader: &Loader, event: &PlaybackEvent, stats: &mut FileStats) -> Result<()> {
        let mut songplay = event.songplay.clone();
        if let Some(key) = &event.song_key {
            if let Some(found) = loader.find_song(&key.title, &key.artist_name, key.duration)? {
                songplay.song_id = Some(found.song_id);
                songplay.artist_id = Some(found.artist_id);
                stats.songplays_matched += 1;
            }
        }
        if songplay.song_id.is_none() {
            debug!(
                "No catalog match for record {} ({:?})",
                songplay.ordinal, event.song_key
            );
        }
        loader.insert_songplay(&songplay)?;
        stats.songplays += 1;
        Ok(())
    }
}

impl FileProcessor for LogFileProcessor {
    fn kind(&self) -> &'static str {
        "log"
    }

    fn process(&self, conn: &Connection, path: &Path) -> Result<FileStats> {
        let batch = transform_log_file(path, self.policy)?;
        let loader = Loader::new(conn);

        let mut stats = FileStats {
            records: batch.records_seen,
            skipped_records: batch.skipped,
            ..Default::default()
        };

        // time rows first: every songplay must point at a loaded timestamp
        for event in &batch.events {
            stats.time.record(loader.insert_time(&event.time)?);
        }
        for event in &batch.events {
            loader.upsert_user(&event.user)?;
            stats.user_upserts += 1;
        }
        for event in &batch.events {
            Self::load_songplay(&loader, event, &mut stats)?;
        }
        Ok(stats)
    }
}
