//! Parameterised upserts into the warehouse tables.
//!
//! Conflict policy per table:
//! - songs, artists, time: first-seen row wins, later inserts are ignored.
//! - users: `level` is overwritten by the latest insert, identity fields stay.
//! - songplays: always appended, the key is assigned by SQLite.
//!
//! The loader borrows whatever connection or transaction the caller holds,
//! so every statement lands in the caller's transaction.

use super::models::{
    format_timestamp, ArtistRow, SongRow, SongplayRow, StoredSongplay, TableCounts, TimeRow,
    UserLevel, UserRow,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

const INSERT_SONG: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(song_id) DO NOTHING";

const INSERT_ARTIST: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(artist_id) DO NOTHING";

const UPSERT_USER: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT(user_id) DO UPDATE SET level = excluded.level";

const INSERT_TIME: &str =
    "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(start_time) DO NOTHING";

const INSERT_SONGPLAY: &str = "INSERT INTO songplays
     (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const FIND_SONG: &str = "SELECT songs.song_id, songs.artist_id
     FROM songs
     JOIN artists ON songs.artist_id = artists.artist_id
     WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
     LIMIT 1";

/// Catalog entry matched by natural key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongMatch {
    pub song_id: String,
    pub artist_id: String,
}

pub struct Loader<'c> {
    conn: &'c Connection,
}

impl<'c> Loader<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Loader { conn }
    }

    /// Returns false when the song_id was already present.
    pub fn insert_song(&self, song: &SongRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(INSERT_SONG)?;
        let changed = stmt
            .execute(params![
                song.song_id,
                song.title,
                song.artist_id,
                song.year,
                song.duration
            ])
            .with_context(|| format!("Failed to insert song {}", song.song_id))?;
        Ok(changed > 0)
    }

    /// Returns false when the artist_id was already present.
    pub fn insert_artist(&self, artist: &ArtistRow) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(INSERT_ARTIST)?;
        let changed = stmt
            .execute(params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude
            ])
            .with_context(|| format!("Failed to insert artist {}", artist.artist_id))?;
        Ok(changed > 0)
    }

    pub fn upsert_user(&self, user: &UserRow) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(UPSERT_USER)?;
        stmt.execute(params![
            user.user_id,
            user.first_name,
            user.last_name,
            user.gender,
            user.level.as_str()
        ])
        .with_context(|| format!("Failed to upsert user {}", user.user_id))?;
        Ok(())
    }

    /// Returns false when the timestamp was already present.
    pub fn insert_time(&self, time: &TimeRow) -> Result<bool> {
        let start_time = format_timestamp(&time.start_time);
        let mut stmt = self.conn.prepare_cached(INSERT_TIME)?;
        let changed = stmt
            .execute(params![
                start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday
            ])
            .with_context(|| format!("Failed to insert time {}", start_time))?;
        Ok(changed > 0)
    }

    /// Appends the fact row and returns the store-assigned songplay_id.
    pub fn insert_songplay(&self, songplay: &SongplayRow) -> Result<i64> {
        let mut stmt = self.conn.prepare_cached(INSERT_SONGPLAY)?;
        stmt.execute(params![
            format_timestamp(&songplay.start_time),
            songplay.user_id,
            songplay.level.as_str(),
            songplay.song_id,
            songplay.artist_id,
            songplay.session_id,
            songplay.location,
            songplay.user_agent
        ])
        .with_context(|| format!("Failed to insert songplay for record {}", songplay.ordinal))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Exact match on title, artist name and duration.
    pub fn find_song(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongMatch>> {
        let mut stmt = self.conn.prepare_cached(FIND_SONG)?;
        let found = stmt
            .query_row(params![title, artist_name, duration], |row| {
                Ok(SongMatch {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()?;
        Ok(found)
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows of {}", table))?;
    Ok(count as usize)
}

pub fn table_counts(conn: &Connection) -> Result<TableCounts> {
    Ok(TableCounts {
        songplays: count_rows(conn, "songplays")?,
        users: count_rows(conn, "users")?,
        songs: count_rows(conn, "songs")?,
        artists: count_rows(conn, "artists")?,
        time: count_rows(conn, "time")?,
    })
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((user_id, first_name, last_name, gender, level)) => {
            let level = UserLevel::from_db_str(&level)
                .with_context(|| format!("User {} has unknown level {:?}", user_id, level))?;
            Ok(Some(UserRow {
                user_id,
                first_name,
                last_name,
                gender,
                level,
            }))
        }
    }
}

pub fn list_songplays(conn: &Connection) -> Result<Vec<StoredSongplay>> {
    let mut stmt = conn.prepare(
        "SELECT songplay_id, start_time, user_id, level, song_id, artist_id,
                session_id, location, user_agent
         FROM songplays ORDER BY songplay_id",
    )?;
    let songplays = stmt
        .query_map([], |row| {
            Ok(StoredSongplay {
                songplay_id: row.get(0)?,
                start_time: row.get(1)?,
                user_id: row.get(2)?,
                level: row.get(3)?,
                song_id: row.get(4)?,
                artist_id: row.get(5)?,
                session_id: row.get(6)?,
                location: row.get(7)?,
                user_agent: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(songplays)
}
