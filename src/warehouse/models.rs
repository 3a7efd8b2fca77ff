//! Row types for the songplays star schema.

use chrono::NaiveDateTime;

/// Text layout of every `start_time` column. Millisecond precision, sorts
/// lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Song dimension row.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

/// Artist dimension row.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserLevel {
    Free,
    Paid,
}

impl UserLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserLevel::Free => "free",
            UserLevel::Paid => "paid",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(UserLevel::Free),
            "paid" => Some(UserLevel::Paid),
            _ => None,
        }
    }
}

/// User dimension row. Only `level` changes after the first insert.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub level: UserLevel,
}

/// Time dimension row, every field derived from `start_time`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
}

/// Fact row for one playback event.
///
/// `ordinal` is the record's line index inside its log file. It only
/// identifies the event in log output; the store assigns `songplay_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct SongplayRow {
    pub ordinal: usize,
    pub start_time: NaiveDateTime,
    pub user_id: i64,
    pub level: UserLevel,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Songplay row as read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredSongplay {
    pub songplay_id: i64,
    pub start_time: String,
    pub user_id: i64,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songplays: usize,
    pub users: usize,
    pub songs: usize,
    pub artists: usize,
    pub time: usize,
}
