use super::time::{time_row, timestamp_from_epoch_millis};
use super::{json_lines, read_file, require, MalformedRecordPolicy, TransformError};
use crate::warehouse::{SongplayRow, TimeRow, UserLevel, UserRow};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Only this page marks a playback event.
const PLAYBACK_PAGE: &str = "NextSong";

/// Integer fields show up as JSON integers, as whole-valued floats
/// (`10.0`) and as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexibleInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlexibleInt {
    fn as_i64(&self) -> Option<i64> {
        match self {
            FlexibleInt::Int(n) => Some(*n),
            FlexibleInt::Float(f) => whole_f64_to_i64(*f),
            FlexibleInt::Text(s) => {
                let s = s.trim();
                s.parse()
                    .ok()
                    .or_else(|| s.parse().ok().and_then(whole_f64_to_i64))
            }
        }
    }
}

fn whole_f64_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct PageOnly {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogRecord {
    ts: Option<FlexibleInt>,
    user_id: Option<FlexibleInt>,
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    level: Option<String>,
    song: Option<String>,
    artist: Option<String>,
    length: Option<f64>,
    session_id: Option<FlexibleInt>,
    location: Option<String>,
    user_agent: Option<String>,
}

/// Natural key used to find the played song in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct SongKey {
    pub title: String,
    pub artist_name: String,
    pub duration: f64,
}

/// Rows derived from one playback record.
///
/// `songplay.song_id`/`artist_id` start empty; they are bound by the
/// catalog lookup at load time.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackEvent {
    pub time: TimeRow,
    pub user: UserRow,
    pub songplay: SongplayRow,
    pub song_key: Option<SongKey>,
}

#[derive(Debug, Default)]
pub struct LogBatch {
    pub events: Vec<PlaybackEvent>,
    /// Non-blank lines in the file.
    pub records_seen: usize,
    /// Records dropped by the page filter.
    pub non_playback: usize,
    /// Malformed records skipped under `MalformedRecordPolicy::Skip`.
    pub skipped: usize,
}

pub fn transform_log_file(
    path: &Path,
    policy: MalformedRecordPolicy,
) -> Result<LogBatch, TransformError> {
    let content = read_file(path)?;
    transform_log_str(&content, path, policy)
}

pub fn transform_log_str(
    content: &str,
    path: &Path,
    policy: MalformedRecordPolicy,
) -> Result<LogBatch, TransformError> {
    let mut batch = LogBatch::default();

    for (line, text) in json_lines(content) {
        batch.records_seen += 1;
        match parse_record(text, path, line) {
            Ok(Some(event)) => batch.events.push(event),
            Ok(None) => batch.non_playback += 1,
            Err(e) => match policy {
                MalformedRecordPolicy::Abort => return Err(e),
                MalformedRecordPolicy::Skip => {
                    warn!("Skipping malformed log record: {}", e);
                    batch.skipped += 1;
                }
            },
        }
    }

    debug!(
        "{:?}: {} records, {} playback events, {} other, {} skipped",
        path,
        batch.records_seen,
        batch.events.len(),
        batch.non_playback,
        batch.skipped
    );
    Ok(batch)
}

/// None for records that are not playback events.
fn parse_record(
    text: &str,
    path: &Path,
    line: usize,
) -> Result<Option<PlaybackEvent>, TransformError> {
    let json_error = |source| TransformError::Json {
        path: path.to_path_buf(),
        line,
        source,
    };

    let value: serde_json::Value = serde_json::from_str(text).map_err(json_error)?;
    let page: PageOnly = serde_json::from_value(value.clone()).map_err(json_error)?;
    if page.page.as_deref() != Some(PLAYBACK_PAGE) {
        return Ok(None);
    }

    let record: LogRecord = serde_json::from_value(value).map_err(json_error)?;
    let invalid = |field: &'static str, reason: String| TransformError::InvalidField {
        path: path.to_path_buf(),
        line,
        field,
        reason,
    };

    let ts = require(record.ts, path, line, "ts")?;
    let ts = ts
        .as_i64()
        .ok_or_else(|| invalid("ts", format!("{:?} is not whole milliseconds", ts)))?;
    let start_time = timestamp_from_epoch_millis(ts)
        .ok_or_else(|| invalid("ts", format!("{} is out of range", ts)))?;

    let user_id = require(record.user_id, path, line, "userId")?;
    let user_id = user_id
        .as_i64()
        .ok_or_else(|| invalid("userId", format!("{:?} is not an integer", user_id)))?;

    let level = require(record.level, path, line, "level")?;
    let level = UserLevel::from_db_str(&level)
        .ok_or_else(|| invalid("level", format!("unknown level {:?}", level)))?;

    let session_id = record
        .session_id
        .map(|id| {
            id.as_i64()
                .ok_or_else(|| invalid("sessionId", format!("{:?} is not an integer", id)))
        })
        .transpose()?;

    let user = UserRow {
        user_id,
        first_name: require(record.first_name, path, line, "firstName")?,
        last_name: require(record.last_name, path, line, "lastName")?,
        gender: record.gender,
        level,
    };

    let song_key = match (record.song, record.artist, record.length) {
        (Some(title), Some(artist_name), Some(duration)) => Some(SongKey {
            title,
            artist_name,
            duration,
        }),
        _ => None,
    };

    let songplay = SongplayRow {
        ordinal: line,
        start_time,
        user_id,
        level,
        song_id: None,
        artist_id: None,
        session_id,
        location: record.location,
        user_agent: record.user_agent,
    };

    Ok(Some(PlaybackEvent {
        time: time_row(start_time),
        user,
        songplay,
        song_key,
    }))
}
