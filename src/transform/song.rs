use super::{json_lines, read_file, require, TransformError};
use crate::warehouse::{ArtistRow, SongRow};
use serde::Deserialize;
use std::path::Path;

/// One song-metadata record as found in the song data files.
#[derive(Debug, Deserialize)]
struct SongRecord {
    song_id: Option<String>,
    title: Option<String>,
    artist_id: Option<String>,
    year: Option<i32>,
    duration: Option<f64>,
    artist_name: Option<String>,
    artist_location: Option<String>,
    artist_latitude: Option<f64>,
    artist_longitude: Option<f64>,
}

/// The two dimension rows carried by one song file.
#[derive(Clone, Debug, PartialEq)]
pub struct SongFileRows {
    pub song: SongRow,
    pub artist: ArtistRow,
}

pub fn transform_song_file(path: &Path) -> Result<SongFileRows, TransformError> {
    let content = read_file(path)?;
    transform_song_str(&content, path)
}

/// Only the first record is used, song files hold exactly one.
pub fn transform_song_str(content: &str, path: &Path) -> Result<SongFileRows, TransformError> {
    let (line, text) = json_lines(content)
        .next()
        .ok_or_else(|| TransformError::Empty(path.to_path_buf()))?;

    let record: SongRecord =
        serde_json::from_str(text).map_err(|source| TransformError::Json {
            path: path.to_path_buf(),
            line,
            source,
        })?;

    let artist_id = require(record.artist_id, path, line, "artist_id")?;
    let song = SongRow {
        song_id: require(record.song_id, path, line, "song_id")?,
        title: require(record.title, path, line, "title")?,
        artist_id: artist_id.clone(),
        year: require(record.year, path, line, "year")?,
        duration: require(record.duration, path, line, "duration")?,
    };
    let artist = ArtistRow {
        artist_id,
        name: require(record.artist_name, path, line, "artist_name")?,
        location: record.artist_location,
        latitude: record.artist_latitude,
        longitude: record.artist_longitude,
    };

    Ok(SongFileRows { song, artist })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SONG_JSON: &str = r#"{"song_id":"S1","title":"T","artist_id":"A1","year":2000,"duration":200.5,"artist_name":"N","artist_location":"L","artist_latitude":1.0,"artist_longitude":2.0}"#;

    fn path() -> &'static Path {
        Path::new("song_data/A/B/TRAAAAW128F429D538.json")
    }

    #[test]
    fn parses_song_and_artist() {
        let rows = transform_song_str(SONG_JSON, path()).unwrap();
        assert_eq!(
            rows.song,
            SongRow {
                song_id: "S1".to_string(),
                title: "T".to_string(),
                artist_id: "A1".to_string(),
                year: 2000,
                duration: 200.5,
            }
        );
        assert_eq!(
            rows.artist,
            ArtistRow {
                artist_id: "A1".to_string(),
                name: "N".to_string(),
                location: Some("L".to_string()),
                latitude: Some(1.0),
                longitude: Some(2.0),
            }
        );
    }

    #[test]
    fn parses_null_artist_coordinates_and_extra_fields() {
        let s = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;
        let rows = transform_song_str(s, path()).unwrap();
        assert_eq!(rows.song.year, 0);
        assert_eq!(rows.song.duration, 218.93179);
        assert_eq!(rows.artist.latitude, None);
        assert_eq!(rows.artist.longitude, None);
        assert_eq!(rows.artist.location.as_deref(), Some("California - LA"));
    }

    #[test]
    fn uses_first_record_only() {
        let content = format!(
            "\n{}\n{}\n",
            SONG_JSON,
            SONG_JSON.replace("\"S1\"", "\"S2\"")
        );
        let rows = transform_song_str(&content, path()).unwrap();
        assert_eq!(rows.song.song_id, "S1");
    }

    #[test]
    fn missing_required_field_is_reported() {
        let s = SONG_JSON.replace(r#""title":"T","#, "");
        match transform_song_str(&s, path()) {
            Err(TransformError::MissingField { field, line, .. }) => {
                assert_eq!(field, "title");
                assert_eq!(line, 0);
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = transform_song_str("{\"song_id\": ", path()).unwrap_err();
        assert!(matches!(err, TransformError::Json { .. }));
        assert!(err.to_string().contains("line 0"));
    }

    #[test]
    fn empty_file_is_reported() {
        let err = transform_song_str("\n   \n", path()).unwrap_err();
        assert!(matches!(err, TransformError::Empty(_)));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", SONG_JSON).unwrap();
        let rows = transform_song_file(file.path()).unwrap();
        assert_eq!(rows.artist.name, "N");
    }
}
