//! Records shared by the end-to-end tests.

#![allow(dead_code)]

pub const SONG_ID_1: &str = "SOUPIRU12A6D4FA1E1";
pub const ARTIST_ID_1: &str = "ARJIE2Y1187B994AB7";
pub const SONG_TITLE_1: &str = "Der Kleine Dompfaff";
pub const ARTIST_NAME_1: &str = "Line Renaud";
pub const SONG_DURATION_1: f64 = 152.92036;

pub const SONG_ID_2: &str = "SOMZWCG12A8C13C480";
pub const ARTIST_ID_2: &str = "ARD7TVE1187B99BFB1";

/// Playback timestamp 2018-11-05 17:50:00 UTC.
pub const TS_1: i64 = 1541440200000;
pub const TS_1_TEXT: &str = "2018-11-05 17:50:00.000";
/// Playback timestamp 2018-11-15 00:30:26.796 UTC.
pub const TS_2: i64 = 1542241826796;

pub fn song_1_json() -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{ARTIST_ID_1}", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "{ARTIST_NAME_1}", "song_id": "{SONG_ID_1}", "title": "{SONG_TITLE_1}", "duration": {SONG_DURATION_1}, "year": 0}}"#
    )
}

pub fn song_2_json() -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{ARTIST_ID_2}", "artist_latitude": 35.14968, "artist_longitude": -90.04892, "artist_location": "Memphis, TN", "artist_name": "Casual", "song_id": "{SONG_ID_2}", "title": "I Didn't Mean To", "duration": 218.93179, "year": 1994}}"#
    )
}

/// A `NextSong` event. `song`, `artist` and `length` are matched against
/// the song catalog.
pub fn play_json(ts: i64, user_id: i64, level: &str, song: &str, artist: &str, length: f64) -> String {
    format!(
        r#"{{"artist": "{artist}", "auth": "Logged In", "firstName": "Walter", "gender": "M", "itemInSession": 0, "lastName": "Frye", "length": {length}, "level": "{level}", "location": "San Francisco-Oakland-Hayward, CA", "method": "PUT", "page": "NextSong", "registration": 1540919166796.0, "sessionId": 38, "song": "{song}", "status": 200, "ts": {ts}, "userAgent": "Mozilla/5.0", "userId": "{user_id}"}}"#
    )
}

pub fn home_json(ts: i64, user_id: i64) -> String {
    format!(
        r#"{{"artist": null, "auth": "Logged In", "firstName": "Walter", "gender": "M", "itemInSession": 1, "lastName": "Frye", "length": null, "level": "free", "location": "San Francisco-Oakland-Hayward, CA", "method": "GET", "page": "Home", "registration": 1540919166796.0, "sessionId": 38, "song": null, "status": 200, "ts": {ts}, "userAgent": "Mozilla/5.0", "userId": "{user_id}"}}"#
    )
}
