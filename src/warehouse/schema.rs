//! SQLite schema for the songplays star schema.
//!
//! One fact table (`songplays`) and four dimension tables. Dimension rows
//! are keyed by their natural identifiers; songplays get a store-assigned
//! integer key.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

// =============================================================================
// Fact Table
// =============================================================================

/// One row per playback event
const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        sqlite_column!("songplay_id", &SqlType::Integer, is_primary_key = true), // rowid alias
        sqlite_column!("start_time", &SqlType::Text, non_null = true),
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!("level", &SqlType::Text),
        sqlite_column!("song_id", &SqlType::Text), // null when no catalog match
        sqlite_column!("artist_id", &SqlType::Text), // null when no catalog match
        sqlite_column!("session_id", &SqlType::Integer),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("user_agent", &SqlType::Text),
    ],
    indices: &[
        ("idx_songplays_start_time", "start_time"),
        ("idx_songplays_user", "user_id"),
    ],
};

// =============================================================================
// Dimension Tables
// =============================================================================

const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("level", &SqlType::Text), // 'free', 'paid'
    ],
    indices: &[],
};

const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist_id", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("duration", &SqlType::Real),
    ],
    indices: &[("idx_songs_title", "title")],
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[],
};

const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        sqlite_column!("start_time", &SqlType::Text, is_primary_key = true),
        sqlite_column!("hour", &SqlType::Integer),
        sqlite_column!("day", &SqlType::Integer),
        sqlite_column!("week", &SqlType::Integer), // ISO-8601
        sqlite_column!("month", &SqlType::Integer),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("weekday", &SqlType::Integer), // 0 = Monday
    ],
    indices: &[],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

/// Fact table first: creation follows this order and so does dropping.
pub const WAREHOUSE_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[
        SONGPLAYS_TABLE,
        USERS_TABLE,
        SONGS_TABLE,
        ARTISTS_TABLE,
        TIME_TABLE,
    ],
};

/// Create every missing table and index. Safe to call repeatedly.
pub fn create_schema(conn: &Connection) -> Result<()> {
    WAREHOUSE_SCHEMA
        .create(conn)
        .context("Failed to create warehouse schema")
}

/// Drop all warehouse tables that exist. Safe to call repeatedly.
pub fn drop_schema(conn: &Connection) -> Result<()> {
    WAREHOUSE_SCHEMA
        .drop_if_exists(conn)
        .context("Failed to drop warehouse schema")
}

pub fn reset_schema(conn: &Connection) -> Result<()> {
    info!("Dropping and recreating warehouse tables");
    drop_schema(conn)?;
    create_schema(conn)
}

/// Check the live database against the declared tables.
pub fn validate_schema(conn: &Connection) -> Result<()> {
    WAREHOUSE_SCHEMA
        .validate(conn)
        .context("Warehouse schema validation failed")
}
