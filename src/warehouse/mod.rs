mod loader;
mod models;
mod schema;

pub use loader::{get_user, list_songplays, table_counts, Loader, SongMatch};
pub use models::*;
pub use schema::{create_schema, drop_schema, reset_schema, validate_schema, WAREHOUSE_SCHEMA};

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Open (or create) the warehouse database file.
///
/// `:memory:` opens a private in-memory database.
pub fn open_warehouse<P: AsRef<Path>>(db_path: P) -> Result<Connection> {
    let db_path = db_path.as_ref();
    let opened = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    };
    let conn =
        opened.with_context(|| format!("Failed to open warehouse database at {:?}", db_path))?;

    info!("Opened warehouse database at {:?}", db_path);
    Ok(conn)
}
