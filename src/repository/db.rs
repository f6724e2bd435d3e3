//! Database Connection and Setup
//!
//! Manages the SQLite connection and schema migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared database connection handle
pub type DbConn = Arc<Mutex<Connection>>;

/// Open (or create) the database at `db_path` and run migrations.
///
/// `:memory:` is accepted for tests.
pub async fn init_db(db_path: &Path) -> DomainResult<DbConn> {
    let conn = Connection::open(db_path).map_err(DomainError::internal)?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let found = match stmt.query_map([], |row| row.get::<_, String>(1)) {
        Ok(rows) => rows.flatten().any(|name| name == column),
        Err(_) => false,
    };
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            destination TEXT,
            start_date TEXT,
            end_date TEXT,
            description TEXT,
            created_at INTEGER
        )",
        (),
    )
    .map_err(DomainError::internal)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS itinerary_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'flight',
            date TEXT,
            position REAL NOT NULL DEFAULT 0,
            created_at INTEGER
        )",
        (),
    )
    .map_err(DomainError::internal)?;

    // Additive columns for databases created before these fields existed
    if !column_exists(conn, "itinerary_items", "location") {
        conn.execute("ALTER TABLE itinerary_items ADD COLUMN location TEXT", ())
            .map_err(|e| DomainError::Internal(format!("Failed to add location: {}", e)))?;
    }

    if !column_exists(conn, "itinerary_items", "updated_at") {
        conn.execute("ALTER TABLE itinerary_items ADD COLUMN updated_at INTEGER", ())
            .map_err(|e| DomainError::Internal(format!("Failed to add updated_at: {}", e)))?;
    }

    // Index for ordered per-trip reads
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_itinerary_trip ON itinerary_items(trip_id, position)",
        (),
    )
    .map_err(DomainError::internal)?;

    Ok(())
}
