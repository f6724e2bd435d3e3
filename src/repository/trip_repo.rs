//! Trip Repository
//!
//! Minimal SQLite-backed store for trips, the owners of itinerary order.

use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::domain::{DomainError, DomainResult, Trip};
use super::db::DbConn;
use super::traits::Repository;

/// SQLite implementation of the trip repository
pub struct TripRepository {
    conn: DbConn,
}

impl TripRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }
}

fn row_to_trip(row: &Row<'_>) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: row.get(0)?,
        name: row.get(1)?,
        destination: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl Repository<Trip> for TripRepository {
    async fn create(&self, entity: &Trip) -> DomainResult<Trip> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO trips (name, destination, start_date, end_date, description, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entity.name,
                entity.destination,
                entity.start_date,
                entity.end_date,
                entity.description,
                now
            ],
        )
        .map_err(DomainError::internal)?;

        let mut created = entity.clone();
        created.id = conn.last_insert_rowid() as u32;
        created.created_at = Some(now);
        Ok(created)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Trip>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, destination, start_date, end_date, description, created_at
                 FROM trips WHERE id = ?",
            )
            .map_err(DomainError::internal)?;

        let mut rows = stmt
            .query_map(params![id], row_to_trip)
            .map_err(DomainError::internal)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(DomainError::internal)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Trip>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, destination, start_date, end_date, description, created_at
                 FROM trips ORDER BY created_at DESC",
            )
            .map_err(DomainError::internal)?;

        let rows = stmt
            .query_map([], row_to_trip)
            .map_err(DomainError::internal)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DomainError::internal)
    }

    async fn update(&self, entity: &Trip) -> DomainResult<Trip> {
        let conn = self.conn.lock().await;
        let affected = conn
            .execute(
                "UPDATE trips SET name = ?, destination = ?, start_date = ?, end_date = ?, description = ?
                 WHERE id = ?",
                params![
                    entity.name,
                    entity.destination,
                    entity.start_date,
                    entity.end_date,
                    entity.description,
                    entity.id
                ],
            )
            .map_err(DomainError::internal)?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("Trip {} not found", entity.id)));
        }
        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        // Items go with their trip
        conn.execute("DELETE FROM itinerary_items WHERE trip_id = ?", params![id])
            .map_err(DomainError::internal)?;
        let affected = conn
            .execute("DELETE FROM trips WHERE id = ?", params![id])
            .map_err(DomainError::internal)?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!("Trip {} not found", id)));
        }
        Ok(())
    }
}
