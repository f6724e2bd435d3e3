//! Itinerary Item Repository
//!
//! SQLite-backed implementation of item CRUD plus the `ItineraryStore`
//! surface the coordinators persist through. New items are appended: their
//! position is one step past the current per-trip maximum.

use async_trait::async_trait;
use log::warn;
use rusqlite::{params, Row};

use crate::domain::position::POSITION_STEP;
use crate::domain::{DomainError, DomainResult, ItemKind, ItineraryItem, PositionChange};
use super::db::DbConn;
use super::traits::{BatchOutcome, ItineraryStore, Repository};

const ITEM_COLUMNS: &str =
    "id, trip_id, name, kind, date, location, position, created_at, updated_at";

/// SQLite implementation of the itinerary item repository
pub struct ItineraryRepository {
    conn: DbConn,
}

impl ItineraryRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    /// Append position for a new item in a trip
    async fn next_position(&self, trip_id: u32) -> DomainResult<f64> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT COALESCE(MAX(position), 0) + ? FROM itinerary_items WHERE trip_id = ?",
            params![POSITION_STEP, trip_id],
            |row| row.get(0),
        )
        .map_err(DomainError::internal)
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ItineraryItem> {
    let kind: String = row.get(3)?;
    Ok(ItineraryItem {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        name: row.get(2)?,
        kind: ItemKind::from_str(&kind),
        date: row.get(4)?,
        location: row.get(5)?,
        position: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[async_trait]
impl Repository<ItineraryItem> for ItineraryRepository {
    async fn create(&self, entity: &ItineraryItem) -> DomainResult<ItineraryItem> {
        let position = if entity.position > 0.0 {
            entity.position
        } else {
            self.next_position(entity.trip_id).await?
        };
        let now = chrono::Utc::now().timestamp_millis();

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO itinerary_items (trip_id, name, kind, date, location, position, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.trip_id,
                entity.name,
                entity.kind.as_str(),
                entity.date,
                entity.location,
                position,
                now,
                now
            ],
        )
        .map_err(DomainError::internal)?;

        let id = conn.last_insert_rowid() as u32;
        let mut created = entity.clone();
        created.id = id;
        created.position = position;
        created.created_at = Some(now);
        created.updated_at = Some(now);
        Ok(created)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<ItineraryItem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM itinerary_items WHERE id = ?",
                ITEM_COLUMNS
            ))
            .map_err(DomainError::internal)?;

        let mut rows = stmt
            .query_map(params![id], row_to_item)
            .map_err(DomainError::internal)?;

        match rows.next() {
            Some(row) => Ok(Some(row.map_err(DomainError::internal)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<ItineraryItem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM itinerary_items ORDER BY trip_id, position ASC",
                ITEM_COLUMNS
            ))
            .map_err(DomainError::internal)?;

        let rows = stmt
            .query_map([], row_to_item)
            .map_err(DomainError::internal)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DomainError::internal)
    }

    async fn update(&self, entity: &ItineraryItem) -> DomainResult<ItineraryItem> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        let affected = conn
            .execute(
                "UPDATE itinerary_items
                 SET name = ?, kind = ?, date = ?, location = ?, position = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    entity.name,
                    entity.kind.as_str(),
                    entity.date,
                    entity.location,
                    entity.position,
                    now,
                    entity.id
                ],
            )
            .map_err(DomainError::internal)?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Itinerary item {} not found",
                entity.id
            )));
        }
        let mut updated = entity.clone();
        updated.updated_at = Some(now);
        Ok(updated)
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.delete_item(id).await
    }
}

#[async_trait]
impl ItineraryStore for ItineraryRepository {
    async fn update_item_position(&self, trip_id: u32, id: u32, position: f64) -> DomainResult<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        let affected = conn
            .execute(
                "UPDATE itinerary_items SET position = ?, updated_at = ? WHERE id = ? AND trip_id = ?",
                params![position, now, id, trip_id],
            )
            .map_err(DomainError::internal)?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Itinerary item {} not found in trip {}",
                id, trip_id
            )));
        }
        Ok(())
    }

    async fn update_positions(
        &self,
        trip_id: u32,
        changes: &[PositionChange],
    ) -> DomainResult<BatchOutcome> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock().await;
        let mut outcome = BatchOutcome::default();

        // Per-id statements: one bad id must not abort the rest
        for change in changes {
            let result = conn.execute(
                "UPDATE itinerary_items SET position = ?, updated_at = ? WHERE id = ? AND trip_id = ?",
                params![change.position, now, change.id, trip_id],
            );
            match result {
                Ok(0) => outcome.failed.push(change.id),
                Ok(_) => {}
                Err(e) => {
                    warn!("Position update for item {} failed: {}", change.id, e);
                    outcome.failed.push(change.id);
                }
            }
        }
        Ok(outcome)
    }

    async fn delete_item(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let affected = conn
            .execute("DELETE FROM itinerary_items WHERE id = ?", params![id])
            .map_err(DomainError::internal)?;

        if affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Itinerary item {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn fetch_ordered_items(&self, trip_id: u32) -> DomainResult<Vec<ItineraryItem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM itinerary_items WHERE trip_id = ? ORDER BY position ASC",
                ITEM_COLUMNS
            ))
            .map_err(DomainError::internal)?;

        let rows = stmt
            .query_map(params![trip_id], row_to_item)
            .map_err(DomainError::internal)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(DomainError::internal)
    }
}
