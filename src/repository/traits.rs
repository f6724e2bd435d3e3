//! Repository Layer - Core Traits
//!
//! Abstract interfaces for data access. The coordinator layer only ever
//! talks to `ItineraryStore`; implementations can use SQLite, in-memory,
//! or a remote service.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult, ItineraryItem, PositionChange};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Result of a batched position update.
///
/// A batch may fail partially: ids that did not persist are reported here
/// rather than aborting the remaining updates.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Ids whose position update did not take effect
    pub failed: Vec<u32>,
}

impl BatchOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Storage surface required by the ordering core
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    /// Persist a single item's position
    async fn update_item_position(&self, trip_id: u32, id: u32, position: f64) -> DomainResult<()>;

    /// Persist a batch of position changes, reporting per-id failures
    async fn update_positions(
        &self,
        trip_id: u32,
        changes: &[PositionChange],
    ) -> DomainResult<BatchOutcome>;

    /// Delete an item by id
    async fn delete_item(&self, id: u32) -> DomainResult<()>;

    /// Authoritative ordered list for a trip, position ascending
    async fn fetch_ordered_items(&self, trip_id: u32) -> DomainResult<Vec<ItineraryItem>>;
}
