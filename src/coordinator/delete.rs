//! Deletion Sync Operations
//!
//! Deletion shares the trip view's list state but is independent of
//! ordering: removing an item never renumbers the survivors, their keys
//! stay valid.

use async_trait::async_trait;
use log::warn;

use crate::domain::{DomainError, DomainResult};
use super::view::TripView;

/// Trait for deletion synchronization on a trip view
#[async_trait]
pub trait DeletionSync {
    /// Remove an item locally, then persist the deletion. A failed delete
    /// restores the item and surfaces the error.
    async fn delete_item(&self, id: u32) -> DomainResult<()>;
}

#[async_trait]
impl DeletionSync for TripView {
    async fn delete_item(&self, id: u32) -> DomainResult<()> {
        let removed = {
            let mut state = self.state().lock().await;
            let index = state
                .items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| DomainError::NotFound(format!("Itinerary item {} not found", id)))?;
            let removed = state.items.remove(index);
            state.epoch += 1;
            removed
        };

        // Deletes share the per-view send queue with position writes
        let _send = self.persist().lock().await;
        match self.store().delete_item(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Trip {}: delete of item {} failed, restoring: {}", self.trip_id(), id, e);
                let mut state = self.state().lock().await;
                // The list may have moved on while the request was out;
                // reinsert by key, and never duplicate an item a refresh
                // already brought back.
                if !state.items.iter().any(|item| item.id == id) {
                    let slot = state
                        .items
                        .iter()
                        .position(|item| item.position > removed.position)
                        .unwrap_or(state.items.len());
                    state.items.insert(slot, removed);
                    state.epoch += 1;
                }
                Err(e)
            }
        }
    }
}
