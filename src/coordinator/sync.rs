//! Reorder Sync Operations
//!
//! Bridges the pure reorder engine to storage: apply the new order locally
//! first (optimistic), then persist the change batch. Sends are serialized
//! per view, so the store observes them in issue order and a later move's
//! write always lands last. A failed or partially failed batch is repaired
//! by replacing local state with the authoritative list. Responses
//! overtaken by a newer mutation are dropped (last-issued-wins).

use async_trait::async_trait;
use log::{debug, warn};

use crate::domain::{reorder, DomainResult};
use super::view::TripView;

/// How a move settled against storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Change batch persisted; local state already correct
    Persisted,
    /// Move was a no-op; nothing sent
    Unchanged,
    /// Persistence failed; local state replaced with the authoritative list
    Recovered,
    /// A newer mutation started before this one settled; response dropped
    Superseded,
}

/// Trait for reorder synchronization on a trip view
#[async_trait]
pub trait ReorderSync {
    /// Move an item to a new slot and persist the resulting key changes
    async fn move_item(&self, moved_id: u32, target_index: usize) -> DomainResult<SyncOutcome>;

    /// Replace local state with the authoritative ordered list
    async fn refresh(&self) -> DomainResult<()>;
}

#[async_trait]
impl ReorderSync for TripView {
    async fn move_item(&self, moved_id: u32, target_index: usize) -> DomainResult<SyncOutcome> {
        // Compute and apply optimistically under one lock. Invalid moves
        // error out here with local state untouched.
        let (epoch, changes) = {
            let mut state = self.state().lock().await;
            let outcome = reorder(&state.items, moved_id, target_index)?;
            if outcome.changed.is_empty() {
                return Ok(SyncOutcome::Unchanged);
            }
            state.items = outcome.items;
            state.epoch += 1;
            (state.epoch, outcome.changed)
        };
        debug!(
            "Trip {}: moved item {} to slot {}, persisting {} change(s)",
            self.trip_id(),
            moved_id,
            target_index,
            changes.len()
        );

        // Queue behind any outstanding request; a drag started mid-flight
        // sends only after the earlier one settles.
        let _send = self.persist().lock().await;
        let persisted = self.store().update_positions(self.trip_id(), &changes).await;
        match persisted {
            Ok(batch) if batch.all_succeeded() => {
                let state = self.state().lock().await;
                if state.epoch != epoch {
                    return Ok(SyncOutcome::Superseded);
                }
                Ok(SyncOutcome::Persisted)
            }
            Ok(batch) => {
                // Half-applied batches cannot be represented locally;
                // treat as a full failure and re-sync.
                warn!(
                    "Trip {}: {} of {} position write(s) failed, re-syncing",
                    self.trip_id(),
                    batch.failed.len(),
                    changes.len()
                );
                self.recover(epoch).await
            }
            Err(e) => {
                warn!("Trip {}: position batch failed ({}), re-syncing", self.trip_id(), e);
                self.recover(epoch).await
            }
        }
    }

    async fn refresh(&self) -> DomainResult<()> {
        let items = self.store().fetch_ordered_items(self.trip_id()).await?;
        let mut state = self.state().lock().await;
        state.items = items;
        state.epoch += 1;
        Ok(())
    }
}

impl TripView {
    /// Discard the optimistic guess for `epoch` in favor of the
    /// authoritative list. A newer mutation owns the list by the time we
    /// get here, the stale response is simply dropped.
    async fn recover(&self, epoch: u64) -> DomainResult<SyncOutcome> {
        {
            let state = self.state().lock().await;
            if state.epoch != epoch {
                return Ok(SyncOutcome::Superseded);
            }
        }
        let authoritative = self.store().fetch_ordered_items(self.trip_id()).await?;
        let mut state = self.state().lock().await;
        if state.epoch != epoch {
            return Ok(SyncOutcome::Superseded);
        }
        state.items = authoritative;
        state.epoch += 1;
        Ok(SyncOutcome::Recovered)
    }
}
