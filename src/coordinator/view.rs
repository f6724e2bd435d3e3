//! Trip View State
//!
//! One `TripView` exclusively owns the ordered itinerary list for a single
//! trip. The UI renders from this view; every mutation goes through the
//! reorder/deletion coordinators, which keep it consistent with storage.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainResult, ItineraryItem};
use crate::repository::ItineraryStore;

/// Locally held ordered list plus a mutation counter.
///
/// The epoch increments on every optimistic mutation. A persistence
/// completion that captured an older epoch has been superseded and must
/// not touch the list.
pub(super) struct ViewState {
    pub items: Vec<ItineraryItem>,
    pub epoch: u64,
}

/// Ordered itinerary view for one trip, kept in sync with storage
#[derive(Clone)]
pub struct TripView {
    trip_id: u32,
    store: Arc<dyn ItineraryStore>,
    state: Arc<Mutex<ViewState>>,
    /// Serializes store requests so they are observed in issue order.
    /// Optimistic applies never wait on this, only the sends do.
    persist: Arc<Mutex<()>>,
}

impl TripView {
    /// Build a view over an already-fetched list
    pub fn new(trip_id: u32, store: Arc<dyn ItineraryStore>, items: Vec<ItineraryItem>) -> Self {
        Self {
            trip_id,
            store,
            state: Arc::new(Mutex::new(ViewState { items, epoch: 0 })),
            persist: Arc::new(Mutex::new(())),
        }
    }

    /// Build a view by fetching the authoritative list
    pub async fn load(trip_id: u32, store: Arc<dyn ItineraryStore>) -> DomainResult<Self> {
        let items = store.fetch_ordered_items(trip_id).await?;
        Ok(Self::new(trip_id, store, items))
    }

    pub fn trip_id(&self) -> u32 {
        self.trip_id
    }

    /// Snapshot of the current local order
    pub async fn items(&self) -> Vec<ItineraryItem> {
        self.state.lock().await.items.clone()
    }

    pub(super) fn store(&self) -> &Arc<dyn ItineraryStore> {
        &self.store
    }

    pub(super) fn state(&self) -> &Arc<Mutex<ViewState>> {
        &self.state
    }

    pub(super) fn persist(&self) -> &Arc<Mutex<()>> {
        &self.persist
    }
}
