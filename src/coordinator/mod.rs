//! Coordinator Layer
//!
//! Optimistic bridging between the locally displayed itinerary and the
//! authoritative store: reorder sync, deletion sync, and recovery when
//! persistence fails.

mod view;
mod sync;
mod delete;

#[cfg(test)]
mod tests;

pub use view::TripView;
pub use sync::{ReorderSync, SyncOutcome};
pub use delete::DeletionSync;
