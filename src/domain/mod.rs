//! Domain Layer
//!
//! Entities and pure business rules, including the position key model and
//! the reorder engine. This layer has NO external dependencies (except
//! serde for serialization).

mod entity;
mod trip;
mod itinerary_item;
pub mod position;
mod reorder;

pub use entity::{Entity, DomainError, DomainResult};
pub use trip::Trip;
pub use itinerary_item::{ItineraryItem, ItemKind};
pub use reorder::{reorder, PositionChange, ReorderOutcome};
