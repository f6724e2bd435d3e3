//! Trip Planner Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules, including the position key
//!   model and the pure reorder engine
//! - repository: Data access abstractions and the SQLite implementation
//! - coordinator: Optimistic per-trip list state bridged to storage

pub mod domain;
pub mod repository;
pub mod coordinator;

pub use domain::{DomainError, DomainResult, ItemKind, ItineraryItem, Trip};
pub use coordinator::{DeletionSync, ReorderSync, SyncOutcome, TripView};
