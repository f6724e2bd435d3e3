//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod itinerary_repo;
mod trip_repo;


pub use traits::{BatchOutcome, ItineraryStore, Repository};
pub use db::{init_db, DbConn};
pub use itinerary_repo::ItineraryRepository;
pub use trip_repo::TripRepository;
