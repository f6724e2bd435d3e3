//! Trip Entity
//!
//! A trip is the ordering scope for itinerary items: positions are only
//! comparable between items owned by the same trip.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A planned trip owning an ordered set of itinerary items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier (assigned by storage)
    pub id: u32,
    /// Trip title
    pub name: String,
    /// Destination label
    pub destination: Option<String>,
    /// ISO date string (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// ISO date string (YYYY-MM-DD)
    pub end_date: Option<String>,
    /// Free-form notes
    pub description: Option<String>,
    pub created_at: Option<i64>,
}

impl Trip {
    /// Create a new trip with only a name set
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            destination: None,
            start_date: None,
            end_date: None,
            description: None,
            created_at: None,
        }
    }
}

impl Entity for Trip {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
