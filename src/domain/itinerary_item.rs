//! Itinerary Item Entity
//!
//! A single entry in a trip's itinerary. The `position` key defines its
//! rank within the owning trip; sorting by `position` ascending yields the
//! user-visible sequence.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Kind of itinerary entry, shown in the type picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Flight,
    Hotel,
    Tour,
    Meeting,
    Transport,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Flight => "flight",
            ItemKind::Hotel => "hotel",
            ItemKind::Tour => "tour",
            ItemKind::Meeting => "meeting",
            ItemKind::Transport => "transport",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "hotel" => ItemKind::Hotel,
            "tour" => ItemKind::Tour,
            "meeting" => ItemKind::Meeting,
            "transport" => ItemKind::Transport,
            _ => ItemKind::Flight,
        }
    }
}

/// One entry of a trip's ordered itinerary
///
/// Only reordering and deletion ever touch `position`; descriptive fields
/// play no part in ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryItem {
    /// Unique identifier, stable for the item's lifetime
    pub id: u32,
    /// Owning trip (ordering scope)
    pub trip_id: u32,
    /// Display name
    pub name: String,
    /// Entry kind
    pub kind: ItemKind,
    /// ISO date string (YYYY-MM-DD)
    pub date: Option<String>,
    /// Free-form location or URL
    pub location: Option<String>,
    /// Ordering key within the owning trip
    pub position: f64,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl ItineraryItem {
    /// Create a new item with an explicit position
    pub fn new(id: u32, trip_id: u32, name: String, kind: ItemKind, position: f64) -> Self {
        Self {
            id,
            trip_id,
            name,
            kind,
            date: None,
            location: None,
            position,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for ItineraryItem {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}
