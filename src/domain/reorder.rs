//! Reorder Engine
//!
//! Pure computation of a drag-and-drop move: given the current ordered
//! list and a move instruction, produce the new list plus the minimal set
//! of position changes to persist. No I/O, no clocks, deterministic.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};
use super::itinerary_item::ItineraryItem;
use super::position::{between, gap_exhausted, renumbered};

/// One persisted position change, the unit of the batch update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: u32,
    pub position: f64,
}

/// Result of a reorder computation
#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    /// The list in its new order, positions already updated
    pub items: Vec<ItineraryItem>,
    /// Exactly the `{id, position}` pairs that differ from the input
    pub changed: Vec<PositionChange>,
}

/// Move `moved_id` to `target_index` within `items`.
///
/// `target_index` addresses the list with the moved item already removed,
/// so `0..=len-1` are all valid. A move onto the item's current index is a
/// no-op returning an empty change set. Invalid moves fail without
/// producing any list.
///
/// Normally only the moved item's key changes (midpoint of its new
/// neighbors). When that gap has narrowed below the usable threshold the
/// whole list is renumbered onto a fresh evenly spaced grid instead, and
/// every item appears in `changed`.
pub fn reorder(
    items: &[ItineraryItem],
    moved_id: u32,
    target_index: usize,
) -> DomainResult<ReorderOutcome> {
    let current_index = items
        .iter()
        .position(|item| item.id == moved_id)
        .ok_or_else(|| DomainError::NotFound(format!("Itinerary item {} not found", moved_id)))?;

    if target_index >= items.len() {
        return Err(DomainError::InvalidInput(format!(
            "Target index {} out of range for {} items",
            target_index,
            items.len()
        )));
    }

    if current_index == target_index {
        return Ok(ReorderOutcome {
            items: items.to_vec(),
            changed: Vec::new(),
        });
    }

    let mut reordered = items.to_vec();
    let moved = reordered.remove(current_index);
    reordered.insert(target_index, moved);

    let before = target_index
        .checked_sub(1)
        .map(|i| reordered[i].position);
    let after = reordered.get(target_index + 1).map(|item| item.position);

    if gap_exhausted(before, after) {
        return Ok(renumber(reordered));
    }

    let new_position = between(before, after);
    reordered[target_index].position = new_position;
    let changed = vec![PositionChange {
        id: moved_id,
        position: new_position,
    }];

    Ok(ReorderOutcome {
        items: reordered,
        changed,
    })
}

/// Assign every item a fresh evenly spaced key in final list order
fn renumber(mut items: Vec<ItineraryItem>) -> ReorderOutcome {
    let mut changed = Vec::with_capacity(items.len());
    for (index, item) in items.iter_mut().enumerate() {
        item.position = renumbered(index);
        changed.push(PositionChange {
            id: item.id,
            position: item.position,
        });
    }
    ReorderOutcome { items, changed }
}
