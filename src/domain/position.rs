//! Position Key Model
//!
//! Ordering keys are plain f64 values. Inserting between two neighbors
//! takes their midpoint, so a single-item move needs a single-item write.
//! The key space is never rebalanced automatically; when a gap narrows
//! below `MIN_GAP` the reorder engine falls back to a full renumber.

/// Spacing used for appends and for renumbered lists
pub const POSITION_STEP: f64 = 1000.0;

/// Gap width under which fractional insertion is abandoned for a renumber
pub const MIN_GAP: f64 = 1e-9;

/// Key strictly between two neighbors.
///
/// `None` on the left means "before the first element" (sentinel 0).
/// `None` on the right means "after the last element"; a finite key is
/// still produced by extending one step past the left neighbor.
pub fn between(before: Option<f64>, after: Option<f64>) -> f64 {
    let lo = before.unwrap_or(0.0);
    let hi = after.unwrap_or(lo + POSITION_STEP);
    (lo + hi) / 2.0
}

/// True when the gap between two neighbors can no longer hold a midpoint.
///
/// Covers both the explicit threshold and outright float exhaustion, where
/// `(lo + hi) / 2` rounds onto one of the endpoints.
pub fn gap_exhausted(before: Option<f64>, after: Option<f64>) -> bool {
    let lo = before.unwrap_or(0.0);
    let hi = match after {
        Some(hi) => hi,
        // Appending always has room
        None => return false,
    };
    if hi - lo < MIN_GAP {
        return true;
    }
    let mid = (lo + hi) / 2.0;
    mid <= lo || mid >= hi
}

/// Fresh key for slot `index` in a fully renumbered list
pub fn renumbered(index: usize) -> f64 {
    (index as f64 + 1.0) * POSITION_STEP
}
