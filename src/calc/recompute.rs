//! Refresh of derived risk:reward fields when a journal entry is edited.
//!
//! Position size, risk amount and trade value never change after creation. The
//! R-multiple and potential profit are always recomputed from the merged prices
//! and the stored position size, so an edit can never leave them stale.

use crate::calc::r_multiple::calculate_r_multiple;
use crate::models::{JournalEntry, JournalUpdate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub r_multiple: Option<f64>,
    pub potential_profit: Option<f64>,
}

impl DerivedFields {
    pub const CLEARED: DerivedFields = DerivedFields {
        r_multiple: None,
        potential_profit: None,
    };
}

/// Compute the derived fields an edit implies.
///
/// Returns `None` when the edit does not touch entry, stop, target or direction;
/// the stored values are then left as they are.
pub fn recompute_derived(current: &JournalEntry, update: &JournalUpdate) -> Option<DerivedFields> {
    if !update.touches_prices() {
        return None;
    }

    let entry = update.entry_price.unwrap_or(current.entry_price);
    let stop_loss = update.stop_loss_price.unwrap_or(current.stop_loss_price);
    let target = update.target_price.unwrap_or(current.target_price);
    let direction = update.direction.unwrap_or(current.direction);
    let position_size = current.position_size;

    let (Some(stop_loss), Some(target)) = (stop_loss, target) else {
        return Some(DerivedFields::CLEARED);
    };
    if position_size <= 0.0 {
        return Some(DerivedFields::CLEARED);
    }

    let derived = calculate_r_multiple(entry, stop_loss, target, direction)
        .map(|rr| DerivedFields {
            r_multiple: Some(rr.r_multiple),
            potential_profit: Some(rr.potential_profit * position_size),
        })
        .unwrap_or(DerivedFields::CLEARED);

    Some(derived)
}
