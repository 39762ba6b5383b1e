//! Direct-match detection: both parties independently chose the same first choice.

use crate::types::{PartyPreference, VariantId};

/// Fixed confidence for a unanimous first choice. Higher than any compromise.
pub const DIRECT_MATCH_CONFIDENCE: u8 = 95;

/// Return the shared top-ranked variant if both parties put it first and
/// neither rejects it.
pub fn detect_direct_match<'a>(
    a: &'a PartyPreference,
    b: &PartyPreference,
) -> Option<&'a VariantId> {
    let top = a.top()?;
    (b.top() == Some(top) && !a.is_rejected(top) && !b.is_rejected(top)).then_some(top)
}
