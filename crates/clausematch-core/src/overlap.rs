//! Rank-weighted overlap scoring.
//!
//! Every variant that both parties rank (and neither rejects) gets
//!
//! ```text
//! score(v) = (len(ranking_A) - indexA(v)) + (len(ranking_B) - indexB(v))
//! ```
//!
//! with 0-based indices, so a variant near the top of both lists scores
//! highest. The best candidate wins; ties go to the smaller index sum, then
//! to catalogue order. Since the score is `len_a + len_b - index sum`, equal
//! scores always have equal index sums, so catalogue order is the tie-break
//! that actually decides.

use std::cmp::Reverse;

use crate::types::{ClauseCatalogue, PartyPreference, VariantId};

/// Upper bound on compromise confidence. Kept below the direct-match constant.
pub const COMPROMISE_CONFIDENCE_CAP: u8 = 90;
/// Lower bound on compromise confidence. Kept above the tie-break constant.
pub const COMPROMISE_CONFIDENCE_FLOOR: u8 = 40;
/// Confidence points per score point.
const SCORE_WEIGHT: usize = 10;
/// Fallback options reported alongside a selection.
pub const MAX_ALTERNATIVES: usize = 3;

/// A mutually acceptable variant with its overlap score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub variant: VariantId,
    pub score: usize,
    pub index_a: usize,
    pub index_b: usize,
}

impl Candidate {
    pub fn index_sum(&self) -> usize {
        self.index_a + self.index_b
    }
}

/// The winning candidate plus the fallbacks negotiators can use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compromise {
    pub selected: VariantId,
    pub score: usize,
    pub confidence: u8,
    pub alternatives: Vec<VariantId>,
}

/// Score every mutually acceptable variant, in party A's rank order.
pub fn score_candidates(a: &PartyPreference, b: &PartyPreference) -> Vec<Candidate> {
    let len_a = a.ranking().len();
    let len_b = b.ranking().len();

    a.ranking()
        .iter()
        .enumerate()
        .filter(|(_, v)| !a.is_rejected(v) && !b.is_rejected(v))
        .filter_map(|(index_a, v)| {
            let index_b = b.index_of(v)?;
            Some(Candidate {
                variant: v.clone(),
                score: (len_a - index_a) + (len_b - index_b),
                index_a,
                index_b,
            })
        })
        .collect()
}

/// Map an overlap score onto the 0-100 confidence scale.
///
/// `score * 10` capped at 90. The floor of 40 keeps every compromise above
/// the tie-break confidence, so a score of 2 maps to 40 rather than 20.
pub fn compromise_confidence(score: usize) -> u8 {
    score.saturating_mul(SCORE_WEIGHT).clamp(
        COMPROMISE_CONFIDENCE_FLOOR as usize,
        COMPROMISE_CONFIDENCE_CAP as usize,
    ) as u8
}

/// Find the best mutually acceptable variant, or `None` when the parties
/// share nothing acceptable.
pub fn find_compromise(
    a: &PartyPreference,
    b: &PartyPreference,
    catalogue: &ClauseCatalogue,
) -> Option<Compromise> {
    let candidates = score_candidates(a, b);
    let best = candidates.iter().min_by_key(|c| {
        (
            Reverse(c.score),
            c.index_sum(),
            catalogue.position(&c.variant).unwrap_or(usize::MAX),
        )
    })?;

    let alternatives = candidates
        .iter()
        .filter(|c| c.variant != best.variant)
        .take(MAX_ALTERNATIVES)
        .map(|c| c.variant.clone())
        .collect();

    Some(Compromise {
        selected: best.variant.clone(),
        score: best.score,
        confidence: compromise_confidence(best.score),
        alternatives,
    })
}
