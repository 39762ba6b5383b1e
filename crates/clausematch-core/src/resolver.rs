//! Per-clause resolution state machine.
//!
//! States are tried in order and the first that applies wins:
//!
//! 1. either party has nothing acceptable → `requires_negotiation`
//! 2. shared first choice → `direct_match` (95)
//! 3. best overlap score → `ranking_compromise` (40-90)
//! 4. configured fallback → `tie_breaker` (30)
//! 5. otherwise → `requires_negotiation` (0)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::direct::{DIRECT_MATCH_CONFIDENCE, detect_direct_match};
use crate::overlap::find_compromise;
use crate::tiebreak::{TIE_BREAK_CONFIDENCE, TieBreakPolicy, resolve_tie_break};
use crate::types::{ClauseCatalogue, PartyPreference, VariantId};

/// How a clause outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    DirectMatch,
    RankingCompromise,
    TieBreaker,
    RequiresNegotiation,
}

impl ResolutionMethod {
    pub const ALL: [Self; 4] = [
        Self::DirectMatch,
        Self::RankingCompromise,
        Self::TieBreaker,
        Self::RequiresNegotiation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectMatch => "direct_match",
            Self::RankingCompromise => "ranking_compromise",
            Self::TieBreaker => "tie_breaker",
            Self::RequiresNegotiation => "requires_negotiation",
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self {
            Self::RequiresNegotiation => MatchStatus::Red,
            _ => MatchStatus::Green,
        }
    }
}

/// Green clauses are settled; red clauses block finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Green,
    Red,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// Outcome for one clause type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedClause {
    pub selected_variant: Option<VariantId>,
    pub method: ResolutionMethod,
    pub confidence: u8,
    pub reasoning: String,
    pub alternatives: Vec<VariantId>,
    pub match_status: MatchStatus,
}

impl ResolvedClause {
    fn selected(
        variant: VariantId,
        method: ResolutionMethod,
        confidence: u8,
        reasoning: String,
        alternatives: Vec<VariantId>,
    ) -> Self {
        Self {
            selected_variant: Some(variant),
            method,
            confidence,
            reasoning,
            alternatives,
            match_status: method.status(),
        }
    }

    /// A red outcome with no selection.
    pub fn requires_negotiation(reasoning: impl Into<String>) -> Self {
        Self {
            selected_variant: None,
            method: ResolutionMethod::RequiresNegotiation,
            confidence: 0,
            reasoning: reasoning.into(),
            alternatives: Vec::new(),
            match_status: MatchStatus::Red,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.match_status == MatchStatus::Green
    }
}

/// Resolves one clause type from two normalized preferences.
///
/// Pure: holds only the injected tie-break policy, so the same inputs always
/// give the same [`ResolvedClause`].
#[derive(Clone)]
pub struct ClauseResolver {
    tie_break: Arc<dyn TieBreakPolicy>,
}

impl ClauseResolver {
    pub fn new(tie_break: Arc<dyn TieBreakPolicy>) -> Self {
        Self { tie_break }
    }

    pub fn resolve(
        &self,
        catalogue: &ClauseCatalogue,
        a: &PartyPreference,
        b: &PartyPreference,
    ) -> ResolvedClause {
        let clause_type = &catalogue.clause_type;

        let resolved = match (a.rejects_all(), b.rejects_all()) {
            (true, true) => Some(ResolvedClause::requires_negotiation(
                "Both parties have no acceptable variant for this clause",
            )),
            (true, false) => Some(ResolvedClause::requires_negotiation(
                "Party A has no acceptable variant for this clause",
            )),
            (false, true) => Some(ResolvedClause::requires_negotiation(
                "Party B has no acceptable variant for this clause",
            )),
            (false, false) => None,
        };
        if let Some(resolved) = resolved {
            debug!(%clause_type, "clause rejected outright");
            return resolved;
        }

        if let Some(variant) = detect_direct_match(a, b) {
            debug!(%clause_type, %variant, "direct match");
            return ResolvedClause::selected(
                variant.clone(),
                ResolutionMethod::DirectMatch,
                DIRECT_MATCH_CONFIDENCE,
                format!("Both parties ranked `{variant}` as their first choice"),
                Vec::new(),
            );
        }

        if let Some(compromise) = find_compromise(a, b, catalogue) {
            let rank_a = a.rank_of(&compromise.selected).unwrap_or_default();
            let rank_b = b.rank_of(&compromise.selected).unwrap_or_default();
            debug!(
                %clause_type,
                variant = %compromise.selected,
                score = compromise.score,
                "ranking compromise"
            );
            return ResolvedClause::selected(
                compromise.selected.clone(),
                ResolutionMethod::RankingCompromise,
                compromise.confidence,
                format!(
                    "`{}` is the best mutually acceptable variant \
                     (Party A rank {rank_a}, Party B rank {rank_b}, score {})",
                    compromise.selected, compromise.score
                ),
                compromise.alternatives,
            );
        }

        match resolve_tie_break(self.tie_break.as_ref(), catalogue, a, b) {
            Ok(tie_break) => {
                debug!(%clause_type, variant = %tie_break.selected, "tie-break");
                ResolvedClause::selected(
                    tie_break.selected.clone(),
                    ResolutionMethod::TieBreaker,
                    TIE_BREAK_CONFIDENCE,
                    format!(
                        "No mutually acceptable variant; using configured default `{}`",
                        tie_break.selected
                    ),
                    tie_break.alternatives,
                )
            }
            Err(missing) => {
                warn!(%clause_type, reason = %missing.reason, "tie-break unavailable");
                ResolvedClause::requires_negotiation(format!(
                    "No mutually acceptable variant and {}",
                    missing.reason
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PreferenceNormalizer;
    use crate::tiebreak::{CatalogueDefault, DefaultVariantTable};
    use crate::types::{PartySide, RawSubmission};

    fn resolver() -> ClauseResolver {
        ClauseResolver::new(Arc::new(CatalogueDefault))
    }

    fn pref(
        catalogue: &ClauseCatalogue,
        party: PartySide,
        ranking: &[&str],
        rejected: &[&str],
    ) -> PartyPreference {
        let raw = RawSubmission::new(ranking.iter().copied(), rejected.iter().copied());
        PreferenceNormalizer::default()
            .normalize(party, catalogue, &raw)
            .unwrap()
    }

    fn selected(resolved: &ResolvedClause) -> Option<&str> {
        resolved.selected_variant.as_ref().map(|v| v.as_str())
    }

    #[test]
    fn shared_first_choice_is_direct_match() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2"]);
        let a = pref(&cat, PartySide::A, &["V1", "V2"], &[]);
        let b = pref(&cat, PartySide::B, &["V1", "V2"], &[]);

        let resolved = resolver().resolve(&cat, &a, &b);
        assert_eq!(resolved.method, ResolutionMethod::DirectMatch);
        assert_eq!(selected(&resolved), Some("V1"));
        assert_eq!(resolved.confidence, 95);
        assert_eq!(resolved.match_status, MatchStatus::Green);
    }

    #[test]
    fn overlapping_rankings_compromise() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2", "V3"]);
        let a = pref(&cat, PartySide::A, &["V1", "V2", "V3"], &[]);
        let b = pref(&cat, PartySide::B, &["V3", "V1", "V2"], &[]);

        let resolved = resolver().resolve(&cat, &a, &b);
        assert_eq!(resolved.method, ResolutionMethod::RankingCompromise);
        assert_eq!(selected(&resolved), Some("V1"));
        assert_eq!(resolved.confidence, 50);
        assert!(resolved.reasoning.contains("Party A rank 1"));
        assert!(resolved.reasoning.contains("Party B rank 2"));
    }

    #[test]
    fn disjoint_rankings_use_tie_break_when_default_usable() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2"]).with_default("V2");
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &["V1"]);

        let resolved = resolver().resolve(&cat, &a, &b);
        assert_eq!(resolved.method, ResolutionMethod::TieBreaker);
        assert_eq!(selected(&resolved), Some("V2"));
        assert_eq!(resolved.confidence, 30);
        assert_eq!(resolved.match_status, MatchStatus::Green);
        let alts: Vec<&str> = resolved.alternatives.iter().map(|v| v.as_str()).collect();
        assert_eq!(alts, vec!["V1"]);
    }

    #[test]
    fn disjoint_rankings_without_default_need_negotiation() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2"]);
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &["V1"]);

        let resolved = resolver().resolve(&cat, &a, &b);
        assert_eq!(resolved.method, ResolutionMethod::RequiresNegotiation);
        assert_eq!(resolved.selected_variant, None);
        assert_eq!(resolved.confidence, 0);
        assert_eq!(resolved.match_status, MatchStatus::Red);
        assert!(resolved.reasoning.contains("no default configured"));
    }

    #[test]
    fn rejected_default_needs_negotiation() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2"]).with_default("V1");
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &["V1"]);

        let resolved = resolver().resolve(&cat, &a, &b);
        assert_eq!(resolved.method, ResolutionMethod::RequiresNegotiation);
    }

    #[test]
    fn party_rejecting_everything_needs_negotiation() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2", "V3"]).with_default("V1");
        let a = pref(&cat, PartySide::A, &[], &["V1", "V2", "V3"]);
        for b_ranking in [&["V1"][..], &["V2", "V3"][..], &["V3", "V2", "V1"][..]] {
            let b = pref(&cat, PartySide::B, b_ranking, &[]);
            let resolved = resolver().resolve(&cat, &a, &b);
            assert_eq!(resolved.method, ResolutionMethod::RequiresNegotiation);
            assert_eq!(resolved.confidence, 0);
            assert!(resolved.reasoning.contains("Party A"));
        }
    }

    #[test]
    fn both_parties_rejecting_is_named() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1"]);
        let a = pref(&cat, PartySide::A, &[], &["V1"]);
        let b = pref(&cat, PartySide::B, &[], &["V1"]);
        let resolved = resolver().resolve(&cat, &a, &b);
        assert!(resolved.reasoning.starts_with("Both parties"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2", "V3", "V4"]);
        let a = pref(&cat, PartySide::A, &["V4", "V2", "V1"], &["V3"]);
        let b = pref(&cat, PartySide::B, &["V1", "V2", "V4"], &[]);
        let resolver = ClauseResolver::new(Arc::new(DefaultVariantTable::default()));

        let first = resolver.resolve(&cat, &a, &b);
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&cat, &a, &b), first);
        }
    }

    #[test]
    fn selection_is_acceptable_to_both_parties() {
        let cat = ClauseCatalogue::new("confidentiality", ["V1", "V2", "V3", "V4"]);
        let cases: &[(&[&str], &[&str], &[&str], &[&str])] = &[
            (&["V1", "V2"], &[], &["V1"], &[]),
            (&["V1", "V2", "V3"], &["V4"], &["V3", "V2"], &["V1"]),
            (&["V4", "V3"], &[], &["V3", "V4"], &[]),
            (&["V2"], &["V1"], &["V1", "V2"], &[]),
        ];
        for (ra, xa, rb, xb) in cases {
            let a = pref(&cat, PartySide::A, ra, xa);
            let b = pref(&cat, PartySide::B, rb, xb);
            let resolved = resolver().resolve(&cat, &a, &b);
            let variant = resolved.selected_variant.as_ref().unwrap();
            assert!(a.accepts(variant) && b.accepts(variant));
            assert!(!a.is_rejected(variant) && !b.is_rejected(variant));
        }
    }

    #[test]
    fn confidence_orders_methods() {
        let cat = ClauseCatalogue::new("term", ["V1", "V2", "V3"]).with_default("V3");
        let run = |ra: &[&str], xa: &[&str], rb: &[&str], xb: &[&str]| {
            let a = pref(&cat, PartySide::A, ra, xa);
            let b = pref(&cat, PartySide::B, rb, xb);
            resolver().resolve(&cat, &a, &b)
        };

        let direct = run(&["V1", "V2"], &[], &["V1"], &[]);
        let compromise = run(&["V1", "V2"], &[], &["V2", "V1"], &[]);
        let tie_break = run(&["V1"], &[], &["V2"], &[]);
        let negotiation = run(&[], &["V1", "V2", "V3"], &["V1"], &[]);

        assert_eq!(direct.method, ResolutionMethod::DirectMatch);
        assert_eq!(compromise.method, ResolutionMethod::RankingCompromise);
        assert_eq!(tie_break.method, ResolutionMethod::TieBreaker);
        assert_eq!(negotiation.method, ResolutionMethod::RequiresNegotiation);
        assert!(direct.confidence > compromise.confidence);
        assert!(compromise.confidence > tie_break.confidence);
        assert!(tie_break.confidence > negotiation.confidence);
        assert_eq!(negotiation.confidence, 0);
    }

    #[test]
    fn method_status_and_names() {
        assert_eq!(ResolutionMethod::RequiresNegotiation.status(), MatchStatus::Red);
        assert_eq!(ResolutionMethod::TieBreaker.status(), MatchStatus::Green);
        assert_eq!(ResolutionMethod::DirectMatch.as_str(), "direct_match");
        let json = serde_json::to_string(&ResolutionMethod::RankingCompromise).unwrap();
        assert_eq!(json, "\"ranking_compromise\"");
    }
}
