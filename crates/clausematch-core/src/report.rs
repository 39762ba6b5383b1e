//! Matching report: per-clause outcomes, summary counts, and per-party views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resolver::{MatchStatus, ResolutionMethod, ResolvedClause};
use crate::types::{ClauseTypeId, PartySide, VariantId};

/// Each party's 1-based rank of the selected variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualRank {
    pub party_a: Option<usize>,
    pub party_b: Option<usize>,
}

impl MutualRank {
    pub fn for_party(&self, side: PartySide) -> Option<usize> {
        match side {
            PartySide::A => self.party_a,
            PartySide::B => self.party_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseOutcome {
    pub clause_type: ClauseTypeId,
    pub title: String,
    pub resolved: ResolvedClause,
    /// Catalogue text of the selected variant, for document assembly.
    pub selected_text: Option<String>,
    pub mutual_rank: MutualRank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub green: usize,
    pub red: usize,
    /// Every method is present, zero-filled.
    pub by_method: BTreeMap<ResolutionMethod, usize>,
}

impl ReportSummary {
    fn from_outcomes(clauses: &[ClauseOutcome]) -> Self {
        let mut by_method: BTreeMap<ResolutionMethod, usize> =
            ResolutionMethod::ALL.iter().map(|m| (*m, 0)).collect();
        let mut green = 0;
        for outcome in clauses {
            *by_method.entry(outcome.resolved.method).or_default() += 1;
            if outcome.resolved.match_status == MatchStatus::Green {
                green += 1;
            }
        }
        Self {
            total: clauses.len(),
            green,
            red: clauses.len() - green,
            by_method,
        }
    }

    pub fn count(&self, method: ResolutionMethod) -> usize {
        self.by_method.get(&method).copied().unwrap_or(0)
    }
}

/// Outcome of resolving a whole template, in template clause order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingReport {
    pub template: String,
    pub clauses: Vec<ClauseOutcome>,
    pub summary: ReportSummary,
}

impl MatchingReport {
    pub fn new(template: impl Into<String>, clauses: Vec<ClauseOutcome>) -> Self {
        let summary = ReportSummary::from_outcomes(&clauses);
        Self {
            template: template.into(),
            clauses,
            summary,
        }
    }

    pub fn outcome(&self, clause_type: &ClauseTypeId) -> Option<&ClauseOutcome> {
        self.clauses.iter().find(|c| &c.clause_type == clause_type)
    }

    /// Clauses still needing negotiation.
    pub fn red_clauses(&self) -> impl Iterator<Item = &ClauseOutcome> {
        self.clauses
            .iter()
            .filter(|c| c.resolved.match_status == MatchStatus::Red)
    }

    /// The agreement can only be finalized once every clause is green.
    pub fn is_finalizable(&self) -> bool {
        self.summary.red == 0
    }

    /// Project the report for one party.
    ///
    /// Only derived fields cross over: ranks of the selected variant and the
    /// alternatives. Neither party's full ranking or rejection set is included.
    pub fn party_view(&self, side: PartySide) -> PartyReport {
        PartyReport {
            template: self.template.clone(),
            party: side,
            finalizable: self.is_finalizable(),
            clauses: self
                .clauses
                .iter()
                .map(|c| PartyClauseView {
                    clause_type: c.clause_type.clone(),
                    title: c.title.clone(),
                    match_status: c.resolved.match_status,
                    method: c.resolved.method,
                    confidence: c.resolved.confidence,
                    selected_variant: c.resolved.selected_variant.clone(),
                    selected_text: c.selected_text.clone(),
                    own_rank: c.mutual_rank.for_party(side),
                    counterpart_rank: c.mutual_rank.for_party(side.counterpart()),
                    alternatives: c.resolved.alternatives.clone(),
                    reasoning: c.resolved.reasoning.clone(),
                })
                .collect(),
            summary: self.summary.clone(),
        }
    }
}

/// What one party is shown about the agreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyReport {
    pub template: String,
    pub party: PartySide,
    pub finalizable: bool,
    pub clauses: Vec<PartyClauseView>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyClauseView {
    pub clause_type: ClauseTypeId,
    pub title: String,
    pub match_status: MatchStatus,
    pub method: ResolutionMethod,
    pub confidence: u8,
    pub selected_variant: Option<VariantId>,
    pub selected_text: Option<String>,
    pub own_rank: Option<usize>,
    pub counterpart_rank: Option<usize>,
    pub alternatives: Vec<VariantId>,
    pub reasoning: String,
}
