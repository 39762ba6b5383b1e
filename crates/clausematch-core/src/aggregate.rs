//! Agreement-level aggregation: resolve every clause type in a template.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::normalize::PreferenceNormalizer;
use crate::report::{ClauseOutcome, MatchingReport, MutualRank};
use crate::resolver::{ClauseResolver, ResolvedClause};
use crate::tiebreak::TieBreakPolicy;
use crate::types::{AgreementTemplate, ClauseCatalogue, PartySide, PartySubmissions, RawSubmission};

/// Normalizes and resolves every clause type of a template.
///
/// Cheap to clone; the concurrent fan-out hands one clone to each task.
#[derive(Clone)]
pub struct AgreementAggregator {
    normalizer: PreferenceNormalizer,
    resolver: ClauseResolver,
}

impl AgreementAggregator {
    pub fn new(normalizer: PreferenceNormalizer, tie_break: Arc<dyn TieBreakPolicy>) -> Self {
        Self {
            normalizer,
            resolver: ClauseResolver::new(tie_break),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            PreferenceNormalizer::new(config.unranked_policy),
            Arc::new(config.tie_break_policy()),
        )
    }

    /// Reject templates with repeated clause types and submissions for
    /// clause types the template does not define.
    pub fn check_inputs(
        &self,
        template: &AgreementTemplate,
        party_a: &PartySubmissions,
        party_b: &PartySubmissions,
    ) -> Result<(), EngineError> {
        let mut seen = HashSet::with_capacity(template.clauses.len());
        for catalogue in &template.clauses {
            if !seen.insert(&catalogue.clause_type) {
                return Err(EngineError::DuplicateClauseType(
                    catalogue.clause_type.clone(),
                ));
            }
        }

        for (party, submissions) in [(PartySide::A, party_a), (PartySide::B, party_b)] {
            if let Some(clause_type) = submissions
                .submissions
                .keys()
                .find(|clause_type| !seen.contains(clause_type))
            {
                return Err(EngineError::UnknownClauseType {
                    party,
                    clause_type: clause_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve one clause type.
    ///
    /// A missing submission counts as rejecting everything, so silence never
    /// selects a variant the party did not confirm.
    pub fn resolve_clause(
        &self,
        catalogue: &ClauseCatalogue,
        raw_a: Option<&RawSubmission>,
        raw_b: Option<&RawSubmission>,
    ) -> Result<ClauseOutcome, EngineError> {
        let (raw_a, raw_b) = match (raw_a, raw_b) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                // Still validate whichever side did submit.
                if let Some(a) = a {
                    self.normalizer.normalize(PartySide::A, catalogue, a)?;
                }
                if let Some(b) = b {
                    self.normalizer.normalize(PartySide::B, catalogue, b)?;
                }
                let reasoning = match (a.is_none(), b.is_none()) {
                    (true, true) => "Neither party submitted preferences for this clause",
                    (true, false) => "Party A submitted no preferences for this clause",
                    _ => "Party B submitted no preferences for this clause",
                };
                return Ok(outcome(
                    catalogue,
                    ResolvedClause::requires_negotiation(reasoning),
                    MutualRank::default(),
                ));
            }
        };

        let a = self.normalizer.normalize(PartySide::A, catalogue, raw_a)?;
        let b = self.normalizer.normalize(PartySide::B, catalogue, raw_b)?;
        let resolved = self.resolver.resolve(catalogue, &a, &b);

        let mutual_rank = match &resolved.selected_variant {
            Some(variant) => MutualRank {
                party_a: a.rank_of(variant),
                party_b: b.rank_of(variant),
            },
            None => MutualRank::default(),
        };
        Ok(outcome(catalogue, resolved, mutual_rank))
    }

    /// Resolve every clause type of the template, in template order.
    pub fn resolve(
        &self,
        template: &AgreementTemplate,
        party_a: &PartySubmissions,
        party_b: &PartySubmissions,
    ) -> Result<MatchingReport, EngineError> {
        self.check_inputs(template, party_a, party_b)?;

        let clauses = template
            .clauses
            .iter()
            .map(|catalogue| {
                self.resolve_clause(
                    catalogue,
                    party_a.get(&catalogue.clause_type),
                    party_b.get(&catalogue.clause_type),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(finish(template, clauses))
    }
}

fn outcome(catalogue: &ClauseCatalogue, resolved: ResolvedClause, mutual_rank: MutualRank) -> ClauseOutcome {
    let selected_text = resolved
        .selected_variant
        .as_ref()
        .and_then(|v| catalogue.text(v))
        .map(str::to_string);
    ClauseOutcome {
        clause_type: catalogue.clause_type.clone(),
        title: catalogue.title.clone(),
        resolved,
        selected_text,
        mutual_rank,
    }
}

pub(crate) fn finish(template: &AgreementTemplate, clauses: Vec<ClauseOutcome>) -> MatchingReport {
    let report = MatchingReport::new(template.name.clone(), clauses);
    info!(
        template = %report.template,
        clauses = report.summary.total,
        green = report.summary.green,
        red = report.summary.red,
        "agreement resolved"
    );
    report
}
