//! Concurrent per-clause resolution.
//!
//! Clause types are independent, so each one runs in its own tokio task over
//! shared immutable inputs. Outcomes are put back in template order only after
//! every task has finished, so the report equals the sequential one.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use crate::aggregate::{AgreementAggregator, finish};
use crate::error::EngineError;
use crate::report::{ClauseOutcome, MatchingReport};
use crate::types::{AgreementTemplate, PartySubmissions};

/// Resolve every clause type of the template with one task per clause type.
pub async fn resolve_agreement_concurrent(
    aggregator: &AgreementAggregator,
    template: Arc<AgreementTemplate>,
    party_a: Arc<PartySubmissions>,
    party_b: Arc<PartySubmissions>,
) -> Result<MatchingReport, EngineError> {
    aggregator.check_inputs(&template, &party_a, &party_b)?;

    let count = template.clauses.len();
    let mut tasks = JoinSet::new();
    for index in 0..count {
        let aggregator = aggregator.clone();
        let template = Arc::clone(&template);
        let party_a = Arc::clone(&party_a);
        let party_b = Arc::clone(&party_b);
        tasks.spawn(async move {
            let catalogue = &template.clauses[index];
            let outcome = aggregator.resolve_clause(
                catalogue,
                party_a.get(&catalogue.clause_type),
                party_b.get(&catalogue.clause_type),
            );
            (index, outcome)
        });
    }
    debug!(tasks = count, "spawned clause resolution tasks");

    // Drain every task before looking at results: the first failure in
    // template order wins, never the first to finish.
    let mut slots: Vec<Option<Result<ClauseOutcome, EngineError>>> =
        std::iter::repeat_with(|| None).take(count).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| EngineError::Task(e.to_string()))?;
        slots[index] = Some(outcome);
    }

    let clauses = slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(EngineError::Task(
                    "a clause resolution task did not report".into(),
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(finish(&template, clauses))
}
