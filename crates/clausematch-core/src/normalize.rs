//! Validation and normalisation of one party's raw submission.
//!
//! This is the only boundary where untrusted ids enter the engine: every
//! ranked or rejected id must be a catalogue member, and the output ranking
//! is duplicate-free and disjoint from the rejection set.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::config::UnrankedPolicy;
use crate::error::EngineError;
use crate::types::{ClauseCatalogue, PartyPreference, PartySide, RawSubmission, VariantId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferenceNormalizer {
    policy: UnrankedPolicy,
}

impl PreferenceNormalizer {
    pub fn new(policy: UnrankedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnrankedPolicy {
        self.policy
    }

    /// Normalize one party's submission for one clause type.
    ///
    /// 1. Reject any id that is not in the catalogue.
    /// 2. Collapse the reject list into a set.
    /// 3. Keep the first occurrence of each ranked id, skipping rejected ones.
    /// 4. Under [`UnrankedPolicy::LowestPriority`], append every remaining
    ///    unrejected catalogue variant in catalogue order.
    pub fn normalize(
        &self,
        party: PartySide,
        catalogue: &ClauseCatalogue,
        raw: &RawSubmission,
    ) -> Result<PartyPreference, EngineError> {
        let rejected: BTreeSet<VariantId> = raw
            .rejected
            .iter()
            .map(|id| checked_id(party, catalogue, id))
            .collect::<Result<_, _>>()?;

        let mut seen = HashSet::with_capacity(raw.ranking.len());
        let mut ranking = Vec::with_capacity(raw.ranking.len());
        for id in &raw.ranking {
            let id = checked_id(party, catalogue, id)?;
            if rejected.contains(&id) || !seen.insert(id.clone()) {
                continue;
            }
            ranking.push(id);
        }

        if self.policy == UnrankedPolicy::LowestPriority {
            for id in catalogue.variant_ids() {
                if !rejected.contains(id) && !seen.contains(id) {
                    ranking.push(id.clone());
                }
            }
        }

        debug!(
            clause_type = %catalogue.clause_type,
            party = %party,
            ranked = ranking.len(),
            rejected = rejected.len(),
            "normalized preference"
        );

        Ok(PartyPreference::from_parts(ranking, rejected))
    }
}

fn checked_id(
    party: PartySide,
    catalogue: &ClauseCatalogue,
    id: &str,
) -> Result<VariantId, EngineError> {
    let id = VariantId::new(id);
    if catalogue.contains(&id) {
        Ok(id)
    } else {
        Err(EngineError::InvalidPreference {
            clause_type: catalogue.clause_type.clone(),
            party,
            variant: id.as_str().to_string(),
            reason: "is not in the clause catalogue".to_string(),
        })
    }
}
