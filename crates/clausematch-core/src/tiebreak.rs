//! Deterministic fallback when the parties share no acceptable variant.
//!
//! The engine does not decide which variant is "most commonly accepted"; the
//! catalogue owner supplies that through a [`TieBreakPolicy`].

use std::collections::BTreeMap;

use crate::error::MissingDefault;
use crate::overlap::MAX_ALTERNATIVES;
use crate::types::{ClauseCatalogue, ClauseTypeId, PartyPreference, PartySide, VariantId};

/// Fixed confidence for a tie-break selection.
pub const TIE_BREAK_CONFIDENCE: u8 = 30;

/// Supplies the fallback variant for a clause type.
pub trait TieBreakPolicy: Send + Sync {
    fn default_for(&self, catalogue: &ClauseCatalogue) -> Option<VariantId>;
}

/// Uses the catalogue's own `default_variant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogueDefault;

impl TieBreakPolicy for CatalogueDefault {
    fn default_for(&self, catalogue: &ClauseCatalogue) -> Option<VariantId> {
        catalogue.default_variant.clone()
    }
}

/// Configured per-clause-type defaults, optionally backed by catalogue defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultVariantTable {
    defaults: BTreeMap<ClauseTypeId, VariantId>,
    catalogue_fallback: bool,
}

impl DefaultVariantTable {
    pub fn new(defaults: BTreeMap<ClauseTypeId, VariantId>) -> Self {
        Self {
            defaults,
            catalogue_fallback: false,
        }
    }

    pub fn with_catalogue_fallback(mut self) -> Self {
        self.catalogue_fallback = true;
        self
    }

    pub fn insert(&mut self, clause_type: impl Into<String>, variant: impl Into<String>) {
        self.defaults.insert(
            ClauseTypeId::new(clause_type),
            VariantId::new(variant),
        );
    }

    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

impl TieBreakPolicy for DefaultVariantTable {
    fn default_for(&self, catalogue: &ClauseCatalogue) -> Option<VariantId> {
        self.defaults
            .get(&catalogue.clause_type)
            .cloned()
            .or_else(|| {
                self.catalogue_fallback
                    .then(|| catalogue.default_variant.clone())
                    .flatten()
            })
    }
}

/// A tie-break selection and the variants either party could live with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreak {
    pub selected: VariantId,
    pub alternatives: Vec<VariantId>,
}

/// Pick the policy's fallback for this clause.
///
/// The fallback must exist, be a catalogue member, and be rejected by
/// neither party; otherwise the clause goes to negotiation.
pub fn resolve_tie_break(
    policy: &dyn TieBreakPolicy,
    catalogue: &ClauseCatalogue,
    a: &PartyPreference,
    b: &PartyPreference,
) -> Result<TieBreak, MissingDefault> {
    let clause_type = &catalogue.clause_type;
    let selected = policy
        .default_for(catalogue)
        .ok_or_else(|| MissingDefault::new(clause_type, "no default configured"))?;

    if !catalogue.contains(&selected) {
        return Err(MissingDefault::new(
            clause_type,
            format!("default `{selected}` is not in the clause catalogue"),
        ));
    }
    if a.is_rejected(&selected) {
        return Err(MissingDefault::rejected(clause_type, &selected, PartySide::A));
    }
    if b.is_rejected(&selected) {
        return Err(MissingDefault::rejected(clause_type, &selected, PartySide::B));
    }

    let alternatives = catalogue
        .variant_ids()
        .filter(|v| **v != selected && (a.accepts(v) || b.accepts(v)))
        .take(MAX_ALTERNATIVES)
        .cloned()
        .collect();

    Ok(TieBreak {
        selected,
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PreferenceNormalizer;
    use crate::types::RawSubmission;

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

    #[test]
    fn catalogue_default_is_selected() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2", "V3"]).with_default("V2");
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V3"], &["V1"]);

        let tb = resolve_tie_break(&CatalogueDefault, &cat, &a, &b).unwrap();
        assert_eq!(tb.selected.as_str(), "V2");
        let alts: Vec<&str> = tb.alternatives.iter().map(|v| v.as_str()).collect();
        assert_eq!(alts, vec!["V1", "V3"]);
    }

    #[test]
    fn missing_default_is_reported() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2"]);
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &[]);

        let err = resolve_tie_break(&CatalogueDefault, &cat, &a, &b).unwrap_err();
        assert_eq!(err.clause_type.as_str(), "termination");
        assert!(err.reason.contains("no default"));
    }

    #[test]
    fn rejected_default_is_not_selected() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2"]).with_default("V1");
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &["V1"]);

        let err = resolve_tie_break(&CatalogueDefault, &cat, &a, &b).unwrap_err();
        assert!(err.reason.contains("Party B"));
    }

    #[test]
    fn default_outside_catalogue_is_not_selected() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2"]);
        let mut table = DefaultVariantTable::default();
        table.insert("termination", "V7");
        let a = pref(&cat, PartySide::A, &["V1"], &[]);
        let b = pref(&cat, PartySide::B, &["V2"], &[]);

        let err = resolve_tie_break(&table, &cat, &a, &b).unwrap_err();
        assert!(err.reason.contains("V7"));
    }

    #[test]
    fn table_overrides_catalogue_default() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2", "V3"]).with_default("V1");
        let mut table = DefaultVariantTable::default().with_catalogue_fallback();
        assert_eq!(table.default_for(&cat), Some(VariantId::from("V1")));

        table.insert("termination", "V3");
        assert_eq!(table.default_for(&cat), Some(VariantId::from("V3")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_without_fallback_ignores_catalogue_default() {
        let cat = ClauseCatalogue::new("termination", ["V1"]).with_default("V1");
        assert_eq!(DefaultVariantTable::default().default_for(&cat), None);
    }

    #[test]
    fn alternatives_are_capped() {
        let cat = ClauseCatalogue::new("termination", ["V1", "V2", "V3", "V4", "V5", "V6"])
            .with_default("V6");
        let a = pref(&cat, PartySide::A, &["V1", "V2"], &[]);
        let b = pref(&cat, PartySide::B, &["V3", "V4"], &[]);

        let tb = resolve_tie_break(&CatalogueDefault, &cat, &a, &b).unwrap();
        assert_eq!(tb.alternatives.len(), MAX_ALTERNATIVES);
        let alts: Vec<&str> = tb.alternatives.iter().map(|v| v.as_str()).collect();
        assert_eq!(alts, vec!["V1", "V2", "V3"]);
    }
}
