//! Identifiers, catalogues, and party submissions shared by every resolution stage.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for one clause-text option within a clause type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VariantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier for a negotiable section of the template (e.g. `confidentiality`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClauseTypeId(String);

impl ClauseTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClauseTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClauseTypeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which side of the agreement a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartySide {
    A,
    B,
}

impl PartySide {
    pub fn counterpart(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "Party A",
            Self::B => "Party B",
        }
    }
}

impl fmt::Display for PartySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete text option offered for a clause type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub text: String,
}

/// All defined variants for one clause type, in catalogue order.
///
/// Owned by the template. The engine only reads it; catalogue order is the
/// final tie-break key wherever two variants are otherwise indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseCatalogue {
    pub clause_type: ClauseTypeId,
    #[serde(default)]
    pub title: String,
    pub variants: Vec<Variant>,
    /// Fallback variant supplied by the catalogue owner for tie-breaks.
    #[serde(default)]
    pub default_variant: Option<VariantId>,
}

impl ClauseCatalogue {
    /// Build a catalogue whose variant texts are left empty.
    pub fn new<I, V>(clause_type: impl Into<String>, variant_ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            clause_type: ClauseTypeId::new(clause_type),
            title: String::new(),
            variants: variant_ids
                .into_iter()
                .map(|id| Variant {
                    id: VariantId::new(id),
                    text: String::new(),
                })
                .collect(),
            default_variant: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_default(mut self, variant: impl Into<String>) -> Self {
        self.default_variant = Some(VariantId::new(variant));
        self
    }

    pub fn contains(&self, id: &VariantId) -> bool {
        self.variants.iter().any(|v| &v.id == id)
    }

    /// 0-based catalogue position of a variant.
    pub fn position(&self, id: &VariantId) -> Option<usize> {
        self.variants.iter().position(|v| &v.id == id)
    }

    pub fn text(&self, id: &VariantId) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| &v.id == id)
            .map(|v| v.text.as_str())
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = &VariantId> {
        self.variants.iter().map(|v| &v.id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// A document template: the ordered list of clause catalogues both parties rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementTemplate {
    pub name: String,
    pub clauses: Vec<ClauseCatalogue>,
}

impl AgreementTemplate {
    pub fn new(name: impl Into<String>, clauses: Vec<ClauseCatalogue>) -> Self {
        Self {
            name: name.into(),
            clauses,
        }
    }

    pub fn catalogue(&self, clause_type: &ClauseTypeId) -> Option<&ClauseCatalogue> {
        self.clauses.iter().find(|c| &c.clause_type == clause_type)
    }

    pub fn contains(&self, clause_type: &ClauseTypeId) -> bool {
        self.catalogue(clause_type).is_some()
    }
}

/// One party's unvalidated intake for one clause type.
///
/// Ids are plain strings here; they only become [`VariantId`]s once the
/// normalizer has checked them against the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub ranking: Vec<String>,
    #[serde(default)]
    pub rejected: Vec<String>,
}

impl RawSubmission {
    pub fn new<R, X>(ranking: R, rejected: X) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        X: IntoIterator,
        X::Item: Into<String>,
    {
        Self {
            ranking: ranking.into_iter().map(Into::into).collect(),
            rejected: rejected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ranked<R>(ranking: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::new(ranking, Vec::<String>::new())
    }
}

/// Everything one party submitted for a template, keyed by clause type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySubmissions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub submissions: BTreeMap<ClauseTypeId, RawSubmission>,
}

impl PartySubmissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, clause_type: impl Into<String>, submission: RawSubmission) -> Self {
        self.submissions
            .insert(ClauseTypeId::new(clause_type), submission);
        self
    }

    pub fn get(&self, clause_type: &ClauseTypeId) -> Option<&RawSubmission> {
        self.submissions.get(clause_type)
    }
}

/// A full resolution request: the template plus both parties' submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementInput {
    pub template: AgreementTemplate,
    #[serde(default)]
    pub party_a: PartySubmissions,
    #[serde(default)]
    pub party_b: PartySubmissions,
}

impl AgreementInput {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// A validated, normalized preference for one party and one clause type.
///
/// Only [`PreferenceNormalizer`](crate::PreferenceNormalizer) builds these, so
/// every id is a catalogue member, `ranking` has no duplicates, and no ranked
/// id is also rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartyPreference {
    ranking: Vec<VariantId>,
    rejected: BTreeSet<VariantId>,
}

impl PartyPreference {
    pub(crate) fn from_parts(ranking: Vec<VariantId>, rejected: BTreeSet<VariantId>) -> Self {
        Self { ranking, rejected }
    }

    pub fn ranking(&self) -> &[VariantId] {
        &self.ranking
    }

    pub fn rejected(&self) -> &BTreeSet<VariantId> {
        &self.rejected
    }

    /// Most-preferred acceptable variant.
    pub fn top(&self) -> Option<&VariantId> {
        self.ranking.first()
    }

    /// 0-based position in the ranking.
    pub fn index_of(&self, id: &VariantId) -> Option<usize> {
        self.ranking.iter().position(|v| v == id)
    }

    /// 1-based rank, as shown to users.
    pub fn rank_of(&self, id: &VariantId) -> Option<usize> {
        self.index_of(id).map(|i| i + 1)
    }

    pub fn accepts(&self, id: &VariantId) -> bool {
        self.ranking.contains(id)
    }

    pub fn is_rejected(&self, id: &VariantId) -> bool {
        self.rejected.contains(id)
    }

    /// True when nothing is left to rank.
    pub fn rejects_all(&self) -> bool {
        self.ranking.is_empty()
    }

    /// Convert back into intake shape, e.g. to re-normalize.
    pub fn to_submission(&self) -> RawSubmission {
        RawSubmission::new(
            self.ranking.iter().map(|v| v.as_str().to_string()),
            self.rejected.iter().map(|v| v.as_str().to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_position_follows_declaration_order() {
        let cat = ClauseCatalogue::new("confidentiality", ["V2", "V1", "V3"]);
        assert_eq!(cat.position(&"V2".into()), Some(0));
        assert_eq!(cat.position(&"V3".into()), Some(2));
        assert_eq!(cat.position(&"V9".into()), None);
        assert!(cat.contains(&"V1".into()));
        assert_eq!(cat.len(), 3);
    }

    #[test]
    fn party_side_counterpart() {
        assert_eq!(PartySide::A.counterpart(), PartySide::B);
        assert_eq!(PartySide::B.counterpart(), PartySide::A);
        assert_eq!(PartySide::A.to_string(), "Party A");
    }

    #[test]
    fn agreement_input_parses_with_missing_parties() {
        let json = r#"{
            "template": {
                "name": "Mutual NDA",
                "clauses": [
                    {
                        "clause_type": "term",
                        "title": "Term",
                        "variants": [
                            {"id": "T1", "text": "Two years"},
                            {"id": "T2", "text": "Five years"}
                        ],
                        "default_variant": "T1"
                    }
                ]
            },
            "party_a": {
                "name": "Acme Ltd",
                "submissions": {"term": {"ranking": ["T2", "T1"]}}
            }
        }"#;
        let input = AgreementInput::from_json_str(json).unwrap();
        assert_eq!(input.template.clauses.len(), 1);
        let term = ClauseTypeId::from("term");
        assert_eq!(
            input.template.catalogue(&term).unwrap().default_variant,
            Some(VariantId::from("T1"))
        );
        assert_eq!(input.party_a.name.as_deref(), Some("Acme Ltd"));
        assert!(input.party_a.get(&term).unwrap().rejected.is_empty());
        assert!(input.party_b.submissions.is_empty());
    }

    #[test]
    fn variant_id_serializes_transparently() {
        let json = serde_json::to_string(&VariantId::from("V1")).unwrap();
        assert_eq!(json, "\"V1\"");
    }
}
