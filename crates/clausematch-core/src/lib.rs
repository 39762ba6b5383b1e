//! Clause preference resolution: turns two parties' ranked, possibly-rejected
//! clause preferences into one deterministic outcome per clause type.

pub mod aggregate;
pub mod config;
pub mod direct;
mod error;
pub mod fanout;
pub mod normalize;
pub mod overlap;
pub mod report;
pub mod resolver;
pub mod tiebreak;
pub mod types;

pub use aggregate::AgreementAggregator;
pub use config::{EngineConfig, UnrankedPolicy};
pub use error::{EngineError, MissingDefault};
pub use fanout::resolve_agreement_concurrent;
pub use normalize::PreferenceNormalizer;
pub use report::{ClauseOutcome, MatchingReport, MutualRank, PartyClauseView, PartyReport, ReportSummary};
pub use resolver::{ClauseResolver, MatchStatus, ResolutionMethod, ResolvedClause};
pub use tiebreak::{CatalogueDefault, DefaultVariantTable, TieBreakPolicy};
pub use types::{
    AgreementInput, AgreementTemplate, ClauseCatalogue, ClauseTypeId, PartyPreference, PartySide,
    PartySubmissions, RawSubmission, Variant, VariantId,
};
