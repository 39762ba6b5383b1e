use thiserror::Error;

use crate::types::{ClauseTypeId, PartySide, VariantId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid preference from {party} for clause `{clause_type}`: variant `{variant}` {reason}")]
    InvalidPreference {
        clause_type: ClauseTypeId,
        party: PartySide,
        variant: String,
        reason: String,
    },

    #[error("{party} submitted preferences for unknown clause type `{clause_type}`")]
    UnknownClauseType {
        party: PartySide,
        clause_type: ClauseTypeId,
    },

    #[error("template defines clause type `{0}` more than once")]
    DuplicateClauseType(ClauseTypeId),

    #[error("invalid engine config: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clause resolution task failed: {0}")]
    Task(String),
}

/// A tie-break was needed but the policy had no usable fallback.
///
/// The resolver downgrades this to `requires_negotiation`; it never reaches callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no usable tie-break default for clause `{clause_type}`: {reason}")]
pub struct MissingDefault {
    pub clause_type: ClauseTypeId,
    pub reason: String,
}

impl MissingDefault {
    pub(crate) fn new(clause_type: &ClauseTypeId, reason: impl Into<String>) -> Self {
        Self {
            clause_type: clause_type.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(clause_type: &ClauseTypeId, variant: &VariantId, by: PartySide) -> Self {
        Self::new(clause_type, format!("default `{variant}` is rejected by {by}"))
    }
}
