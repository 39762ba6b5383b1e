//! Engine configuration: how unranked variants are treated and which
//! fallback variant each clause type uses for tie-breaks.
//!
//! Loaded from JSON, e.g.
//!
//! ```json
//! {
//!   "unranked_policy": "lowest_priority",
//!   "tie_break_defaults": { "confidentiality": "C2" },
//!   "catalogue_defaults": true
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::tiebreak::DefaultVariantTable;
use crate::types::{AgreementTemplate, ClauseTypeId, VariantId};

/// What a catalogue variant means when a party neither ranked nor rejected it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnrankedPolicy {
    /// Not acceptable to that party. Only explicitly ranked variants count.
    #[default]
    Absent,
    /// Accepted at lowest priority, appended after the ranked variants in
    /// catalogue order. Matches "accept unless rejected" intake forms.
    LowestPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub unranked_policy: UnrankedPolicy,
    /// Per-clause-type tie-break fallbacks. Take precedence over catalogue defaults.
    pub tie_break_defaults: BTreeMap<ClauseTypeId, VariantId>,
    /// Fall back to each catalogue's own `default_variant` when the table has no entry.
    pub catalogue_defaults: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unranked_policy: UnrankedPolicy::default(),
            tie_break_defaults: BTreeMap::new(),
            catalogue_defaults: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            defaults = config.tie_break_defaults.len(),
            policy = ?config.unranked_policy,
            "loaded engine config"
        );
        Ok(config)
    }

    /// Check every table entry names a clause type and variant the template defines.
    pub fn validate_against(&self, template: &AgreementTemplate) -> Result<(), EngineError> {
        for (clause_type, variant) in &self.tie_break_defaults {
            let catalogue = template.catalogue(clause_type).ok_or_else(|| {
                EngineError::Config(format!(
                    "tie-break default for unknown clause type `{clause_type}`"
                ))
            })?;
            if !catalogue.contains(variant) {
                return Err(EngineError::Config(format!(
                    "tie-break default `{variant}` is not a variant of clause `{clause_type}`"
                )));
            }
        }
        Ok(())
    }

    /// Build the tie-break policy this config describes.
    pub fn tie_break_policy(&self) -> DefaultVariantTable {
        let table = DefaultVariantTable::new(self.tie_break_defaults.clone());
        if self.catalogue_defaults {
            table.with_catalogue_fallback()
        } else {
            table
        }
    }
}
