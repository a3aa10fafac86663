//! Reagents applied during lab steps

use crate::identifiers::ReagentId;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A reagent lot applied to vessels by transfer events
///
/// Events reference reagents by id; provenance accumulates every reagent
/// applied along any ancestor path, deduplicated by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reagent {
    id: ReagentId,
    name: String,
    lot: String,
    expiration: Option<DateTime<Utc>>,
}

impl Reagent {
    /// Create a new reagent with a fresh id
    pub fn new(name: impl Into<String>, lot: impl Into<String>) -> Self {
        Self {
            id: ReagentId::new(),
            name: name.into(),
            lot: lot.into(),
            expiration: None,
        }
    }

    /// Set the lot expiration date
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// The reagent's stable id
    pub fn id(&self) -> ReagentId {
        self.id
    }

    /// The reagent name, e.g. "EndRepair Enzyme Mix"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The manufacturer lot
    pub fn lot(&self) -> &str {
        &self.lot
    }

    /// The lot expiration date, if tracked
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }
}
