//! Identifier types for vessels, events, and lookup data
//!
//! Everything the engine walks is addressed by a stable id rather than by
//! reference, so a visited set survives graph snapshots and criteria can hand
//! results across the walk boundary without borrowing into the arena.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Vessel ID - stable identity of one physical container
///
/// Vessels also carry a unique human-facing label (the barcode); the id is
/// what adjacency indexes and traversal state key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct VesselId(Uuid);

impl VesselId {
    /// Create a new random vessel ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VesselId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<VesselId> for Uuid {
    fn from(id: VesselId) -> Self {
        id.0
    }
}

impl From<&VesselId> for Uuid {
    fn from(id: &VesselId) -> Self {
        id.0
    }
}

/// Event ID - stable identity of one recorded transfer event
///
/// The walker's visited set is keyed by event id, not vessel id: the same
/// vessel may legitimately be reached again through a different edge, but no
/// edge is ever processed twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EventId(Uuid);

impl EventId {
    /// Create a new random event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl From<&EventId> for Uuid {
    fn from(id: &EventId) -> Self {
        id.0
    }
}

/// Batch ID - identity of a lab batch vessels are grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Create a new random batch ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bucket entry ID - identity of one queued-into-bucket record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BucketEntryId(Uuid);

impl BucketEntryId {
    /// Create a new random bucket entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BucketEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BucketEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reagent ID - identity of a reagent applied by a transfer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ReagentId(Uuid);

impl ReagentId {
    /// Create a new random reagent ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReagentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReagentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event type name - the business name of a lab step, e.g. "ShearingTransfer"
///
/// Event types are configuration, not entities: workflow tables key their
/// transitions on these names and the validator matches recorded history
/// against them by exact string identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EventTypeName(String);

impl EventTypeName {
    /// Create from a string
    pub fn from(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventTypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EventTypeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// State ID - identifies a state within a workflow
///
/// States are not entities - they're local identifiers within one workflow's
/// declarative table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Create from a string
    pub fn from(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
