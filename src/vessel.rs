//! Vessel model - the nodes of the lineage graph
//!
//! One `Vessel` type covers every physical container shape; the historical
//! tube/plate/rack subtype hierarchy collapses into a [`ContainerKind`] plus a
//! uniform position→child map that stays empty for atomic kinds. Traversal
//! never inspects the kind - edges come from transfer events alone.

use crate::errors::{LineageError, LineageResult};
use crate::identifiers::VesselId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The physical shape of a vessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ContainerKind {
    /// A single tube; atomic, no positions
    Tube,
    /// A multi-well plate
    Plate,
    /// A rack holding barcoded tubes
    Rack,
    /// A strip of joined tubes handled as one piece
    StripTube,
    /// A pooled sequencing lane; atomic, fed by many incoming transfers
    PooledLane,
}

impl ContainerKind {
    /// Whether vessels of this kind embed children at named positions
    pub fn has_positions(&self) -> bool {
        matches!(
            self,
            ContainerKind::Plate | ContainerKind::Rack | ContainerKind::StripTube
        )
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Tube => "Tube",
            ContainerKind::Plate => "Plate",
            ContainerKind::Rack => "Rack",
            ContainerKind::StripTube => "StripTube",
            ContainerKind::PooledLane => "PooledLane",
        };
        write!(f, "{name}")
    }
}

/// A position key within a multi-position vessel, e.g. "A01"
///
/// Positions are opaque strings: plates use well coordinates, racks use slot
/// coordinates, and nothing in the engine parses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    /// Create from a string
    pub fn from(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Position {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A physical lab container: tube, plate, rack, strip tube, or pooled lane
///
/// Vessels are created once, on the first message that references them, and
/// are append-only afterwards: the contained-vessel map grows, but an assigned
/// position is never reassigned.
///
/// # Examples
///
/// ```
/// use vessel_lineage::{ContainerKind, Vessel};
///
/// let rack = Vessel::new("RACK-001", ContainerKind::Rack);
/// assert_eq!(rack.label(), "RACK-001");
/// assert!(rack.is_container());
/// assert!(rack.positions().is_empty());
///
/// let lane = Vessel::new("FLOWCELL-1-LANE-3", ContainerKind::PooledLane);
/// assert!(!lane.is_container());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Vessel {
    id: VesselId,
    label: String,
    kind: ContainerKind,
    positions: BTreeMap<Position, VesselId>,
}

impl Vessel {
    /// Create a new vessel with a fresh id
    pub fn new(label: impl Into<String>, kind: ContainerKind) -> Self {
        Self::with_id(VesselId::new(), label, kind)
    }

    /// Create a vessel with a known id, e.g. when rebuilding from storage
    pub fn with_id(id: VesselId, label: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            positions: BTreeMap::new(),
        }
    }

    /// The vessel's stable id
    pub fn id(&self) -> VesselId {
        self.id
    }

    /// The vessel's unique human-facing label (barcode)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The vessel's container kind
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Whether this vessel can embed children at positions
    pub fn is_container(&self) -> bool {
        self.kind.has_positions()
    }

    /// The position→child map; empty for atomic kinds
    pub fn positions(&self) -> &BTreeMap<Position, VesselId> {
        &self.positions
    }

    /// The child vessel at a position, if one is assigned
    pub fn child_at(&self, position: &Position) -> Option<VesselId> {
        self.positions.get(position).copied()
    }

    /// Assign a child vessel to a position
    ///
    /// Rejects atomic kinds and already-assigned positions; assignments are
    /// never overwritten.
    pub(crate) fn place(&mut self, position: Position, child: VesselId) -> LineageResult<()> {
        if !self.kind.has_positions() {
            return Err(LineageError::NotAContainer {
                label: self.label.clone(),
                kind: self.kind.to_string(),
            });
        }
        if self.positions.contains_key(&position) {
            return Err(LineageError::PositionOccupied {
                label: self.label.clone(),
                position: position.to_string(),
            });
        }
        self.positions.insert(position, child);
        Ok(())
    }
}
