//! Transfer events - the edges of the lineage graph
//!
//! Events are immutable facts about lab work already performed. They are the
//! sole source of graph edges: no edge exists without a recorded event, and an
//! event is never updated or deleted once recorded.

use crate::identifiers::{EventId, EventTypeName, ReagentId, VesselId};
use crate::vessel::Position;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One side of a section transfer: a vessel and, when it has one, a position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransferEndpoint {
    /// The vessel material moved from or to
    pub vessel: VesselId,
    /// The position within that vessel, absent for atomic vessels
    pub position: Option<Position>,
}

impl TransferEndpoint {
    /// An endpoint on an atomic vessel
    pub fn vessel(vessel: VesselId) -> Self {
        Self {
            vessel,
            position: None,
        }
    }

    /// An endpoint at a named position within a vessel
    pub fn at(vessel: VesselId, position: impl Into<Position>) -> Self {
        Self {
            vessel,
            position: Some(position.into()),
        }
    }
}

/// What an event did to containment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TransferKind {
    /// Material moved between distinct vessels - a cross-container edge
    ///
    /// Pooling records several sources feeding one target; plate stamps record
    /// many positions on each side. Either way this is one event, one edge.
    Section {
        /// Where material came from; one or more endpoints
        sources: Vec<TransferEndpoint>,
        /// Where material went; one or more endpoints
        targets: Vec<TransferEndpoint>,
    },
    /// Processing applied to one vessel without changing containment
    ///
    /// Self-edges carry history (and reagents) only; traversal never moves
    /// through them.
    InPlace {
        /// The vessel the processing was recorded against
        vessel: VesselId,
    },
}

/// An immutable record of one lab step
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use vessel_lineage::{TransferEndpoint, TransferEvent, VesselId};
///
/// let tube = VesselId::new();
/// let lane = VesselId::new();
///
/// let pooling = TransferEvent::section(
///     "PoolingTransfer",
///     Utc::now(),
///     "qa-robot-2",
///     vec![TransferEndpoint::vessel(tube)],
///     vec![TransferEndpoint::vessel(lane)],
/// );
/// assert!(!pooling.is_in_place());
/// assert_eq!(pooling.event_type().as_str(), "PoolingTransfer");
///
/// let end_repair = TransferEvent::in_place("EndRepair", Utc::now(), "qa-robot-2", tube);
/// assert_eq!(end_repair.in_place_vessel(), Some(tube));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransferEvent {
    id: EventId,
    event_type: EventTypeName,
    timestamp: DateTime<Utc>,
    operator: String,
    kind: TransferKind,
    reagents: Vec<ReagentId>,
}

impl TransferEvent {
    /// Record a cross-container transfer between vessels
    pub fn section(
        event_type: impl Into<EventTypeName>,
        timestamp: DateTime<Utc>,
        operator: impl Into<String>,
        sources: Vec<TransferEndpoint>,
        targets: Vec<TransferEndpoint>,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            timestamp,
            operator: operator.into(),
            kind: TransferKind::Section { sources, targets },
            reagents: Vec::new(),
        }
    }

    /// Record in-place processing against a single vessel
    pub fn in_place(
        event_type: impl Into<EventTypeName>,
        timestamp: DateTime<Utc>,
        operator: impl Into<String>,
        vessel: VesselId,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            timestamp,
            operator: operator.into(),
            kind: TransferKind::InPlace { vessel },
            reagents: Vec::new(),
        }
    }

    /// Attach the reagents this event applied
    pub fn with_reagents(mut self, reagents: Vec<ReagentId>) -> Self {
        self.reagents = reagents;
        self
    }

    /// The event's stable id
    pub fn id(&self) -> EventId {
        self.id
    }

    /// The business name of the lab step, e.g. "ShearingTransfer"
    pub fn event_type(&self) -> &EventTypeName {
        &self.event_type
    }

    /// When the step was performed
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Who or what performed the step
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The containment effect of the event
    pub fn kind(&self) -> &TransferKind {
        &self.kind
    }

    /// Reagents applied by this event
    pub fn reagents(&self) -> &[ReagentId] {
        &self.reagents
    }

    /// Whether this is a self-edge recorded against one vessel
    pub fn is_in_place(&self) -> bool {
        matches!(self.kind, TransferKind::InPlace { .. })
    }

    /// Source endpoints; empty for in-place events
    pub fn sources(&self) -> &[TransferEndpoint] {
        match &self.kind {
            TransferKind::Section { sources, .. } => sources,
            TransferKind::InPlace { .. } => &[],
        }
    }

    /// Target endpoints; empty for in-place events
    pub fn targets(&self) -> &[TransferEndpoint] {
        match &self.kind {
            TransferKind::Section { targets, .. } => targets,
            TransferKind::InPlace { .. } => &[],
        }
    }

    /// The vessel an in-place event was recorded against
    pub fn in_place_vessel(&self) -> Option<VesselId> {
        match &self.kind {
            TransferKind::InPlace { vessel } => Some(*vessel),
            TransferKind::Section { .. } => None,
        }
    }

    /// Every vessel this event references, sources before targets
    pub fn vessels(&self) -> impl Iterator<Item = VesselId> + '_ {
        self.sources()
            .iter()
            .chain(self.targets().iter())
            .map(|endpoint| endpoint.vessel)
            .chain(self.in_place_vessel())
    }

    /// Whether the vessel is recorded on this event in any role
    pub fn touches(&self, vessel: VesselId) -> bool {
        self.vessels().any(|v| v == vessel)
    }
}
