// Copyright 2025 the vessel-lineage authors.

//! Error types for the lineage engine
//!
//! Only data-integrity problems surface here: a transfer event pointing at a
//! vessel the graph does not hold, an append that would rewrite history, a
//! workflow table that references states or predecessors it never declares.
//! Business-rule findings (out-of-order events, duplicate applications) are
//! reported as plain strings by the validator and are never errors, and a
//! traversal that finds nothing returns an empty result, not an error.

use crate::identifiers::{BatchId, EventId, EventTypeName, ReagentId, StateId, VesselId};
use thiserror::Error;

/// Errors raised by graph recording, traversal, and workflow loading
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineageError {
    /// A vessel id was referenced that the graph does not contain
    #[error("Vessel not found: {id}")]
    VesselNotFound {
        /// The missing vessel id
        id: VesselId,
    },

    /// A transfer event id was referenced that the graph does not contain
    #[error("Transfer event not found: {id}")]
    EventNotFound {
        /// The missing event id
        id: EventId,
    },

    /// A batch id was referenced that the graph does not contain
    #[error("Batch not found: {id}")]
    BatchNotFound {
        /// The missing batch id
        id: BatchId,
    },

    /// A reagent id was referenced that the graph does not contain
    #[error("Reagent not found: {id}")]
    ReagentNotFound {
        /// The missing reagent id
        id: ReagentId,
    },

    /// A transfer event names a source or target vessel the graph does not hold
    #[error("Transfer event {event} references missing vessel {vessel}")]
    MissingVesselReference {
        /// The event carrying the dangling reference
        event: EventId,
        /// The vessel id that failed to resolve
        vessel: VesselId,
    },

    /// A vessel with this id was already recorded
    #[error("Vessel {id} is already recorded")]
    DuplicateVessel {
        /// The already-present vessel id
        id: VesselId,
    },

    /// A vessel with this label was already recorded under a different id
    #[error("Vessel label '{label}' is already in use")]
    DuplicateLabel {
        /// The contested label
        label: String,
    },

    /// A transfer event with this id was already recorded
    #[error("Transfer event {id} is already recorded")]
    DuplicateEvent {
        /// The already-present event id
        id: EventId,
    },

    /// A contained-vessel position was already assigned; positions are never reassigned
    #[error("Position {position} on vessel '{label}' is already assigned")]
    PositionOccupied {
        /// Label of the containing vessel
        label: String,
        /// The contested position key
        position: String,
    },

    /// An atomic vessel kind cannot contain positioned children
    #[error("Vessel '{label}' of kind {kind} cannot contain positions")]
    NotAContainer {
        /// Label of the vessel
        label: String,
        /// The vessel's container kind
        kind: String,
    },

    /// A workflow definition declares no states
    #[error("Workflow '{workflow}' defines no states")]
    EmptyWorkflow {
        /// The workflow name
        workflow: String,
    },

    /// A workflow definition declares the same state twice
    #[error("Workflow '{workflow}' declares state {state} more than once")]
    DuplicateState {
        /// The workflow name
        workflow: String,
        /// The repeated state id
        state: StateId,
    },

    /// A workflow transition references a state the definition does not declare
    #[error("Workflow '{workflow}' references unknown state {state}")]
    UnknownState {
        /// The workflow name
        workflow: String,
        /// The unresolved state id
        state: StateId,
    },

    /// A predecessor event-type name matches no transition in the workflow
    #[error("Workflow '{workflow}' lists predecessor '{event_type}' with no registered transition")]
    UnknownPredecessor {
        /// The workflow name
        workflow: String,
        /// The unresolved predecessor name
        event_type: EventTypeName,
    },

    /// A workflow or provenance document failed to parse
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias using LineageError
pub type LineageResult<T> = Result<T, LineageError>;

impl From<serde_json::Error> for LineageError {
    fn from(err: serde_json::Error) -> Self {
        LineageError::SerializationError(err.to_string())
    }
}

impl LineageError {
    /// Check if this error is a simple lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LineageError::VesselNotFound { .. }
                | LineageError::EventNotFound { .. }
                | LineageError::BatchNotFound { .. }
                | LineageError::ReagentNotFound { .. }
        )
    }

    /// Check if this error reports a violated append-only or reference invariant
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            LineageError::MissingVesselReference { .. }
                | LineageError::DuplicateVessel { .. }
                | LineageError::DuplicateLabel { .. }
                | LineageError::DuplicateEvent { .. }
                | LineageError::PositionOccupied { .. }
                | LineageError::NotAContainer { .. }
        )
    }

    /// Check if this error came from loading a workflow definition
    pub fn is_workflow_config_error(&self) -> bool {
        matches!(
            self,
            LineageError::EmptyWorkflow { .. }
                | LineageError::DuplicateState { .. }
                | LineageError::UnknownState { .. }
                | LineageError::UnknownPredecessor { .. }
                | LineageError::SerializationError(_)
        )
    }
}
