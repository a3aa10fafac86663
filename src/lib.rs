//! # Vessel Lineage
//!
//! Lab-container lineage graph engine: given a web of physical containers
//! (tubes, plates, racks, pooled lanes) connected by recorded transfer
//! events, this crate answers "what samples, reagents, and batches does this
//! container represent?" and "is this the next legal event for this
//! container, given its recorded history?"
//!
//! The engine is built from:
//! - **Vessel**: a labeled container of some kind, with positions for held children
//! - **TransferEvent**: an immutable movement or processing record; the sole source of graph edges
//! - **GraphWalker**: direction-aware, cycle-safe traversal driven by pluggable criteria
//! - **ProvenanceResolver**: accumulates root samples, batches, bucket entries, and reagents along ancestry
//! - **TransitionValidator**: judges proposed events against a declarative workflow table
//!
//! ## Design Principles
//!
//! 1. **Termination over trust**: faulty upstream messages can close cycles; every walk
//!    carries a visited-edge set and finishes on any finite graph
//! 2. **Read-side only**: the engine queries and validates an externally maintained,
//!    append-mostly graph; it never mutates it
//! 3. **Criteria accumulate, callers act**: traversal visitors only gather data; side
//!    effects happen after the walk returns
//! 4. **Workflows are data**: process ordering rules load from declarative JSON tables,
//!    not from code
//! 5. **Determinism**: an unchanged graph yields identical answers, down to list order

#![warn(missing_docs)]

mod identifiers;
mod errors;
mod vessel;
mod events;
mod batch;
mod reagent;
mod graph;
mod walker;
mod criteria;
mod provenance;
pub mod workflow;

// Re-export core types
pub use batch::{Batch, BatchKind, BucketEntry};
pub use criteria::{
    ancestor_vessels, descendant_vessels, events_matching, EventHit, EventTypeCriteria,
};
pub use errors::{LineageError, LineageResult};
pub use events::{TransferEndpoint, TransferEvent, TransferKind};
pub use graph::{LineageGraph, TransferGraph};
pub use identifiers::{
    BatchId, BucketEntryId, EventId, EventTypeName, ReagentId, StateId, VesselId,
};
pub use provenance::{Provenance, ProvenanceQuery, ProvenanceResolver};
pub use reagent::Reagent;
pub use vessel::{ContainerKind, Position, Vessel};
pub use walker::{
    GraphWalker, TransferCriteria, TraversalContext, TraversalControl, TraversalDirection,
};

// Re-export the workflow table types alongside the validator
pub use workflow::{
    TransitionDef, TransitionValidator, WorkflowConfig, WorkflowDef, WorkflowTransition,
};
