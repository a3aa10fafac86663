// Copyright 2025 the vessel-lineage authors.

//! The transfer graph contract and its in-memory arena
//!
//! [`TransferGraph`] is the read contract the engine consumes: for any vessel,
//! its incoming/outgoing section transfers, its in-place history, and the
//! batch/bucket/reagent lookups the provenance criteria consult. The engine
//! never writes through it.
//!
//! [`LineageGraph`] is the crate's reference implementation - an append-only
//! arena addressed by stable ids. Recording enforces the integrity rules the
//! walker relies on (endpoints resolve, labels unique, positions never
//! reassigned); everything else about graph shape, including cycles arriving
//! from faulty upstream messages, is tolerated and left to the walker to
//! defuse.

use crate::batch::{Batch, BucketEntry};
use crate::errors::{LineageError, LineageResult};
use crate::events::{TransferEvent, TransferKind};
use crate::identifiers::{BatchId, BucketEntryId, EventId, ReagentId, VesselId};
use crate::reagent::Reagent;
use crate::vessel::{Position, Vessel};
use indexmap::IndexSet;
use std::collections::HashMap;
use tracing::debug;

/// Forward-only read access to vessels, events, and classification lookups
///
/// Implemented by [`LineageGraph`] in this crate and by storage adapters in
/// the surrounding system. All traversal and validation code is generic over
/// this trait, so tests can substitute hand-built fixtures.
pub trait TransferGraph {
    /// The vessel with this id
    fn vessel(&self, id: VesselId) -> Option<&Vessel>;

    /// The transfer event with this id
    fn event(&self, id: EventId) -> Option<&TransferEvent>;

    /// Section transfers recording this vessel as a target
    fn incoming(&self, id: VesselId) -> &[EventId];

    /// Section transfers recording this vessel as a source
    fn outgoing(&self, id: VesselId) -> &[EventId];

    /// In-place events recorded against this vessel
    fn in_place(&self, id: VesselId) -> &[EventId];

    /// Batches this vessel is a member of
    fn batches_for(&self, id: VesselId) -> &[BatchId];

    /// Bucket entries queued for this vessel
    fn bucket_entries_for(&self, id: VesselId) -> &[BucketEntryId];

    /// The batch with this id
    fn batch(&self, id: BatchId) -> Option<&Batch>;

    /// The bucket entry with this id
    fn bucket_entry(&self, id: BucketEntryId) -> Option<&BucketEntry>;

    /// The reagent with this id
    fn reagent(&self, id: ReagentId) -> Option<&Reagent>;
}

/// Append-only in-memory transfer graph
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use vessel_lineage::{
///     ContainerKind, LineageGraph, TransferEndpoint, TransferEvent, TransferGraph, Vessel,
/// };
///
/// let mut graph = LineageGraph::new();
/// let tube = graph.add_vessel(Vessel::new("TUBE-1", ContainerKind::Tube))?;
/// let lane = graph.add_vessel(Vessel::new("LANE-1", ContainerKind::PooledLane))?;
///
/// graph.record_transfer(TransferEvent::section(
///     "PoolingTransfer",
///     Utc::now(),
///     "manual",
///     vec![TransferEndpoint::vessel(tube)],
///     vec![TransferEndpoint::vessel(lane)],
/// ))?;
///
/// assert_eq!(graph.incoming(lane).len(), 1);
/// assert_eq!(graph.outgoing(tube).len(), 1);
/// # Ok::<(), vessel_lineage::LineageError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    vessels: HashMap<VesselId, Vessel>,
    labels: HashMap<String, VesselId>,
    events: HashMap<EventId, TransferEvent>,
    incoming: HashMap<VesselId, Vec<EventId>>,
    outgoing: HashMap<VesselId, Vec<EventId>>,
    in_place: HashMap<VesselId, Vec<EventId>>,
    batches: HashMap<BatchId, Batch>,
    batch_members: HashMap<VesselId, Vec<BatchId>>,
    bucket_entries: HashMap<BucketEntryId, BucketEntry>,
    bucket_members: HashMap<VesselId, Vec<BucketEntryId>>,
    reagents: HashMap<ReagentId, Reagent>,
}

impl LineageGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vessel
    ///
    /// Ids and labels are both unique; re-recording either is an integrity
    /// error, matching the create-once model.
    pub fn add_vessel(&mut self, vessel: Vessel) -> LineageResult<VesselId> {
        if self.vessels.contains_key(&vessel.id()) {
            return Err(LineageError::DuplicateVessel { id: vessel.id() });
        }
        if self.labels.contains_key(vessel.label()) {
            return Err(LineageError::DuplicateLabel {
                label: vessel.label().to_string(),
            });
        }
        let id = vessel.id();
        debug!(vessel = %id, label = vessel.label(), kind = %vessel.kind(), "vessel recorded");
        self.labels.insert(vessel.label().to_string(), id);
        self.vessels.insert(id, vessel);
        Ok(id)
    }

    /// Assign a child vessel to a position within a parent
    ///
    /// Both vessels must already be recorded; the parent must be a
    /// multi-position kind; the position must be unassigned.
    pub fn place(
        &mut self,
        parent: VesselId,
        position: impl Into<Position>,
        child: VesselId,
    ) -> LineageResult<()> {
        if !self.vessels.contains_key(&child) {
            return Err(LineageError::VesselNotFound { id: child });
        }
        let parent_vessel = self
            .vessels
            .get_mut(&parent)
            .ok_or(LineageError::VesselNotFound { id: parent })?;
        parent_vessel.place(position.into(), child)
    }

    /// Record a transfer event and index the edges it creates
    ///
    /// Every vessel the event references must already be recorded; a dangling
    /// endpoint means the upstream message arrived broken, and it is rejected
    /// here rather than discovered mid-walk.
    pub fn record_transfer(&mut self, event: TransferEvent) -> LineageResult<EventId> {
        if self.events.contains_key(&event.id()) {
            return Err(LineageError::DuplicateEvent { id: event.id() });
        }
        for vessel in event.vessels() {
            if !self.vessels.contains_key(&vessel) {
                return Err(LineageError::MissingVesselReference {
                    event: event.id(),
                    vessel,
                });
            }
        }
        for reagent in event.reagents() {
            if !self.reagents.contains_key(reagent) {
                return Err(LineageError::ReagentNotFound { id: *reagent });
            }
        }

        let id = event.id();
        match event.kind() {
            TransferKind::Section { sources, targets } => {
                // a 96-position stamp names the same vessel once per well;
                // index each vessel once per side
                let mut seen: IndexSet<VesselId> = IndexSet::new();
                for endpoint in sources {
                    if seen.insert(endpoint.vessel) {
                        self.outgoing.entry(endpoint.vessel).or_default().push(id);
                    }
                }
                seen.clear();
                for endpoint in targets {
                    if seen.insert(endpoint.vessel) {
                        self.incoming.entry(endpoint.vessel).or_default().push(id);
                    }
                }
            }
            TransferKind::InPlace { vessel } => {
                self.in_place.entry(*vessel).or_default().push(id);
            }
        }
        debug!(event = %id, event_type = %event.event_type(), in_place = event.is_in_place(), "transfer recorded");
        self.events.insert(id, event);
        Ok(id)
    }

    /// Register a batch
    pub fn add_batch(&mut self, batch: Batch) -> BatchId {
        let id = batch.id();
        self.batches.insert(id, batch);
        id
    }

    /// Enroll a vessel in a batch
    ///
    /// Idempotent: enrolling twice leaves a single membership.
    pub fn assign_batch(&mut self, vessel: VesselId, batch: BatchId) -> LineageResult<()> {
        if !self.vessels.contains_key(&vessel) {
            return Err(LineageError::VesselNotFound { id: vessel });
        }
        if !self.batches.contains_key(&batch) {
            return Err(LineageError::BatchNotFound { id: batch });
        }
        let members = self.batch_members.entry(vessel).or_default();
        if !members.contains(&batch) {
            members.push(batch);
        }
        Ok(())
    }

    /// Record a bucket entry for its vessel
    pub fn add_bucket_entry(&mut self, entry: BucketEntry) -> LineageResult<BucketEntryId> {
        if !self.vessels.contains_key(&entry.vessel()) {
            return Err(LineageError::VesselNotFound { id: entry.vessel() });
        }
        let id = entry.id();
        self.bucket_members.entry(entry.vessel()).or_default().push(id);
        self.bucket_entries.insert(id, entry);
        Ok(id)
    }

    /// Register a reagent lot
    pub fn add_reagent(&mut self, reagent: Reagent) -> ReagentId {
        let id = reagent.id();
        self.reagents.insert(id, reagent);
        id
    }

    /// Look a vessel up by its unique label
    pub fn find_by_label(&self, label: &str) -> Option<&Vessel> {
        self.labels.get(label).and_then(|id| self.vessels.get(id))
    }

    /// Number of recorded vessels
    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    /// Number of recorded transfer events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Iterate all recorded vessels in no particular order
    pub fn vessels(&self) -> impl Iterator<Item = &Vessel> {
        self.vessels.values()
    }

    /// Iterate all recorded events in no particular order
    pub fn events(&self) -> impl Iterator<Item = &TransferEvent> {
        self.events.values()
    }
}

impl TransferGraph for LineageGraph {
    fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.get(&id)
    }

    fn event(&self, id: EventId) -> Option<&TransferEvent> {
        self.events.get(&id)
    }

    fn incoming(&self, id: VesselId) -> &[EventId] {
        self.incoming.get(&id).map_or(&[], Vec::as_slice)
    }

    fn outgoing(&self, id: VesselId) -> &[EventId] {
        self.outgoing.get(&id).map_or(&[], Vec::as_slice)
    }

    fn in_place(&self, id: VesselId) -> &[EventId] {
        self.in_place.get(&id).map_or(&[], Vec::as_slice)
    }

    fn batches_for(&self, id: VesselId) -> &[BatchId] {
        self.batch_members.get(&id).map_or(&[], Vec::as_slice)
    }

    fn bucket_entries_for(&self, id: VesselId) -> &[BucketEntryId] {
        self.bucket_members.get(&id).map_or(&[], Vec::as_slice)
    }

    fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches.get(&id)
    }

    fn bucket_entry(&self, id: BucketEntryId) -> Option<&BucketEntry> {
        self.bucket_entries.get(&id)
    }

    fn reagent(&self, id: ReagentId) -> Option<&Reagent> {
        self.reagents.get(&id)
    }
}
