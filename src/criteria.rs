//! Ready-made criteria for the common lineage questions
//!
//! These cover the queries the engine answers most often without callers
//! writing their own [`TransferCriteria`]: which events of a given type sit
//! up or down the line, and which vessels feed into or out of one.

use crate::errors::LineageResult;
use crate::graph::TransferGraph;
use crate::identifiers::{EventId, EventTypeName, VesselId};
use crate::walker::{
    GraphWalker, TransferCriteria, TraversalContext, TraversalControl, TraversalDirection,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One event context matched by [`events_matching`]
///
/// A section transfer touching several vessels produces one hit per vessel it
/// delivered the walk to, all sharing the event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHit {
    /// The matched transfer event
    pub event: EventId,
    /// The vessel whose context carried the event
    pub vessel: VesselId,
    /// Distance from the start vessel in section-transfer edges
    pub hop: u32,
}

/// Criteria that records every context carrying one of the wanted event types
///
/// [`events_matching`] wraps this for the one-shot case; hold one yourself to
/// drive [`GraphWalker::walk`] directly, for instance to reuse it across
/// several start vessels and pool the hits.
pub struct EventTypeCriteria<'a> {
    wanted: &'a [EventTypeName],
    hits: IndexMap<EventTypeName, Vec<EventHit>>,
}

impl<'a> EventTypeCriteria<'a> {
    /// Criteria matching `event_types`, each pre-seeded with an empty hit list
    /// so the result carries every requested type in request order
    pub fn new(event_types: &'a [EventTypeName]) -> Self {
        Self {
            wanted: event_types,
            hits: event_types
                .iter()
                .map(|event_type| (event_type.clone(), Vec::new()))
                .collect(),
        }
    }

    /// The recorded hits, keyed by requested type in request order
    pub fn into_hits(self) -> IndexMap<EventTypeName, Vec<EventHit>> {
        self.hits
    }
}

impl TransferCriteria for EventTypeCriteria<'_> {
    fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl {
        if let Some(event) = context.event {
            if self.wanted.contains(event.event_type()) {
                self.hits
                    .entry(event.event_type().clone())
                    .or_default()
                    .push(EventHit {
                        event: event.id(),
                        vessel: context.vessel.id(),
                        hop: context.hop,
                    });
            }
        }
        TraversalControl::Continue
    }
}

/// Collect every event of the requested types reachable from a start vessel
///
/// Both in-place events and section transfers match. The returned map carries
/// every requested type, in request order, with an empty list when nothing
/// matched; hits appear in traversal order.
pub fn events_matching<G: TransferGraph + ?Sized>(
    graph: &G,
    start: VesselId,
    direction: TraversalDirection,
    event_types: &[EventTypeName],
) -> LineageResult<IndexMap<EventTypeName, Vec<EventHit>>> {
    let mut criteria = EventTypeCriteria::new(event_types);
    GraphWalker::new(graph).walk(start, direction, &mut criteria)?;
    Ok(criteria.into_hits())
}

struct VesselCollector {
    start: VesselId,
    seen: IndexSet<VesselId>,
}

impl TransferCriteria for VesselCollector {
    fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl {
        if context.is_vessel_visit() && context.vessel.id() != self.start {
            self.seen.insert(context.vessel.id());
        }
        TraversalControl::Continue
    }
}

fn collect_vessels<G: TransferGraph + ?Sized>(
    graph: &G,
    start: VesselId,
    direction: TraversalDirection,
) -> LineageResult<Vec<VesselId>> {
    let mut criteria = VesselCollector {
        start,
        seen: IndexSet::new(),
    };
    GraphWalker::new(graph).walk(start, direction, &mut criteria)?;
    Ok(criteria.seen.into_iter().collect())
}

/// Every distinct vessel upstream of `start`, in first-visit traversal order
///
/// The start vessel never lists itself, even when a cyclic history re-enters
/// it.
pub fn ancestor_vessels<G: TransferGraph + ?Sized>(
    graph: &G,
    start: VesselId,
) -> LineageResult<Vec<VesselId>> {
    collect_vessels(graph, start, TraversalDirection::Ancestors)
}

/// Every distinct vessel downstream of `start`, in first-visit traversal order
///
/// Depth-first order, not hop order: a branch is explored to its end before
/// the walk returns for the next edge, so a far vessel on an early branch can
/// precede a near vessel on a later one.
pub fn descendant_vessels<G: TransferGraph + ?Sized>(
    graph: &G,
    start: VesselId,
) -> LineageResult<Vec<VesselId>> {
    collect_vessels(graph, start, TraversalDirection::Descendants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TransferEndpoint, TransferEvent};
    use crate::graph::LineageGraph;
    use crate::vessel::{ContainerKind, Vessel};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, minute, 0).unwrap()
    }

    fn sheared_library() -> (LineageGraph, VesselId, VesselId, VesselId) {
        let mut graph = LineageGraph::new();
        let sample = graph
            .add_vessel(Vessel::new("SAMPLE-1", ContainerKind::Tube))
            .unwrap();
        let sheared = graph
            .add_vessel(Vessel::new("SHEARED-1", ContainerKind::Tube))
            .unwrap();
        let library = graph
            .add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))
            .unwrap();
        graph
            .record_transfer(TransferEvent::section(
                "ShearingTransfer",
                ts(0),
                "bravo",
                vec![TransferEndpoint::vessel(sample)],
                vec![TransferEndpoint::vessel(sheared)],
            ))
            .unwrap();
        graph
            .record_transfer(TransferEvent::in_place("ShearingQC", ts(1), "lc", sheared))
            .unwrap();
        graph
            .record_transfer(TransferEvent::section(
                "EndRepair",
                ts(2),
                "bravo",
                vec![TransferEndpoint::vessel(sheared)],
                vec![TransferEndpoint::vessel(library)],
            ))
            .unwrap();
        (graph, sample, sheared, library)
    }

    #[test]
    fn test_events_matching_finds_in_place_and_section() {
        let (graph, _, sheared, library) = sheared_library();
        let wanted = vec![
            EventTypeName::from("ShearingQC"),
            EventTypeName::from("EndRepair"),
            EventTypeName::from("SageLoading"),
        ];
        let hits = events_matching(&graph, library, TraversalDirection::Ancestors, &wanted).unwrap();

        let qc = &hits[&EventTypeName::from("ShearingQC")];
        assert_eq!(qc.len(), 1);
        assert_eq!(qc[0].vessel, sheared);
        assert_eq!(qc[0].hop, 1);

        // walking ancestors, EndRepair is the edge that lands on the sheared
        // tube, so that is the vessel its context carries
        let end_repair = &hits[&EventTypeName::from("EndRepair")];
        assert_eq!(end_repair.len(), 1);
        assert_eq!(end_repair[0].vessel, sheared);
        assert_eq!(end_repair[0].hop, 1);

        // requested but absent types still get an entry
        assert!(hits[&EventTypeName::from("SageLoading")].is_empty());
    }

    #[test]
    fn test_ancestor_vessels_in_visit_order_without_start() {
        let (graph, sample, sheared, library) = sheared_library();
        let ancestors = ancestor_vessels(&graph, library).unwrap();
        assert_eq!(ancestors, vec![sheared, sample]);
    }

    fn split_and_pool() -> (LineageGraph, VesselId, VesselId, VesselId, VesselId) {
        let mut graph = LineageGraph::new();
        let top = graph
            .add_vessel(Vessel::new("TOP", ContainerKind::Tube))
            .unwrap();
        let left = graph
            .add_vessel(Vessel::new("LEFT", ContainerKind::Tube))
            .unwrap();
        let right = graph
            .add_vessel(Vessel::new("RIGHT", ContainerKind::Tube))
            .unwrap();
        let pool = graph
            .add_vessel(Vessel::new("POOL", ContainerKind::PooledLane))
            .unwrap();
        for (minute, target) in [(0, left), (1, right)] {
            graph
                .record_transfer(TransferEvent::section(
                    "Split",
                    ts(minute),
                    "manual",
                    vec![TransferEndpoint::vessel(top)],
                    vec![TransferEndpoint::vessel(target)],
                ))
                .unwrap();
        }
        graph
            .record_transfer(TransferEvent::section(
                "PoolingTransfer",
                ts(2),
                "manual",
                vec![TransferEndpoint::vessel(left), TransferEndpoint::vessel(right)],
                vec![TransferEndpoint::vessel(pool)],
            ))
            .unwrap();
        (graph, top, left, right, pool)
    }

    #[test]
    fn test_descendant_vessels_dedup_across_branches() {
        let (graph, top, left, right, pool) = split_and_pool();
        let descendants = descendant_vessels(&graph, top).unwrap();
        // pool is reached through both branches but listed once
        assert_eq!(descendants, vec![left, pool, right]);
    }

    #[test]
    fn test_descendant_order_is_first_visit_not_hop_order() {
        let (graph, top, _, right, pool) = split_and_pool();
        let descendants = descendant_vessels(&graph, top).unwrap();
        // the left branch runs down to the pooled lane before the walk takes
        // the second split edge, so the two-hop pool precedes the one-hop
        // right tube
        let pool_at = descendants.iter().position(|id| *id == pool).unwrap();
        let right_at = descendants.iter().position(|id| *id == right).unwrap();
        assert!(pool_at < right_at);
    }
}
