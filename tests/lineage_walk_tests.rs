//! Traversal semantics exercised through the public API

use chrono::{DateTime, TimeZone, Utc};
use vessel_lineage::{
    Batch, BatchId, BucketEntry, BucketEntryId, ContainerKind, EventId, EventTypeCriteria,
    EventTypeName, GraphWalker, LineageError, LineageGraph, Reagent, ReagentId, TransferCriteria,
    TransferEndpoint, TransferEvent, TransferGraph, TraversalContext, TraversalControl,
    TraversalDirection, Vessel, VesselId,
};

fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, minute, 0).unwrap()
}

/// Records each context as (label, leading event type, hop)
#[derive(Default)]
struct Recorder {
    enters: Vec<(String, Option<String>, u32)>,
    exit_count: usize,
}

impl TransferCriteria for Recorder {
    fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl {
        self.enters.push((
            context.vessel.label().to_string(),
            context
                .event
                .map(|event| event.event_type().as_str().to_string()),
            context.hop,
        ));
        TraversalControl::Continue
    }

    fn on_exit(&mut self, _context: &TraversalContext<'_>) {
        self.exit_count += 1;
    }
}

#[test]
fn multi_target_stamp_visits_each_target_through_one_event() {
    let mut graph = LineageGraph::new();
    let source = graph
        .add_vessel(Vessel::new("PLATE-1", ContainerKind::Plate))
        .unwrap();
    let first = graph
        .add_vessel(Vessel::new("T-1", ContainerKind::Tube))
        .unwrap();
    let second = graph
        .add_vessel(Vessel::new("T-2", ContainerKind::Tube))
        .unwrap();
    graph
        .record_transfer(TransferEvent::section(
            "ShearingTransfer",
            ts(0),
            "bravo",
            vec![TransferEndpoint::vessel(source)],
            vec![
                TransferEndpoint::at(first, "A01"),
                TransferEndpoint::at(second, "A02"),
            ],
        ))
        .unwrap();

    let mut recorder = Recorder::default();
    GraphWalker::new(&graph)
        .walk(source, TraversalDirection::Descendants, &mut recorder)
        .unwrap();

    assert_eq!(
        recorder.enters,
        vec![
            ("PLATE-1".to_string(), None, 0),
            ("T-1".to_string(), Some("ShearingTransfer".to_string()), 1),
            ("T-2".to_string(), Some("ShearingTransfer".to_string()), 1),
        ]
    );
}

#[test]
fn pooling_ancestors_reach_every_source_at_the_same_hop() {
    let mut graph = LineageGraph::new();
    let first = graph
        .add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))
        .unwrap();
    let second = graph
        .add_vessel(Vessel::new("LIB-2", ContainerKind::Tube))
        .unwrap();
    let lane = graph
        .add_vessel(Vessel::new("LANE-1", ContainerKind::PooledLane))
        .unwrap();
    graph
        .record_transfer(TransferEvent::section(
            "PoolingTransfer",
            ts(0),
            "manual",
            vec![
                TransferEndpoint::vessel(first),
                TransferEndpoint::vessel(second),
            ],
            vec![TransferEndpoint::vessel(lane)],
        ))
        .unwrap();

    let mut recorder = Recorder::default();
    GraphWalker::new(&graph)
        .walk(lane, TraversalDirection::Ancestors, &mut recorder)
        .unwrap();

    assert_eq!(
        recorder.enters,
        vec![
            ("LANE-1".to_string(), None, 0),
            ("LIB-1".to_string(), Some("PoolingTransfer".to_string()), 1),
            ("LIB-2".to_string(), Some("PoolingTransfer".to_string()), 1),
        ]
    );
}

#[test]
fn diamond_revisits_vessel_but_replays_no_event() {
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
    let bottom = graph
        .add_vessel(Vessel::new("BOTTOM", ContainerKind::Tube))
        .unwrap();
    for (minute, source, target, name) in [
        (0, top, left, "SplitLeft"),
        (1, top, right, "SplitRight"),
        (2, left, bottom, "MergeLeft"),
        (3, right, bottom, "MergeRight"),
    ] {
        graph
            .record_transfer(TransferEvent::section(
                name,
                ts(minute),
                "manual",
                vec![TransferEndpoint::vessel(source)],
                vec![TransferEndpoint::vessel(target)],
            ))
            .unwrap();
    }
    graph
        .record_transfer(TransferEvent::in_place("LaneQC", ts(4), "lc", bottom))
        .unwrap();

    let mut recorder = Recorder::default();
    GraphWalker::new(&graph)
        .walk(top, TraversalDirection::Descendants, &mut recorder)
        .unwrap();

    // both merge edges deliver BOTTOM, so it is entered twice
    let bottom_visits = recorder
        .enters
        .iter()
        .filter(|(label, _, _)| label == "BOTTOM")
        .count();
    assert_eq!(bottom_visits, 3); // two arrivals plus one in-place context

    // the in-place history replays only on the first arrival
    let qc_contexts = recorder
        .enters
        .iter()
        .filter(|(_, event, _)| event.as_deref() == Some("LaneQC"))
        .count();
    assert_eq!(qc_contexts, 1);

    assert_eq!(recorder.exit_count, recorder.enters.len());
}

#[test]
fn self_loop_event_terminates() {
    let mut graph = LineageGraph::new();
    let tube = graph
        .add_vessel(Vessel::new("T-1", ContainerKind::Tube))
        .unwrap();
    // a section event whose source and target are the same vessel
    graph
        .record_transfer(TransferEvent::section(
            "NormalizationTransfer",
            ts(0),
            "manual",
            vec![TransferEndpoint::vessel(tube)],
            vec![TransferEndpoint::vessel(tube)],
        ))
        .unwrap();

    let mut recorder = Recorder::default();
    GraphWalker::new(&graph)
        .walk(tube, TraversalDirection::Descendants, &mut recorder)
        .unwrap();

    let labels: Vec<&str> = recorder
        .enters
        .iter()
        .map(|(label, _, _)| label.as_str())
        .collect();
    assert_eq!(labels, vec!["T-1", "T-1"]);
}

#[test]
fn repeated_walks_are_identical() {
    let mut graph = LineageGraph::new();
    let mut vessels = Vec::new();
    for index in 0..6 {
        vessels.push(
            graph
                .add_vessel(Vessel::new(
                    format!("V-{index}"),
                    ContainerKind::Tube,
                ))
                .unwrap(),
        );
    }
    for (minute, (source, target)) in [(0usize, 1usize), (0, 2), (1, 3), (2, 3), (3, 4), (4, 1), (3, 5)]
        .into_iter()
        .enumerate()
    {
        graph
            .record_transfer(TransferEvent::section(
                format!("Transfer{minute}"),
                ts(minute as u32),
                "manual",
                vec![TransferEndpoint::vessel(vessels[source])],
                vec![TransferEndpoint::vessel(vessels[target])],
            ))
            .unwrap();
    }

    let mut first = Recorder::default();
    let mut second = Recorder::default();
    let walker = GraphWalker::new(&graph);
    walker
        .walk(vessels[0], TraversalDirection::Descendants, &mut first)
        .unwrap();
    walker
        .walk(vessels[0], TraversalDirection::Descendants, &mut second)
        .unwrap();
    assert_eq!(first.enters, second.enters);
}

#[test]
fn event_type_criteria_pools_hits_across_walks() {
    let mut graph = LineageGraph::new();
    let first = graph
        .add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))
        .unwrap();
    let second = graph
        .add_vessel(Vessel::new("LIB-2", ContainerKind::Tube))
        .unwrap();
    graph
        .record_transfer(TransferEvent::in_place("ShearingQC", ts(0), "lc", first))
        .unwrap();
    graph
        .record_transfer(TransferEvent::in_place("ShearingQC", ts(1), "lc", second))
        .unwrap();

    // one criteria driven over two start vessels, the reuse events_matching
    // does not offer
    let wanted = vec![EventTypeName::from("ShearingQC")];
    let mut criteria = EventTypeCriteria::new(&wanted);
    let walker = GraphWalker::new(&graph);
    walker
        .walk(first, TraversalDirection::Descendants, &mut criteria)
        .unwrap();
    walker
        .walk(second, TraversalDirection::Descendants, &mut criteria)
        .unwrap();

    let hits = criteria.into_hits();
    let qc = &hits[&EventTypeName::from("ShearingQC")];
    assert_eq!(qc.len(), 2);
    assert_eq!(qc[0].vessel, first);
    assert_eq!(qc[1].vessel, second);
}

/// A graph that denies knowing one vessel, standing in for a store with a
/// torn write
struct HoleGraph {
    inner: LineageGraph,
    hidden: VesselId,
}

impl TransferGraph for HoleGraph {
    fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        if id == self.hidden {
            None
        } else {
            self.inner.vessel(id)
        }
    }

    fn event(&self, id: EventId) -> Option<&TransferEvent> {
        self.inner.event(id)
    }

    fn incoming(&self, vessel: VesselId) -> &[EventId] {
        self.inner.incoming(vessel)
    }

    fn outgoing(&self, vessel: VesselId) -> &[EventId] {
        self.inner.outgoing(vessel)
    }

    fn in_place(&self, vessel: VesselId) -> &[EventId] {
        self.inner.in_place(vessel)
    }

    fn batches_for(&self, vessel: VesselId) -> &[BatchId] {
        self.inner.batches_for(vessel)
    }

    fn bucket_entries_for(&self, vessel: VesselId) -> &[BucketEntryId] {
        self.inner.bucket_entries_for(vessel)
    }

    fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.inner.batch(id)
    }

    fn bucket_entry(&self, id: BucketEntryId) -> Option<&BucketEntry> {
        self.inner.bucket_entry(id)
    }

    fn reagent(&self, id: ReagentId) -> Option<&Reagent> {
        self.inner.reagent(id)
    }
}

#[test]
fn unresolvable_endpoint_is_a_fatal_integrity_error() {
    let mut inner = LineageGraph::new();
    let source = inner
        .add_vessel(Vessel::new("SRC", ContainerKind::Tube))
        .unwrap();
    let target = inner
        .add_vessel(Vessel::new("TGT", ContainerKind::Tube))
        .unwrap();
    let event = inner
        .record_transfer(TransferEvent::section(
            "ShearingTransfer",
            ts(0),
            "bravo",
            vec![TransferEndpoint::vessel(source)],
            vec![TransferEndpoint::vessel(target)],
        ))
        .unwrap();

    let graph = HoleGraph {
        inner,
        hidden: target,
    };
    let mut recorder = Recorder::default();
    let err = GraphWalker::new(&graph)
        .walk(source, TraversalDirection::Descendants, &mut recorder)
        .unwrap_err();
    assert_eq!(
        err,
        LineageError::MissingVesselReference {
            event,
            vessel: target,
        }
    );
}
