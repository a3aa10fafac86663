// Copyright 2025 the vessel-lineage authors.

//! Cycle-safe traversal over vessel transfer history
//!
//! The walker is the one piece of the engine that touches graph shape. It
//! visits vessel-event contexts depth-first in a chosen direction and hands
//! each one to a criteria implementation; everything the engine answers
//! (provenance, event queries, vessel listings) is a criteria folded over one
//! walk.
//!
//! Termination does not depend on the graph being acyclic. A visited set
//! keyed by transfer-event identity guarantees every edge is processed at
//! most once, so cycles and duplicate re-visits arriving from faulty upstream
//! messages are silently defused rather than looped over or reported.

use crate::errors::{LineageError, LineageResult};
use crate::events::TransferEvent;
use crate::graph::TransferGraph;
use crate::identifiers::{EventId, VesselId};
use crate::vessel::Vessel;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Which way a walk moves through transfer history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Follow section transfers backwards, from target to sources
    Ancestors,
    /// Follow section transfers forwards, from source to targets
    Descendants,
}

/// Flow control returned by [`TransferCriteria::on_enter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalControl {
    /// Keep walking below this context
    Continue,
    /// Prune the subtree below this context; siblings are still walked
    StopSubtree,
}

/// One visited vessel-event context
///
/// The start vessel is delivered with `event: None` and `hop: 0`. Arriving at
/// a vessel through a section transfer delivers that event and a hop count one
/// higher than the vessel it came from. A vessel's in-place history is
/// delivered as extra contexts at the same hop, in ascending timestamp order,
/// before any of its section edges are followed.
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'g> {
    /// The vessel being visited
    pub vessel: &'g Vessel,
    /// The event that led here; `None` only for the start vessel
    pub event: Option<&'g TransferEvent>,
    /// Section-transfer edges between the start vessel and this context
    pub hop: u32,
}

impl TraversalContext<'_> {
    /// Whether this context is a vessel visit rather than in-place history
    ///
    /// True for the start vessel and for arrivals through a section transfer;
    /// false for the self-edge contexts replaying a vessel's in-place events.
    pub fn is_vessel_visit(&self) -> bool {
        self.event.map_or(true, |event| !event.is_in_place())
    }
}

/// Visitor contract for a walk
///
/// Implementations accumulate data and nothing else; side effects belong to
/// the caller after the walk returns. `on_exit` fires for every entered
/// context, pruned or not, so per-branch state can always be popped.
pub trait TransferCriteria {
    /// Called when a context is entered
    fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl;

    /// Called when a context's subtree is finished
    fn on_exit(&mut self, _context: &TraversalContext<'_>) {}
}

enum Frame<'g> {
    Enter {
        vessel: &'g Vessel,
        via: Option<&'g TransferEvent>,
        hop: u32,
    },
    Exit {
        vessel: &'g Vessel,
        via: Option<&'g TransferEvent>,
        hop: u32,
    },
    SelfEdge {
        vessel: &'g Vessel,
        event: &'g TransferEvent,
        hop: u32,
    },
    Descend {
        event: &'g TransferEvent,
        hop: u32,
    },
}

/// Depth-first walker over a [`TransferGraph`]
///
/// All traversal state is local to one [`walk`](GraphWalker::walk) call;
/// walkers are cheap to create and hold only the graph borrow.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use vessel_lineage::{
///     ContainerKind, GraphWalker, LineageGraph, TransferCriteria, TransferEndpoint,
///     TransferEvent, TraversalContext, TraversalControl, TraversalDirection, Vessel,
/// };
///
/// struct LabelCollector(Vec<String>);
///
/// impl TransferCriteria for LabelCollector {
///     fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl {
///         self.0.push(context.vessel.label().to_string());
///         TraversalControl::Continue
///     }
/// }
///
/// let mut graph = LineageGraph::new();
/// let tube = graph.add_vessel(Vessel::new("TUBE-1", ContainerKind::Tube))?;
/// let lane = graph.add_vessel(Vessel::new("LANE-1", ContainerKind::PooledLane))?;
/// graph.record_transfer(TransferEvent::section(
///     "PoolingTransfer",
///     Utc::now(),
///     "manual",
///     vec![TransferEndpoint::vessel(tube)],
///     vec![TransferEndpoint::vessel(lane)],
/// ))?;
///
/// let mut collector = LabelCollector(Vec::new());
/// GraphWalker::new(&graph).walk(tube, TraversalDirection::Descendants, &mut collector)?;
/// assert_eq!(collector.0, vec!["TUBE-1", "LANE-1"]);
/// # Ok::<(), vessel_lineage::LineageError>(())
/// ```
pub struct GraphWalker<'g, G: TransferGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: TransferGraph + ?Sized> GraphWalker<'g, G> {
    /// Create a walker over a graph
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Walk from a start vessel, delivering contexts to the criteria
    ///
    /// Fails fast on data-integrity problems: an unknown start vessel, an
    /// adjacency entry with no event behind it, or an event endpoint that does
    /// not resolve to a vessel. Cycles are not errors; they are skipped via
    /// the visited-edge set.
    pub fn walk<C: TransferCriteria>(
        &self,
        start: VesselId,
        direction: TraversalDirection,
        criteria: &mut C,
    ) -> LineageResult<()> {
        let graph = self.graph;
        let start_vessel = graph
            .vessel(start)
            .ok_or(LineageError::VesselNotFound { id: start })?;

        debug!(start = start_vessel.label(), ?direction, "walk started");

        let mut visited: HashSet<EventId> = HashSet::new();
        let mut stack: Vec<Frame<'g>> = vec![Frame::Enter {
            vessel: start_vessel,
            via: None,
            hop: 0,
        }];
        let mut entered = 0usize;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { vessel, via, hop } => {
                    let context = TraversalContext {
                        vessel,
                        event: via,
                        hop,
                    };
                    let control = criteria.on_enter(&context);
                    entered += 1;
                    trace!(vessel = vessel.label(), hop, "context entered");

                    // exit fires after the whole subtree, pruned or not
                    stack.push(Frame::Exit { vessel, via, hop });
                    if control == TraversalControl::StopSubtree {
                        trace!(vessel = vessel.label(), hop, "subtree pruned");
                        continue;
                    }

                    let edge_ids = match direction {
                        TraversalDirection::Ancestors => graph.incoming(vessel.id()),
                        TraversalDirection::Descendants => graph.outgoing(vessel.id()),
                    };
                    let mut edges: Vec<&'g TransferEvent> = Vec::with_capacity(edge_ids.len());
                    for edge_id in edge_ids {
                        edges.push(
                            graph
                                .event(*edge_id)
                                .ok_or(LineageError::EventNotFound { id: *edge_id })?,
                        );
                    }
                    edges.sort_by_key(|event| (event.timestamp(), *event.id().as_uuid()));

                    let self_edge_ids = graph.in_place(vessel.id());
                    let mut self_edges: Vec<&'g TransferEvent> =
                        Vec::with_capacity(self_edge_ids.len());
                    for edge_id in self_edge_ids {
                        self_edges.push(
                            graph
                                .event(*edge_id)
                                .ok_or(LineageError::EventNotFound { id: *edge_id })?,
                        );
                    }
                    self_edges.sort_by_key(|event| (event.timestamp(), *event.id().as_uuid()));

                    // LIFO stack: push section edges first, then in-place
                    // events, both reversed, so contexts pop in ascending
                    // order with in-place history ahead of any descent
                    for event in edges.into_iter().rev() {
                        stack.push(Frame::Descend { event, hop });
                    }
                    for event in self_edges.into_iter().rev() {
                        stack.push(Frame::SelfEdge { vessel, event, hop });
                    }
                }
                Frame::SelfEdge { vessel, event, hop } => {
                    if !visited.insert(event.id()) {
                        debug!(event = %event.id(), "revisited in-place event skipped");
                        continue;
                    }
                    let context = TraversalContext {
                        vessel,
                        event: Some(event),
                        hop,
                    };
                    // a self-edge has an empty subtree, so the control value
                    // has nothing to prune
                    let _ = criteria.on_enter(&context);
                    entered += 1;
                    trace!(vessel = vessel.label(), event_type = %event.event_type(), hop, "in-place context entered");
                    criteria.on_exit(&context);
                }
                Frame::Descend { event, hop } => {
                    if !visited.insert(event.id()) {
                        debug!(event = %event.id(), "revisited edge skipped");
                        continue;
                    }
                    let endpoints = match direction {
                        TraversalDirection::Ancestors => event.sources(),
                        TraversalDirection::Descendants => event.targets(),
                    };
                    // a plate stamp lists one vessel per well; enter each
                    // vessel once per edge
                    let mut neighbors: Vec<&'g Vessel> = Vec::new();
                    for endpoint in endpoints {
                        if neighbors.iter().any(|v| v.id() == endpoint.vessel) {
                            continue;
                        }
                        let vessel = graph.vessel(endpoint.vessel).ok_or(
                            LineageError::MissingVesselReference {
                                event: event.id(),
                                vessel: endpoint.vessel,
                            },
                        )?;
                        neighbors.push(vessel);
                    }
                    for vessel in neighbors.into_iter().rev() {
                        stack.push(Frame::Enter {
                            vessel,
                            via: Some(event),
                            hop: hop + 1,
                        });
                    }
                }
                Frame::Exit { vessel, via, hop } => {
                    criteria.on_exit(&TraversalContext {
                        vessel,
                        event: via,
                        hop,
                    });
                }
            }
        }

        debug!(contexts = entered, "walk finished");
        Ok(())
    }
}
