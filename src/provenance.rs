// Copyright 2025 the vessel-lineage authors.

//! Provenance resolution over ancestor lineage
//!
//! A provenance answer is assembled in one ancestor walk and returned as a
//! plain value. Nothing here is cached: lineage graphs mutate as lab events
//! stream in, so callers resolve at the moment they need an answer and let
//! the result go.

use crate::batch::BatchKind;
use crate::errors::{LineageError, LineageResult};
use crate::graph::TransferGraph;
use crate::identifiers::{BatchId, BucketEntryId, ReagentId, VesselId};
use crate::walker::{
    GraphWalker, TransferCriteria, TraversalContext, TraversalControl, TraversalDirection,
};
use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Which provenance facets to gather
///
/// Defaults to everything. Narrowing a query skips the bookkeeping for the
/// facets a caller does not want, which matters on wide pooled lineages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvenanceQuery {
    /// Gather root samples
    pub roots: bool,
    /// Gather batches and the derived workflow name
    pub batches: bool,
    /// Gather bucket entries
    pub bucket_entries: bool,
    /// Gather reagents applied along the lineage
    pub reagents: bool,
}

impl Default for ProvenanceQuery {
    fn default() -> Self {
        Self {
            roots: true,
            batches: true,
            bucket_entries: true,
            reagents: true,
        }
    }
}

impl ProvenanceQuery {
    /// A query gathering nothing, to be built up facet by facet
    pub fn none() -> Self {
        Self {
            roots: false,
            batches: false,
            bucket_entries: false,
            reagents: false,
        }
    }

    /// Enable root-sample gathering
    pub fn with_roots(mut self) -> Self {
        self.roots = true;
        self
    }

    /// Enable batch gathering
    pub fn with_batches(mut self) -> Self {
        self.batches = true;
        self
    }

    /// Enable bucket-entry gathering
    pub fn with_bucket_entries(mut self) -> Self {
        self.bucket_entries = true;
        self
    }

    /// Enable reagent gathering
    pub fn with_reagents(mut self) -> Self {
        self.reagents = true;
        self
    }
}

/// Resolved provenance for one vessel
///
/// Lists hold first-observed traversal order; "nearest" means fewest
/// section-transfer hops from the queried vessel, ties broken by traversal
/// order. The struct is a snapshot of the graph at resolution time and is
/// meant to be serialized or discarded, not held.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    /// Ancestor vessels with no incoming section transfers
    ///
    /// Usually one; pooled lineages legitimately have several, and a lineage
    /// that is one big cycle has none.
    pub root_samples: Vec<VesselId>,
    /// The nearest batch of each kind
    pub nearest_batches: BTreeMap<BatchKind, BatchId>,
    /// Every batch of each kind, nearest first
    pub all_batches: BTreeMap<BatchKind, Vec<BatchId>>,
    /// The nearest bucket entry, if any ancestor carries one
    pub nearest_bucket_entry: Option<BucketEntryId>,
    /// Every bucket entry along the lineage, nearest first
    pub bucket_entries: Vec<BucketEntryId>,
    /// Reagents applied by any event along the lineage
    pub reagents: Vec<ReagentId>,
    /// Name carried by the nearest workflow batch that names one
    pub workflow_name: Option<String>,
}

impl Provenance {
    /// The primary root sample, when the lineage has exactly one origin
    ///
    /// Returns the first root in traversal order; pooled lineages keep the
    /// full list in [`root_samples`](Provenance::root_samples).
    pub fn root_sample(&self) -> Option<VesselId> {
        self.root_samples.first().copied()
    }
}

struct ProvenanceCriteria<'g, G: TransferGraph + ?Sized> {
    graph: &'g G,
    query: ProvenanceQuery,
    roots: IndexSet<VesselId>,
    reagents: IndexSet<ReagentId>,
    batches_at_hop: HashMap<BatchKind, BTreeMap<u32, IndexSet<BatchId>>>,
    bucket_entries_at_hop: BTreeMap<u32, IndexSet<BucketEntryId>>,
    failure: Option<LineageError>,
}

impl<'g, G: TransferGraph + ?Sized> ProvenanceCriteria<'g, G> {
    fn new(graph: &'g G, query: ProvenanceQuery) -> Self {
        Self {
            graph,
            query,
            roots: IndexSet::new(),
            reagents: IndexSet::new(),
            batches_at_hop: HashMap::new(),
            bucket_entries_at_hop: BTreeMap::new(),
            failure: None,
        }
    }

    fn finish(self) -> LineageResult<Provenance> {
        if let Some(error) = self.failure {
            return Err(error);
        }

        let mut nearest_batches = BTreeMap::new();
        let mut all_batches: BTreeMap<BatchKind, Vec<BatchId>> = BTreeMap::new();
        for (kind, by_hop) in &self.batches_at_hop {
            let mut ordered: IndexSet<BatchId> = IndexSet::new();
            for ids in by_hop.values() {
                ordered.extend(ids.iter().copied());
            }
            if let Some(first) = ordered.first() {
                nearest_batches.insert(*kind, *first);
            }
            all_batches.insert(*kind, ordered.into_iter().collect());
        }

        let mut bucket_entries: IndexSet<BucketEntryId> = IndexSet::new();
        for ids in self.bucket_entries_at_hop.values() {
            bucket_entries.extend(ids.iter().copied());
        }

        let workflow_name = all_batches
            .get(&BatchKind::Workflow)
            .into_iter()
            .flatten()
            .filter_map(|id| self.graph.batch(*id))
            .find_map(|batch| batch.workflow().map(String::from));

        Ok(Provenance {
            root_samples: self.roots.into_iter().collect(),
            nearest_batches,
            all_batches,
            nearest_bucket_entry: bucket_entries.first().copied(),
            bucket_entries: bucket_entries.into_iter().collect(),
            reagents: self.reagents.into_iter().collect(),
            workflow_name,
        })
    }
}

impl<G: TransferGraph + ?Sized> TransferCriteria for ProvenanceCriteria<'_, G> {
    fn on_enter(&mut self, context: &TraversalContext<'_>) -> TraversalControl {
        if let Some(event) = context.event {
            if self.query.reagents {
                self.reagents.extend(event.reagents().iter().copied());
            }
        }

        if !context.is_vessel_visit() {
            return TraversalControl::Continue;
        }
        let vessel = context.vessel.id();

        if self.query.roots && self.graph.incoming(vessel).is_empty() {
            self.roots.insert(vessel);
        }

        if self.query.batches {
            for batch_id in self.graph.batches_for(vessel) {
                let Some(batch) = self.graph.batch(*batch_id) else {
                    self.failure = Some(LineageError::BatchNotFound { id: *batch_id });
                    return TraversalControl::StopSubtree;
                };
                self.batches_at_hop
                    .entry(batch.kind())
                    .or_default()
                    .entry(context.hop)
                    .or_default()
                    .insert(*batch_id);
            }
        }

        if self.query.bucket_entries {
            self.bucket_entries_at_hop
                .entry(context.hop)
                .or_default()
                .extend(self.graph.bucket_entries_for(vessel).iter().copied());
        }

        TraversalControl::Continue
    }
}

/// Resolves provenance questions against a [`TransferGraph`]
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use vessel_lineage::{
///     Batch, BatchKind, ContainerKind, LineageGraph, ProvenanceResolver, TransferEndpoint,
///     TransferEvent, Vessel,
/// };
///
/// let mut graph = LineageGraph::new();
/// let sample = graph.add_vessel(Vessel::new("SM-1", ContainerKind::Tube))?;
/// let library = graph.add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))?;
/// let batch = graph
///     .add_batch(Batch::new("EX-42", BatchKind::Workflow).with_workflow("Exome Express"));
/// graph.assign_batch(sample, batch)?;
/// graph.record_transfer(TransferEvent::section(
///     "ShearingTransfer",
///     Utc::now(),
///     "bravo",
///     vec![TransferEndpoint::vessel(sample)],
///     vec![TransferEndpoint::vessel(library)],
/// ))?;
///
/// let provenance = ProvenanceResolver::new(&graph).resolve(library)?;
/// assert_eq!(provenance.root_sample(), Some(sample));
/// assert_eq!(provenance.workflow_name.as_deref(), Some("Exome Express"));
/// # Ok::<(), vessel_lineage::LineageError>(())
/// ```
pub struct ProvenanceResolver<'g, G: TransferGraph + ?Sized> {
    graph: &'g G,
}

impl<'g, G: TransferGraph + ?Sized> ProvenanceResolver<'g, G> {
    /// Create a resolver over a graph
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Resolve every provenance facet for a vessel
    pub fn resolve(&self, vessel: VesselId) -> LineageResult<Provenance> {
        self.resolve_with(vessel, ProvenanceQuery::default())
    }

    /// Resolve the requested facets for a vessel
    ///
    /// The queried vessel counts as its own ancestor at hop zero: a root
    /// sample queried directly reports itself as its provenance root, and
    /// batches assigned to the queried vessel are the nearest of their kind.
    pub fn resolve_with(
        &self,
        vessel: VesselId,
        query: ProvenanceQuery,
    ) -> LineageResult<Provenance> {
        let mut criteria = ProvenanceCriteria::new(self.graph, query);
        GraphWalker::new(self.graph).walk(vessel, TraversalDirection::Ancestors, &mut criteria)?;
        let provenance = criteria.finish()?;
        debug!(
            vessel = %vessel,
            roots = provenance.root_samples.len(),
            workflow = provenance.workflow_name.as_deref().unwrap_or("-"),
            "provenance resolved"
        );
        Ok(provenance)
    }
}
