//! Lab batches and bucket entries
//!
//! Batches group vessels moving through a process together; bucket entries
//! record that a vessel was queued into a named processing bucket under a
//! product order. The provenance resolver consults both through graph-side
//! membership lookups - neither creates edges.

use crate::identifiers::{BatchId, BucketEntryId, VesselId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of grouping a batch represents
///
/// "Nearest batch" and "all batches" are answered per kind, so a vessel can
/// have a nearest workflow batch and a different nearest receipt batch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum BatchKind {
    /// A lab workflow batch: the vessels of one process run
    Workflow,
    /// A sample receipt batch: vessels that arrived together
    SampleReceipt,
    /// A sample import batch: vessels brought over from an external system
    SampleImport,
    /// A sequencing batch: vessels ticketed onto a flowcell
    Sequencing,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchKind::Workflow => "Workflow",
            BatchKind::SampleReceipt => "SampleReceipt",
            BatchKind::SampleImport => "SampleImport",
            BatchKind::Sequencing => "Sequencing",
        };
        write!(f, "{name}")
    }
}

/// A named grouping of vessels, typed by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Batch {
    id: BatchId,
    name: String,
    kind: BatchKind,
    workflow: Option<String>,
}

impl Batch {
    /// Create a new batch with a fresh id
    pub fn new(name: impl Into<String>, kind: BatchKind) -> Self {
        Self {
            id: BatchId::new(),
            name: name.into(),
            kind,
            workflow: None,
        }
    }

    /// Name the workflow this batch runs under
    ///
    /// Provenance reports the workflow name of the nearest Workflow-kind
    /// batch, so workflow batches should carry one.
    pub fn with_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.workflow = Some(workflow.into());
        self
    }

    /// The batch's stable id
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// The batch's business name, e.g. "LCSET-1234"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of grouping
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    /// The workflow name, when the batch carries one
    pub fn workflow(&self) -> Option<&str> {
        self.workflow.as_deref()
    }
}

/// A record that a vessel was queued into a processing bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BucketEntry {
    id: BucketEntryId,
    bucket: String,
    product_order: String,
    vessel: VesselId,
}

impl BucketEntry {
    /// Create a new bucket entry with a fresh id
    pub fn new(
        bucket: impl Into<String>,
        product_order: impl Into<String>,
        vessel: VesselId,
    ) -> Self {
        Self {
            id: BucketEntryId::new(),
            bucket: bucket.into(),
            product_order: product_order.into(),
            vessel,
        }
    }

    /// The entry's stable id
    pub fn id(&self) -> BucketEntryId {
        self.id
    }

    /// The bucket name, e.g. "Shearing Bucket"
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The product order the entry was queued under
    pub fn product_order(&self) -> &str {
        &self.product_order
    }

    /// The vessel that was queued
    pub fn vessel(&self) -> VesselId {
        self.vessel
    }
}
