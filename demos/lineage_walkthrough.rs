//! # Lineage Walkthrough
//!
//! This example demonstrates:
//! - Building a small exome library lineage: sample tube, sheared plate,
//!   library tube, pooled flowcell lane
//! - Resolving provenance for the lane (roots, batches, reagents, workflow)
//! - Asking targeted questions with the canned criteria helpers

use chrono::{DateTime, Duration, TimeZone, Utc};
use vessel_lineage::{
    ancestor_vessels, events_matching, Batch, BatchKind, BucketEntry, ContainerKind,
    EventTypeName, LineageGraph, ProvenanceResolver, Reagent, TransferEndpoint, TransferEvent,
    TransferGraph, TraversalDirection, Vessel,
};

fn ts(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Vessel Lineage Walkthrough ===\n");

    let mut graph = LineageGraph::new();

    // Vessels
    let sample = graph.add_vessel(Vessel::new("SM-4521", ContainerKind::Tube))?;
    let plate = graph.add_vessel(Vessel::new("SHEAR-PLATE-12", ContainerKind::Plate))?;
    let well = graph.add_vessel(Vessel::new("SHEAR-PLATE-12-A01", ContainerKind::Tube))?;
    let library = graph.add_vessel(Vessel::new("LIB-88", ContainerKind::Tube))?;
    let lane = graph.add_vessel(Vessel::new("FLOWCELL-3-LANE-1", ContainerKind::PooledLane))?;
    graph.place(plate, "A01", well)?;

    // Reference data
    let receipt = graph.add_batch(Batch::new("RCP-2025-117", BatchKind::SampleReceipt));
    let lcset = graph
        .add_batch(Batch::new("LCSET-9001", BatchKind::Workflow).with_workflow("Exome Express"));
    graph.assign_batch(sample, receipt)?;
    graph.assign_batch(sample, lcset)?;
    let entry = graph.add_bucket_entry(BucketEntry::new("Shearing Bucket", "PDO-551", sample))?;
    let enzyme = graph.add_reagent(Reagent::new("End Repair Mix", "LOT-1139"));

    // History
    graph.record_transfer(TransferEvent::in_place("SampleReceipt", ts(0), "lc", sample))?;
    graph.record_transfer(TransferEvent::section(
        "ShearingTransfer",
        ts(10),
        "bravo",
        vec![TransferEndpoint::vessel(sample)],
        vec![TransferEndpoint::at(well, "A01")],
    ))?;
    graph.record_transfer(TransferEvent::in_place("ShearingQC", ts(20), "lc", well))?;
    graph.record_transfer(
        TransferEvent::section(
            "EndRepair",
            ts(30),
            "bravo",
            vec![TransferEndpoint::vessel(well)],
            vec![TransferEndpoint::vessel(library)],
        )
        .with_reagents(vec![enzyme]),
    )?;
    graph.record_transfer(TransferEvent::section(
        "PoolingTransfer",
        ts(40),
        "manual",
        vec![TransferEndpoint::vessel(library)],
        vec![TransferEndpoint::vessel(lane)],
    ))?;

    println!(
        "Graph holds {} vessels and {} transfer events\n",
        graph.vessel_count(),
        graph.event_count()
    );

    // Provenance of the lane
    let provenance = ProvenanceResolver::new(&graph).resolve(lane)?;
    println!("Provenance of FLOWCELL-3-LANE-1:");
    for root in &provenance.root_samples {
        if let Some(vessel) = graph.vessel(*root) {
            println!("  root sample: {}", vessel.label());
        }
    }
    println!(
        "  workflow:    {}",
        provenance.workflow_name.as_deref().unwrap_or("(none)")
    );
    for (kind, batch_id) in &provenance.nearest_batches {
        if let Some(batch) = graph.batch(*batch_id) {
            println!("  nearest {kind} batch: {}", batch.name());
        }
    }
    println!(
        "  bucket entries: {} (nearest: {:?})",
        provenance.bucket_entries.len(),
        provenance.nearest_bucket_entry == Some(entry)
    );
    for reagent_id in &provenance.reagents {
        if let Some(reagent) = graph.reagent(*reagent_id) {
            println!("  reagent: {} lot {}", reagent.name(), reagent.lot());
        }
    }

    // Targeted questions
    println!("\nQC events upstream of the lane:");
    let wanted = vec![EventTypeName::from("ShearingQC")];
    let hits = events_matching(&graph, lane, TraversalDirection::Ancestors, &wanted)?;
    for (event_type, matches) in &hits {
        for hit in matches {
            if let Some(vessel) = graph.vessel(hit.vessel) {
                println!("  {event_type} on {} at hop {}", vessel.label(), hit.hop);
            }
        }
    }

    println!("\nAncestors of the lane, in visit order:");
    for id in ancestor_vessels(&graph, lane)? {
        if let Some(vessel) = graph.vessel(id) {
            println!("  {}", vessel.label());
        }
    }

    Ok(())
}
