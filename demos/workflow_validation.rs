//! # Workflow Validation
//!
//! This example demonstrates:
//! - Loading a declarative workflow table from JSON
//! - Validating proposed events against recorded vessel history
//! - How one incoming message surfaces every offending vessel at once

use chrono::{DateTime, Duration, TimeZone, Utc};
use vessel_lineage::{
    ContainerKind, EventTypeName, LineageGraph, TransferEvent, TransitionValidator, Vessel,
    WorkflowConfig,
};

const WORKFLOW_JSON: &str = r#"{
    "name": "Exome Express",
    "start_state": "Start",
    "states": ["Start", "Shearing", "ShearingCleanup", "LibraryConstruction"],
    "transitions": [
        { "event_type": "SampleReceipt", "from": "Start", "to": "Shearing" },
        { "event_type": "ShearingTransfer", "from": "Shearing", "to": "ShearingCleanup",
          "predecessors": ["SampleReceipt"] },
        { "event_type": "PostShearingTransferCleanup", "from": "ShearingCleanup", "to": "LibraryConstruction",
          "predecessors": ["ShearingTransfer"] },
        { "event_type": "EndRepair", "from": "LibraryConstruction", "to": "LibraryConstruction",
          "predecessors": ["PostShearingTransferCleanup"] }
    ]
}"#;

fn ts(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Workflow Transition Validation ===\n");

    let config = WorkflowConfig::from_json(WORKFLOW_JSON)?;
    println!(
        "Loaded workflow '{}' with {} transitions\n",
        config.name(),
        config.transitions().len()
    );

    let mut graph = LineageGraph::new();

    // One tube followed the process, one skipped the cleanup step, and one
    // just arrived
    let diligent = graph.add_vessel(Vessel::new("LIB-GOOD", ContainerKind::Tube))?;
    let hasty = graph.add_vessel(Vessel::new("LIB-HASTY", ContainerKind::Tube))?;
    let fresh = graph.add_vessel(Vessel::new("SM-NEW", ContainerKind::Tube))?;
    for (minute, event_type) in [
        "SampleReceipt",
        "ShearingTransfer",
        "PostShearingTransferCleanup",
    ]
    .iter()
    .enumerate()
    {
        graph.record_transfer(TransferEvent::in_place(
            *event_type,
            ts(minute as i64),
            "bravo",
            diligent,
        ))?;
    }
    for (minute, event_type) in ["SampleReceipt", "ShearingTransfer"].iter().enumerate() {
        graph.record_transfer(TransferEvent::in_place(
            *event_type,
            ts(minute as i64),
            "bravo",
            hasty,
        ))?;
    }

    let validator = TransitionValidator::new(&graph, &config);

    let proposed = EventTypeName::from("EndRepair");
    println!("Proposing '{proposed}' for both tubes:");
    let problems = validator.validate(&[diligent, hasty], &proposed)?;
    if problems.is_empty() {
        println!("  all vessels pass");
    }
    for problem in &problems {
        println!("  problem: {problem}");
    }

    // A start event needs no history at all
    let receipt = EventTypeName::from("SampleReceipt");
    let problems = validator.validate(&[fresh], &receipt)?;
    println!("\nProposing '{receipt}' for a brand-new tube: {} problems", problems.len());

    // An event type the workflow has never heard of
    let unknown = EventTypeName::from("BaitAddition");
    for problem in validator.validate(&[fresh], &unknown)? {
        println!("problem: {problem}");
    }

    Ok(())
}
