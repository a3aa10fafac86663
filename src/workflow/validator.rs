// Copyright 2025 the vessel-lineage authors.

//! Event-ordering validation against recorded vessel history
//!
//! The validator answers one question: given what has already been recorded
//! against these vessels, is the proposed event type a legal next step? It
//! reports every problem it finds as a plain string and leaves the decision
//! to abort or merely warn with the caller, so one incoming lab message can
//! surface every offending vessel at once instead of failing on the first.

use crate::errors::{LineageError, LineageResult};
use crate::graph::TransferGraph;
use crate::identifiers::{EventTypeName, VesselId};
use crate::workflow::config::WorkflowConfig;
use indexmap::IndexSet;
use tracing::debug;

fn join<'a>(names: impl IntoIterator<Item = &'a EventTypeName>) -> String {
    names
        .into_iter()
        .map(EventTypeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validates proposed events against a workflow table and recorded history
///
/// Business-rule violations are returned as strings, never as errors; the
/// `Err` side of [`validate`](TransitionValidator::validate) is reserved for
/// data-integrity problems such as a vessel id the graph does not know.
///
/// # Examples
///
/// ```
/// use vessel_lineage::{
///     ContainerKind, EventTypeName, LineageGraph, TransitionValidator, Vessel, WorkflowConfig,
/// };
///
/// let config = WorkflowConfig::from_json(
///     r#"{
///         "name": "Exome Express",
///         "start_state": "Start",
///         "states": ["Start", "Shearing"],
///         "transitions": [
///             { "event_type": "SampleReceipt", "from": "Start", "to": "Shearing" }
///         ]
///     }"#,
/// )?;
///
/// let mut graph = LineageGraph::new();
/// let tube = graph.add_vessel(Vessel::new("SM-1", ContainerKind::Tube))?;
///
/// let validator = TransitionValidator::new(&graph, &config);
/// let problems = validator.validate(&[tube], &EventTypeName::from("SampleReceipt"))?;
/// assert!(problems.is_empty());
/// # Ok::<(), vessel_lineage::LineageError>(())
/// ```
pub struct TransitionValidator<'g, G: TransferGraph + ?Sized> {
    graph: &'g G,
    config: &'g WorkflowConfig,
}

impl<'g, G: TransferGraph + ?Sized> TransitionValidator<'g, G> {
    /// Create a validator over a graph and a loaded workflow table
    pub fn new(graph: &'g G, config: &'g WorkflowConfig) -> Self {
        Self { graph, config }
    }

    /// Check whether `proposed` is a legal next event for every vessel
    ///
    /// Returns the accumulated problem list across all vessels; empty means
    /// valid. A vessel can contribute two problems at once when the proposed
    /// event both already occurred and has no satisfied predecessor.
    pub fn validate(
        &self,
        vessels: &[VesselId],
        proposed: &EventTypeName,
    ) -> LineageResult<Vec<String>> {
        let matching: Vec<_> = self.config.transitions_for(proposed).collect();
        if matching.is_empty() {
            return Ok(vec![format!(
                "no transition is registered for event type '{proposed}' in workflow '{}'",
                self.config.name()
            )]);
        }

        let mut valid_predecessors: IndexSet<&EventTypeName> = IndexSet::new();
        let mut is_start_transition = false;
        for transition in &matching {
            valid_predecessors.extend(transition.predecessors().iter());
            if transition.from() == self.config.start_state() {
                is_start_transition = true;
            }
        }

        let mut problems = Vec::new();
        for vessel in vessels {
            let label = self
                .graph
                .vessel(*vessel)
                .ok_or(LineageError::VesselNotFound { id: *vessel })?
                .label()
                .to_string();
            let recorded = self.recorded_event_types(*vessel)?;

            if recorded.contains(proposed) {
                problems.push(format!(
                    "event '{proposed}' has already occurred for vessel '{label}'"
                ));
            }

            let predecessor_satisfied = recorded
                .iter()
                .any(|event_type| valid_predecessors.contains(event_type));
            if predecessor_satisfied || (is_start_transition && recorded.is_empty()) {
                continue;
            }
            problems.push(format!(
                "vessel '{label}' has events [{}] but none are valid predecessors to \
                 '{proposed}': expected one of [{}]",
                join(&recorded),
                join(valid_predecessors.iter().copied()),
            ));
        }

        debug!(
            workflow = self.config.name(),
            event_type = %proposed,
            vessels = vessels.len(),
            problems = problems.len(),
            "transition validated"
        );
        Ok(problems)
    }

    /// Every event type directly recorded against a vessel
    ///
    /// A shallow scan of the vessel's own history: its in-place events plus
    /// every section transfer it sources or receives. No ancestor or
    /// descendant walk; workflow ordering is judged on what happened to this
    /// vessel, not to its lineage.
    fn recorded_event_types(&self, vessel: VesselId) -> LineageResult<IndexSet<EventTypeName>> {
        let mut recorded = IndexSet::new();
        let history = self
            .graph
            .in_place(vessel)
            .iter()
            .chain(self.graph.incoming(vessel))
            .chain(self.graph.outgoing(vessel));
        for event_id in history {
            let event = self
                .graph
                .event(*event_id)
                .ok_or(LineageError::EventNotFound { id: *event_id })?;
            recorded.insert(event.event_type().clone());
        }
        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TransferEndpoint, TransferEvent};
    use crate::graph::LineageGraph;
    use crate::identifiers::StateId;
    use crate::vessel::{ContainerKind, Vessel};
    use crate::workflow::config::{TransitionDef, WorkflowDef};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, minute, 0).unwrap()
    }

    fn config() -> WorkflowConfig {
        WorkflowConfig::from_def(WorkflowDef {
            name: "Exome Express".to_string(),
            start_state: StateId::from("Start"),
            states: vec![
                StateId::from("Start"),
                StateId::from("Shearing"),
                StateId::from("ShearingCleanup"),
                StateId::from("LibraryConstruction"),
            ],
            transitions: vec![
                TransitionDef {
                    event_type: EventTypeName::from("SampleReceipt"),
                    from: StateId::from("Start"),
                    to: StateId::from("Shearing"),
                    predecessors: Vec::new(),
                },
                TransitionDef {
                    event_type: EventTypeName::from("ShearingTransfer"),
                    from: StateId::from("Shearing"),
                    to: StateId::from("ShearingCleanup"),
                    predecessors: vec![EventTypeName::from("SampleReceipt")],
                },
                TransitionDef {
                    event_type: EventTypeName::from("PostShearingTransferCleanup"),
                    from: StateId::from("ShearingCleanup"),
                    to: StateId::from("LibraryConstruction"),
                    predecessors: vec![EventTypeName::from("ShearingTransfer")],
                },
                TransitionDef {
                    event_type: EventTypeName::from("EndRepair"),
                    from: StateId::from("LibraryConstruction"),
                    to: StateId::from("LibraryConstruction"),
                    predecessors: vec![EventTypeName::from("PostShearingTransferCleanup")],
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_start_event_on_empty_history_passes() {
        let mut graph = LineageGraph::new();
        let tube = graph
            .add_vessel(Vessel::new("SM-1", ContainerKind::Tube))
            .unwrap();
        let config = config();
        let validator = TransitionValidator::new(&graph, &config);

        let problems = validator
            .validate(&[tube], &EventTypeName::from("SampleReceipt"))
            .unwrap();
        assert!(problems.is_empty());
    }

    #[test]
    fn test_out_of_order_event_reports_expected_predecessors() {
        let mut graph = LineageGraph::new();
        let sheared = graph
            .add_vessel(Vessel::new("SH-1", ContainerKind::Tube))
            .unwrap();
        let library = graph
            .add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))
            .unwrap();
        graph
            .record_transfer(TransferEvent::section(
                "ShearingTransfer",
                ts(0),
                "bravo",
                vec![TransferEndpoint::vessel(sheared)],
                vec![TransferEndpoint::vessel(library)],
            ))
            .unwrap();

        let config = config();
        let validator = TransitionValidator::new(&graph, &config);
        // the cleanup step was skipped
        let problems = validator
            .validate(&[library], &EventTypeName::from("EndRepair"))
            .unwrap();

        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("LIB-1"));
        assert!(problems[0].contains("ShearingTransfer"));
        assert!(problems[0].contains("expected one of [PostShearingTransferCleanup]"));
    }

    #[test]
    fn test_duplicate_event_reports_already_occurred() {
        let mut graph = LineageGraph::new();
        let library = graph
            .add_vessel(Vessel::new("LIB-1", ContainerKind::Tube))
            .unwrap();
        graph
            .record_transfer(TransferEvent::in_place("EndRepair", ts(0), "bravo", library))
            .unwrap();

        let config = config();
        let validator = TransitionValidator::new(&graph, &config);
        let problems = validator
            .validate(&[library], &EventTypeName::from("EndRepair"))
            .unwrap();

        // duplicate guard and predecessor check both fire
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("already occurred for vessel 'LIB-1'"));
        assert!(problems[1].contains("none are valid predecessors"));
    }

    #[test]
    fn test_satisfied_predecessor_passes_despite_other_history() {
        let mut graph = LineageGraph::new();
        let sheared = graph
            .add_vessel(Vessel::new("SH-1", ContainerKind::Tube))
            .unwrap();
        graph
            .record_transfer(TransferEvent::in_place(
                "ShearingTransfer",
                ts(0),
                "bravo",
                sheared,
            ))
            .unwrap();
        graph
            .record_transfer(TransferEvent::in_place("ShearingQC", ts(1), "lc", sheared))
            .unwrap();

        let config = config();
        let validator = TransitionValidator::new(&graph, &config);
        let problems = validator
            .validate(
                &[sheared],
                &EventTypeName::from("PostShearingTransferCleanup"),
            )
            .unwrap();
        assert!(problems.is_empty());
    }

    #[test]
    fn test_each_offending_vessel_is_named() {
        let mut graph = LineageGraph::new();
        let ready = graph
            .add_vessel(Vessel::new("READY", ContainerKind::Tube))
            .unwrap();
        let stale = graph
            .add_vessel(Vessel::new("STALE", ContainerKind::Tube))
            .unwrap();
        graph
            .record_transfer(TransferEvent::in_place("SampleReceipt", ts(0), "lc", ready))
            .unwrap();

        let config = config();
        let validator = TransitionValidator::new(&graph, &config);
        let problems = validator
            .validate(&[ready, stale], &EventTypeName::from("ShearingTransfer"))
            .unwrap();

        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("STALE"));
        assert!(!problems[0].contains("READY"));
    }

    #[test]
    fn test_unknown_event_type_is_a_single_problem() {
        let mut graph = LineageGraph::new();
        let tube = graph
            .add_vessel(Vessel::new("SM-1", ContainerKind::Tube))
            .unwrap();
        let config = config();
        let validator = TransitionValidator::new(&graph, &config);

        let problems = validator
            .validate(&[tube, tube], &EventTypeName::from("BaitAddition"))
            .unwrap();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("no transition is registered"));
        assert!(problems[0].contains("BaitAddition"));
    }

    #[test]
    fn test_unknown_vessel_is_fatal() {
        let graph = LineageGraph::new();
        let ghost = VesselId::new();
        let config = config();
        let validator = TransitionValidator::new(&graph, &config);

        let err = validator
            .validate(&[ghost], &EventTypeName::from("SampleReceipt"))
            .unwrap_err();
        assert_eq!(err, LineageError::VesselNotFound { id: ghost });
    }
}
