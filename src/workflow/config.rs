//! Declarative workflow tables and their loader
//!
//! A workflow is data, not code: named states, one flagged as the start, and
//! transitions keyed by event-type name, each carrying the event types that
//! may legally precede it. Tables arrive as JSON from process configuration,
//! are validated once at load, and are immutable afterwards.

use crate::errors::{LineageError, LineageResult};
use crate::identifiers::{EventTypeName, StateId};
use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Serialized form of one workflow transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransitionDef {
    /// The event type this transition admits
    pub event_type: EventTypeName,
    /// State the transition leaves
    pub from: StateId,
    /// State the transition enters
    pub to: StateId,
    /// Event types that may legally precede this one; empty for start
    /// transitions
    #[serde(default)]
    pub predecessors: Vec<EventTypeName>,
}

/// Serialized form of a whole workflow table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowDef {
    /// Human-readable workflow name
    pub name: String,
    /// The state new vessels begin in
    pub start_state: StateId,
    /// Every state the workflow moves through
    pub states: Vec<StateId>,
    /// The transition table
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

/// One validated transition
///
/// Predecessors are de-duplicated and keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTransition {
    event_type: EventTypeName,
    from: StateId,
    to: StateId,
    predecessors: IndexSet<EventTypeName>,
}

impl WorkflowTransition {
    /// The event type this transition admits
    pub fn event_type(&self) -> &EventTypeName {
        &self.event_type
    }

    /// State the transition leaves
    pub fn from(&self) -> &StateId {
        &self.from
    }

    /// State the transition enters
    pub fn to(&self) -> &StateId {
        &self.to
    }

    /// Event types that may legally precede this one
    pub fn predecessors(&self) -> &IndexSet<EventTypeName> {
        &self.predecessors
    }
}

/// A validated, immutable workflow table
///
/// # Examples
///
/// ```
/// use vessel_lineage::WorkflowConfig;
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
/// assert_eq!(config.name(), "Exome Express");
/// assert_eq!(config.transitions().len(), 1);
/// # Ok::<(), vessel_lineage::LineageError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    name: String,
    start_state: StateId,
    states: IndexSet<StateId>,
    transitions: Vec<WorkflowTransition>,
}

impl WorkflowConfig {
    /// Validate a parsed definition into a usable table
    ///
    /// Rejects definitions the validator could not interpret coherently:
    /// no states, a state declared twice, a transition or start state naming
    /// an undeclared state, or a predecessor naming an event type no
    /// transition registers.
    pub fn from_def(def: WorkflowDef) -> LineageResult<Self> {
        if def.states.is_empty() {
            return Err(LineageError::EmptyWorkflow { workflow: def.name });
        }

        let mut states: IndexSet<StateId> = IndexSet::with_capacity(def.states.len());
        for state in def.states {
            if !states.insert(state.clone()) {
                return Err(LineageError::DuplicateState {
                    workflow: def.name,
                    state,
                });
            }
        }
        if !states.contains(&def.start_state) {
            return Err(LineageError::UnknownState {
                workflow: def.name,
                state: def.start_state,
            });
        }

        let registered: IndexSet<&EventTypeName> = def
            .transitions
            .iter()
            .map(|transition| &transition.event_type)
            .collect();
        for transition in &def.transitions {
            for state in [&transition.from, &transition.to] {
                if !states.contains(state) {
                    return Err(LineageError::UnknownState {
                        workflow: def.name,
                        state: state.clone(),
                    });
                }
            }
            for predecessor in &transition.predecessors {
                if !registered.contains(predecessor) {
                    return Err(LineageError::UnknownPredecessor {
                        workflow: def.name,
                        event_type: predecessor.clone(),
                    });
                }
            }
        }

        let transitions: Vec<WorkflowTransition> = def
            .transitions
            .into_iter()
            .map(|transition| WorkflowTransition {
                event_type: transition.event_type,
                from: transition.from,
                to: transition.to,
                predecessors: transition.predecessors.into_iter().collect(),
            })
            .collect();

        debug!(
            workflow = def.name.as_str(),
            states = states.len(),
            transitions = transitions.len(),
            "workflow config loaded"
        );
        Ok(Self {
            name: def.name,
            start_state: def.start_state,
            states,
            transitions,
        })
    }

    /// Parse and validate a JSON workflow definition
    pub fn from_json(json: &str) -> LineageResult<Self> {
        let def: WorkflowDef = serde_json::from_str(json)?;
        Self::from_def(def)
    }

    /// The workflow's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state new vessels begin in
    pub fn start_state(&self) -> &StateId {
        &self.start_state
    }

    /// Declared states, in declaration order
    pub fn states(&self) -> impl Iterator<Item = &StateId> {
        self.states.iter()
    }

    /// The full transition table
    pub fn transitions(&self) -> &[WorkflowTransition] {
        &self.transitions
    }

    /// Every transition registered for an event type
    ///
    /// A table may register one event type from several states; the validator
    /// unions their predecessor sets.
    pub fn transitions_for<'a>(
        &'a self,
        event_type: &'a EventTypeName,
    ) -> impl Iterator<Item = &'a WorkflowTransition> {
        self.transitions
            .iter()
            .filter(move |transition| transition.event_type() == event_type)
    }
}
