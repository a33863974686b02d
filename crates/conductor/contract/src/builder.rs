//! Programmatic contract construction
//!
//! The builder assembles the same structures the raw document form
//! carries and runs the full validation pass on `build`, so built
//! contracts honour exactly the invariants loaded contracts do.

use crate::{
    ActionSpec, Contract, ContractVersion, NodeType, RawAction, RawContract, RawState,
    RawTransition, RawVersion, SchemaResult, StateSpec, TransitionSpec,
};

/// Fluent builder for [`Contract`] values.
///
/// Used by the runtime's built-in lifecycle contracts and by tests.
#[derive(Clone, Debug)]
pub struct ContractBuilder {
    node_type: NodeType,
    version: ContractVersion,
    states: Vec<StateSpec>,
    transitions: Vec<TransitionSpec>,
    actions: Vec<ActionSpec>,
}

impl ContractBuilder {
    pub fn new(node_type: NodeType, version: ContractVersion) -> Self {
        Self {
            node_type,
            version,
            states: Vec::new(),
            transitions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn state(mut self, state: StateSpec) -> Self {
        self.states.push(state);
        self
    }

    pub fn transition(mut self, transition: TransitionSpec) -> Self {
        self.transitions.push(transition);
        self
    }

    pub fn action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    /// Validate and produce the immutable contract.
    pub fn build(self) -> SchemaResult<Contract> {
        let raw = RawContract {
            node_type: Some(self.node_type.as_str().to_string()),
            contract_version: Some(RawVersion::Structured {
                major: self.version.major,
                minor: self.version.minor,
                patch: self.version.patch,
            }),
            states: self
                .states
                .into_iter()
                .map(|s| RawState {
                    name: s.name,
                    initial: s.initial,
                    terminal: s.terminal,
                    entry_actions: s.entry_actions,
                    exit_actions: s.exit_actions,
                })
                .collect(),
            transitions: self
                .transitions
                .into_iter()
                .map(|t| RawTransition {
                    from_state: t.from_state,
                    to_state: t.to_state,
                    event: t.event,
                    actions: t.actions,
                })
                .collect(),
            actions: self
                .actions
                .into_iter()
                .map(|a| RawAction {
                    action_name: a.name,
                    action_type: a.action_type,
                    is_critical: a.is_critical,
                    timeout_ms: Some(a.timeout_ms),
                    version: Some(RawVersion::Structured {
                        major: a.version.major,
                        minor: a.version.minor,
                        patch: a.version.patch,
                    }),
                    params: a.params,
                    rollback: a.rollback,
                })
                .collect(),
            metadata: Default::default(),
        };
        Contract::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionType, TransitionSpec};

    #[test]
    fn test_builder_round_trip() {
        let contract = ContractBuilder::new(NodeType::ComputeGeneric, ContractVersion::new(1, 0, 0))
            .state(StateSpec::new("initializing").initial())
            .state(StateSpec::new("running"))
            .state(StateSpec::new("stopped").terminal().on_entry("release"))
            .action(ActionSpec::new("release", ActionType::Cleanup))
            .transition(TransitionSpec::new("initializing", "start", "running"))
            .transition(TransitionSpec::wildcard("fatal_error", "stopped"))
            .build()
            .unwrap();

        assert_eq!(contract.initial_state(), "initializing");
        assert_eq!(contract.states().len(), 3);
        assert!(contract.match_transition("running", "fatal_error").is_some());
    }

    #[test]
    fn test_builder_enforces_validation() {
        // Missing terminal state fails exactly like a loaded document.
        let result = ContractBuilder::new(NodeType::ComputeGeneric, ContractVersion::new(1, 0, 0))
            .state(StateSpec::new("only").initial())
            .build();
        assert!(result.is_err());
    }
}
