//! Built-in lifecycle contracts
//!
//! The orchestrator's own instances are governed by contracts like any
//! other node — the runtime interprets these rather than hard-coding
//! its lifecycle. All built-in actions are non-critical: the built-in
//! machines must always be able to reach their terminal states.

use conductor_contract::{
    ActionSpec, ActionType, Contract, ContractBuilder, ContractVersion, NodeType, SchemaResult,
    StateSpec, TransitionSpec,
};

/// State names used by the built-in contracts.
pub mod states {
    pub const IDLE: &str = "idle";
    pub const DISCOVERING: &str = "discovering";
    pub const VALIDATING: &str = "validating";
    pub const READY: &str = "ready";
    pub const ERROR: &str = "error";
    pub const INITIALIZING: &str = "initializing";
    pub const WIRING: &str = "wiring";
    pub const RUNNING: &str = "running";
    pub const DRAINING: &str = "draining";
    pub const STOPPED: &str = "stopped";
    pub const FAILED: &str = "failed";
    pub const CLOSED: &str = "closed";
}

/// Event names injected by the orchestrator.
pub mod events {
    pub const DISCOVER: &str = "discover";
    pub const CONTRACTS_DISCOVERED: &str = "contracts_discovered";
    pub const BEGIN_VALIDATION: &str = "begin_validation";
    pub const VALIDATION_PASSED: &str = "validation_passed";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const WIRE: &str = "wire";
    pub const START: &str = "start";
    pub const SHUTDOWN_REQUESTED: &str = "shutdown_requested";
    pub const DRAINED: &str = "drained";
    pub const FATAL_ERROR: &str = "fatal_error";
}

fn version() -> ContractVersion {
    ContractVersion::new(1, 0, 0)
}

/// Contract for the contract-loader instance:
/// `idle → discovering → ready`, with wildcard fatal and shutdown exits.
pub fn loader_contract() -> SchemaResult<Contract> {
    ContractBuilder::new(NodeType::OrchestratorGeneric, version())
        .state(StateSpec::new(states::IDLE).initial())
        .state(StateSpec::new(states::DISCOVERING))
        .state(StateSpec::new(states::READY).on_entry("emit_loader_ready"))
        .state(StateSpec::new(states::FAILED).terminal().on_entry("alert_loader_failed"))
        .state(StateSpec::new(states::CLOSED).terminal())
        .action(
            ActionSpec::new("emit_loader_ready", ActionType::Event)
                .with_param("event", "loader.ready"),
        )
        .action(
            ActionSpec::new("alert_loader_failed", ActionType::Alert)
                .with_param("message", "contract discovery failed"),
        )
        .action(
            ActionSpec::new("log_discovery", ActionType::Logging)
                .with_param("message", "contract discovery started"),
        )
        .transition(
            TransitionSpec::new(states::IDLE, events::DISCOVER, states::DISCOVERING)
                .with_action("log_discovery"),
        )
        .transition(TransitionSpec::new(
            states::DISCOVERING,
            events::CONTRACTS_DISCOVERED,
            states::READY,
        ))
        .transition(TransitionSpec::wildcard(events::FATAL_ERROR, states::FAILED))
        .transition(TransitionSpec::wildcard(
            events::SHUTDOWN_REQUESTED,
            states::CLOSED,
        ))
        .build()
}

/// Contract for the contract-registry instance:
/// `idle → validating → ready | error`, error terminal and re-enterable.
pub fn registry_contract() -> SchemaResult<Contract> {
    ContractBuilder::new(NodeType::OrchestratorGeneric, version())
        .state(StateSpec::new(states::IDLE).initial())
        .state(StateSpec::new(states::VALIDATING))
        .state(StateSpec::new(states::READY).on_entry("emit_registry_ready"))
        .state(
            StateSpec::new(states::ERROR)
                .terminal()
                .on_entry("alert_validation_failed"),
        )
        .state(StateSpec::new(states::CLOSED).terminal())
        .action(
            ActionSpec::new("emit_registry_ready", ActionType::Event)
                .with_param("event", "registry.ready"),
        )
        .action(
            ActionSpec::new("alert_validation_failed", ActionType::Alert)
                .with_param("message", "contract validation failed"),
        )
        .action(
            ActionSpec::new("log_validation", ActionType::Logging)
                .with_param("message", "contract validation started"),
        )
        .transition(
            TransitionSpec::new(states::IDLE, events::BEGIN_VALIDATION, states::VALIDATING)
                .with_action("log_validation"),
        )
        .transition(TransitionSpec::new(
            states::VALIDATING,
            events::VALIDATION_PASSED,
            states::READY,
        ))
        .transition(TransitionSpec::new(
            states::VALIDATING,
            events::VALIDATION_FAILED,
            states::ERROR,
        ))
        .transition(TransitionSpec::wildcard(events::FATAL_ERROR, states::ERROR))
        .transition(TransitionSpec::wildcard(
            events::SHUTDOWN_REQUESTED,
            states::CLOSED,
        ))
        .build()
}

/// Contract for the node-graph instance:
/// `initializing → wiring → running`, drained to `stopped` on shutdown,
/// wildcard fatal to `failed`.
pub fn graph_contract() -> SchemaResult<Contract> {
    ContractBuilder::new(NodeType::OrchestratorGeneric, version())
        .state(StateSpec::new(states::INITIALIZING).initial())
        .state(StateSpec::new(states::WIRING).on_entry("emit_graph_wiring"))
        .state(
            StateSpec::new(states::RUNNING)
                .on_entry("emit_graph_running")
                .on_exit("persist_topology"),
        )
        .state(StateSpec::new(states::DRAINING).on_entry("emit_graph_draining"))
        .state(
            StateSpec::new(states::STOPPED)
                .terminal()
                .on_entry("release_subscriptions"),
        )
        .state(
            StateSpec::new(states::FAILED)
                .terminal()
                .on_entry("release_subscriptions")
                .on_entry("alert_graph_failed"),
        )
        .action(
            ActionSpec::new("emit_graph_wiring", ActionType::Event)
                .with_param("event", "graph.wiring"),
        )
        .action(
            ActionSpec::new("emit_graph_running", ActionType::Event)
                .with_param("event", "graph.running"),
        )
        .action(
            ActionSpec::new("emit_graph_draining", ActionType::Event)
                .with_param("event", "graph.draining"),
        )
        .action(
            ActionSpec::new("persist_topology", ActionType::Persistence)
                .with_param("key", "node-graph-topology"),
        )
        .action(
            ActionSpec::new("release_subscriptions", ActionType::Cleanup)
                .with_param("resource", "bus-subscriptions"),
        )
        .action(
            ActionSpec::new("alert_graph_failed", ActionType::Alert)
                .with_param("message", "node graph entered failed state"),
        )
        .transition(TransitionSpec::new(
            states::INITIALIZING,
            events::WIRE,
            states::WIRING,
        ))
        .transition(TransitionSpec::new(
            states::WIRING,
            events::START,
            states::RUNNING,
        ))
        .transition(TransitionSpec::new(
            states::DRAINING,
            events::DRAINED,
            states::STOPPED,
        ))
        .transition(TransitionSpec::wildcard(
            events::SHUTDOWN_REQUESTED,
            states::DRAINING,
        ))
        .transition(TransitionSpec::wildcard(events::FATAL_ERROR, states::FAILED))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contracts_validate() {
        assert!(loader_contract().is_ok());
        assert!(registry_contract().is_ok());
        assert!(graph_contract().is_ok());
    }

    #[test]
    fn test_graph_wildcards_reach_terminal_states() {
        let contract = graph_contract().unwrap();
        for state in [states::INITIALIZING, states::WIRING, states::RUNNING] {
            let fatal = contract.match_transition(state, events::FATAL_ERROR).unwrap();
            assert_eq!(fatal.to_state, states::FAILED);
            let drain = contract
                .match_transition(state, events::SHUTDOWN_REQUESTED)
                .unwrap();
            assert_eq!(drain.to_state, states::DRAINING);
        }
    }
}
