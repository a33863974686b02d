//! The validated contract
//!
//! A `Contract` can only be obtained through validation (or the builder,
//! which validates on `build`). Its lookup tables are precomputed: an
//! exact `(state, event)` table and a secondary wildcard table keyed by
//! event only, consulted when the exact lookup misses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ActionSpec, ContractVersion, RawContract, SchemaResult, StateSpec, TransitionSpec};

/// The kind of node a contract governs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    OrchestratorGeneric,
    ReducerGeneric,
    EffectGeneric,
    ComputeGeneric,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::OrchestratorGeneric => "ORCHESTRATOR_GENERIC",
            NodeType::ReducerGeneric => "REDUCER_GENERIC",
            NodeType::EffectGeneric => "EFFECT_GENERIC",
            NodeType::ComputeGeneric => "COMPUTE_GENERIC",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated lifecycle contract. Immutable once constructed; a reload
/// produces a new value.
#[derive(Clone, Debug, Serialize)]
pub struct Contract {
    pub(crate) node_type: NodeType,
    pub(crate) version: ContractVersion,
    pub(crate) initial_state: String,
    pub(crate) states: Vec<StateSpec>,
    pub(crate) transitions: Vec<TransitionSpec>,
    pub(crate) actions: HashMap<String, ActionSpec>,
    /// `(from_state, event)` -> index into `transitions`.
    #[serde(skip)]
    pub(crate) exact: HashMap<(String, String), usize>,
    /// `event` -> index into `transitions`, wildcard sources only.
    #[serde(skip)]
    pub(crate) wildcard: HashMap<String, usize>,
}

impl Contract {
    /// Validate a raw document into a contract.
    pub fn from_raw(raw: RawContract) -> SchemaResult<Self> {
        crate::validate::validate(raw)
    }

    /// Validate a contract from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> SchemaResult<Self> {
        let raw: RawContract = serde_json::from_value(value)
            .map_err(|e| crate::SchemaError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// Validate a contract from a YAML source document.
    pub fn from_yaml_str(source: &str) -> SchemaResult<Self> {
        let raw: RawContract =
            serde_yaml::from_str(source).map_err(|e| crate::SchemaError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn version(&self) -> ContractVersion {
        self.version
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// States in declaration order.
    pub fn states(&self) -> &[StateSpec] {
        &self.states
    }

    pub fn transitions(&self) -> &[TransitionSpec] {
        &self.transitions
    }

    pub fn state(&self, name: &str) -> Option<&StateSpec> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.get(name)
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.state(state).map(|s| s.terminal).unwrap_or(false)
    }

    /// Match an event against the transition tables.
    ///
    /// Exact `(current_state, event)` first; the wildcard table only when
    /// that misses. Returns `None` when the event is not applicable from
    /// the current state.
    pub fn match_transition(&self, current_state: &str, event: &str) -> Option<&TransitionSpec> {
        if let Some(&idx) = self
            .exact
            .get(&(current_state.to_string(), event.to_string()))
        {
            return Some(&self.transitions[idx]);
        }
        self.wildcard.get(event).map(|&idx| &self.transitions[idx])
    }
}
