//! Action definitions
//!
//! Actions are defined once per contract and referenced by name from
//! state entry/exit lists and transition action lists.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ContractVersion;

/// The kind of side effect an action performs.
///
/// Each kind is delegated to a named external collaborator; the engine
/// supplies the event name and payload, never the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Publish to the external event bus.
    Event,
    /// Write to the structured log sink.
    Logging,
    /// Persist a state snapshot to the durable store.
    Persistence,
    /// Capture a diagnostic record (typically write-once).
    DataCapture,
    /// Raise an alert on the paging endpoint.
    Alert,
    /// Release an owned resource handle.
    Cleanup,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Event => "event",
            ActionType::Logging => "logging",
            ActionType::Persistence => "persistence",
            ActionType::DataCapture => "data_capture",
            ActionType::Alert => "alert",
            ActionType::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single action definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Unique name within the contract.
    pub name: String,
    /// Which collaborator runs this action.
    pub action_type: ActionType,
    /// Whether failure of this action aborts its enclosing transition.
    pub is_critical: bool,
    /// Deadline for a single execution. Must be > 0.
    pub timeout_ms: u64,
    /// Version of the action semantics, for compatibility checking.
    pub version: ContractVersion,
    /// Effect parameters (e.g. event topic, snapshot key, resource name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
    /// Compensating actions run (reverse order, best-effort) when a
    /// later critical action aborts the transition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rollback: Vec<String>,
}

impl ActionSpec {
    /// Create a non-critical action with a default 5s deadline.
    pub fn new(name: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            name: name.into(),
            action_type,
            is_critical: false,
            timeout_ms: 5_000,
            version: ContractVersion::new(1, 0, 0),
            params: HashMap::new(),
            rollback: Vec::new(),
        }
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_version(mut self, version: ContractVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_rollback(mut self, action: impl Into<String>) -> Self {
        self.rollback.push(action.into());
        self
    }
}
