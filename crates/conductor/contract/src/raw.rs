//! Raw contract documents
//!
//! The serde representation of a contract source document, before
//! validation. The loader hands these over after parsing; malformed
//! documents never reach the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ActionType, StateRef};

/// An unvalidated contract document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawContract {
    pub node_type: Option<String>,
    pub contract_version: Option<RawVersion>,
    #[serde(default)]
    pub states: Vec<RawState>,
    #[serde(default)]
    pub transitions: Vec<RawTransition>,
    #[serde(default)]
    pub actions: Vec<RawAction>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Version as authored: either the structured form or a "1.2.3" string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVersion {
    Structured { major: u64, minor: u64, patch: u64 },
    Text(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawState {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub entry_actions: Vec<String>,
    #[serde(default)]
    pub exit_actions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawTransition {
    pub from_state: StateRef,
    pub to_state: String,
    pub event: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawAction {
    pub action_name: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub is_critical: bool,
    pub timeout_ms: Option<u64>,
    pub version: Option<RawVersion>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub rollback: Vec<String>,
}
