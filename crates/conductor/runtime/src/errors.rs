//! Error types for the runtime

use std::path::PathBuf;

use conductor_contract::{ContractVersion, NodeType, SchemaError};
use conductor_engine::EngineError;

/// Errors raised while loading and registering contracts.
///
/// All of these are load-time failures: version mismatches between a
/// wiring request and a loaded contract surface here, never at runtime.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read contract directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse contract {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("contract {path} failed validation: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("duplicate contract for node type {0}")]
    DuplicateNodeType(NodeType),

    #[error("no contract loaded for node type {0}")]
    NotFound(NodeType),

    #[error("version mismatch for {node_type}: requested {requested}, loaded {loaded}")]
    VersionMismatch {
        node_type: NodeType,
        requested: ContractVersion,
        loaded: ContractVersion,
    },
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A critical action aborted a startup transition. Startup halts;
    /// the orchestrator does not retry automatically.
    #[error("startup aborted in instance '{instance}' by action '{action}'")]
    StartupAborted { instance: String, action: String },

    /// An instance rejected a sequenced event because a transition was
    /// already in flight. Indicates an external caller raced startup.
    #[error("instance '{instance}' is busy")]
    InstanceBusy { instance: String },

    /// A sequenced event had no applicable transition — the built-in
    /// lifecycle contract does not cover the instance's current state.
    #[error("event '{event}' not applicable to instance '{instance}'")]
    EventNotApplicable { instance: String, event: String },

    /// A built-in lifecycle contract failed validation.
    #[error("built-in lifecycle contract invalid: {0}")]
    Lifecycle(#[from] SchemaError),

    #[error("engine error in instance '{instance}': {source}")]
    Engine {
        instance: String,
        #[source]
        source: EngineError,
    },
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
