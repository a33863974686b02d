//! Error types for contract validation

/// Errors raised while validating a raw contract document.
///
/// Every variant is a load-time failure: a contract that produces a
/// `SchemaError` never reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("malformed contract version: {0}")]
    MalformedVersion(String),

    #[error("duplicate state: {0}")]
    DuplicateState(String),

    #[error("duplicate action definition: {0}")]
    DuplicateAction(String),

    #[error("duplicate action '{action}' in {list} of {owner}")]
    DuplicateActionRef {
        action: String,
        list: &'static str,
        owner: String,
    },

    #[error("contract has no states")]
    NoStates,

    #[error("contract must declare exactly one initial state")]
    NoInitialState,

    #[error("multiple initial states: {0} and {1}")]
    MultipleInitialStates(String, String),

    #[error("contract must declare at least one terminal state")]
    NoTerminalState,

    #[error("transition references undeclared state: {0}")]
    UnknownState(String),

    #[error("{owner} references undefined action: {action}")]
    UnknownAction { owner: String, action: String },

    #[error("ambiguous transitions: two transitions from '{from}' on event '{event}'")]
    AmbiguousTransition { from: String, event: String },

    #[error("action '{action}' has invalid timeout: {timeout_ms}ms (must be > 0)")]
    InvalidTimeout { action: String, timeout_ms: u64 },

    #[error("failed to parse contract document: {0}")]
    Parse(String),
}

/// Result type alias for contract validation
pub type SchemaResult<T> = Result<T, SchemaError>;
