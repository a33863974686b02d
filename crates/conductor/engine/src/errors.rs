//! Error types for the engine

use crate::transition::TransitionReport;

/// Errors surfaced to callers of the engine.
///
/// `NoMatch` is deliberately not here: an event with no applicable
/// transition is a no-op signal, not a failure, and is returned as a
/// success-path result variant.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An event was delivered while another transition on the same
    /// instance was in flight. The caller must retry or queue upstream.
    #[error("instance busy: a transition is already in flight")]
    Busy,

    /// A critical action failed; the transition was aborted and the
    /// source state preserved. The report carries the partial results.
    #[error("transition aborted by critical action '{}'", .report.failed_action.as_deref().unwrap_or("<unknown>"))]
    Aborted { report: Box<TransitionReport> },

    /// A validated contract referenced something the engine could not
    /// resolve. Indicates an invariant breach, not an operator error.
    #[error("contract invariant breached: {0}")]
    CorruptContract(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
