//! Action execution context

use serde::{Deserialize, Serialize};

use crate::instance::InstanceId;

/// Context threaded through every action execution of one transition.
///
/// Carries the triggering event, the source and target state names, and
/// a correlation identifier so collaborators can stitch the actions of
/// one transition together in their own records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionContext {
    /// The instance whose transition is executing.
    pub instance_id: InstanceId,
    /// Instance name (e.g. "contract-registry"), for observability.
    pub instance_name: String,
    /// The event that triggered the transition.
    pub event: String,
    /// State being exited.
    pub source_state: String,
    /// State being entered on commit.
    pub target_state: String,
    /// Correlation identifier, one per transition attempt.
    pub correlation_id: String,
}

impl ActionContext {
    pub fn new(
        instance_id: InstanceId,
        instance_name: impl Into<String>,
        event: impl Into<String>,
        source_state: impl Into<String>,
        target_state: impl Into<String>,
    ) -> Self {
        Self {
            instance_id,
            instance_name: instance_name.into(),
            event: event.into(),
            source_state: source_state.into(),
            target_state: target_state.into(),
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}
