//! Health reporting
//!
//! The health summary is derived purely from instance snapshots; it
//! never drives transitions. Degraded reflects a fatal terminal state
//! somewhere, Stopped a completed shutdown.

use chrono::{DateTime, Utc};
use conductor_engine::{InstanceSnapshot, LastTransition};
use serde::{Deserialize, Serialize};

use crate::lifecycle::states;

/// Aggregate status of the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Startup sequencing in progress.
    Starting,
    /// Loader and registry ready, node graph running.
    Ready,
    /// At least one instance sits in a fatal terminal state.
    Degraded,
    /// The node graph drained and stopped.
    Stopped,
}

/// Health view of a single instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstanceHealth {
    pub name: String,
    pub current_state: String,
    pub generation: u64,
    pub last_transition: Option<LastTransition>,
}

impl From<InstanceSnapshot> for InstanceHealth {
    fn from(snapshot: InstanceSnapshot) -> Self {
        Self {
            name: snapshot.name,
            current_state: snapshot.current_state,
            generation: snapshot.generation,
            last_transition: snapshot.last_transition,
        }
    }
}

/// Point-in-time health summary across the built-in instances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: OverallStatus,
    pub checked_at: DateTime<Utc>,
    pub instances: Vec<InstanceHealth>,
}

impl HealthSummary {
    /// Derive the summary from the three built-in instance snapshots.
    pub fn derive(
        loader: InstanceSnapshot,
        registry: InstanceSnapshot,
        graph: InstanceSnapshot,
    ) -> Self {
        let status = overall(&loader, &registry, &graph);
        Self {
            status,
            checked_at: Utc::now(),
            instances: vec![loader.into(), registry.into(), graph.into()],
        }
    }

    pub fn instance(&self, name: &str) -> Option<&InstanceHealth> {
        self.instances.iter().find(|i| i.name == name)
    }
}

fn overall(
    loader: &InstanceSnapshot,
    registry: &InstanceSnapshot,
    graph: &InstanceSnapshot,
) -> OverallStatus {
    let fatal = loader.current_state == states::FAILED
        || registry.current_state == states::ERROR
        || graph.current_state == states::FAILED;
    if fatal {
        return OverallStatus::Degraded;
    }
    if graph.current_state == states::STOPPED {
        return OverallStatus::Stopped;
    }
    if loader.current_state == states::READY
        && registry.current_state == states::READY
        && graph.current_state == states::RUNNING
    {
        return OverallStatus::Ready;
    }
    OverallStatus::Starting
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_engine::InstanceId;

    fn snap(name: &str, state: &str) -> InstanceSnapshot {
        InstanceSnapshot {
            instance_id: InstanceId::generate(),
            name: name.to_string(),
            current_state: state.to_string(),
            generation: 0,
            last_transition: None,
        }
    }

    #[test]
    fn test_ready_when_all_instances_up() {
        let summary = HealthSummary::derive(
            snap("contract-loader", states::READY),
            snap("contract-registry", states::READY),
            snap("node-graph", states::RUNNING),
        );
        assert_eq!(summary.status, OverallStatus::Ready);
    }

    #[test]
    fn test_degraded_beats_stopped() {
        let summary = HealthSummary::derive(
            snap("contract-loader", states::FAILED),
            snap("contract-registry", states::CLOSED),
            snap("node-graph", states::STOPPED),
        );
        assert_eq!(summary.status, OverallStatus::Degraded);
    }

    #[test]
    fn test_stopped_after_drain() {
        let summary = HealthSummary::derive(
            snap("contract-loader", states::CLOSED),
            snap("contract-registry", states::CLOSED),
            snap("node-graph", states::STOPPED),
        );
        assert_eq!(summary.status, OverallStatus::Stopped);
    }

    #[test]
    fn test_starting_until_graph_runs() {
        let summary = HealthSummary::derive(
            snap("contract-loader", states::READY),
            snap("contract-registry", states::VALIDATING),
            snap("node-graph", states::INITIALIZING),
        );
        assert_eq!(summary.status, OverallStatus::Starting);
    }
}
