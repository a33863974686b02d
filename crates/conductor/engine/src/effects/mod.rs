//! Effect collaborators
//!
//! Every action type is delegated to a named external collaborator. The
//! engine supplies names and payloads; transports, topic ACLs, and
//! retry policy live behind these traits.

mod memory;

pub use memory::{
    MemoryAlertEndpoint, MemoryDiagnosticStore, MemoryEffects, MemoryEventBus, MemoryLogSink,
    MemoryResourceReleaser, MemorySnapshotStore,
};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors reported by effect collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("effect rejected: {0}")]
    Rejected(String),

    #[error("diagnostic already captured: {0}")]
    AlreadyCaptured(String),
}

/// Result type alias for effect operations
pub type EffectResult = Result<(), EffectError>;

/// Topic for lifecycle observability events (open to observers).
pub fn observability_topic(event: &str) -> String {
    format!("lifecycle.observability.{event}")
}

/// Topic for command events (access-restricted; ACLs are enforced by
/// the bus, never by the engine).
pub fn command_topic(event: &str) -> String {
    format!("lifecycle.command.{event}")
}

/// An event published on the external bus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BusEvent {
    pub name: String,
    pub payload: serde_json::Value,
    pub correlation_id: String,
    pub published_at: DateTime<Utc>,
}

impl BusEvent {
    pub fn new(
        name: impl Into<String>,
        payload: serde_json::Value,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payload,
            correlation_id: correlation_id.into(),
            published_at: Utc::now(),
        }
    }
}

/// A structured record written by `logging` actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub instance: String,
    pub event: String,
    pub source_state: String,
    pub target_state: String,
    pub correlation_id: String,
    pub logged_at: DateTime<Utc>,
}

/// An alert raised by `alert` actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub instance: String,
    pub action: String,
    pub correlation_id: String,
    pub raised_at: DateTime<Utc>,
}

/// External event bus (`event` actions).
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, topic: &str, event: BusEvent) -> EffectResult;
}

/// Structured log sink (`logging` actions).
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write(&self, record: LogRecord) -> EffectResult;
}

/// Durable store for state snapshots (`persistence` actions).
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn persist(&self, key: &str, snapshot: serde_json::Value) -> EffectResult;
}

/// Diagnostic store, typically write-once (`data_capture` actions).
#[async_trait]
pub trait DiagnosticStore: Send + Sync {
    async fn capture(&self, key: &str, diagnostic: serde_json::Value) -> EffectResult;
}

/// Paging/alerting endpoint (`alert` actions).
#[async_trait]
pub trait AlertEndpoint: Send + Sync {
    async fn raise(&self, alert: Alert) -> EffectResult;
}

/// Resource release on owned handles (`cleanup` actions).
///
/// Release must be idempotent: terminal-state entry actions may run more
/// than once when several siblings force the same cleanup path.
#[async_trait]
pub trait ResourceReleaser: Send + Sync {
    async fn release(&self, resource: &str) -> EffectResult;
}

/// The bundle of collaborator handles injected into the executor.
///
/// Constructed and owned by whoever builds the instances (normally the
/// orchestrator) and passed explicitly — no ambient lookup.
#[derive(Clone)]
pub struct Effects {
    pub event_bus: Arc<dyn EventBus>,
    pub log_sink: Arc<dyn LogSink>,
    pub snapshot_store: Arc<dyn SnapshotStore>,
    pub diagnostic_store: Arc<dyn DiagnosticStore>,
    pub alert_endpoint: Arc<dyn AlertEndpoint>,
    pub resource_releaser: Arc<dyn ResourceReleaser>,
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects").finish_non_exhaustive()
    }
}
