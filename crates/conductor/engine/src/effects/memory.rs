//! In-memory effect collaborators
//!
//! Record every call so tests and local development can observe side
//! effects. Each implementation supports failure injection by key
//! (`poison`), and the snapshot store supports artificial latency so
//! timeout classification can be exercised.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Alert, AlertEndpoint, BusEvent, DiagnosticStore, EffectError, EffectResult, Effects, EventBus,
    LogRecord, LogSink, ResourceReleaser, SnapshotStore,
};

/// In-memory event bus recording published events per topic.
#[derive(Default)]
pub struct MemoryEventBus {
    published: Mutex<Vec<(String, BusEvent)>>,
    poisoned: Mutex<HashSet<String>>,
}

impl MemoryEventBus {
    /// Make every publish to `topic` fail.
    pub fn poison(&self, topic: impl Into<String>) {
        self.poisoned.lock().unwrap().insert(topic.into());
    }

    pub fn published(&self) -> Vec<(String, BusEvent)> {
        self.published.lock().unwrap().clone()
    }

    /// Events published under `topic`, in order.
    pub fn published_on(&self, topic: &str) -> Vec<BusEvent> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, topic: &str, event: BusEvent) -> EffectResult {
        if self.poisoned.lock().unwrap().contains(topic) {
            return Err(EffectError::Unavailable(format!("topic {topic}")));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), event));
        Ok(())
    }
}

/// In-memory structured log sink.
#[derive(Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogSink {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn write(&self, record: LogRecord) -> EffectResult {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// In-memory snapshot store with optional injected latency.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<String, serde_json::Value>>,
    poisoned: Mutex<HashSet<String>>,
    latency_ms: AtomicU64,
}

impl MemorySnapshotStore {
    pub fn poison(&self, key: impl Into<String>) {
        self.poisoned.lock().unwrap().insert(key.into());
    }

    /// Delay every persist call, to exercise action timeouts.
    pub fn set_latency_ms(&self, latency_ms: u64) {
        self.latency_ms.store(latency_ms, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.snapshots.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn persist(&self, key: &str, snapshot: serde_json::Value) -> EffectResult {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.poisoned.lock().unwrap().contains(key) {
            return Err(EffectError::Rejected(format!("snapshot key {key}")));
        }
        self.snapshots
            .lock()
            .unwrap()
            .insert(key.to_string(), snapshot);
        Ok(())
    }
}

/// In-memory diagnostic store; write-once per key.
#[derive(Default)]
pub struct MemoryDiagnosticStore {
    captures: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryDiagnosticStore {
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.captures.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.captures.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DiagnosticStore for MemoryDiagnosticStore {
    async fn capture(&self, key: &str, diagnostic: serde_json::Value) -> EffectResult {
        let mut captures = self.captures.lock().unwrap();
        if captures.contains_key(key) {
            return Err(EffectError::AlreadyCaptured(key.to_string()));
        }
        captures.insert(key.to_string(), diagnostic);
        Ok(())
    }
}

/// In-memory alert endpoint.
#[derive(Default)]
pub struct MemoryAlertEndpoint {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertEndpoint {
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertEndpoint for MemoryAlertEndpoint {
    async fn raise(&self, alert: Alert) -> EffectResult {
        self.alerts.lock().unwrap().push(alert);
        Ok(())
    }
}

/// In-memory resource releaser. Release is idempotent; every call is
/// recorded so tests can count re-entries.
#[derive(Default)]
pub struct MemoryResourceReleaser {
    released: Mutex<Vec<String>>,
    poisoned: Mutex<HashSet<String>>,
}

impl MemoryResourceReleaser {
    pub fn poison(&self, resource: impl Into<String>) {
        self.poisoned.lock().unwrap().insert(resource.into());
    }

    /// Every release call, in order (including repeats).
    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceReleaser for MemoryResourceReleaser {
    async fn release(&self, resource: &str) -> EffectResult {
        if self.poisoned.lock().unwrap().contains(resource) {
            return Err(EffectError::Rejected(format!("resource {resource}")));
        }
        self.released.lock().unwrap().push(resource.to_string());
        Ok(())
    }
}

/// The full in-memory collaborator set, with handles kept so tests can
/// inspect recorded side effects after the fact.
#[derive(Clone, Default)]
pub struct MemoryEffects {
    pub event_bus: Arc<MemoryEventBus>,
    pub log_sink: Arc<MemoryLogSink>,
    pub snapshot_store: Arc<MemorySnapshotStore>,
    pub diagnostic_store: Arc<MemoryDiagnosticStore>,
    pub alert_endpoint: Arc<MemoryAlertEndpoint>,
    pub resource_releaser: Arc<MemoryResourceReleaser>,
}

impl MemoryEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trait-object bundle handed to the executor.
    pub fn bundle(&self) -> Effects {
        Effects {
            event_bus: self.event_bus.clone(),
            log_sink: self.log_sink.clone(),
            snapshot_store: self.snapshot_store.clone(),
            diagnostic_store: self.diagnostic_store.clone(),
            alert_endpoint: self.alert_endpoint.clone(),
            resource_releaser: self.resource_releaser.clone(),
        }
    }
}
