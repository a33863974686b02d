//! End-to-end orchestrator lifecycle tests using the in-memory effect
//! collaborators and real contract documents on disk.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use conductor_contract::{ContractVersion, NodeType};
use conductor_engine::{observability_topic, MemoryEffects, TransitionStatus};
use conductor_runtime::orchestrator::{GRAPH_INSTANCE, REGISTRY_INSTANCE};
use conductor_runtime::{
    lifecycle::states, DrainControl, LoadError, Orchestrator, OverallStatus, RuntimeConfig,
    RuntimeError,
};
use tempfile::TempDir;

const COMPUTE_CONTRACT: &str = r#"
node_type: COMPUTE_GENERIC
contract_version: "1.2.0"
states:
  - name: initializing
    initial: true
  - name: running
    entry_actions: [emit_running]
  - name: stopped
    terminal: true
transitions:
  - from_state: initializing
    to_state: running
    event: start
  - from_state: "*"
    to_state: stopped
    event: fatal_error
actions:
  - action_name: emit_running
    action_type: event
    timeout_ms: 5000
    params:
      event: compute.running
"#;

const BROKEN_CONTRACT: &str = r#"
node_type: REDUCER_GENERIC
contract_version: "1.0.0"
states:
  - name: a
    initial: true
  - name: done
    terminal: true
transitions:
  - from_state: a
    to_state: z
    event: go
"#;

fn write_contract(dir: &TempDir, file: &str, body: &str) {
    fs::write(dir.path().join(file), body).unwrap();
}

fn config_for(dir: &TempDir) -> RuntimeConfig {
    RuntimeConfig {
        contract_dir: dir.path().to_path_buf(),
        drain_timeout_ms: 100,
        ..RuntimeConfig::default()
    }
}

async fn started_orchestrator(dir: &TempDir, memory: &MemoryEffects) -> Orchestrator {
    let mut orchestrator = Orchestrator::new(config_for(dir), memory.bundle()).unwrap();
    orchestrator.start().await.unwrap();
    orchestrator
}

#[tokio::test]
async fn startup_sequences_instances_and_publishes_ready() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "compute.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let orchestrator = started_orchestrator(&dir, &memory).await;

    assert_eq!(orchestrator.loader_instance().current_state(), states::READY);
    assert_eq!(
        orchestrator.registry_instance().current_state(),
        states::READY
    );
    assert_eq!(orchestrator.graph_instance().current_state(), states::RUNNING);
    assert_eq!(orchestrator.registry().len(), 1);
    assert_eq!(orchestrator.health().status, OverallStatus::Ready);

    // The built-in entry actions and the final ready notification are
    // all visible on the observability topics.
    assert_eq!(
        memory
            .event_bus
            .published_on(&observability_topic("loader.ready"))
            .len(),
        1
    );
    assert_eq!(
        memory
            .event_bus
            .published_on(&observability_topic("graph.running"))
            .len(),
        1
    );
    let ready = memory
        .event_bus
        .published_on(&observability_topic("runtime.ready"));
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].payload["status"], "ready");
}

#[tokio::test]
async fn validation_failure_fans_fatal_to_all_instances() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "broken.yaml", BROKEN_CONTRACT);
    let memory = MemoryEffects::new();

    let mut orchestrator = Orchestrator::new(config_for(&dir), memory.bundle()).unwrap();
    let err = orchestrator.start().await.unwrap_err();

    match err {
        RuntimeError::Load(LoadError::Validation { path, .. }) => {
            assert!(path.ends_with("broken.yaml"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Every sibling was forced to its fatal terminal state.
    assert_eq!(orchestrator.registry_instance().current_state(), states::ERROR);
    assert_eq!(orchestrator.loader_instance().current_state(), states::FAILED);
    assert_eq!(orchestrator.graph_instance().current_state(), states::FAILED);
    assert_eq!(orchestrator.health().status, OverallStatus::Degraded);
    assert!(memory
        .event_bus
        .published_on(&observability_topic("runtime.ready"))
        .is_empty());

    // The registry's own error transition committed; the fatal re-entry
    // afterwards committed too rather than being dropped.
    let last = orchestrator
        .registry_instance()
        .snapshot()
        .last_transition
        .unwrap();
    assert_eq!(last.status, TransitionStatus::Committed);

    // Terminal entry actions alerted on the way down.
    let alerts = memory.alert_endpoint.alerts();
    assert!(alerts
        .iter()
        .any(|a| a.instance == REGISTRY_INSTANCE && a.message.contains("validation")));
    assert!(alerts.iter().any(|a| a.instance == GRAPH_INSTANCE));
}

#[tokio::test]
async fn duplicate_node_type_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "a.yaml", COMPUTE_CONTRACT);
    write_contract(&dir, "b.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let mut orchestrator = Orchestrator::new(config_for(&dir), memory.bundle()).unwrap();
    let err = orchestrator.start().await.unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::DuplicateNodeType(NodeType::ComputeGeneric))
    ));
    assert_eq!(orchestrator.health().status, OverallStatus::Degraded);
}

#[tokio::test]
async fn missing_contract_dir_aborts_startup() {
    let memory = MemoryEffects::new();
    let config = RuntimeConfig {
        contract_dir: "/no/such/dir".into(),
        ..RuntimeConfig::default()
    };

    let mut orchestrator = Orchestrator::new(config, memory.bundle()).unwrap();
    let err = orchestrator.start().await.unwrap_err();

    assert!(matches!(err, RuntimeError::Load(LoadError::Io { .. })));
    assert_eq!(orchestrator.loader_instance().current_state(), states::FAILED);
    assert_eq!(orchestrator.health().status, OverallStatus::Degraded);
}

#[tokio::test]
async fn shutdown_drains_stops_and_closes() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "compute.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let orchestrator = started_orchestrator(&dir, &memory).await;
    orchestrator.shutdown().await.unwrap();

    assert_eq!(orchestrator.graph_instance().current_state(), states::STOPPED);
    assert_eq!(orchestrator.loader_instance().current_state(), states::CLOSED);
    assert_eq!(
        orchestrator.registry_instance().current_state(),
        states::CLOSED
    );
    assert_eq!(orchestrator.health().status, OverallStatus::Stopped);

    // Stopped-state entry released the graph's owned resources.
    assert_eq!(
        memory.resource_releaser.released(),
        vec!["bus-subscriptions".to_string()]
    );
    assert_eq!(
        memory
            .event_bus
            .published_on(&observability_topic("runtime.stopped"))
            .len(),
        1
    );
}

struct NeverDrain;

#[async_trait]
impl DrainControl for NeverDrain {
    async fn wait_drained(&self) {
        std::future::pending::<()>().await;
    }
}

#[tokio::test]
async fn shutdown_proceeds_when_drain_grace_elapses() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "compute.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let mut orchestrator = Orchestrator::new(config_for(&dir), memory.bundle())
        .unwrap()
        .with_drain_control(Arc::new(NeverDrain));
    orchestrator.start().await.unwrap();
    orchestrator.shutdown().await.unwrap();

    assert_eq!(orchestrator.graph_instance().current_state(), states::STOPPED);
    assert_eq!(orchestrator.health().status, OverallStatus::Stopped);
}

#[tokio::test]
async fn shutdown_after_fatal_skips_terminal_instances() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "broken.yaml", BROKEN_CONTRACT);
    let memory = MemoryEffects::new();

    let mut orchestrator = Orchestrator::new(config_for(&dir), memory.bundle()).unwrap();
    orchestrator.start().await.unwrap_err();
    let failed_generation = orchestrator.graph_instance().generation();

    orchestrator.shutdown().await.unwrap();

    // Nothing moved: every instance already sat in a terminal state.
    assert_eq!(orchestrator.graph_instance().current_state(), states::FAILED);
    assert_eq!(orchestrator.graph_instance().generation(), failed_generation);
    assert_eq!(orchestrator.health().status, OverallStatus::Degraded);
}

#[tokio::test]
async fn spawn_node_enforces_version_compatibility() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "compute.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let orchestrator = started_orchestrator(&dir, &memory).await;

    // Loaded 1.2.0 satisfies an additive 1.0.0 request.
    let node = orchestrator
        .spawn_node("compute-0", NodeType::ComputeGeneric, &ContractVersion::new(1, 0, 0))
        .unwrap();
    assert_eq!(node.current_state(), "initializing");

    let err = orchestrator
        .spawn_node("compute-1", NodeType::ComputeGeneric, &ContractVersion::new(2, 0, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Load(LoadError::VersionMismatch { .. })
    ));
}

#[tokio::test]
async fn spawned_node_runs_its_contract() {
    let dir = tempfile::tempdir().unwrap();
    write_contract(&dir, "compute.yaml", COMPUTE_CONTRACT);
    let memory = MemoryEffects::new();

    let orchestrator = started_orchestrator(&dir, &memory).await;
    let node = orchestrator
        .spawn_node("compute-0", NodeType::ComputeGeneric, &ContractVersion::new(1, 2, 0))
        .unwrap();

    let result = node.handle("start").await.unwrap();
    assert!(result.is_committed());
    assert_eq!(node.current_state(), "running");
    assert_eq!(
        memory
            .event_bus
            .published_on(&observability_topic("compute.running"))
            .len(),
        1
    );
}
