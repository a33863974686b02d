//! Orchestrator
//!
//! Sequences the built-in instances through startup (discover →
//! validate → wire → run) and shutdown (drain → stop), publishes the
//! `runtime.ready` notification, and fans a `fatal_error` out to every
//! sibling when any phase fails so nothing is left half-initialized.

use std::sync::Arc;

use async_trait::async_trait;
use conductor_contract::{Contract, ContractVersion, NodeType};
use conductor_engine::{
    observability_topic, BusEvent, Effects, EngineError, FsmInstance, TransitionResult,
};
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::errors::{LoadError, RuntimeError, RuntimeResult};
use crate::health::HealthSummary;
use crate::lifecycle::{self, events};
use crate::loader::ContractLoader;
use crate::registry::ContractRegistry;

pub const LOADER_INSTANCE: &str = "contract-loader";
pub const REGISTRY_INSTANCE: &str = "contract-registry";
pub const GRAPH_INSTANCE: &str = "node-graph";

/// Hook for in-flight work during shutdown. The orchestrator waits on
/// `wait_drained` for at most the configured grace period, then
/// proceeds regardless.
#[async_trait]
pub trait DrainControl: Send + Sync {
    async fn wait_drained(&self);
}

/// Drain control with no in-flight work to wait for.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateDrain;

#[async_trait]
impl DrainControl for ImmediateDrain {
    async fn wait_drained(&self) {}
}

/// Owns the built-in instances and the contract registry.
pub struct Orchestrator {
    config: RuntimeConfig,
    effects: Effects,
    loader: ContractLoader,
    registry: ContractRegistry,
    loader_fsm: Arc<FsmInstance>,
    registry_fsm: Arc<FsmInstance>,
    graph_fsm: Arc<FsmInstance>,
    drain: Arc<dyn DrainControl>,
}

impl Orchestrator {
    /// Build the orchestrator with its three built-in instances, each
    /// sitting in its contract's initial state. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(config: RuntimeConfig, effects: Effects) -> RuntimeResult<Self> {
        let loader = ContractLoader::new(&config.contract_dir);
        let loader_fsm = Arc::new(FsmInstance::new(
            LOADER_INSTANCE,
            Arc::new(lifecycle::loader_contract()?),
            effects.clone(),
        ));
        let registry_fsm = Arc::new(FsmInstance::new(
            REGISTRY_INSTANCE,
            Arc::new(lifecycle::registry_contract()?),
            effects.clone(),
        ));
        let graph_fsm = Arc::new(FsmInstance::new(
            GRAPH_INSTANCE,
            Arc::new(lifecycle::graph_contract()?),
            effects.clone(),
        ));
        Ok(Self {
            config,
            effects,
            loader,
            registry: ContractRegistry::new(),
            loader_fsm,
            registry_fsm,
            graph_fsm,
            drain: Arc::new(ImmediateDrain),
        })
    }

    /// Replace the drain hook. Call before `start`.
    pub fn with_drain_control(mut self, drain: Arc<dyn DrainControl>) -> Self {
        self.drain = drain;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn loader_instance(&self) -> &Arc<FsmInstance> {
        &self.loader_fsm
    }

    pub fn registry_instance(&self) -> &Arc<FsmInstance> {
        &self.registry_fsm
    }

    pub fn graph_instance(&self) -> &Arc<FsmInstance> {
        &self.graph_fsm
    }

    /// Run the startup sequence to completion.
    ///
    /// Phases run strictly in order; a failure in any phase fans a
    /// `fatal_error` out to every built-in instance and returns the
    /// first actionable error. Startup is never retried automatically.
    pub async fn start(&mut self) -> RuntimeResult<()> {
        info!(
            contract_dir = %self.loader.dir().display(),
            "Starting orchestrator"
        );

        // Phase 1: discovery.
        self.drive(&self.loader_fsm, events::DISCOVER).await?;
        let sources = match self.loader.discover() {
            Ok(sources) => sources,
            Err(err) => {
                error!(error = %err, "Contract discovery failed");
                self.escalate_fatal("contract discovery failed").await;
                return Err(err.into());
            }
        };
        self.drive(&self.loader_fsm, events::CONTRACTS_DISCOVERED)
            .await?;

        // Phase 2: validation. Each discovered document is individually
        // schema-checked; the first failure is terminal for startup.
        self.drive(&self.registry_fsm, events::BEGIN_VALIDATION)
            .await?;
        for source in sources {
            let registered = Contract::from_raw(source.raw)
                .map_err(|e| LoadError::Validation {
                    path: source.path.clone(),
                    source: e,
                })
                .and_then(|contract| self.registry.register(contract));
            if let Err(err) = registered {
                error!(path = %source.path.display(), error = %err, "Contract rejected");
                match self.registry_fsm.handle(events::VALIDATION_FAILED).await {
                    Ok(_) => {}
                    Err(delivery) => warn!(
                        instance = %self.registry_fsm.name(),
                        error = %delivery,
                        "Validation-failed delivery did not commit"
                    ),
                }
                self.escalate_fatal("contract validation failed").await;
                return Err(err.into());
            }
            debug!(path = %source.path.display(), "Contract registered");
        }
        self.drive(&self.registry_fsm, events::VALIDATION_PASSED)
            .await?;

        // Phase 3: node graph.
        self.drive(&self.graph_fsm, events::WIRE).await?;
        self.drive(&self.graph_fsm, events::START).await?;

        self.publish_runtime_event("runtime.ready").await;
        info!(contracts = self.registry.len(), "Orchestrator ready");
        Ok(())
    }

    /// Run the shutdown sequence: request drain on the node graph, wait
    /// at most the configured grace period for in-flight work, then
    /// stop and close the remaining instances. Already-terminal
    /// instances are skipped, so shutdown after a fatal is a no-op for
    /// the failed instance.
    pub async fn shutdown(&self) -> RuntimeResult<()> {
        info!("Shutting down orchestrator");

        if !self.graph_fsm.is_terminal() {
            self.drive(&self.graph_fsm, events::SHUTDOWN_REQUESTED)
                .await?;
            let grace = self.config.drain_timeout();
            if tokio::time::timeout(grace, self.drain.wait_drained())
                .await
                .is_err()
            {
                warn!(
                    timeout_ms = self.config.drain_timeout_ms,
                    "Drain grace period elapsed; stopping anyway"
                );
            }
            self.drive(&self.graph_fsm, events::DRAINED).await?;
        }

        for instance in [&self.loader_fsm, &self.registry_fsm] {
            if !instance.is_terminal() {
                self.drive(instance, events::SHUTDOWN_REQUESTED).await?;
            }
        }

        self.publish_runtime_event("runtime.stopped").await;
        info!("Orchestrator stopped");
        Ok(())
    }

    /// Fan a `fatal_error` out to every built-in instance. Safe to call
    /// more than once: wildcard re-entry into a terminal state is
    /// idempotent, and instances without a match simply report no-match.
    pub async fn escalate_fatal(&self, reason: &str) {
        error!(reason = %reason, "Escalating fatal condition to all instances");
        for instance in [&self.loader_fsm, &self.registry_fsm, &self.graph_fsm] {
            match instance.handle(events::FATAL_ERROR).await {
                Ok(_) => {}
                Err(err) => warn!(
                    instance = %instance.name(),
                    error = %err,
                    "Fatal fan-out delivery failed"
                ),
            }
        }
    }

    /// Point-in-time health across the built-in instances.
    pub fn health(&self) -> HealthSummary {
        HealthSummary::derive(
            self.loader_fsm.snapshot(),
            self.registry_fsm.snapshot(),
            self.graph_fsm.snapshot(),
        )
    }

    /// Create a node instance from a registered contract. The loaded
    /// contract must be version-compatible with `requested`.
    pub fn spawn_node(
        &self,
        name: impl Into<String>,
        node_type: NodeType,
        requested: &ContractVersion,
    ) -> RuntimeResult<Arc<FsmInstance>> {
        let contract = self.registry.get(node_type, requested)?;
        let instance = Arc::new(FsmInstance::new(name, contract, self.effects.clone()));
        info!(
            instance = %instance.name(),
            node_type = %node_type,
            version = %requested,
            "Spawned node instance"
        );
        Ok(instance)
    }

    /// Map an instance's transition result onto runtime errors. The
    /// built-in contracts cover every sequenced event, so a no-match
    /// here means the sequence and the contract disagree.
    async fn drive(&self, instance: &FsmInstance, event: &str) -> RuntimeResult<()> {
        match instance.handle(event).await {
            Ok(TransitionResult::Committed(_)) => Ok(()),
            Ok(TransitionResult::NoMatch) => Err(RuntimeError::EventNotApplicable {
                instance: instance.name().to_string(),
                event: event.to_string(),
            }),
            Err(EngineError::Busy) => Err(RuntimeError::InstanceBusy {
                instance: instance.name().to_string(),
            }),
            Err(EngineError::Aborted { report }) => {
                let action = report.failed_action.clone().unwrap_or_default();
                self.escalate_fatal("startup transition aborted").await;
                Err(RuntimeError::StartupAborted {
                    instance: instance.name().to_string(),
                    action,
                })
            }
            Err(source) => Err(RuntimeError::Engine {
                instance: instance.name().to_string(),
                source,
            }),
        }
    }

    async fn publish_runtime_event(&self, name: &str) {
        let health = self.health();
        let payload = match serde_json::to_value(&health) {
            Ok(value) => value,
            Err(_) => serde_json::Value::Null,
        };
        let event = BusEvent::new(name, payload, uuid::Uuid::new_v4().to_string());
        if let Err(err) = self
            .effects
            .event_bus
            .publish(&observability_topic(name), event)
            .await
        {
            warn!(event = %name, error = %err, "Runtime notification not published");
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("contract_dir", &self.config.contract_dir)
            .field("contracts", &self.registry.len())
            .finish_non_exhaustive()
    }
}
