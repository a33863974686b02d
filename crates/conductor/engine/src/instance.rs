//! FSM Instance
//!
//! One running state machine: a contract plus mutable runtime state.
//! Events are applied strictly sequentially — the `in_transition` flag
//! acts as a single-writer lock, and concurrent callers are rejected
//! with `Busy` rather than queued. Observers see a lifecycle
//! notification only after a commit, never an intermediate state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use conductor_contract::Contract;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::effects::Effects;
use crate::errors::{EngineError, EngineResult};
use crate::transition::{TransitionEngine, TransitionResult};

/// Unique identifier for an FSM instance
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the most recent transition attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionStatus {
    Committed,
    NoMatch,
    Aborted,
}

/// Summary of the most recent transition attempt, kept for health checks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LastTransition {
    pub event: String,
    pub status: TransitionStatus,
    pub at: DateTime<Utc>,
}

/// Lifecycle notifications emitted by an instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Emitted after every committed transition, never before.
    StateChanged {
        instance: InstanceId,
        name: String,
        from: String,
        to: String,
        generation: u64,
    },
}

/// Read-only point-in-time view of an instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub instance_id: InstanceId,
    pub name: String,
    pub current_state: String,
    pub generation: u64,
    pub last_transition: Option<LastTransition>,
}

struct InstanceState {
    current_state: String,
    generation: u64,
    last_transition: Option<LastTransition>,
}

/// One running state machine governed by a contract.
pub struct FsmInstance {
    id: InstanceId,
    name: String,
    contract: Arc<Contract>,
    engine: TransitionEngine,
    state: RwLock<InstanceState>,
    in_transition: AtomicBool,
    events: broadcast::Sender<LifecycleEvent>,
}

/// Clears the `in_transition` gate when the transition finishes,
/// whether by commit, abort, or panic.
struct GateGuard<'a>(&'a AtomicBool);

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FsmInstance {
    /// Create an instance sitting in the contract's initial state.
    pub fn new(name: impl Into<String>, contract: Arc<Contract>, effects: Effects) -> Self {
        let (events, _) = broadcast::channel(256);
        let current_state = contract.initial_state().to_string();
        Self {
            id: InstanceId::generate(),
            name: name.into(),
            contract,
            engine: TransitionEngine::new(effects),
            state: RwLock::new(InstanceState {
                current_state,
                generation: 0,
                last_transition: None,
            }),
            in_transition: AtomicBool::new(false),
            events,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn current_state(&self) -> String {
        self.read_state().current_state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.read_state().generation
    }

    /// Whether the instance sits in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.contract.is_terminal(&self.current_state())
    }

    /// Subscribe to lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Read-only view of current state and generation.
    pub fn snapshot(&self) -> InstanceSnapshot {
        let state = self.read_state();
        InstanceSnapshot {
            instance_id: self.id.clone(),
            name: self.name.clone(),
            current_state: state.current_state.clone(),
            generation: state.generation,
            last_transition: state.last_transition.clone(),
        }
    }

    /// Apply an event through the transition engine.
    ///
    /// Rejects with [`EngineError::Busy`] when another transition on
    /// this instance is in flight. Once action execution begins, the
    /// transition runs to commit or abort; it cannot be cancelled
    /// externally except by its own action timeouts.
    pub async fn handle(&self, event: &str) -> EngineResult<TransitionResult> {
        if self
            .in_transition
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::Busy);
        }
        let _gate = GateGuard(&self.in_transition);

        let current = self.current_state();
        let result = self
            .engine
            .run(&self.id, &self.name, &self.contract, &current, event)
            .await;

        let now = Utc::now();
        match &result {
            Ok(TransitionResult::Committed(report)) => {
                let generation = {
                    let mut state = self.write_state();
                    state.current_state = report.to_state.clone();
                    state.generation += 1;
                    state.last_transition = Some(LastTransition {
                        event: event.to_string(),
                        status: TransitionStatus::Committed,
                        at: now,
                    });
                    state.generation
                };
                // Send after the write lock is released; observers never
                // see a notification ahead of the committed state.
                let _ = self.events.send(LifecycleEvent::StateChanged {
                    instance: self.id.clone(),
                    name: self.name.clone(),
                    from: report.from_state.clone(),
                    to: report.to_state.clone(),
                    generation,
                });
            }
            Ok(TransitionResult::NoMatch) => {
                self.write_state().last_transition = Some(LastTransition {
                    event: event.to_string(),
                    status: TransitionStatus::NoMatch,
                    at: now,
                });
            }
            Err(EngineError::Aborted { .. }) => {
                self.write_state().last_transition = Some(LastTransition {
                    event: event.to_string(),
                    status: TransitionStatus::Aborted,
                    at: now,
                });
            }
            Err(_) => {}
        }

        result
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, InstanceState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, InstanceState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for FsmInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("FsmInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("current_state", &state.current_state)
            .field("generation", &state.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MemoryEffects;
    use conductor_contract::{
        ActionSpec, ActionType, ContractBuilder, ContractVersion, NodeType, StateSpec,
        TransitionSpec,
    };

    fn make_contract() -> Arc<Contract> {
        Arc::new(
            ContractBuilder::new(NodeType::ComputeGeneric, ContractVersion::new(1, 0, 0))
                .state(StateSpec::new("initializing").initial())
                .state(StateSpec::new("running"))
                .state(StateSpec::new("stopped").terminal())
                .action(ActionSpec::new("log_start", ActionType::Logging))
                .transition(
                    TransitionSpec::new("initializing", "start", "running")
                        .with_action("log_start"),
                )
                .transition(TransitionSpec::wildcard("fatal_error", "stopped"))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_starts_in_initial_state() {
        let instance =
            FsmInstance::new("compute-0", make_contract(), MemoryEffects::new().bundle());
        assert_eq!(instance.current_state(), "initializing");
        assert_eq!(instance.generation(), 0);
        assert!(!instance.is_terminal());
    }

    #[tokio::test]
    async fn test_commit_advances_state_and_generation() {
        let instance =
            FsmInstance::new("compute-0", make_contract(), MemoryEffects::new().bundle());
        let result = instance.handle("start").await.unwrap();
        assert!(result.is_committed());
        assert_eq!(instance.current_state(), "running");
        assert_eq!(instance.generation(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_a_no_op() {
        let instance =
            FsmInstance::new("compute-0", make_contract(), MemoryEffects::new().bundle());
        let result = instance.handle("no_such_event").await.unwrap();
        assert!(matches!(result, TransitionResult::NoMatch));
        assert_eq!(instance.current_state(), "initializing");
        assert_eq!(instance.generation(), 0);
        let snapshot = instance.snapshot();
        assert_eq!(
            snapshot.last_transition.unwrap().status,
            TransitionStatus::NoMatch
        );
    }

    #[tokio::test]
    async fn test_state_changed_emitted_after_commit() {
        let instance =
            FsmInstance::new("compute-0", make_contract(), MemoryEffects::new().bundle());
        let mut events = instance.subscribe();
        instance.handle("start").await.unwrap();

        let LifecycleEvent::StateChanged {
            from,
            to,
            generation,
            ..
        } = events.try_recv().unwrap();
        assert_eq!(from, "initializing");
        assert_eq!(to, "running");
        assert_eq!(generation, 1);
    }

    #[tokio::test]
    async fn test_wildcard_reaches_terminal_from_any_state() {
        let instance =
            FsmInstance::new("compute-0", make_contract(), MemoryEffects::new().bundle());
        instance.handle("start").await.unwrap();
        instance.handle("fatal_error").await.unwrap();
        assert_eq!(instance.current_state(), "stopped");
        assert!(instance.is_terminal());
        assert_eq!(instance.generation(), 2);
    }
}
