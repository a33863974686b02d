//! Orchestrator Runtime
//!
//! Owns the FSM instances that govern the orchestrator's own lifecycle
//! and sequences them through startup and shutdown:
//!
//! 1. **contract-loader** — discover contract documents on durable
//!    storage and parse them.
//! 2. **contract-registry** — schema-check each discovered contract;
//!    any validation failure is terminal for startup.
//! 3. **node-graph** — dependency resolution, event-bus wiring, then
//!    running; drained and stopped on shutdown.
//!
//! A `runtime.ready` notification is published once all instances
//! report a running/ready state. If any instance reports a fatal
//! condition, the orchestrator injects a wildcard `fatal_error` event
//! into all siblings so nothing is left half-initialized — which is why
//! terminal-state entry actions must be idempotent.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod lifecycle;
pub mod loader;
pub mod orchestrator;
pub mod registry;
pub mod telemetry;

pub use config::{LoggingConfig, RuntimeConfig};
pub use errors::{LoadError, RuntimeError, RuntimeResult};
pub use health::{HealthSummary, InstanceHealth, OverallStatus};
pub use lifecycle::{graph_contract, loader_contract, registry_contract};
pub use loader::{ContractLoader, ContractSource};
pub use orchestrator::{DrainControl, ImmediateDrain, Orchestrator};
pub use registry::ContractRegistry;
