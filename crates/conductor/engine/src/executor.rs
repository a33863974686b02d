//! Action Executor
//!
//! Runs a single action against its effect collaborator under the
//! action's declared deadline. A timeout is classified exactly like a
//! reported failure — criticality, not cause, decides the blast radius.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use conductor_contract::{ActionSpec, ActionType};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::context::ActionContext;
use crate::effects::{
    command_topic, observability_topic, Alert, BusEvent, EffectResult, Effects, LogRecord,
};

/// The classified result of one action execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Success,
    Failure(FailureCause),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

/// Why an action failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    /// The deadline elapsed before the effect completed.
    Timeout,
    /// The effect itself reported failure.
    Effect(String),
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Timeout => write!(f, "timeout"),
            FailureCause::Effect(reason) => write!(f, "{reason}"),
        }
    }
}

/// The record of one action execution, kept in the transition report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    pub action_type: ActionType,
    pub is_critical: bool,
    pub outcome: ActionOutcome,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

/// Executes single actions with timeout enforcement.
///
/// The executor performs no retries: retry policy, if any, belongs to
/// the collaborator behind the trait.
#[derive(Clone, Debug)]
pub struct ActionExecutor {
    effects: Effects,
}

impl ActionExecutor {
    pub fn new(effects: Effects) -> Self {
        Self { effects }
    }

    /// Run one action under its deadline and classify the outcome.
    pub async fn execute(&self, action: &ActionSpec, ctx: &ActionContext) -> ActionRecord {
        let executed_at = Utc::now();
        let started = Instant::now();
        let deadline = Duration::from_millis(action.timeout_ms);

        let outcome = match tokio::time::timeout(deadline, self.run_effect(action, ctx)).await {
            Ok(Ok(())) => ActionOutcome::Success,
            Ok(Err(e)) => ActionOutcome::Failure(FailureCause::Effect(e.to_string())),
            Err(_) => ActionOutcome::Failure(FailureCause::Timeout),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            ActionOutcome::Success => {
                debug!(
                    instance = %ctx.instance_name,
                    action = %action.name,
                    action_type = %action.action_type,
                    duration_ms,
                    "Action completed"
                );
            }
            ActionOutcome::Failure(cause) => {
                warn!(
                    instance = %ctx.instance_name,
                    action = %action.name,
                    action_type = %action.action_type,
                    critical = action.is_critical,
                    %cause,
                    duration_ms,
                    "Action failed"
                );
            }
        }

        ActionRecord {
            action: action.name.clone(),
            action_type: action.action_type,
            is_critical: action.is_critical,
            outcome,
            duration_ms,
            executed_at,
        }
    }

    /// Dispatch the action's declared effect to its collaborator.
    async fn run_effect(&self, action: &ActionSpec, ctx: &ActionContext) -> EffectResult {
        match action.action_type {
            ActionType::Event => {
                let name = action
                    .params
                    .get("event")
                    .cloned()
                    .unwrap_or_else(|| action.name.clone());
                // An explicit topic wins; otherwise the `tier` param
                // selects between the command and observability
                // conventions, defaulting to observability.
                let topic = match action.params.get("topic") {
                    Some(topic) => topic.clone(),
                    None => match action.params.get("tier").map(String::as_str) {
                        Some("command") => command_topic(&name),
                        _ => observability_topic(&name),
                    },
                };
                let payload = json!({
                    "instance": ctx.instance_name,
                    "event": ctx.event,
                    "source_state": ctx.source_state,
                    "target_state": ctx.target_state,
                });
                let event = BusEvent::new(name, payload, ctx.correlation_id.clone());
                self.effects.event_bus.publish(&topic, event).await
            }
            ActionType::Logging => {
                let message = action
                    .params
                    .get("message")
                    .cloned()
                    .unwrap_or_else(|| action.name.clone());
                self.effects
                    .log_sink
                    .write(LogRecord {
                        message,
                        instance: ctx.instance_name.clone(),
                        event: ctx.event.clone(),
                        source_state: ctx.source_state.clone(),
                        target_state: ctx.target_state.clone(),
                        correlation_id: ctx.correlation_id.clone(),
                        logged_at: Utc::now(),
                    })
                    .await
            }
            ActionType::Persistence => {
                let key = action
                    .params
                    .get("key")
                    .cloned()
                    .unwrap_or_else(|| ctx.instance_name.clone());
                let snapshot = json!({
                    "instance": ctx.instance_name,
                    "state": ctx.target_state,
                    "event": ctx.event,
                    "correlation_id": ctx.correlation_id,
                });
                self.effects.snapshot_store.persist(&key, snapshot).await
            }
            ActionType::DataCapture => {
                let key = action
                    .params
                    .get("key")
                    .cloned()
                    .unwrap_or_else(|| format!("{}-{}", ctx.instance_name, ctx.correlation_id));
                let diagnostic = json!({
                    "instance": ctx.instance_name,
                    "event": ctx.event,
                    "source_state": ctx.source_state,
                    "target_state": ctx.target_state,
                });
                self.effects
                    .diagnostic_store
                    .capture(&key, diagnostic)
                    .await
            }
            ActionType::Alert => {
                let message = action
                    .params
                    .get("message")
                    .cloned()
                    .unwrap_or_else(|| format!("lifecycle alert from {}", ctx.instance_name));
                self.effects
                    .alert_endpoint
                    .raise(Alert {
                        message,
                        instance: ctx.instance_name.clone(),
                        action: action.name.clone(),
                        correlation_id: ctx.correlation_id.clone(),
                        raised_at: Utc::now(),
                    })
                    .await
            }
            ActionType::Cleanup => {
                let resource = action
                    .params
                    .get("resource")
                    .cloned()
                    .unwrap_or_else(|| action.name.clone());
                self.effects.resource_releaser.release(&resource).await
            }
        }
    }
}
