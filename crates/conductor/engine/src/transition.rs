//! Transition Engine
//!
//! The central state-machine algorithm: match the event, build the
//! ordered action list (exit ++ transition ++ entry), run it strictly
//! sequentially, and decide commit vs. abort vs. rollback.

use conductor_contract::{ActionSpec, Contract};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::ActionContext;
use crate::effects::Effects;
use crate::errors::{EngineError, EngineResult};
use crate::executor::{ActionExecutor, ActionRecord};
use crate::instance::InstanceId;

/// The success-path result of applying an event.
#[derive(Clone, Debug)]
pub enum TransitionResult {
    /// The transition committed; the report carries the side-effect log.
    Committed(TransitionReport),
    /// No transition matched the event from the current state. Not an
    /// error — it signals "event not applicable here".
    NoMatch,
}

impl TransitionResult {
    pub fn is_committed(&self) -> bool {
        matches!(self, TransitionResult::Committed(_))
    }
}

/// The record of one transition attempt: every action executed, in
/// order, plus any compensating executions run on abort.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionReport {
    pub event: String,
    pub from_state: String,
    pub to_state: String,
    pub correlation_id: String,
    /// Action records in execution order:
    /// `exit_actions(source) ++ transition.actions ++ entry_actions(target)`.
    pub actions: Vec<ActionRecord>,
    /// Compensating action records, reverse order of the actions that
    /// had already succeeded. Empty unless the transition aborted.
    pub rollbacks: Vec<ActionRecord>,
    /// The critical action that aborted the transition, if any.
    pub failed_action: Option<String>,
}

impl TransitionReport {
    /// Names of non-critical actions that failed without aborting.
    pub fn recovered_failures(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|r| !r.is_critical && !r.outcome.is_success())
            .map(|r| r.action.as_str())
            .collect()
    }
}

/// Drives the ordered action sequence of a single transition.
#[derive(Clone, Debug)]
pub struct TransitionEngine {
    executor: ActionExecutor,
}

impl TransitionEngine {
    pub fn new(effects: Effects) -> Self {
        Self {
            executor: ActionExecutor::new(effects),
        }
    }

    /// Apply `event` to an instance sitting in `current_state`.
    ///
    /// Pure over the instance: the caller owns the `in_transition` gate
    /// and applies the committed target state. On abort the source state
    /// is preserved by construction — no state is returned to commit.
    pub async fn run(
        &self,
        instance_id: &InstanceId,
        instance_name: &str,
        contract: &Contract,
        current_state: &str,
        event: &str,
    ) -> EngineResult<TransitionResult> {
        let Some(transition) = contract.match_transition(current_state, event) else {
            debug!(
                instance = %instance_name,
                state = %current_state,
                event = %event,
                "No transition matched"
            );
            return Ok(TransitionResult::NoMatch);
        };

        let ctx = ActionContext::new(
            instance_id.clone(),
            instance_name,
            event,
            current_state,
            transition.to_state.clone(),
        );

        let plan = self.build_plan(contract, current_state, &transition.actions, &transition.to_state)?;
        debug!(
            instance = %instance_name,
            from = %current_state,
            to = %transition.to_state,
            event = %event,
            actions = plan.len(),
            correlation_id = %ctx.correlation_id,
            "Executing transition"
        );

        let mut report = TransitionReport {
            event: event.to_string(),
            from_state: current_state.to_string(),
            to_state: transition.to_state.clone(),
            correlation_id: ctx.correlation_id.clone(),
            actions: Vec::with_capacity(plan.len()),
            rollbacks: Vec::new(),
            failed_action: None,
        };

        for action in &plan {
            let record = self.executor.execute(action, &ctx).await;
            let failed = !record.outcome.is_success();
            let critical = record.is_critical;
            report.actions.push(record);

            if failed && critical {
                report.failed_action = Some(action.name.clone());
                self.rollback(contract, &mut report, &ctx).await;
                warn!(
                    instance = %instance_name,
                    from = %current_state,
                    event = %event,
                    action = %action.name,
                    "Transition aborted by critical action"
                );
                return Err(EngineError::Aborted {
                    report: Box::new(report),
                });
            }
            // Non-critical failures are recorded and recovered locally;
            // the transition still commits.
        }

        info!(
            instance = %instance_name,
            from = %current_state,
            to = %report.to_state,
            event = %event,
            "Transition committed"
        );
        Ok(TransitionResult::Committed(report))
    }

    /// Resolve the ordered action list for this transition.
    fn build_plan<'c>(
        &self,
        contract: &'c Contract,
        source: &str,
        transition_actions: &[String],
        target: &str,
    ) -> EngineResult<Vec<&'c ActionSpec>> {
        let source_exit = contract
            .state(source)
            .map(|s| s.exit_actions.as_slice())
            .unwrap_or_default();
        let target_entry = contract
            .state(target)
            .map(|s| s.entry_actions.as_slice())
            .unwrap_or_default();

        source_exit
            .iter()
            .chain(transition_actions.iter())
            .chain(target_entry.iter())
            .map(|name| {
                contract.action(name).ok_or_else(|| {
                    EngineError::CorruptContract(format!("undefined action '{name}'"))
                })
            })
            .collect()
    }

    /// Run compensating actions for the already-succeeded actions, in
    /// reverse order. Best-effort: rollback failures are logged and
    /// recorded, never re-abort, and are not subject to the
    /// critical/non-critical rule.
    async fn rollback(
        &self,
        contract: &Contract,
        report: &mut TransitionReport,
        ctx: &ActionContext,
    ) {
        let succeeded: Vec<String> = report
            .actions
            .iter()
            .filter(|r| r.outcome.is_success())
            .map(|r| r.action.clone())
            .collect();

        for name in succeeded.iter().rev() {
            let Some(action) = contract.action(name) else {
                continue;
            };
            for compensating in &action.rollback {
                let Some(spec) = contract.action(compensating) else {
                    continue;
                };
                let record = self.executor.execute(spec, ctx).await;
                if !record.outcome.is_success() {
                    warn!(
                        instance = %ctx.instance_name,
                        action = %compensating,
                        compensates = %name,
                        "Rollback action failed; continuing"
                    );
                }
                report.rollbacks.push(record);
            }
        }
    }
}
