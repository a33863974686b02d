//! FSM Engine
//!
//! Interprets lifecycle contracts at runtime. The engine is split into
//! three layers, leaves first:
//!
//! - **Action Executor**: runs a single action against its effect
//!   collaborator under the action's declared deadline, classifying the
//!   outcome as success or failure. Timeouts are failures like any other;
//!   the blast radius of a failure is a function of `is_critical` alone.
//! - **Transition Engine**: matches an event against the contract,
//!   builds the ordered action list (exit ++ transition ++ entry), runs
//!   it strictly sequentially, and decides commit vs. abort vs. rollback.
//! - **FSM Instance**: one running state machine. Applies events
//!   serially (concurrent delivery is rejected with `Busy`), tracks the
//!   generation counter, and broadcasts a lifecycle notification after
//!   every committed transition.
//!
//! # Design Principles
//!
//! 1. No partial transition is ever visible: a critical failure leaves
//!    `current_state` at the source state.
//! 2. The executor never retries. Retry policy belongs to the effect
//!    implementation behind the collaborator trait.
//! 3. Collaborators are passed explicitly — there is no ambient registry.

#![deny(unsafe_code)]

pub mod context;
pub mod effects;
pub mod errors;
pub mod executor;
pub mod instance;
pub mod transition;

pub use context::ActionContext;
pub use effects::*;
pub use errors::{EngineError, EngineResult};
pub use executor::{ActionExecutor, ActionOutcome, ActionRecord, FailureCause};
pub use instance::{
    FsmInstance, InstanceId, InstanceSnapshot, LastTransition, LifecycleEvent, TransitionStatus,
};
pub use transition::{TransitionEngine, TransitionReport, TransitionResult};
