//! Lifecycle Contract Model
//!
//! A contract is a declarative description of a node's lifecycle: its
//! states, the transitions between them, and the ordered actions each
//! transition runs. The runtime interprets contracts rather than
//! hard-coding lifecycle logic per node type.
//!
//! # Key Concepts
//!
//! - **Contract**: the validated, immutable blueprint. Identifies a node
//!   by [`NodeType`] and [`ContractVersion`], owns states, transitions,
//!   and action definitions.
//! - **StateSpec**: a named state with ordered entry/exit action lists.
//!   Exactly one state per contract is initial; at least one is terminal.
//! - **TransitionSpec**: `(from_state, event) -> to_state` plus the ordered
//!   transition-level actions. The source may be the wildcard `*`,
//!   meaning "any current state".
//! - **ActionSpec**: a named effect with a criticality flag, a per-action
//!   timeout, and an optional compensating (rollback) action list.
//!
//! # Design Principles
//!
//! 1. Contracts are pure data. Validation never touches the filesystem
//!    or network — raw document discovery and parsing is the loader's job.
//! 2. A contract is immutable once validated. A reload produces a new
//!    `Contract` value, never an in-place mutation.
//! 3. Ambiguity is a load-time error. Two transitions on the same
//!    `(from_state, event)` pair fail validation; the engine never makes
//!    a runtime choice between them.

#![deny(unsafe_code)]

mod action;
mod builder;
mod contract;
mod errors;
mod raw;
mod state;
mod transition;
mod validate;
mod version;

pub use action::*;
pub use builder::*;
pub use contract::*;
pub use errors::*;
pub use raw::*;
pub use state::*;
pub use transition::*;
pub use version::*;
