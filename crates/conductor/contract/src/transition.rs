//! Transition definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// The source of a transition: a concrete state or the wildcard `*`.
///
/// Wildcard transitions are matched only after the exact
/// `(current_state, event)` lookup misses — an exact match always wins.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StateRef {
    Named(String),
    Any,
}

impl StateRef {
    pub fn named(name: impl Into<String>) -> Self {
        StateRef::Named(name.into())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, StateRef::Any)
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRef::Named(name) => write!(f, "{name}"),
            StateRef::Any => write!(f, "*"),
        }
    }
}

impl From<&str> for StateRef {
    fn from(s: &str) -> Self {
        if s == "*" {
            StateRef::Any
        } else {
            StateRef::Named(s.to_string())
        }
    }
}

impl Serialize for StateRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StateRef::Named(name) => serializer.serialize_str(name),
            StateRef::Any => serializer.serialize_str("*"),
        }
    }
}

impl<'de> Deserialize<'de> for StateRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(StateRef::from(s.as_str()))
    }
}

/// A transition: `(from_state, event) -> to_state` plus the ordered
/// transition-level actions run between the source's exit actions and
/// the target's entry actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub from_state: StateRef,
    pub to_state: String,
    /// The event name that triggers this transition.
    pub event: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl TransitionSpec {
    pub fn new(
        from_state: impl Into<StateRef>,
        event: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self {
            from_state: from_state.into(),
            to_state: to_state.into(),
            event: event.into(),
            actions: Vec::new(),
        }
    }

    /// A wildcard transition, matched from any current state.
    pub fn wildcard(event: impl Into<String>, to_state: impl Into<String>) -> Self {
        Self::new(StateRef::Any, event, to_state)
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

impl From<String> for StateRef {
    fn from(s: String) -> Self {
        StateRef::from(s.as_str())
    }
}
