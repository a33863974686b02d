//! State definitions

use serde::{Deserialize, Serialize};

/// A named lifecycle state with ordered entry and exit action lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSpec {
    /// State name, unique within the contract.
    pub name: String,
    /// Whether this is the contract's initial state.
    #[serde(default)]
    pub initial: bool,
    /// Terminal states have no expected outbound transitions and their
    /// entry actions must be safe to run more than once.
    #[serde(default)]
    pub terminal: bool,
    /// Actions run, in order, when this state is entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_actions: Vec<String>,
    /// Actions run, in order, when this state is exited.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exit_actions: Vec<String>,
}

impl StateSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: false,
            terminal: false,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
        }
    }

    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn on_entry(mut self, action: impl Into<String>) -> Self {
        self.entry_actions.push(action.into());
        self
    }

    pub fn on_exit(mut self, action: impl Into<String>) -> Self {
        self.exit_actions.push(action.into());
        self
    }
}
