//! Validation: raw documents into contracts
//!
//! Validation happens after parsing and is pure — it never touches the
//! filesystem or network. It catches documents that are syntactically
//! valid but semantically wrong: dangling state references, ambiguous
//! transitions, missing initial or terminal states.

use std::collections::{HashMap, HashSet};

use crate::{
    ActionSpec, Contract, ContractVersion, NodeType, RawContract, RawVersion, SchemaError,
    SchemaResult, StateRef, StateSpec, TransitionSpec,
};

/// Validate a raw contract document, producing the immutable [`Contract`].
pub fn validate(raw: RawContract) -> SchemaResult<Contract> {
    let node_type = parse_node_type(&raw)?;
    let version = parse_version(raw.contract_version.as_ref(), "contract_version")?;
    let actions = collect_actions(&raw)?;
    let states = collect_states(&raw)?;
    let initial_state = find_initial_state(&states)?;
    validate_has_terminal_state(&states)?;
    validate_action_refs(&states, &raw, &actions)?;

    let transitions: Vec<TransitionSpec> = raw
        .transitions
        .iter()
        .map(|t| TransitionSpec {
            from_state: t.from_state.clone(),
            to_state: t.to_state.clone(),
            event: t.event.clone(),
            actions: t.actions.clone(),
        })
        .collect();
    validate_transition_states(&transitions, &states)?;

    let (exact, wildcard) = build_lookup_tables(&transitions)?;

    Ok(Contract {
        node_type,
        version,
        initial_state,
        states,
        transitions,
        actions,
        exact,
        wildcard,
    })
}

fn parse_node_type(raw: &RawContract) -> SchemaResult<NodeType> {
    let name = raw
        .node_type
        .as_deref()
        .ok_or(SchemaError::MissingField("node_type"))?;
    match name {
        "ORCHESTRATOR_GENERIC" => Ok(NodeType::OrchestratorGeneric),
        "REDUCER_GENERIC" => Ok(NodeType::ReducerGeneric),
        "EFFECT_GENERIC" => Ok(NodeType::EffectGeneric),
        "COMPUTE_GENERIC" => Ok(NodeType::ComputeGeneric),
        other => Err(SchemaError::UnknownNodeType(other.to_string())),
    }
}

fn parse_version(
    raw: Option<&RawVersion>,
    field: &'static str,
) -> SchemaResult<ContractVersion> {
    match raw {
        None => Err(SchemaError::MissingField(field)),
        Some(RawVersion::Structured {
            major,
            minor,
            patch,
        }) => Ok(ContractVersion::new(*major, *minor, *patch)),
        Some(RawVersion::Text(s)) => s.parse(),
    }
}

fn collect_actions(raw: &RawContract) -> SchemaResult<HashMap<String, ActionSpec>> {
    let mut actions = HashMap::new();
    for a in &raw.actions {
        let timeout_ms = a
            .timeout_ms
            .ok_or(SchemaError::MissingField("timeout_ms"))?;
        if timeout_ms == 0 {
            return Err(SchemaError::InvalidTimeout {
                action: a.action_name.clone(),
                timeout_ms,
            });
        }
        let version = match a.version.as_ref() {
            Some(v) => parse_version(Some(v), "action version")?,
            None => ContractVersion::new(1, 0, 0),
        };
        let spec = ActionSpec {
            name: a.action_name.clone(),
            action_type: a.action_type,
            is_critical: a.is_critical,
            timeout_ms,
            version,
            params: a.params.clone(),
            rollback: a.rollback.clone(),
        };
        if actions.insert(a.action_name.clone(), spec).is_some() {
            return Err(SchemaError::DuplicateAction(a.action_name.clone()));
        }
    }
    // Rollback lists reference action definitions too.
    let names: HashSet<String> = actions.keys().cloned().collect();
    for action in actions.values() {
        for r in &action.rollback {
            if !names.contains(r) {
                return Err(SchemaError::UnknownAction {
                    owner: format!("rollback of action '{}'", action.name),
                    action: r.clone(),
                });
            }
        }
    }
    Ok(actions)
}

fn collect_states(raw: &RawContract) -> SchemaResult<Vec<StateSpec>> {
    if raw.states.is_empty() {
        return Err(SchemaError::NoStates);
    }
    let mut seen = HashSet::new();
    let mut states = Vec::with_capacity(raw.states.len());
    for s in &raw.states {
        if !seen.insert(s.name.clone()) {
            return Err(SchemaError::DuplicateState(s.name.clone()));
        }
        states.push(StateSpec {
            name: s.name.clone(),
            initial: s.initial,
            terminal: s.terminal,
            entry_actions: s.entry_actions.clone(),
            exit_actions: s.exit_actions.clone(),
        });
    }
    Ok(states)
}

fn find_initial_state(states: &[StateSpec]) -> SchemaResult<String> {
    let mut initial = None;
    for s in states.iter().filter(|s| s.initial) {
        match initial {
            None => initial = Some(s.name.clone()),
            Some(ref first) => {
                return Err(SchemaError::MultipleInitialStates(
                    first.clone(),
                    s.name.clone(),
                ))
            }
        }
    }
    initial.ok_or(SchemaError::NoInitialState)
}

fn validate_has_terminal_state(states: &[StateSpec]) -> SchemaResult<()> {
    if !states.iter().any(|s| s.terminal) {
        return Err(SchemaError::NoTerminalState);
    }
    Ok(())
}

fn validate_action_refs(
    states: &[StateSpec],
    raw: &RawContract,
    actions: &HashMap<String, ActionSpec>,
) -> SchemaResult<()> {
    for s in states {
        check_action_list(&s.entry_actions, "entry_actions", &s.name, actions)?;
        check_action_list(&s.exit_actions, "exit_actions", &s.name, actions)?;
    }
    for t in &raw.transitions {
        let owner = format!("transition {} -> {}", t.from_state, t.to_state);
        check_action_list(&t.actions, "actions", &owner, actions)?;
    }
    Ok(())
}

fn check_action_list(
    list: &[String],
    list_name: &'static str,
    owner: &str,
    actions: &HashMap<String, ActionSpec>,
) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for name in list {
        if !actions.contains_key(name) {
            return Err(SchemaError::UnknownAction {
                owner: owner.to_string(),
                action: name.clone(),
            });
        }
        // Names are unique within their owning list; the same name may
        // appear in other lists and refers to the same definition.
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateActionRef {
                action: name.clone(),
                list: list_name,
                owner: owner.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_transition_states(
    transitions: &[TransitionSpec],
    states: &[StateSpec],
) -> SchemaResult<()> {
    let names: HashSet<&str> = states.iter().map(|s| s.name.as_str()).collect();
    for t in transitions {
        if let StateRef::Named(from) = &t.from_state {
            if !names.contains(from.as_str()) {
                return Err(SchemaError::UnknownState(from.clone()));
            }
        }
        if !names.contains(t.to_state.as_str()) {
            return Err(SchemaError::UnknownState(t.to_state.clone()));
        }
    }
    Ok(())
}

type LookupTables = (
    HashMap<(String, String), usize>,
    HashMap<String, usize>,
);

fn build_lookup_tables(transitions: &[TransitionSpec]) -> SchemaResult<LookupTables> {
    let mut exact = HashMap::new();
    let mut wildcard = HashMap::new();
    for (idx, t) in transitions.iter().enumerate() {
        match &t.from_state {
            StateRef::Named(from) => {
                let key = (from.clone(), t.event.clone());
                if exact.insert(key, idx).is_some() {
                    return Err(SchemaError::AmbiguousTransition {
                        from: from.clone(),
                        event: t.event.clone(),
                    });
                }
            }
            StateRef::Any => {
                if wildcard.insert(t.event.clone(), idx).is_some() {
                    return Err(SchemaError::AmbiguousTransition {
                        from: "*".to_string(),
                        event: t.event.clone(),
                    });
                }
            }
        }
    }
    Ok((exact, wildcard))
}
