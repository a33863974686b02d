//! Contract Registry
//!
//! Holds the validated contract per node type. Wiring requests resolve
//! through `get`, which enforces the additive-only version rule: a
//! mismatch is a load-time error, never a runtime one.

use std::collections::HashMap;
use std::sync::Arc;

use conductor_contract::{Contract, ContractVersion, NodeType};

use crate::errors::LoadError;

/// Registry of validated contracts, keyed by node type.
#[derive(Clone, Debug, Default)]
pub struct ContractRegistry {
    contracts: HashMap<NodeType, Arc<Contract>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validated contract. One contract per node type; a
    /// reload replaces the registry wholesale rather than mutating it.
    pub fn register(&mut self, contract: Contract) -> Result<(), LoadError> {
        let node_type = contract.node_type();
        if self.contracts.contains_key(&node_type) {
            return Err(LoadError::DuplicateNodeType(node_type));
        }
        self.contracts.insert(node_type, Arc::new(contract));
        Ok(())
    }

    /// Resolve a wiring request: the loaded contract for `node_type`
    /// must be version-compatible with `requested`.
    pub fn get(
        &self,
        node_type: NodeType,
        requested: &ContractVersion,
    ) -> Result<Arc<Contract>, LoadError> {
        let contract = self
            .contracts
            .get(&node_type)
            .ok_or(LoadError::NotFound(node_type))?;
        if !contract.version().is_compatible_with(requested) {
            return Err(LoadError::VersionMismatch {
                node_type,
                requested: *requested,
                loaded: contract.version(),
            });
        }
        Ok(contract.clone())
    }

    pub fn contains(&self, node_type: NodeType) -> bool {
        self.contracts.contains_key(&node_type)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_contract::{ContractBuilder, StateSpec, TransitionSpec};

    fn make_contract(node_type: NodeType, version: ContractVersion) -> Contract {
        ContractBuilder::new(node_type, version)
            .state(StateSpec::new("idle").initial())
            .state(StateSpec::new("done").terminal())
            .transition(TransitionSpec::new("idle", "finish", "done"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ContractRegistry::new();
        registry
            .register(make_contract(
                NodeType::ComputeGeneric,
                ContractVersion::new(1, 3, 0),
            ))
            .unwrap();

        let contract = registry
            .get(NodeType::ComputeGeneric, &ContractVersion::new(1, 1, 0))
            .unwrap();
        assert_eq!(contract.version(), ContractVersion::new(1, 3, 0));
    }

    #[test]
    fn test_duplicate_node_type_rejected() {
        let mut registry = ContractRegistry::new();
        registry
            .register(make_contract(
                NodeType::ComputeGeneric,
                ContractVersion::new(1, 0, 0),
            ))
            .unwrap();
        let err = registry
            .register(make_contract(
                NodeType::ComputeGeneric,
                ContractVersion::new(1, 1, 0),
            ))
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateNodeType(_)));
    }

    #[test]
    fn test_version_mismatch_is_load_time_error() {
        let mut registry = ContractRegistry::new();
        registry
            .register(make_contract(
                NodeType::EffectGeneric,
                ContractVersion::new(1, 0, 0),
            ))
            .unwrap();

        let err = registry
            .get(NodeType::EffectGeneric, &ContractVersion::new(2, 0, 0))
            .unwrap_err();
        assert!(matches!(err, LoadError::VersionMismatch { .. }));
    }

    #[test]
    fn test_missing_node_type() {
        let registry = ContractRegistry::new();
        assert!(matches!(
            registry.get(NodeType::ReducerGeneric, &ContractVersion::new(1, 0, 0)),
            Err(LoadError::NotFound(_))
        ));
    }
}
