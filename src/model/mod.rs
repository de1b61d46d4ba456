//! Operation models: the rule set each operation type owns, and the registry
//! that maps types to models.

pub mod config;
pub mod registry;

pub use config::{ModelConfig, OperationConfig};
pub use registry::{ModelRegistry, RegistryError};

use crate::rules::{DerivationRule, LinkingRule};

/// Declarative rule set for one operation type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationModel {
    linking: Vec<LinkingRule>,
    derivations: Vec<DerivationRule>,
}

impl OperationModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_linking(mut self, rule: LinkingRule) -> Self {
        self.linking.push(rule);
        self
    }

    pub fn with_derivation(mut self, rule: DerivationRule) -> Self {
        self.derivations.push(rule);
        self
    }

    pub fn linking_rules(&self) -> &[LinkingRule] {
        &self.linking
    }

    pub fn derivation_rules(&self) -> &[DerivationRule] {
        &self.derivations
    }
}
