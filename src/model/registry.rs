use crate::hierarchy::OperationType;
use crate::model::{ModelConfig, OperationModel};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no model registered for operation type {0}")]
    UnknownOperationType(OperationType),

    #[error("operation type {0} is registered more than once")]
    DuplicateModel(OperationType),
}

/// Maps operation types to their models. Built once per session, then only
/// read; share it by reference across passes.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<OperationType, OperationModel>,
    root: Option<OperationType>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ModelConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for op in config.operations {
            let (op_type, model) = op.into_model();
            registry.register(op_type, model)?;
        }
        registry.root = config.root;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        op_type: OperationType,
        model: OperationModel,
    ) -> Result<(), RegistryError> {
        if self.models.contains_key(&op_type) {
            return Err(RegistryError::DuplicateModel(op_type));
        }
        self.models.insert(op_type, model);
        Ok(())
    }

    pub fn lookup(&self, op_type: &OperationType) -> Result<&OperationModel, RegistryError> {
        self.models
            .get(op_type)
            .ok_or_else(|| RegistryError::UnknownOperationType(op_type.clone()))
    }

    /// Require exactly one parentless operation of this type per pass.
    pub fn with_root(mut self, root: OperationType) -> Self {
        self.root = Some(root);
        self
    }

    pub fn root(&self) -> Option<&OperationType> {
        self.root.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OperationType, &OperationModel)> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
