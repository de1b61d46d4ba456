//! Failure taxonomy for a derivation pass.
//!
//! `Failure` is node-local: it is recorded and the pass moves on.
//! `PassError` aborts the whole pass.

use crate::hierarchy::OperationType;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    #[error("operation {node}: no model registered for type {op_type}")]
    UnknownOperationType { node: String, op_type: OperationType },

    #[error("operation {node}: cannot link to {expected}: {reason}")]
    LinkingFailure {
        node: String,
        expected: String,
        reason: String,
    },

    #[error("operation {node}: rule {rule} is missing {attribute} on {location}")]
    MissingDependency {
        node: String,
        rule: String,
        attribute: String,
        location: String,
    },

    #[error("operation {node}: rule {rule} skipped because {blocked_by} failed")]
    Skipped {
        node: String,
        rule: String,
        blocked_by: String,
    },
}

impl Failure {
    pub fn node(&self) -> &str {
        match self {
            Failure::UnknownOperationType { node, .. }
            | Failure::LinkingFailure { node, .. }
            | Failure::MissingDependency { node, .. }
            | Failure::Skipped { node, .. } => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassError {
    #[error(
        "operation {node}: rule {rule} rewrote derived attribute {attribute} (check rule priorities)"
    )]
    DuplicateDerivation {
        node: String,
        rule: String,
        attribute: String,
    },

    #[error("root operation of type {op_type} unresolved: {reason}")]
    RootUnresolved {
        op_type: OperationType,
        reason: String,
    },

    #[error("hierarchy has already been annotated")]
    AlreadyAnnotated,
}
