//! Operation type tag.
//!
//! Plain tags ("Job") and actor/mission composites ("TopActor-TopMission")
//! share one representation so they can key the model registry directly.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationType(String);

impl OperationType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn composite(actor: &str, mission: &str) -> Self {
        Self(format!("{}-{}", actor, mission))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}
