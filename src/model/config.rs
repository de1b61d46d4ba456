//! Model config (model.json): the declarative rule table.
//!
//! JSON shape:
//! {
//!   "root": "TopActor-TopMission",          // optional
//!   "operations": [
//!     {
//!       "type": "TopActor-TopMission",
//!       "linking": [ { "rule": "empty" } ],
//!       "derivations": [
//!         { "priority": 11, "rule": "simple_summary", "summary": "TopActorTopMission." },
//!         { "priority": 7, "rule": "filial_start_time" }
//!       ]
//!     }
//!   ]
//! }
//!
//! Rule order inside each list is kept; it breaks priority ties within a node.

use crate::hierarchy::OperationType;
use crate::model::OperationModel;
use crate::rules::{DerivationRule, LinkingRule};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

const BUILTIN_GRAPHX: &str = include_str!("../../models/graphx.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub root: Option<OperationType>,

    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationConfig {
    #[serde(rename = "type")]
    pub op_type: OperationType,

    #[serde(default)]
    pub linking: Vec<LinkingRule>,

    #[serde(default)]
    pub derivations: Vec<DerivationRule>,
}

impl ModelConfig {
    /// Job model bundled for the GraphX platform.
    pub fn builtin() -> crate::Result<Self> {
        serde_json::from_str(BUILTIN_GRAPHX).context("parse bundled graphx model")
    }

    pub fn from_file(path: &str) -> crate::Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read model file {}", path))?;
        serde_json::from_str(&text).with_context(|| format!("parse model file {}", path))
    }
}

impl OperationConfig {
    pub fn into_model(self) -> (OperationType, OperationModel) {
        let model = self
            .linking
            .into_iter()
            .fold(OperationModel::new(), OperationModel::with_linking);
        let model = self
            .derivations
            .into_iter()
            .fold(model, OperationModel::with_derivation);
        (self.op_type, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelRegistry;
    use crate::rules::DerivationKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_model_declares_top_operation() {
        let registry = ModelRegistry::from_config(ModelConfig::builtin().unwrap()).unwrap();
        let top = OperationType::composite("TopActor", "TopMission");
        assert_eq!(registry.root(), Some(&top));

        let model = registry.lookup(&top).unwrap();
        assert_eq!(model.linking_rules(), &[LinkingRule::Empty]);
        assert_eq!(
            model.derivation_rules(),
            &[
                DerivationRule::new(
                    11,
                    DerivationKind::SimpleSummary {
                        summary: "TopActorTopMission.".to_string()
                    }
                ),
                DerivationRule::new(7, DerivationKind::FilialStartTime),
                DerivationRule::new(7, DerivationKind::FilialEndTime),
            ]
        );
    }

    #[test]
    fn unknown_rule_is_a_parse_error() {
        let err = serde_json::from_str::<ModelConfig>(
            r#"{"operations": [{"type": "Job", "linking": [{"rule": "nearest_parent"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nearest_parent"));
    }

    #[test]
    fn duplicate_types_fail_registry_build() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"operations": [{"type": "Job"}, {"type": "Job"}]}"#,
        )
        .unwrap();
        assert!(ModelRegistry::from_config(config).is_err());
    }
}
