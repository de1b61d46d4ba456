//! Report model: the annotated hierarchy plus the failure list, flattened into
//! serializable views keyed by operation id.

use crate::attr::Value;
use crate::engine::PassOutcome;
use crate::error::Failure;
use crate::hierarchy::Hierarchy;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct OperationView {
    pub id: String,
    #[serde(rename = "type")]
    pub op_type: String,
    pub parent: Option<String>,

    /// Children in hierarchy order.
    pub children: Vec<String>,

    /// Attributes as measured by the trace source.
    pub raw: BTreeMap<String, Value>,

    /// Attributes written by derivation rules.
    pub derived: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub operations: usize,
    pub roots: usize,
    pub derived_attributes: usize,
    pub rule_applications: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub roots: Vec<String>,
    pub operations: BTreeMap<String, OperationView>,
    pub failures: Vec<Failure>,
    pub totals: TotalsView,
}

pub fn build_report_data(hierarchy: &Hierarchy, outcome: &PassOutcome) -> ReportData {
    let uuid = |id| hierarchy.node(id).uuid.clone();

    let mut operations = BTreeMap::new();
    let mut derived_attributes = 0usize;
    for id in hierarchy.pre_order() {
        let node = hierarchy.node(id);
        derived_attributes += node.attrs.derived().len();
        operations.insert(
            node.uuid.clone(),
            OperationView {
                id: node.uuid.clone(),
                op_type: node.op_type.to_string(),
                parent: node.parent().map(uuid),
                children: node.children().iter().copied().map(uuid).collect(),
                raw: node.attrs.raw().clone(),
                derived: node.attrs.derived().clone(),
            },
        );
    }

    let roots: Vec<String> = hierarchy.roots().into_iter().map(uuid).collect();

    ReportData {
        totals: TotalsView {
            operations: hierarchy.len(),
            roots: roots.len(),
            derived_attributes,
            rule_applications: outcome.applied,
            failures: outcome.failures.len(),
        },
        roots,
        operations,
        failures: outcome.failures.clone(),
    }
}
