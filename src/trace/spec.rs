//! Trace document (trace.json).
//!
//! JSON shape:
//! {
//!   "operations": [
//!     {
//!       "id": "job-1",                       // unique operation id
//!       "type": "TopActor-TopMission",      // operation type tag
//!       "parent": "...",                    // optional parent id
//!       "attributes": { "StartTime": 100 },  // raw attributes
//!       "children": [ { ... } ]             // optional nested operations
//!     }
//!   ]
//! }
//!
//! Nesting and `parent` references both fix structure at construction time.
//! Operations with neither are left floating for the linking rules.

use crate::Result;
use crate::attr::Value;
use crate::hierarchy::{Hierarchy, NodeId, OperationType};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceSpec {
    #[serde(default)]
    pub operations: Vec<RawOperation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOperation {
    pub id: String,

    #[serde(rename = "type")]
    pub op_type: OperationType,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default)]
    pub children: Vec<RawOperation>,
}

impl TraceSpec {
    /// Build the unannotated hierarchy.
    ///
    /// Phases:
    /// 1) Add every operation (depth-first, document order); ids must be unique.
    /// 2) Attach nested children.
    /// 3) Attach explicit `parent` references; they must exist and agree with
    ///    any nesting.
    pub fn validate_and_build(&self) -> Result<Hierarchy> {
        let mut hierarchy = Hierarchy::new();
        let mut nested: Vec<(NodeId, NodeId)> = Vec::new();
        let mut explicit: Vec<(NodeId, String)> = Vec::new();

        // Phase 1.
        let mut stack: Vec<(&RawOperation, Option<NodeId>)> =
            self.operations.iter().rev().map(|op| (op, None)).collect();
        while let Some((raw, nested_parent)) = stack.pop() {
            if raw.id.trim().is_empty() {
                bail!("trace contains an operation with an empty id");
            }
            let id = hierarchy
                .add_node(raw.id.clone(), raw.op_type.clone(), raw.attributes.clone())
                .context("invalid trace")?;

            if let Some(p) = nested_parent {
                nested.push((id, p));
            }
            if let Some(p) = &raw.parent {
                explicit.push((id, p.clone()));
            }
            stack.extend(raw.children.iter().rev().map(|c| (c, Some(id))));
        }

        if hierarchy.is_empty() {
            bail!("trace contained no operations");
        }

        // Phase 2.
        for (child, parent) in nested {
            hierarchy.attach(child, parent).context("invalid trace")?;
        }

        // Phase 3.
        for (child, parent_uuid) in explicit {
            let Some(parent) = hierarchy.find(&parent_uuid) else {
                bail!(
                    "operation {} references missing parent id {}",
                    hierarchy.node(child).uuid,
                    parent_uuid
                );
            };
            match hierarchy.parent(child) {
                Some(existing) if existing == parent => {}
                Some(existing) => bail!(
                    "operation {} declares parent {} but is nested under {}",
                    hierarchy.node(child).uuid,
                    parent_uuid,
                    hierarchy.node(existing).uuid
                ),
                None => hierarchy.attach(child, parent).context("invalid trace")?,
            }
        }

        Ok(hierarchy)
    }
}
