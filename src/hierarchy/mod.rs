//! Operation hierarchy: an arena-backed forest of typed operation nodes.
//!
//! Parents are stored as arena indices rather than references, so the
//! hierarchy owns every node and cloning it yields an independent copy.
//! Structure may change only until `freeze()`; after that only derived
//! attributes are written.

pub mod node;
pub mod op_type;

pub use node::{NodeId, OperationNode};
pub use op_type::OperationType;

use crate::attr::{AttributeStore, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("duplicate operation id {0}")]
    DuplicateNode(String),

    #[error("hierarchy structure is frozen")]
    Frozen,

    #[error("operation {child} is already linked under {parent}")]
    AlreadyLinked { child: String, parent: String },

    #[error("linking {child} under {parent} would create a cycle")]
    Cycle { child: String, parent: String },
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<OperationNode>,
    by_uuid: BTreeMap<String, NodeId>,
    frozen: bool,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        uuid: impl Into<String>,
        op_type: OperationType,
        raw: BTreeMap<String, Value>,
    ) -> Result<NodeId, HierarchyError> {
        if self.frozen {
            return Err(HierarchyError::Frozen);
        }
        let uuid = uuid.into();
        if self.by_uuid.contains_key(&uuid) {
            return Err(HierarchyError::DuplicateNode(uuid));
        }

        let id = NodeId(self.nodes.len());
        self.by_uuid.insert(uuid.clone(), id);
        self.nodes.push(OperationNode {
            uuid,
            op_type,
            attrs: AttributeStore::with_raw(raw),
            parent: None,
            children: Vec::new(),
        });
        Ok(id)
    }

    /// Append `child` to `parent`'s children.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), HierarchyError> {
        if self.frozen {
            return Err(HierarchyError::Frozen);
        }
        if let Some(existing) = self.nodes[child.0].parent {
            return Err(HierarchyError::AlreadyLinked {
                child: self.nodes[child.0].uuid.clone(),
                parent: self.nodes[existing.0].uuid.clone(),
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(HierarchyError::Cycle {
                child: self.nodes[child.0].uuid.clone(),
                parent: self.nodes[parent.0].uuid.clone(),
            });
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &OperationNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut OperationNode {
        &mut self.nodes[id.0]
    }

    pub fn find(&self, uuid: &str) -> Option<NodeId> {
        self.by_uuid.get(uuid).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Parentless nodes in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.ids().filter(|id| self.parent(*id).is_none()).collect()
    }

    pub fn of_type(&self, op_type: &OperationType) -> Vec<NodeId> {
        self.ids()
            .filter(|id| &self.nodes[id.0].op_type == op_type)
            .collect()
    }

    /// True if `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Root-to-leaf order, roots in insertion order, children in attach order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots().into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Leaf-to-root order: every node appears after all of its children.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        // (node, children already expanded)
        let mut stack: Vec<(NodeId, bool)> =
            self.roots().into_iter().rev().map(|r| (r, false)).collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            stack.extend(self.children(id).iter().rev().map(|c| (*c, false)));
        }
        out
    }
}
