use crate::attr::AttributeStore;
use crate::hierarchy::OperationType;
use serde::Serialize;
use std::fmt;

/// Index of a node in its hierarchy's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One operation occurring during a benchmark run.
#[derive(Debug, Clone)]
pub struct OperationNode {
    pub uuid: String,
    pub op_type: OperationType,
    pub attrs: AttributeStore,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl OperationNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
