//! The derivation pass.
//!
//! 1) Linking: every node's linking rules run in pre-order of the
//!    construction-time forest. A node whose type is unknown or whose linking
//!    fails blocks its whole subtree.
//! 2) Root check (only when the registry names a root type). Any other
//!    parentless node is then an orphan and blocks its subtree.
//! 3) Freeze structure.
//! 4) Derivation: all (node, rule) pairs of unblocked nodes, stable-sorted by
//!    (priority, pre-order position), declaration order breaking the rest.
//!
//! Node-local failures are collected; a rewritten derived attribute aborts.

use crate::error::{Failure, PassError};
use crate::hierarchy::{Hierarchy, NodeId};
use crate::model::ModelRegistry;
use crate::rules::DerivationRule;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutcome {
    /// Per-node failures in the order they were encountered.
    pub failures: Vec<Failure>,
    /// Successful derivation rule applications.
    pub applied: usize,
}

struct Pending<'r> {
    position: usize,
    node: NodeId,
    rule: &'r DerivationRule,
}

pub fn run_pass(
    hierarchy: &mut Hierarchy,
    registry: &ModelRegistry,
) -> Result<PassOutcome, PassError> {
    if hierarchy.is_frozen() {
        return Err(PassError::AlreadyAnnotated);
    }

    let mut outcome = PassOutcome::default();
    let mut blocked = link(hierarchy, registry, &mut outcome.failures);
    check_root(hierarchy, registry, &blocked)?;
    flag_orphans(hierarchy, registry, &mut blocked, &mut outcome.failures);
    hierarchy.freeze();

    derive(hierarchy, registry, &blocked, &mut outcome)?;

    info!(
        operations = hierarchy.len(),
        applied = outcome.applied,
        failures = outcome.failures.len(),
        "derivation pass complete"
    );
    Ok(outcome)
}

/// Returns the nodes that failed lookup or linking.
fn link(
    hierarchy: &mut Hierarchy,
    registry: &ModelRegistry,
    failures: &mut Vec<Failure>,
) -> BTreeSet<NodeId> {
    let mut blocked = BTreeSet::new();

    for id in hierarchy.pre_order() {
        let node = hierarchy.node(id);
        let model = match registry.lookup(&node.op_type) {
            Ok(model) => model,
            Err(_) => {
                let failure = Failure::UnknownOperationType {
                    node: node.uuid.clone(),
                    op_type: node.op_type.clone(),
                };
                warn!("{}", failure);
                failures.push(failure);
                blocked.insert(id);
                continue;
            }
        };

        for rule in model.linking_rules() {
            debug!(node = %hierarchy.node(id).uuid, rule = rule.name(), "linking");
            if let Err(failure) = rule.apply(hierarchy, id) {
                warn!("{}", failure);
                failures.push(failure);
                blocked.insert(id);
                break;
            }
        }
    }

    blocked
}

fn check_root(
    hierarchy: &Hierarchy,
    registry: &ModelRegistry,
    blocked: &BTreeSet<NodeId>,
) -> Result<(), PassError> {
    let Some(root_type) = registry.root() else {
        return Ok(());
    };
    let unresolved = |reason: String| PassError::RootUnresolved {
        op_type: root_type.clone(),
        reason,
    };

    let root = match hierarchy.of_type(root_type).as_slice() {
        [only] => *only,
        [] => return Err(unresolved("no operation of that type".to_string())),
        many => return Err(unresolved(format!("{} operations of that type", many.len()))),
    };

    let uuid = &hierarchy.node(root).uuid;
    if blocked.contains(&root) {
        return Err(unresolved(format!("operation {} failed to link", uuid)));
    }
    if let Some(parent) = hierarchy.parent(root) {
        return Err(unresolved(format!(
            "operation {} is linked under {}",
            uuid,
            hierarchy.node(parent).uuid
        )));
    }
    Ok(())
}

/// With a root type configured, every other node must end linking under a
/// parent.
fn flag_orphans(
    hierarchy: &Hierarchy,
    registry: &ModelRegistry,
    blocked: &mut BTreeSet<NodeId>,
    failures: &mut Vec<Failure>,
) {
    let Some(root_type) = registry.root() else {
        return;
    };

    for id in hierarchy.roots() {
        let node = hierarchy.node(id);
        if &node.op_type == root_type || blocked.contains(&id) {
            continue;
        }
        let failure = Failure::LinkingFailure {
            node: node.uuid.clone(),
            expected: "parent".to_string(),
            reason: "no parent after linking".to_string(),
        };
        warn!("{}", failure);
        failures.push(failure);
        blocked.insert(id);
    }
}

fn derive(
    hierarchy: &mut Hierarchy,
    registry: &ModelRegistry,
    blocked: &BTreeSet<NodeId>,
    outcome: &mut PassOutcome,
) -> Result<(), PassError> {
    let order = hierarchy.pre_order();

    let mut pending = Vec::new();
    for (pos, id) in order.iter().enumerate() {
        let Ok(model) = registry.lookup(&hierarchy.node(*id).op_type) else {
            continue;
        };

        if let Some(blocker) = blocking_ancestor(hierarchy, blocked, *id) {
            for rule in model.derivation_rules() {
                let failure = Failure::Skipped {
                    node: hierarchy.node(*id).uuid.clone(),
                    rule: rule.name().to_string(),
                    blocked_by: hierarchy.node(blocker).uuid.clone(),
                };
                debug!("{}", failure);
                outcome.failures.push(failure);
            }
            continue;
        }

        for rule in model.derivation_rules() {
            pending.push(Pending {
                position: pos,
                node: *id,
                rule,
            });
        }
    }

    // Stable: equal keys keep declaration order.
    pending.sort_by_key(|p| (p.rule.priority, p.position));

    for Pending { node: id, rule, .. } in pending {
        debug!(
            node = %hierarchy.node(id).uuid,
            rule = rule.name(),
            priority = rule.priority,
            scope = ?rule.scope(),
            "deriving"
        );

        match rule.apply(hierarchy, id) {
            Ok(values) => {
                let node = hierarchy.node_mut(id);
                for (name, value) in values {
                    if node.attrs.set(name.clone(), value).is_err() {
                        return Err(PassError::DuplicateDerivation {
                            node: node.uuid.clone(),
                            rule: rule.name().to_string(),
                            attribute: name,
                        });
                    }
                }
                outcome.applied += 1;
            }
            Err(failure) => {
                warn!("{}", failure);
                outcome.failures.push(failure);
            }
        }
    }

    Ok(())
}

/// Nearest node at or above `id` that failed to link.
fn blocking_ancestor(
    hierarchy: &Hierarchy,
    blocked: &BTreeSet<NodeId>,
    id: NodeId,
) -> Option<NodeId> {
    let mut cur = Some(id);
    while let Some(n) = cur {
        if blocked.contains(&n) {
            return Some(n);
        }
        cur = hierarchy.parent(n);
    }
    None
}
