use crate::error::Failure;
use crate::hierarchy::{Hierarchy, NodeId, OperationType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LinkingRule {
    /// Structure is already fixed by construction.
    Empty,

    /// Link under the only operation of the given type.
    UniqueParent { parent: OperationType },

    /// Link under the operation whose id is stored in a text attribute.
    ParentByAttribute { attribute: String },
}

impl LinkingRule {
    pub fn name(&self) -> &'static str {
        match self {
            LinkingRule::Empty => "empty",
            LinkingRule::UniqueParent { .. } => "unique_parent",
            LinkingRule::ParentByAttribute { .. } => "parent_by_attribute",
        }
    }

    /// Establish or validate `node`'s parent. Writes nothing but structure.
    pub fn apply(&self, hierarchy: &mut Hierarchy, node: NodeId) -> Result<(), Failure> {
        match self {
            LinkingRule::Empty => Ok(()),
            LinkingRule::UniqueParent { parent } => link_unique_parent(hierarchy, node, parent),
            LinkingRule::ParentByAttribute { attribute } => {
                link_parent_by_attribute(hierarchy, node, attribute)
            }
        }
    }
}

fn link_unique_parent(
    hierarchy: &mut Hierarchy,
    node: NodeId,
    parent_type: &OperationType,
) -> Result<(), Failure> {
    let expected = format!("parent of type {}", parent_type);

    if let Some(existing) = hierarchy.parent(node) {
        let existing_type = &hierarchy.node(existing).op_type;
        if existing_type == parent_type {
            return Ok(());
        }
        return Err(failure(
            hierarchy,
            node,
            expected,
            format!(
                "already linked under {} of type {}",
                hierarchy.node(existing).uuid,
                existing_type
            ),
        ));
    }

    let candidates: Vec<NodeId> = hierarchy
        .of_type(parent_type)
        .into_iter()
        .filter(|c| *c != node && !hierarchy.is_ancestor(node, *c))
        .collect();

    match candidates.as_slice() {
        [only] => attach(hierarchy, node, *only, expected),
        [] => Err(failure(
            hierarchy,
            node,
            expected,
            "no candidate operation".to_string(),
        )),
        many => Err(failure(
            hierarchy,
            node,
            expected,
            format!("{} candidate operations", many.len()),
        )),
    }
}

fn link_parent_by_attribute(
    hierarchy: &mut Hierarchy,
    node: NodeId,
    attribute: &str,
) -> Result<(), Failure> {
    let expected = format!("parent named by {}", attribute);

    let parent_uuid = match hierarchy.node(node).attrs.get(attribute) {
        Some(v) => match v.as_text() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        },
        None => {
            return Err(failure(
                hierarchy,
                node,
                expected,
                "attribute not present".to_string(),
            ));
        }
    };

    let Some(target) = hierarchy.find(&parent_uuid) else {
        return Err(failure(
            hierarchy,
            node,
            expected,
            format!("no operation with id {}", parent_uuid),
        ));
    };

    match hierarchy.parent(node) {
        Some(existing) if existing == target => Ok(()),
        Some(existing) => Err(failure(
            hierarchy,
            node,
            expected,
            format!(
                "already linked under {}, not {}",
                hierarchy.node(existing).uuid,
                parent_uuid
            ),
        )),
        None => attach(hierarchy, node, target, expected),
    }
}

fn attach(
    hierarchy: &mut Hierarchy,
    node: NodeId,
    parent: NodeId,
    expected: String,
) -> Result<(), Failure> {
    hierarchy
        .attach(node, parent)
        .map_err(|e| failure(hierarchy, node, expected, e.to_string()))
}

fn failure(hierarchy: &Hierarchy, node: NodeId, expected: String, reason: String) -> Failure {
    Failure::LinkingFailure {
        node: hierarchy.node(node).uuid.clone(),
        expected,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Value;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn text(name: &str, value: &str) -> BTreeMap<String, Value> {
        BTreeMap::from([(name.to_string(), Value::Text(value.to_string()))])
    }

    #[test]
    fn unique_parent_links_floating_node() {
        let mut h = Hierarchy::new();
        let job = h.add_node("job", "Job".into(), BTreeMap::new()).unwrap();
        let m = h.add_node("m", "Mission".into(), BTreeMap::new()).unwrap();

        let rule = LinkingRule::UniqueParent {
            parent: "Job".into(),
        };
        rule.apply(&mut h, m).unwrap();
        assert_eq!(h.parent(m), Some(job));
        assert_eq!(h.children(job), &[m]);

        // Second application validates instead of relinking.
        rule.apply(&mut h, m).unwrap();
        assert_eq!(h.children(job), &[m]);
    }

    #[test]
    fn unique_parent_rejects_ambiguity_and_absence() {
        let mut h = Hierarchy::new();
        h.add_node("j1", "Job".into(), BTreeMap::new()).unwrap();
        h.add_node("j2", "Job".into(), BTreeMap::new()).unwrap();
        let m = h.add_node("m", "Mission".into(), BTreeMap::new()).unwrap();

        let err = LinkingRule::UniqueParent {
            parent: "Job".into(),
        }
        .apply(&mut h, m)
        .unwrap_err();
        assert_eq!(
            err,
            Failure::LinkingFailure {
                node: "m".to_string(),
                expected: "parent of type Job".to_string(),
                reason: "2 candidate operations".to_string(),
            }
        );

        let err = LinkingRule::UniqueParent {
            parent: "Cluster".into(),
        }
        .apply(&mut h, m)
        .unwrap_err();
        assert!(err.to_string().contains("no candidate operation"));
        assert_eq!(h.parent(m), None);
    }

    #[test]
    fn unique_parent_validates_existing_parent_type() {
        let mut h = Hierarchy::new();
        let job = h.add_node("job", "Job".into(), BTreeMap::new()).unwrap();
        let a = h.add_node("a", "Actor".into(), BTreeMap::new()).unwrap();
        h.attach(a, job).unwrap();

        let err = LinkingRule::UniqueParent {
            parent: "Mission".into(),
        }
        .apply(&mut h, a)
        .unwrap_err();
        assert!(err.to_string().contains("already linked under job"));
    }

    #[test]
    fn parent_by_attribute_follows_id() {
        let mut h = Hierarchy::new();
        let m = h.add_node("m-7", "Mission".into(), BTreeMap::new()).unwrap();
        let a = h
            .add_node("a", "Actor".into(), text("ParentUuid", "m-7"))
            .unwrap();
        let lost = h
            .add_node("b", "Actor".into(), text("ParentUuid", "m-8"))
            .unwrap();

        let rule = LinkingRule::ParentByAttribute {
            attribute: "ParentUuid".to_string(),
        };
        rule.apply(&mut h, a).unwrap();
        assert_eq!(h.parent(a), Some(m));

        let err = rule.apply(&mut h, lost).unwrap_err();
        assert!(err.to_string().contains("no operation with id m-8"));
    }

    #[test]
    fn parent_by_attribute_reports_cycles() {
        let mut h = Hierarchy::new();
        let x = h.add_node("x", "Actor".into(), text("ParentUuid", "y")).unwrap();
        let y = h.add_node("y", "Actor".into(), BTreeMap::new()).unwrap();
        h.attach(y, x).unwrap();

        let err = LinkingRule::ParentByAttribute {
            attribute: "ParentUuid".to_string(),
        }
        .apply(&mut h, x)
        .unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn empty_rule_is_a_no_op() {
        let mut h = Hierarchy::new();
        let a = h.add_node("a", "Actor".into(), BTreeMap::new()).unwrap();
        LinkingRule::Empty.apply(&mut h, a).unwrap();
        assert_eq!(h.parent(a), None);
    }
}
