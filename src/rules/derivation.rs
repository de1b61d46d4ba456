//! Info derivation rules.
//!
//! A rule reads attributes from its node, the node's parent or the node's
//! children and returns the attributes it derives. Lower `priority` values run
//! earlier across the whole hierarchy, so a rule that consumes another rule's
//! output must carry a larger number.

use crate::attr::{Value, names};
use crate::error::Failure;
use crate::hierarchy::{Hierarchy, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a rule reads its inputs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Local,
    Filial,
    Parental,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRule {
    pub priority: i32,
    #[serde(flatten)]
    pub kind: DerivationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DerivationKind {
    /// Earliest child `StartTime`.
    FilialStartTime,
    /// Latest child `EndTime`.
    FilialEndTime,
    /// `EndTime - StartTime` of the node itself.
    Duration,
    /// `Summary` text; `{Name}` interpolates one of the node's attributes.
    SimpleSummary { summary: String },
    /// Copy an attribute from the parent under the same name.
    ParentalCopy { attribute: String },
    /// Bundle several of the node's attributes into one record.
    Record {
        name: String,
        attributes: Vec<String>,
    },
}

impl DerivationRule {
    pub fn new(priority: i32, kind: DerivationKind) -> Self {
        Self { priority, kind }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            DerivationKind::FilialStartTime => "filial_start_time",
            DerivationKind::FilialEndTime => "filial_end_time",
            DerivationKind::Duration => "duration",
            DerivationKind::SimpleSummary { .. } => "simple_summary",
            DerivationKind::ParentalCopy { .. } => "parental_copy",
            DerivationKind::Record { .. } => "record",
        }
    }

    pub fn scope(&self) -> Scope {
        match self.kind {
            DerivationKind::FilialStartTime | DerivationKind::FilialEndTime => Scope::Filial,
            DerivationKind::ParentalCopy { .. } => Scope::Parental,
            DerivationKind::Duration
            | DerivationKind::SimpleSummary { .. }
            | DerivationKind::Record { .. } => Scope::Local,
        }
    }

    /// Compute this rule's attributes for `node`. Never writes to the hierarchy.
    pub fn apply(
        &self,
        hierarchy: &Hierarchy,
        node: NodeId,
    ) -> Result<BTreeMap<String, Value>, Failure> {
        let ctx = RuleCtx {
            hierarchy,
            node,
            rule: self.name(),
        };

        let mut out = BTreeMap::new();
        match &self.kind {
            DerivationKind::FilialStartTime => {
                let start = ctx.filial_timestamps(names::START_TIME)?.into_iter().min();
                out.insert(names::START_TIME.to_string(), ctx.bound(start, names::START_TIME)?);
            }
            DerivationKind::FilialEndTime => {
                let end = ctx.filial_timestamps(names::END_TIME)?.into_iter().max();
                out.insert(names::END_TIME.to_string(), ctx.bound(end, names::END_TIME)?);
            }
            DerivationKind::Duration => {
                let start = ctx.own_timestamp(names::START_TIME)?;
                let end = ctx.own_timestamp(names::END_TIME)?;
                let span = end
                    .checked_sub(start)
                    .ok_or_else(|| ctx.missing(names::DURATION, "self (duration out of range)"))?;
                out.insert(names::DURATION.to_string(), Value::Number(span as f64));
            }
            DerivationKind::SimpleSummary { summary } => {
                out.insert(
                    names::SUMMARY.to_string(),
                    Value::Text(ctx.interpolate(summary)?),
                );
            }
            DerivationKind::ParentalCopy { attribute } => {
                let Some(parent) = hierarchy.parent(node) else {
                    return Err(ctx.missing(attribute, "parent"));
                };
                let value = hierarchy
                    .node(parent)
                    .attrs
                    .get(attribute)
                    .ok_or_else(|| {
                        ctx.missing(attribute, &format!("parent {}", hierarchy.node(parent).uuid))
                    })?;
                out.insert(attribute.clone(), value.clone());
            }
            DerivationKind::Record { name, attributes } => {
                let mut fields = BTreeMap::new();
                for attribute in attributes {
                    fields.insert(attribute.clone(), ctx.own(attribute)?.clone());
                }
                out.insert(name.clone(), Value::Record(fields));
            }
        }
        Ok(out)
    }
}

struct RuleCtx<'a> {
    hierarchy: &'a Hierarchy,
    node: NodeId,
    rule: &'static str,
}

impl<'a> RuleCtx<'a> {
    fn missing(&self, attribute: &str, location: &str) -> Failure {
        Failure::MissingDependency {
            node: self.hierarchy.node(self.node).uuid.clone(),
            rule: self.rule.to_string(),
            attribute: attribute.to_string(),
            location: location.to_string(),
        }
    }

    fn own(&self, attribute: &str) -> Result<&'a Value, Failure> {
        self.hierarchy
            .node(self.node)
            .attrs
            .get(attribute)
            .ok_or_else(|| self.missing(attribute, "self"))
    }

    fn own_timestamp(&self, attribute: &str) -> Result<i64, Failure> {
        self.own(attribute)?
            .as_timestamp()
            .ok_or_else(|| self.missing(attribute, "self (not a timestamp)"))
    }

    /// One timestamp per child; a childless node has no sensible bound.
    fn filial_timestamps(&self, attribute: &str) -> Result<Vec<i64>, Failure> {
        let children = self.hierarchy.children(self.node);
        if children.is_empty() {
            return Err(self.missing(attribute, "children (node has none)"));
        }

        children
            .iter()
            .map(|c| {
                let child = self.hierarchy.node(*c);
                child
                    .attrs
                    .get(attribute)
                    .and_then(Value::as_timestamp)
                    .ok_or_else(|| self.missing(attribute, &format!("child {}", child.uuid)))
            })
            .collect()
    }

    fn bound(&self, ts: Option<i64>, attribute: &str) -> Result<Value, Failure> {
        ts.map(Value::Timestamp)
            .ok_or_else(|| self.missing(attribute, "children"))
    }

    fn interpolate(&self, template: &str) -> Result<String, Failure> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open + 1..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + 1 + len];
            let is_name = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            if !is_name {
                // Not a placeholder: keep the brace and scan on.
                out.push_str(&rest[..=open]);
                rest = &rest[open + 1..];
                continue;
            }
            out.push_str(&rest[..open]);
            out.push_str(&self.own(name)?.to_string());
            rest = &rest[open + len + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
