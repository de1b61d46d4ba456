use crate::attr::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("derived attribute {0} is already set")]
    DuplicateDerivation(String),
}

/// Per-node attributes. Raw entries are fixed when the node is built; derived
/// entries are written once each by derivation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeStore {
    raw: BTreeMap<String, Value>,
    derived: BTreeMap<String, Value>,
}

impl AttributeStore {
    pub fn with_raw(raw: BTreeMap<String, Value>) -> Self {
        Self {
            raw,
            derived: BTreeMap::new(),
        }
    }

    /// Derived values shadow raw values of the same name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.derived.get(name).or_else(|| self.raw.get(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<(), StoreError> {
        let name = name.into();
        if self.derived.contains_key(&name) {
            return Err(StoreError::DuplicateDerivation(name));
        }
        self.derived.insert(name, value);
        Ok(())
    }

    pub fn raw(&self) -> &BTreeMap<String, Value> {
        &self.raw
    }

    pub fn derived(&self) -> &BTreeMap<String, Value> {
        &self.derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> AttributeStore {
        AttributeStore::with_raw(BTreeMap::from([
            ("StartTime".to_string(), Value::Timestamp(10)),
            ("Host".to_string(), Value::Text("node-1".to_string())),
        ]))
    }

    #[test]
    fn get_reads_raw_then_derived() {
        let mut s = store();
        assert_eq!(s.get("StartTime"), Some(&Value::Timestamp(10)));
        assert_eq!(s.get("Summary"), None);

        s.set("StartTime", Value::Timestamp(5)).unwrap();
        assert_eq!(s.get("StartTime"), Some(&Value::Timestamp(5)));
        assert_eq!(s.raw()["StartTime"], Value::Timestamp(10));
    }

    #[test]
    fn second_derivation_is_rejected() {
        let mut s = store();
        s.set("Summary", Value::Text("a".to_string())).unwrap();
        let err = s.set("Summary", Value::Text("b".to_string())).unwrap_err();
        assert_eq!(err, StoreError::DuplicateDerivation("Summary".to_string()));
        assert_eq!(s.derived()["Summary"], Value::Text("a".to_string()));
    }
}
