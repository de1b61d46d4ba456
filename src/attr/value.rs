//! Attribute values.
//!
//! JSON shape is untagged:
//!   100            => Timestamp(100)
//!   2.5            => Number(2.5)
//!   "driver"       => Text("driver")
//!   {"a": 1}       => Record({"a": Timestamp(1)})
//!
//! Integers always read as timestamps; counts that must stay numeric should be
//! written with a fractional part.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Timestamp(i64),
    Number(f64),
    Text(String),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Interpret a raw textual value from a log line.
    pub fn parse_raw(s: &str) -> Value {
        let s = s.trim();
        if let Ok(ts) = s.parse::<i64>() {
            return Value::Timestamp(ts);
        }
        if let Ok(n) = s.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
        Value::Text(s.to_string())
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_raw_prefers_timestamps() {
        assert_eq!(Value::parse_raw("1442406012000"), Value::Timestamp(1442406012000));
        assert_eq!(Value::parse_raw(" 2.5 "), Value::Number(2.5));
        assert_eq!(Value::parse_raw("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::parse_raw("driver-0"), Value::Text("driver-0".to_string()));
    }

    #[test]
    fn json_is_untagged() {
        let v: BTreeMap<String, Value> =
            serde_json::from_str(r#"{"t": 7, "n": 0.5, "s": "x", "r": {"k": 1}}"#).unwrap();
        assert_eq!(v["t"], Value::Timestamp(7));
        assert_eq!(v["n"], Value::Number(0.5));
        assert_eq!(v["s"], Value::Text("x".to_string()));
        assert_eq!(
            v["r"],
            Value::Record(BTreeMap::from([("k".to_string(), Value::Timestamp(1))]))
        );
    }

    #[test]
    fn record_display_is_sorted() {
        let r = Value::Record(BTreeMap::from([
            ("b".to_string(), Value::Text("y".to_string())),
            ("a".to_string(), Value::Timestamp(3)),
        ]));
        assert_eq!(r.to_string(), "{a=3, b=y}");
    }
}
