//! Attribute layer: typed values plus the per-node store that keeps raw
//! (measured) and derived (computed) attributes apart.

pub mod store;
pub mod value;

pub use store::{AttributeStore, StoreError};
pub use value::Value;

/// Well-known attribute names shared by trace sources and rules.
pub mod names {
    pub const START_TIME: &str = "StartTime";
    pub const END_TIME: &str = "EndTime";
    pub const DURATION: &str = "Duration";
    pub const SUMMARY: &str = "Summary";
}
