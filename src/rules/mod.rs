//! Rule kinds an operation model is assembled from.
//!
//! Both families are closed tagged enums carrying their parameters as data;
//! the config layer deserializes them directly (`"rule": "<snake_case>"`).

pub mod derivation;
pub mod linking;

pub use derivation::{DerivationKind, DerivationRule, Scope};
pub use linking::LinkingRule;
