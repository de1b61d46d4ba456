//! Rule-based attribute derivation for benchmark operation traces.
//!
//! A trace becomes a `Hierarchy` of typed operations; each operation type owns
//! an `OperationModel` of linking and derivation rules; `engine::run_pass`
//! links the hierarchy and writes derived attributes in priority order.

pub mod attr;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod model;
pub mod render;
pub mod rules;
pub mod trace;
pub mod view;

pub type Result<T> = anyhow::Result<T>;
