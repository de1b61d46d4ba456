//! Trace input: JSON trace documents and GRANULA log lines, both turned into a
//! `TraceSpec` and then into an unannotated `Hierarchy`.

pub mod log;
pub mod spec;

pub use log::parse_log_file;
pub use spec::{RawOperation, TraceSpec};

use crate::Result;
use anyhow::Context;
use clap::ValueEnum;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceFormat {
    Json,
    Log,
}

impl TraceFormat {
    /// `.json` files are JSON traces; anything else is read as a log.
    pub fn infer(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TraceFormat::Json,
            _ => TraceFormat::Log,
        }
    }
}

pub fn load_trace(path: &str, format: TraceFormat) -> Result<TraceSpec> {
    match format {
        TraceFormat::Json => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read trace file {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("parse trace file {}", path))
        }
        TraceFormat::Log => parse_log_file(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(TraceFormat::infer("run/trace.json"), TraceFormat::Json);
        assert_eq!(TraceFormat::infer("run/TRACE.JSON"), TraceFormat::Json);
        assert_eq!(TraceFormat::infer("run/platform/driver.logs"), TraceFormat::Log);
        assert_eq!(TraceFormat::infer("driver"), TraceFormat::Log);
    }
}
