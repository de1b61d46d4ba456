//! Log sink switching around a benchmark phase.
//!
//! The active sink is owned by an explicit `LoggingContext` rather than by a
//! global logger: the tracing subscriber writes through the context, and phase
//! boundaries swap the sink on that same object.
//!
//! Core sink:      stderr
//! Platform sink:  <run_dir>/platform/driver.logs (appended)
//! Scheduler logs: copied into <run_dir>/platform/scheduler/ after the phase

use crate::Result;
use anyhow::Context;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    Core,
    Platform(PathBuf),
}

enum ActiveSink {
    Core,
    Platform { path: PathBuf, file: File },
}

#[derive(Clone)]
pub struct LoggingContext {
    sink: Arc<Mutex<ActiveSink>>,
    scheduler_logs: Option<PathBuf>,
}

impl Default for LoggingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingContext {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(ActiveSink::Core)),
            scheduler_logs: None,
        }
    }

    /// Directory the cluster scheduler leaves its per-container logs in.
    pub fn with_scheduler_logs(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scheduler_logs = Some(dir.into());
        self
    }

    /// Install the process subscriber writing through this context.
    /// `RUST_LOG` overrides `default_filter`.
    pub fn install(&self, default_filter: &str) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(self.clone()),
            )
            .try_init()
            .context("install log subscriber")
    }

    pub fn current_sink(&self) -> SinkKind {
        match &*self.sink.lock() {
            ActiveSink::Core => SinkKind::Core,
            ActiveSink::Platform { path, .. } => SinkKind::Platform(path.clone()),
        }
    }

    pub fn switch_to_platform_sink(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create log directory {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open platform log {}", path.display()))?;

        info!("redirecting logs to {}", path.display());
        *self.sink.lock() = ActiveSink::Platform {
            path: path.to_path_buf(),
            file,
        };
        Ok(())
    }

    pub fn switch_to_core_sink(&self) {
        let mut sink = self.sink.lock();
        if let ActiveSink::Platform { file, .. } = &mut *sink {
            // Best effort: the file is closed on drop either way.
            let _ = file.flush();
        }
        *sink = ActiveSink::Core;
    }

    /// Copy scheduler-side log files into the run directory. Returns the
    /// number of files copied.
    pub fn collect_external_logs(&self, run_dir: &Path) -> Result<usize> {
        let Some(source) = &self.scheduler_logs else {
            return Ok(0);
        };

        let dest = run_dir.join("platform").join("scheduler");
        fs::create_dir_all(&dest)
            .with_context(|| format!("create scheduler log directory {}", dest.display()))?;

        let mut entries: Vec<PathBuf> = fs::read_dir(source)
            .with_context(|| format!("read scheduler log directory {}", source.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        for path in &entries {
            let Some(name) = path.file_name() else {
                continue;
            };
            fs::copy(path, dest.join(name))
                .with_context(|| format!("copy scheduler log {}", path.display()))?;
        }
        Ok(entries.len())
    }
}

/// Writer handed out to the fmt layer; resolves the sink on every write.
pub struct SinkWriter {
    sink: Arc<Mutex<ActiveSink>>,
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.sink.lock() {
            ActiveSink::Core => io::stderr().write(buf),
            ActiveSink::Platform { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.sink.lock() {
            ActiveSink::Core => io::stderr().flush(),
            ActiveSink::Platform { file, .. } => file.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LoggingContext {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Hooks the harness calls around each benchmark phase.
pub trait PhaseHooks {
    fn pre_benchmark(&self, run_dir: &Path) -> Result<()>;
    fn post_benchmark(&self, run_dir: &Path) -> Result<()>;
}

impl PhaseHooks for LoggingContext {
    fn pre_benchmark(&self, run_dir: &Path) -> Result<()> {
        self.switch_to_platform_sink(&run_dir.join("platform").join("driver.logs"))
    }

    fn post_benchmark(&self, run_dir: &Path) -> Result<()> {
        let collected = self.collect_external_logs(run_dir);
        self.switch_to_core_sink();
        let n = collected?;
        info!(files = n, "collected scheduler logs");
        Ok(())
    }
}
