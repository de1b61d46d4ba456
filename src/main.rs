use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;
use trace_modeller::Result;
use trace_modeller::engine::run_pass;
use trace_modeller::logging::{LoggingContext, PhaseHooks};
use trace_modeller::model::{ModelConfig, ModelRegistry};
use trace_modeller::render::{render_json_report, render_text_report};
use trace_modeller::trace::{TraceFormat, load_trace};
use trace_modeller::view::build_report_data;

#[derive(Parser)]
#[command(name = "trace-modeller")]
#[command(about = "Derive operation metadata from benchmark traces", long_about = None)]
struct Cli {
    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a trace and write the report.
    Derive {
        #[arg(long)]
        trace: String,

        /// Defaults to json for *.json files, log otherwise.
        #[arg(long, value_enum)]
        format: Option<TraceFormat>,

        /// Model file; the bundled GraphX model when omitted.
        #[arg(long)]
        model: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Text outline instead of JSON.
        #[arg(long)]
        text: bool,

        /// Exit with an error if any rule application failed.
        #[arg(long)]
        strict: bool,
    },

    /// Validate a model file and print its rule table.
    Check {
        #[arg(long)]
        model: Option<String>,
    },

    /// Run a workload between the benchmark phase hooks.
    Run {
        #[arg(long)]
        dir: PathBuf,

        #[arg(long)]
        scheduler_logs: Option<PathBuf>,

        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
}

fn load_registry(model: Option<&str>) -> Result<ModelRegistry> {
    let config = match model {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::builtin()?,
    };
    Ok(ModelRegistry::from_config(config)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = match &cli.cmd {
        Commands::Run {
            scheduler_logs: Some(dir),
            ..
        } => LoggingContext::new().with_scheduler_logs(dir),
        _ => LoggingContext::new(),
    };
    logging.install(&cli.log_level)?;

    match cli.cmd {
        Commands::Derive {
            trace,
            format,
            model,
            out,
            text,
            strict,
        } => {
            // 1) Build the rule table.
            let registry = load_registry(model.as_deref())?;

            // 2) Parse the trace into an unannotated hierarchy.
            let format = format.unwrap_or_else(|| TraceFormat::infer(&trace));
            let mut hierarchy = load_trace(&trace, format)?.validate_and_build()?;

            // 3) Link + derive.
            let outcome = run_pass(&mut hierarchy, &registry)?;

            // 4) Render.
            let data = build_report_data(&hierarchy, &outcome);
            let rendered = if text {
                render_text_report(&data)?
            } else {
                render_json_report(&data)?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", rendered),
            }

            if strict && !outcome.failures.is_empty() {
                bail!(
                    "{} rule application(s) failed",
                    outcome.failures.len()
                );
            }
        }

        Commands::Check { model } => {
            let registry = load_registry(model.as_deref())?;
            for (op_type, model) in registry.iter() {
                let marker = if registry.root() == Some(op_type) {
                    " (root)"
                } else {
                    ""
                };
                println!("{}{}", op_type, marker);
                for rule in model.linking_rules() {
                    println!("  link   {}", rule.name());
                }
                for rule in model.derivation_rules() {
                    println!(
                        "  derive {:>4}  {} [{:?}]",
                        rule.priority,
                        rule.name(),
                        rule.scope()
                    );
                }
            }
        }

        Commands::Run { dir, command, .. } => {
            let Some((program, args)) = command.split_first() else {
                bail!("no workload command given");
            };

            logging.pre_benchmark(&dir)?;
            tracing::info!("starting workload {}", program);
            let status = Command::new(program).args(args).status();
            logging.post_benchmark(&dir)?;

            let status = status.with_context(|| format!("run workload {}", program))?;
            if !status.success() {
                bail!("workload {} exited with {}", program, status);
            }
        }
    }

    Ok(())
}
