#![warn(missing_docs)]
//! Regbench CLI Library
//!
//! This module provides the command-line driver for regbench. Use
//! `regbench_cli::run()` in a main function to get the full CLI.
//!
//! Collection and reporting are separate commands:
//!
//! ```text
//! regbench collect core -o current.json          # runs the runtime
//! regbench summarize current.json -o current.txt # decode, average trials
//! regbench compare baseline.txt current.txt      # classify and report
//! regbench footprint collect -o current-fp.json  # bare startups under time
//! regbench footprint report base-fp.json current-fp.json
//! ```

mod config;
mod executor;
mod planner;
mod runner;

pub use config::*;
pub use executor::{
    CollectionConfig, ConformanceCounts, ConformanceGroup, ConformanceReport, ConformanceResult,
    MetricCollector, SummarizedTest, build_collection_meta, build_suite_report, collect_footprint,
    format_conformance, format_footprint, format_plan, format_report_line, format_text_report,
    run_conformance, summarize_collection, summarize_footprint_collection,
};
pub use planner::{ExecutionPlan, build_plan};
pub use runner::*;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regbench_core::{InvocationBuilder, Namespace, load_suite};
use regbench_report::{
    MetricRecord, OutputFormat, SuiteReport, generate_collection_json, generate_footprint_json,
    generate_json_report, pair_records, parse_collection_json, parse_comparison_file,
    parse_footprint_json, parse_metric_file,
};
use regbench_stats::FootprintSummary;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Regbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "regbench")]
#[command(
    author,
    version,
    about = "Regbench - benchmark and regression harness for an external language runtime"
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: regbench.toml found by walking up)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the groups and tests of a namespace
    List {
        /// Namespace: mu, frequent, format, core or common
        namespace: String,
        /// Filter groups by regex pattern
        #[arg(long)]
        filter: Option<String>,
        /// Suite directory (overrides runner.suite_dir)
        #[arg(long)]
        suite_dir: Option<PathBuf>,
    },
    /// Run a namespace under the runtime and write the collection JSON
    Collect {
        /// Namespace: mu, frequent, format, core or common
        namespace: String,
        /// Timing trials per test (overrides runner.trials)
        #[arg(long, short = 'n', value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        trials: Option<usize>,
        /// Filter groups by regex pattern
        #[arg(long)]
        filter: Option<String>,
        /// Suite directory (overrides runner.suite_dir)
        #[arg(long)]
        suite_dir: Option<PathBuf>,
        /// Runtime executable (overrides runtime.binary)
        #[arg(long)]
        binary: Option<PathBuf>,
        /// stderr-or-exit, exit-status or stderr (overrides runtime.failure_policy)
        #[arg(long)]
        failure_policy: Option<FailurePolicy>,
        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reduce a collection JSON to one metric line per test
    Summarize {
        /// Collection JSON written by `collect`
        input: PathBuf,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare a run against a baseline run
    Compare {
        /// Baseline: collection JSON or metric lines
        baseline: PathBuf,
        /// Current: collection JSON or metric lines
        current: PathBuf,
        /// Output format: text or json (overrides output.format)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// List unchanged tests too
        #[arg(long)]
        all: bool,
        /// Also write the joined seven-field comparison lines here
        #[arg(long)]
        save_combined: Option<PathBuf>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report on an already combined five- or seven-field comparison file
    Report {
        /// Comparison file
        combined: PathBuf,
        /// Output format: text or json (overrides output.format)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// List unchanged tests too
        #[arg(long)]
        all: bool,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check each test's printed result against its expected result
    Conformance {
        /// Namespace: mu, frequent, format, core or common
        module: String,
        /// Filter groups by regex pattern
        #[arg(long)]
        filter: Option<String>,
        /// Suite directory (overrides runner.suite_dir)
        #[arg(long)]
        suite_dir: Option<PathBuf>,
        /// Runtime executable (overrides runtime.binary)
        #[arg(long)]
        binary: Option<PathBuf>,
        /// Output format: text or json (overrides output.format)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Measure the startup footprint of the bare runtime
    Footprint {
        /// Footprint step to run
        #[command(subcommand)]
        command: FootprintCommands,
    },
    /// Write a default regbench.toml to the current directory
    Init,
}

/// Footprint subcommands
#[derive(Subcommand, Debug)]
pub enum FootprintCommands {
    /// Start the runtime repeatedly under GNU time and write the footprint JSON
    Collect {
        /// Startup runs (overrides footprint.runs)
        #[arg(long, short = 'n', value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        runs: Option<usize>,
        /// Runtime executable (overrides runtime.binary)
        #[arg(long)]
        binary: Option<PathBuf>,
        /// GNU time executable (overrides footprint.time_binary)
        #[arg(long)]
        time_binary: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Average two footprint collections and show them side by side
    Report {
        /// Baseline footprint JSON
        base: PathBuf,
        /// Current footprint JSON
        current: PathBuf,
        /// Output format: text or json (overrides output.format)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the Regbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error for argument, configuration
/// and file errors. Per-test failures never produce an error.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Regbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging; a second call in the same process keeps the first subscriber
    let filter = if cli.verbose {
        "regbench=debug"
    } else {
        "regbench=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            ref namespace,
            ref filter,
            ref suite_dir,
        } => {
            let plan = load_plan(&config, namespace, filter.as_deref(), suite_dir.as_deref())?;
            print!("{}", format_plan(&plan));
        }
        Commands::Collect {
            ref namespace,
            trials,
            ref filter,
            ref suite_dir,
            ref binary,
            failure_policy,
            no_progress,
            ref output,
        } => {
            let plan = load_plan(&config, namespace, filter.as_deref(), suite_dir.as_deref())?;
            let collection_config = CollectionConfig {
                trials: trials.unwrap_or(config.runner.trials),
                failure_policy: failure_policy.unwrap_or(config.runtime.failure_policy),
                show_progress: !no_progress,
            };
            let builder = InvocationBuilder::new(runtime_layout(&config, binary.as_deref()));
            collect_namespace(&plan, builder, collection_config, output.as_deref())?;
        }
        Commands::Summarize {
            ref input,
            ref output,
        } => {
            let records = read_metric_records(input)?;
            write_output(output.as_deref(), &metric_lines(&records))?;
        }
        Commands::Compare {
            ref baseline,
            ref current,
            format,
            all,
            ref save_combined,
            ref output,
        } => {
            let baseline_records = read_metric_records(baseline)?;
            let current_records = read_metric_records(current)?;
            let pairing = pair_records(&baseline_records, &current_records);
            if pairing.unmatched() > 0 {
                tracing::warn!(
                    "{} baseline and {} current tests could not be paired",
                    pairing.unmatched_baseline,
                    pairing.unmatched_current
                );
            }

            if let Some(path) = save_combined {
                let combined: String = pairing
                    .records
                    .iter()
                    .map(|r| format!("{}\n", r.to_line()))
                    .collect();
                write_file(path, &combined)?;
            }

            let report = build_suite_report(
                &pairing.records,
                pairing.unmatched(),
                all || config.output.show_unchanged,
            );
            let format = format.unwrap_or(config.output.format);
            write_output(output.as_deref(), &render_report(&report, format)?)?;
        }
        Commands::Report {
            ref combined,
            format,
            all,
            ref output,
        } => {
            let text = read_file(combined)?;
            let records = parse_comparison_file(&text);
            tracing::info!("Read {} comparison records from {}", records.len(), combined.display());

            let report = build_suite_report(&records, 0, all || config.output.show_unchanged);
            let format = format.unwrap_or(config.output.format);
            write_output(output.as_deref(), &render_report(&report, format)?)?;
        }
        Commands::Conformance {
            ref module,
            ref filter,
            ref suite_dir,
            ref binary,
            format,
            ref output,
        } => {
            let plan = load_plan(&config, module, filter.as_deref(), suite_dir.as_deref())?;
            let builder = InvocationBuilder::new(runtime_layout(&config, binary.as_deref()));
            let mut runner = ProcessRunner::new();
            let report =
                run_conformance(&builder, &mut runner, config.runtime.failure_policy, &plan)?;

            let rendered = match format.unwrap_or(config.output.format) {
                OutputFormat::Text => format_conformance(&report),
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Footprint { ref command } => run_footprint(&config, command)?,
        Commands::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            write_file(path, &RegbenchConfig::default_toml())?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// Explicit `--config` file, else discovered file, else defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<RegbenchConfig> {
    let config = match path {
        Some(path) => RegbenchConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => RegbenchConfig::discover().unwrap_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn runtime_layout(config: &RegbenchConfig, binary: Option<&Path>) -> regbench_core::RuntimeLayout {
    let mut layout = config.runtime.layout();
    if let Some(binary) = binary {
        layout.binary = binary.to_path_buf();
    }
    layout
}

fn load_plan(
    config: &RegbenchConfig,
    namespace: &str,
    filter: Option<&str>,
    suite_dir: Option<&Path>,
) -> anyhow::Result<ExecutionPlan> {
    let namespace: Namespace = namespace.parse()?;
    let filter = filter
        .map(Regex::new)
        .transpose()
        .context("invalid --filter pattern")?;
    let suite_dir = suite_dir.unwrap_or(&config.runner.suite_dir);

    let suite = load_suite(suite_dir, namespace)?;
    Ok(build_plan(suite, filter.as_ref()))
}

fn collect_namespace(
    plan: &ExecutionPlan,
    builder: InvocationBuilder,
    config: CollectionConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    tracing::info!(
        "Collecting {} tests in {} groups of {} ({} trials)",
        plan.test_count(),
        plan.groups.len(),
        plan.namespace,
        config.trials
    );
    if plan.syntax_error_count() > 0 {
        tracing::warn!("{} lines have test syntax errors", plan.syntax_error_count());
    }

    let mut collector = MetricCollector::new(builder, ProcessRunner::new(), config);
    let collection = collector.collect_plan(plan)?;
    if collector.exceptions() > 0 {
        tracing::info!("{} invocations raised exceptions", collector.exceptions());
    }

    write_output(output, &generate_collection_json(&collection)?)
}

fn run_footprint(config: &RegbenchConfig, command: &FootprintCommands) -> anyhow::Result<()> {
    match command {
        FootprintCommands::Collect {
            runs,
            binary,
            time_binary,
            no_progress,
            output,
        } => {
            let runs = runs.unwrap_or(config.footprint.runs);
            let time_binary = time_binary
                .as_deref()
                .unwrap_or(config.footprint.time_binary.as_path());
            let builder = InvocationBuilder::new(runtime_layout(config, binary.as_deref()));
            tracing::info!(
                "Timing {} startups of {}",
                runs,
                builder.layout().binary.display()
            );

            let mut runner = ProcessRunner::new();
            let collection =
                collect_footprint(&builder, &mut runner, time_binary, runs, !no_progress)?;
            let failed = collection.stats.iter().filter(|s| s.is_none()).count();
            if failed > 0 {
                tracing::warn!("{} of {} startups failed", failed, runs);
            }
            write_output(output.as_deref(), &generate_footprint_json(&collection)?)
        }
        FootprintCommands::Report {
            base,
            current,
            format,
            output,
        } => {
            let base = read_footprint(base)?;
            let current = read_footprint(current)?;
            let rendered = match format.unwrap_or(config.output.format) {
                OutputFormat::Text => format_footprint(&base, &current),
                OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                    "base": base,
                    "current": current,
                }))?,
            };
            write_output(output.as_deref(), &rendered)
        }
    }
}

fn read_footprint(path: &Path) -> anyhow::Result<FootprintSummary> {
    let text = read_file(path)?;
    let collection = parse_footprint_json(&text)
        .with_context(|| format!("invalid footprint file {}", path.display()))?;
    summarize_footprint_collection(&collection)
        .with_context(|| format!("no successful startup in {}", path.display()))
}

/// Metric records from a collection JSON or a metric-line file
fn read_metric_records(path: &Path) -> anyhow::Result<Vec<MetricRecord>> {
    let text = read_file(path)?;

    if text.trim_start().starts_with('{') {
        let collection = parse_collection_json(&text)
            .with_context(|| format!("invalid collection file {}", path.display()))?;
        let summaries = summarize_collection(&collection);
        for summary in &summaries {
            if let Some(trials) = &summary.trials {
                tracing::debug!(
                    "{}:{} mean {:.4}s median {:.4}s sd {:.4}s ({} ok, {} failed)",
                    summary.record.name,
                    summary.record.line,
                    trials.mean,
                    trials.median,
                    trials.std_dev,
                    trials.successes,
                    trials.failures
                );
            }
        }
        Ok(summaries.into_iter().map(|s| s.record).collect())
    } else {
        Ok(parse_metric_file(&text))
    }
}

fn metric_lines(records: &[MetricRecord]) -> String {
    records.iter().map(|r| format!("{}\n", r.to_line())).collect()
}

fn render_report(report: &SuiteReport, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => format_text_report(report),
        OutputFormat::Json => generate_json_report(report)?,
    })
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

fn write_output(path: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            write_file(path, contents)?;
            eprintln!("Written to: {}", path.display());
        }
        None => print!("{}", contents),
    }
    Ok(())
}
