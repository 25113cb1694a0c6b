//! Configuration loading from regbench.toml
//!
//! Regbench configuration can be specified in a `regbench.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory.

use crate::runner::FailurePolicy;
use regbench_core::RuntimeLayout;
use regbench_report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`RegbenchConfig::discover`]
pub const CONFIG_FILE: &str = "regbench.toml";

/// Regbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegbenchConfig {
    /// Runtime layout and failure detection
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Collection settings
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Report output
    #[serde(default)]
    pub output: OutputConfig,
    /// Startup footprint
    #[serde(default)]
    pub footprint: FootprintConfig,
}

/// Where the runtime lives and how its failures are detected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime executable
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Source file defining the measurement primitives
    #[serde(default = "default_perf_module")]
    pub perf_module: PathBuf,
    /// Core language image
    #[serde(default = "default_core_image")]
    pub core_image: PathBuf,
    /// Formatting library image
    #[serde(default = "default_format_image")]
    pub format_image: PathBuf,
    /// Directory searched by `core:%require`
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,
    /// Which signals mark an invocation as failed
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let layout = RuntimeLayout::default();
        Self {
            binary: layout.binary,
            perf_module: layout.perf_module,
            core_image: layout.core_image,
            format_image: layout.format_image,
            modules_dir: layout.modules_dir,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl RuntimeConfig {
    /// Layout handed to the invocation builder
    pub fn layout(&self) -> RuntimeLayout {
        RuntimeLayout {
            binary: self.binary.clone(),
            perf_module: self.perf_module.clone(),
            core_image: self.core_image.clone(),
            format_image: self.format_image.clone(),
            modules_dir: self.modules_dir.clone(),
        }
    }
}

fn default_binary() -> PathBuf {
    RuntimeLayout::default().binary
}
fn default_perf_module() -> PathBuf {
    RuntimeLayout::default().perf_module
}
fn default_core_image() -> PathBuf {
    RuntimeLayout::default().core_image
}
fn default_format_image() -> PathBuf {
    RuntimeLayout::default().format_image
}
fn default_modules_dir() -> PathBuf {
    RuntimeLayout::default().modules_dir
}

/// Collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timing trials per test
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Directory holding one sub-directory per namespace
    #[serde(default = "default_suite_dir")]
    pub suite_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            suite_dir: default_suite_dir(),
        }
    }
}

fn default_trials() -> usize {
    20
}
fn default_suite_dir() -> PathBuf {
    PathBuf::from("tests/performance/namespaces")
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format: "text" or "json"
    #[serde(default)]
    pub format: OutputFormat,
    /// List unchanged tests in reports
    #[serde(default)]
    pub show_unchanged: bool,
}

/// Startup footprint runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintConfig {
    /// Startups per footprint collection
    #[serde(default = "default_trials")]
    pub runs: usize,
    /// GNU time executable wrapping each startup
    #[serde(default = "default_time_binary")]
    pub time_binary: PathBuf,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            runs: default_trials(),
            time_binary: default_time_binary(),
        }
    }
}

fn default_time_binary() -> PathBuf {
    PathBuf::from("/usr/bin/time")
}

impl RegbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values that would make every measurement meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.runner.trials == 0 {
            anyhow::bail!("runner.trials must be at least 1");
        }
        if self.footprint.runs == 0 {
            anyhow::bail!("footprint.runs must be at least 1");
        }
        Ok(())
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        Self::discover_from(std::env::current_dir().ok()?)
    }

    /// Walk up from `dir` looking for a configuration file
    pub fn discover_from(mut dir: PathBuf) -> Option<Self> {
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!("Loaded configuration from {}", config_path.display());
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Regbench Configuration

[runtime]
# Runtime executable
binary = "dist/mu-sys"
# Source file defining perf:storage-delta, perf:mem-delta and perf:time-delta
perf_module = "perf.l"
# Images preloaded for the core, format and common namespaces
core_image = "dist/core.sys"
format_image = "dist/format.sys"
# Directory searched when the common namespace requires its module
modules_dir = "mu/modules"
# Failed invocation: "stderr-or-exit", "exit-status" or "stderr"
failure_policy = "stderr-or-exit"

[runner]
# Timing trials per test
trials = 20
# One sub-directory per namespace, each with a "tests" index
suite_dir = "tests/performance/namespaces"

[output]
# Report format: text or json
format = "text"
# List unchanged tests in reports
show_unchanged = false

[footprint]
# Startups per footprint collection
runs = 20
# GNU time, run as: time -f "%S %U %e %M %w %Z" <runtime> ...
time_binary = "/usr/bin/time"
"#
        .to_string()
    }
}
