//! Invocation Builder
//!
//! Turns a (namespace, measurement kind, expression) triple into the exact
//! argument vector the runtime expects:
//!
//! ```text
//! [binary, -l<preload>..., -l<perf module>, -q<require>?, -e<wrapped expression>]
//! ```
//!
//! Construction is pure; nothing is touched on disk.

use crate::namespace::{Namespace, NamespaceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// GNU time format of a startup run: system, user and elapsed seconds,
/// maximum resident KiB, waits and page size
pub const FOOTPRINT_FORMAT: &str = "%S %U %e %M %w %Z";

/// Measurement wrapper evaluated around a test body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Heap bytes consumed by one evaluation
    Storage,
    /// Resident memory delta
    Memory,
    /// Elapsed time of one evaluation
    Time,
}

impl MeasurementKind {
    /// Runtime primitive implementing this measurement
    pub fn primitive(self) -> &'static str {
        match self {
            MeasurementKind::Storage => "perf:storage-delta",
            MeasurementKind::Memory => "perf:mem-delta",
            MeasurementKind::Time => "perf:time-delta",
        }
    }
}

/// Where the runtime and its images live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeLayout {
    /// Runtime executable
    pub binary: PathBuf,
    /// Source file defining the `perf:` measurement primitives
    pub perf_module: PathBuf,
    /// Core language image
    pub core_image: PathBuf,
    /// Formatting library image
    pub format_image: PathBuf,
    /// Directory searched by `core:%require`
    pub modules_dir: PathBuf,
}

impl Default for RuntimeLayout {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("dist/mu-sys"),
            perf_module: PathBuf::from("perf.l"),
            core_image: PathBuf::from("dist/core.sys"),
            format_image: PathBuf::from("dist/format.sys"),
            modules_dir: PathBuf::from("mu/modules"),
        }
    }
}

/// A fully resolved runtime invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Executable to spawn
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
}

impl InvocationSpec {
    /// Program followed by its arguments, for logging
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// The `-e` argument carrying the evaluated expression
    pub fn eval_arg(&self) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find_map(|arg| arg.strip_prefix("-e"))
    }
}

/// Builds invocations against one runtime layout
#[derive(Debug, Clone, Default)]
pub struct InvocationBuilder {
    layout: RuntimeLayout,
}

impl InvocationBuilder {
    /// Create a builder for the given layout
    pub fn new(layout: RuntimeLayout) -> Self {
        Self { layout }
    }

    /// The layout invocations are resolved against
    pub fn layout(&self) -> &RuntimeLayout {
        &self.layout
    }

    /// Invocation measuring `expr` with the given wrapper.
    ///
    /// The wrapper receives a zero-argument lambda around the body and the
    /// `:nil` sentinel, evaluates the body once and prints one result.
    pub fn build(&self, namespace: Namespace, kind: MeasurementKind, expr: &str) -> InvocationSpec {
        let mut args = self.measured_preload_args(namespace);
        args.push(load_arg(&self.layout.perf_module));
        args.extend(self.require_arg(namespace));

        let body = if namespace == Namespace::Common {
            core_eval(expr)
        } else {
            expr.to_string()
        };
        args.push(format!(
            "-e({} (:lambda () {}) :nil)",
            kind.primitive(),
            body
        ));

        self.spec(args)
    }

    /// Like [`build`](Self::build), resolving the namespace from its name.
    ///
    /// An unknown name is a configuration error, not a test failure.
    pub fn build_named(
        &self,
        namespace: &str,
        kind: MeasurementKind,
        expr: &str,
    ) -> Result<InvocationSpec, NamespaceError> {
        Ok(self.build(namespace.parse()?, kind, expr))
    }

    /// Invocation evaluating `expr` once with no measurement wrapper
    pub fn build_eval(&self, namespace: Namespace, expr: &str) -> InvocationSpec {
        let mut args = self.preload_args(namespace);
        args.extend(self.require_arg(namespace));

        let body = match namespace {
            Namespace::Format | Namespace::Common => core_eval(expr),
            Namespace::Mu | Namespace::Frequent | Namespace::Core => expr.to_string(),
        };
        args.push(format!("-e{}", body));

        self.spec(args)
    }

    /// Invocation timing one bare runtime startup under GNU time.
    ///
    /// The time report is written to standard error after anything the
    /// runtime printed there.
    pub fn build_startup(&self, time_binary: &Path) -> InvocationSpec {
        let mut args = vec![
            "-f".to_string(),
            FOOTPRINT_FORMAT.to_string(),
            self.layout.binary.display().to_string(),
        ];
        args.push(load_arg(&self.layout.core_image));
        args.push("-e:nil".to_string());

        InvocationSpec {
            program: time_binary.to_path_buf(),
            args,
            env: Vec::new(),
        }
    }

    // Measured format tests run over the format image alone
    fn measured_preload_args(&self, namespace: Namespace) -> Vec<String> {
        match namespace {
            Namespace::Format => vec![load_arg(&self.layout.format_image)],
            _ => self.preload_args(namespace),
        }
    }

    fn preload_args(&self, namespace: Namespace) -> Vec<String> {
        let preloads: &[&Path] = match namespace {
            Namespace::Mu | Namespace::Frequent => &[],
            Namespace::Core | Namespace::Common => &[&self.layout.core_image],
            Namespace::Format => &[&self.layout.core_image, &self.layout.format_image],
        };
        preloads.iter().map(|path| load_arg(path)).collect()
    }

    fn require_arg(&self, namespace: Namespace) -> Option<String> {
        (namespace == Namespace::Common).then(|| {
            format!(
                "-q(core:%require \"{}\" \"{}\")",
                namespace.as_str(),
                self.layout.modules_dir.display()
            )
        })
    }

    fn spec(&self, args: Vec<String>) -> InvocationSpec {
        InvocationSpec {
            program: self.layout.binary.clone(),
            args,
            env: Vec::new(),
        }
    }
}

fn load_arg(path: &Path) -> String {
    format!("-l{}", path.display())
}

fn core_eval(expr: &str) -> String {
    format!("(core:eval '{})", expr)
}
