//! Process Runner
//!
//! Spawns one runtime invocation at a time and captures everything it
//! printed. Whether the invocation counts as an exception is decided by a
//! [`FailurePolicy`]; a failed invocation is data, not an `Err`. Only the
//! inability to start or wait for the process is an error.

use regbench_core::InvocationSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Failure to start or wait for a runtime process
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The process could not be spawned or waited on
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        /// Executable that was being started
        program: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Which signals mark an invocation as an exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Non-empty stderr or non-zero exit status (default)
    #[default]
    StderrOrExit,
    /// Non-zero exit status only
    ExitStatus,
    /// Non-empty stderr only
    Stderr,
}

impl FailurePolicy {
    /// Whether `output` is an exception under this policy
    pub fn is_failure(self, output: &RawTrialOutput) -> bool {
        let stderr = !output.stderr.is_empty();
        let status = !output.success;
        match self {
            FailurePolicy::StderrOrExit => stderr || status,
            FailurePolicy::ExitStatus => status,
            FailurePolicy::Stderr => stderr,
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stderr-or-exit" => Ok(FailurePolicy::StderrOrExit),
            "exit-status" => Ok(FailurePolicy::ExitStatus),
            "stderr" => Ok(FailurePolicy::Stderr),
            other => Err(format!("Unknown failure policy: {}", other)),
        }
    }
}

/// Everything one invocation produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTrialOutput {
    /// Standard output, minus one trailing newline
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Exit code; absent when the process was killed by a signal
    pub status: Option<i32>,
    /// Whether the exit status was zero
    pub success: bool,
}

/// Executes invocations
pub trait Runner {
    /// Run one invocation to completion
    fn run(&mut self, invocation: &InvocationSpec) -> Result<RawTrialOutput, RunnerError>;
}

/// Runs invocations as child processes, strictly one at a time
#[derive(Debug, Default)]
pub struct ProcessRunner {
    spawned: usize,
}

impl ProcessRunner {
    /// Runner that has not spawned anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes spawned so far
    pub fn spawned(&self) -> usize {
        self.spawned
    }
}

impl Runner for ProcessRunner {
    fn run(&mut self, invocation: &InvocationSpec) -> Result<RawTrialOutput, RunnerError> {
        tracing::debug!("spawn: {:?}", invocation.argv());

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().cloned())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::SpawnFailed {
                program: invocation.program.clone(),
                source,
            })?;
        self.spawned += 1;

        let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.ends_with('\n') {
            stdout.pop();
        }

        Ok(RawTrialOutput {
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
            success: output.status.success(),
        })
    }
}
