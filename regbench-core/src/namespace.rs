//! Suite Namespaces
//!
//! Each namespace corresponds to one layer of the runtime under test and
//! decides which images must be preloaded before a test expression can run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named partition of the test suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Base language primitives, no preloads
    Mu,
    /// Fast-path subset of the base language
    Frequent,
    /// Formatting library, loaded on top of core
    Format,
    /// Core language image
    Core,
    /// Higher-level library required through core at startup
    Common,
}

impl Namespace {
    /// Every namespace, in suite order
    pub const ALL: [Namespace; 5] = [
        Namespace::Mu,
        Namespace::Frequent,
        Namespace::Format,
        Namespace::Core,
        Namespace::Common,
    ];

    /// Directory and label name of this namespace
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Mu => "mu",
            Namespace::Frequent => "frequent",
            Namespace::Format => "format",
            Namespace::Core => "core",
            Namespace::Common => "common",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespace name outside the known set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown namespace '{name}' (expected one of: mu, frequent, format, core, common)")]
pub struct NamespaceError {
    /// The rejected name
    pub name: String,
}

impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| NamespaceError {
                name: s.to_string(),
            })
    }
}
