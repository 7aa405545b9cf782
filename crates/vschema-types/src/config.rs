//! Registry configuration.
//!
//! Controls whether the built-in kinds are registered up front and how a
//! scheduled flush of the deferred patch queue gets run. Defaults suit a
//! library embedded in a Tokio service; override via environment variables
//! or explicit construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a scheduled flush of the patch queue is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushPolicy {
    /// The owner calls `Registry::tick` (or `get`/`flush`) itself.
    Manual,
    /// Spawn a task that calls `Registry::tick` on the current Tokio
    /// runtime. Without a runtime this behaves like `Manual`.
    #[default]
    Spawn,
}

impl FlushPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Spawn => "spawn",
        }
    }
}

impl fmt::Display for FlushPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlushPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "spawn" => Ok(Self::Spawn),
            _ => Err(ConfigError::InvalidFlushPolicy(s.to_string())),
        }
    }
}

/// Configuration of a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Register string, the numeric kinds, boolean and object at construction.
    pub register_builtins: bool,
    /// How scheduled patch flushes run.
    pub flush_policy: FlushPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            register_builtins: true,
            flush_policy: FlushPolicy::default(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VSCHEMA_REGISTER_BUILTINS` (`true`/`false`/`1`/`0`, default: `true`)
    /// - `VSCHEMA_FLUSH_POLICY` (`manual`/`spawn`, default: `spawn`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`RegistryConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let register_builtins = match lookup(REGISTER_BUILTINS_VAR) {
            Some(raw) => parse_bool(REGISTER_BUILTINS_VAR, &raw)?,
            None => defaults.register_builtins,
        };
        let flush_policy = match lookup(FLUSH_POLICY_VAR) {
            Some(raw) => raw.parse()?,
            None => defaults.flush_policy,
        };
        Ok(Self {
            register_builtins,
            flush_policy,
        })
    }

    /// A registry with no builtins that only flushes when asked to.
    pub fn manual() -> Self {
        Self {
            register_builtins: false,
            flush_policy: FlushPolicy::Manual,
        }
    }
}

const REGISTER_BUILTINS_VAR: &str = "VSCHEMA_REGISTER_BUILTINS";
const FLUSH_POLICY_VAR: &str = "VSCHEMA_FLUSH_POLICY";

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool(var.to_string(), raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid boolean for {0}: {1}")]
    InvalidBool(String, String),
    #[error("invalid flush policy '{0}' (expected 'manual' or 'spawn')")]
    InvalidFlushPolicy(String),
}
