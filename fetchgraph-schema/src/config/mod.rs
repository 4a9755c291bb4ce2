//! Configuration file parsing for `fetchgraph.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::error::{SchemaError, SchemaResult};
use crate::policy::LoadingPolicy;

/// Main configuration structure for `fetchgraph.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchGraphConfig {
    /// Association loading settings.
    #[serde(default)]
    pub loading: LoadingConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl FetchGraphConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = content.parse::<Self>()?;
        tracing::debug!(path = %path.display(), policy = %config.loading.policy, "Loaded fetchgraph config");
        Ok(config)
    }

    /// The policy used when a load does not name one.
    pub fn default_policy(&self) -> LoadingPolicy {
        self.loading.policy
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(loading) = overrides.loading {
                if let Some(policy) = loading.policy {
                    self.loading.policy = policy;
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_fetches) = debug.log_fetches {
                    self.debug.log_fetches = log_fetches;
                }
                if let Some(threshold) = debug.n_plus_one_threshold {
                    self.debug.n_plus_one_threshold = threshold;
                }
            }
        }
        self
    }

    /// Check values that the TOML types alone cannot rule out.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.debug.n_plus_one_threshold == 0 {
            return Err(SchemaError::config(
                "debug.n_plus_one_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

impl FromStr for FetchGraphConfig {
    type Err = SchemaError;

    /// Parse configuration from a TOML string, expanding `${VAR}` references first.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let expanded = expand_env_vars(content);

        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.validate()?;
        Ok(config)
    }
}

/// Association loading configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoadingConfig {
    /// Default loading policy, e.g. `"eager"` or `"batch(5)"`.
    #[serde(default)]
    pub policy: LoadingPolicy,
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Emit a debug event for every fetch.
    #[serde(default = "default_true")]
    pub log_fetches: bool,

    /// Warn when a single load issues more child fetches than this.
    #[serde(default = "default_n_plus_one_threshold")]
    pub n_plus_one_threshold: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_fetches: true,
            n_plus_one_threshold: default_n_plus_one_threshold(),
        }
    }
}

fn default_true() -> bool { true }
fn default_n_plus_one_threshold() -> usize { 10 }

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Loading overrides.
    pub loading: Option<LoadingOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Loading configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoadingOverride {
    /// Override the default policy.
    pub policy: Option<LoadingPolicy>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_fetches.
    pub log_fetches: Option<bool>,

    /// Override n_plus_one_threshold.
    pub n_plus_one_threshold: Option<usize>,
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"));

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
