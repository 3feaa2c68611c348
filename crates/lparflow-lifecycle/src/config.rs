//! Lifecycle configuration
//!
//! Values come from built-in defaults, then an optional file (any format the
//! `config` crate recognizes by extension), then `LPARFLOW_*` environment
//! variables. Nested keys use `__`, e.g. `LPARFLOW_TIMEOUTS__DELETE_MINUTES=20`.

use crate::error::{LifecycleError, Result};
use lparflow_cloud::InstanceAction;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "LPARFLOW";

const DEFAULT_TIMEOUT_MINUTES: u64 = 60;

/// Longest accepted operation budget (30 days)
pub const MAX_TIMEOUT_MINUTES: u64 = 30 * 24 * 60;

fn default_timeout_minutes() -> u64 {
    DEFAULT_TIMEOUT_MINUTES
}

fn default_stop_action() -> InstanceAction {
    InstanceAction::ImmediateShutdown
}

/// Overall budget of each controller operation, in minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTimeouts {
    #[serde(default = "default_timeout_minutes")]
    pub create_minutes: u64,
    #[serde(default = "default_timeout_minutes")]
    pub update_minutes: u64,
    #[serde(default = "default_timeout_minutes")]
    pub delete_minutes: u64,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create_minutes: DEFAULT_TIMEOUT_MINUTES,
            update_minutes: DEFAULT_TIMEOUT_MINUTES,
            delete_minutes: DEFAULT_TIMEOUT_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub timeouts: OperationTimeouts,
    /// Power action used to stop an instance before a disruptive change
    #[serde(default = "default_stop_action")]
    pub stop_action: InstanceAction,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            timeouts: OperationTimeouts::default(),
            stop_action: default_stop_action(),
        }
    }
}

impl LifecycleConfig {
    /// Loads configuration from `path` (when given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            tracing::debug!("Loading lifecycle configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: LifecycleConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.stop_action.is_stop() {
            return Err(LifecycleError::InvalidRequest(format!(
                "stop_action must power the instance off, got {}",
                self.stop_action
            )));
        }
        let timeouts = [
            ("create", self.timeouts.create_minutes),
            ("update", self.timeouts.update_minutes),
            ("delete", self.timeouts.delete_minutes),
        ];
        for (operation, minutes) in timeouts {
            if minutes == 0 {
                return Err(LifecycleError::InvalidRequest(format!(
                    "{operation} timeout must be at least one minute"
                )));
            }
            if minutes > MAX_TIMEOUT_MINUTES {
                return Err(LifecycleError::InvalidRequest(format!(
                    "{operation} timeout of {minutes} minutes exceeds {MAX_TIMEOUT_MINUTES}"
                )));
            }
        }
        Ok(())
    }

    pub fn create_timeout(&self) -> Duration {
        minutes(self.timeouts.create_minutes)
    }

    pub fn update_timeout(&self) -> Duration {
        minutes(self.timeouts.update_minutes)
    }

    pub fn delete_timeout(&self) -> Duration {
        minutes(self.timeouts.delete_minutes)
    }
}

/// Unvalidated values are clamped to [`MAX_TIMEOUT_MINUTES`]
fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.min(MAX_TIMEOUT_MINUTES) * 60)
}
