//! Lifecycle error types

use crate::state::LifecycleState;
use lparflow_cloud::{CloudError, InstanceHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("User data is not valid base64: {0}")]
    InvalidUserData(#[from] base64::DecodeError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot {operation} instance {handle} while its health is WARNING")]
    HealthWarning {
        operation: &'static str,
        handle: String,
    },

    #[error(
        "Waiting for instance {subject} to be {wait}: unexpected state {state} (pending: {pending}, target: {target})"
    )]
    UnexpectedState {
        wait: &'static str,
        subject: String,
        state: LifecycleState,
        pending: String,
        target: String,
    },

    #[error("Timed out after {elapsed:?} waiting for instance {subject} to be {wait} (last state: {})", last_state_label(.last_state))]
    Timeout {
        wait: &'static str,
        subject: String,
        elapsed: Duration,
        last_state: Option<LifecycleState>,
    },

    #[error("State probe for instance {subject} did not answer within {budget:?} while waiting for {wait}")]
    ProbeTimeout {
        wait: &'static str,
        subject: String,
        budget: Duration,
    },

    #[error("Create returned {returned} distinct instance(s) but {requested} replicant(s) were requested")]
    ReplicantMismatch {
        requested: u32,
        returned: usize,
        /// Handles of the instances that were created anyway
        handles: Vec<InstanceHandle>,
    },

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl LifecycleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LifecycleError::Cloud(e) if e.is_not_found())
    }

    /// True for both overall and per-probe wait timeouts
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            LifecycleError::Timeout { .. } | LifecycleError::ProbeTimeout { .. }
        )
    }
}

fn last_state_label(state: &Option<LifecycleState>) -> String {
    match state {
        Some(state) => state.to_string(),
        None => "none observed".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
