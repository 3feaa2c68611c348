//! Lifecycle state classification
//!
//! Remote snapshots carry two orthogonal signals, a coarse status and a
//! health indicator. Waits do not compare those strings directly: every
//! snapshot is first folded into one [`LifecycleState`] by the table below,
//! and wait profiles are expressed over these states.
//!
//! | status          | health      | state           |
//! |-----------------|-------------|-----------------|
//! | ERROR           | any         | `Error`         |
//! | any other       | WARNING     | `HealthWarning` |
//! | ACTIVE          | OK          | `Active`        |
//! | ACTIVE          | other/none  | `Build`         |
//! | SHUTOFF         | OK          | `Shutoff`       |
//! | SHUTOFF         | other/none  | `Stopping`      |
//! | PENDING         | other       | `Pending`       |
//! | BUILD           | other       | `Build`         |
//! | STOPPING        | other       | `Stopping`      |
//! | RESIZE          | other       | `Resize`        |
//! | VERIFY_RESIZE   | other       | `VerifyResize`  |
//! | DELETING        | other       | `Deleting`      |
//! | anything else   | other       | `Unrecognized`  |
//!
//! `Retry` and `NotFound` only come out of [`LifecycleState::for_deletion`].
//!
//! A wait treats every state the instance may still be leaving as pending,
//! so a read that lags behind a power action does not end it. Only `Error`
//! and `Unrecognized` are never pending.

use lparflow_cloud::{HealthStatus, Instance, InstanceStatus};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Pending,
    Build,
    Active,
    Stopping,
    Shutoff,
    Resize,
    VerifyResize,
    HealthWarning,
    Deleting,
    /// Instance still present after a delete request, not yet deleting
    Retry,
    NotFound,
    Error,
    Unrecognized,
}

impl LifecycleState {
    pub fn classify(instance: &Instance) -> Self {
        let health = instance.health_status();
        match (&instance.status, health) {
            (InstanceStatus::Error, _) => LifecycleState::Error,
            (_, Some(HealthStatus::Warning)) => LifecycleState::HealthWarning,
            (InstanceStatus::Active, Some(HealthStatus::Ok)) => LifecycleState::Active,
            (InstanceStatus::Active, _) => LifecycleState::Build,
            (InstanceStatus::Shutoff, Some(HealthStatus::Ok)) => LifecycleState::Shutoff,
            (InstanceStatus::Shutoff, _) => LifecycleState::Stopping,
            (InstanceStatus::Pending, _) => LifecycleState::Pending,
            (InstanceStatus::Build, _) => LifecycleState::Build,
            (InstanceStatus::Stopping, _) => LifecycleState::Stopping,
            (InstanceStatus::Resize, _) => LifecycleState::Resize,
            (InstanceStatus::VerifyResize, _) => LifecycleState::VerifyResize,
            (InstanceStatus::Deleting, _) => LifecycleState::Deleting,
            (InstanceStatus::Other(_), _) => LifecycleState::Unrecognized,
        }
    }

    /// Classification used while a delete request is being confirmed
    pub fn for_deletion(instance: &Instance) -> Self {
        match instance.status {
            InstanceStatus::Deleting => LifecycleState::Deleting,
            InstanceStatus::Error => LifecycleState::Error,
            _ => LifecycleState::Retry,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Pending => "PENDING",
            LifecycleState::Build => "BUILD",
            LifecycleState::Active => "ACTIVE",
            LifecycleState::Stopping => "STOPPING",
            LifecycleState::Shutoff => "SHUTOFF",
            LifecycleState::Resize => "RESIZE",
            LifecycleState::VerifyResize => "VERIFY_RESIZE",
            LifecycleState::HealthWarning => "WARNING",
            LifecycleState::Deleting => "DELETING",
            LifecycleState::Retry => "retry",
            LifecycleState::NotFound => "NOT_FOUND",
            LifecycleState::Error => "ERROR",
            LifecycleState::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Joins state labels for log and error messages
pub(crate) fn join_labels(states: &[LifecycleState]) -> String {
    states
        .iter()
        .map(LifecycleState::label)
        .collect::<Vec<_>>()
        .join(", ")
}
