//! Power actions that can be requested on an instance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Action accepted by [`InstanceClient::action`](crate::InstanceClient::action)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceAction {
    /// Power the instance on
    Start,
    /// Graceful operating system shutdown
    Stop,
    /// Power off without waiting for the operating system
    ImmediateShutdown,
    SoftReboot,
    HardReboot,
}

impl InstanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceAction::Start => "start",
            InstanceAction::Stop => "stop",
            InstanceAction::ImmediateShutdown => "immediate-shutdown",
            InstanceAction::SoftReboot => "soft-reboot",
            InstanceAction::HardReboot => "hard-reboot",
        }
    }

    /// True for actions that leave the instance powered off
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            InstanceAction::Stop | InstanceAction::ImmediateShutdown
        )
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for an action call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: InstanceAction,
}
