//! Caller-facing lifecycle inputs and outputs

use crate::error::{LifecycleError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lparflow_cloud::{
    CreateInstanceRequest, Instance, InstanceHandle, PinPolicy, ProcessorType,
    ReplicantNamingScheme, ReplicationPolicy, SystemType, UpdateInstanceRequest,
};
use serde::{Deserialize, Serialize};

fn default_replicants() -> u32 {
    1
}

/// Desired configuration of a new instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub image_id: String,
    pub processor_type: ProcessorType,
    #[serde(default)]
    pub system_type: SystemType,
    /// Memory in GB
    pub memory: f64,
    pub processors: f64,
    pub key_pair_name: String,
    pub network_ids: Vec<String>,
    #[serde(default)]
    pub volume_ids: Vec<String>,
    #[serde(default)]
    pub pin_policy: PinPolicy,
    #[serde(default = "default_replicants")]
    pub replicants: u32,
    #[serde(default)]
    pub replication_policy: ReplicationPolicy,
    #[serde(default)]
    pub naming_scheme: ReplicantNamingScheme,
    /// Base64 encoded cloud-init payload
    #[serde(default)]
    pub user_data: Option<String>,
}

impl InstanceSpec {
    /// Checks everything that can be rejected without asking the remote
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LifecycleError::InvalidRequest(
                "name must not be empty".to_string(),
            ));
        }
        if self.replicants < 1 {
            return Err(LifecycleError::InvalidRequest(format!(
                "replicants must be at least 1, got {}",
                self.replicants
            )));
        }
        if self.memory.is_nan() || self.memory <= 0.0 {
            return Err(LifecycleError::InvalidRequest(format!(
                "memory must be positive, got {}",
                self.memory
            )));
        }
        if self.processors.is_nan() || self.processors <= 0.0 {
            return Err(LifecycleError::InvalidRequest(format!(
                "processors must be positive, got {}",
                self.processors
            )));
        }
        if self.network_ids.is_empty() {
            return Err(LifecycleError::InvalidRequest(
                "at least one network id is required".to_string(),
            ));
        }
        if let Some(user_data) = &self.user_data {
            validate_user_data(user_data)?;
        }
        Ok(())
    }

    pub fn to_request(&self) -> CreateInstanceRequest {
        CreateInstanceRequest {
            name: self.name.clone(),
            image_id: self.image_id.clone(),
            processor_type: self.processor_type,
            system_type: self.system_type,
            memory: self.memory,
            processors: self.processors,
            key_pair_name: self.key_pair_name.clone(),
            network_ids: self.network_ids.clone(),
            volume_ids: self.volume_ids.clone(),
            replicants: self.replicants,
            replication_policy: self.replication_policy,
            naming_scheme: self.naming_scheme,
            pin_policy: match self.pin_policy {
                PinPolicy::None => None,
                policy => Some(policy),
            },
            user_data: self.user_data.clone().unwrap_or_default(),
        }
    }
}

/// Rejects user data that is not standard base64; empty input is accepted
pub fn validate_user_data(user_data: &str) -> Result<()> {
    let compact: String = user_data
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    if compact.is_empty() {
        return Ok(());
    }
    STANDARD.decode(compact.as_bytes())?;
    Ok(())
}

/// Mutable attributes of an existing instance; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredResources {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub processor_type: Option<ProcessorType>,
    #[serde(default)]
    pub memory: Option<f64>,
    #[serde(default)]
    pub processors: Option<f64>,
}

impl DesiredResources {
    /// Differences between `self` and `current`
    pub fn changes(&self, current: &Instance) -> ChangeSet {
        let name = self
            .name
            .as_ref()
            .filter(|name| **name != current.name)
            .cloned();
        let processor_type = self
            .processor_type
            .filter(|pt| current.processor_type != Some(*pt));
        let memory = self
            .memory
            .filter(|memory| differs(*memory, current.memory));
        let processors = self
            .processors
            .filter(|processors| differs(*processors, current.processors));

        ChangeSet {
            name,
            processor_type,
            memory,
            processors,
        }
    }
}

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > f64::EPSILON
}

/// Attributes that actually change in one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub name: Option<String>,
    pub processor_type: Option<ProcessorType>,
    pub memory: Option<f64>,
    pub processors: Option<f64>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.processor_type.is_none()
            && self.memory.is_none()
            && self.processors.is_none()
    }

    pub fn touches_capacity(&self) -> bool {
        self.memory.is_some() || self.processors.is_some()
    }

    /// Update body carrying only the name change
    pub fn rename_request(&self) -> UpdateInstanceRequest {
        UpdateInstanceRequest {
            name: self.name.clone(),
            ..Default::default()
        }
    }
}

/// One created instance: its handle and the snapshot read after it settled
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub handle: InstanceHandle,
    pub instance: Instance,
}
