//! Instance snapshot model
//!
//! A snapshot is what the remote API reports for one LPAR at the moment of
//! a read. Field names follow the remote JSON payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle status reported by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Pending,
    Build,
    Active,
    Stopping,
    Shutoff,
    Resize,
    VerifyResize,
    Deleting,
    Error,
    /// A status this crate does not model, kept verbatim
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Pending => "PENDING",
            InstanceStatus::Build => "BUILD",
            InstanceStatus::Active => "ACTIVE",
            InstanceStatus::Stopping => "STOPPING",
            InstanceStatus::Shutoff => "SHUTOFF",
            InstanceStatus::Resize => "RESIZE",
            InstanceStatus::VerifyResize => "VERIFY_RESIZE",
            InstanceStatus::Deleting => "DELETING",
            InstanceStatus::Error => "ERROR",
            InstanceStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => InstanceStatus::Pending,
            "BUILD" => InstanceStatus::Build,
            "ACTIVE" => InstanceStatus::Active,
            "STOPPING" => InstanceStatus::Stopping,
            "SHUTOFF" => InstanceStatus::Shutoff,
            "RESIZE" => InstanceStatus::Resize,
            "VERIFY_RESIZE" => InstanceStatus::VerifyResize,
            "DELETING" => InstanceStatus::Deleting,
            "ERROR" => InstanceStatus::Error,
            _ => InstanceStatus::Other(raw),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(raw: &str) -> Self {
        InstanceStatus::from(raw.to_string())
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        match status {
            InstanceStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained health signal, orthogonal to [`InstanceStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HealthStatus {
    Ok,
    Warning,
    Other(String),
}

impl HealthStatus {
    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Ok => "OK",
            HealthStatus::Warning => "WARNING",
            HealthStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for HealthStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "OK" => HealthStatus::Ok,
            "WARNING" => HealthStatus::Warning,
            _ => HealthStatus::Other(raw),
        }
    }
}

impl From<HealthStatus> for String {
    fn from(health: HealthStatus) -> Self {
        match health {
            HealthStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health block as it appears in the remote payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: HealthStatus,
}

/// Processor sharing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorType {
    Dedicated,
    Shared,
    Capped,
}

impl ProcessorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorType::Dedicated => "dedicated",
            ProcessorType::Shared => "shared",
            ProcessorType::Capped => "capped",
        }
    }
}

impl fmt::Display for ProcessorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host machine family the instance is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemType {
    #[default]
    Any,
    S922,
    E880,
    E980,
}

/// Processor pinning hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinPolicy {
    #[default]
    None,
    Soft,
    Hard,
}

/// Network address attached to an instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAddress {
    #[serde(default, rename = "ip")]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default, rename = "networkID")]
    pub network_id: Option<String>,
    #[serde(default)]
    pub network_name: Option<String>,
    #[serde(default, rename = "type")]
    pub address_type: Option<String>,
    #[serde(default, rename = "externalIP")]
    pub external_ip: Option<String>,
}

/// Snapshot of one remote instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(rename = "pvmInstanceID")]
    pub instance_id: String,

    #[serde(rename = "serverName")]
    pub name: String,

    #[serde(default, rename = "imageID")]
    pub image_id: Option<String>,

    pub status: InstanceStatus,

    #[serde(default)]
    pub health: Option<Health>,

    #[serde(default, rename = "procType")]
    pub processor_type: Option<ProcessorType>,

    #[serde(default, rename = "sysType")]
    pub system_type: Option<SystemType>,

    /// Memory in GB
    pub memory: f64,

    pub processors: f64,

    #[serde(default, rename = "minmem")]
    pub min_memory: Option<f64>,

    #[serde(default, rename = "maxmem")]
    pub max_memory: Option<f64>,

    #[serde(default, rename = "minproc")]
    pub min_processors: Option<f64>,

    #[serde(default, rename = "maxproc")]
    pub max_processors: Option<f64>,

    #[serde(default)]
    pub migratable: Option<bool>,

    /// Completion percentage of the operation currently running remotely
    #[serde(default)]
    pub progress: Option<f64>,

    #[serde(default)]
    pub pin_policy: Option<PinPolicy>,

    #[serde(default)]
    pub addresses: Vec<NetworkAddress>,

    #[serde(default, rename = "networkIDs")]
    pub network_ids: Vec<String>,

    #[serde(default, rename = "volumeIDs")]
    pub volume_ids: Vec<String>,

    #[serde(default, rename = "creationDate")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Health status, if the remote reported one
    pub fn health_status(&self) -> Option<&HealthStatus> {
        self.health.as_ref().map(|h| &h.status)
    }

    pub fn is_health_warning(&self) -> bool {
        self.health_status() == Some(&HealthStatus::Warning)
    }

    /// Capacity ceilings the instance can grow to without a stop/start cycle.
    ///
    /// A missing ceiling is read as the current value, so any increase of
    /// that dimension is treated as exceeding it.
    pub fn capacity_ceiling(&self) -> Capacity {
        Capacity {
            memory: self.max_memory.unwrap_or(self.memory),
            processors: self.max_processors.unwrap_or(self.processors),
        }
    }

    /// Current memory and processor allocation
    pub fn capacity(&self) -> Capacity {
        Capacity {
            memory: self.memory,
            processors: self.processors,
        }
    }
}

/// Memory (GB) and processor count pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub memory: f64,
    pub processors: f64,
}

impl Capacity {
    pub fn new(memory: f64, processors: f64) -> Self {
        Self { memory, processors }
    }

    /// True when `self` does not exceed `ceiling` in either dimension
    pub fn fits_within(&self, ceiling: &Capacity) -> bool {
        self.memory <= ceiling.memory && self.processors <= ceiling.processors
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}GB/{} procs", self.memory, self.processors)
    }
}
