//! Create and update request bodies

use crate::instance::{PinPolicy, ProcessorType, SystemType};
use serde::{Deserialize, Serialize};

/// How replicants of one create call are placed relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationPolicy {
    Affinity,
    AntiAffinity,
    #[default]
    None,
}

/// Where the replicant index goes in generated server names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicantNamingScheme {
    Prefix,
    #[default]
    Suffix,
}

/// Body of a create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceRequest {
    #[serde(rename = "serverName")]
    pub name: String,

    #[serde(rename = "imageID")]
    pub image_id: String,

    #[serde(rename = "procType")]
    pub processor_type: ProcessorType,

    #[serde(rename = "sysType")]
    pub system_type: SystemType,

    pub memory: f64,

    pub processors: f64,

    pub key_pair_name: String,

    #[serde(rename = "networkIDs")]
    pub network_ids: Vec<String>,

    #[serde(default, rename = "volumeIDs", skip_serializing_if = "Vec::is_empty")]
    pub volume_ids: Vec<String>,

    /// Number of identical instances to create in this call
    pub replicants: u32,

    #[serde(rename = "replicantAffinityPolicy")]
    pub replication_policy: ReplicationPolicy,

    #[serde(rename = "replicantNamingScheme")]
    pub naming_scheme: ReplicantNamingScheme,

    /// Only `soft` and `hard` are sent; `none` is left to the remote default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_policy: Option<PinPolicy>,

    /// Base64 encoded cloud-init payload
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_data: String,
}

/// Partial body of an update call; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceRequest {
    #[serde(default, rename = "serverName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, rename = "procType", skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<ProcessorType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<f64>,
}

impl UpdateInstanceRequest {
    /// True when the body changes memory or processor count
    pub fn touches_capacity(&self) -> bool {
        self.memory.is_some() || self.processors.is_some()
    }
}
