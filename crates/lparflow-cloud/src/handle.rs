//! Composite instance identity
//!
//! A handle addresses one instance inside one cloud instance (container):
//! `<container_id>/<instance_id>`. Instances created together as replicants
//! are exposed as a [`ReplicaSet`], which formats as
//! `<container_id>/<id1>/<id2>/...` and splits back into one handle per
//! replicant.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '/';

/// Address of exactly one remote instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceHandle {
    pub container_id: String,
    pub instance_id: String,
}

impl InstanceHandle {
    pub fn new(container_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.container_id, self.instance_id)
    }
}

impl FromStr for InstanceHandle {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match split_parts(s)?.as_slice() {
            [container, instance] => Ok(InstanceHandle::new(*container, *instance)),
            _ => Err(CloudError::InvalidHandle(format!(
                "'{s}' must be <container_id>/<instance_id>"
            ))),
        }
    }
}

/// Replicants created by a single create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSet {
    pub container_id: String,
    pub instance_ids: Vec<String>,
}

impl ReplicaSet {
    pub fn new(container_id: impl Into<String>, instance_ids: Vec<String>) -> Self {
        Self {
            container_id: container_id.into(),
            instance_ids,
        }
    }

    pub fn len(&self) -> usize {
        self.instance_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_ids.is_empty()
    }

    /// Groups handles that share one container; `None` when empty or mixed
    pub fn from_handles(handles: impl IntoIterator<Item = InstanceHandle>) -> Option<Self> {
        let mut set: Option<ReplicaSet> = None;
        for handle in handles {
            match set.as_mut() {
                None => set = Some(ReplicaSet::new(handle.container_id, vec![handle.instance_id])),
                Some(existing) if existing.container_id == handle.container_id => {
                    existing.instance_ids.push(handle.instance_id)
                }
                Some(_) => return None,
            }
        }
        set
    }

    /// One handle per replicant, in creation order
    pub fn handles(&self) -> Vec<InstanceHandle> {
        self.instance_ids
            .iter()
            .map(|id| InstanceHandle::new(&self.container_id, id))
            .collect()
    }
}

impl fmt::Display for ReplicaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.container_id)?;
        for id in &self.instance_ids {
            write!(f, "{SEPARATOR}{id}")?;
        }
        Ok(())
    }
}

impl FromStr for ReplicaSet {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = split_parts(s)?;
        if parts.len() < 2 {
            return Err(CloudError::InvalidHandle(format!(
                "'{s}' must be <container_id>/<instance_id>[/<instance_id>...]"
            )));
        }
        let instance_ids: Vec<String> = parts[1..].iter().map(|p| p.to_string()).collect();
        for (i, id) in instance_ids.iter().enumerate() {
            if instance_ids[..i].contains(id) {
                return Err(CloudError::InvalidHandle(format!(
                    "'{s}' lists instance {id} more than once"
                )));
            }
        }
        Ok(ReplicaSet::new(parts[0], instance_ids))
    }
}

fn split_parts(s: &str) -> Result<Vec<&str>> {
    let parts: Vec<&str> = s.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(CloudError::InvalidHandle(format!(
            "'{s}' contains an empty segment"
        )));
    }
    Ok(parts)
}
