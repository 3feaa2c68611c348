//! Lifecycle controller: create, read, update, delete and exists

use crate::config::LifecycleConfig;
use crate::error::{LifecycleError, Result};
use crate::model::{DesiredResources, InstanceRecord, InstanceSpec};
use crate::resize::{ResizeOrchestrator, ResizeRequest};
use crate::waits::{self, AVAILABLE, DELETED};
use lparflow_cloud::{Capacity, Instance, InstanceClient, InstanceHandle, ReplicaSet};
use std::collections::HashSet;
use tokio::time::Instant;

/// Drives instance lifecycle operations through an [`InstanceClient`]
///
/// Each operation runs to completion on the calling task and issues one
/// remote call at a time. Waits inside an operation share that operation's
/// budget from [`LifecycleConfig`].
pub struct LifecycleController<C> {
    client: C,
    config: LifecycleConfig,
}

impl<C: InstanceClient> LifecycleController<C> {
    pub fn new(client: C, config: LifecycleConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Creates `spec.replicants` instances and waits for each to be available
    ///
    /// Returns one record per replicant, in the order the remote listed them.
    #[tracing::instrument(skip_all, fields(container = %container_id, name = %spec.name))]
    pub async fn create(
        &self,
        container_id: &str,
        spec: &InstanceSpec,
    ) -> Result<Vec<InstanceRecord>> {
        spec.validate()?;
        let deadline = Instant::now() + self.config.create_timeout();

        let request = spec.to_request();
        tracing::info!(
            "Creating {} replicant(s) of {} in {}",
            request.replicants,
            request.name,
            container_id
        );
        let created = self.client.create(container_id, &request).await?;

        let mut seen = HashSet::new();
        let handles: Vec<InstanceHandle> = created
            .iter()
            .filter(|instance| seen.insert(instance.instance_id.clone()))
            .map(|instance| InstanceHandle::new(container_id, instance.instance_id.clone()))
            .collect();

        if handles.len() != request.replicants as usize {
            tracing::warn!(
                "Requested {} replicant(s) but the remote returned {} distinct instance(s)",
                request.replicants,
                handles.len()
            );
            return Err(LifecycleError::ReplicantMismatch {
                requested: request.replicants,
                returned: handles.len(),
                handles,
            });
        }

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            let profile = AVAILABLE.within(deadline);
            waits::wait_for_instance(&self.client, &handle, &profile).await?;
            let instance = self.client.get(&handle).await?;
            records.push(InstanceRecord { handle, instance });
        }
        if let Some(set) = ReplicaSet::from_handles(records.iter().map(|r| r.handle.clone())) {
            tracing::info!("Created {}", set);
        }
        Ok(records)
    }

    /// Reads the current snapshot; not-found is reported through
    /// [`LifecycleError::is_not_found`]
    #[tracing::instrument(skip_all, fields(handle = %handle))]
    pub async fn read(&self, handle: &InstanceHandle) -> Result<Instance> {
        Ok(self.client.get(handle).await?)
    }

    /// Brings the instance to `desired`, starting from the last known
    /// snapshot `current`
    ///
    /// A processor-type change runs first, then the capacity change. A name
    /// change rides along with the capacity update, or is sent alone when
    /// nothing else changes. Returns a snapshot read after all changes.
    #[tracing::instrument(skip_all, fields(handle = %handle))]
    pub async fn update(
        &self,
        handle: &InstanceHandle,
        current: &Instance,
        desired: &DesiredResources,
    ) -> Result<Instance> {
        if current.is_health_warning() {
            tracing::warn!("Refusing to update {} while its health is WARNING", handle);
            return Err(LifecycleError::HealthWarning {
                operation: "update",
                handle: handle.to_string(),
            });
        }

        let changes = desired.changes(current);
        if changes.is_empty() {
            tracing::debug!("Nothing to change on {}", handle);
            return Ok(self.client.get(handle).await?);
        }

        let deadline = Instant::now() + self.config.update_timeout();
        let orchestrator = ResizeOrchestrator::new(&self.client, self.config.stop_action, deadline);

        let mut latest = current.clone();
        if let Some(processor_type) = changes.processor_type {
            latest = orchestrator
                .change_processor_type(handle, &latest, processor_type)
                .await?;
        }

        if changes.touches_capacity() {
            let request = ResizeRequest {
                name: changes.name.clone(),
                processor_type: None,
                capacity: Capacity::new(
                    changes.memory.unwrap_or(latest.memory),
                    changes.processors.unwrap_or(latest.processors),
                ),
            };
            orchestrator.resize(handle, &latest, &request).await?;
        } else if changes.name.is_some() {
            tracing::info!("Renaming {}", handle);
            self.client.update(handle, &changes.rename_request()).await?;
        }

        Ok(self.client.get(handle).await?)
    }

    /// Requests deletion and waits until the instance is gone
    #[tracing::instrument(skip_all, fields(handle = %handle))]
    pub async fn delete(&self, handle: &InstanceHandle) -> Result<()> {
        let deadline = Instant::now() + self.config.delete_timeout();
        tracing::info!("Deleting {}", handle);
        self.client.delete(handle).await?;

        let profile = DELETED.within(deadline);
        waits::wait_for_deletion(&self.client, handle, &profile).await
    }

    /// True when the instance behind `handle` exists and carries its id
    #[tracing::instrument(skip_all, fields(handle = %handle))]
    pub async fn exists(&self, handle: &InstanceHandle) -> Result<bool> {
        match self.client.get(handle).await {
            Ok(instance) => Ok(instance.instance_id == handle.instance_id),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} not found", handle);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
