//! Capacity and processor-type changes on a running instance
//!
//! A change that stays under both capacity ceilings is sent as one update.
//! Anything above a ceiling goes through the stop / modify / start cycle:
//!
//! ```text
//!  stop ──▶ STOPPED ──▶ update ──▶ RESIZED ──▶ start ──▶ AVAILABLE
//! ```
//!
//! Start is issued even when the resize settles on ACTIVE.
//!
//! Nothing is rolled back. The first failing step aborts the sequence and
//! its error is returned as is.

use crate::error::Result;
use crate::poller::WaitProfile;
use crate::state::LifecycleState;
use crate::waits::{self, AVAILABLE, RESIZED, STOPPED};
use lparflow_cloud::{
    Capacity, Instance, InstanceAction, InstanceClient, InstanceHandle, ProcessorType,
    UpdateInstanceRequest,
};
use tokio::time::Instant;

/// How a capacity change is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePath {
    /// One update while the instance keeps running
    InPlace,
    /// Stop, update, then start again
    StopModifyStart,
}

impl ResizePath {
    pub fn plan(requested: &Capacity, ceiling: &Capacity) -> Self {
        if requested.fits_within(ceiling) {
            ResizePath::InPlace
        } else {
            ResizePath::StopModifyStart
        }
    }
}

/// Target values for a capacity change
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub name: Option<String>,
    /// Sent with the capacity; the instance's current type when unset
    pub processor_type: Option<ProcessorType>,
    pub capacity: Capacity,
}

/// Runs resize sequences against one client
///
/// Every wait is capped so that it ends no later than `deadline`.
pub struct ResizeOrchestrator<'a, C: ?Sized> {
    client: &'a C,
    stop_action: InstanceAction,
    deadline: Instant,
}

impl<'a, C> ResizeOrchestrator<'a, C>
where
    C: InstanceClient + ?Sized,
{
    pub fn new(client: &'a C, stop_action: InstanceAction, deadline: Instant) -> Self {
        Self {
            client,
            stop_action,
            deadline,
        }
    }

    /// Applies `request` to the instance last seen as `current`
    ///
    /// Returns the snapshot observed when the instance settled.
    pub async fn resize(
        &self,
        handle: &InstanceHandle,
        current: &Instance,
        request: &ResizeRequest,
    ) -> Result<Instance> {
        let ceiling = current.capacity_ceiling();
        let path = ResizePath::plan(&request.capacity, &ceiling);
        tracing::info!(
            "Resizing {} from {} to {} (ceiling {}, {:?})",
            handle,
            current.capacity(),
            request.capacity,
            ceiling,
            path
        );

        let update = UpdateInstanceRequest {
            name: request.name.clone(),
            processor_type: request.processor_type.or(current.processor_type),
            memory: Some(request.capacity.memory),
            processors: Some(request.capacity.processors),
        };

        match path {
            ResizePath::InPlace => {
                self.client.update(handle, &update).await?;
                // a powered-off instance stays off after an in-place change
                let settle = if is_shutoff(current) {
                    STOPPED
                } else {
                    AVAILABLE
                };
                self.wait(handle, &settle).await
            }
            ResizePath::StopModifyStart => {
                self.stop(handle, current).await?;
                self.client.update(handle, &update).await?;
                self.wait(handle, &RESIZED).await?;
                self.start(handle).await
            }
        }
    }

    /// Switches the processor type, which always needs a powered-off instance
    pub async fn change_processor_type(
        &self,
        handle: &InstanceHandle,
        current: &Instance,
        processor_type: ProcessorType,
    ) -> Result<Instance> {
        tracing::info!(
            "Changing processor type of {} to {}",
            handle,
            processor_type
        );
        self.stop(handle, current).await?;

        let update = UpdateInstanceRequest {
            processor_type: Some(processor_type),
            ..Default::default()
        };
        self.client.update(handle, &update).await?;
        self.wait(handle, &STOPPED).await?;

        self.start(handle).await
    }

    /// Stops the instance and waits for SHUTOFF, unless it already is
    async fn stop(&self, handle: &InstanceHandle, current: &Instance) -> Result<Instance> {
        if is_shutoff(current) {
            tracing::debug!("{} is already SHUTOFF", handle);
            return Ok(current.clone());
        }
        tracing::debug!("Requesting {} on {}", self.stop_action, handle);
        self.client.action(handle, self.stop_action).await?;
        self.wait(handle, &STOPPED).await
    }

    async fn start(&self, handle: &InstanceHandle) -> Result<Instance> {
        tracing::debug!("Requesting start on {}", handle);
        self.client.action(handle, InstanceAction::Start).await?;
        self.wait(handle, &AVAILABLE).await
    }

    async fn wait(&self, handle: &InstanceHandle, profile: &WaitProfile) -> Result<Instance> {
        let profile = profile.within(self.deadline);
        waits::wait_for_instance(self.client, handle, &profile).await
    }
}

fn is_shutoff(instance: &Instance) -> bool {
    LifecycleState::classify(instance) == LifecycleState::Shutoff
}
