//! Remote instance client trait definition

use crate::action::InstanceAction;
use crate::error::Result;
use crate::handle::InstanceHandle;
use crate::instance::Instance;
use crate::request::{CreateInstanceRequest, UpdateInstanceRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote compute API for LPAR instances
///
/// Implementations perform the network calls; callers get either a
/// snapshot or a [`CloudError`](crate::CloudError). A missing instance must
/// be reported as an error for which
/// [`is_not_found`](crate::CloudError::is_not_found) is true.
#[async_trait]
pub trait InstanceClient: Send + Sync {
    /// Create `request.replicants` instances in `container_id`
    ///
    /// Returns one snapshot per created instance.
    async fn create(
        &self,
        container_id: &str,
        request: &CreateInstanceRequest,
    ) -> Result<Vec<Instance>>;

    /// Read the current snapshot of an instance
    async fn get(&self, handle: &InstanceHandle) -> Result<Instance>;

    /// Apply a partial update
    async fn update(
        &self,
        handle: &InstanceHandle,
        request: &UpdateInstanceRequest,
    ) -> Result<Instance>;

    /// Request a power action; returns once the remote accepted it
    async fn action(&self, handle: &InstanceHandle, action: InstanceAction) -> Result<()>;

    /// Request deletion; returns once the remote accepted it
    async fn delete(&self, handle: &InstanceHandle) -> Result<()>;
}

#[async_trait]
impl<T: InstanceClient + ?Sized> InstanceClient for Arc<T> {
    async fn create(
        &self,
        container_id: &str,
        request: &CreateInstanceRequest,
    ) -> Result<Vec<Instance>> {
        (**self).create(container_id, request).await
    }

    async fn get(&self, handle: &InstanceHandle) -> Result<Instance> {
        (**self).get(handle).await
    }

    async fn update(
        &self,
        handle: &InstanceHandle,
        request: &UpdateInstanceRequest,
    ) -> Result<Instance> {
        (**self).update(handle, request).await
    }

    async fn action(&self, handle: &InstanceHandle, action: InstanceAction) -> Result<()> {
        (**self).action(handle, action).await
    }

    async fn delete(&self, handle: &InstanceHandle) -> Result<()> {
        (**self).delete(handle).await
    }
}
