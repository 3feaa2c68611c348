//! Named wait profiles and the probes that feed them

use crate::error::{LifecycleError, Result};
use crate::poller::{WaitProfile, wait_for};
use crate::state::LifecycleState;
use lparflow_cloud::{Instance, InstanceClient, InstanceHandle};
use std::time::Duration;

const MINUTE: u64 = 60;

/// Instance reports ACTIVE with OK health
///
/// Power-off and resize states stay pending: right after a start the remote
/// may still report the state the instance had before.
pub const AVAILABLE: WaitProfile = WaitProfile {
    name: "available",
    pending: &[
        LifecycleState::Pending,
        LifecycleState::Build,
        LifecycleState::HealthWarning,
        LifecycleState::Shutoff,
        LifecycleState::Stopping,
        LifecycleState::Resize,
        LifecycleState::VerifyResize,
    ],
    target: &[LifecycleState::Active],
    delay: Duration::from_secs(10),
    poll_interval: Duration::from_secs(10),
    probe_timeout: Duration::from_secs(2 * MINUTE),
    timeout: Duration::from_secs(60 * MINUTE),
};

/// Instance reports SHUTOFF with OK health
///
/// Running states stay pending until the stop request takes effect.
pub const STOPPED: WaitProfile = WaitProfile {
    name: "stopped",
    pending: &[
        LifecycleState::Stopping,
        LifecycleState::Resize,
        LifecycleState::VerifyResize,
        LifecycleState::HealthWarning,
        LifecycleState::Active,
        LifecycleState::Build,
        LifecycleState::Pending,
    ],
    target: &[LifecycleState::Shutoff],
    delay: Duration::from_secs(10),
    poll_interval: Duration::from_secs(10),
    probe_timeout: Duration::from_secs(2 * MINUTE),
    timeout: Duration::from_secs(30 * MINUTE),
};

/// A capacity change finished and the instance settled, on or off
pub const RESIZED: WaitProfile = WaitProfile {
    name: "resized",
    pending: &[
        LifecycleState::Resize,
        LifecycleState::VerifyResize,
        LifecycleState::Stopping,
        LifecycleState::Build,
        LifecycleState::Pending,
        LifecycleState::HealthWarning,
    ],
    target: &[LifecycleState::Shutoff, LifecycleState::Active],
    delay: Duration::from_secs(10),
    poll_interval: Duration::from_secs(10),
    probe_timeout: Duration::from_secs(5 * MINUTE),
    timeout: Duration::from_secs(60 * MINUTE),
};

/// The remote no longer knows the instance
pub const DELETED: WaitProfile = WaitProfile {
    name: "deleted",
    pending: &[LifecycleState::Retry, LifecycleState::Deleting],
    target: &[LifecycleState::NotFound],
    delay: Duration::from_secs(10),
    poll_interval: Duration::from_secs(10),
    probe_timeout: Duration::from_secs(10),
    timeout: Duration::from_secs(10 * MINUTE),
};

/// Reads one snapshot and classifies it
pub async fn probe_instance<C>(
    client: &C,
    handle: &InstanceHandle,
) -> Result<(Instance, LifecycleState)>
where
    C: InstanceClient + ?Sized,
{
    let instance = client.get(handle).await?;
    let state = LifecycleState::classify(&instance);
    if state == LifecycleState::Unrecognized {
        tracing::warn!(
            "Instance {} reports unrecognized status {}",
            handle,
            instance.status
        );
    }
    Ok((instance, state))
}

/// Probe used after a delete request
///
/// Only a genuine not-found answer counts as gone; any other read error is
/// returned to the poller.
pub async fn probe_deletion<C>(
    client: &C,
    handle: &InstanceHandle,
) -> Result<(Option<Instance>, LifecycleState)>
where
    C: InstanceClient + ?Sized,
{
    match client.get(handle).await {
        Ok(instance) => {
            let state = LifecycleState::for_deletion(&instance);
            Ok((Some(instance), state))
        }
        Err(e) if e.is_not_found() => Ok((None, LifecycleState::NotFound)),
        Err(e) => Err(LifecycleError::Cloud(e)),
    }
}

/// Waits until `handle` reaches one of `profile`'s target states
pub async fn wait_for_instance<C>(
    client: &C,
    handle: &InstanceHandle,
    profile: &WaitProfile,
) -> Result<Instance>
where
    C: InstanceClient + ?Sized,
{
    let subject = handle.to_string();
    wait_for(profile, &subject, || probe_instance(client, handle)).await
}

/// Waits until reads of `handle` answer not-found
pub async fn wait_for_deletion<C>(
    client: &C,
    handle: &InstanceHandle,
    profile: &WaitProfile,
) -> Result<()>
where
    C: InstanceClient + ?Sized,
{
    let subject = handle.to_string();
    wait_for(profile, &subject, || probe_deletion(client, handle)).await?;
    Ok(())
}
