//! Generic state polling
//!
//! [`wait_for`] drives one [`WaitProfile`]: it calls a probe on a fixed
//! cadence until the probe reports a target state, a state outside the
//! profile, an error, or the profile's overall timeout runs out.

use crate::error::{LifecycleError, Result};
use crate::state::{LifecycleState, join_labels};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep_until, timeout_at};

/// Configuration of one polling wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitProfile {
    /// Short name used in logs and errors
    pub name: &'static str,
    /// States that keep the wait going
    pub pending: &'static [LifecycleState],
    /// States that end the wait successfully
    pub target: &'static [LifecycleState],
    /// Pause before the first probe
    pub delay: Duration,
    /// Minimum spacing between the start of two probes
    pub poll_interval: Duration,
    /// Longest a single probe may take
    pub probe_timeout: Duration,
    /// Overall budget, delay included
    pub timeout: Duration,
}

impl WaitProfile {
    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Shrinks the overall timeout so the wait cannot outlive `deadline`
    pub fn within(self, deadline: Instant) -> Self {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.with_timeout(self.timeout.min(remaining))
    }

    pub fn is_target(&self, state: LifecycleState) -> bool {
        self.target.contains(&state)
    }

    pub fn is_pending(&self, state: LifecycleState) -> bool {
        self.pending.contains(&state)
    }
}

/// Polls `probe` until it reports one of `profile.target`
///
/// Returns the snapshot that came with the target state. A probe error is
/// returned as is, without another attempt.
pub async fn wait_for<T, F, Fut>(profile: &WaitProfile, subject: &str, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(T, LifecycleState)>>,
{
    let started = Instant::now();
    let deadline = started + profile.timeout;
    let mut last_state = None;
    let mut attempt: u32 = 0;

    let timed_out = |last_state: Option<LifecycleState>| {
        tracing::warn!(
            "Timed out waiting for {} to be {} after {:?}",
            subject,
            profile.name,
            started.elapsed()
        );
        LifecycleError::Timeout {
            wait: profile.name,
            subject: subject.to_string(),
            elapsed: started.elapsed(),
            last_state,
        }
    };

    if !profile.delay.is_zero() {
        sleep_until((started + profile.delay).min(deadline)).await;
    }

    loop {
        let probe_started = Instant::now();
        if probe_started >= deadline {
            return Err(timed_out(last_state));
        }
        attempt += 1;

        let probe_deadline = (probe_started + profile.probe_timeout).min(deadline);
        let (snapshot, state) = match timeout_at(probe_deadline, probe()).await {
            Ok(outcome) => outcome?,
            Err(_) if probe_deadline == deadline => return Err(timed_out(last_state)),
            Err(_) => {
                tracing::warn!(
                    "Probe for {} stalled for {:?} while waiting for {}",
                    subject,
                    profile.probe_timeout,
                    profile.name
                );
                return Err(LifecycleError::ProbeTimeout {
                    wait: profile.name,
                    subject: subject.to_string(),
                    budget: profile.probe_timeout,
                });
            }
        };

        tracing::debug!(
            "{} is {} (wait: {}, attempt {}, elapsed {:?})",
            subject,
            state,
            profile.name,
            attempt,
            started.elapsed()
        );

        if profile.is_target(state) {
            tracing::info!("{} is {} ({})", subject, profile.name, state);
            return Ok(snapshot);
        }

        if !profile.is_pending(state) {
            tracing::warn!(
                "{} entered unexpected state {} while waiting for {}",
                subject,
                state,
                profile.name
            );
            return Err(LifecycleError::UnexpectedState {
                wait: profile.name,
                subject: subject.to_string(),
                state,
                pending: join_labels(profile.pending),
                target: join_labels(profile.target),
            });
        }

        last_state = Some(state);

        let next_probe = probe_started + profile.poll_interval;
        if next_probe >= deadline {
            sleep_until(deadline).await;
            return Err(timed_out(last_state));
        }
        sleep_until(next_probe).await;
    }
}
