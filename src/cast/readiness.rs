use crate::client::Downstream;
use crate::constants::{
    DEFAULT_NOT_READY_STATES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_READY_TIMEOUT_SECS,
};

use tokio::time::{sleep, timeout, Duration, Instant};

/// How to wait for a device to come up after it has been turned on
///
/// A device is ready once it reports a non-empty state that is not one of
/// `not_ready_states`. The defaults poll every 2 seconds for up to 30 seconds and treat
/// `unavailable` and `off` as not ready.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessPolicy {
    interval: Duration,
    deadline: Duration,
    not_ready_states: Vec<String>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
        )
    }
}

impl ReadinessPolicy {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self {
            interval,
            deadline,
            not_ready_states: DEFAULT_NOT_READY_STATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the set of states that mean "not ready"
    pub fn with_not_ready_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.not_ready_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn not_ready_states(&self) -> &[String] {
        &self.not_ready_states
    }

    pub fn is_ready(&self, state: &str) -> bool {
        !state.is_empty() && !self.not_ready_states.iter().any(|s| s == state)
    }
}

/// Outcome of [`wait_until_ready()`]
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// The state the device reported when it was found ready
    Ready(String),
    TimedOut {
        elapsed: Duration,
        last_state: Option<String>,
    },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Poll `entity_id` until it is ready or the policy deadline passes
///
/// Failed polls are logged and otherwise ignored. The deadline is measured on the monotonic
/// clock from the first poll, and both each poll and each pause are cut short at the
/// deadline, so slow responses cannot stretch the wait.
pub async fn wait_until_ready<D>(downstream: &D, entity_id: &str, policy: &ReadinessPolicy) -> Readiness
where
    D: Downstream + ?Sized,
{
    let start = Instant::now();
    let mut last_state: Option<String> = None;

    loop {
        let elapsed = start.elapsed();
        if elapsed >= policy.deadline {
            return Readiness::TimedOut {
                elapsed,
                last_state,
            };
        }

        match timeout(policy.deadline - elapsed, downstream.state(entity_id)).await {
            Ok(Ok(device)) => match device.reported_state() {
                Some(state) if policy.is_ready(state) => {
                    log::info!(
                        target: "cast_proxy::cast",
                        "Media player {} is ready (state: {})",
                        entity_id,
                        state
                    );
                    return Readiness::Ready(state.to_string());
                }
                state => {
                    log::debug!(
                        target: "cast_proxy::cast",
                        "Media player {} not ready yet (state: {:?})",
                        entity_id,
                        state
                    );
                    last_state = state.map(String::from);
                }
            },
            Ok(Err(e)) => {
                log::warn!(
                    target: "cast_proxy::cast",
                    "Failed to get state for {}: {}",
                    entity_id,
                    e
                );
            }
            Err(_) => {
                log::warn!(
                    target: "cast_proxy::cast",
                    "State request for {} did not finish before the deadline",
                    entity_id
                );
            }
        }

        let remaining = policy.deadline.saturating_sub(start.elapsed());
        sleep(policy.interval.min(remaining)).await;
    }
}
