//! Poll intervals and retry policies.
//!
//! Real consoles need real delays (a commit takes tens of seconds, a
//! shutdown minutes). Everything is injectable so tests can run the same
//! code paths with zero delays and bounded retries.

use std::time::Duration;

/// How often and how long the engine waits.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Sleep between polls in the command loop.
    pub poll_interval: Duration,

    /// How long configuration mode must stay up before it is trusted.
    pub config_settle: Duration,

    /// Sleep between commit status polls.
    pub commit_poll: Duration,

    /// Wait after issuing a mount before reading the result.
    pub mount_settle: Duration,

    /// Heartbeat interval while waiting for power operations.
    pub heartbeat: Duration,

    /// Pause after a copy to removable storage before unmounting.
    pub copy_settle: Duration,

    /// Pause between payload lines so the console does not drop input.
    pub line_pacing: Duration,

    /// Probes sent by the liveness check before giving up.
    pub liveness_attempts: u32,

    /// Upper bound on polls per wait (None: wait until matched).
    pub max_polls: Option<u32>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            config_settle: Duration::from_secs(15),
            commit_poll: Duration::from_secs(5),
            mount_settle: Duration::from_secs(5),
            heartbeat: Duration::from_secs(15),
            copy_settle: Duration::from_secs(5),
            line_pacing: Duration::from_millis(50),
            liveness_attempts: 5,
            max_polls: None,
        }
    }
}

impl Timing {
    /// No delays at all; waits give up after `max_polls` polls.
    pub fn immediate(max_polls: u32) -> Self {
        Self {
            poll_interval: Duration::ZERO,
            config_settle: Duration::ZERO,
            commit_poll: Duration::ZERO,
            mount_settle: Duration::ZERO,
            heartbeat: Duration::ZERO,
            copy_settle: Duration::ZERO,
            line_pacing: Duration::ZERO,
            liveness_attempts: 3,
            max_polls: Some(max_polls),
        }
    }

    /// Whether a wait that has polled `polls` times must give up.
    pub fn polls_exhausted(&self, polls: u32) -> bool {
        self.max_polls.is_some_and(|max| polls >= max)
    }
}

/// Retry policy for observational loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up (None: retry forever).
    pub max_attempts: Option<u32>,

    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Retry forever.
    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    /// Retry at most `attempts` times.
    pub const fn limited(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(attempts),
            delay,
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }
}

/// Retry policies for the three loops that retry on their own.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicies {
    /// Reaching the login banner.
    pub reach_login: RetryPolicy,

    /// Waiting for removable storage to appear.
    pub mount: RetryPolicy,

    /// Re-entering configuration mode after the device closed it.
    pub config_entry: RetryPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            reach_login: RetryPolicy::unbounded(Duration::from_millis(200)),
            mount: RetryPolicy::unbounded(Duration::from_secs(10)),
            config_entry: RetryPolicy::unbounded(Duration::ZERO),
        }
    }
}

impl RetryPolicies {
    /// Every loop bounded to `attempts` with no delay.
    pub fn bounded(attempts: u32) -> Self {
        let policy = RetryPolicy::limited(attempts, Duration::ZERO);
        Self {
            reach_login: policy,
            mount: policy,
            config_entry: policy,
        }
    }
}
