//! Verification and retry patterns.
//!
//! Each check encodes its own policy. Commit results are reported, never
//! retried. Mount detection retries while the drive is missing but aborts
//! on a permission error. Liveness probes a few times and fails fast.

use std::time::Duration;

use log::{debug, error, info, warn};

use super::command::{CommandStep, Condition};
use super::session::{Session, pause};
use crate::channel::DeviceMarker;
use crate::error::{DriverError, Result};
use crate::transport::Transport;

/// Result of racing two signals in the output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceOutcome {
    /// Whether the success signal came first.
    pub succeeded: bool,

    /// Everything read while waiting.
    pub output: String,
}

impl<T: Transport> Session<T> {
    /// Poll until `success` or `failure` shows up.
    ///
    /// Output is accumulated across polls; if both appear, whichever comes
    /// earlier in the stream wins.
    pub async fn race(
        &mut self,
        success: &str,
        failure: &str,
        interval: Duration,
    ) -> Result<RaceOutcome> {
        let mut output = String::new();
        let mut polls = 0u32;

        loop {
            pause(interval).await;
            output.push_str(&self.channel.poll().await?);
            polls += 1;

            let succeeded = match (output.find(success), output.find(failure)) {
                (Some(s), Some(f)) => Some(s < f),
                (Some(_), None) => Some(true),
                (None, Some(_)) => Some(false),
                (None, None) => None,
            };
            if let Some(succeeded) = succeeded {
                return Ok(RaceOutcome { succeeded, output });
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: format!("waiting for '{}' or '{}'", success, failure),
                    attempts: polls,
                }
                .into());
            }
        }
    }

    /// Wait for the outcome of a commit already sent.
    ///
    /// A failed commit is reported and left alone: the device stays in
    /// configuration mode for manual troubleshooting.
    pub async fn verify_commit(&mut self) -> Result<bool> {
        let success = self.profile.signals.commit_success.clone();
        let failure = self.profile.signals.commit_failure.clone();

        let outcome = self
            .race(&success, &failure, self.timing.commit_poll)
            .await?;

        if outcome.succeeded {
            info!("Commit complete");
        } else {
            error!("Commit failed, troubleshoot the switch manually");
            debug!("commit output: {:?}", outcome.output);
        }
        Ok(outcome.succeeded)
    }

    /// Mount removable storage from the shell.
    ///
    /// A missing drive is retried under the mount retry policy. A
    /// permission error is fatal: the session backs out to login and the
    /// error is returned. Success is inferred from the absence of both
    /// negative signals with the shell prompt back.
    pub async fn mount_storage(&mut self) -> Result<()> {
        let policy = self.retries.mount;
        let mount = self.profile.storage.mount.clone();
        let mut attempts = 0u32;

        loop {
            self.command(&CommandStep::new(DeviceMarker::Shell, mount.as_str()))
                .await?;
            pause(self.timing.mount_settle).await;
            let text = self.channel.poll().await?;
            attempts += 1;

            let signals = &self.profile.signals;
            if contains_ignore_case(&text, &signals.permission_denied) {
                error!("Mount not permitted, log in as root and retry");
                self.reach_login().await?;
                return Err(DriverError::MountPermissionDenied.into());
            }

            if !contains_ignore_case(&text, &signals.no_device)
                && self.profile.classify(&text) == DeviceMarker::Shell
            {
                info!("USB drive mounted");
                return Ok(());
            }

            warn!("USB drive not detected, insert a drive");
            if !policy.allows(attempts) {
                return Err(DriverError::RetriesExhausted {
                    operation: "mounting removable storage".to_string(),
                    attempts,
                }
                .into());
            }
            pause(policy.delay).await;
        }
    }

    /// Make sure something is answering on the line.
    pub async fn check_liveness(&mut self) -> Result<()> {
        let attempts = self.timing.liveness_attempts;

        for attempt in 1..=attempts {
            self.channel.probe().await?;
            pause(self.timing.poll_interval).await;
            let text = self.channel.poll().await?;
            if !text.trim().is_empty() {
                return Ok(());
            }
            warn!("No response from console ({}/{})", attempt, attempts);
        }

        error!("Console is silent, check the cable and port");
        Err(DriverError::NoResponse { attempts }.into())
    }

    /// Wait out a long device operation, printing a heartbeat.
    ///
    /// Used for shutdown and reboot, which give no progress output worth
    /// parsing. Nothing is sent while waiting.
    pub async fn await_terminal(&mut self, condition: impl Into<Condition>) -> Result<String> {
        let condition = condition.into();
        let mut polls = 0u32;

        loop {
            pause(self.timing.heartbeat).await;
            let text = self.channel.poll().await?;
            polls += 1;

            if condition.is_met(&text, &self.profile) {
                return Ok(text);
            }
            info!("...");

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: format!("waiting for {}", condition),
                    attempts: polls,
                }
                .into());
            }
        }
    }
}

fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_ascii_lowercase()
        .contains(needle.to_ascii_lowercase().as_str())
}
