//! Configuration load.

use log::{error, info, warn};

use super::login_to_cli;
use crate::channel::DeviceMarker;
use crate::config::{ConfigPayload, LoadFormat};
use crate::driver::{CommandStep, Session, pause};
use crate::error::{DriverError, Result};
use crate::provisioning::{self, ProvisioningLog, ProvisioningRecord};
use crate::transport::Transport;

/// Load a configuration payload, commit it and record the switch.
///
/// Steps: liveness check, fresh login, settled configuration mode,
/// terminal load of the payload, optional root password seeding, commit,
/// provisioning extraction, logout. Load and commit failures are fatal
/// and leave the switch in configuration mode for inspection. A record
/// that cannot be written to the log is reported but does not fail the
/// load.
pub async fn load_config<T: Transport>(
    session: &mut Session<T>,
    payload: &ConfigPayload,
    log: &ProvisioningLog,
) -> Result<ProvisioningRecord> {
    info!("Loading configuration '{}'", payload.name);

    login_to_cli(session).await?;
    session.enter_config().await?;

    let commands = session.profile().commands.clone();
    let signals = session.profile().signals.clone();

    let load = match payload.format {
        LoadFormat::Stanza => commands.load_override.as_str(),
        LoadFormat::Set => commands.load_set.as_str(),
    };
    session
        .run_steps(&[
            CommandStep::new(DeviceMarker::Config, load),
            CommandStep::wait(signals.load_ready.as_str()).without_probe(),
        ])
        .await?;

    info!("Sending configuration...");
    for line in payload.lines() {
        session.channel_mut().send_line(line).await?;
        pause(session.timing().line_pacing).await;
    }
    session
        .channel_mut()
        .send_raw(&commands.end_of_input)
        .await?;

    let interval = session.timing().poll_interval;
    let outcome = session
        .race(&signals.load_success, &signals.load_failure, interval)
        .await?;
    if !outcome.succeeded {
        let message = outcome
            .output
            .lines()
            .find(|line| line.contains(signals.load_failure.as_str()))
            .unwrap_or(signals.load_failure.as_str())
            .trim()
            .to_string();
        error!("Configuration rejected by the switch: {}", message);
        return Err(DriverError::LoadFailed { message }.into());
    }

    if let Some(hash) = session.credentials().root_hash() {
        let seed = session.profile().root_hash_command(hash);
        session
            .command(
                &CommandStep::new(DeviceMarker::Config, seed)
                    .hidden()
                    .reaction("Setting root authentication"),
            )
            .await?;
    }

    session
        .command(
            &CommandStep::new(DeviceMarker::Config, commands.commit.as_str())
                .reaction("Committing configuration..."),
        )
        .await?;
    if !session.verify_commit().await? {
        return Err(DriverError::CommitFailed.into());
    }

    session
        .command(&CommandStep::new(
            DeviceMarker::Config,
            commands.exit_configure.as_str(),
        ))
        .await?;

    let record = provisioning::extract(session, &payload.name).await?;
    if let Err(e) = log.append(&record) {
        warn!("Could not write provisioning record: {}", e);
    }

    info!("Logging out");
    session.reach_login().await?;
    info!("Configuration '{}' applied", payload.name);
    Ok(record)
}
