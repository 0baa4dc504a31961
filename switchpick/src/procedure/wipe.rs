//! Configuration wipe.
//!
//! Removes the active, rollback and rescue configurations and the
//! configuration database, leaving the system logs in place.

use log::info;

use super::power::{restart, shutdown};
use crate::channel::DeviceMarker;
use crate::driver::{CommandStep, LoaderOutcome, Session};
use crate::error::{DriverError, Result};
use crate::transport::Transport;

/// How the root shell is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeEntry {
    /// Log in with the session credentials.
    Login,
    /// Interrupt boot and start a single-user recovery shell. Needs no
    /// credentials, only a power cycle.
    Loader,
}

/// What to do once the wipe is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WipeFollowUp {
    /// Stay at the shell.
    #[default]
    Leave,
    /// Shut down gracefully.
    PowerOff,
    /// Reboot to the login banner.
    Reboot,
}

/// Wipe the switch configuration.
pub async fn wipe<T: Transport>(
    session: &mut Session<T>,
    entry: WipeEntry,
    follow_up: WipeFollowUp,
) -> Result<()> {
    info!("Clean configuration wipe, system logs are kept");

    match entry {
        WipeEntry::Login => {
            session.check_liveness().await?;
            session.reach_login().await?;
            session.authenticate().await?;
            session.enter_shell().await?;
        }
        WipeEntry::Loader => recovery_shell(session).await?,
    }

    let steps: Vec<CommandStep> = session
        .profile()
        .wipe_commands()
        .into_iter()
        .map(|command| {
            let reaction = format!("  {}", command);
            CommandStep::new(DeviceMarker::Shell, command).reaction(reaction)
        })
        .collect();
    session.run_steps(&steps).await?;
    info!("Wipe complete");

    match follow_up {
        WipeFollowUp::Leave => Ok(()),
        WipeFollowUp::PowerOff => {
            session.enter_cli().await?;
            shutdown(session).await
        }
        WipeFollowUp::Reboot => {
            session.enter_cli().await?;
            restart(session).await
        }
    }
}

/// Loader → single-user boot → root shell.
async fn recovery_shell<T: Transport>(session: &mut Session<T>) -> Result<()> {
    if session.enter_loader().await? == LoaderOutcome::Login {
        return Err(DriverError::LoaderMissed.into());
    }

    let commands = session.profile().commands.clone();
    let recovery_prompt = session.profile().signals.recovery_prompt.clone();

    session
        .channel_mut()
        .send_line(&commands.single_user_boot)
        .await?;
    info!("Booting in single user mode (1 minute)...");

    session
        .run_steps(&[
            CommandStep::new(recovery_prompt, commands.recovery)
                .without_probe()
                .reaction("Starting password recovery (4 minutes)..."),
            CommandStep::new(DeviceMarker::Operational, commands.start_shell)
                .without_probe()
                .reaction("Starting shell..."),
        ])
        .await
}
