//! Graceful power off and reboot.
//!
//! Both are a single command with its confirmation answer, followed by a
//! long silent wait. Nothing is verified beyond the terminal marker.

use log::info;

use super::login_to_cli;
use crate::channel::DeviceMarker;
use crate::driver::{CommandStep, Session};
use crate::error::Result;
use crate::transport::Transport;

/// Log in and shut the switch down gracefully.
pub async fn power_off<T: Transport>(session: &mut Session<T>) -> Result<()> {
    login_to_cli(session).await?;
    shutdown(session).await
}

/// Log in and reboot the switch, waiting for the login banner.
pub async fn reboot<T: Transport>(session: &mut Session<T>) -> Result<()> {
    login_to_cli(session).await?;
    restart(session).await
}

/// Power off from the operational CLI.
pub(super) async fn shutdown<T: Transport>(session: &mut Session<T>) -> Result<()> {
    let command = session.profile().commands.power_off.clone();
    session
        .command(
            &CommandStep::new(DeviceMarker::Operational, command)
                .without_newline()
                .reaction("Requested shutdown (2 minutes)..."),
        )
        .await?;

    let done = session.profile().signals.shutdown_complete.clone();
    session.await_terminal(done).await?;
    info!("System shutdown complete, it is safe to unplug the switch");
    Ok(())
}

/// Reboot from the operational CLI.
pub(super) async fn restart<T: Transport>(session: &mut Session<T>) -> Result<()> {
    let command = session.profile().commands.reboot.clone();
    session
        .command(
            &CommandStep::new(DeviceMarker::Operational, command)
                .without_newline()
                .reaction("Rebooting (3-4 minutes)..."),
        )
        .await?;

    session.await_terminal(DeviceMarker::LoginBanner).await?;
    info!("Reboot complete, reached login prompt");
    Ok(())
}
