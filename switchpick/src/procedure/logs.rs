//! Diagnostic log collection to a USB drive.

use log::info;

use super::login_to_cli;
use crate::channel::DeviceMarker;
use crate::driver::{CommandStep, Session, pause};
use crate::error::Result;
use crate::transport::Transport;

/// Generate support information and a log archive, then copy both to
/// removable storage.
///
/// The session ends back at the login banner. A drive that cannot be
/// mounted for lack of privilege aborts the whole collection.
pub async fn collect_logs<T: Transport>(session: &mut Session<T>) -> Result<()> {
    login_to_cli(session).await?;

    let commands = session.profile().commands.clone();
    let storage = session.profile().storage.clone();

    // Each long-running command is only followed once its prompt returns.
    session
        .run_steps(&[
            CommandStep::new(DeviceMarker::Operational, commands.support_info)
                .reaction("Generating RSI files (2 minutes)..."),
            CommandStep::new(DeviceMarker::Operational, commands.archive_logs)
                .without_probe()
                .reaction("Generating log archive (30 seconds)..."),
            CommandStep::new(DeviceMarker::Operational, commands.start_shell)
                .without_probe()
                .reaction("Moving to shell"),
        ])
        .await?;

    info!("Searching for drive...");
    session.mount_storage().await?;

    for (index, artifact) in storage.artifacts.iter().enumerate() {
        let copy = CommandStep::new(
            DeviceMarker::Shell,
            format!("cp {} {}", artifact, storage.mount_point),
        )
        .reaction(format!("Copying {}", artifact));
        let copy = if index == 0 { copy } else { copy.without_probe() };
        session.command(&copy).await?;
    }
    pause(session.timing().copy_settle).await;

    session
        .command(
            &CommandStep::new(DeviceMarker::Shell, storage.unmount.as_str())
                .without_probe()
                .reaction(format!("Logs copied, unmounting {}", storage.mount_point)),
        )
        .await?;

    info!("Logging out");
    session.reach_login().await?;
    info!("Log collection complete, console at the login prompt");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::test_support::session;
    use crate::error::{DriverError, Error};
    use crate::transport::scripted::ScriptedTransport;

    const LOGIN: &str = "\r\nAmnesiac (ttyu0)\r\n\r\nlogin: ";
    const OPERATIONAL: &str = "\r\n{master:0}\r\nadmin> ";
    const SHELL: &str = "\r\nadmin@sw:RE:0% ";
    const MOUNT: &str = "mount_msdosfs /dev/da1s1 /mnt";

    fn device() -> ScriptedTransport {
        ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on("secret", OPERATIONAL)
            .on(
                "request support information | save /var/tmp/RSI.txt",
                OPERATIONAL,
            )
            .on(
                "file archive source /var/log destination /var/tmp/LOGS",
                OPERATIONAL,
            )
            .on("start shell", SHELL)
            .on("cp /var/tmp/RSI.txt /mnt", SHELL)
            .on("cp /var/tmp/LOGS.tar /mnt", SHELL)
            .on("umount /mnt", SHELL)
            .on("exit", OPERATIONAL)
            .on("exit", LOGIN)
    }

    #[tokio::test]
    async fn test_collect_logs() {
        let device = device().on(MOUNT, SHELL);
        let mut session = session(device.clone());

        collect_logs(&mut session).await.unwrap();

        assert_eq!(
            device.commands(),
            vec![
                "admin",
                "secret",
                "request support information | save /var/tmp/RSI.txt",
                "file archive source /var/log destination /var/tmp/LOGS",
                "start shell",
                MOUNT,
                "cp /var/tmp/RSI.txt /mnt",
                "cp /var/tmp/LOGS.tar /mnt",
                "umount /mnt",
                "exit",
                "exit",
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_logs_aborts_without_mount_permission() {
        let device = device().on(
            MOUNT,
            "mount_msdosfs: /dev/da1s1: Operation not permitted\r\nadmin@sw:RE:0% ",
        );
        let mut session = session(device.clone());

        let result = collect_logs(&mut session).await;

        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::MountPermissionDenied))
        ));
        assert_eq!(device.count("cp /var/tmp/RSI.txt /mnt"), 0);
        assert_eq!(device.count("exit"), 2);
    }
}
