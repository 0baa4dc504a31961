//! State navigation.
//!
//! The device state is never tracked, only observed. Every routine here
//! polls, classifies the latest output and pushes the device one step
//! towards the wanted marker, so it converges no matter where the device
//! started.

use log::{debug, info, warn};

use super::command::CommandStep;
use super::session::{Session, pause};
use crate::channel::DeviceMarker;
use crate::error::{AuthRejection, DriverError, Result};
use crate::transport::Transport;

/// Where an attempt to reach the pre-boot loader ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderOutcome {
    /// The loader prompt was reached.
    Loader,
    /// Autoboot was not interrupted in time; the device booted to login.
    Login,
}

/// Password prompts answered in one login (`Password:` then `Local password:`).
pub const MAX_PASSWORD_PROMPTS: u32 = 2;

impl<T: Transport> Session<T> {
    /// Drive the device back to the login banner from any state.
    ///
    /// This is the canonical reset: confirmations are answered, every
    /// known prompt is backed out of, and unrecognized output gets a
    /// probe, until the login banner shows.
    pub async fn reach_login(&mut self) -> Result<()> {
        let policy = self.retries.reach_login;
        let mut attempts = 0u32;

        loop {
            let text = self.channel.poll().await?;
            let marker = self.profile.classify(&text);
            debug!("reach_login: at {}", marker);

            match marker {
                DeviceMarker::LoginBanner => {
                    info!("At login prompt");
                    return Ok(());
                }
                DeviceMarker::Confirmation => {
                    let confirm = self.profile.commands.confirm.clone();
                    self.channel.send_line(&confirm).await?;
                }
                DeviceMarker::Unknown => self.channel.probe().await?,
                other => match self.profile.deescalate_command(other) {
                    Some(command) => {
                        let command = command.to_string();
                        self.channel.send_line(&command).await?;
                    }
                    None => self.channel.probe().await?,
                },
            }

            attempts += 1;
            if !policy.allows(attempts) {
                return Err(DriverError::RetriesExhausted {
                    operation: "reaching the login prompt".to_string(),
                    attempts,
                }
                .into());
            }
            pause(policy.delay).await;
        }
    }

    /// Log in from the login banner.
    ///
    /// Returns the prompt reached: the shell for root, the operational
    /// CLI for everyone else. The JUNOS greeting alone does not end the
    /// login; it only switches to probing until a prompt is classified.
    ///
    /// Every password prompt is answered, up to [`MAX_PASSWORD_PROMPTS`],
    /// so a remote-auth `Password:` followed by a `Local password:` still
    /// logs in. Rejection is signalled by `incorrect` or a returning
    /// login banner.
    pub async fn authenticate(&mut self) -> Result<DeviceMarker> {
        let username = self.credentials.username.clone();
        self.command(
            &CommandStep::new(DeviceMarker::LoginBanner, username.as_str())
                .reaction(format!("Logging in as {}...", username)),
        )
        .await?;

        let rejected = |reason| -> crate::error::Error {
            DriverError::AuthenticationFailed {
                user: username.clone(),
                reason,
            }
            .into()
        };

        let mut passwords_sent = 0u32;
        let mut greeted = false;
        let mut polls = 0u32;

        loop {
            // Probing at a password prompt would submit an empty password.
            if greeted {
                self.channel.probe().await?;
            }
            pause(self.timing.poll_interval).await;
            let text = self.channel.poll().await?;
            polls += 1;

            let signals = &self.profile.signals;
            if text.contains(signals.login_incorrect.as_str()) {
                return Err(rejected(AuthRejection::Password));
            }

            let marker = self.profile.classify(&text);
            match marker {
                DeviceMarker::LoginBanner => {
                    return Err(rejected(if passwords_sent > 0 {
                        AuthRejection::Password
                    } else {
                        AuthRejection::Username
                    }));
                }
                DeviceMarker::Operational | DeviceMarker::Shell => {
                    info!("Logged in");
                    return Ok(marker);
                }
                _ => {}
            }

            if text.contains(signals.greeting.as_str()) {
                greeted = true;
            } else if text.contains(signals.password_prompt.as_str()) {
                if passwords_sent >= MAX_PASSWORD_PROMPTS {
                    return Err(rejected(AuthRejection::Password));
                }
                let password = self.credentials.password().to_string();
                self.channel.send_hidden_line(&password).await?;
                passwords_sent += 1;
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: "logging in".to_string(),
                    attempts: polls,
                }
                .into());
            }
        }
    }

    /// Shell → operational CLI.
    pub async fn enter_cli(&mut self) -> Result<()> {
        let command = self.profile.commands.cli.clone();
        self.transition(
            DeviceMarker::Shell,
            &command,
            DeviceMarker::Operational,
            "Entering CLI...",
        )
        .await
    }

    /// Operational CLI → shell.
    pub async fn enter_shell(&mut self) -> Result<()> {
        let command = self.profile.commands.start_shell.clone();
        self.transition(
            DeviceMarker::Operational,
            &command,
            DeviceMarker::Shell,
            "Starting shell...",
        )
        .await
    }

    /// Operational CLI → configuration mode, settled.
    ///
    /// After the configuration prompt shows, the session waits out the
    /// settle interval and checks the device did not tear the
    /// configuration session down (a device-side auto-update does this
    /// shortly after boot). If it did, the CLI is re-entered and the
    /// entry retried under the config-entry retry policy.
    pub async fn enter_config(&mut self) -> Result<()> {
        let policy = self.retries.config_entry;
        let command = self.profile.commands.configure.clone();
        let mut attempts = 0u32;

        loop {
            self.transition(
                DeviceMarker::Operational,
                &command,
                DeviceMarker::Config,
                "Entering configuration mode...",
            )
            .await?;

            pause(self.timing.config_settle).await;
            let text = self.channel.poll().await?;
            attempts += 1;

            if !text.contains(self.profile.signals.config_closed.as_str()) {
                return Ok(());
            }

            warn!("Configuration mode was closed by the device, re-entering");
            if !policy.allows(attempts) {
                return Err(DriverError::RetriesExhausted {
                    operation: "entering configuration mode".to_string(),
                    attempts,
                }
                .into());
            }
            pause(policy.delay).await;
            self.enter_cli().await?;
        }
    }

    /// Interrupt autoboot and reach the loader prompt.
    ///
    /// The operator power-cycles the device; meanwhile the interrupt key
    /// is sent every poll. If the boot gets past the loader window the
    /// login banner shows instead.
    pub async fn enter_loader(&mut self) -> Result<LoaderOutcome> {
        info!("Waiting for boot; power cycle the switch now");
        let interrupt = self.profile.commands.loader_interrupt.clone();
        let mut polls = 0u32;

        loop {
            self.channel.send_raw(interrupt.as_bytes()).await?;
            pause(self.timing.poll_interval).await;
            let text = self.channel.poll().await?;
            polls += 1;

            match self.profile.classify(&text) {
                DeviceMarker::Loader => {
                    info!("At loader prompt");
                    return Ok(LoaderOutcome::Loader);
                }
                DeviceMarker::LoginBanner => return Ok(LoaderOutcome::Login),
                _ => {}
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: "interrupting autoboot".to_string(),
                    attempts: polls,
                }
                .into());
            }
        }
    }

    /// Move from `from` to `to` with one command.
    ///
    /// Returns at once if the device is already at `to`. The command is
    /// (re)sent each time `from` is observed.
    async fn transition(
        &mut self,
        from: DeviceMarker,
        command: &str,
        to: DeviceMarker,
        reaction: &str,
    ) -> Result<()> {
        let mut polls = 0u32;

        loop {
            self.channel.probe().await?;
            pause(self.timing.poll_interval).await;
            let text = self.channel.poll().await?;
            polls += 1;

            let marker = self.profile.classify(&text);
            if marker == to {
                return Ok(());
            }
            if marker == from {
                self.channel.send_line(command).await?;
                info!("{}", reaction);
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: format!("moving from {} to {}", from, to),
                    attempts: polls,
                }
                .into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::test_support::session;
    use crate::error::Error;
    use crate::transport::scripted::ScriptedTransport;

    const LOGIN: &str = "\r\nAmnesiac (ttyu0)\r\n\r\nlogin: ";
    const SHELL: &str = "\r\nroot@:RE:0% ";
    const OPERATIONAL: &str = "\r\n{master:0}\r\nroot> ";
    const CONFIG: &str = "\r\n{master:0}[edit]\r\nroot# ";

    /// A device that backs out one level per command.
    fn layered_device(start: &str) -> ScriptedTransport {
        ScriptedTransport::new()
            .output(start)
            .on("exit configuration-mode", OPERATIONAL)
            .on("yes", OPERATIONAL)
            .on("exit", SHELL)
            .on("exit", LOGIN)
    }

    #[tokio::test]
    async fn test_reach_login_from_config() {
        let device = layered_device(CONFIG);
        let mut session = session(device.clone());

        session.reach_login().await.unwrap();

        assert_eq!(
            device.commands(),
            vec!["exit configuration-mode", "exit", "exit"]
        );
    }

    #[tokio::test]
    async fn test_reach_login_from_confirmation() {
        let device = layered_device("Exit with uncommitted changes? [yes,no] (yes) ");
        let mut session = session(device.clone());

        session.reach_login().await.unwrap();

        assert_eq!(device.commands(), vec!["yes", "exit", "exit"]);
    }

    #[tokio::test]
    async fn test_reach_login_from_operational() {
        let device = layered_device(OPERATIONAL);
        let mut session = session(device.clone());

        session.reach_login().await.unwrap();
        assert_eq!(device.commands(), vec!["exit", "exit"]);
    }

    #[tokio::test]
    async fn test_reach_login_from_shell() {
        let device = ScriptedTransport::new().output(SHELL).on("exit", LOGIN);
        let mut session = session(device.clone());

        session.reach_login().await.unwrap();
        assert_eq!(device.commands(), vec!["exit"]);
    }

    #[tokio::test]
    async fn test_reach_login_probes_silent_line() {
        let device = ScriptedTransport::new().on("", LOGIN);
        let mut session = session(device.clone());

        session.reach_login().await.unwrap();
        assert_eq!(device.count(""), 1);
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_reach_login_gives_up_under_bounded_policy() {
        // A prompt that never goes away.
        let device = ScriptedTransport::new().output(OPERATIONAL).on("exit", OPERATIONAL);
        let mut session = session(device);

        let result = session.reach_login().await;
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::RetriesExhausted { .. }))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_end_to_end() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on("secret", "\r\n--- JUNOS 18.2R3.4 built 2019-10-23\r\n{master:0}\r\nadmin> ");
        let mut session = session(device.clone());

        let marker = session.authenticate().await.unwrap();

        assert_eq!(marker, DeviceMarker::Operational);
        assert_eq!(device.commands(), vec!["admin", "secret"]);
    }

    #[tokio::test]
    async fn test_authenticate_greeting_then_prompt() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on_chunks("secret", &["\r\n--- JUNOS 18.2R3.4 built 2019-10-23\r\n", SHELL]);
        let mut session = session(device);

        assert_eq!(session.authenticate().await.unwrap(), DeviceMarker::Shell);
    }

    #[tokio::test]
    async fn test_authenticate_answers_local_password_prompt() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on("secret", "\r\nLocal password:")
            .on("secret", "\r\n{master:0}\r\nadmin> ");
        let mut session = session(device.clone());

        let marker = session.authenticate().await.unwrap();

        assert_eq!(marker, DeviceMarker::Operational);
        assert_eq!(device.commands(), vec!["admin", "secret", "secret"]);
    }

    #[tokio::test]
    async fn test_authenticate_stops_answering_endless_password_prompts() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on("secret", "\r\nPassword:");
        let mut session = session(device.clone());

        let result = session.authenticate().await;
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::AuthenticationFailed {
                reason: AuthRejection::Password,
                ..
            }))
        ));
        assert_eq!(device.count("secret"), MAX_PASSWORD_PROMPTS as usize);
    }

    #[tokio::test]
    async fn test_authenticate_username_rejected() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\n\r\nlogin: ");
        let mut session = session(device);

        let result = session.authenticate().await;
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::AuthenticationFailed {
                reason: AuthRejection::Username,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_password_rejected() {
        let device = ScriptedTransport::new()
            .output(LOGIN)
            .on("admin", "admin\r\nPassword:")
            .on("secret", "\r\nLogin incorrect\r\nlogin: ");
        let mut session = session(device);

        let result = session.authenticate().await;
        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::AuthenticationFailed {
                reason: AuthRejection::Password,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_enter_cli_and_shell() {
        let device = ScriptedTransport::new()
            .output(SHELL)
            .on("cli", OPERATIONAL)
            .on("start shell", SHELL);
        let mut session = session(device.clone());

        session.enter_cli().await.unwrap();
        session.enter_shell().await.unwrap();

        assert_eq!(device.commands(), vec!["cli", "start shell"]);
    }

    #[tokio::test]
    async fn test_enter_cli_when_already_there() {
        let device = ScriptedTransport::new().output(OPERATIONAL);
        let mut session = session(device.clone());

        session.enter_cli().await.unwrap();
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_enter_config_settled() {
        let device = ScriptedTransport::new()
            .output(OPERATIONAL)
            .on("configure", CONFIG);
        let mut session = session(device.clone());

        session.enter_config().await.unwrap();
        assert_eq!(device.count("configure"), 1);
    }

    #[tokio::test]
    async fn test_enter_config_retries_after_teardown() {
        let device = ScriptedTransport::new()
            .output(OPERATIONAL)
            .on_chunks(
                "configure",
                &[
                    CONFIG,
                    "\r\nerror: mgd: unexpectedly closed connection\r\nroot@:RE:0% ",
                ],
            )
            .on("configure", CONFIG)
            .on("cli", OPERATIONAL);
        let mut session = session(device.clone());

        session.enter_config().await.unwrap();

        assert_eq!(device.commands(), vec!["configure", "cli", "configure"]);
    }

    #[tokio::test]
    async fn test_enter_loader() {
        let device = ScriptedTransport::new()
            .output("U-Boot 2011.12\r\n")
            .output("Hit [Enter] to boot immediately, or space bar for command prompt.\r\n")
            .output("\r\nloader> ");
        let mut session = session(device.clone());

        assert_eq!(session.enter_loader().await.unwrap(), LoaderOutcome::Loader);
        assert_eq!(device.count(" "), 3);
    }

    #[tokio::test]
    async fn test_enter_loader_missed() {
        let device = ScriptedTransport::new().output(LOGIN);
        let mut session = session(device);

        assert_eq!(session.enter_loader().await.unwrap(), LoaderOutcome::Login);
    }
}
