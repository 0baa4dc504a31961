//! The command loop: wait for a condition, then respond.
//!
//! Everything the engine does is built from one primitive. A
//! [`CommandStep`] names what to wait for and what to type once it shows
//! up. Matching is level-triggered on each poll: a condition split across
//! two reads can be missed, which the probe-and-repaint rhythm of a line
//! console makes rare in practice.

use std::fmt;

use log::info;

use super::session::{Session, pause};
use crate::channel::DeviceMarker;
use crate::error::{DriverError, Result};
use crate::platform::DeviceProfile;
use crate::transport::Transport;

/// What a step waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A literal appearing anywhere in the latest poll.
    Text(String),
    /// The latest poll ending at this prompt.
    Marker(DeviceMarker),
}

impl Condition {
    /// Check a poll against the condition.
    pub fn is_met(&self, text: &str, profile: &DeviceProfile) -> bool {
        match self {
            Condition::Text(needle) => text.contains(needle.as_str()),
            Condition::Marker(marker) => profile.classify(text) == *marker,
        }
    }
}

impl From<&str> for Condition {
    fn from(text: &str) -> Self {
        Condition::Text(text.to_string())
    }
}

impl From<String> for Condition {
    fn from(text: String) -> Self {
        Condition::Text(text)
    }
}

impl From<DeviceMarker> for Condition {
    fn from(marker: DeviceMarker) -> Self {
        Condition::Marker(marker)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Text(text) => write!(f, "'{}'", text),
            Condition::Marker(marker) => write!(f, "{}", marker),
        }
    }
}

/// One unit of interaction.
///
/// # Example
///
/// ```rust
/// use switchpick::channel::DeviceMarker;
/// use switchpick::driver::CommandStep;
///
/// let step = CommandStep::new(DeviceMarker::Shell, "cli").reaction("Entering CLI...");
/// assert!(step.probe);
/// assert!(step.append_newline);
/// ```
#[derive(Debug, Clone)]
pub struct CommandStep {
    /// Condition to wait for.
    pub condition: Condition,

    /// Text sent once the condition is met.
    pub action: String,

    /// Status line emitted after sending.
    pub reaction: Option<String>,

    /// Send a neutral newline before every poll.
    pub probe: bool,

    /// Terminate the action with a newline.
    pub append_newline: bool,

    /// Keep the action out of logs (passwords). Hidden actions are always
    /// newline-terminated.
    pub hidden: bool,
}

impl CommandStep {
    /// Wait for `condition`, then send `action` and a newline.
    pub fn new(condition: impl Into<Condition>, action: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            action: action.into(),
            reaction: None,
            probe: true,
            append_newline: true,
            hidden: false,
        }
    }

    /// Wait for `condition` without sending anything.
    pub fn wait(condition: impl Into<Condition>) -> Self {
        Self {
            append_newline: false,
            ..Self::new(condition, "")
        }
    }

    /// Emit a status line once the action is sent.
    pub fn reaction(mut self, text: impl Into<String>) -> Self {
        self.reaction = Some(text.into());
        self
    }

    /// Do not probe while waiting.
    ///
    /// Used after a long-running command, where a probe would queue up
    /// behind it and only the command's own returning prompt counts.
    pub fn without_probe(mut self) -> Self {
        self.probe = false;
        self
    }

    /// Send the action without a trailing newline.
    pub fn without_newline(mut self) -> Self {
        self.append_newline = false;
        self
    }

    /// Keep the action out of logs.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl<T: Transport> Session<T> {
    /// Run one step: poll until its condition is met, then respond.
    ///
    /// There is no internal timeout unless [`Timing::max_polls`] is set;
    /// genuine device operations can take minutes. Returns the poll text
    /// that satisfied the condition.
    ///
    /// [`Timing::max_polls`]: super::Timing::max_polls
    pub async fn command(&mut self, step: &CommandStep) -> Result<String> {
        let mut polls = 0u32;

        loop {
            if step.probe {
                self.channel.probe().await?;
            }
            pause(self.timing.poll_interval).await;

            let text = self.channel.poll().await?;
            polls += 1;

            if step.condition.is_met(&text, &self.profile) {
                self.respond(step).await?;
                return Ok(text);
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: format!("waiting for {}", step.condition),
                    attempts: polls,
                }
                .into());
            }
        }
    }

    /// Run steps in order, stopping at the first error.
    pub async fn run_steps(&mut self, steps: &[CommandStep]) -> Result<()> {
        for step in steps {
            self.command(step).await?;
        }
        Ok(())
    }

    /// Send a query from the operational prompt and collect its output.
    ///
    /// Output is accumulated across polls until the operational prompt
    /// returns. The echoed query and the trailing prompt are removed.
    pub async fn capture(&mut self, query: &str) -> Result<String> {
        self.command(&CommandStep::new(DeviceMarker::Operational, query))
            .await?;
        self.channel.clear();

        let mut polls = 0u32;
        loop {
            pause(self.timing.poll_interval).await;
            let fresh = self.channel.poll().await?;
            polls += 1;

            if !fresh.is_empty() {
                let tail = String::from_utf8_lossy(self.channel.buffer().tail()).into_owned();
                if self.profile.classify(&tail) == DeviceMarker::Operational {
                    let raw = self.channel.accumulated();
                    self.channel.clear();
                    return Ok(normalize_output(&raw, query));
                }
            }

            if self.timing.polls_exhausted(polls) {
                return Err(DriverError::RetriesExhausted {
                    operation: format!("capturing '{}'", query),
                    attempts: polls,
                }
                .into());
            }
        }
    }

    async fn respond(&mut self, step: &CommandStep) -> Result<()> {
        if step.hidden {
            self.channel.send_hidden_line(&step.action).await?;
        } else if step.append_newline {
            self.channel.send_line(&step.action).await?;
        } else if !step.action.is_empty() {
            self.channel.send_raw(step.action.as_bytes()).await?;
        }

        if let Some(reaction) = &step.reaction {
            info!("{}", reaction);
        }
        Ok(())
    }
}

/// Strip the command echo from the start and the prompt from the end.
fn normalize_output(raw: &str, command: &str) -> String {
    let output = raw.trim_start_matches(['\r', '\n']);
    let output = match output.find(command) {
        Some(pos) if output[..pos].lines().count() <= 1 => {
            output[pos + command.len()..].trim_start_matches(['\r', '\n'])
        }
        _ => output,
    };

    let output = output.trim_end();
    match output.rfind('\n') {
        Some(pos) => output[..pos].trim_end().to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::test_support::session;
    use crate::error::Error;
    use crate::transport::scripted::ScriptedTransport;

    #[tokio::test]
    async fn test_command_waits_for_condition_then_sends() {
        let device = ScriptedTransport::new()
            .output("booting...\r\n")
            .output("root@:RE:0% ");
        let mut session = session(device.clone());

        let step = CommandStep::new(DeviceMarker::Shell, "cli").reaction("Entering CLI...");
        let text = session.command(&step).await.unwrap();

        assert_eq!(text, "root@:RE:0% ");
        assert_eq!(device.written(), vec!["", "", "cli"]);
    }

    #[tokio::test]
    async fn test_command_text_condition_without_probe() {
        let device = ScriptedTransport::new()
            .output("")
            .output("Enter full pathname of shell or 'recovery' for root password recovery");
        let mut session = session(device.clone());

        let step = CommandStep::new("root password recovery", "recovery").without_probe();
        session.command(&step).await.unwrap();

        assert_eq!(device.written(), vec!["recovery"]);
    }

    #[tokio::test]
    async fn test_command_without_newline_sends_raw() {
        let device = ScriptedTransport::new().output("root> ");
        let mut session = session(device.clone());

        let step = CommandStep::new(DeviceMarker::Operational, "request system reboot\nyes\n")
            .without_newline()
            .without_probe();
        session.command(&step).await.unwrap();

        assert_eq!(device.written(), vec!["request system reboot\nyes"]);
    }

    #[tokio::test]
    async fn test_command_bounded_by_max_polls() {
        let mut session = session(ScriptedTransport::new());
        let result = session.command(&CommandStep::wait("never")).await;

        assert!(matches!(
            result,
            Err(Error::Driver(DriverError::RetriesExhausted { attempts: 20, .. }))
        ));
    }

    #[tokio::test]
    async fn test_run_steps_in_order() {
        let device = ScriptedTransport::new().output("root@:RE:0% ");
        let mut session = session(device.clone());

        let steps = [
            CommandStep::new(DeviceMarker::Shell, "cd /config"),
            CommandStep::new(DeviceMarker::Shell, "rm juniper.conf.gz"),
        ];
        session.run_steps(&steps).await.unwrap();

        assert_eq!(device.commands(), vec!["cd /config", "rm juniper.conf.gz"]);
    }

    #[tokio::test]
    async fn test_capture_accumulates_until_prompt() {
        let device = ScriptedTransport::new()
            .output("root> ")
            .output("show chassis hardware | no-more\r\nHardware inventory:\r\n")
            .output("Chassis   JW3618AF0123   EX2300-24P\r\n\r\n{master:0}\r\nroot> ");
        let mut session = session(device.clone());

        let out = session
            .capture("show chassis hardware | no-more")
            .await
            .unwrap();

        assert_eq!(
            out,
            "Hardware inventory:\r\nChassis   JW3618AF0123   EX2300-24P\r\n\r\n{master:0}"
        );
        assert_eq!(device.commands(), vec!["show chassis hardware | no-more"]);
    }

    #[test]
    fn test_normalize_output() {
        let raw = "show version\r\nModel: ex2300\r\nJunos: 18.2\r\nroot> ";
        assert_eq!(normalize_output(raw, "show version"), "Model: ex2300\r\nJunos: 18.2");
        assert_eq!(normalize_output("root> ", "show version"), "");
    }
}
