//! Device profiles.
//!
//! The console has no framing: the literal commands the engine types and
//! the text it waits for are the whole protocol. A [`DeviceProfile`]
//! collects that vocabulary in one place so procedures never embed
//! device strings directly.

pub mod junos;

use indexmap::IndexMap;

use crate::channel::{DeviceMarker, MarkerSet};

/// Commands typed into the device.
#[derive(Debug, Clone)]
pub struct Commands {
    /// Shell → operational CLI.
    pub cli: String,
    /// Operational CLI → shell.
    pub start_shell: String,
    /// Operational CLI → configuration mode.
    pub configure: String,
    /// Configuration mode → operational CLI.
    pub exit_configure: String,
    /// Apply the candidate configuration.
    pub commit: String,
    /// Replace the whole configuration from terminal input.
    pub load_override: String,
    /// Apply `set` lines from terminal input.
    pub load_set: String,
    /// Terminates terminal input.
    pub end_of_input: Vec<u8>,
    /// Seeds root authentication; `{hash}` is replaced with the hash.
    pub root_hash_template: String,
    /// Affirmative answer to a confirmation prompt.
    pub confirm: String,
    /// Power off, including the confirmation answer.
    pub power_off: String,
    /// Reboot, including the confirmation answer.
    pub reboot: String,
    /// Boot the loader into single-user mode.
    pub single_user_boot: String,
    /// Answer to the single-user shell question.
    pub recovery: String,
    /// Key sent to interrupt autoboot.
    pub loader_interrupt: String,
    /// Save a support information dump.
    pub support_info: String,
    /// Archive the system logs.
    pub archive_logs: String,
}

/// Text the engine waits for that is not a prompt.
#[derive(Debug, Clone)]
pub struct Signals {
    /// Password prompt (covers "Password:" and "Local password:").
    pub password_prompt: String,
    /// Login rejected after a password.
    pub login_incorrect: String,
    /// Banner shown after a successful login.
    pub greeting: String,
    /// Configuration mode was torn down by the device.
    pub config_closed: String,
    /// Commit succeeded.
    pub commit_success: String,
    /// Commit failed.
    pub commit_failure: String,
    /// Terminal load is accepting input.
    pub load_ready: String,
    /// Terminal load parsed cleanly.
    pub load_success: String,
    /// Terminal load rejected.
    pub load_failure: String,
    /// Single-user boot is asking which shell to start.
    pub recovery_prompt: String,
    /// Shutdown finished, safe to unplug.
    pub shutdown_complete: String,
    /// Mount refused for lack of privilege.
    pub permission_denied: String,
    /// Mount found no device.
    pub no_device: String,
}

/// Removable storage handling for log collection.
#[derive(Debug, Clone)]
pub struct StorageProfile {
    /// Mount command.
    pub mount: String,
    /// Where the drive is mounted.
    pub mount_point: String,
    /// Files copied onto the drive.
    pub artifacts: Vec<String>,
    /// Unmount command.
    pub unmount: String,
}

/// A directory and the files removed from it during a wipe.
#[derive(Debug, Clone)]
pub struct WipeTarget {
    pub directory: String,
    pub files: Vec<String>,
}

impl WipeTarget {
    pub fn new(directory: impl Into<String>, files: &[&str]) -> Self {
        Self {
            directory: directory.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Diagnostic queries used for provisioning extraction.
#[derive(Debug, Clone)]
pub struct ProvisioningQueries {
    /// Hardware identity (chassis serial and model).
    pub chassis: String,
    /// Management interface details (MAC).
    pub interface: String,
    /// Management interface address (IP and prefix).
    pub address: String,
}

/// Complete vocabulary for one device family.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Profile name (e.g., "junos_ex").
    pub name: String,

    /// Prompt classification table.
    pub markers: MarkerSet,

    /// Command that leaves each state towards the login banner.
    pub deescalate: IndexMap<DeviceMarker, String>,

    pub commands: Commands,

    pub signals: Signals,

    pub storage: StorageProfile,

    /// Files removed by a wipe, in order.
    pub wipe_targets: Vec<WipeTarget>,

    pub queries: ProvisioningQueries,
}

impl DeviceProfile {
    /// Classify text with this profile's markers.
    pub fn classify(&self, text: &str) -> DeviceMarker {
        self.markers.classify(text)
    }

    /// Command that moves away from `marker` towards login, if any.
    pub fn deescalate_command(&self, marker: DeviceMarker) -> Option<&str> {
        self.deescalate.get(&marker).map(String::as_str)
    }

    /// The root-authentication seeding command for a hash.
    pub fn root_hash_command(&self, hash: &str) -> String {
        self.commands.root_hash_template.replace("{hash}", hash)
    }

    /// Shell commands that remove every wipe target, in order.
    pub fn wipe_commands(&self) -> Vec<String> {
        self.wipe_targets
            .iter()
            .flat_map(|target| {
                std::iter::once(format!("cd {}", target.directory))
                    .chain(target.files.iter().map(|file| format!("rm {}", file)))
            })
            .collect()
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        junos::profile()
    }
}
