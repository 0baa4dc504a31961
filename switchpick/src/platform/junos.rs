//! Juniper JUNOS (EX series) console profile.
//!
//! # Prompt Examples
//!
//! ```text
//! Amnesiac (ttyu0)
//!
//! login:                    # login banner
//! root@:RE:0%               # shell (root logs in here)
//! {master:0}
//! root>                     # operational mode
//! {master:0}[edit]
//! root#                     # configuration mode
//! loader>                   # pre-boot loader
//! Exit with uncommitted changes? [yes,no] (yes)
//! ```
//!
//! # State Graph
//!
//! ```text
//!            login         cli          configure
//! ┌───────┐ ──────► ┌─────┐ ───► ┌────┐ ────────► ┌────────┐
//! │ login │         │shell│      │ op │           │ config │
//! │       │ ◄────── │  %  │ ◄─── │ >  │ ◄──────── │   #    │
//! └───────┘  exit   └─────┘ exit └────┘  exit     └────────┘
//!                                      configuration-mode
//! ```

use indexmap::IndexMap;

use super::{Commands, DeviceProfile, ProvisioningQueries, Signals, StorageProfile, WipeTarget};
use crate::channel::{DeviceMarker, MarkerSet};

/// Platform name for this profile.
pub const PROFILE_NAME: &str = "junos_ex";

/// Prompt patterns in classification order.
///
/// `loader>` must be tried before the operational pattern, which would
/// otherwise claim it.
const MARKER_PATTERNS: &[(DeviceMarker, &str)] = &[
    (DeviceMarker::Confirmation, r"\[yes,no\]"),
    (DeviceMarker::LoginBanner, r"login:\s*$"),
    (DeviceMarker::Loader, r"^loader>\s*$"),
    (
        DeviceMarker::Config,
        r"^(?:\{[^}]+\})?(?:\[edit[^\]]*\]\s*)?[\w.\-@]+#\s*$",
    ),
    (DeviceMarker::Shell, r"^[\w.\-@:]*%\s*$"),
    (DeviceMarker::Operational, r"^(?:\{[^}]+\})?[\w.\-@]+>\s*$"),
];

/// Build the JUNOS marker set.
pub fn markers() -> MarkerSet {
    MARKER_PATTERNS
        .iter()
        .try_fold(MarkerSet::new(), |set, (marker, pattern)| {
            set.with_marker(*marker, pattern)
        })
        .expect("static JUNOS marker patterns are valid")
}

/// Create the JUNOS EX device profile.
pub fn profile() -> DeviceProfile {
    let mut deescalate = IndexMap::new();
    deescalate.insert(DeviceMarker::Config, "exit configuration-mode".to_string());
    deescalate.insert(DeviceMarker::Operational, "exit".to_string());
    deescalate.insert(DeviceMarker::Shell, "exit".to_string());
    deescalate.insert(DeviceMarker::Loader, "boot".to_string());

    DeviceProfile {
        name: PROFILE_NAME.to_string(),
        markers: markers(),
        deescalate,
        commands: Commands {
            cli: "cli".to_string(),
            start_shell: "start shell".to_string(),
            configure: "configure".to_string(),
            exit_configure: "exit configuration-mode".to_string(),
            commit: "commit".to_string(),
            load_override: "load override terminal".to_string(),
            load_set: "load set terminal".to_string(),
            end_of_input: vec![0x04],
            root_hash_template: r#"set system root-authentication encrypted-password "{hash}""#
                .to_string(),
            confirm: "yes".to_string(),
            power_off: "request system power-off\nyes\n".to_string(),
            reboot: "request system reboot\nyes\n".to_string(),
            single_user_boot: "boot -s".to_string(),
            recovery: "recovery".to_string(),
            loader_interrupt: " ".to_string(),
            support_info: "request support information | save /var/tmp/RSI.txt".to_string(),
            archive_logs: "file archive source /var/log destination /var/tmp/LOGS".to_string(),
        },
        signals: Signals {
            password_prompt: "word:".to_string(),
            login_incorrect: "incorrect".to_string(),
            greeting: "JUNOS".to_string(),
            config_closed: "unexpectedly closed connection".to_string(),
            commit_success: "commit complete".to_string(),
            commit_failure: "commit failed".to_string(),
            load_ready: "[Type ^D at a new line to end input]".to_string(),
            load_success: "load complete".to_string(),
            load_failure: "error:".to_string(),
            recovery_prompt: "root password recovery".to_string(),
            shutdown_complete: "press any key".to_string(),
            permission_denied: "not permitted".to_string(),
            no_device: "no such".to_string(),
        },
        storage: StorageProfile {
            mount: "mount_msdosfs /dev/da1s1 /mnt".to_string(),
            mount_point: "/mnt".to_string(),
            artifacts: vec!["/var/tmp/RSI.txt".to_string(), "/var/tmp/LOGS.tar".to_string()],
            unmount: "umount /mnt".to_string(),
        },
        wipe_targets: vec![
            WipeTarget::new(
                "/config",
                &["juniper.conf.gz", "juniper.conf.*.gz", "rescue.conf.gz"],
            ),
            WipeTarget::new("/var/run/db", &["juniper.db", "juniper.data", "juniper.save"]),
        ],
        queries: ProvisioningQueries {
            chassis: "show chassis hardware | no-more".to_string(),
            interface: "show interfaces vme | no-more".to_string(),
            address: "show interfaces vme.0 terse | no-more".to_string(),
        },
    }
}
