//! Default file locations.

use std::path::{Path, PathBuf};

/// Where switchpick keeps its local files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Credential file.
    pub credentials: PathBuf,

    /// General ("priming") configuration applied to fresh switches.
    pub general_config: PathBuf,

    /// Provisioning record log.
    pub provisioning_log: PathBuf,
}

impl AppPaths {
    /// Standard layout under a base directory.
    pub fn under(base: &Path) -> Self {
        Self {
            credentials: base.join("data").join("data.txt"),
            general_config: base.join("configs").join("prime.config"),
            provisioning_log: base.join("records").join("provisioning.csv"),
        }
    }

    /// Standard layout next to the running executable.
    pub fn beside_executable() -> Self {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::under(&base)
    }
}
