//! Append-only provisioning log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use super::ProvisioningRecord;
use crate::error::ConfigError;

/// Header line written at the top of every log.
pub const HEADER: &str = "Model, Serial, Config, MAC, IP, Subnet";

/// Delimited text log of deployed switches.
#[derive(Debug, Clone)]
pub struct ProvisioningLog {
    path: PathBuf,
}

impl ProvisioningLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append one record, creating the file with its header if needed.
    pub fn append(&self, record: &ProvisioningRecord) -> Result<(), ConfigError> {
        let is_new = !self.exists();
        self.ensure_parent()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;

        let mut text = String::new();
        if is_new {
            text.push_str(HEADER);
            text.push('\n');
        }
        text.push_str(&record.to_line());
        text.push('\n');

        file.write_all(text.as_bytes())
            .map_err(|source| self.io_error(source))?;

        info!("Appended to provisioning log: {}", record.to_line());
        Ok(())
    }

    /// Truncate the log back to its header.
    pub fn reset(&self) -> Result<(), ConfigError> {
        self.ensure_parent()?;
        fs::write(&self.path, format!("{}\n", HEADER)).map_err(|source| self.io_error(source))?;
        info!("Provisioning records cleared");
        Ok(())
    }

    /// All rows including the header, split into columns.
    pub fn read(&self) -> Result<Vec<Vec<String>>, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::LogMissing(self.path.clone()));
        }
        let text = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;

        Ok(text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split(',').map(|field| field.trim().to_string()).collect())
            .collect())
    }

    fn ensure_parent(&self) -> Result<(), ConfigError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Render rows as fixed-width columns for the terminal.
pub fn format_table(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: String = row.iter().map(|field| format!("{:<20}", field)).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> ProvisioningLog {
        let dir = std::env::temp_dir().join(format!(
            "switchpick-records-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        ProvisioningLog::new(dir.join("records").join("provisioning.csv"))
    }

    fn record() -> ProvisioningRecord {
        ProvisioningRecord {
            model: "EX2300-24P".to_string(),
            serial: "JW3618AF0123".to_string(),
            config_name: "prime".to_string(),
            mac: "2c:6b:f5:aa:bb:c0".to_string(),
            ip: "10.20.0.15".to_string(),
            subnet: "255.255.255.0".to_string(),
        }
    }

    #[test]
    fn test_append_writes_header_once() {
        let log = temp_log("append");
        log.append(&record()).unwrap();
        log.append(&record()).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "EX2300-24P, JW3618AF0123, prime, 2c:6b:f5:aa:bb:c0, 10.20.0.15, 255.255.255.0"
        );
    }

    #[test]
    fn test_reset_and_read() {
        let log = temp_log("reset");
        assert!(matches!(log.read(), Err(ConfigError::LogMissing(_))));

        log.append(&record()).unwrap();
        log.reset().unwrap();

        let rows = log.read().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["Model", "Serial", "Config", "MAC", "IP", "Subnet"]);
    }

    #[test]
    fn test_format_table() {
        let rows = vec![vec!["Model".to_string(), "Serial".to_string()]];
        assert_eq!(format_table(&rows), format!("{:<20}Serial\n", "Model"));
    }
}
