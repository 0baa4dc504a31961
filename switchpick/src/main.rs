//! switchpick command line.
//!
//! # Usage
//!
//! ```bash
//! switchpick prime                      # load configs/prime.config
//! switchpick load site-a.set            # load a custom configuration
//! switchpick logs                       # copy RSI and logs to a USB drive
//! switchpick wipe --loader --then off   # wipe via recovery boot, then power off
//! switchpick power-off | reboot
//! switchpick records | clear-records
//! ```

use std::env;
use std::path::PathBuf;
use std::process;

use log::{error, info};
use switchpick::config::{AppPaths, ConfigPayload, Credentials};
use switchpick::driver::{Session, SessionBuilder};
use switchpick::procedure::{self, WipeEntry, WipeFollowUp};
use switchpick::provisioning::{ProvisioningLog, format_table};
use switchpick::transport::{SerialConfig, SerialTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let paths = args.paths();
    let log = ProvisioningLog::new(&paths.provisioning_log);

    // Local-only actions never touch the console.
    match &args.action {
        Action::Records => {
            if !log.exists() {
                info!("No records found, creating {}", log.path().display());
                log.reset()?;
            }
            print!("{}", format_table(&log.read()?));
            return Ok(());
        }
        Action::ClearRecords => {
            log.reset()?;
            return Ok(());
        }
        _ => {}
    }

    let mut credentials = Credentials::load(&paths.credentials);
    if let Some(user) = &args.user {
        credentials.update(user.clone(), args.password.clone().unwrap_or_default());
    }
    info!("Using credentials {:?}", credentials);

    let mut serial = SerialConfig::default();
    if let Some(port) = &args.port {
        serial = serial.with_port(port.clone());
    }

    let mut session = SessionBuilder::new()
        .credentials(credentials)
        .serial(serial)
        .connect()
        .await?;

    if let Err(e) = run(&mut session, &args.action, &paths, &log).await {
        error!("{}", e);
        if !e.is_fatal_to_procedure() {
            info!("Nothing was sent to the switch");
        }
        session.reset();
        process::exit(1);
    }
    Ok(())
}

async fn run(
    session: &mut Session<SerialTransport>,
    action: &Action,
    paths: &AppPaths,
    log: &ProvisioningLog,
) -> switchpick::Result<()> {
    let interrupt = procedure::interrupt_on(tokio::signal::ctrl_c());

    match action {
        Action::Prime => {
            let payload = ConfigPayload::from_path(&paths.general_config)?;
            procedure::interruptible(procedure::load_config(session, &payload, log), interrupt)
                .await
                .map(|_| ())
        }
        Action::Load(file) => {
            let payload = ConfigPayload::from_path(file)?;
            procedure::interruptible(procedure::load_config(session, &payload, log), interrupt)
                .await
                .map(|_| ())
        }
        Action::Logs => {
            procedure::interruptible(procedure::collect_logs(session), interrupt).await
        }
        Action::Wipe { entry, follow_up } => {
            procedure::interruptible(procedure::wipe(session, *entry, *follow_up), interrupt).await
        }
        Action::PowerOff => procedure::interruptible(procedure::power_off(session), interrupt).await,
        Action::Reboot => procedure::interruptible(procedure::reboot(session), interrupt).await,
        Action::Records | Action::ClearRecords => Ok(()),
    }
}

#[derive(Debug)]
enum Action {
    Prime,
    Load(PathBuf),
    Logs,
    Wipe {
        entry: WipeEntry,
        follow_up: WipeFollowUp,
    },
    PowerOff,
    Reboot,
    Records,
    ClearRecords,
}

/// Simple argument parser.
struct Args {
    action: Action,
    port: Option<String>,
    user: Option<String>,
    password: Option<String>,
    base: Option<PathBuf>,
    credentials: Option<PathBuf>,
    records: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut positional = Vec::new();
        let mut port = None;
        let mut user = None;
        let mut password = None;
        let mut base = None;
        let mut credentials = None;
        let mut records = None;
        let mut entry = WipeEntry::Login;
        let mut follow_up = WipeFollowUp::Leave;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = Some(args[i].clone());
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = Some(args[i].clone());
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--dir" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        base = Some(PathBuf::from(&args[i]));
                    }
                }
                "--credentials" => {
                    i += 1;
                    if i < args.len() {
                        credentials = Some(PathBuf::from(&args[i]));
                    }
                }
                "--records" => {
                    i += 1;
                    if i < args.len() {
                        records = Some(PathBuf::from(&args[i]));
                    }
                }
                "--loader" => {
                    entry = WipeEntry::Loader;
                }
                "--then" => {
                    i += 1;
                    follow_up = match args.get(i).map(String::as_str) {
                        Some("off") => WipeFollowUp::PowerOff,
                        Some("reboot") => WipeFollowUp::Reboot,
                        _ => WipeFollowUp::Leave,
                    };
                }
                "--help" | "-h" => {
                    Self::print_help();
                    process::exit(0);
                }
                other => positional.push(other.to_string()),
            }
            i += 1;
        }

        let action = match positional.first().map(String::as_str) {
            Some("prime") => Action::Prime,
            Some("load") => match positional.get(1) {
                Some(file) => Action::Load(PathBuf::from(file)),
                None => {
                    eprintln!("Error: load needs a configuration file");
                    process::exit(2);
                }
            },
            Some("logs") => Action::Logs,
            Some("wipe") => Action::Wipe { entry, follow_up },
            Some("power-off") => Action::PowerOff,
            Some("reboot") => Action::Reboot,
            Some("records") => Action::Records,
            Some("clear-records") => Action::ClearRecords,
            _ => {
                Self::print_help();
                process::exit(2);
            }
        };

        Self {
            action,
            port,
            user,
            password,
            base,
            credentials,
            records,
        }
    }

    fn paths(&self) -> AppPaths {
        let mut paths = match &self.base {
            Some(base) => AppPaths::under(base),
            None => AppPaths::beside_executable(),
        };
        if let Some(credentials) = &self.credentials {
            paths.credentials = credentials.clone();
        }
        if let Some(records) = &self.records {
            paths.provisioning_log = records.clone();
        }
        paths
    }

    fn print_help() {
        println!("switchpick - console automation for Juniper EX switches");
        println!();
        println!("Usage: switchpick <action> [OPTIONS]");
        println!();
        println!("Actions:");
        println!("  prime                 Load the general configuration (configs/prime.config)");
        println!("  load <file>           Load a configuration file (.config/.conf or .set/.txt)");
        println!("  logs                  Copy support information and logs to a USB drive");
        println!("  wipe                  Remove configuration, keep system logs");
        println!("  power-off             Graceful shutdown");
        println!("  reboot                Reboot to the login prompt");
        println!("  records               Show provisioning records");
        println!("  clear-records         Reset provisioning records");
        println!();
        println!("Options:");
        println!("  -p, --port <NAME>         Console port (default: discover)");
        println!("  -u, --user <USER>         Username (overrides the credential file)");
        println!("  -P, --password <PASS>     Password for --user");
        println!("  -d, --dir <DIR>           Base directory for data/, configs/, records/");
        println!("      --credentials <FILE>  Credential file");
        println!("      --records <FILE>      Provisioning log");
        println!("      --loader              wipe: enter through the boot loader");
        println!("      --then <off|reboot>   wipe: power off or reboot afterwards");
        println!("  -h, --help                Show this help");
    }
}
