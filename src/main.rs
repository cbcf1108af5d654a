//! Passivestat — main entry point.
//!
//! Wires the concrete adapters to the [`ThermostatService`] core and runs
//! the cooperative control loop: one tick, then sleep for the configured
//! poll interval, until a confirmed `kill` command arrives over the mail
//! channel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  FileSensor ×2   SpoolMailbox   CsvContactStore              │
//! │  (SensorPort)    (MailboxPort)  (ContactStorePort)           │
//! │  CsvReadingLog   SystemClock                                 │
//! │  (ReadingLogPort)(TimePort)                                  │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────        │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │        ThermostatService (pure logic)              │      │
//! │  │  sensor supervision · window advice · commands     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use passivestat::adapters::{
    CsvContactStore, CsvReadingLog, FileSensor, SpoolMailbox, SystemClock,
};
use passivestat::app::ports::{ContactStorePort, TimePort};
use passivestat::app::service::ThermostatService;
use passivestat::command::LoopControl;
use passivestat::config::SystemConfig;
use passivestat::contacts::ContactRegistry;

#[derive(Parser, Debug)]
#[command(name = "passivestat", version, about = "Passive thermostat control loop")]
struct Args {
    /// JSON config file with target_temp_f and poll_interval_secs
    #[arg(long, env = "PASSIVESTAT_CONFIG")]
    config: Option<PathBuf>,

    /// Mail spool directory (inbox/, processed/, outbox.txt)
    #[arg(long, env = "PASSIVESTAT_SPOOL", default_value = "./spool")]
    spool: PathBuf,

    /// Contacts CSV table
    #[arg(long, env = "PASSIVESTAT_CONTACTS", default_value = "./contacts.csv")]
    contacts: PathBuf,

    /// Reading log CSV (rotated daily)
    #[arg(long, env = "PASSIVESTAT_DATA_LOG", default_value = "./dataLog.csv")]
    data_log: PathBuf,

    /// Indoor sensor handoff file
    #[arg(long, env = "PASSIVESTAT_INSIDE_SENSOR", default_value = "/run/dht/inside")]
    inside_sensor: PathBuf,

    /// Outdoor sensor handoff file
    #[arg(long, env = "PASSIVESTAT_OUTSIDE_SENSOR", default_value = "/run/dht/outside")]
    outside_sensor: PathBuf,
}

fn load_config(path: Option<&Path>) -> Result<SystemConfig> {
    let Some(path) = path else {
        return Ok(SystemConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: SystemConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config
        .validate()
        .map_err(|field| anyhow::anyhow!("config field '{field}' is out of range"))?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("passivestat v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;
    info!(
        "target {}f, poll interval {}s",
        config.target_temp_f, config.poll_interval_secs
    );

    let mut store = CsvContactStore::new(&args.contacts);
    let contacts = ContactRegistry::from_entries(
        store
            .load()
            .with_context(|| format!("loading contacts from {}", args.contacts.display()))?,
    );
    if contacts.recipients().is_empty() {
        warn!(
            "no recipients in {}; notifications go nowhere and no sender is authorized until one is added",
            args.contacts.display()
        );
    }

    let mut mail =
        SpoolMailbox::open(&args.spool).context("opening mail spool")?;
    let mut inside_sensor = FileSensor::new(&args.inside_sensor);
    let mut outside_sensor = FileSensor::new(&args.outside_sensor);
    let mut reading_log = CsvReadingLog::new(&args.data_log);
    let clock = SystemClock::new();

    let mut service = ThermostatService::new(config, contacts);
    service.start(&mut mail, &clock);

    loop {
        let control = service.tick(
            &mut mail,
            &mut inside_sensor,
            &mut outside_sensor,
            &mut store,
            &mut reading_log,
            &clock,
        );
        if control == LoopControl::Shutdown {
            info!("kill confirmed; control loop stopped");
            return Ok(());
        }
        clock.sleep(Duration::from_secs(u64::from(
            service.config().poll_interval_secs,
        )));
    }
}
