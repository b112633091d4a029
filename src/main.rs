#![cfg_attr(not(target_os = "linux"), allow(dead_code, unused_imports))]

use anyhow::Context;
use sbsread::{BatteryState, DEFAULT_ADDRESS};
use std::env;
use tokio::time::{sleep, Duration};

#[cfg(target_os = "linux")]
use sbsread::SmartBattery;

const DEFAULT_DEVICE: &str = "/dev/i2c-1";
const DEFAULT_POLL_SECS: u64 = 5;

/// Where to find the battery and how often to read it, from `SBS_DEVICE`,
/// `SBS_ADDRESS` and `SBS_POLL_SECS`
struct Settings {
    device: String,
    address: u8,
    poll: Option<Duration>,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        let device = env::var("SBS_DEVICE").unwrap_or_else(|_| DEFAULT_DEVICE.to_string());

        let address = match env::var("SBS_ADDRESS") {
            Ok(raw) => parse_address(&raw).with_context(|| format!("SBS_ADDRESS={raw}"))?,
            Err(_) => DEFAULT_ADDRESS,
        };

        let poll_secs = match env::var("SBS_POLL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SBS_POLL_SECS={raw}"))?,
            Err(_) => DEFAULT_POLL_SECS,
        };
        let poll = (poll_secs > 0).then(|| Duration::from_secs(poll_secs));

        Ok(Self { device, address, poll })
    }
}

fn parse_address(raw: &str) -> anyhow::Result<u8> {
    let address = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => raw.parse::<u8>()?,
    };
    Ok(address)
}

fn print_summary(state: &BatteryState) {
    println!(
        "{} {} ({}), serial {}",
        state.manufacturer_name, state.device_name, state.chemistry, state.serial_number
    );
    println!(
        "  {:.2} V  {:.3} A  {:.1} °C",
        f32::from(state.voltage_mv) / 1000.0,
        f32::from(state.current_ma) / 1000.0,
        state.temperature_c
    );
    println!(
        "  {}%  {} / {} mAh",
        state.relative_state_of_charge_pct,
        state.full_charge_capacity_mah,
        state.design_capacity_mah
    );
    println!(
        "  status {}  health {}  raw {}",
        state.power_supply_status, state.health, state.status
    );
}

#[cfg(not(target_os = "linux"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("sbsread reads the battery through Linux i2c-dev and only runs on Linux")
}

#[cfg(target_os = "linux")]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    let mut battery = SmartBattery::open(&settings.device, settings.address)
        .with_context(|| format!("opening battery {:#04x} on {}", settings.address, settings.device))?;

    loop {
        // bus reads block, so hand the battery to the blocking pool and take it back
        let (returned, state) = tokio::task::spawn_blocking(move || {
            let state = battery.fetch_state();
            (battery, state)
        })
        .await?;
        battery = returned;

        match state {
            Ok(state) => print_summary(&state),
            Err(err) if settings.poll.is_some() => log::warn!("Battery read failed: {err}"),
            Err(err) => return Err(err).context("reading battery state"),
        }

        match settings.poll {
            Some(interval) => sleep(interval).await,
            None => return Ok(()),
        }
    }
}

#[test]
fn test_parse_address() {
    assert_eq!(parse_address("0x0b").unwrap(), 0x0b);
    assert_eq!(parse_address("0X16").unwrap(), 0x16);
    assert_eq!(parse_address("11").unwrap(), 11);
    assert!(parse_address("0xzz").is_err());
    assert!(parse_address("300").is_err());
}
