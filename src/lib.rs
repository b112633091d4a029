//! Read telemetry from Smart Battery System (SBS) battery packs over a Linux SMBus adapter
//!
//! Smart batteries answer the command set of the Smart Battery Data Specification on
//! the SMBus, usually at address `0x0b`. This crate opens the adapter's i2c-dev node,
//! checks the adapter can do the reads SBS needs, binds the battery address, turns on
//! packet error checking and then decodes the registers.
//!
//! Currently the following data can be accessed:
//!
//! - Voltage (mV) and current (mA)
//! - Temperature (°C)
//! - Full charge, design and remaining capacity (mAh)
//! - Relative and absolute state of charge (%)
//! - Status and alarm flags, interpreted as charge state and health
//! - Serial number, manufacturer, device name and cell chemistry
//!
//! Access is read-only and synchronous: each getter is one blocking bus transaction.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! # fn main() -> sbsread::Result<()> {
//!     let mut battery = sbsread::SmartBattery::open("/dev/i2c-1", sbsread::DEFAULT_ADDRESS)?;
//!     loop {
//!         let battery_state = battery.fetch_state()?;
//!         println!("{battery_state:?}");
//!         std::thread::sleep(Duration::from_secs(5));
//!     }
//! # }
//! ```

mod battery_state;
mod channel;
mod error;
pub mod sbs;
mod smart_battery;
pub mod smbus;

pub use battery_state::{BatteryState, Chemistry, Health, PowerSupplyStatus};
pub use channel::{Channel, ADDRESS_MAX, ADDRESS_MIN};
pub use error::{Error, Result};
pub use smart_battery::{SmartBattery, DEFAULT_ADDRESS};
