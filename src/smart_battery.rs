use crate::battery_state::{BatteryState, Chemistry, Health, PowerSupplyStatus};
use crate::channel::Channel;
use crate::error::Result;
use crate::sbs::{self, ManufactureDate, SbsCommand, StatusWord};
use crate::smbus::{Smbus, BLOCK_MAX};
use log::debug;
use std::path::Path;

#[cfg(target_os = "linux")]
use crate::smbus::LinuxSmbus;

/// Address the SBS specification assigns to a smart battery
pub const DEFAULT_ADDRESS: u8 = 0x0b;

/// Read-only access to one smart battery.
///
/// Every getter issues exactly one SMBus transaction and decodes the result. Nothing
/// is cached, so calling a getter twice queries the battery twice.
#[derive(Debug)]
pub struct SmartBattery<B> {
    channel: Channel<B>,
}

#[cfg(target_os = "linux")]
impl SmartBattery<LinuxSmbus> {
    /// Open the battery at `address` on the bus device at `path`, e.g. `/dev/i2c-1`.
    pub fn open(path: impl AsRef<Path>, address: u8) -> Result<Self> {
        Ok(Self::new(Channel::open(path, address)?))
    }

    /// Open the battery at the standard smart battery address
    pub fn open_default_address(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, DEFAULT_ADDRESS)
    }
}

impl<B: Smbus> SmartBattery<B> {
    pub fn new(channel: Channel<B>) -> Self {
        Self { channel }
    }

    /// Give up the battery and return the channel
    pub fn into_channel(self) -> Channel<B> {
        self.channel
    }

    fn read_word(&mut self, command: SbsCommand) -> Result<u16> {
        self.channel.read_word(command.code())
    }

    fn read_string(&mut self, command: SbsCommand) -> Result<String> {
        let block = self.channel.read_block(command.code(), BLOCK_MAX)?;
        Ok(sbs::decode_text(&block))
    }

    /// mV
    pub fn voltage(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::Voltage)
    }

    /// mA, positive while charging
    pub fn current(&mut self) -> Result<i16> {
        self.read_word(SbsCommand::Current).map(sbs::decode_current)
    }

    /// mAh
    pub fn full_charge_capacity(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::FullChargeCapacity)
    }

    /// mAh
    pub fn design_capacity(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::DesignCapacity)
    }

    /// Percent of full charge capacity
    pub fn relative_state_of_charge(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::RelativeStateOfCharge)
    }

    /// Raw status bits, see [`StatusWord`]
    pub fn battery_status(&mut self) -> Result<StatusWord> {
        self.read_word(SbsCommand::BatteryStatus).map(StatusWord)
    }

    pub fn serial_number(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::SerialNumber)
    }

    /// °C
    pub fn temperature(&mut self) -> Result<f32> {
        self.read_word(SbsCommand::Temperature)
            .map(sbs::decode_temperature)
    }

    pub fn manufacturer_name(&mut self) -> Result<String> {
        self.read_string(SbsCommand::ManufacturerName)
    }

    pub fn device_name(&mut self) -> Result<String> {
        self.read_string(SbsCommand::DeviceName)
    }

    /// Chemistry as reported, e.g. `LION`; see [`Chemistry::parse`]
    pub fn cell_chemistry(&mut self) -> Result<String> {
        self.read_string(SbsCommand::CellChemistry)
    }

    /// mA, one-minute rolling average
    pub fn average_current(&mut self) -> Result<i16> {
        self.read_word(SbsCommand::AverageCurrent)
            .map(sbs::decode_current)
    }

    /// mAh
    pub fn remaining_capacity(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::RemainingCapacity)
    }

    /// Percent of design capacity
    pub fn absolute_state_of_charge(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::AbsoluteStateOfCharge)
    }

    /// Minutes at the present rate, `None` while not discharging
    pub fn run_time_to_empty(&mut self) -> Result<Option<u16>> {
        self.read_word(SbsCommand::RunTimeToEmpty)
            .map(sbs::decode_minutes)
    }

    /// Minutes, `None` while not discharging
    pub fn average_time_to_empty(&mut self) -> Result<Option<u16>> {
        self.read_word(SbsCommand::AverageTimeToEmpty)
            .map(sbs::decode_minutes)
    }

    /// Minutes, `None` while not charging
    pub fn average_time_to_full(&mut self) -> Result<Option<u16>> {
        self.read_word(SbsCommand::AverageTimeToFull)
            .map(sbs::decode_minutes)
    }

    pub fn cycle_count(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::CycleCount)
    }

    /// mV
    pub fn design_voltage(&mut self) -> Result<u16> {
        self.read_word(SbsCommand::DesignVoltage)
    }

    pub fn manufacture_date(&mut self) -> Result<ManufactureDate> {
        self.read_word(SbsCommand::ManufactureDate)
            .map(ManufactureDate::from_raw)
    }

    /// Read the current state from the battery.
    ///
    /// Issues one transaction per field and stops at the first failure.
    pub fn fetch_state(&mut self) -> Result<BatteryState> {
        let voltage_mv = self.voltage()?;
        let current_ma = self.current()?;
        let temperature_c = self.temperature()?;
        let full_charge_capacity_mah = self.full_charge_capacity()?;
        let design_capacity_mah = self.design_capacity()?;
        let relative_state_of_charge_pct = self.relative_state_of_charge()?;
        let status = self.battery_status()?;
        let chemistry = Chemistry::parse(&self.cell_chemistry()?);
        let serial_number = self.serial_number()?;
        let manufacturer_name = self.manufacturer_name()?;
        let device_name = self.device_name()?;

        debug!("Battery status word {status}");

        Ok(BatteryState {
            voltage_mv,
            current_ma,
            temperature_c,
            full_charge_capacity_mah,
            design_capacity_mah,
            relative_state_of_charge_pct,
            status,
            power_supply_status: PowerSupplyStatus::from_status(status, current_ma),
            health: Health::from_status(status),
            chemistry,
            serial_number,
            manufacturer_name,
            device_name,
        })
    }
}

#[cfg(test)]
use crate::smbus::mock::{MockBus, MockSmbus, Transaction};

#[cfg(test)]
fn battery(bus: &MockBus) -> SmartBattery<MockSmbus> {
    let channel =
        Channel::connect(Path::new("/dev/i2c-mock"), DEFAULT_ADDRESS, |_| bus.open()).unwrap();
    SmartBattery::new(channel)
}

#[cfg(test)]
fn populated_bus() -> MockBus {
    MockBus::new()
        .with_word(0x09, 12_600)
        .with_word(0x0a, 0xFFFF)
        .with_word(0x08, 2931)
        .with_word(0x10, 4_800)
        .with_word(0x18, 5_200)
        .with_word(0x0d, 87)
        .with_word(0x16, 0x00C0)
        .with_word(0x1c, 0x1234)
        .with_block(0x20, b"ACME")
        .with_block(0x21, b"PACK-4S2P")
        .with_block(0x22, &hex::decode("4c696f6e").unwrap())
}

#[test]
fn test_each_getter_issues_one_transaction() {
    let bus = populated_bus();
    let mut battery = battery(&bus);

    assert_eq!(battery.voltage().unwrap(), 12_600);
    assert_eq!(battery.current().unwrap(), -1);
    assert!((battery.temperature().unwrap() - 19.95).abs() < 1e-3);
    assert_eq!(battery.full_charge_capacity().unwrap(), 4_800);
    assert_eq!(battery.design_capacity().unwrap(), 5_200);
    assert_eq!(battery.relative_state_of_charge().unwrap(), 87);
    assert_eq!(battery.serial_number().unwrap(), 0x1234);
    assert_eq!(battery.battery_status().unwrap(), StatusWord(0x00C0));
    assert_eq!(bus.reads(), 8);

    let reads: Vec<Transaction> = bus.transactions().into_iter().skip(3).collect();
    assert_eq!(
        reads,
        vec![
            Transaction::ReadWord(0x09),
            Transaction::ReadWord(0x0a),
            Transaction::ReadWord(0x08),
            Transaction::ReadWord(0x10),
            Transaction::ReadWord(0x18),
            Transaction::ReadWord(0x0d),
            Transaction::ReadWord(0x1c),
            Transaction::ReadWord(0x16),
        ]
    );
}

#[test]
fn test_repeated_reads_are_not_cached() {
    let bus = populated_bus();
    let mut battery = battery(&bus);

    let first = battery.voltage().unwrap();
    let second = battery.voltage().unwrap();
    assert_eq!(first, second);
    assert_eq!(bus.reads(), 2);
}

#[test]
fn test_strings_use_reported_length() {
    let bus = MockBus::new().with_block(0x22, b"LiIon").with_block(0x21, b"");
    let mut battery = battery(&bus);

    let chemistry = battery.cell_chemistry().unwrap();
    assert_eq!(chemistry.len(), 5);
    assert_eq!(chemistry, "LiIon");
    assert_eq!(battery.device_name().unwrap(), "");
    assert_eq!(
        bus.transactions().last(),
        Some(&Transaction::ReadBlock(0x21))
    );
}

#[test]
fn test_failed_string_read_is_an_error() {
    let bus = MockBus::new().failing_command(0x20);
    let mut battery = battery(&bus);

    let err = battery.manufacturer_name().unwrap_err();
    assert_eq!(err.command(), Some(0x20));
}

#[test]
fn test_supplementary_registers() {
    let bus = MockBus::new()
        .with_word(0x0b, 0xFE0C)
        .with_word(0x0f, 2_400)
        .with_word(0x0e, 46)
        .with_word(0x11, 0xFFFF)
        .with_word(0x12, 95)
        .with_word(0x13, 0xFFFF)
        .with_word(0x17, 312)
        .with_word(0x19, 14_400)
        .with_word(0x1b, (2021 - 1980) * 512 + 3 * 32 + 14);
    let mut battery = battery(&bus);

    assert_eq!(battery.average_current().unwrap(), -500);
    assert_eq!(battery.remaining_capacity().unwrap(), 2_400);
    assert_eq!(battery.absolute_state_of_charge().unwrap(), 46);
    assert_eq!(battery.run_time_to_empty().unwrap(), None);
    assert_eq!(battery.average_time_to_empty().unwrap(), Some(95));
    assert_eq!(battery.average_time_to_full().unwrap(), None);
    assert_eq!(battery.cycle_count().unwrap(), 312);
    assert_eq!(battery.design_voltage().unwrap(), 14_400);
    assert_eq!(
        battery.manufacture_date().unwrap(),
        ManufactureDate { year: 2021, month: 3, day: 14 }
    );
}

#[test]
fn test_fetch_state() {
    let bus = populated_bus();
    let mut battery = battery(&bus);

    let state = battery.fetch_state().unwrap();
    assert_eq!(state.voltage_mv, 12_600);
    assert_eq!(state.current_ma, -1);
    assert_eq!(state.relative_state_of_charge_pct, 87);
    assert_eq!(state.power_supply_status, PowerSupplyStatus::DISCHARGING);
    assert_eq!(state.health, Health::Good);
    assert_eq!(state.chemistry, Chemistry::LiIon);
    assert_eq!(state.serial_number, 0x1234);
    assert_eq!(state.manufacturer_name, "ACME");
    assert_eq!(state.device_name, "PACK-4S2P");
    assert_eq!(bus.reads(), 11);
}

#[test]
fn test_fetch_state_stops_at_first_failure() {
    let bus = populated_bus().failing_command(0x08);
    let mut battery = battery(&bus);

    let err = battery.fetch_state().unwrap_err();
    assert_eq!(err.command(), Some(SbsCommand::Temperature.code()));
    assert_eq!(bus.reads(), 3);

    // channel survives the failure
    assert_eq!(battery.voltage().unwrap(), 12_600);
}

#[test]
fn test_battery_closes_handle_on_drop() {
    let bus = populated_bus();
    let battery = battery(&bus);
    drop(battery);
    assert_eq!(bus.opened(), 1);
    assert_eq!(bus.closed(), 1);
}

#[test]
fn test_into_channel_keeps_binding() {
    let bus = populated_bus();
    let channel = battery(&bus).into_channel();
    assert_eq!(channel.address(), DEFAULT_ADDRESS);
    assert_eq!(bus.closed(), 0);
    drop(channel.into_inner());
    assert_eq!(bus.closed(), 1);
}
