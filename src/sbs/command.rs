use std::fmt;

/// Command codes of the Smart Battery Data Specification register map.
///
/// 0x1d-0x1f are reserved and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SbsCommand {
    ManufacturerAccess = 0x00,
    RemainingCapacityAlarm = 0x01,
    RemainingTimeAlarm = 0x02,
    BatteryMode = 0x03,
    AtRate = 0x04,
    AtRateTimeToFull = 0x05,
    AtRateTimeToEmpty = 0x06,
    AtRateOk = 0x07,
    Temperature = 0x08,
    Voltage = 0x09,
    Current = 0x0a,
    AverageCurrent = 0x0b,
    MaxError = 0x0c,
    RelativeStateOfCharge = 0x0d,
    AbsoluteStateOfCharge = 0x0e,
    RemainingCapacity = 0x0f,
    FullChargeCapacity = 0x10,
    RunTimeToEmpty = 0x11,
    AverageTimeToEmpty = 0x12,
    AverageTimeToFull = 0x13,
    ChargingCurrent = 0x14,
    ChargingVoltage = 0x15,
    BatteryStatus = 0x16,
    CycleCount = 0x17,
    DesignCapacity = 0x18,
    DesignVoltage = 0x19,
    SpecificationInfo = 0x1a,
    ManufactureDate = 0x1b,
    SerialNumber = 0x1c,
    ManufacturerName = 0x20,
    DeviceName = 0x21,
    CellChemistry = 0x22,
    ManufacturerData = 0x23,
}

impl SbsCommand {
    const ALL: [SbsCommand; 33] = [
        Self::ManufacturerAccess,
        Self::RemainingCapacityAlarm,
        Self::RemainingTimeAlarm,
        Self::BatteryMode,
        Self::AtRate,
        Self::AtRateTimeToFull,
        Self::AtRateTimeToEmpty,
        Self::AtRateOk,
        Self::Temperature,
        Self::Voltage,
        Self::Current,
        Self::AverageCurrent,
        Self::MaxError,
        Self::RelativeStateOfCharge,
        Self::AbsoluteStateOfCharge,
        Self::RemainingCapacity,
        Self::FullChargeCapacity,
        Self::RunTimeToEmpty,
        Self::AverageTimeToEmpty,
        Self::AverageTimeToFull,
        Self::ChargingCurrent,
        Self::ChargingVoltage,
        Self::BatteryStatus,
        Self::CycleCount,
        Self::DesignCapacity,
        Self::DesignVoltage,
        Self::SpecificationInfo,
        Self::ManufactureDate,
        Self::SerialNumber,
        Self::ManufacturerName,
        Self::DeviceName,
        Self::CellChemistry,
        Self::ManufacturerData,
    ];

    /// The one-byte code sent on the wire
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a command by its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Register name as written in the SBS data specification
    pub fn name(self) -> &'static str {
        match self {
            Self::ManufacturerAccess => "ManufacturerAccess",
            Self::RemainingCapacityAlarm => "RemainingCapacityAlarm",
            Self::RemainingTimeAlarm => "RemainingTimeAlarm",
            Self::BatteryMode => "BatteryMode",
            Self::AtRate => "AtRate",
            Self::AtRateTimeToFull => "AtRateTimeToFull",
            Self::AtRateTimeToEmpty => "AtRateTimeToEmpty",
            Self::AtRateOk => "AtRateOK",
            Self::Temperature => "Temperature",
            Self::Voltage => "Voltage",
            Self::Current => "Current",
            Self::AverageCurrent => "AverageCurrent",
            Self::MaxError => "MaxError",
            Self::RelativeStateOfCharge => "RelativeStateOfCharge",
            Self::AbsoluteStateOfCharge => "AbsoluteStateOfCharge",
            Self::RemainingCapacity => "RemainingCapacity",
            Self::FullChargeCapacity => "FullChargeCapacity",
            Self::RunTimeToEmpty => "RunTimeToEmpty",
            Self::AverageTimeToEmpty => "AverageTimeToEmpty",
            Self::AverageTimeToFull => "AverageTimeToFull",
            Self::ChargingCurrent => "ChargingCurrent",
            Self::ChargingVoltage => "ChargingVoltage",
            Self::BatteryStatus => "BatteryStatus",
            Self::CycleCount => "CycleCount",
            Self::DesignCapacity => "DesignCapacity",
            Self::DesignVoltage => "DesignVoltage",
            Self::SpecificationInfo => "SpecificationInfo",
            Self::ManufactureDate => "ManufactureDate",
            Self::SerialNumber => "SerialNumber",
            Self::ManufacturerName => "ManufacturerName",
            Self::DeviceName => "DeviceName",
            Self::CellChemistry => "CellChemistry",
            Self::ManufacturerData => "ManufacturerData",
        }
    }
}

impl fmt::Display for SbsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#04x})", self.name(), self.code())
    }
}

#[test]
fn test_wire_codes() {
    assert_eq!(SbsCommand::Temperature.code(), 0x08);
    assert_eq!(SbsCommand::Voltage.code(), 0x09);
    assert_eq!(SbsCommand::Current.code(), 0x0a);
    assert_eq!(SbsCommand::RelativeStateOfCharge.code(), 0x0d);
    assert_eq!(SbsCommand::FullChargeCapacity.code(), 0x10);
    assert_eq!(SbsCommand::BatteryStatus.code(), 0x16);
    assert_eq!(SbsCommand::DesignCapacity.code(), 0x18);
    assert_eq!(SbsCommand::SerialNumber.code(), 0x1c);
    assert_eq!(SbsCommand::ManufacturerName.code(), 0x20);
    assert_eq!(SbsCommand::DeviceName.code(), 0x21);
    assert_eq!(SbsCommand::CellChemistry.code(), 0x22);
}

#[test]
fn test_from_code_skips_reserved_range() {
    for code in 0x1d..=0x1f {
        assert_eq!(SbsCommand::from_code(code), None);
    }
    assert_eq!(SbsCommand::from_code(0x24), None);
    for command in SbsCommand::ALL {
        assert_eq!(SbsCommand::from_code(command.code()), Some(command));
    }
}

#[test]
fn test_display() {
    assert_eq!(SbsCommand::CellChemistry.to_string(), "CellChemistry(0x22)");
}
