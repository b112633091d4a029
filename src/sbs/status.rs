//! Bit layout of the BatteryStatus (0x16) register
//!
//! ```text
//! bit  15 14 13 12 11 10  9  8 | 7  6  5  4 | 3  2  1  0
//!      OCA TCA -  OTA TDA -  RCA RTA | INIT DSG FC FD | error code
//! ```

use std::fmt;

bitflags::bitflags! {
    /// Condition bits in the low byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BatteryStatus: u16 {
        const INITIALIZED = 0x0080;
        const DISCHARGING = 0x0040;
        const FULLY_CHARGED = 0x0020;
        const FULLY_DISCHARGED = 0x0010;
    }
}

bitflags::bitflags! {
    /// Alarm bits in the high byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BatteryStatusAlarm: u16 {
        const OVER_CHARGED = 0x8000;
        const TERMINATE_CHARGE = 0x4000;
        const OVER_TEMP = 0x1000;
        const TERMINATE_DISCHARGE = 0x0800;
        const REMAINING_CAPACITY = 0x0200;
        const REMAINING_TIME = 0x0100;
    }
}

impl BatteryStatusAlarm {
    /// Every bit of the alarm byte, including ones without a named flag
    pub const MASK: u16 = 0xFF00;
}

/// The device's acknowledgement of the last command it received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatusError {
    Ok = 0x0,
    Busy = 0x1,
    ReservedCommand = 0x2,
    UnsupportedCommand = 0x3,
    AccessDenied = 0x4,
    OverflowUnderflow = 0x5,
    BadSize = 0x6,
    UnknownError = 0x7,
}

impl BatteryStatusError {
    /// Bits of the status word holding the error code
    pub const MASK: u16 = 0x000F;

    /// Decode the error code field; values above 7 are reported as unknown
    pub fn from_status(raw: u16) -> Self {
        match raw & Self::MASK {
            0x0 => Self::Ok,
            0x1 => Self::Busy,
            0x2 => Self::ReservedCommand,
            0x3 => Self::UnsupportedCommand,
            0x4 => Self::AccessDenied,
            0x5 => Self::OverflowUnderflow,
            0x6 => Self::BadSize,
            _ => Self::UnknownError,
        }
    }
}

/// Raw BatteryStatus register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWord(pub u16);

impl StatusWord {
    pub fn raw(self) -> u16 {
        self.0
    }

    pub fn status(self) -> BatteryStatus {
        BatteryStatus::from_bits_truncate(self.0)
    }

    /// Named alarm bits; unnamed ones are only visible through [`StatusWord::any_alarm`]
    pub fn alarms(self) -> BatteryStatusAlarm {
        BatteryStatusAlarm::from_bits_truncate(self.0)
    }

    pub fn any_alarm(self) -> bool {
        self.0 & BatteryStatusAlarm::MASK != 0
    }

    pub fn error(self) -> BatteryStatusError {
        BatteryStatusError::from_status(self.0)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

#[test]
fn test_status_word_split() {
    let word = StatusWord(0x10C0 | 0x0003);
    assert_eq!(
        word.status(),
        BatteryStatus::INITIALIZED | BatteryStatus::DISCHARGING
    );
    assert_eq!(word.alarms(), BatteryStatusAlarm::OVER_TEMP);
    assert!(word.any_alarm());
    assert_eq!(word.error(), BatteryStatusError::UnsupportedCommand);
}

#[test]
fn test_unnamed_alarm_bit_counts_as_alarm() {
    let word = StatusWord(0x2000);
    assert!(word.alarms().is_empty());
    assert!(word.any_alarm());
}

#[test]
fn test_error_codes() {
    assert_eq!(BatteryStatusError::from_status(0x00E0), BatteryStatusError::Ok);
    assert_eq!(BatteryStatusError::from_status(0x0001), BatteryStatusError::Busy);
    assert_eq!(BatteryStatusError::from_status(0x0004), BatteryStatusError::AccessDenied);
    assert_eq!(BatteryStatusError::from_status(0x0006), BatteryStatusError::BadSize);
    assert_eq!(BatteryStatusError::from_status(0x0007), BatteryStatusError::UnknownError);
    assert_eq!(BatteryStatusError::from_status(0x000F), BatteryStatusError::UnknownError);
}
