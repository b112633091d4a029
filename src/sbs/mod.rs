//! Smart Battery Data Specification register map and value decoding

mod command;
mod status;

pub use command::SbsCommand;
pub use status::{BatteryStatus, BatteryStatusAlarm, BatteryStatusError, StatusWord};

/// Value the time registers report when the estimate is not available
const TIME_NOT_AVAILABLE: u16 = 0xFFFF;

/// Current registers are two's complement
pub fn decode_current(raw: u16) -> i16 {
    raw as i16
}

/// Temperature register is in units of 0.1 K; returns °C
pub fn decode_temperature(raw: u16) -> f32 {
    f32::from(raw) * 0.1 - 273.15
}

/// Minutes, or `None` when the battery reports 65535 (not available)
pub fn decode_minutes(raw: u16) -> Option<u16> {
    (raw != TIME_NOT_AVAILABLE).then_some(raw)
}

/// Block registers carry ASCII without a terminator; non-ASCII bytes are replaced
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Date packed by the ManufactureDate register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManufactureDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ManufactureDate {
    /// `(year - 1980) * 512 + month * 32 + day`
    pub fn from_raw(raw: u16) -> Self {
        Self {
            year: 1980 + (raw >> 9),
            month: ((raw >> 5) & 0x0F) as u8,
            day: (raw & 0x1F) as u8,
        }
    }
}

#[test]
fn test_current_is_signed() {
    assert_eq!(decode_current(0xFFFF), -1);
    assert_eq!(decode_current(0xFC18), -1000);
    assert_eq!(decode_current(0x03E8), 1000);
    assert_eq!(decode_current(0x8000), i16::MIN);
}

#[test]
fn test_temperature_kelvin_to_celsius() {
    assert!((decode_temperature(2931) - 19.95).abs() < 1e-3);
    assert!((decode_temperature(2731) - (-0.05)).abs() < 1e-3);
    assert!((decode_temperature(0) - (-273.15)).abs() < 1e-3);
}

#[test]
fn test_minutes_not_available() {
    assert_eq!(decode_minutes(0xFFFF), None);
    assert_eq!(decode_minutes(90), Some(90));
}

#[test]
fn test_text_uses_every_byte_given() {
    assert_eq!(decode_text(b"LION"), "LION");
    assert_eq!(decode_text(b""), "");
    assert_eq!(decode_text(b"ab\0cd").len(), 5);
}

#[test]
fn test_manufacture_date() {
    // 2019-07-23
    let raw = (2019 - 1980) * 512 + 7 * 32 + 23;
    assert_eq!(
        ManufactureDate::from_raw(raw),
        ManufactureDate { year: 2019, month: 7, day: 23 }
    );
}
