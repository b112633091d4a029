use crate::sbs::{BatteryStatus, BatteryStatusAlarm, StatusWord};
use std::fmt;

/// The reported state of the battery
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryState {
    /// Pack voltage in mV
    pub voltage_mv: u16,
    /// Current in mA, positive while charging
    pub current_ma: i16,
    /// Pack temperature in °C
    pub temperature_c: f32,
    /// Predicted capacity when fully charged, in mAh
    pub full_charge_capacity_mah: u16,
    /// Theoretical capacity of a new pack, in mAh
    pub design_capacity_mah: u16,
    /// Remaining capacity as % of full charge capacity
    pub relative_state_of_charge_pct: u16,
    /// Raw BatteryStatus register
    pub status: StatusWord,
    pub power_supply_status: PowerSupplyStatus,
    pub health: Health,
    pub chemistry: Chemistry,
    pub serial_number: u16,
    pub manufacturer_name: String,
    pub device_name: String,
}

bitflags::bitflags! {
    /// What the pack is doing right now.
    ///
    /// The signals come from different registers and may be set together, e.g.
    /// a full pack that is still being topped up is `FULL | CHARGING`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerSupplyStatus: u8 {
        const DISCHARGING = 0b001;
        const FULL = 0b010;
        const CHARGING = 0b100;
    }
}

impl PowerSupplyStatus {
    pub fn from_status(status: StatusWord, current_ma: i16) -> Self {
        let bits = status.status();
        let mut state = Self::empty();
        if bits.contains(BatteryStatus::DISCHARGING) {
            state |= Self::DISCHARGING;
        }
        if bits.contains(BatteryStatus::FULLY_CHARGED) {
            state |= Self::FULL;
        }
        if current_ma > 0 {
            state |= Self::CHARGING;
        }
        state
    }
}

impl fmt::Display for PowerSupplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Unknown");
        }
        let names = [
            (Self::DISCHARGING, "Discharging"),
            (Self::FULL, "Full"),
            (Self::CHARGING, "Charging"),
        ];
        let parts: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&parts.join("|"))
    }
}

/// Overall condition derived from the status alarms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Overheat,
    Overvoltage,
    Dead,
    UnspecifiedFailure,
}

impl Health {
    /// First match wins: over-temperature, over-charge, fully discharged, any other alarm
    pub fn from_status(status: StatusWord) -> Self {
        let alarms = status.alarms();
        if alarms.contains(BatteryStatusAlarm::OVER_TEMP) {
            Health::Overheat
        } else if alarms.contains(BatteryStatusAlarm::OVER_CHARGED) {
            Health::Overvoltage
        } else if status.status().contains(BatteryStatus::FULLY_DISCHARGED) {
            Health::Dead
        } else if status.any_alarm() {
            Health::UnspecifiedFailure
        } else {
            Health::Good
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Health::Good => "good",
            Health::Overheat => "overheat",
            Health::Overvoltage => "overvoltage",
            Health::Dead => "dead",
            Health::UnspecifiedFailure => "unspecified failure",
        })
    }
}

/// Cell chemistry as reported by the CellChemistry register
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chemistry {
    NiMh,
    LiIon,
    LiPo,
    NiCd,
    /// Anything else, lowercased
    Other(String),
}

impl Chemistry {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        match lower.as_str() {
            "nimh" => Chemistry::NiMh,
            "lion" => Chemistry::LiIon,
            "lip" => Chemistry::LiPo,
            "nicd" => Chemistry::NiCd,
            _ => Chemistry::Other(lower),
        }
    }

    /// Lowercased identifier
    pub fn as_str(&self) -> &str {
        match self {
            Chemistry::NiMh => "nimh",
            Chemistry::LiIon => "lion",
            Chemistry::LiPo => "lip",
            Chemistry::NiCd => "nicd",
            Chemistry::Other(s) => s,
        }
    }
}

impl fmt::Display for Chemistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[test]
fn test_status_is_composable() {
    let status = StatusWord(BatteryStatus::DISCHARGING.bits());
    let state = PowerSupplyStatus::from_status(status, 250);
    assert!(state.contains(PowerSupplyStatus::DISCHARGING));
    assert!(state.contains(PowerSupplyStatus::CHARGING));
    assert!(!state.contains(PowerSupplyStatus::FULL));
}

#[test]
fn test_status_display() {
    let full = StatusWord(BatteryStatus::FULLY_CHARGED.bits());
    assert_eq!(PowerSupplyStatus::from_status(full, 10).to_string(), "Full|Charging");
    assert_eq!(PowerSupplyStatus::from_status(full, 0).to_string(), "Full");
    assert_eq!(PowerSupplyStatus::from_status(StatusWord(0), -300).to_string(), "Unknown");
    assert_eq!(PowerSupplyStatus::from_status(StatusWord(0), 0), PowerSupplyStatus::empty());
}

#[test]
fn test_health_precedence() {
    let over_temp_and_dead =
        StatusWord(BatteryStatusAlarm::OVER_TEMP.bits() | BatteryStatus::FULLY_DISCHARGED.bits());
    assert_eq!(Health::from_status(over_temp_and_dead), Health::Overheat);

    let over_charged_and_dead =
        StatusWord(BatteryStatusAlarm::OVER_CHARGED.bits() | BatteryStatus::FULLY_DISCHARGED.bits());
    assert_eq!(Health::from_status(over_charged_and_dead), Health::Overvoltage);

    let dead_and_low =
        StatusWord(BatteryStatus::FULLY_DISCHARGED.bits() | BatteryStatusAlarm::REMAINING_TIME.bits());
    assert_eq!(Health::from_status(dead_and_low), Health::Dead);

    let terminate_charge = StatusWord(BatteryStatusAlarm::TERMINATE_CHARGE.bits());
    assert_eq!(Health::from_status(terminate_charge), Health::UnspecifiedFailure);

    // unnamed alarm bit
    assert_eq!(Health::from_status(StatusWord(0x0400)), Health::UnspecifiedFailure);

    let healthy = StatusWord(BatteryStatus::INITIALIZED.bits() | BatteryStatus::FULLY_CHARGED.bits());
    assert_eq!(Health::from_status(healthy), Health::Good);
}

#[test]
fn test_chemistry_is_lowercased() {
    assert_eq!(Chemistry::parse("LiOn"), Chemistry::LiIon);
    assert_eq!(Chemistry::parse("LiOn").as_str(), "lion");
    assert_eq!(Chemistry::parse("NiMH"), Chemistry::NiMh);
    assert_eq!(Chemistry::parse("LIP"), Chemistry::LiPo);
    assert_eq!(Chemistry::parse("nicd"), Chemistry::NiCd);
    assert_eq!(Chemistry::parse("XYZ"), Chemistry::Other("xyz".to_string()));
    assert_eq!(Chemistry::parse("XYZ").to_string(), "xyz");
    // only ASCII is folded
    assert_eq!(Chemistry::parse("LiÖn").as_str(), "liÖn");
}
