//! Device status: the observable state of a device.

use serde::{Deserialize, Serialize};

/// What a device reports when asked for its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    On,
    Off,
    Locked,
    Unlocked,
    /// Thermostat target, in °F.
    Temperature(i32),
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Locked => f.write_str("locked"),
            Self::Unlocked => f.write_str("unlocked"),
            Self::Temperature(value) => write!(f, "set to {value}°F"),
        }
    }
}
