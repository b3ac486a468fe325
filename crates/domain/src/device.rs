//! Device: a controllable thing registered in the hub.
//!
//! Devices are a closed set of variants ([`Light`], [`Thermostat`],
//! [`DoorLock`]) behind the [`Device`] sum type. Every variant supports the
//! common capability set (identify, turn on, turn off, report status);
//! thermostat-only operations are reached through
//! [`Device::as_thermostat_mut`], which callers pattern-match on.

mod door_lock;
mod light;
mod status;
mod thermostat;

pub use door_lock::DoorLock;
pub use light::Light;
pub use status::DeviceStatus;
pub use thermostat::Thermostat;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HomeError;
use crate::id::DeviceId;

/// Type tag of a device variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Light,
    Thermostat,
    DoorLock,
}

impl DeviceKind {
    /// Every known kind, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Light, Self::Thermostat, Self::DoorLock];

    /// The wire tag used by `add <type> <id>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::DoorLock => "doorlock",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = HomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| HomeError::UnknownDeviceType(s.to_string()))
    }
}

/// A registered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Device {
    Light(Light),
    Thermostat(Thermostat),
    DoorLock(DoorLock),
}

impl Device {
    /// Build a device of the given kind in its initial state.
    #[must_use]
    pub fn new(kind: DeviceKind, id: DeviceId) -> Self {
        match kind {
            DeviceKind::Light => Self::Light(Light::new(id)),
            DeviceKind::Thermostat => Self::Thermostat(Thermostat::new(id)),
            DeviceKind::DoorLock => Self::DoorLock(DoorLock::new(id)),
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        match self {
            Self::Light(d) => d.id(),
            Self::Thermostat(d) => d.id(),
            Self::DoorLock(d) => d.id(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Light(_) => DeviceKind::Light,
            Self::Thermostat(_) => DeviceKind::Thermostat,
            Self::DoorLock(_) => DeviceKind::DoorLock,
        }
    }

    /// Switch the light on or lock the door. Thermostats ignore it.
    pub fn turn_on(&mut self) {
        match self {
            Self::Light(d) => d.turn_on(),
            Self::DoorLock(d) => d.lock(),
            Self::Thermostat(_) => {}
        }
    }

    /// Switch the light off or unlock the door. Thermostats ignore it.
    pub fn turn_off(&mut self) {
        match self {
            Self::Light(d) => d.turn_off(),
            Self::DoorLock(d) => d.unlock(),
            Self::Thermostat(_) => {}
        }
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        match self {
            Self::Light(d) => d.status(),
            Self::Thermostat(d) => d.status(),
            Self::DoorLock(d) => d.status(),
        }
    }

    /// Thermostat view of this device, if it is one.
    #[must_use]
    pub fn as_thermostat(&self) -> Option<&Thermostat> {
        match self {
            Self::Thermostat(t) => Some(t),
            Self::Light(_) | Self::DoorLock(_) => None,
        }
    }

    /// Mutable thermostat view of this device, if it is one.
    pub fn as_thermostat_mut(&mut self) -> Option<&mut Thermostat> {
        match self {
            Self::Thermostat(t) => Some(t),
            Self::Light(_) | Self::DoorLock(_) => None,
        }
    }
}

/// Device factory: build a device from its textual type tag.
///
/// # Errors
///
/// Returns [`HomeError::UnknownDeviceType`] when `type_tag` names no known
/// variant.
pub fn create(type_tag: &str, id: impl Into<DeviceId>) -> Result<Device, HomeError> {
    let kind = type_tag.parse::<DeviceKind>()?;
    Ok(Device::new(kind, id.into()))
}
