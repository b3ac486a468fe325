//! Device proxy: forwards capability calls and records an audit entry for each.

use smarthome_domain::device::{Device, DeviceKind, DeviceStatus};
use smarthome_domain::error::HomeError;
use smarthome_domain::id::DeviceId;
use smarthome_domain::update::{DeviceChange, DeviceUpdate};

/// Owning wrapper around one [`Device`].
///
/// Return values are those of the wrapped device; the only addition is a
/// `tracing` record carrying `operation`, `device_id` and `device_type`.
#[derive(Debug)]
pub struct DeviceProxy {
    device: Device,
}

impl DeviceProxy {
    #[must_use]
    pub fn new(device: Device) -> Self {
        tracing::debug!(
            device_id = %device.id(),
            device_type = %device.kind(),
            "created device proxy"
        );
        Self { device }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        self.device.id()
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.device.kind()
    }

    pub fn turn_on(&mut self) {
        tracing::info!(
            operation = "turn_on",
            device_id = %self.id(),
            device_type = %self.kind(),
            "device call"
        );
        self.device.turn_on();
    }

    pub fn turn_off(&mut self) {
        tracing::info!(
            operation = "turn_off",
            device_id = %self.id(),
            device_type = %self.kind(),
            "device call"
        );
        self.device.turn_off();
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        tracing::debug!(
            operation = "status",
            device_id = %self.id(),
            device_type = %self.kind(),
            "device call"
        );
        self.device.status()
    }

    /// The wrapped device, for variant-specific reads.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Forward a target temperature to the wrapped thermostat.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::NotAThermostat`] for any other variant, or the
    /// thermostat's own range error.
    pub fn set_temperature(&mut self, value: i32) -> Result<(), HomeError> {
        tracing::info!(
            operation = "set_temperature",
            device_id = %self.id(),
            device_type = %self.kind(),
            value,
            "device call"
        );
        match self.device.as_thermostat_mut() {
            Some(thermostat) => thermostat.set_temperature(value),
            None => Err(HomeError::NotAThermostat(self.device.id().clone())),
        }
    }

    /// Snapshot handed to observers after a change.
    #[must_use]
    pub fn update(&self, change: DeviceChange) -> DeviceUpdate {
        DeviceUpdate::new(change, self.id().clone(), self.kind(), self.status())
    }
}
