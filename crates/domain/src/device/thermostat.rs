//! Thermostat: holds a target temperature in °F.
//!
//! A thermostat has no binary power state; switching it is accepted and
//! ignored by [`Device`](crate::device::Device).

use crate::device::DeviceStatus;
use crate::error::HomeError;
use crate::id::DeviceId;

/// Thermostat with a target temperature kept in `[MIN_TEMPERATURE, MAX_TEMPERATURE]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thermostat {
    id: DeviceId,
    temperature: i32,
}

impl Thermostat {
    pub const MIN_TEMPERATURE: i32 = 40;
    pub const MAX_TEMPERATURE: i32 = 90;
    pub const DEFAULT_TEMPERATURE: i32 = 70;

    #[must_use]
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Change the target temperature.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::OutOfRange`] and leaves the current temperature
    /// untouched when `value` is outside the supported range.
    pub fn set_temperature(&mut self, value: i32) -> Result<(), HomeError> {
        Self::check_range(value)?;
        self.temperature = value;
        Ok(())
    }

    /// Validate a temperature without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::OutOfRange`] when `value` is outside the range.
    pub fn check_range(value: i32) -> Result<(), HomeError> {
        if (Self::MIN_TEMPERATURE..=Self::MAX_TEMPERATURE).contains(&value) {
            Ok(())
        } else {
            Err(HomeError::OutOfRange {
                value,
                min: Self::MIN_TEMPERATURE,
                max: Self::MAX_TEMPERATURE,
            })
        }
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::Temperature(self.temperature)
    }
}
