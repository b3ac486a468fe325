//! Light: a plain on/off switchable device.

use crate::device::DeviceStatus;
use crate::id::DeviceId;

/// A switchable light, off when created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Light {
    id: DeviceId,
    on: bool,
}

impl Light {
    #[must_use]
    pub fn new(id: DeviceId) -> Self {
        Self { id, on: false }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn turn_on(&mut self) {
        self.on = true;
    }

    pub fn turn_off(&mut self) {
        self.on = false;
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        if self.on {
            DeviceStatus::On
        } else {
            DeviceStatus::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_off() {
        let light = Light::new(DeviceId::from("L1"));
        assert!(!light.is_on());
        assert_eq!(light.status(), DeviceStatus::Off);
    }

    #[test]
    fn should_stay_on_when_turned_on_twice() {
        let mut light = Light::new(DeviceId::from("L1"));
        light.turn_on();
        light.turn_on();
        assert_eq!(light.status(), DeviceStatus::On);
    }
}
