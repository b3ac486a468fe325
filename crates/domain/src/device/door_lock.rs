//! Door lock: `turn_on` locks, `turn_off` unlocks.

use crate::device::DeviceStatus;
use crate::id::DeviceId;

/// A lockable door, locked when created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorLock {
    id: DeviceId,
    locked: bool,
}

impl DoorLock {
    #[must_use]
    pub fn new(id: DeviceId) -> Self {
        Self { id, locked: true }
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn status(&self) -> DeviceStatus {
        if self.locked {
            DeviceStatus::Locked
        } else {
            DeviceStatus::Unlocked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_locked() {
        let lock = DoorLock::new(DeviceId::from("front_door"));
        assert!(lock.is_locked());
    }

    #[test]
    fn should_report_unlocked_after_unlock() {
        let mut lock = DoorLock::new(DeviceId::from("front_door"));
        lock.unlock();
        assert_eq!(lock.status(), DeviceStatus::Unlocked);
    }
}
