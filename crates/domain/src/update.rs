//! Device update: the record delivered to observers on every mutation.

use serde::{Deserialize, Serialize};

use crate::device::{DeviceKind, DeviceStatus};
use crate::id::DeviceId;
use crate::time::Timestamp;

/// What happened to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceChange {
    Added,
    Updated,
    Removed,
}

/// Snapshot of a device taken right after it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub change: DeviceChange,
    pub device_id: DeviceId,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub timestamp: Timestamp,
}

impl DeviceUpdate {
    /// Create an update stamped with the current time.
    #[must_use]
    pub fn new(
        change: DeviceChange,
        device_id: DeviceId,
        kind: DeviceKind,
        status: DeviceStatus,
    ) -> Self {
        Self {
            change,
            device_id,
            kind,
            status,
            timestamp: crate::time::now(),
        }
    }
}

/// `<type> <id> is <status>`, the same line `status` prints per device.
impl std::fmt::Display for DeviceUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} is {}", self.kind, self.device_id, self.status)
    }
}
