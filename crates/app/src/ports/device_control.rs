//! Device control port: the registry as seen by the trigger engine.

use smarthome_domain::device::DeviceKind;
use smarthome_domain::error::HomeError;
use smarthome_domain::id::DeviceId;
use smarthome_domain::trigger::Action;

/// Read device values and run trigger actions.
///
/// Implemented by [`SmartHome`](crate::SmartHome); tests use in-memory fakes.
pub trait DeviceControl {
    /// Kind of the registered device, `None` when no device has this id.
    fn kind(&self, device_id: &DeviceId) -> Option<DeviceKind>;

    /// Current integer reading compared by trigger conditions.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::UnknownDevice`] when the device is gone and
    /// [`HomeError::UnsupportedDeviceType`] when it has no readable value.
    fn read_value(&self, device_id: &DeviceId) -> Result<i32, HomeError>;

    /// Run the registry operation an action stands for.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying registry operation returns.
    fn execute(&self, action: &Action) -> Result<(), HomeError>;
}
