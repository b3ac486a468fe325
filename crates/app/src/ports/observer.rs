//! Observer port: subscribers notified on every device mutation.

use smarthome_domain::update::DeviceUpdate;

/// Failure reported by an observer; logged by the bus, never propagated.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Receives a snapshot of each device right after it changed.
pub trait DeviceObserver: Send + Sync {
    /// Handle one update.
    ///
    /// # Errors
    ///
    /// Any error is logged by the [`ObserverBus`](crate::observer_bus::ObserverBus)
    /// and delivery continues with the next observer.
    fn on_update(&self, update: &DeviceUpdate) -> Result<(), ObserverError>;
}

impl<F> DeviceObserver for F
where
    F: Fn(&DeviceUpdate) + Send + Sync,
{
    fn on_update(&self, update: &DeviceUpdate) -> Result<(), ObserverError> {
        self(update);
        Ok(())
    }
}
