//! Port definitions: traits at the boundaries of the control core.
//!
//! Both are synchronous: observers run on the caller's thread and trigger
//! evaluation must complete in bounded time inside scheduler callbacks.

pub mod device_control;
pub mod observer;

pub use device_control::DeviceControl;
pub use observer::{DeviceObserver, ObserverError};
