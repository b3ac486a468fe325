//! # smarthome-app
//!
//! Application layer: the smart home control core and its **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits**:
//!   - `DeviceObserver`: receives a `DeviceUpdate` after every device mutation
//!   - `DeviceControl`: what the trigger engine needs from the registry
//! - Wrap devices in an auditing `DeviceProxy`
//! - Fan updates out through the `ObserverBus`
//! - Evaluate edge-triggered rules in the `TriggerEngine`
//! - Run the periodic trigger sweep and daily device schedules in the `Scheduler`
//! - Orchestrate all of the above in the `SmartHome` registry
//!
//! ## Dependency rule
//! Depends on `smarthome-domain` only (plus tokio for timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod observer_bus;
pub mod ports;
pub mod proxy;
pub mod registry;
pub mod scheduler;
pub mod trigger_engine;

pub use registry::{HomeConfig, SmartHome};
