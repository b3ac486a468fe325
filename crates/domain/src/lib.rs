//! # smarthome-domain
//!
//! Pure domain model for the smarthome control hub.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (light, thermostat, door lock) and the factory that
//!   builds them from a type tag
//! - Define **Device updates** (the record handed to observers on every mutation)
//! - Define **Triggers** (`<device> <op> <value>` → `<command>(<device>)` rules)
//!   and their wire grammar
//! - Contain all invariant enforcement (temperature range, grammar validation)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod trigger;
pub mod update;
