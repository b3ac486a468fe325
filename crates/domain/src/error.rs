//! Common error types used across the workspace.
//!
//! Every failure in the hub is a local, synchronous validation failure.
//! Each layer defines its own typed errors and converts into [`HomeError`]
//! via `#[from]` (the console adapter wraps it again for usage errors).

use crate::device::DeviceKind;
use crate::id::DeviceId;

/// Top-level error for every registry operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HomeError {
    /// The factory does not know the requested type tag.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    /// A device with the same id is already registered.
    #[error("device with id {0} already exists")]
    DuplicateDevice(DeviceId),

    /// No device with this id is registered.
    #[error("device with id {0} does not exist")]
    UnknownDevice(DeviceId),

    /// A thermostat-only operation was aimed at another kind of device.
    #[error("device {0} is not a thermostat")]
    NotAThermostat(DeviceId),

    /// A temperature outside the thermostat's supported range.
    #[error("temperature {value}°F is out of range, must be between {min}°F and {max}°F")]
    OutOfRange { value: i32, min: i32, max: i32 },

    /// The condition string does not follow `<deviceId> <op> <value>`.
    #[error("invalid condition format: {input}")]
    InvalidCondition {
        input: String,
        #[source]
        reason: GrammarError,
    },

    /// The action string does not follow `<command>(<deviceId>)`.
    #[error("invalid action format: {input}")]
    InvalidAction {
        input: String,
        #[source]
        reason: GrammarError,
    },

    /// No trigger matches the given condition and action.
    #[error("trigger not found: {condition} -> {action}")]
    TriggerNotFound { condition: String, action: String },

    /// Conditions can only be evaluated against thermostats.
    #[error("unsupported device type for condition: {0}")]
    UnsupportedDeviceType(DeviceKind),

    /// The background scheduler has been stopped; no new jobs are accepted.
    #[error("scheduler is stopped")]
    SchedulerStopped,
}

impl HomeError {
    /// Whether a trigger that hit this error can never succeed again.
    ///
    /// Such triggers are dropped from the engine instead of being retried on
    /// the next sweep.
    #[must_use]
    pub fn invalidates_trigger(&self) -> bool {
        matches!(
            self,
            Self::UnknownDevice(_) | Self::UnsupportedDeviceType(_) | Self::NotAThermostat(_)
        )
    }
}

/// Why a condition or action string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("expected 3 parts separated by single spaces, found {0}")]
    WrongArity(usize),

    #[error("unknown operator '{0}', expected one of >, <, ==")]
    UnknownOperator(String),

    #[error("'{0}' is not an integer")]
    InvalidNumber(String),

    #[error("expected <command>(<deviceId>)")]
    MissingParentheses,

    #[error("unknown command '{0}', expected turnOn, turnOff or setTemperature")]
    UnknownCommand(String),

    #[error("missing device id")]
    MissingDevice,

    #[error("command '{0}' takes a different number of arguments")]
    UnexpectedArguments(String),

    #[error("temperature {0}°F is outside the thermostat range")]
    TemperatureOutOfRange(i32),

    #[error("device {0} does not exist")]
    UnknownDevice(DeviceId),

    #[error("device {0} is not a thermostat")]
    NotAThermostat(DeviceId),
}
