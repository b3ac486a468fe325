//! Action: `<command>(<deviceId>)`, executed when a trigger fires.

use std::fmt;
use std::str::FromStr;

use crate::device::Thermostat;
use crate::error::GrammarError;
use crate::id::DeviceId;
use crate::trigger::condition::parse_integer;

/// Registry operation run by a firing trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TurnOn(DeviceId),
    TurnOff(DeviceId),
    /// `setTemperature(<deviceId>,<value>)`.
    SetTemperature { device_id: DeviceId, value: i32 },
}

impl Action {
    /// The device this action operates on.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::TurnOn(id) | Self::TurnOff(id) => id,
            Self::SetTemperature { device_id, .. } => device_id,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn(id) => write!(f, "turnOn({id})"),
            Self::TurnOff(id) => write!(f, "turnOff({id})"),
            Self::SetTemperature { device_id, value } => {
                write!(f, "setTemperature({device_id},{value})")
            }
        }
    }
}

impl FromStr for Action {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (command, args) = s
            .strip_suffix(')')
            .and_then(|inner| inner.split_once('('))
            .ok_or(GrammarError::MissingParentheses)?;
        if args.contains(['(', ')']) {
            return Err(GrammarError::MissingParentheses);
        }

        let mut args = args.split(',');
        let mut device = || {
            args.next()
                .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
                .map(DeviceId::from)
                .ok_or(GrammarError::MissingDevice)
        };

        let action = match command {
            "turnOn" => Self::TurnOn(device()?),
            "turnOff" => Self::TurnOff(device()?),
            "setTemperature" => {
                let device_id = device()?;
                let raw = args
                    .next()
                    .ok_or_else(|| GrammarError::UnexpectedArguments(command.to_string()))?;
                let value = parse_integer(raw)?;
                Thermostat::check_range(value)
                    .map_err(|_| GrammarError::TemperatureOutOfRange(value))?;
                Self::SetTemperature { device_id, value }
            }
            other => return Err(GrammarError::UnknownCommand(other.to_string())),
        };

        if args.next().is_some() {
            return Err(GrammarError::UnexpectedArguments(command.to_string()));
        }
        Ok(action)
    }
}
