//! Condition: `<deviceId> <operator> <integer>`.

use std::fmt;
use std::str::FromStr;

use crate::error::GrammarError;
use crate::id::DeviceId;

/// Integer comparison used by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equal,
}

impl Operator {
    #[must_use]
    pub fn compare(self, value: i32, threshold: i32) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::Equal => value == threshold,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equal => "==",
        })
    }
}

impl FromStr for Operator {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            "==" => Ok(Self::Equal),
            other => Err(GrammarError::UnknownOperator(other.to_string())),
        }
    }
}

/// Comparison between a device's live value and a fixed threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub device_id: DeviceId,
    pub operator: Operator,
    pub threshold: i32,
}

impl Condition {
    /// Whether the condition holds for the device's current `value`.
    #[must_use]
    pub fn holds(&self, value: i32) -> bool {
        self.operator.compare(value, self.threshold)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.device_id, self.operator, self.threshold)
    }
}

impl FromStr for Condition {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(' ').collect();
        let [device, operator, threshold] = parts.as_slice() else {
            return Err(GrammarError::WrongArity(parts.len()));
        };
        if parts.iter().any(|part| part.is_empty()) {
            return Err(GrammarError::WrongArity(parts.len()));
        }
        Ok(Self {
            device_id: DeviceId::from(*device),
            operator: operator.parse()?,
            threshold: parse_integer(threshold)?,
        })
    }
}

/// Parse an optionally negative run of decimal digits (no `+`, no spaces).
pub(crate) fn parse_integer(input: &str) -> Result<i32, GrammarError> {
    let digits = input.strip_prefix('-').unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrammarError::InvalidNumber(input.to_string()));
    }
    input
        .parse()
        .map_err(|_| GrammarError::InvalidNumber(input.to_string()))
}
