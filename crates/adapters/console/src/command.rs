//! Console command grammar.
//!
//! One command per line, tokens separated by whitespace. Trigger commands
//! take the condition as three tokens followed by the action, for example
//! `addTrigger T1 > 75 turnOn(L1)`.

use std::str::FromStr;

use chrono::NaiveTime;
use smarthome_domain::time;

use crate::error::CommandError;

/// Printed for unrecognized input.
pub const HELP: &str = "Unknown command. Available commands: add, remove, turnOn, turnOff, \
setTemperature, schedule, status, addTrigger, removeTrigger, listTriggers, exit";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { type_tag: String, id: String },
    Remove { id: String },
    TurnOn { id: String },
    TurnOff { id: String },
    SetTemperature { id: String, value: i32 },
    Schedule { id: String, at: NaiveTime, turn_on: bool },
    Status,
    AddTrigger { condition: String, action: String },
    RemoveTrigger { condition: String, action: String },
    ListTriggers,
    Exit,
    /// Anything else; the session answers with [`HELP`].
    Unknown(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Ok(Self::Unknown(String::new()));
        };

        let command = match name {
            "add" => match args {
                [type_tag, id] => Self::Add {
                    type_tag: (*type_tag).to_string(),
                    id: (*id).to_string(),
                },
                _ => return Err(CommandError::Usage("add <type> <id>")),
            },
            "remove" => Self::Remove {
                id: single_id(args, "remove <id>")?,
            },
            "turnOn" => Self::TurnOn {
                id: single_id(args, "turnOn <id>")?,
            },
            "turnOff" => Self::TurnOff {
                id: single_id(args, "turnOff <id>")?,
            },
            "setTemperature" => match args {
                [id, value] => Self::SetTemperature {
                    id: (*id).to_string(),
                    value: value
                        .parse()
                        .map_err(|_| CommandError::InvalidNumber((*value).to_string()))?,
                },
                _ => return Err(CommandError::Usage("setTemperature <id> <temperature>")),
            },
            "schedule" => match args {
                [id, at, flag] => Self::Schedule {
                    id: (*id).to_string(),
                    at: time::parse_time_of_day(at)
                        .map_err(|_| CommandError::InvalidTime((*at).to_string()))?,
                    turn_on: parse_flag(flag)?,
                },
                _ => return Err(CommandError::Usage("schedule <id> <time> <true/false>")),
            },
            "addTrigger" => {
                let (condition, action) =
                    trigger_rule(args, "addTrigger <id> <op> <value> <action>")?;
                Self::AddTrigger { condition, action }
            }
            "removeTrigger" => {
                let (condition, action) =
                    trigger_rule(args, "removeTrigger <id> <op> <value> <action>")?;
                Self::RemoveTrigger { condition, action }
            }
            "status" => Self::Status,
            "listTriggers" => Self::ListTriggers,
            "exit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        };
        Ok(command)
    }
}

fn single_id(args: &[&str], usage: &'static str) -> Result<String, CommandError> {
    match args {
        [id] => Ok((*id).to_string()),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_flag(flag: &str) -> Result<bool, CommandError> {
    if flag.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if flag.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CommandError::InvalidFlag(flag.to_string()))
    }
}

/// Split `<id> <op> <value> <action>` into its condition and action strings.
/// The action is a single token such as `setTemperature(T2,60)`.
fn trigger_rule(args: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match args {
        [device, operator, value, action] => {
            Ok((format!("{device} {operator} {value}"), (*action).to_string()))
        }
        _ => Err(CommandError::Usage(usage)),
    }
}
