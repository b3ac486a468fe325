//! Interactive session: read a line, dispatch it, print the reply.
//!
//! [`execute`] is the recovery boundary: every failure comes back as a
//! [`CommandError`] which [`run`] prints as `Error: <message>` before
//! reading the next line. Only `exit` (or end of input) ends the session.

use std::time::Duration;

use smarthome_app::SmartHome;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::command::{Command, HELP};
use crate::error::CommandError;

const RULE: &str = ".........................................................................";
const PROMPT: &str = "Enter command: ";

/// What the session should print or do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to print; observers report the change.
    Done,
    Text(String),
    /// Stop the registry and end the session.
    Exit,
}

/// Dispatch one command to the registry.
///
/// # Errors
///
/// Returns the registry's error wrapped in [`CommandError::Home`].
pub fn execute(home: &SmartHome, command: Command) -> Result<Reply, CommandError> {
    let reply = match command {
        Command::Add { type_tag, id } => {
            home.add_device(&type_tag, &id)?;
            Reply::Done
        }
        Command::Remove { id } => {
            home.remove_device(&id)?;
            Reply::Text(format!("Device removed: {id}"))
        }
        Command::TurnOn { id } => {
            home.turn_on(&id)?;
            Reply::Done
        }
        Command::TurnOff { id } => {
            home.turn_off(&id)?;
            Reply::Done
        }
        Command::SetTemperature { id, value } => {
            home.set_temperature(&id, value)?;
            Reply::Done
        }
        Command::Schedule { id, at, turn_on } => {
            let delay = home.set_schedule(&id, at, turn_on)?;
            let state = if turn_on { "on" } else { "off" };
            Reply::Text(format!(
                "Scheduled {id} to turn {state} daily at {at}, first run in {}",
                format_delay(delay)
            ))
        }
        Command::Status => {
            let status = home.status();
            if status.is_empty() {
                Reply::Text("No devices registered.".to_string())
            } else {
                Reply::Text(status)
            }
        }
        Command::AddTrigger { condition, action } => {
            let trigger = home.add_trigger(&condition, &action)?;
            Reply::Text(format!("Trigger added: {trigger}"))
        }
        Command::RemoveTrigger { condition, action } => {
            let trigger = home.remove_trigger(&condition, &action)?;
            Reply::Text(format!("Trigger removed: {trigger}"))
        }
        Command::ListTriggers => {
            let mut text = String::from("Current triggers:");
            for trigger in home.list_triggers() {
                text.push('\n');
                text.push_str(&trigger.to_string());
            }
            Reply::Text(text)
        }
        Command::Exit => Reply::Exit,
        Command::Unknown(_) => Reply::Text(HELP.to_string()),
    };
    Ok(reply)
}

/// Run the session until `exit` or end of input, then stop the registry.
///
/// # Errors
///
/// Only I/O failures on `input` or `output` end the session with an error.
pub async fn run<R, W>(home: &SmartHome, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(
            format!("{RULE}\n.................Welcome To Smart Home Control Hub.......................\n{RULE}\n")
                .as_bytes(),
        )
        .await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::debug!("end of input");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<Command>().and_then(|command| execute(home, command)) {
            Ok(Reply::Done) => {}
            Ok(Reply::Text(text)) => {
                output.write_all(format!("{text}\n").as_bytes()).await?;
            }
            Ok(Reply::Exit) => break,
            Err(err) => {
                tracing::warn!(%err, command = line, "error processing command");
                output.write_all(format!("Error: {err}\n").as_bytes()).await?;
            }
        }
    }

    home.stop().await;
    output
        .write_all(
            format!("{RULE}\n.................Thank You! Exiting......................................\n{RULE}\n")
                .as_bytes(),
        )
        .await?;
    output.flush().await
}

fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthome_app::HomeConfig;
    use smarthome_domain::error::HomeError;
    use smarthome_domain::id::DeviceId;
    use std::sync::Arc;

    fn home() -> Arc<SmartHome> {
        SmartHome::new(HomeConfig::default())
    }

    fn exec(home: &SmartHome, line: &str) -> Result<Reply, CommandError> {
        execute(home, line.parse()?)
    }

    async fn session(home: &SmartHome, script: &str) -> String {
        let mut output = Vec::new();
        run(home, script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn should_format_delay_as_clock() {
        assert_eq!(format_delay(Duration::from_secs(3 * 3600 + 62)), "03:01:02");
        assert_eq!(format_delay(Duration::ZERO), "00:00:00");
    }

    #[test]
    fn should_list_triggers_under_header() {
        let home = home();
        exec(&home, "add light L1").unwrap();
        exec(&home, "add thermostat T1").unwrap();
        exec(&home, "addTrigger T1 > 75 turnOn(L1)").unwrap();

        assert_eq!(
            exec(&home, "listTriggers"),
            Ok(Reply::Text("Current triggers:\nT1 > 75 -> turnOn(L1)".to_string()))
        );
    }

    #[test]
    fn should_wrap_registry_errors() {
        let home = home();
        assert_eq!(
            exec(&home, "turnOn L1"),
            Err(CommandError::Home(HomeError::UnknownDevice(DeviceId::from("L1"))))
        );
    }

    #[test]
    fn should_answer_unknown_command_with_help() {
        let home = home();
        assert_eq!(exec(&home, "dance"), Ok(Reply::Text(HELP.to_string())));
    }

    #[test]
    fn should_request_exit() {
        let home = home();
        assert_eq!(exec(&home, "exit"), Ok(Reply::Exit));
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_running_after_error() {
        let home = home();
        let out = session(&home, "turnOn L1\nadd light L1\nturnOn L1\nstatus\nexit\n").await;

        assert!(out.contains("Error: device with id L1 does not exist\n"));
        assert!(out.contains("light L1 is on\n"));
        assert!(out.contains("Thank You! Exiting"));
        assert!(home.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn should_print_usage_error() {
        let home = home();
        let out = session(&home, "add light\nexit\n").await;
        assert!(out.contains("Error: Usage: add <type> <id>\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_blank_lines_and_stop_at_end_of_input() {
        let home = home();
        let out = session(&home, "\n   \nstatus\n").await;

        assert!(out.contains("No devices registered.\n"));
        assert!(!out.contains("Error"));
        assert!(home.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_commands_after_exit() {
        let home = home();
        session(&home, "exit\nadd light L1\n").await;
        assert_eq!(home.device_count(), 0);
    }
}
