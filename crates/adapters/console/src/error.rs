//! Errors raised at the command dispatch boundary.

use smarthome_domain::error::HomeError;

/// Why a console command could not be carried out.
///
/// The `Display` form is what the session prints after `Error: `.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Wrong number of arguments; carries the expected form.
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("invalid time '{0}', expected HH:MM:SS or HH:MM")]
    InvalidTime(String),

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("'{0}' is not a valid flag, expected true or false")]
    InvalidFlag(String),

    #[error(transparent)]
    Home(#[from] HomeError),
}
