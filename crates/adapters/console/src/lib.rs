//! # smarthome-adapter-console
//!
//! Console front end for the smart home registry.
//!
//! ## Responsibilities
//! - Parse one command per line into a typed [`Command`]
//! - Dispatch commands to [`SmartHome`](smarthome_app::SmartHome) and render replies
//! - Turn every failure into a printed `Error: <message>` without ending the session
//! - Print device updates through [`PrintingObserver`]
//!
//! ## Dependency rule
//! Depends on `smarthome-app` and `smarthome-domain`. Knows nothing about
//! configuration or process setup; the binary owns stdin/stdout.

pub mod command;
pub mod error;
pub mod observer;
pub mod session;

pub use command::Command;
pub use error::CommandError;
pub use observer::PrintingObserver;
pub use session::{Reply, execute, run};
