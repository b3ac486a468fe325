//! Observer that echoes every device update to a writer.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use smarthome_app::ports::{DeviceObserver, ObserverError};
use smarthome_domain::update::DeviceUpdate;

/// Writes `Device updated: <type> <id> is <status>` for each update.
#[derive(Debug)]
pub struct PrintingObserver<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> PrintingObserver<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl PrintingObserver<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> DeviceObserver for PrintingObserver<W> {
    fn on_update(&self, update: &DeviceUpdate) -> Result<(), ObserverError> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "Device updated: {update}")?;
        out.flush()?;
        Ok(())
    }
}
