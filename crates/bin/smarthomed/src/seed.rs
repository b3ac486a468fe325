//! Startup seeding: registers the devices, schedules and triggers listed
//! in the configuration.

use anyhow::Context;
use smarthome_app::SmartHome;

use crate::config::Config;

/// Apply every seed entry in file order: devices, then schedules, then
/// triggers. Stops at the first failure.
///
/// # Errors
///
/// Returns the failing registry operation, with the entry that caused it as
/// context.
pub fn apply(home: &SmartHome, config: &Config) -> anyhow::Result<()> {
    for device in &config.devices {
        home.add_device(&device.type_tag, &device.id)
            .with_context(|| format!("failed to add device {}", device.id))?;
        if device.on {
            home.turn_on(&device.id)
                .with_context(|| format!("failed to turn on device {}", device.id))?;
        }
    }

    for schedule in &config.schedules {
        let at = schedule.time()?;
        home.set_schedule(&schedule.device, at, schedule.turn_on)
            .with_context(|| format!("failed to schedule device {}", schedule.device))?;
    }

    for trigger in &config.triggers {
        home.add_trigger(&trigger.condition, &trigger.action)
            .with_context(|| {
                format!(
                    "failed to add trigger {} -> {}",
                    trigger.condition, trigger.action
                )
            })?;
    }

    tracing::info!(
        devices = config.devices.len(),
        schedules = config.schedules.len(),
        triggers = config.triggers.len(),
        "registry seeded"
    );
    Ok(())
}
