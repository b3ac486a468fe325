//! Smart home registry: the orchestrator every front end talks to.
//!
//! [`SmartHome`] owns the device map, the observer bus, the trigger engine
//! and the scheduler. It is constructed explicitly and shared as an
//! `Arc<SmartHome>`; background jobs only hold a weak reference, so dropping
//! the last handle ends them.
//!
//! Lock order: the device map is never held while observers run or while
//! the trigger engine is called.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::NaiveTime;
use smarthome_domain::device::{self, DeviceKind, DeviceStatus, Thermostat};
use smarthome_domain::error::HomeError;
use smarthome_domain::id::{DeviceId, TriggerId};
use smarthome_domain::time;
use smarthome_domain::trigger::{Action, Trigger};
use smarthome_domain::update::{DeviceChange, DeviceUpdate};

use crate::observer_bus::ObserverBus;
use crate::ports::{DeviceControl, DeviceObserver};
use crate::proxy::DeviceProxy;
use crate::scheduler::Scheduler;
use crate::trigger_engine::TriggerEngine;

/// Runtime settings of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeConfig {
    /// Cadence of the background trigger sweep.
    pub sweep_interval: Duration,
    /// How long [`SmartHome::stop`] waits for in-flight jobs.
    pub stop_grace: Duration,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5),
            stop_grace: Duration::from_millis(800),
        }
    }
}

/// The device registry and everything attached to it.
pub struct SmartHome {
    config: HomeConfig,
    devices: Mutex<BTreeMap<DeviceId, DeviceProxy>>,
    observers: ObserverBus,
    triggers: TriggerEngine,
    scheduler: Scheduler,
    started: AtomicBool,
    this: Weak<Self>,
}

impl SmartHome {
    #[must_use]
    pub fn new(config: HomeConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            config,
            devices: Mutex::new(BTreeMap::new()),
            observers: ObserverBus::new(),
            triggers: TriggerEngine::new(),
            scheduler: Scheduler::new(config.stop_grace),
            started: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &HomeConfig {
        &self.config
    }

    /// Start the periodic trigger sweep. The first sweep runs immediately.
    ///
    /// Calling it again is a no-op. Must be called from within a tokio
    /// runtime.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let home = self.this.clone();
        self.scheduler.every(
            "trigger_sweep",
            Duration::ZERO,
            self.config.sweep_interval,
            move || match home.upgrade() {
                Some(home) => {
                    home.check_triggers();
                    ControlFlow::Continue(())
                }
                None => ControlFlow::Break(()),
            },
        );
        tracing::info!(
            interval_secs = self.config.sweep_interval.as_secs(),
            "trigger sweep started"
        );
    }

    /// Halt the sweep and every schedule. Device operations keep working.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.scheduler.is_stopped()
    }

    pub fn subscribe(&self, observer: Arc<dyn DeviceObserver>) {
        self.observers.subscribe(observer);
    }

    /// Register a new device built from its type tag.
    ///
    /// # Errors
    ///
    /// [`HomeError::DuplicateDevice`] if `id` is taken,
    /// [`HomeError::UnknownDeviceType`] if `type_tag` names no variant. The
    /// registry is unchanged on failure.
    #[tracing::instrument(skip(self))]
    pub fn add_device(&self, type_tag: &str, id: &str) -> Result<(), HomeError> {
        let update = {
            let mut devices = self.lock_devices();
            if devices.contains_key(id) {
                return Err(HomeError::DuplicateDevice(DeviceId::from(id)));
            }
            let proxy = DeviceProxy::new(device::create(type_tag, id)?);
            let update = proxy.update(DeviceChange::Added);
            devices.insert(proxy.id().clone(), proxy);
            update
        };
        tracing::info!(device_type = %update.kind, "device added");
        self.observers.notify(&update);
        Ok(())
    }

    /// Unregister a device and drop every trigger that mentions it.
    ///
    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`] if `id` is not registered.
    #[tracing::instrument(skip(self))]
    pub fn remove_device(&self, id: &str) -> Result<(), HomeError> {
        let proxy = self
            .lock_devices()
            .remove(id)
            .ok_or_else(|| HomeError::UnknownDevice(DeviceId::from(id)))?;
        tracing::info!(device_type = %proxy.kind(), "device removed");
        self.observers.notify(&proxy.update(DeviceChange::Removed));
        self.triggers.remove_referencing(proxy.id());
        Ok(())
    }

    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`] if `id` is not registered.
    #[tracing::instrument(skip(self))]
    pub fn turn_on(&self, id: &str) -> Result<(), HomeError> {
        self.switch(id, true)
    }

    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`] if `id` is not registered.
    #[tracing::instrument(skip(self))]
    pub fn turn_off(&self, id: &str) -> Result<(), HomeError> {
        self.switch(id, false)
    }

    /// Change a thermostat's target temperature, then sweep and reset the
    /// triggers so a crossing threshold fires within this call.
    ///
    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`], [`HomeError::NotAThermostat`] or
    /// [`HomeError::OutOfRange`]; nothing changes on failure.
    #[tracing::instrument(skip(self))]
    pub fn set_temperature(&self, id: &str, value: i32) -> Result<(), HomeError> {
        self.write_temperature(id, value)?;
        self.triggers.check(self);
        self.triggers.reset(self);
        Ok(())
    }

    /// Turn a device on (or off) every day at `at`, local time.
    ///
    /// Returns the delay until the first run. Schedules are additive.
    ///
    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`] if `id` is not registered and
    /// [`HomeError::SchedulerStopped`] once the registry has been stopped.
    #[tracing::instrument(skip(self))]
    pub fn set_schedule(&self, id: &str, at: NaiveTime, turn_on: bool) -> Result<Duration, HomeError> {
        if !self.lock_devices().contains_key(id) {
            return Err(HomeError::UnknownDevice(DeviceId::from(id)));
        }
        let delay = time::delay_until(at, chrono::Local::now().time());

        let home = self.this.clone();
        let device_id = DeviceId::from(id);
        let scheduled = self.scheduler.every("device_schedule", delay, time::DAY, move || {
            let Some(home) = home.upgrade() else {
                return ControlFlow::Break(());
            };
            let result = if turn_on {
                home.turn_on(device_id.as_str())
            } else {
                home.turn_off(device_id.as_str())
            };
            if let Err(err) = result {
                tracing::warn!(%err, %device_id, "scheduled device action failed");
            }
            ControlFlow::Continue(())
        });
        if !scheduled {
            return Err(HomeError::SchedulerStopped);
        }
        tracing::info!(delay_secs = delay.as_secs(), "device action scheduled");
        Ok(delay)
    }

    /// # Errors
    ///
    /// [`HomeError::InvalidCondition`] or [`HomeError::InvalidAction`].
    #[tracing::instrument(skip(self))]
    pub fn add_trigger(&self, condition: &str, action: &str) -> Result<Trigger, HomeError> {
        self.triggers.add(self, condition, action)
    }

    /// # Errors
    ///
    /// [`HomeError::TriggerNotFound`] when no trigger matches exactly.
    #[tracing::instrument(skip(self))]
    pub fn remove_trigger(&self, condition: &str, action: &str) -> Result<Trigger, HomeError> {
        self.triggers.remove(condition, action)
    }

    #[must_use]
    pub fn list_triggers(&self) -> Vec<Trigger> {
        self.triggers.list()
    }

    /// Run one trigger sweep now. Returns the ids of the triggers that fired.
    pub fn check_triggers(&self) -> Vec<TriggerId> {
        self.triggers.check(self)
    }

    /// Re-arm fired triggers whose condition cleared.
    pub fn reset_triggers(&self) -> usize {
        self.triggers.reset(self)
    }

    /// One `<type> <id> is <status>` line per device, ordered by id.
    #[must_use]
    pub fn status(&self) -> String {
        self.lock_devices()
            .values()
            .map(|proxy| format!("{} {} is {}", proxy.kind(), proxy.id(), proxy.status()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// # Errors
    ///
    /// [`HomeError::UnknownDevice`] if `id` is not registered.
    pub fn device_status(&self, id: &str) -> Result<DeviceStatus, HomeError> {
        self.lock_devices()
            .get(id)
            .map(DeviceProxy::status)
            .ok_or_else(|| HomeError::UnknownDevice(DeviceId::from(id)))
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.lock_devices().len()
    }

    fn switch(&self, id: &str, on: bool) -> Result<(), HomeError> {
        let update = self.mutate(id, |proxy| {
            if on {
                proxy.turn_on();
            } else {
                proxy.turn_off();
            }
            Ok(())
        })?;
        self.observers.notify(&update);
        self.triggers.reset(self);
        Ok(())
    }

    fn write_temperature(&self, id: &str, value: i32) -> Result<(), HomeError> {
        let update = self.mutate(id, |proxy| proxy.set_temperature(value))?;
        self.observers.notify(&update);
        Ok(())
    }

    /// Apply `op` to one device under the map lock and snapshot the result.
    fn mutate<F>(&self, id: &str, op: F) -> Result<DeviceUpdate, HomeError>
    where
        F: FnOnce(&mut DeviceProxy) -> Result<(), HomeError>,
    {
        let mut devices = self.lock_devices();
        let proxy = devices
            .get_mut(id)
            .ok_or_else(|| HomeError::UnknownDevice(DeviceId::from(id)))?;
        op(proxy)?;
        Ok(proxy.update(DeviceChange::Updated))
    }

    fn lock_devices(&self) -> MutexGuard<'_, BTreeMap<DeviceId, DeviceProxy>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceControl for SmartHome {
    fn kind(&self, device_id: &DeviceId) -> Option<DeviceKind> {
        self.lock_devices().get(device_id).map(DeviceProxy::kind)
    }

    fn read_value(&self, device_id: &DeviceId) -> Result<i32, HomeError> {
        let devices = self.lock_devices();
        let proxy = devices
            .get(device_id)
            .ok_or_else(|| HomeError::UnknownDevice(device_id.clone()))?;
        proxy
            .device()
            .as_thermostat()
            .map(Thermostat::temperature)
            .ok_or(HomeError::UnsupportedDeviceType(proxy.kind()))
    }

    fn execute(&self, action: &Action) -> Result<(), HomeError> {
        match action {
            Action::TurnOn(device_id) => self.turn_on(device_id.as_str()),
            Action::TurnOff(device_id) => self.turn_off(device_id.as_str()),
            // No nested sweep: the next one picks up the new temperature.
            Action::SetTemperature { device_id, value } => {
                self.write_temperature(device_id.as_str(), *value)?;
                self.triggers.reset(self);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for SmartHome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartHome")
            .field("config", &self.config)
            .field("devices", &self.device_count())
            .field("observers", &self.observers)
            .field("triggers", &self.triggers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthome_domain::error::GrammarError;
    use std::sync::atomic::AtomicUsize;

    fn home_with(devices: &[(&str, &str)]) -> Arc<SmartHome> {
        let home = SmartHome::new(HomeConfig::default());
        for (type_tag, id) in devices {
            home.add_device(type_tag, id).unwrap();
        }
        home
    }

    fn recording_observer(home: &SmartHome) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        home.subscribe(Arc::new(move |update: &DeviceUpdate| {
            sink.lock().unwrap().push(update.to_string());
        }));
        seen
    }

    fn counting_observer(home: &SmartHome, id: &'static str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        home.subscribe(Arc::new(move |update: &DeviceUpdate| {
            if update.device_id.as_str() == id {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));
        count
    }

    // ── Devices ────────────────────────────────────────────────────

    #[test]
    fn should_list_status_in_id_order() {
        let home = home_with(&[("thermostat", "T1"), ("light", "L1"), ("doorlock", "D1")]);
        assert_eq!(
            home.status(),
            "doorlock D1 is locked\nlight L1 is off\nthermostat T1 is set to 70°F"
        );
    }

    #[test]
    fn should_return_empty_status_when_no_devices() {
        let home = home_with(&[]);
        assert_eq!(home.status(), "");
    }

    #[test]
    fn should_notify_observers_when_device_added() {
        let home = home_with(&[]);
        let seen = recording_observer(&home);
        home.add_device("light", "L1").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["light L1 is off".to_string()]);
    }

    #[test]
    fn should_leave_existing_device_untouched_when_duplicate_added() {
        let home = home_with(&[("light", "L1")]);
        home.turn_on("L1").unwrap();

        let result = home.add_device("thermostat", "L1");
        assert_eq!(result, Err(HomeError::DuplicateDevice(DeviceId::from("L1"))));
        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::On));
        assert_eq!(home.device_count(), 1);
    }

    #[test]
    fn should_reject_unknown_device_type() {
        let home = home_with(&[]);
        let result = home.add_device("toaster", "X1");
        assert_eq!(result, Err(HomeError::UnknownDeviceType("toaster".to_string())));
        assert_eq!(home.device_count(), 0);
    }

    #[test]
    fn should_fail_with_unknown_device_for_missing_ids() {
        let home = home_with(&[]);
        let missing = Err(HomeError::UnknownDevice(DeviceId::from("L1")));
        assert_eq!(home.turn_on("L1"), missing);
        assert_eq!(home.turn_off("L1"), missing);
        assert_eq!(home.remove_device("L1"), missing);
        assert_eq!(home.set_temperature("L1", 60), missing);
    }

    #[test]
    fn should_switch_light_and_notify() {
        let home = home_with(&[("light", "L1")]);
        let seen = recording_observer(&home);

        home.turn_on("L1").unwrap();
        home.turn_off("L1").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["light L1 is on".to_string(), "light L1 is off".to_string()]
        );
    }

    #[test]
    fn should_notify_removal() {
        let home = home_with(&[("doorlock", "D1")]);
        let seen = recording_observer(&home);
        home.remove_device("D1").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["doorlock D1 is locked".to_string()]);
        assert_eq!(home.device_count(), 0);
    }

    #[test]
    fn should_reject_temperature_on_light() {
        let home = home_with(&[("light", "L1")]);
        let result = home.set_temperature("L1", 60);
        assert_eq!(result, Err(HomeError::NotAThermostat(DeviceId::from("L1"))));
    }

    #[test]
    fn should_keep_temperature_when_out_of_range() {
        let home = home_with(&[("thermostat", "T1")]);
        let seen = recording_observer(&home);

        let result = home.set_temperature("T1", 91);
        assert!(matches!(result, Err(HomeError::OutOfRange { value: 91, .. })));
        assert_eq!(home.device_status("T1"), Ok(DeviceStatus::Temperature(70)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn should_accept_repeated_identical_temperature() {
        let home = home_with(&[("thermostat", "T1")]);
        home.set_temperature("T1", 65).unwrap();
        home.set_temperature("T1", 65).unwrap();
        assert_eq!(home.device_status("T1"), Ok(DeviceStatus::Temperature(65)));
    }

    // ── Triggers ───────────────────────────────────────────────────

    #[test]
    fn should_turn_light_on_when_thermostat_crosses_threshold() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();

        home.set_temperature("T1", 80).unwrap();

        assert!(home.status().contains("light L1 is on"));
    }

    #[test]
    fn should_fire_action_once_per_rising_edge() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();
        let light_updates = counting_observer(&home, "L1");

        home.set_temperature("T1", 80).unwrap();
        assert_eq!(light_updates.load(Ordering::SeqCst), 1);

        assert!(home.check_triggers().is_empty());
        home.set_temperature("T1", 85).unwrap();
        assert_eq!(light_updates.load(Ordering::SeqCst), 1);

        home.set_temperature("T1", 70).unwrap();
        home.set_temperature("T1", 80).unwrap();
        assert_eq!(light_updates.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn should_run_set_temperature_action() {
        let home = home_with(&[("thermostat", "T1"), ("thermostat", "T2")]);
        home.add_trigger("T1 < 50", "setTemperature(T2,60)").unwrap();

        home.set_temperature("T1", 45).unwrap();

        assert_eq!(home.device_status("T2"), Ok(DeviceStatus::Temperature(60)));
    }

    #[test]
    fn should_reject_set_temperature_action_on_light() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);

        let result = home.add_trigger("T1 > 75", "setTemperature(L1,60)");

        assert_eq!(
            result,
            Err(HomeError::InvalidAction {
                input: "setTemperature(L1,60)".to_string(),
                reason: GrammarError::NotAThermostat(DeviceId::from("L1")),
            })
        );
        assert!(home.list_triggers().is_empty());
    }

    #[test]
    fn should_fire_once_per_edge_under_concurrent_sweeps_and_churn() {
        const EDGES: usize = 200;

        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();
        let light_updates = counting_observer(&home, "L1");
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            for _ in 0..3 {
                scope.spawn(|| {
                    while !done.load(Ordering::SeqCst) {
                        home.check_triggers();
                    }
                });
            }
            scope.spawn(|| {
                let mut round = 0;
                while !done.load(Ordering::SeqCst) {
                    let id = format!("X{round}");
                    home.add_device("doorlock", &id).unwrap();
                    if round < 50 {
                        home.subscribe(Arc::new(|_: &DeviceUpdate| {}));
                    }
                    home.remove_device(&id).unwrap();
                    round += 1;
                }
            });
            scope.spawn(|| {
                for _ in 0..EDGES {
                    home.set_temperature("T1", 80).unwrap();
                    home.set_temperature("T1", 70).unwrap();
                }
                done.store(true, Ordering::SeqCst);
            });
        });

        assert_eq!(light_updates.load(Ordering::SeqCst), EDGES);
        assert_eq!(home.list_triggers().len(), 1);
    }

    #[test]
    fn should_cascade_trigger_removal_with_device() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();

        home.remove_device("L1").unwrap();

        assert!(home.list_triggers().is_empty());
    }

    #[test]
    fn should_reject_bad_syntax_without_changing_trigger_count() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();

        let result = home.add_trigger("bad syntax", "turnOn(L1)");

        assert!(matches!(result, Err(HomeError::InvalidCondition { .. })));
        assert_eq!(home.list_triggers().len(), 1);
    }

    #[test]
    fn should_drop_trigger_on_non_thermostat_condition() {
        let home = home_with(&[("light", "L1"), ("light", "L2")]);
        home.add_trigger("L1 == 1", "turnOn(L2)").unwrap();

        assert!(home.check_triggers().is_empty());
        assert!(home.list_triggers().is_empty());
        assert_eq!(home.device_status("L2"), Ok(DeviceStatus::Off));
    }

    #[test]
    fn should_remove_trigger_by_exact_rule() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();

        assert!(matches!(
            home.remove_trigger("T1 < 75", "turnOn(L1)"),
            Err(HomeError::TriggerNotFound { .. })
        ));
        home.remove_trigger("T1 > 75", "turnOn(L1)").unwrap();
        assert!(home.list_triggers().is_empty());
    }

    // ── Background jobs ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn should_fire_trigger_from_background_sweep() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.set_temperature("T1", 80).unwrap();
        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();
        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::Off));

        home.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::On));
        home.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_schedule_without_explicit_turn_on() {
        let home = home_with(&[("light", "L1")]);
        let at = (chrono::Local::now() + chrono::Duration::seconds(1)).time();

        let delay = home.set_schedule("L1", at, true).unwrap();
        assert!(delay <= Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::On));
        home.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_schedule_for_unknown_device() {
        let home = home_with(&[]);
        let result = home.set_schedule("L1", NaiveTime::MIN, true);
        assert_eq!(result, Err(HomeError::UnknownDevice(DeviceId::from("L1"))));
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_sweep_after_stop() {
        let home = home_with(&[("light", "L1"), ("thermostat", "T1")]);
        home.start();
        home.stop().await;
        assert!(home.is_stopped());

        home.add_trigger("T1 > 75", "turnOn(L1)").unwrap();
        home.write_temperature("T1", 80).unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::Off));
    }

    #[tokio::test(start_paused = true)]
    async fn should_refuse_schedule_after_stop() {
        let home = home_with(&[("light", "L1")]);
        home.stop().await;

        let result = home.set_schedule("L1", NaiveTime::MIN, true);
        assert_eq!(result, Err(HomeError::SchedulerStopped));
        assert_eq!(
            home.set_schedule("L9", NaiveTime::MIN, true),
            Err(HomeError::UnknownDevice(DeviceId::from("L9")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_device_operations_working_after_stop() {
        let home = home_with(&[("light", "L1")]);
        home.stop().await;
        home.turn_on("L1").unwrap();
        assert_eq!(home.device_status("L1"), Ok(DeviceStatus::On));
    }
}
