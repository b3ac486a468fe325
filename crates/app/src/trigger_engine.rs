//! Trigger engine: evaluates condition → action rules against live device state.
//!
//! Firing is edge-triggered. A sweep ([`TriggerEngine::check`]) runs the
//! action of every *armed* trigger whose condition holds and latches it as
//! fired; a reset ([`TriggerEngine::reset`]) re-arms fired triggers whose
//! condition no longer holds. An action therefore runs once per false → true
//! transition of its condition, however often the sweep repeats.
//!
//! The trigger list lock is never held while a condition is evaluated or an
//! action executed: actions call back into the registry, which resets
//! triggers in turn.

use std::sync::{Mutex, MutexGuard, PoisonError};

use smarthome_domain::device::DeviceKind;
use smarthome_domain::error::{GrammarError, HomeError};
use smarthome_domain::id::{DeviceId, TriggerId};
use smarthome_domain::trigger::{Action, Condition, Trigger};

use crate::ports::DeviceControl;

/// Holds the rule set and runs the arm / fire / reset protocol.
#[derive(Debug, Default)]
pub struct TriggerEngine {
    triggers: Mutex<Vec<Trigger>>,
}

impl TriggerEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, validate and store a new armed trigger.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidCondition`] / [`HomeError::InvalidAction`]
    /// when a string breaks its grammar or names a device `control` does not
    /// know, and [`HomeError::InvalidAction`] when `setTemperature` targets a
    /// device that is not a thermostat. Nothing is stored on failure.
    pub fn add(
        &self,
        control: &impl DeviceControl,
        condition: &str,
        action: &str,
    ) -> Result<Trigger, HomeError> {
        let trigger = Trigger::parse(condition, action)?;
        if control.kind(&trigger.condition.device_id).is_none() {
            return Err(HomeError::InvalidCondition {
                input: condition.to_string(),
                reason: GrammarError::UnknownDevice(trigger.condition.device_id),
            });
        }
        let target = trigger.action.device_id();
        let invalid_action = |reason| HomeError::InvalidAction {
            input: action.to_string(),
            reason,
        };
        match (control.kind(target), &trigger.action) {
            (None, _) => return Err(invalid_action(GrammarError::UnknownDevice(target.clone()))),
            (Some(kind), Action::SetTemperature { .. }) if kind != DeviceKind::Thermostat => {
                return Err(invalid_action(GrammarError::NotAThermostat(target.clone())));
            }
            _ => {}
        }

        self.lock().push(trigger.clone());
        tracing::info!(%trigger, "added trigger");
        Ok(trigger)
    }

    /// Remove the first trigger with exactly this condition and action.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::TriggerNotFound`] when no stored rule matches,
    /// including when either string does not parse.
    pub fn remove(&self, condition: &str, action: &str) -> Result<Trigger, HomeError> {
        let not_found = || HomeError::TriggerNotFound {
            condition: condition.to_string(),
            action: action.to_string(),
        };
        let parsed_condition = condition.parse::<Condition>().map_err(|_| not_found())?;
        let parsed_action = action.parse::<Action>().map_err(|_| not_found())?;

        let mut triggers = self.lock();
        let index = triggers
            .iter()
            .position(|t| t.same_rule(&parsed_condition, &parsed_action))
            .ok_or_else(not_found)?;
        let removed = triggers.remove(index);
        drop(triggers);

        tracing::info!(trigger = %removed, "removed trigger");
        Ok(removed)
    }

    /// Drop every trigger whose condition or action names `device_id`.
    /// Returns how many were dropped.
    pub fn remove_referencing(&self, device_id: &DeviceId) -> usize {
        let mut triggers = self.lock();
        let before = triggers.len();
        triggers.retain(|t| !t.references(device_id));
        let removed = before - triggers.len();
        drop(triggers);

        if removed > 0 {
            tracing::info!(%device_id, count = removed, "removed triggers of deleted device");
        }
        removed
    }

    /// Snapshot of all triggers, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Trigger> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweep: fire every armed trigger whose condition holds.
    ///
    /// Triggers whose evaluation or action fails with an error that
    /// [invalidates](HomeError::invalidates_trigger) them are removed. Returns
    /// the ids of the triggers that fired.
    pub fn check(&self, control: &impl DeviceControl) -> Vec<TriggerId> {
        let armed: Vec<Trigger> = self.lock().iter().filter(|t| t.is_armed()).cloned().collect();

        let mut fired = Vec::new();
        for trigger in armed {
            match evaluate(control, &trigger.condition) {
                Ok(false) => {}
                Ok(true) => {
                    // Latch before running the action so a concurrent sweep
                    // cannot fire the same edge twice.
                    if !self.claim(&trigger) {
                        continue;
                    }
                    match control.execute(&trigger.action) {
                        Ok(()) => {
                            tracing::info!(%trigger, "trigger fired");
                            fired.push(trigger.id);
                        }
                        Err(err) => self.handle_failure(&trigger, &err),
                    }
                }
                Err(err) => self.handle_failure(&trigger, &err),
            }
        }
        fired
    }

    /// Re-arm every fired trigger whose condition is now false.
    ///
    /// Evaluation errors are ignored here; [`check`](Self::check) prunes
    /// broken triggers. Returns how many were re-armed.
    pub fn reset(&self, control: &impl DeviceControl) -> usize {
        let fired: Vec<(TriggerId, u64, Condition)> = self
            .lock()
            .iter()
            .filter(|t| !t.is_armed())
            .map(|t| (t.id, t.generation(), t.condition.clone()))
            .collect();

        let cleared: Vec<(TriggerId, u64)> = fired
            .into_iter()
            .filter(|(_, _, condition)| matches!(evaluate(control, condition), Ok(false)))
            .map(|(id, generation, _)| (id, generation))
            .collect();
        if cleared.is_empty() {
            return 0;
        }

        let mut rearmed = 0;
        for trigger in self.lock().iter_mut() {
            if cleared.contains(&(trigger.id, trigger.generation())) && trigger.rearm() {
                tracing::debug!(%trigger, "trigger reset");
                rearmed += 1;
            }
        }
        rearmed
    }

    /// Fire the stored trigger only if it is still in the state `seen` was
    /// snapshotted in; a stale evaluation must not consume a later edge.
    fn claim(&self, seen: &Trigger) -> bool {
        self.lock()
            .iter_mut()
            .find(|t| t.id == seen.id && t.generation() == seen.generation())
            .is_some_and(Trigger::fire)
    }

    fn handle_failure(&self, trigger: &Trigger, err: &HomeError) {
        if err.invalidates_trigger() {
            self.lock().retain(|t| t.id != trigger.id);
            tracing::warn!(%err, %trigger, "removing invalid trigger");
        } else {
            tracing::warn!(%err, %trigger, "error processing trigger");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Trigger>> {
        self.triggers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn evaluate(control: &impl DeviceControl, condition: &Condition) -> Result<bool, HomeError> {
    let value = control.read_value(&condition.device_id)?;
    Ok(condition.holds(value))
}
