//! Trigger: a `condition -> action` rule evaluated against live device state.
//!
//! Conditions and actions keep their textual wire grammar
//! (`T1 > 75`, `turnOn(L1)`) but are parsed once, when the trigger is
//! created, into [`Condition`] and [`Action`].
//!
//! Each trigger is a two-state machine used for edge-triggering: it starts
//! [`Armed`](TriggerState::Armed), moves to [`Fired`](TriggerState::Fired)
//! when its action runs, and only returns to `Armed` once its condition has
//! been observed false again. Every transition bumps a generation counter so
//! a decision taken on an older snapshot can be told apart from the current
//! latch.

mod action;
mod condition;

pub use action::Action;
pub use condition::{Condition, Operator};

use crate::error::HomeError;
use crate::id::{DeviceId, TriggerId};

/// Edge-triggering latch of a [`Trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Armed,
    Fired,
}

/// A parsed rule together with its firing latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub id: TriggerId,
    pub condition: Condition,
    pub action: Action,
    state: TriggerState,
    generation: u64,
}

impl Trigger {
    /// Create an armed trigger from already-parsed parts.
    #[must_use]
    pub fn new(condition: Condition, action: Action) -> Self {
        Self {
            id: TriggerId::new(),
            condition,
            action,
            state: TriggerState::Armed,
            generation: 0,
        }
    }

    /// Parse both strings and create an armed trigger.
    ///
    /// Only the grammar is checked here; whether the referenced devices exist
    /// is up to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::InvalidCondition`] or [`HomeError::InvalidAction`]
    /// carrying the offending input and the grammar violation.
    pub fn parse(condition: &str, action: &str) -> Result<Self, HomeError> {
        let parsed_condition =
            condition
                .parse::<Condition>()
                .map_err(|reason| HomeError::InvalidCondition {
                    input: condition.to_string(),
                    reason,
                })?;
        let parsed_action = action
            .parse::<Action>()
            .map_err(|reason| HomeError::InvalidAction {
                input: action.to_string(),
                reason,
            })?;
        Ok(Self::new(parsed_condition, parsed_action))
    }

    #[must_use]
    pub fn state(&self) -> TriggerState {
        self.state
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.state == TriggerState::Armed
    }

    /// Number of state transitions so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Move from `Armed` to `Fired`. Returns `false` if it had already fired.
    pub fn fire(&mut self) -> bool {
        self.transition(TriggerState::Armed, TriggerState::Fired)
    }

    /// Move from `Fired` back to `Armed`. Returns `false` if it was armed.
    pub fn rearm(&mut self) -> bool {
        self.transition(TriggerState::Fired, TriggerState::Armed)
    }

    fn transition(&mut self, from: TriggerState, to: TriggerState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        self.generation += 1;
        true
    }

    /// Whether the condition or the action names this device.
    #[must_use]
    pub fn references(&self, device_id: &DeviceId) -> bool {
        self.condition.device_id == *device_id || self.action.device_id() == device_id
    }

    /// Same rule, ignoring identity and latch state.
    #[must_use]
    pub fn same_rule(&self, condition: &Condition, action: &Action) -> bool {
        self.condition == *condition && self.action == *action
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.condition, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;

    #[test]
    fn should_parse_valid_trigger_as_armed() {
        let trigger = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        assert!(trigger.is_armed());
        assert_eq!(trigger.to_string(), "T1 > 75 -> turnOn(L1)");
    }

    #[test]
    fn should_report_invalid_condition_before_action() {
        let result = Trigger::parse("bad syntax", "nonsense");
        assert_eq!(
            result,
            Err(HomeError::InvalidCondition {
                input: "bad syntax".to_string(),
                reason: GrammarError::WrongArity(2),
            })
        );
    }

    #[test]
    fn should_report_invalid_action() {
        let result = Trigger::parse("T1 > 75", "invalidAction(L1)");
        assert!(matches!(
            result,
            Err(HomeError::InvalidAction {
                reason: GrammarError::UnknownCommand(_),
                ..
            })
        ));
    }

    #[test]
    fn should_fire_once_until_rearmed() {
        let mut trigger = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        assert!(trigger.fire());
        assert!(!trigger.fire());
        assert_eq!(trigger.state(), TriggerState::Fired);
        assert!(trigger.rearm());
        assert!(!trigger.rearm());
        assert!(trigger.is_armed());
    }

    #[test]
    fn should_bump_generation_on_transitions_only() {
        let mut trigger = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        assert_eq!(trigger.generation(), 0);
        trigger.fire();
        trigger.fire();
        assert_eq!(trigger.generation(), 1);
        trigger.rearm();
        trigger.rearm();
        assert_eq!(trigger.generation(), 2);
    }

    #[test]
    fn should_reference_condition_and_action_devices() {
        let trigger = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        assert!(trigger.references(&DeviceId::from("T1")));
        assert!(trigger.references(&DeviceId::from("L1")));
        assert!(!trigger.references(&DeviceId::from("L2")));
    }

    #[test]
    fn should_compare_rules_structurally() {
        let trigger = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        let other = Trigger::parse("T1 > 75", "turnOn(L1)").unwrap();
        assert!(trigger.same_rule(&other.condition, &other.action));
        assert_ne!(trigger.id, other.id);
    }
}
