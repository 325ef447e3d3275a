//! Derives the discrete state and axis value of each [`Action`] from raw control states.

use bevy::math::Vec2;
use bevy::reflect::Reflect;
use bevy::utils::HashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::action::{Action, AxisPair};
use crate::binding::{Binding, BindingTable};
use crate::raw_inputs::RawInputTracker;

/// The discrete state of an action.
///
/// By default, actions are [`ActionState::Released`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect, Default)]
pub enum ActionState {
    /// At least one of the action's controls went down
    Pressed,
    /// None of the action's controls are down
    #[default]
    Released,
    /// The action is continuously active.
    ///
    /// Buttons never enter this state: they only move between pressed and released on edges.
    /// It is used by pointer-driven actions such as [`Action::Look`] while the pointer moves.
    Held,
}

impl ActionState {
    /// Is the action currently active, either pressed or held?
    #[inline]
    #[must_use]
    pub fn active(&self) -> bool {
        *self != ActionState::Released
    }

    /// Is the action currently released?
    #[inline]
    #[must_use]
    pub fn released(&self) -> bool {
        *self == ActionState::Released
    }
}

/// The payload delivered alongside an [`ActionState`] to action handlers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum ActionValue {
    /// A digital action, with no value attached
    #[default]
    Digital,
    /// The current axis value of a movement action, in `[-1, 1]`
    Axis(f32),
    /// A two-dimensional value, such as the pointer motion of this frame
    Vector2(Vec2),
}

/// Where an action is in its lifecycle.
///
/// `Unbound` actions have no binding. `Ready` actions are bound but were never observed.
/// After their first observation, actions move between the remaining states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ActionPhase {
    /// The action has no binding
    Unbound,
    /// The action is bound, but none of its controls has been observed yet
    Ready,
    /// See [`ActionState::Pressed`]
    Pressed,
    /// See [`ActionState::Released`]
    Released,
    /// See [`ActionState::Held`]
    Held,
}

impl From<ActionState> for ActionPhase {
    fn from(state: ActionState) -> Self {
        match state {
            ActionState::Pressed => ActionPhase::Pressed,
            ActionState::Released => ActionPhase::Released,
            ActionState::Held => ActionPhase::Held,
        }
    }
}

/// Stores the discrete state and axis value of every observed action.
///
/// The resolver trusts its caller: context gating happens before any method here is called.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionStateResolver {
    states: HashMap<Action, ActionState>,
    axes: HashMap<Action, f32>,
}

impl ActionStateResolver {
    /// The last committed state of `action`, or `None` if it was never observed.
    #[inline]
    #[must_use]
    pub fn state(&self, action: Action) -> Option<ActionState> {
        self.states.get(&action).copied()
    }

    /// Is `action` in `state`? Actions that were never observed are released.
    #[inline]
    #[must_use]
    pub fn is_in_state(&self, action: Action, state: ActionState) -> bool {
        self.state(action).unwrap_or_default() == state
    }

    /// Re-reads the controls of `binding` and commits the action's new state.
    ///
    /// The action is pressed while either of its controls is pressed.
    /// Returns the new state only if it is a transition: re-committing the same state
    /// (such as a key-repeat) or first observing a released action yields `None`.
    pub fn recompute(
        &mut self,
        binding: &Binding,
        raw_inputs: &RawInputTracker,
    ) -> Option<ActionState> {
        let next = if controls_pressed(Some(binding), raw_inputs) {
            ActionState::Pressed
        } else {
            ActionState::Released
        };

        self.commit(binding.action, next)
    }

    /// Commits `state` for `action`, returning it if it differs from the previous state.
    pub fn commit(&mut self, action: Action, state: ActionState) -> Option<ActionState> {
        match self.states.insert(action, state) {
            Some(previous) if previous == state => None,
            None if state == ActionState::Released => None,
            _ => Some(state),
        }
    }

    /// The discrete axis formed by two opposing actions, read straight from the raw controls.
    ///
    /// Returns `1.0` if only the `positive` action's controls are pressed,
    /// `-1.0` if only the `negative` action's controls are pressed,
    /// and `0.0` if both or neither are.
    #[must_use]
    pub fn axis_for(
        bindings: &BindingTable,
        raw_inputs: &RawInputTracker,
        positive: Action,
        negative: Action,
    ) -> f32 {
        let positive = controls_pressed(bindings.get_ref(positive), raw_inputs);
        let negative = controls_pressed(bindings.get_ref(negative), raw_inputs);

        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Recomputes and stores the axis values of both actions in `pair`.
    ///
    /// The positive action stores the axis as-is, the negative action stores its negation,
    /// so that each action reports `1.0` when it alone is pressed.
    pub fn refresh_axis(
        &mut self,
        pair: AxisPair,
        bindings: &BindingTable,
        raw_inputs: &RawInputTracker,
    ) -> f32 {
        let value = Self::axis_for(bindings, raw_inputs, pair.positive, pair.negative);
        self.axes.insert(pair.positive, value);
        // Avoid storing -0.0
        self.axes.insert(pair.negative, if value == 0.0 { 0.0 } else { -value });
        value
    }

    /// The last computed axis value of `action`, or `0.0` if it has none.
    #[inline]
    #[must_use]
    pub fn axis_value(&self, action: Action) -> f32 {
        self.axes.get(&action).copied().unwrap_or_default()
    }

    /// Composes the axis values of two actions into a vector.
    ///
    /// The result is not normalized: a diagonal has a length of √2.
    #[inline]
    #[must_use]
    pub fn vector2_for(&self, horizontal_positive: Action, vertical_positive: Action) -> Vec2 {
        Vec2::new(
            self.axis_value(horizontal_positive),
            self.axis_value(vertical_positive),
        )
    }

    /// Sets every tracked axis value to zero.
    pub fn zero_axes(&mut self) {
        self.axes.values_mut().for_each(|value| *value = 0.0);
    }

    /// Returns every [`ActionState::Held`] action to [`ActionState::Released`].
    ///
    /// No transition is reported.
    pub fn settle_held(&mut self) {
        self.states
            .values_mut()
            .filter(|state| **state == ActionState::Held)
            .for_each(|state| *state = ActionState::Released);
    }

    /// Every action currently in `state`, in definition order.
    #[must_use]
    pub fn actions_in_state(&self, state: ActionState) -> Vec<Action> {
        self.states
            .iter()
            .filter(|(_, current)| **current == state)
            .map(|(action, _)| *action)
            .sorted()
            .collect()
    }
}

fn controls_pressed(binding: Option<&Binding>, raw_inputs: &RawInputTracker) -> bool {
    binding.is_some_and(|binding| binding.controls().any(|control| raw_inputs.is_pressed(control)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (BindingTable, RawInputTracker, ActionStateResolver) {
        (
            BindingTable::with_defaults(),
            RawInputTracker::default(),
            ActionStateResolver::default(),
        )
    }

    #[test]
    fn unobserved_actions_are_released() {
        let resolver = ActionStateResolver::default();
        assert_eq!(resolver.state(Action::Jump), None);
        assert!(resolver.is_in_state(Action::Jump, ActionState::Released));
        assert!(!resolver.is_in_state(Action::Jump, ActionState::Pressed));
        assert_eq!(resolver.axis_value(Action::MoveForward), 0.0);
    }

    #[test]
    fn recompute_reports_edges_only() {
        let (bindings, mut raw, mut resolver) = setup();
        let jump = bindings.get(Action::Jump).unwrap();

        // First observation of a released action is silent
        assert_eq!(resolver.recompute(&jump, &raw), None);
        assert!(resolver.is_in_state(Action::Jump, ActionState::Released));

        raw.set_pressed(" ", true);
        assert_eq!(resolver.recompute(&jump, &raw), Some(ActionState::Pressed));
        // A key repeat is not a transition
        assert_eq!(resolver.recompute(&jump, &raw), None);

        raw.set_pressed(" ", false);
        assert_eq!(resolver.recompute(&jump, &raw), Some(ActionState::Released));
    }

    #[test]
    fn either_control_keeps_the_action_pressed() {
        let (bindings, mut raw, mut resolver) = setup();
        let forward = bindings.get(Action::MoveForward).unwrap();

        raw.set_pressed("w", true);
        raw.set_pressed("arrowup", true);
        assert_eq!(resolver.recompute(&forward, &raw), Some(ActionState::Pressed));

        raw.set_pressed("w", false);
        assert_eq!(resolver.recompute(&forward, &raw), None);
        assert!(resolver.is_in_state(Action::MoveForward, ActionState::Pressed));

        raw.set_pressed("arrowup", false);
        assert_eq!(resolver.recompute(&forward, &raw), Some(ActionState::Released));
    }

    #[test]
    fn opposing_controls_cancel() {
        let (bindings, mut raw, _) = setup();
        let axis = |raw: &RawInputTracker| {
            ActionStateResolver::axis_for(
                &bindings,
                raw,
                Action::MoveForward,
                Action::MoveBackward,
            )
        };

        assert_eq!(axis(&raw), 0.0);
        raw.set_pressed("w", true);
        assert_eq!(axis(&raw), 1.0);
        raw.set_pressed("s", true);
        assert_eq!(axis(&raw), 0.0);
        raw.set_pressed("w", false);
        assert_eq!(axis(&raw), -1.0);
        raw.set_pressed("s", false);
        assert_eq!(axis(&raw), 0.0);
    }

    #[test]
    fn unbound_actions_contribute_nothing_to_an_axis() {
        let bindings = BindingTable::default();
        let mut raw = RawInputTracker::default();
        raw.set_pressed("w", true);

        let value = ActionStateResolver::axis_for(
            &bindings,
            &raw,
            Action::MoveForward,
            Action::MoveBackward,
        );
        assert_eq!(value, 0.0);
    }

    #[test]
    fn actions_by_state() {
        let mut resolver = ActionStateResolver::default();
        resolver.commit(Action::Reload, ActionState::Pressed);
        resolver.commit(Action::Jump, ActionState::Pressed);
        resolver.commit(Action::Look, ActionState::Held);

        assert_eq!(
            resolver.actions_in_state(ActionState::Pressed),
            vec![Action::Jump, Action::Reload]
        );
        assert_eq!(resolver.actions_in_state(ActionState::Held), vec![Action::Look]);
    }

    #[test]
    fn refresh_axis_stores_signed_values() {
        let (bindings, mut raw, mut resolver) = setup();

        raw.set_pressed("a", true);
        assert_eq!(resolver.refresh_axis(AxisPair::STRAFE, &bindings, &raw), -1.0);
        assert_eq!(resolver.axis_value(Action::MoveRight), -1.0);
        assert_eq!(resolver.axis_value(Action::MoveLeft), 1.0);

        raw.set_pressed("a", false);
        resolver.refresh_axis(AxisPair::STRAFE, &bindings, &raw);
        assert_eq!(resolver.axis_value(Action::MoveLeft), 0.0);
        assert!(resolver.axis_value(Action::MoveLeft).is_sign_positive());
    }

    #[test]
    fn vectors_are_not_normalized() {
        let (bindings, mut raw, mut resolver) = setup();
        raw.set_pressed("w", true);
        raw.set_pressed("d", true);
        resolver.refresh_axis(AxisPair::FORWARD, &bindings, &raw);
        resolver.refresh_axis(AxisPair::STRAFE, &bindings, &raw);

        let vector = resolver.vector2_for(Action::MoveRight, Action::MoveForward);
        assert_eq!(vector, Vec2::new(1.0, 1.0));
        assert_eq!(vector.length(), std::f32::consts::SQRT_2);
    }

    #[test]
    fn zero_axes_and_settle_held() {
        let (bindings, mut raw, mut resolver) = setup();
        raw.set_pressed("w", true);
        resolver.refresh_axis(AxisPair::FORWARD, &bindings, &raw);
        resolver.commit(Action::Look, ActionState::Held);

        resolver.zero_axes();
        resolver.settle_held();

        assert_eq!(resolver.axis_value(Action::MoveForward), 0.0);
        assert_eq!(resolver.axis_value(Action::MoveBackward), 0.0);
        assert!(resolver.is_in_state(Action::Look, ActionState::Released));
    }
}
