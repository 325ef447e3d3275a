//! A serialization-friendly record of every action-state transition.
//!
//! Handlers are the primary way to react to actions. These events mirror every handler
//! notification into Bevy's event system, for systems that would rather read an
//! [`EventReader<ActionTransition>`](bevy::ecs::event::EventReader) each frame.

use bevy::ecs::event::Event;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::action_state::{ActionState, ActionValue};

/// An action changed state.
///
/// Sent by the [`InputDispatchPlugin`](crate::plugin::InputDispatchPlugin) in the order the
/// notifications happened, once per notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Event)]
pub struct ActionTransition {
    /// The action that changed state
    pub action: Action,
    /// The new state of the action
    pub state: ActionState,
    /// The value delivered to the action's handlers
    pub value: ActionValue,
}

impl ActionTransition {
    /// Did the action just become pressed?
    #[inline]
    #[must_use]
    pub fn is_press(&self) -> bool {
        self.state == ActionState::Pressed
    }

    /// Did the action just become released?
    #[inline]
    #[must_use]
    pub fn is_release(&self) -> bool {
        self.state == ActionState::Released
    }
}
