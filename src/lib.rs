#![forbid(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::doc_markdown)]
//! Context-gated, rebindable action dispatch for the Bevy game engine.
//!
//! Raw hardware events (key presses, mouse buttons, mouse motion) are translated into
//! semantic [`Action`](action::Action)s, which gameplay code consumes by registering handlers.
//!
//! - Each action has one [`Binding`](binding::Binding): a primary control, an optional secondary
//!   control, the [`InputContext`](action::InputContext) it belongs to and whether players may rebind it.
//! - A binding is only live while its context is enabled, so whole groups of actions can be
//!   switched on and off as the game moves between playing, menus, dialog, vehicles and cutscenes.
//! - Every action is either pressed or released; movement actions also carry an axis value
//!   derived from their opposing action.
//! - Every handler registered for an action is notified of each of its transitions.
//!   A failing handler is logged and never stops the others.
//!
//! The [`InputDispatcher`](dispatcher::InputDispatcher) works on its own, and the
//! [`InputDispatchPlugin`](plugin::InputDispatchPlugin) wires it into a Bevy `App`.

pub mod action;
pub mod action_event;
pub mod action_state;
pub mod binding;
pub mod clashing_inputs;
pub mod context;
mod display_impl;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
mod input_mocking;
pub mod persistence;
pub mod plugin;
pub mod raw_inputs;
pub mod systems;

// Re-export this at the root level
pub use display_impl::control_label;
pub use input_mocking::MockHardware;

/// Everything you need to get started
pub mod prelude {
    pub use crate::action::{Action, AxisPair, InputContext};
    pub use crate::action_event::ActionTransition;
    pub use crate::action_state::{ActionPhase, ActionState, ActionValue};
    pub use crate::binding::Binding;
    pub use crate::dispatcher::InputDispatcher;
    pub use crate::errors::{HandlerError, PersistenceError};
    pub use crate::handlers::Subscription;
    pub use crate::persistence::{BindingStore, FileStore, MemoryStore};
    pub use crate::plugin::{InputDispatchPlugin, InputDispatchSystem};
    pub use crate::MockHardware;
}
