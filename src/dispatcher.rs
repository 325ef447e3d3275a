//! The [`InputDispatcher`]: turns raw hardware transitions into action-state transitions
//! and fans them out to the registered handlers.

use std::sync::Arc;

use bevy::log::{debug, trace, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;

use crate::action::{Action, InputContext, InputControlKind};
use crate::action_event::ActionTransition;
use crate::action_state::{ActionPhase, ActionState, ActionStateResolver, ActionValue};
use crate::binding::{Binding, BindingTable};
use crate::clashing_inputs::SharedControl;
use crate::context::ContextGate;
use crate::errors::{HandlerError, PersistenceError};
use crate::handlers::{HandlerRegistry, Subscription};
use crate::persistence::{decode_bindings, encode_bindings, BindingStore, BINDINGS_KEY};
use crate::raw_inputs::{
    key_token, mouse_button_index, mouse_token, normalize_control, PointerDelta, RawInputTracker,
    MOUSE_MOTION_TOKEN,
};

/// Translates raw hardware events into rebindable, context-gated [`Action`]s.
///
/// The dispatcher owns the [`BindingTable`], the [`ContextGate`], the [`RawInputTracker`]
/// and every action's state. Everything runs synchronously on the caller's thread:
/// each raw transition is fully resolved, and every handler notified, before the call returns.
///
/// When used through the [`InputDispatchPlugin`](crate::plugin::InputDispatchPlugin),
/// it lives in the `World` as a resource and is fed by Bevy's input events.
///
/// # Example
/// ```rust
/// use leafwing_input_dispatch::prelude::*;
///
/// let mut dispatcher = InputDispatcher::new(MemoryStore::new());
/// dispatcher.enable_context(InputContext::Player);
///
/// let subscription = dispatcher.register_action_handler(Action::Jump, |state, value| {
///     assert_eq!(value, ActionValue::Digital);
///     println!("jump is now {state}");
///     Ok(())
/// });
///
/// dispatcher.handle_key(" ", true);
/// assert!(dispatcher.is_action_in_state(Action::Jump, ActionState::Pressed));
///
/// subscription.unsubscribe();
/// ```
#[derive(Resource)]
pub struct InputDispatcher {
    bindings: BindingTable,
    contexts: ContextGate,
    raw_inputs: RawInputTracker,
    resolver: ActionStateResolver,
    pointer: PointerDelta,
    handlers: HandlerRegistry,
    store: Arc<dyn BindingStore>,
    storage_key: String,
    transitions: Option<Vec<ActionTransition>>,
}

impl InputDispatcher {
    /// Creates a dispatcher with the default bindings and no enabled contexts.
    ///
    /// Bindings are saved to and loaded from `store`.
    pub fn new(store: impl BindingStore) -> Self {
        Self::with_shared_store(Arc::new(store))
    }

    /// Like [`InputDispatcher::new`], for a store that is shared with other subsystems.
    pub fn with_shared_store(store: Arc<dyn BindingStore>) -> Self {
        Self {
            bindings: BindingTable::with_defaults(),
            contexts: ContextGate::default(),
            raw_inputs: RawInputTracker::default(),
            resolver: ActionStateResolver::default(),
            pointer: PointerDelta::default(),
            handlers: HandlerRegistry::default(),
            store,
            storage_key: BINDINGS_KEY.to_string(),
            transitions: None,
        }
    }

    /// Saves and loads bindings under `key` instead of [`BINDINGS_KEY`].
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Starts (or stops) recording every notification as an [`ActionTransition`].
    ///
    /// Recorded transitions accumulate until [`InputDispatcher::drain_transitions`] is called.
    pub fn record_transitions(&mut self, record: bool) {
        match (record, self.transitions.is_some()) {
            (true, false) => self.transitions = Some(Vec::new()),
            (false, true) => self.transitions = None,
            _ => (),
        }
    }

    /// Takes every transition recorded since the last call.
    pub fn drain_transitions(&mut self) -> Vec<ActionTransition> {
        self.transitions
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    // Raw input

    /// Handles a key going down (`pressed`) or up.
    ///
    /// `key` is a key name such as `"W"`, `"ArrowUp"` or `" "`; it is normalized before use.
    pub fn handle_key(&mut self, key: &str, pressed: bool) {
        self.handle_control(key, pressed);
    }

    /// Handles a logical Bevy [`Key`](bevy::input::keyboard::Key) going down or up.
    ///
    /// Dead and unidentified keys are ignored.
    pub fn handle_logical_key(&mut self, key: &bevy::input::keyboard::Key, pressed: bool) {
        match key_token(key) {
            Some(token) => self.handle_control(&token, pressed),
            None => trace!("Ignoring unbindable key {key:?}"),
        }
    }

    /// Handles the mouse button at `index` going down or up, as the control `mouse<index>`.
    pub fn handle_mouse_button(&mut self, index: u16, pressed: bool) {
        self.handle_control(&mouse_token(index), pressed);
    }

    /// Handles a Bevy [`MouseButton`](bevy::input::mouse::MouseButton) going down or up.
    pub fn handle_bevy_mouse_button(
        &mut self,
        button: bevy::input::mouse::MouseButton,
        pressed: bool,
    ) {
        self.handle_mouse_button(mouse_button_index(button), pressed);
    }

    /// Handles a raw transition of any control.
    ///
    /// Every live binding that uses the control is re-evaluated,
    /// so one transition can notify several actions.
    pub fn handle_control(&mut self, control: &str, pressed: bool) {
        let control = normalize_control(control);
        if control.is_empty() {
            return;
        }

        self.raw_inputs.set_pressed(&control, pressed);
        self.dispatch_control(&control);
    }

    /// Handles pointer motion by `delta`.
    ///
    /// The delta accumulates until [`InputDispatcher::end_frame`].
    /// Every live binding to the [`MOUSE_MOTION_TOKEN`] control is held,
    /// and its handlers receive the accumulated delta.
    pub fn handle_pointer_motion(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }

        let accumulated = self.pointer.accumulate(delta);
        for action in self.live_actions(MOUSE_MOTION_TOKEN) {
            self.resolver.commit(action, ActionState::Held);
            self.notify(action, ActionState::Held, ActionValue::Vector2(accumulated));
        }
    }

    /// Releases every pressed control, as if each had been let go.
    ///
    /// Call this when the host loses input focus: a control released while the window was
    /// unfocused would otherwise stay pressed forever.
    /// Live actions that were pressed are notified of their release,
    /// then every axis value and the pointer delta are zeroed.
    /// Actions left pressed with no pressed control are released too;
    /// those in disabled contexts are released without notifying their handlers.
    pub fn release_all(&mut self) {
        let released = self.raw_inputs.release_all();
        debug!("Releasing {} pressed controls", released.len());

        for control in released {
            self.dispatch_control(&control);
        }
        self.resolver.zero_axes();

        // Left pressed by a control that was rebound, or that was released while gated
        for action in self.resolver.actions_in_state(ActionState::Pressed) {
            self.resolver.commit(action, ActionState::Released);
            if self.is_live(action) {
                let value = self.value_of(action);
                self.notify(action, ActionState::Released, value);
            }
        }

        self.resolver.settle_held();
        self.pointer.reset();
    }

    /// Finishes the current frame.
    ///
    /// The pointer delta is reset and held pointer actions are released.
    pub fn end_frame(&mut self) {
        self.pointer.reset();
        self.resolver.settle_held();
    }

    fn dispatch_control(&mut self, control: &str) {
        // Snapshot: handlers cannot touch the table, but the borrow has to end before notifying
        let matched: Vec<Binding> = self
            .bindings
            .bound_to(control)
            .filter(|binding| self.contexts.is_enabled(binding.context))
            .cloned()
            .collect();

        for binding in matched {
            self.resolve(&binding);
        }
    }

    /// Re-reads the controls of live `actions` after their bindings changed.
    fn resync(&mut self, actions: impl IntoIterator<Item = Action>) {
        let live: Vec<Binding> = actions
            .into_iter()
            // Pointer actions are driven by motion, not by control state
            .filter(|action| action.input_control_kind() != InputControlKind::DualAxis)
            .filter_map(|action| self.bindings.get(action))
            .filter(|binding| self.contexts.is_enabled(binding.context))
            .collect();

        for binding in live {
            self.resolve(&binding);
        }
    }

    fn resolve(&mut self, binding: &Binding) {
        let transition = self.resolver.recompute(binding, &self.raw_inputs);

        if let Some(pair) = binding.action.axis_pair() {
            self.resolver
                .refresh_axis(pair, &self.bindings, &self.raw_inputs);
        }

        if let Some(state) = transition {
            let value = self.value_of(binding.action);
            self.notify(binding.action, state, value);
        }
    }

    fn is_live(&self, action: Action) -> bool {
        self.bindings
            .get_ref(action)
            .is_some_and(|binding| self.contexts.is_enabled(binding.context))
    }

    fn live_actions(&self, control: &str) -> Vec<Action> {
        self.bindings
            .bound_to(control)
            .filter(|binding| self.contexts.is_enabled(binding.context))
            .map(|binding| binding.action)
            .collect()
    }

    fn value_of(&self, action: Action) -> ActionValue {
        match action.input_control_kind() {
            InputControlKind::Button => ActionValue::Digital,
            InputControlKind::Axis => ActionValue::Axis(self.resolver.axis_value(action)),
            InputControlKind::DualAxis => ActionValue::Vector2(self.pointer.get()),
        }
    }

    fn notify(&mut self, action: Action, state: ActionState, value: ActionValue) {
        trace!("{action} -> {state} ({value:?})");

        if let Some(transitions) = self.transitions.as_mut() {
            transitions.push(ActionTransition {
                action,
                state,
                value,
            });
        }

        self.handlers.notify(action, state, value);
    }

    // Handlers

    /// Registers `handler` to be called every time `action` changes state.
    ///
    /// Handlers receive the new state and the action's value.
    /// A handler returning an error is logged; other handlers still run.
    /// The returned [`Subscription`] removes the handler.
    pub fn register_action_handler<F>(&mut self, action: Action, handler: F) -> Subscription
    where
        F: Fn(ActionState, ActionValue) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handlers.register(action, handler)
    }

    /// The number of handlers registered for `action`.
    #[must_use]
    pub fn handler_count(&self, action: Action) -> usize {
        self.handlers.count(action)
    }

    // Contexts

    /// Enables `context`, making its bindings live.
    pub fn enable_context(&mut self, context: InputContext) {
        debug!("Enabling input context {context}");
        self.contexts.enable(context);
    }

    /// Disables `context`. Its actions keep their current state.
    pub fn disable_context(&mut self, context: InputContext) {
        debug!("Disabling input context {context}");
        self.contexts.disable(context);
    }

    /// Disables every context.
    pub fn disable_all_contexts(&mut self) {
        self.contexts.disable_all();
    }

    /// Is `context` currently enabled?
    #[must_use]
    pub fn is_context_enabled(&self, context: InputContext) -> bool {
        self.contexts.is_enabled(context)
    }

    /// The context gate, for inspection.
    #[must_use]
    pub fn contexts(&self) -> &ContextGate {
        &self.contexts
    }

    // Bindings

    /// A copy of the current binding of `action`, if it has one.
    #[must_use]
    pub fn get_binding(&self, action: Action) -> Option<Binding> {
        self.bindings.get(action)
    }

    /// Copies every binding, in table order.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.bindings.export_all()
    }

    /// Changes the controls of `action`. See [`BindingTable::rebind`].
    ///
    /// Returns `false` if the action is unbound or not rebindable.
    /// On success, the action's state is re-read from its new controls.
    pub fn rebind_action(
        &mut self,
        action: Action,
        primary: &str,
        secondary: Option<&str>,
    ) -> bool {
        if !self.bindings.rebind(action, primary, secondary) {
            debug!("Refused to rebind {action} to {primary:?}");
            return false;
        }

        self.resync([action]);
        true
    }

    /// Restores the default bindings, then re-reads every action's state from its controls.
    pub fn reset_bindings(&mut self) {
        self.bindings.reset_to_defaults();
        self.resync(Action::variants());
    }

    /// Every control that is bound to more than one action.
    #[must_use]
    pub fn shared_controls(&self) -> Vec<SharedControl> {
        SharedControl::find_all(&self.bindings)
    }

    // Persistence

    /// Saves the current bindings to the store, as a JSON array.
    pub fn try_save_bindings(&self) -> Result<(), PersistenceError> {
        let data = encode_bindings(&self.bindings.export_all())?;
        self.store.save(&self.storage_key, &data)
    }

    /// Loads bindings from the store and imports them.
    ///
    /// On error, the current bindings are left untouched.
    /// On success, every action's state is re-read from its new controls.
    pub fn try_load_bindings(&mut self) -> Result<(), PersistenceError> {
        let data = self
            .store
            .load(&self.storage_key)?
            .ok_or_else(|| PersistenceError::Missing {
                key: self.storage_key.clone(),
            })?;
        let bindings = decode_bindings(&data)?;
        self.bindings.import_all(bindings);
        self.resync(Action::variants());
        Ok(())
    }

    /// Saves the current bindings, logging any failure.
    ///
    /// Returns `true` if the bindings were saved.
    pub fn save_bindings(&self) -> bool {
        match self.try_save_bindings() {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not save input bindings: {err}");
                false
            }
        }
    }

    /// Loads saved bindings, logging any failure and keeping the current bindings if there is one.
    ///
    /// Returns `true` if saved bindings were imported.
    pub fn load_bindings(&mut self) -> bool {
        match self.try_load_bindings() {
            Ok(()) => true,
            Err(err @ PersistenceError::Missing { .. }) => {
                debug!("Keeping current input bindings: {err}");
                false
            }
            Err(err) => {
                warn!("Could not load input bindings: {err}");
                false
            }
        }
    }

    // Queries

    /// The current axis value of `action`, or `0.0` for actions without one.
    #[must_use]
    pub fn get_axis_value(&self, action: Action) -> f32 {
        self.resolver.axis_value(action)
    }

    /// Composes the axis values of two actions into a vector, without normalizing it.
    #[must_use]
    pub fn get_vector2_value(&self, horizontal: Action, vertical: Action) -> Vec2 {
        self.resolver.vector2_for(horizontal, vertical)
    }

    /// Is `action` in `state`? Actions that were never observed are released.
    #[must_use]
    pub fn is_action_in_state(&self, action: Action, state: ActionState) -> bool {
        self.resolver.is_in_state(action, state)
    }

    /// The last committed state of `action`, or `None` if it was never observed.
    #[must_use]
    pub fn action_state(&self, action: Action) -> Option<ActionState> {
        self.resolver.state(action)
    }

    /// Where `action` is in its lifecycle.
    #[must_use]
    pub fn action_phase(&self, action: Action) -> ActionPhase {
        if !self.bindings.contains(action) {
            return ActionPhase::Unbound;
        }

        self.resolver
            .state(action)
            .map_or(ActionPhase::Ready, ActionPhase::from)
    }

    /// The pointer motion accumulated this frame.
    #[must_use]
    pub fn look_delta(&self) -> Vec2 {
        self.pointer.get()
    }

    /// Is `control` currently pressed? The control name is normalized first.
    #[must_use]
    pub fn is_control_pressed(&self, control: &str) -> bool {
        self.raw_inputs.is_pressed(&normalize_control(control))
    }
}

impl std::fmt::Debug for InputDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDispatcher")
            .field("bindings", &self.bindings)
            .field("contexts", &self.contexts)
            .field("raw_inputs", &self.raw_inputs)
            .field("resolver", &self.resolver)
            .field("pointer", &self.pointer)
            .field("handlers", &self.handlers)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}
