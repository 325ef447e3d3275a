//! Contains main plugin exported by this crate.

use std::sync::Arc;

use bevy::app::{App, Last, Plugin, PreUpdate};
use bevy::ecs::prelude::*;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseButtonInput, MouseMotion};
use bevy::input::InputSystem;
use bevy::window::WindowFocused;

use crate::action::InputContext;
use crate::action_event::ActionTransition;
use crate::dispatcher::InputDispatcher;
use crate::persistence::{BindingStore, MemoryStore, BINDINGS_KEY};

/// A [`Plugin`] that feeds Bevy's hardware events into an [`InputDispatcher`] resource
///
/// The dispatcher is constructed once, when the plugin is built, and inserted into the `World`.
/// Gameplay code registers handlers on it through `ResMut<InputDispatcher>`,
/// or reads [`ActionTransition`] events.
///
/// ## Systems
///
/// **WARNING:** The dispatch systems run during [`PreUpdate`], after Bevy's [`InputSystem`].
/// If you have systems that care about actions that also run during this schedule,
/// you must define an ordering between your systems or behavior will be very erratic.
/// The stable labels for these systems are available under [`InputDispatchSystem`] enum.
///
/// Complete list:
///
/// - [`dispatch_hardware_events`](crate::systems::dispatch_hardware_events), which feeds key, mouse button,
///   mouse motion and focus events into the dispatcher
///     - labeled [`InputDispatchSystem::Dispatch`]
/// - [`forward_action_transitions`](crate::systems::forward_action_transitions), which sends every
///   notification as an [`ActionTransition`] event
///     - labeled [`InputDispatchSystem::Forward`]
/// - [`end_input_frame`](crate::systems::end_input_frame), which resets the pointer delta during [`Last`]
///
/// # Example
/// ```rust
/// use bevy::prelude::*;
/// use leafwing_input_dispatch::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(bevy::input::InputPlugin)
///     .add_plugins(
///         InputDispatchPlugin::default()
///             .with_initial_contexts([InputContext::Player, InputContext::Ui])
///             .with_store(FileStore::new("settings")),
///     );
/// ```
pub struct InputDispatchPlugin {
    /// Contexts enabled as soon as the dispatcher is created
    pub initial_contexts: Vec<InputContext>,
    /// Where bindings are saved to and loaded from
    pub store: Arc<dyn BindingStore>,
    /// The key bindings are saved under
    pub storage_key: String,
    /// Load saved bindings when the plugin is built
    pub load_on_startup: bool,
    /// Release every control when the window loses focus
    pub release_on_focus_loss: bool,
    /// Send [`ActionTransition`] events
    pub emit_transitions: bool,
}

impl Default for InputDispatchPlugin {
    fn default() -> Self {
        Self {
            initial_contexts: vec![InputContext::Player],
            store: Arc::new(MemoryStore::new()),
            storage_key: BINDINGS_KEY.to_string(),
            load_on_startup: true,
            release_on_focus_loss: true,
            emit_transitions: true,
        }
    }
}

impl InputDispatchPlugin {
    /// Replaces the contexts enabled at startup.
    #[must_use]
    pub fn with_initial_contexts(
        mut self,
        contexts: impl IntoIterator<Item = InputContext>,
    ) -> Self {
        self.initial_contexts = contexts.into_iter().collect();
        self
    }

    /// Saves and loads bindings with `store`.
    #[must_use]
    pub fn with_store(self, store: impl BindingStore) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Saves and loads bindings with a `store` shared with other subsystems.
    #[must_use]
    pub fn with_shared_store(mut self, store: Arc<dyn BindingStore>) -> Self {
        self.store = store;
        self
    }

    /// Saves and loads bindings under `key`.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Should saved bindings be loaded when the plugin is built?
    #[must_use]
    pub fn load_on_startup(mut self, load: bool) -> Self {
        self.load_on_startup = load;
        self
    }

    /// Should every control be released when the window loses focus?
    #[must_use]
    pub fn release_on_focus_loss(mut self, release: bool) -> Self {
        self.release_on_focus_loss = release;
        self
    }

    /// Should [`ActionTransition`] events be sent?
    #[must_use]
    pub fn emit_transitions(mut self, emit: bool) -> Self {
        self.emit_transitions = emit;
        self
    }

    /// Creates the dispatcher this plugin would insert.
    #[must_use]
    pub fn build_dispatcher(&self) -> InputDispatcher {
        let mut dispatcher = InputDispatcher::with_shared_store(self.store.clone())
            .with_storage_key(self.storage_key.clone());

        for context in &self.initial_contexts {
            dispatcher.enable_context(*context);
        }
        if self.load_on_startup {
            dispatcher.load_bindings();
        }
        dispatcher.record_transitions(self.emit_transitions);

        dispatcher
    }
}

impl Plugin for InputDispatchPlugin {
    fn build(&self, app: &mut App) {
        use crate::systems::*;

        // Events are normally registered by InputPlugin and WindowPlugin,
        // but headless apps may have neither
        app.add_event::<KeyboardInput>()
            .add_event::<MouseButtonInput>()
            .add_event::<MouseMotion>()
            .add_event::<WindowFocused>()
            .add_event::<ActionTransition>();

        app.insert_resource(self.build_dispatcher())
            .insert_resource(DispatchSettings {
                release_on_focus_loss: self.release_on_focus_loss,
            });

        app.configure_sets(
            PreUpdate,
            (InputDispatchSystem::Dispatch, InputDispatchSystem::Forward)
                .chain()
                .after(InputSystem),
        )
        .add_systems(
            PreUpdate,
            dispatch_hardware_events.in_set(InputDispatchSystem::Dispatch),
        )
        .add_systems(
            PreUpdate,
            forward_action_transitions.in_set(InputDispatchSystem::Forward),
        )
        .add_systems(Last, end_input_frame);
    }
}

/// Runtime settings read by the dispatch systems
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// See [`InputDispatchPlugin::release_on_focus_loss`]
    pub release_on_focus_loss: bool,
}

/// [`SystemSet`]s for the [`crate::systems`] used by this crate
///
/// `Dispatch` runs before `Forward`.
#[derive(SystemSet, Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub enum InputDispatchSystem {
    /// Feeds hardware events into the [`InputDispatcher`], notifying handlers
    Dispatch,
    /// Sends the resulting [`ActionTransition`] events
    Forward,
}
