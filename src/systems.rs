//! The systems that power the [`InputDispatchPlugin`](crate::plugin::InputDispatchPlugin).

use bevy::ecs::prelude::*;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseButtonInput, MouseMotion};
use bevy::log::debug;
use bevy::math::Vec2;
use bevy::window::WindowFocused;

use crate::action_event::ActionTransition;
use crate::dispatcher::InputDispatcher;
use crate::plugin::DispatchSettings;

/// Feeds this frame's hardware events into the [`InputDispatcher`].
///
/// Keys are read by their logical key, so bindings follow the active keyboard layout.
/// Each event kind is processed in the order it was received;
/// keys are processed before mouse buttons, then mouse motion.
///
/// If the window lost focus during the frame, every control is released.
/// When focus came back before the frame ended, the release happens first,
/// so controls pressed after regaining focus stay pressed.
pub fn dispatch_hardware_events(
    mut dispatcher: ResMut<InputDispatcher>,
    settings: Option<Res<DispatchSettings>>,
    mut keyboard: EventReader<KeyboardInput>,
    mut mouse_buttons: EventReader<MouseButtonInput>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut focus: EventReader<WindowFocused>,
) {
    let release_on_focus_loss = settings.map_or(true, |settings| settings.release_on_focus_loss);
    let mut lost_focus = false;
    let mut focused_at_end = true;
    for event in focus.read() {
        lost_focus |= !event.focused;
        focused_at_end = event.focused;
    }
    let release = lost_focus && release_on_focus_loss;

    if release && focused_at_end {
        debug!("Window lost and regained focus, releasing all controls");
        dispatcher.release_all();
    }

    for event in keyboard.read() {
        dispatcher.handle_logical_key(&event.logical_key, event.state.is_pressed());
    }

    for event in mouse_buttons.read() {
        dispatcher.handle_bevy_mouse_button(event.button, event.state.is_pressed());
    }

    let motion: Vec2 = mouse_motion.read().map(|event| event.delta).sum();
    dispatcher.handle_pointer_motion(motion);

    if release && !focused_at_end {
        debug!("Window lost focus, releasing all controls");
        dispatcher.release_all();
    }
}

/// Sends every transition recorded by the [`InputDispatcher`] as an [`ActionTransition`] event.
pub fn forward_action_transitions(
    mut dispatcher: ResMut<InputDispatcher>,
    mut transitions: EventWriter<ActionTransition>,
) {
    // Draining alone does not mark the dispatcher as changed
    let drained = dispatcher.bypass_change_detection().drain_transitions();
    transitions.send_batch(drained);
}

/// Resets the pointer delta at the end of the frame.
pub fn end_input_frame(mut dispatcher: ResMut<InputDispatcher>) {
    dispatcher.end_frame();
}
