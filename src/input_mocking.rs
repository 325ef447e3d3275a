//! Helpful utilities for testing input dispatch by sending mock hardware events
//!
//! These send the same Bevy events that the windowing backend would,
//! so they exercise the full path through the [`InputDispatchPlugin`](crate::plugin::InputDispatchPlugin).

use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::input::keyboard::{Key, KeyCode, KeyboardInput, NativeKeyCode};
use bevy::input::mouse::{MouseButton, MouseButtonInput, MouseMotion};
use bevy::input::ButtonState;
use bevy::math::Vec2;
use bevy::window::WindowFocused;

/// Send fake hardware events for testing purposes
///
/// Events are processed on the next call to `App::update`.
///
/// # Examples
/// ```rust
/// use bevy::prelude::*;
/// use bevy::input::keyboard::Key;
/// use leafwing_input_dispatch::MockHardware;
///
/// let mut world = World::new();
/// world.init_resource::<Events<bevy::input::keyboard::KeyboardInput>>();
///
/// // Jump!
/// world.press_key(Key::Space);
/// ```
pub trait MockHardware {
    /// Sends a key-down event for the logical `key`
    fn press_key(&mut self, key: Key);

    /// Sends a key-up event for the logical `key`
    fn release_key(&mut self, key: Key);

    /// Sends a key-down event for the character `text`, such as `"w"`
    fn press_char(&mut self, text: &str) {
        self.press_key(Key::Character(text.into()));
    }

    /// Sends a key-up event for the character `text`
    fn release_char(&mut self, text: &str) {
        self.release_key(Key::Character(text.into()));
    }

    /// Sends a mouse button down event
    fn press_mouse_button(&mut self, button: MouseButton);

    /// Sends a mouse button up event
    fn release_mouse_button(&mut self, button: MouseButton);

    /// Sends a mouse motion event
    fn move_mouse(&mut self, delta: Vec2);

    /// Sends a window focus change
    fn set_focus(&mut self, focused: bool);
}

fn keyboard_input(key: Key, state: ButtonState) -> KeyboardInput {
    KeyboardInput {
        key_code: KeyCode::Unidentified(NativeKeyCode::Unidentified),
        logical_key: key,
        state,
        window: Entity::PLACEHOLDER,
    }
}

fn mouse_button_input(button: MouseButton, state: ButtonState) -> MouseButtonInput {
    MouseButtonInput {
        button,
        state,
        window: Entity::PLACEHOLDER,
    }
}

impl MockHardware for World {
    fn press_key(&mut self, key: Key) {
        self.send_event(keyboard_input(key, ButtonState::Pressed));
    }

    fn release_key(&mut self, key: Key) {
        self.send_event(keyboard_input(key, ButtonState::Released));
    }

    fn press_mouse_button(&mut self, button: MouseButton) {
        self.send_event(mouse_button_input(button, ButtonState::Pressed));
    }

    fn release_mouse_button(&mut self, button: MouseButton) {
        self.send_event(mouse_button_input(button, ButtonState::Released));
    }

    fn move_mouse(&mut self, delta: Vec2) {
        self.send_event(MouseMotion { delta });
    }

    fn set_focus(&mut self, focused: bool) {
        self.send_event(WindowFocused {
            window: Entity::PLACEHOLDER,
            focused,
        });
    }
}

impl MockHardware for App {
    fn press_key(&mut self, key: Key) {
        self.world_mut().press_key(key);
    }

    fn release_key(&mut self, key: Key) {
        self.world_mut().release_key(key);
    }

    fn press_mouse_button(&mut self, button: MouseButton) {
        self.world_mut().press_mouse_button(button);
    }

    fn release_mouse_button(&mut self, button: MouseButton) {
        self.world_mut().release_mouse_button(button);
    }

    fn move_mouse(&mut self, delta: Vec2) {
        self.world_mut().move_mouse(delta);
    }

    fn set_focus(&mut self, focused: bool) {
        self.world_mut().set_focus(focused);
    }
}
