//! Raw hardware state, tracked by normalized control token.
//!
//! A control token is a lower-case string naming a physical input:
//! a key name such as `"w"`, `"arrowup"` or `" "` (space),
//! or a synthetic mouse token such as `"mouse0"`.

use bevy::input::keyboard::Key;
use bevy::input::mouse::MouseButton;
use bevy::math::Vec2;
use bevy::utils::HashMap;

/// The synthetic control token that mouse motion is delivered on.
pub const MOUSE_MOTION_TOKEN: &str = "mousemove";

/// Normalizes a raw control name into a control token.
///
/// Control names are case-insensitive: `"W"` and `"w"` refer to the same key.
/// No other validation is performed.
#[inline]
#[must_use]
pub fn normalize_control(raw: &str) -> String {
    raw.to_lowercase()
}

/// Converts a logical [`Key`] into a control token.
///
/// Returns `None` for dead and unidentified keys, which can never be bound.
#[must_use]
pub fn key_token(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(normalize_control(text)),
        Key::Space => Some(" ".to_string()),
        Key::Unidentified(_) | Key::Dead(_) => None,
        named => Some(normalize_control(&format!("{named:?}"))),
    }
}

/// The index used for a [`MouseButton`] in its `mouse<index>` control token.
#[must_use]
pub fn mouse_button_index(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::Back => 3,
        MouseButton::Forward => 4,
        MouseButton::Other(index) => index,
    }
}

/// The control token for the mouse button at `index`.
#[inline]
#[must_use]
pub fn mouse_token(index: u16) -> String {
    format!("mouse{index}")
}

/// The pressed / released state of every physical control observed so far.
///
/// Tokens must be normalized with [`normalize_control`] before being stored:
/// the tracker is a pure state container and does not normalize on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInputTracker {
    controls: HashMap<String, bool>,
}

impl RawInputTracker {
    /// Records the state of `control`, returning `true` if it changed.
    ///
    /// Entries are created lazily the first time a control is observed.
    pub fn set_pressed(&mut self, control: &str, pressed: bool) -> bool {
        match self.controls.get_mut(control) {
            Some(state) => std::mem::replace(state, pressed) != pressed,
            None => {
                self.controls.insert(control.to_string(), pressed);
                pressed
            }
        }
    }

    /// Is `control` currently pressed?
    ///
    /// Controls that were never observed are released.
    #[inline]
    #[must_use]
    pub fn is_pressed(&self, control: &str) -> bool {
        self.controls.get(control).copied().unwrap_or_default()
    }

    /// Iterates over every control that is currently pressed, in no particular order.
    pub fn pressed_controls(&self) -> impl Iterator<Item = &str> {
        self.controls
            .iter()
            .filter(|(_, pressed)| **pressed)
            .map(|(control, _)| control.as_str())
    }

    /// Marks every tracked control as released, returning the ones that were pressed.
    ///
    /// This does not notify anyone: see
    /// [`InputDispatcher::release_all`](crate::dispatcher::InputDispatcher::release_all).
    pub fn release_all(&mut self) -> Vec<String> {
        let mut released = Vec::new();
        for (control, pressed) in self.controls.iter_mut() {
            if std::mem::take(pressed) {
                released.push(control.clone());
            }
        }
        released
    }
}

/// Pointer motion accumulated since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDelta {
    accumulated: Vec2,
}

impl PointerDelta {
    /// Adds `delta` to the motion seen this frame, returning the new total.
    #[inline]
    pub fn accumulate(&mut self, delta: Vec2) -> Vec2 {
        self.accumulated += delta;
        self.accumulated
    }

    /// The total motion seen this frame.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Vec2 {
        self.accumulated
    }

    /// Clears the accumulated motion.
    #[inline]
    pub fn reset(&mut self) {
        self.accumulated = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_normalize_to_lower_case_tokens() {
        assert_eq!(key_token(&Key::Character("W".into())), Some("w".to_string()));
        assert_eq!(key_token(&Key::Space), Some(" ".to_string()));
        assert_eq!(key_token(&Key::ArrowUp), Some("arrowup".to_string()));
        assert_eq!(key_token(&Key::Escape), Some("escape".to_string()));
        assert_eq!(key_token(&Key::Dead(None)), None);
    }

    #[test]
    fn mouse_buttons_use_dom_order() {
        assert_eq!(mouse_token(mouse_button_index(MouseButton::Left)), "mouse0");
        assert_eq!(mouse_token(mouse_button_index(MouseButton::Middle)), "mouse1");
        assert_eq!(mouse_token(mouse_button_index(MouseButton::Right)), "mouse2");
        assert_eq!(mouse_token(mouse_button_index(MouseButton::Other(7))), "mouse7");
    }

    #[test]
    fn unobserved_controls_are_released() {
        let tracker = RawInputTracker::default();
        assert!(!tracker.is_pressed("w"));
        assert_eq!(tracker.pressed_controls().count(), 0);
    }

    #[test]
    fn set_pressed_reports_changes() {
        let mut tracker = RawInputTracker::default();

        // A first observation of a released control is not a change
        assert!(!tracker.set_pressed("w", false));
        assert!(tracker.set_pressed("w", true));
        assert!(!tracker.set_pressed("w", true));
        assert!(tracker.is_pressed("w"));
        assert!(tracker.set_pressed("w", false));
        assert!(!tracker.is_pressed("w"));
    }

    #[test]
    fn tracker_does_not_normalize() {
        let mut tracker = RawInputTracker::default();
        tracker.set_pressed("W", true);
        assert!(!tracker.is_pressed("w"));
    }

    #[test]
    fn release_all_returns_pressed_controls() {
        let mut tracker = RawInputTracker::default();
        tracker.set_pressed("a", true);
        tracker.set_pressed("b", true);
        tracker.set_pressed("c", false);

        let mut released = tracker.release_all();
        released.sort();
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(tracker.pressed_controls().count(), 0);
    }

    #[test]
    fn pointer_delta_accumulates_until_reset() {
        let mut pointer = PointerDelta::default();
        pointer.accumulate(Vec2::new(1.0, 2.0));
        assert_eq!(pointer.accumulate(Vec2::new(0.5, -1.0)), Vec2::new(1.5, 1.0));
        pointer.reset();
        assert_eq!(pointer.get(), Vec2::ZERO);
    }
}
