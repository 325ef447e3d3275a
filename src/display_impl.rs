//! Containment module for boring implementations of the [`Display`] trait

use std::fmt::{Display, Formatter, Result};

use crate::action::{Action, InputContext};
use crate::action_state::ActionState;
use crate::binding::Binding;

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

impl Display for InputContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())
    }
}

impl Display for ActionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ActionState::Pressed => f.write_str("pressed"),
            ActionState::Released => f.write_str("released"),
            ActionState::Held => f.write_str("held"),
        }
    }
}

/// A readable label for a control token, as shown in a rebinding menu.
///
/// Tokens that are hard to read on their own, such as `" "` or `"mouse0"`, get a friendlier name.
#[must_use]
pub fn control_label(control: &str) -> String {
    match control {
        " " => "Space".to_string(),
        "mouse0" => "Left Mouse".to_string(),
        "mouse1" => "Middle Mouse".to_string(),
        "mouse2" => "Right Mouse".to_string(),
        "mousemove" => "Mouse".to_string(),
        other => match other.strip_prefix("mouse") {
            Some(index) if index.parse::<u16>().is_ok() => format!("Mouse {index}"),
            _ => {
                let mut chars = other.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        },
    }
}

impl Display for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        // The representation of each control, separated by " / "
        write!(
            f,
            "{}: {}",
            self.description,
            control_label(&self.primary_control)
        )?;
        if let Some(secondary) = &self.secondary_control {
            write!(f, " / {}", control_label(secondary))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingTable;

    #[test]
    fn labels() {
        assert_eq!(control_label(" "), "Space");
        assert_eq!(control_label("mouse2"), "Right Mouse");
        assert_eq!(control_label("mouse4"), "Mouse 4");
        assert_eq!(control_label("mousewheel"), "Mousewheel");
        assert_eq!(control_label("arrowup"), "Arrowup");
        assert_eq!(control_label("w"), "W");
    }

    #[test]
    fn bindings_display_both_controls() {
        let bindings = BindingTable::with_defaults();
        assert_eq!(
            bindings.get(Action::MoveForward).unwrap().to_string(),
            "Move forward: W / Arrowup"
        );
        assert_eq!(bindings.get(Action::Jump).unwrap().to_string(), "Jump: Space");
    }

    #[test]
    fn names() {
        assert_eq!(Action::ToggleMenu.to_string(), "toggle-menu");
        assert_eq!(InputContext::Cutscene.to_string(), "cutscene");
        assert_eq!(ActionState::Held.to_string(), "held");
    }
}
