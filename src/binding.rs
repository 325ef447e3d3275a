//! Maps each [`Action`] to the physical controls that trigger it.

use serde::{Deserialize, Serialize};

use crate::action::{Action, InputContext};
use crate::raw_inputs::{normalize_control, MOUSE_MOTION_TOKEN};

/// The mapping of a single [`Action`] to one or two physical controls.
///
/// Controls are stored as normalized control tokens (see [`normalize_control`]).
/// Two actions may share a control: a press of that control triggers both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// The action this binding triggers
    pub action: Action,
    /// The main control for this action
    pub primary_control: String,
    /// An optional alternative control for this action
    #[serde(default)]
    pub secondary_control: Option<String>,
    /// The context that must be enabled for this binding to be live
    pub context: InputContext,
    /// A human-readable label, suitable for a rebinding menu
    pub description: String,
    /// Can the player change this binding?
    pub rebindable: bool,
}

impl Binding {
    /// Is `control` one of the controls of this binding?
    #[inline]
    #[must_use]
    pub fn uses_control(&self, control: &str) -> bool {
        self.primary_control == control || self.secondary_control.as_deref() == Some(control)
    }

    /// Iterates over the primary control and, if set, the secondary control.
    pub fn controls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_control.as_str()).chain(self.secondary_control.as_deref())
    }
}

/// A row of the immutable default binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultBinding {
    /// See [`Binding::action`]
    pub action: Action,
    /// See [`Binding::primary_control`]
    pub primary_control: &'static str,
    /// See [`Binding::secondary_control`]
    pub secondary_control: Option<&'static str>,
    /// See [`Binding::context`]
    pub context: InputContext,
    /// See [`Binding::description`]
    pub description: &'static str,
    /// See [`Binding::rebindable`]
    pub rebindable: bool,
}

impl DefaultBinding {
    const fn new(
        action: Action,
        primary_control: &'static str,
        secondary_control: Option<&'static str>,
        context: InputContext,
        description: &'static str,
        rebindable: bool,
    ) -> Self {
        Self {
            action,
            primary_control,
            secondary_control,
            context,
            description,
            rebindable,
        }
    }

    /// Produces an independent, owned copy of this row.
    #[must_use]
    pub fn to_binding(&self) -> Binding {
        Binding {
            action: self.action,
            primary_control: self.primary_control.to_string(),
            secondary_control: self.secondary_control.map(str::to_string),
            context: self.context,
            description: self.description.to_string(),
            rebindable: self.rebindable,
        }
    }
}

/// The bindings shipped with the game.
///
/// Every [`Action`] has exactly one row.
pub const DEFAULT_BINDINGS: &[DefaultBinding] = &DEFAULT_ROWS;

const DEFAULT_ROWS: [DefaultBinding; Action::N_VARIANTS] = {
    use Action::*;
    use InputContext::*;

    [
        DefaultBinding::new(MoveForward, "w", Some("arrowup"), Player, "Move forward", true),
        DefaultBinding::new(MoveBackward, "s", Some("arrowdown"), Player, "Move backward", true),
        DefaultBinding::new(MoveLeft, "a", Some("arrowleft"), Player, "Move left", true),
        DefaultBinding::new(MoveRight, "d", Some("arrowright"), Player, "Move right", true),
        DefaultBinding::new(Jump, " ", None, Player, "Jump", true),
        DefaultBinding::new(Sprint, "shift", None, Player, "Sprint", true),
        DefaultBinding::new(Crouch, "c", Some("control"), Player, "Crouch", true),
        DefaultBinding::new(Interact, "e", None, Player, "Interact", true),
        DefaultBinding::new(Fire, "mouse0", None, Player, "Fire", true),
        DefaultBinding::new(Aim, "mouse2", None, Player, "Aim", true),
        DefaultBinding::new(Grapple, "q", None, Player, "Grapple", true),
        DefaultBinding::new(Reload, "r", None, Player, "Reload", true),
        DefaultBinding::new(Look, MOUSE_MOTION_TOKEN, None, Player, "Look around", false),
        DefaultBinding::new(Inventory, "i", Some("tab"), Player, "Open inventory", true),
        DefaultBinding::new(ToggleMenu, "escape", None, Menu, "Open / close menu", false),
        DefaultBinding::new(UiConfirm, "enter", None, Ui, "Confirm", true),
        DefaultBinding::new(UiBack, "backspace", None, Ui, "Back", true),
        DefaultBinding::new(DialogAdvance, " ", Some("enter"), Dialog, "Continue dialog", true),
        DefaultBinding::new(SkipCutscene, "escape", None, Cutscene, "Skip cutscene", false),
        DefaultBinding::new(Accelerate, "w", Some("arrowup"), Vehicle, "Accelerate", true),
        DefaultBinding::new(Brake, "s", Some("arrowdown"), Vehicle, "Brake / reverse", true),
        DefaultBinding::new(SteerLeft, "a", Some("arrowleft"), Vehicle, "Steer left", true),
        DefaultBinding::new(SteerRight, "d", Some("arrowright"), Vehicle, "Steer right", true),
        DefaultBinding::new(ExitVehicle, "f", None, Vehicle, "Exit vehicle", true),
    ]
};

/// The current [`Binding`] of every action, keyed by action.
///
/// Each action has at most one binding: inserting a binding for an action
/// that already has one replaces it.
///
/// All queries return owned copies. Mutation goes through [`BindingTable::rebind`],
/// [`BindingTable::reset_to_defaults`] and [`BindingTable::import_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    // Kept in insertion order for export
    bindings: Vec<Binding>,
}

impl BindingTable {
    /// Creates a table populated from [`DEFAULT_BINDINGS`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut table = Self::default();
        table.reset_to_defaults();
        table
    }

    /// Discards every binding and repopulates the table from [`DEFAULT_BINDINGS`].
    pub fn reset_to_defaults(&mut self) {
        self.bindings.clear();
        for row in DEFAULT_BINDINGS {
            self.insert(row.to_binding());
        }
    }

    /// Inserts `binding`, replacing any existing binding for the same action.
    pub fn insert(&mut self, binding: Binding) {
        match self.position(binding.action) {
            Some(index) => self.bindings[index] = binding,
            None => self.bindings.push(binding),
        }
    }

    /// A copy of the current binding of `action`, if it has one.
    #[must_use]
    pub fn get(&self, action: Action) -> Option<Binding> {
        self.get_ref(action).cloned()
    }

    /// Does `action` currently have a binding?
    #[inline]
    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.position(action).is_some()
    }

    /// Changes the controls of `action`.
    ///
    /// Returns `false`, leaving the table untouched, if the action has no binding,
    /// if its binding is not rebindable, or if `primary` is empty.
    /// Otherwise both controls are normalized and committed;
    /// the context, description and rebindable flag are preserved.
    pub fn rebind(&mut self, action: Action, primary: &str, secondary: Option<&str>) -> bool {
        if primary.is_empty() {
            return false;
        }

        let Some(binding) = self
            .bindings
            .iter_mut()
            .find(|binding| binding.action == action)
        else {
            return false;
        };

        if !binding.rebindable {
            return false;
        }

        binding.primary_control = normalize_control(primary);
        binding.secondary_control = secondary
            .filter(|control| !control.is_empty())
            .map(normalize_control);
        true
    }

    /// Copies every binding, in insertion order.
    #[must_use]
    pub fn export_all(&self) -> Vec<Binding> {
        self.bindings.clone()
    }

    /// Wholesale replaces the binding of every action that already has one.
    ///
    /// Incoming bindings for actions without a current binding are ignored:
    /// saved data never grows the table.
    /// Incoming controls are normalized, and an empty secondary control is dropped.
    pub fn import_all(&mut self, bindings: impl IntoIterator<Item = Binding>) {
        for mut binding in bindings {
            let Some(index) = self.position(binding.action) else {
                continue;
            };

            binding.primary_control = normalize_control(&binding.primary_control);
            binding.secondary_control = binding
                .secondary_control
                .filter(|control| !control.is_empty())
                .map(|control| normalize_control(&control));
            self.bindings[index] = binding;
        }
    }

    /// Iterates over the bindings that use `control`, in insertion order.
    pub fn bound_to<'a>(&'a self, control: &'a str) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings
            .iter()
            .filter(move |binding| binding.uses_control(control))
    }

    /// Iterates over every binding, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// The number of actions with a binding.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Is the table empty?
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn get_ref(&self, action: Action) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.action == action)
    }

    fn position(&self, action: Action) -> Option<usize> {
        self.bindings
            .iter()
            .position(|binding| binding.action == action)
    }
}
