//! Finds physical controls that are bound to more than one [`Action`].
//!
//! Sharing a control is allowed: a single press notifies every action bound to it
//! whose context is enabled. This report lets a rebinding menu warn about it.

use itertools::Itertools;

use crate::action::{Action, InputContext};
use crate::binding::BindingTable;

/// A control token bound to two or more actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedControl {
    /// The shared control token
    pub control: String,
    /// The actions bound to it, with the context each one belongs to, in table order
    pub actions: Vec<(Action, InputContext)>,
}

impl SharedControl {
    /// Do at least two of the sharing actions belong to the same context?
    ///
    /// When they do, one press of the control fires all of them at once.
    #[must_use]
    pub fn clashes(&self) -> bool {
        self.actions.iter().map(|(_, context)| context).duplicates().next().is_some()
    }

    /// Does this control trigger `action`?
    #[must_use]
    pub fn involves(&self, action: Action) -> bool {
        self.actions.iter().any(|(shared, _)| *shared == action)
    }

    /// Finds every shared control in `bindings`, sorted by control token.
    #[must_use]
    pub fn find_all(bindings: &BindingTable) -> Vec<SharedControl> {
        bindings
            .iter()
            .flat_map(|binding| {
                binding
                    .controls()
                    .unique()
                    .map(move |control| (control.to_string(), (binding.action, binding.context)))
            })
            .into_group_map()
            .into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(control, actions)| SharedControl { control, actions })
            .sorted_by(|a, b| a.control.cmp(&b.control))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_share_keys_across_contexts_only() {
        let shared = SharedControl::find_all(&BindingTable::with_defaults());

        let w = shared.iter().find(|shared| shared.control == "w").unwrap();
        assert_eq!(
            w.actions,
            vec![
                (Action::MoveForward, InputContext::Player),
                (Action::Accelerate, InputContext::Vehicle),
            ]
        );
        assert!(!w.clashes());
        assert!(shared.iter().all(|shared| !shared.clashes()));
    }

    #[test]
    fn same_context_sharing_clashes() {
        let mut bindings = BindingTable::with_defaults();
        assert!(bindings.rebind(Action::Grapple, "mouse2", None));

        let shared = SharedControl::find_all(&bindings);
        let mouse2 = shared
            .iter()
            .find(|shared| shared.control == "mouse2")
            .unwrap();

        assert!(mouse2.clashes());
        assert!(mouse2.involves(Action::Aim));
        assert!(mouse2.involves(Action::Grapple));
        assert!(!mouse2.involves(Action::Fire));
    }

    #[test]
    fn primary_and_secondary_on_the_same_control_is_not_shared() {
        let mut bindings = BindingTable::default();
        bindings.insert(crate::binding::Binding {
            action: Action::Jump,
            primary_control: "k".to_string(),
            secondary_control: Some("k".to_string()),
            context: InputContext::Player,
            description: "Jump".to_string(),
            rebindable: true,
        });

        assert!(SharedControl::find_all(&bindings).is_empty());
    }

    #[test]
    fn results_are_sorted() {
        let shared = SharedControl::find_all(&BindingTable::with_defaults());
        let controls: Vec<&str> = shared.iter().map(|shared| shared.control.as_str()).collect();
        let mut sorted = controls.clone();
        sorted.sort_unstable();
        assert_eq!(controls, sorted);
    }
}
