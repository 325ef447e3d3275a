//! The set of currently active [`InputContext`]s.

use bevy::utils::HashSet;

use crate::action::InputContext;

/// Decides which bindings are live: a binding is live only while its context is enabled.
///
/// The gate starts empty and changes only through explicit calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextGate {
    enabled: HashSet<InputContext>,
}

impl ContextGate {
    /// Enables `context`. Enabling an enabled context does nothing.
    #[inline]
    pub fn enable(&mut self, context: InputContext) {
        self.enabled.insert(context);
    }

    /// Disables `context`. Disabling a disabled context does nothing.
    #[inline]
    pub fn disable(&mut self, context: InputContext) {
        self.enabled.remove(&context);
    }

    /// Disables every context.
    #[inline]
    pub fn disable_all(&mut self) {
        self.enabled.clear();
    }

    /// Is `context` currently enabled?
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, context: InputContext) -> bool {
        self.enabled.contains(&context)
    }

    /// Iterates over the enabled contexts, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = InputContext> + '_ {
        self.enabled.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let gate = ContextGate::default();
        for context in InputContext::ALL {
            assert!(!gate.is_enabled(context));
        }
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let mut gate = ContextGate::default();

        gate.disable(InputContext::Menu);
        assert!(!gate.is_enabled(InputContext::Menu));

        gate.enable(InputContext::Player);
        gate.enable(InputContext::Player);
        assert!(gate.is_enabled(InputContext::Player));
        assert_eq!(gate.iter().count(), 1);

        gate.disable(InputContext::Player);
        assert!(!gate.is_enabled(InputContext::Player));
    }

    #[test]
    fn disable_all_clears_everything() {
        let mut gate = ContextGate::default();
        for context in InputContext::ALL {
            gate.enable(context);
        }

        gate.disable_all();
        assert_eq!(gate.iter().count(), 0);
    }
}
