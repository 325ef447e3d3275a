//! Per-action sets of handler callbacks, and the [`Subscription`]s that remove them.
//!
//! Notification iterates over a snapshot of the live handler set,
//! so handlers may unsubscribe themselves (or each other) while being notified.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use bevy::log::error;
use bevy::utils::HashMap;
use parking_lot::RwLock;

use crate::action::Action;
use crate::action_state::{ActionState, ActionValue};
use crate::errors::HandlerError;

/// A callback invoked whenever its action changes state.
///
/// Returning an error, or panicking, is logged and skips only this handler.
pub type ActionHandler =
    dyn Fn(ActionState, ActionValue) -> Result<(), HandlerError> + Send + Sync + 'static;

/// Uniquely identifies a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct HandlerEntry {
    id: HandlerId,
    active: AtomicBool,
    callback: Box<ActionHandler>,
}

type HandlerSets = HashMap<Action, Vec<Arc<HandlerEntry>>>;

/// Owns every registered handler, grouped by action.
#[derive(Default)]
pub struct HandlerRegistry {
    sets: Arc<RwLock<HandlerSets>>,
    next_id: u64,
}

impl HandlerRegistry {
    /// Registers `handler` for `action`, returning the [`Subscription`] that removes it.
    pub fn register<F>(&mut self, action: Action, handler: F) -> Subscription
    where
        F: Fn(ActionState, ActionValue) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;

        let entry = Arc::new(HandlerEntry {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(handler),
        });
        self.sets.write().entry(action).or_default().push(entry.clone());

        Subscription {
            action,
            id,
            entry: Arc::downgrade(&entry),
            sets: Arc::downgrade(&self.sets),
        }
    }

    /// The number of handlers currently registered for `action`.
    #[must_use]
    pub fn count(&self, action: Action) -> usize {
        self.sets.read().get(&action).map_or(0, Vec::len)
    }

    /// Invokes every handler registered for `action`, returning how many were invoked.
    ///
    /// Handlers are invoked in no particular order. A handler that returns an error or panics
    /// is logged and does not prevent the remaining handlers from running.
    /// A handler that is unsubscribed before its turn comes is skipped.
    pub fn notify(&self, action: Action, state: ActionState, value: ActionValue) -> usize {
        // Release the lock before invoking anything, so that handlers can unsubscribe
        let snapshot: Vec<Arc<HandlerEntry>> = match self.sets.read().get(&action) {
            Some(set) => set.clone(),
            None => return 0,
        };

        let mut invoked = 0;
        for entry in snapshot {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }

            invoked += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(state, value))) {
                Ok(Ok(())) => (),
                Ok(Err(err)) => error!(
                    "Handler {:?} for action {action} failed on {state:?}: {err}",
                    entry.id
                ),
                Err(payload) => error!(
                    "Handler {:?} for action {action} panicked on {state:?}: {}",
                    entry.id,
                    panic_message(payload.as_ref())
                ),
            }
        }
        invoked
    }

    /// Removes every handler, for every action.
    ///
    /// Outstanding [`Subscription`]s become inert.
    pub fn clear(&mut self) {
        let mut sets = self.sets.write();
        for entry in sets.values().flatten() {
            entry.active.store(false, Ordering::Release);
        }
        sets.clear();
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sets = self.sets.read();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &sets.values().map(Vec::len).sum::<usize>())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// The capability to remove a single registered handler.
///
/// Dropping a subscription does *not* remove its handler: call [`Subscription::unsubscribe`].
/// Unsubscribing is safe to repeat, and safe after the registry itself is gone.
#[derive(Debug, Clone)]
pub struct Subscription {
    action: Action,
    id: HandlerId,
    entry: Weak<HandlerEntry>,
    sets: Weak<RwLock<HandlerSets>>,
}

impl Subscription {
    /// The action the handler was registered for.
    #[inline]
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// The identity of the handler.
    #[inline]
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Will the handler still be invoked by future dispatches?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entry
            .upgrade()
            .is_some_and(|entry| entry.active.load(Ordering::Acquire))
    }

    /// Removes the handler.
    ///
    /// If a dispatch is currently iterating over the handler's action,
    /// the handler is skipped if its turn has not come yet.
    pub fn unsubscribe(&self) {
        if let Some(entry) = self.entry.upgrade() {
            entry.active.store(false, Ordering::Release);
        }

        let Some(sets) = self.sets.upgrade() else {
            return;
        };
        let mut sets = sets.write();
        if let Some(set) = sets.get_mut(&self.action) {
            set.retain(|entry| entry.id != self.id);
            if set.is_empty() {
                sets.remove(&self.action);
            }
        }
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("id", &self.id)
            .field("active", &self.active.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (
        Arc<AtomicUsize>,
        impl Fn(ActionState, ActionValue) -> Result<(), HandlerError> + Send + Sync,
    ) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move |_, _| {
            handle.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn all_handlers_are_notified() {
        let mut registry = HandlerRegistry::default();
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();
        registry.register(Action::Jump, first_handler);
        registry.register(Action::Jump, second_handler);

        let invoked = registry.notify(Action::Jump, ActionState::Pressed, ActionValue::Digital);

        assert_eq!(invoked, 2);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.notify(Action::Fire, ActionState::Pressed, ActionValue::Digital), 0);
    }

    #[test]
    fn failing_handlers_are_isolated() {
        let mut registry = HandlerRegistry::default();
        let (count, handler) = counter();
        registry.register(Action::Jump, |_, _| Err("boom".into()));
        registry.register(Action::Jump, handler);
        registry.register(Action::Jump, |_, _| Err("bang".into()));

        assert_eq!(
            registry.notify(Action::Jump, ActionState::Pressed, ActionValue::Digital),
            3
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_handlers_are_isolated() {
        let mut registry = HandlerRegistry::default();
        let (before, before_handler) = counter();
        let (after, after_handler) = counter();
        registry.register(Action::Fire, before_handler);
        registry.register(Action::Fire, |_, _| panic!("out of ammo"));
        registry.register(Action::Fire, after_handler);

        let invoked = registry.notify(Action::Fire, ActionState::Pressed, ActionValue::Digital);

        assert_eq!(invoked, 3);
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panic_messages() {
        let static_message: Box<dyn Any + Send> = Box::new("static");
        let owned_message: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(static_message.as_ref()), "static");
        assert_eq!(panic_message(owned_message.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut registry = HandlerRegistry::default();
        let (count, handler) = counter();
        let subscription = registry.register(Action::Jump, handler);
        assert!(subscription.is_active());

        subscription.unsubscribe();
        subscription.unsubscribe();

        assert!(!subscription.is_active());
        assert_eq!(registry.count(Action::Jump), 0);
        registry.notify(Action::Jump, ActionState::Pressed, ActionValue::Digital);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_after_registry_is_dropped() {
        let mut registry = HandlerRegistry::default();
        let subscription = registry.register(Action::Jump, |_, _| Ok(()));
        drop(registry);

        subscription.unsubscribe();
        assert!(!subscription.is_active());
    }

    #[test]
    fn unsubscribing_mid_dispatch_skips_pending_handlers() {
        let mut registry = HandlerRegistry::default();
        let victim: Arc<RwLock<Option<Subscription>>> = Arc::default();

        let slot = victim.clone();
        registry.register(Action::Jump, move |_, _| {
            if let Some(subscription) = slot.read().as_ref() {
                subscription.unsubscribe();
            }
            Ok(())
        });
        let (count, handler) = counter();
        *victim.write() = Some(registry.register(Action::Jump, handler));

        // The first handler is registered first, so it removes the second before its turn
        let invoked = registry.notify(Action::Jump, ActionState::Pressed, ActionValue::Digital);

        assert_eq!(invoked, 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(registry.count(Action::Jump), 1);
    }

    #[test]
    fn clear_deactivates_subscriptions() {
        let mut registry = HandlerRegistry::default();
        let subscription = registry.register(Action::Jump, |_, _| Ok(()));

        registry.clear();

        assert!(!subscription.is_active());
        assert_eq!(registry.count(Action::Jump), 0);
    }
}
