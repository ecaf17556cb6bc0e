// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback storage and dispatch.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::action::ActionUpdate;
use crate::types::ActionId;

/// Observer called with every pushed update for the actions it watches.
///
/// Two registrations are the same observer when they share the same `Arc`.
/// Callbacks run on the event dispatch task and must return quickly.
pub type ActionCallback = Arc<dyn Fn(&ActionUpdate) + Send + Sync>;

/// Wraps a closure into an [`ActionCallback`].
pub fn callback<F>(f: F) -> ActionCallback
where
    F: Fn(&ActionUpdate) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Registry of observers keyed by action id.
///
/// Uses `parking_lot::RwLock` for interior mutability. The lock is released
/// before callbacks run, so a callback may register or remove observers.
#[derive(Default)]
pub struct CallbackRegistry {
    callbacks: RwLock<HashMap<ActionId, Vec<ActionCallback>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for one action.
    ///
    /// Returns `false` if this observer was already registered for `id`.
    pub fn register(&self, id: ActionId, callback: &ActionCallback) -> bool {
        let mut callbacks = self.callbacks.write();
        let observers = callbacks.entry(id).or_default();
        if observers.iter().any(|existing| Arc::ptr_eq(existing, callback)) {
            return false;
        }
        observers.push(Arc::clone(callback));
        true
    }

    /// Removes an observer from one action.
    ///
    /// Returns `true` if the observer was registered.
    pub fn remove(&self, id: &ActionId, callback: &ActionCallback) -> bool {
        let mut callbacks = self.callbacks.write();
        let Some(observers) = callbacks.get_mut(id) else {
            return false;
        };
        let before = observers.len();
        observers.retain(|existing| !Arc::ptr_eq(existing, callback));
        let removed = observers.len() != before;
        if observers.is_empty() {
            callbacks.remove(id);
        }
        removed
    }

    /// Calls every observer registered for the update's action.
    ///
    /// Observers run synchronously in registration order. A panicking
    /// observer is logged and skipped; the others still run. Returns how many
    /// were called.
    pub fn dispatch(&self, update: &ActionUpdate) -> usize {
        let observers = match self.callbacks.read().get(&update.id) {
            Some(observers) => observers.clone(),
            None => return 0,
        };
        for observer in &observers {
            if catch_unwind(AssertUnwindSafe(|| observer(update))).is_err() {
                tracing::warn!(id = %update.id, value = update.value, "Observer callback panicked");
            }
        }
        observers.len()
    }

    /// Returns the number of observers registered for one action.
    #[must_use]
    pub fn count_for(&self, id: &ActionId) -> usize {
        self.callbacks.read().get(id).map_or(0, Vec::len)
    }

    /// Returns the total number of registrations.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
