// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-action observer callbacks.
//!
//! Observers register interest in one action id and are called with every
//! pushed [`ActionUpdate`](crate::action::ActionUpdate) for it.
//!
//! # Overview
//!
//! - [`ActionCallback`] - A shared observer closure; its identity is the `Arc`
//! - [`CallbackRegistry`] - Maps action ids to observers and dispatches updates
//! - [`Subscribable`] - Trait for types exposing the registry
//!
//! Registration has set semantics: adding the same callback twice for one id
//! keeps a single entry, and removing a callback that is not registered does
//! nothing.
//!
//! ```
//! use nhc_hub::subscription::{CallbackRegistry, callback};
//! use nhc_hub::types::ActionId;
//!
//! let registry = CallbackRegistry::new();
//! let observer = callback(|update| println!("{} -> {}", update.id, update.value));
//!
//! registry.register(ActionId::from(5u32), &observer);
//! registry.register(ActionId::from(5u32), &observer);
//! assert_eq!(registry.callback_count(), 1);
//!
//! registry.remove(&ActionId::from(5u32), &observer);
//! assert!(registry.is_empty());
//! ```

mod callback;
mod subscribable;

pub use callback::{ActionCallback, CallbackRegistry, callback};
pub use subscribable::Subscribable;
