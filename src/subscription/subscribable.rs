// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that deliver per-action updates.

use crate::subscription::ActionCallback;
use crate::types::ActionId;

/// Trait for types that notify observers about action updates.
///
/// Implemented by [`Hub`](crate::hub::Hub). Observers only receive updates
/// while the hub's event bridge is running; without it they still see new
/// values through polling.
///
/// # Examples
///
/// ```no_run
/// use nhc_hub::hub::{Hub, HubConfig};
/// use nhc_hub::subscription::{Subscribable, callback};
/// use nhc_hub::types::ActionId;
///
/// # async fn example() -> nhc_hub::Result<()> {
/// let hub = Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?);
/// hub.connect().await?;
///
/// let observer = callback(|update| println!("blind at {}", update.value));
/// hub.register_callback(ActionId::from(2u32), &observer);
///
/// // Later
/// hub.remove_callback(&ActionId::from(2u32), &observer);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Registers an observer for one action.
    ///
    /// Registering the same observer twice for one action has no effect.
    /// Returns `false` in that case.
    fn register_callback(&self, id: ActionId, callback: &ActionCallback) -> bool;

    /// Removes an observer from one action.
    ///
    /// Returns `true` if the observer was registered; removing an unknown
    /// observer is not an error.
    fn remove_callback(&self, id: &ActionId, callback: &ActionCallback) -> bool;
}
