// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub lifecycle events.
//!
//! Every [`Hub`](crate::hub::Hub) owns an [`EventBus`] that broadcasts
//! [`HubEvent`]s: connection transitions, refreshed snapshots and pushed
//! action updates. The host platform listens here to learn that a gateway
//! connection was lost and schedule a reload.
//!
//! # Examples
//!
//! ```no_run
//! use nhc_hub::event::HubEvent;
//! use nhc_hub::hub::{Hub, HubConfig};
//!
//! # async fn example() -> nhc_hub::Result<()> {
//! let hub = Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?);
//! let mut events = hub.subscribe();
//! hub.connect().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     if event.is_disconnect() {
//!         println!("{} lost its gateway, reloading", event.hub_id());
//!         break;
//!     }
//!     if let HubEvent::ActionUpdated { update, .. } = event {
//!         println!("{} -> {}", update.id, update.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod event_bus;
mod hub_event;

pub use event_bus::EventBus;
pub use hub_event::HubEvent;
