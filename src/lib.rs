// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `nhc_hub` - A Rust library to integrate Niko Home Control gateways.
//!
//! This library keeps a cached view of every action (light, dimmer, cover)
//! known to a Niko Home Control gateway, refreshes it on demand, and applies
//! the gateway's push events as they arrive.
//!
//! # Supported Features
//!
//! - **State cache**: Throttled snapshot refresh with an availability flag
//! - **Push events**: A second connection streams value changes into the cache
//! - **Observers**: Per-action callbacks fired for every pushed update
//! - **Commands**: Raw `value1` execution and a typed light/cover vocabulary
//! - **Entities**: Light and cover views ready for a home-automation host
//!
//! # Quick Start
//!
//! ## Connecting a Hub
//!
//! ```no_run
//! use nhc_hub::hub::{Hub, HubConfig};
//! use nhc_hub::command::ActionCommand;
//!
//! #[tokio::main]
//! async fn main() -> nhc_hub::Result<()> {
//!     let hub = Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?);
//!     hub.connect().await?;
//!
//!     for action in hub.actions() {
//!         println!("{} [{}]", action.name(), action.action_type());
//!     }
//!
//!     hub.send_command(2u32, ActionCommand::OpenCover).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Observing Pushed Updates
//!
//! ```no_run
//! use nhc_hub::hub::{Hub, HubConfig};
//! use nhc_hub::subscription::{Subscribable, callback};
//! use nhc_hub::types::ActionId;
//!
//! #[tokio::main]
//! async fn main() -> nhc_hub::Result<()> {
//!     let hub = Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?);
//!     hub.connect().await?;
//!
//!     let observer = callback(|update| println!("{} -> {}", update.id, update.value));
//!     hub.register_callback(ActionId::from(1u32), &observer);
//!
//!     let mut events = hub.subscribe();
//!     while let Ok(event) = events.recv().await {
//!         if event.is_disconnect() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Several Gateways
//!
//! ```no_run
//! use nhc_hub::entity::{EntityFilter, setup_entities};
//! use nhc_hub::hub::HubConfig;
//! use nhc_hub::registry::HubRegistry;
//!
//! #[tokio::main]
//! async fn main() -> nhc_hub::Result<()> {
//!     let registry = HubRegistry::new();
//!     let entry = registry
//!         .setup_entry(HubConfig::parse("Home", "192.168.0.10", 8000)?)
//!         .await?;
//!
//!     if let Some(hub) = registry.get(entry).await {
//!         let entities = setup_entities(&hub, EntityFilter::default());
//!         println!("{} entities", entities.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod bridge;
pub mod command;
pub mod entity;
pub mod error;
pub mod event;
pub mod hub;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod subscription;
pub mod types;

pub use action::{ActionRecord, ActionUpdate, RawAction};
pub use command::ActionCommand;
pub use entity::{CoverEntity, Entity, EntityFilter, LightEntity, setup_entities};
pub use error::{
    ConfigError, ConnectError, Error, ParseError, ProtocolError, Result, ValueError,
};
pub use event::{EventBus, HubEvent};
pub use hub::{ConnectionState, Hub, HubConfig};
pub use protocol::{GatewayClient, TcpGateway};
pub use registry::{EntryId, HubRegistry};
pub use state::{Refresh, StateCache};
pub use subscription::{ActionCallback, CallbackRegistry, Subscribable};
pub use types::{ActionId, ActionType, Brightness};
