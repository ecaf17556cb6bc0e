// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-platform entities built from a hub's actions.
//!
//! Each supported action becomes one entity: on/off and dimmable actions
//! become [`LightEntity`], covers become [`CoverEntity`]. Actions of unknown
//! type are skipped.
//!
//! Entities hold the hub they were built from and read their state from its
//! cache. A host typically calls [`Entity::update`] every
//! [`SCAN_INTERVAL`](crate::hub::SCAN_INTERVAL) and [`Entity::attach`]es
//! each entity to receive pushed updates in between.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nhc_hub::entity::{EntityFilter, setup_entities};
//! use nhc_hub::hub::{Hub, HubConfig};
//!
//! # async fn example() -> nhc_hub::Result<()> {
//! let hub = Arc::new(Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?));
//! hub.connect().await?;
//!
//! for entity in setup_entities(&hub, EntityFilter::default()) {
//!     entity.attach();
//!     println!("{} ({})", entity.name(), entity.unique_id());
//! }
//! # Ok(())
//! # }
//! ```

mod base;
mod cover;
mod light;

pub use cover::CoverEntity;
pub use light::LightEntity;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hub::Hub;
use crate::protocol::{GatewayClient, TcpGateway};
use crate::types::{ActionId, ActionType};

/// Which kinds of entities to create.
///
/// Deserializes from the stored `{"lights": bool, "covers": bool}` choice;
/// missing keys default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityFilter {
    /// Create light entities.
    pub lights: bool,
    /// Create cover entities.
    pub covers: bool,
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self {
            lights: true,
            covers: true,
        }
    }
}

/// Any entity built from a hub action.
#[derive(Debug)]
pub enum Entity<C: GatewayClient = TcpGateway> {
    /// A switched or dimmable light.
    Light(LightEntity<C>),
    /// A shutter or blind.
    Cover(CoverEntity<C>),
}

impl<C: GatewayClient> Entity<C> {
    /// Returns the action id.
    #[must_use]
    pub fn id(&self) -> &ActionId {
        match self {
            Self::Light(light) => light.id(),
            Self::Cover(cover) => cover.id(),
        }
    }

    /// Returns the unique id.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Light(light) => light.unique_id(),
            Self::Cover(cover) => cover.unique_id(),
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Light(light) => light.name(),
            Self::Cover(cover) => cover.name(),
        }
    }

    /// Returns `true` if the last update reached the gateway.
    #[must_use]
    pub fn is_available(&self) -> bool {
        match self {
            Self::Light(light) => light.is_available(),
            Self::Cover(cover) => cover.is_available(),
        }
    }

    /// Returns the light, if this is one.
    #[must_use]
    pub fn as_light(&self) -> Option<&LightEntity<C>> {
        match self {
            Self::Light(light) => Some(light),
            Self::Cover(_) => None,
        }
    }

    /// Returns the cover, if this is one.
    #[must_use]
    pub fn as_cover(&self) -> Option<&CoverEntity<C>> {
        match self {
            Self::Cover(cover) => Some(cover),
            Self::Light(_) => None,
        }
    }

    /// Refreshes the hub and reads this entity's state.
    pub async fn update(&self) {
        match self {
            Self::Light(light) => light.update().await,
            Self::Cover(cover) => cover.update().await,
        }
    }

    /// Starts following pushed updates.
    pub fn attach(&self) -> bool {
        match self {
            Self::Light(light) => light.attach(),
            Self::Cover(cover) => cover.attach(),
        }
    }

    /// Stops following pushed updates.
    pub fn detach(&self) -> bool {
        match self {
            Self::Light(light) => light.detach(),
            Self::Cover(cover) => cover.detach(),
        }
    }
}

/// Builds one entity per supported action of `hub`.
///
/// Actions are visited in gateway listing order.
#[must_use]
pub fn setup_entities<C: GatewayClient>(hub: &Arc<Hub<C>>, filter: EntityFilter) -> Vec<Entity<C>> {
    let mut entities = Vec::new();
    for record in hub.actions() {
        let entity = match record.action_type() {
            ActionType::OnOff | ActionType::Dimmable if filter.lights => {
                LightEntity::new(Arc::clone(hub), record).map(Entity::Light)
            }
            ActionType::Cover if filter.covers => {
                CoverEntity::new(Arc::clone(hub), record).map(Entity::Cover)
            }
            ActionType::Unknown(code) => {
                tracing::debug!(id = %record.id(), code, "Skipping action of unsupported type");
                None
            }
            _ => None,
        };
        entities.extend(entity);
    }
    tracing::debug!(hub = %hub.hub_id(), count = entities.len(), "Set up entities");
    entities
}
