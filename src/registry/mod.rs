// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ownership of configured hubs.
//!
//! The host platform keeps one [`HubRegistry`] and sets up one entry per
//! configured gateway. Each entry gets a generated [`EntryId`] that is
//! passed explicitly to whatever needs the hub, such as
//! [`setup_entities`](crate::entity::setup_entities).
//!
//! # Examples
//!
//! ```no_run
//! use nhc_hub::hub::HubConfig;
//! use nhc_hub::registry::HubRegistry;
//!
//! # async fn example() -> nhc_hub::Result<()> {
//! let registry = HubRegistry::new();
//! let entry = registry
//!     .setup_entry(HubConfig::parse("Home", "192.168.0.10", 8000)?)
//!     .await?;
//!
//! let hub = registry.get(entry).await.expect("just set up");
//! println!("{} actions", hub.actions().len());
//!
//! registry.unload_entry(entry).await?;
//! # Ok(())
//! # }
//! ```

mod entry_id;

pub use entry_id::EntryId;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::Error;
use crate::hub::{Hub, HubConfig};
use crate::protocol::{GatewayClient, TcpGateway};

/// Owner of every configured hub, keyed by [`EntryId`].
pub struct HubRegistry<C: GatewayClient = TcpGateway> {
    hubs: RwLock<HashMap<EntryId, Arc<Hub<C>>>>,
}

impl HubRegistry {
    /// Creates an empty registry of TCP hubs.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport()
    }
}

impl<C: GatewayClient> HubRegistry<C> {
    /// Creates an empty registry for hubs using transport `C`.
    #[must_use]
    pub fn with_transport() -> Self {
        Self {
            hubs: RwLock::new(HashMap::new()),
        }
    }

    /// Connects a hub for `config` and registers it.
    ///
    /// Nothing is registered if the connection fails.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Hub::connect`].
    pub async fn setup_entry(&self, config: HubConfig) -> crate::Result<EntryId> {
        let hub = Hub::<C>::with_transport(config);
        hub.connect().await?;
        Ok(self.add_hub(Arc::new(hub)).await)
    }

    /// Registers an already built hub.
    pub async fn add_hub(&self, hub: Arc<Hub<C>>) -> EntryId {
        let entry = EntryId::new();
        tracing::debug!(%entry, hub = %hub.hub_id(), "Registered hub");
        self.hubs.write().await.insert(entry, hub);
        entry
    }

    /// Returns the hub registered under `entry`.
    pub async fn get(&self, entry: EntryId) -> Option<Arc<Hub<C>>> {
        self.hubs.read().await.get(&entry).cloned()
    }

    /// Disconnects and removes a hub.
    ///
    /// Entities still holding the hub keep their last known state.
    ///
    /// # Errors
    ///
    /// Returns `Error::EntryNotFound` if nothing is registered under `entry`.
    pub async fn unload_entry(&self, entry: EntryId) -> crate::Result<()> {
        let hub = self
            .hubs
            .write()
            .await
            .remove(&entry)
            .ok_or(Error::EntryNotFound)?;
        hub.disconnect().await;
        tracing::debug!(%entry, hub = %hub.hub_id(), "Unloaded hub");
        Ok(())
    }

    /// Returns every registered entry.
    pub async fn entries(&self) -> Vec<EntryId> {
        self.hubs.read().await.keys().copied().collect()
    }

    /// Returns the entry of the hub named `hub_id`, if one is registered.
    pub async fn find(&self, hub_id: &str) -> Option<EntryId> {
        self.hubs
            .read()
            .await
            .iter()
            .find(|(_, hub)| hub.hub_id() == hub_id)
            .map(|(entry, _)| *entry)
    }

    /// Returns the number of registered hubs.
    pub async fn len(&self) -> usize {
        self.hubs.read().await.len()
    }

    /// Returns `true` if no hub is registered.
    pub async fn is_empty(&self) -> bool {
        self.hubs.read().await.is_empty()
    }
}

impl<C: GatewayClient> Default for HubRegistry<C> {
    fn default() -> Self {
        Self::with_transport()
    }
}

impl<C: GatewayClient> std::fmt::Debug for HubRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::hub::ConnectionState;
    use crate::protocol::mock::{MockGateway, raw};

    async fn connected_hub(name: &str) -> Arc<Hub<MockGateway>> {
        let config = HubConfig::parse(name, "127.0.0.1", 8000)
            .unwrap()
            .with_events(false);
        let hub = Hub::<MockGateway>::with_transport(config);
        let (command, _feed) = MockGateway::new(vec![raw(1, "Lamp", 1, 0)]);
        hub.establish(command, None).await.unwrap();
        Arc::new(hub)
    }

    #[tokio::test]
    async fn add_get_and_unload() {
        let registry = HubRegistry::<MockGateway>::with_transport();
        let hub = connected_hub("Home").await;

        let entry = registry.add_hub(Arc::clone(&hub)).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.entries().await, vec![entry]);
        assert_eq!(registry.get(entry).await.unwrap().hub_id(), "Home");

        registry.unload_entry(entry).await.unwrap();
        assert!(registry.is_empty().await);
        assert!(registry.get(entry).await.is_none());
        assert_eq!(hub.connection_state(), ConnectionState::Unconnected);
    }

    #[tokio::test]
    async fn unload_unknown_entry() {
        let registry = HubRegistry::<MockGateway>::with_transport();
        assert!(matches!(
            registry.unload_entry(EntryId::new()).await,
            Err(Error::EntryNotFound)
        ));
    }

    #[tokio::test]
    async fn hubs_with_same_name_get_distinct_entries() {
        let registry = HubRegistry::<MockGateway>::with_transport();
        let first = registry.add_hub(connected_hub("Home").await).await;
        let second = registry.add_hub(connected_hub("Home").await).await;

        assert_ne!(first, second);
        assert_eq!(registry.len().await, 2);
        assert!(registry.find("Home").await.is_some());
        assert!(registry.find("Office").await.is_none());
    }

    #[tokio::test]
    async fn failed_setup_registers_nothing() {
        let registry = HubRegistry::<MockGateway>::with_transport();
        let config = HubConfig::parse("Home", "127.0.0.1", 8000).unwrap();

        assert!(registry.setup_entry(config).await.is_err());
        assert!(registry.is_empty().await);
    }
}
