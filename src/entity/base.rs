// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State shared by every entity kind.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::action::{ActionRecord, ActionUpdate};
use crate::command::ActionCommand;
use crate::hub::Hub;
use crate::protocol::GatewayClient;
use crate::subscription::{ActionCallback, Subscribable, callback};
use crate::types::ActionId;

#[derive(Debug, Clone, Copy)]
struct Observed {
    value: u8,
    available: bool,
}

/// One action seen through its hub.
///
/// The observed value is shared with the push callback registered by
/// [`attach`](Self::attach), so it changes both on [`update`](Self::update)
/// and on pushed events.
pub(crate) struct EntityCore<C: GatewayClient> {
    hub: Arc<Hub<C>>,
    record: ActionRecord,
    unique_id: String,
    observed: Arc<RwLock<Observed>>,
    observer: Mutex<Option<ActionCallback>>,
}

impl<C: GatewayClient> EntityCore<C> {
    pub(crate) fn new(hub: Arc<Hub<C>>, record: ActionRecord, prefix: &str) -> Self {
        let value = hub.get_action_state(record.id().clone()).unwrap_or(record.value());
        let observed = Observed {
            value,
            available: hub.is_available(),
        };
        Self {
            unique_id: format!("{prefix}-{}", record.id()),
            hub,
            record,
            observed: Arc::new(RwLock::new(observed)),
            observer: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> &ActionId {
        self.record.id()
    }

    pub(crate) fn record(&self) -> &ActionRecord {
        &self.record
    }

    pub(crate) fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub(crate) fn value(&self) -> u8 {
        self.observed.read().value
    }

    pub(crate) fn is_available(&self) -> bool {
        self.observed.read().available
    }

    pub(crate) async fn update(&self) {
        let available = match self.hub.async_update().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(entity = %self.unique_id, error = %e, "Failed to update entity");
                false
            }
        };

        let mut observed = self.observed.write();
        if let Some(value) = self.hub.get_action_state(self.id().clone()) {
            observed.value = value;
        }
        observed.available = available && self.hub.is_available();
    }

    pub(crate) fn attach(&self) -> bool {
        let mut slot = self.observer.lock();
        if slot.is_some() {
            return false;
        }

        let observed = Arc::clone(&self.observed);
        let observer = callback(move |update: &ActionUpdate| {
            let mut observed = observed.write();
            observed.value = update.value;
            observed.available = true;
        });
        self.hub.register_callback(self.id().clone(), &observer);
        *slot = Some(observer);
        true
    }

    pub(crate) fn detach(&self) -> bool {
        match self.observer.lock().take() {
            Some(observer) => self.hub.remove_callback(self.id(), &observer),
            None => false,
        }
    }

    pub(crate) async fn send(&self, command: ActionCommand) -> crate::Result<()> {
        tracing::debug!(entity = %self.unique_id, %command, "Sending entity command");
        self.hub.send_command(self.id().clone(), command).await
    }
}

impl<C: GatewayClient> Drop for EntityCore<C> {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.get_mut().take() {
            self.hub.remove_callback(self.record.id(), &observer);
        }
    }
}

impl<C: GatewayClient> std::fmt::Debug for EntityCore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCore")
            .field("unique_id", &self.unique_id)
            .field("observed", &*self.observed.read())
            .finish_non_exhaustive()
    }
}
