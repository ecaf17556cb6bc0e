// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-hub broadcast of lifecycle events.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::HubEvent;
use crate::action::ActionUpdate;
use crate::hub::ConnectionState;

/// Events kept for a subscriber before it starts lagging.
const BACKLOG: usize = 256;

/// Broadcast channel carrying one hub's [`HubEvent`]s.
///
/// The bus is created with the identity of its hub and stamps it on every
/// event it emits, so events from several hubs can be merged by the host.
/// A subscriber that falls more than 256 events behind gets
/// `RecvError::Lagged` and resumes with the oldest retained event.
#[derive(Debug)]
pub struct EventBus {
    hub_id: Arc<str>,
    sender: broadcast::Sender<HubEvent>,
}

impl EventBus {
    /// Creates the bus of the hub named `hub_id`.
    #[must_use]
    pub fn new(hub_id: impl Into<Arc<str>>) -> Self {
        let (sender, _) = broadcast::channel(BACKLOG);
        Self {
            hub_id: hub_id.into(),
            sender,
        }
    }

    /// Returns the identity of the hub this bus belongs to.
    #[must_use]
    pub fn hub_id(&self) -> &str {
        &self.hub_id
    }

    /// Returns a receiver for every event emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn connection_changed(&self, state: ConnectionState, error: Option<&str>) {
        self.emit(HubEvent::ConnectionChanged {
            hub_id: self.hub_id.to_string(),
            state,
            error: error.map(str::to_string),
        });
    }

    pub(crate) fn snapshot_refreshed(&self, count: usize) {
        self.emit(HubEvent::SnapshotRefreshed {
            hub_id: self.hub_id.to_string(),
            count,
        });
    }

    pub(crate) fn action_updated(&self, update: ActionUpdate) {
        self.emit(HubEvent::ActionUpdated {
            hub_id: self.hub_id.to_string(),
            update,
        });
    }

    fn emit(&self, event: HubEvent) {
        // Nobody listening is the normal case for a hub without a host.
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(hub = %self.hub_id, event = ?event, "No subscriber for hub event");
        }
    }
}
