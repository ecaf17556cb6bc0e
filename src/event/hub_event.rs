// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub event types.

use crate::action::ActionUpdate;
use crate::hub::ConnectionState;

/// Events emitted by a hub.
///
/// All events carry the `hub_id` of the emitting hub so listeners shared
/// between several hubs can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// The hub's connection state changed.
    ConnectionChanged {
        /// The emitting hub.
        hub_id: String,
        /// The new state.
        state: ConnectionState,
        /// Why the connection was lost, if it was.
        error: Option<String>,
    },

    /// A full snapshot was fetched from the gateway.
    SnapshotRefreshed {
        /// The emitting hub.
        hub_id: String,
        /// Number of listed actions.
        count: usize,
    },

    /// The gateway pushed a new value for an action.
    ActionUpdated {
        /// The emitting hub.
        hub_id: String,
        /// The new value.
        update: ActionUpdate,
    },
}

impl HubEvent {
    /// Returns the id of the hub that emitted this event.
    #[must_use]
    pub fn hub_id(&self) -> &str {
        match self {
            Self::ConnectionChanged { hub_id, .. }
            | Self::SnapshotRefreshed { hub_id, .. }
            | Self::ActionUpdated { hub_id, .. } => hub_id,
        }
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionChanged { .. })
    }

    /// Returns `true` if this event reports a lost connection.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::ConnectionChanged {
                state: ConnectionState::Disconnected,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_id_from_every_variant() {
        let events = [
            HubEvent::ConnectionChanged {
                hub_id: "a".to_string(),
                state: ConnectionState::Connected,
                error: None,
            },
            HubEvent::SnapshotRefreshed {
                hub_id: "a".to_string(),
                count: 1,
            },
            HubEvent::ActionUpdated {
                hub_id: "a".to_string(),
                update: ActionUpdate::new(1u32, 0),
            },
        ];
        assert!(events.iter().all(|e| e.hub_id() == "a"));
    }

    #[test]
    fn disconnect_detection() {
        let lost = HubEvent::ConnectionChanged {
            hub_id: "a".to_string(),
            state: ConnectionState::Disconnected,
            error: Some("connection closed by gateway".to_string()),
        };
        assert!(lost.is_connection());
        assert!(lost.is_disconnect());

        let up = HubEvent::ConnectionChanged {
            hub_id: "a".to_string(),
            state: ConnectionState::Connected,
            error: None,
        };
        assert!(!up.is_disconnect());
    }
}
