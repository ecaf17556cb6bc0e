// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub connection state machine.

use std::fmt;

use parking_lot::RwLock;

use crate::event::EventBus;

/// Connection state of a hub.
///
/// ```text
/// Unconnected -> Connecting -> Connected -> Disconnected
///      ^             |                          |
///      +-------------+------- connect() --------+
/// ```
///
/// A hub only leaves `Disconnected` through a new `connect()` call; there is
/// no automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected yet, or disconnected on request.
    #[default]
    Unconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// Connected and serving requests.
    Connected,
    /// The connection was lost.
    Disconnected,
}

impl ConnectionState {
    /// Returns `true` when connected.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconnected => "unconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Shared view of a hub's connection, used by the hub and its event bridge.
///
/// Every transition is published on the hub's [`EventBus`]. A lost
/// connection is reported only on the first `Connected -> Disconnected`
/// transition.
#[derive(Debug)]
pub(crate) struct ConnectionMonitor {
    state: RwLock<ConnectionState>,
    events: EventBus,
}

impl ConnectionMonitor {
    pub(crate) fn new(events: EventBus) -> Self {
        Self {
            state: RwLock::new(ConnectionState::Unconnected),
            events,
        }
    }

    pub(crate) fn hub_id(&self) -> &str {
        self.events.hub_id()
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub(crate) fn events(&self) -> &EventBus {
        &self.events
    }

    /// Moves to `state`, publishing the change if there was one.
    pub(crate) fn transition(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous == state {
            return;
        }
        tracing::info!(hub = %self.hub_id(), from = %previous, to = %state, "Hub connection state changed");
        self.events.connection_changed(state, None);
    }

    /// Records a fatal connection loss.
    ///
    /// Returns `true` if this call reported the loss, `false` if the hub was
    /// not connected (already lost, or disconnected on request).
    pub(crate) fn connection_lost(&self, reason: &str) -> bool {
        {
            let mut state = self.state.write();
            if *state != ConnectionState::Connected {
                return false;
            }
            *state = ConnectionState::Disconnected;
        }
        tracing::warn!(hub = %self.hub_id(), reason = %reason, "Lost connection to gateway");
        self.events
            .connection_changed(ConnectionState::Disconnected, Some(reason));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::event::HubEvent;

    #[test]
    fn default_state_is_unconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Unconnected);
        assert!(!ConnectionState::Unconnected.is_connected());
        assert!(ConnectionState::Connected.is_connected());
    }

    #[test]
    fn transition_publishes_changes_only() {
        let monitor = ConnectionMonitor::new(EventBus::new("Home"));
        let mut rx = monitor.events().subscribe();

        monitor.transition(ConnectionState::Connecting);
        monitor.transition(ConnectionState::Connecting);
        monitor.transition(ConnectionState::Connected);

        let first = rx.try_recv().unwrap();
        assert_eq!(
            first,
            HubEvent::ConnectionChanged {
                hub_id: "Home".to_string(),
                state: ConnectionState::Connecting,
                error: None,
            }
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            HubEvent::ConnectionChanged {
                state: ConnectionState::Connected,
                ..
            }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn loss_is_reported_once() {
        let monitor = ConnectionMonitor::new(EventBus::new("Home"));
        let mut rx = monitor.events().subscribe();
        monitor.transition(ConnectionState::Connected);
        let _ = rx.try_recv();

        assert!(monitor.connection_lost("connection closed by gateway"));
        assert!(!monitor.connection_lost("connection closed by gateway"));
        assert_eq!(monitor.state(), ConnectionState::Disconnected);

        let event = rx.try_recv().unwrap();
        assert!(event.is_disconnect());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn loss_ignored_when_not_connected() {
        let monitor = ConnectionMonitor::new(EventBus::new("Home"));
        assert!(!monitor.connection_lost("late error"));
        assert_eq!(monitor.state(), ConnectionState::Unconnected);
    }

    #[test]
    fn display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }
}
