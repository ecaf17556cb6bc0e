// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The gateway hub.
//!
//! A [`Hub`] owns everything that belongs to one configured gateway: the
//! command connection, the [`StateCache`], the observer registry and, when
//! push events are enabled, a second connection feeding the
//! [`EventBridge`].
//!
//! # Examples
//!
//! ```no_run
//! use nhc_hub::hub::{Hub, HubConfig};
//!
//! # async fn example() -> nhc_hub::Result<()> {
//! let hub = Hub::new(HubConfig::parse("Home", "192.168.0.10", 8000)?);
//! hub.connect().await?;
//!
//! for action in hub.actions() {
//!     println!("{} = {:?}", action.name(), hub.get_action_state(action.id().clone()));
//! }
//!
//! hub.execute_action(1u32, 100).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;

pub use config::{
    DEFAULT_NAME, DEFAULT_PORT, DEFAULT_TIMEOUT, HubConfig, MIN_TIME_BETWEEN_UPDATES,
    SCAN_INTERVAL,
};
pub use connection::ConnectionState;
pub(crate) use connection::ConnectionMonitor;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast};

use crate::action::ActionRecord;
use crate::bridge::EventBridge;
use crate::command::{ActionCommand, GatewayRequest};
use crate::error::{ConnectError, Error, ProtocolError};
use crate::event::{EventBus, HubEvent};
use crate::protocol::{GatewayClient, TcpGateway};
use crate::state::{Refresh, StateCache};
use crate::subscription::{ActionCallback, CallbackRegistry, Subscribable};
use crate::types::ActionId;

/// One Niko Home Control gateway.
///
/// The hub is the only owner of its gateway connections. Reads
/// ([`actions`](Self::actions), [`get_action_state`](Self::get_action_state))
/// are served from the cache and never touch the network. Commands are sent
/// as-is and do not change the cache; the new value shows up with the next
/// refresh or push event.
///
/// All methods take `&self`, so a hub can be shared behind an `Arc` by
/// every entity built on it.
pub struct Hub<C: GatewayClient = TcpGateway> {
    config: HubConfig,
    client: RwLock<Option<Arc<C>>>,
    bridge: Mutex<Option<EventBridge>>,
    cache: Arc<StateCache>,
    callbacks: Arc<CallbackRegistry>,
    connection: Arc<ConnectionMonitor>,
}

impl Hub {
    /// Creates an unconnected hub talking TCP to the configured gateway.
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self::with_transport(config)
    }
}

impl<C: GatewayClient> Hub<C> {
    /// Manufacturer reported in device info.
    pub const MANUFACTURER: &'static str = "Niko";

    /// Manufacturer website reported in device info.
    pub const WEBSITE: &'static str = "https://niko.eu";

    /// Creates an unconnected hub using transport `C`.
    #[must_use]
    pub fn with_transport(config: HubConfig) -> Self {
        let connection = Arc::new(ConnectionMonitor::new(EventBus::new(config.name())));
        Self {
            cache: Arc::new(StateCache::new(config.throttle())),
            config,
            client: RwLock::new(None),
            bridge: Mutex::new(None),
            callbacks: Arc::new(CallbackRegistry::new()),
            connection,
        }
    }

    // ========== Identity ==========

    /// Returns the hub identity, which is its configured name.
    #[must_use]
    pub fn hub_id(&self) -> &str {
        self.config.name()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // ========== Connection ==========

    /// Connects to the gateway.
    ///
    /// Opens the command connection, fetches the initial snapshot and, when
    /// events are enabled, opens the event connection and starts the event
    /// bridge. The whole sequence is bounded by the configured timeout.
    /// Connecting an already connected hub replaces its connections.
    ///
    /// The hub never retries on its own; after a failure or a lost
    /// connection the caller decides when to connect again.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Timeout` if the gateway does not answer in
    /// time, `ConnectError::Unreachable` on socket errors, and
    /// `Error::Protocol` if the initial snapshot or event subscription fails.
    pub async fn connect(&self) -> crate::Result<()> {
        self.teardown().await;

        let address = self.config.socket_addr();
        let timeout = self.config.timeout();
        self.connection.transition(ConnectionState::Connecting);

        // A request timing out inside the attempt is the same failure as the
        // attempt itself running out of time.
        let result = match tokio::time::timeout(timeout, self.open(address, timeout)).await {
            Ok(Err(Error::Protocol(ProtocolError::Timeout(_)))) | Err(_) => {
                Err(ConnectError::Timeout {
                    address: address.to_string(),
                    timeout_ms: duration_ms(timeout),
                }
                .into())
            }
            Ok(result) => result,
        };

        if let Err(e) = &result {
            tracing::warn!(hub = %self.hub_id(), %address, error = %e, "Failed to connect to gateway");
            self.teardown().await;
        }
        result
    }

    async fn open(&self, address: SocketAddr, timeout: Duration) -> crate::Result<()> {
        let command = C::connect(address, timeout).await?;
        let events = if self.config.events_enabled() {
            Some(C::connect(address, timeout).await?)
        } else {
            None
        };
        self.establish(command, events).await
    }

    /// Brings the hub up on already opened connections.
    pub(crate) async fn establish(&self, command: C, events: Option<C>) -> crate::Result<()> {
        let command = Arc::new(command);
        if let Refresh::Fetched(count) = self.cache.refresh(command.as_ref(), true).await? {
            self.publish_refresh(count);
        }
        *self.client.write() = Some(command);

        let bridge = match events {
            Some(events) => Some(
                EventBridge::start(
                    Arc::new(events),
                    Arc::clone(&self.cache),
                    Arc::clone(&self.callbacks),
                    Arc::clone(&self.connection),
                )
                .await?,
            ),
            None => None,
        };

        self.connection.transition(ConnectionState::Connected);
        tracing::info!(hub = %self.hub_id(), actions = self.cache.len(), "Connected to gateway");

        if let Some(bridge) = bridge {
            // The stream may have closed before the hub counted as connected.
            if !bridge.is_running() {
                self.connection.connection_lost("event stream closed during setup");
            }
            *self.bridge.lock().await = Some(bridge);
        }
        Ok(())
    }

    /// Stops the event bridge and drops the gateway connections.
    ///
    /// Cached values and registered observers are kept.
    pub async fn disconnect(&self) {
        self.teardown().await;
        tracing::info!(hub = %self.hub_id(), "Disconnected from gateway");
    }

    async fn teardown(&self) {
        let bridge = self.bridge.lock().await.take();
        if let Some(bridge) = bridge {
            bridge.stop().await;
        }
        self.client.write().take();
        self.connection.transition(ConnectionState::Unconnected);
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Returns `true` if the last refresh succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.cache.is_available()
    }

    /// Subscribes to the hub's lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.connection.events().subscribe()
    }

    // ========== State ==========

    /// Returns every known action, in gateway listing order.
    #[must_use]
    pub fn actions(&self) -> Vec<ActionRecord> {
        self.cache.records()
    }

    /// Returns the last known value of an action, `None` if it was never seen.
    #[must_use]
    pub fn get_action_state(&self, id: impl Into<ActionId>) -> Option<u8> {
        self.cache.get(&id.into())
    }

    /// Refreshes the cache unless the last snapshot is still fresh.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` without a connection, or the transport
    /// error of a failed refresh. The cache keeps its values and reports
    /// itself unavailable until the next successful refresh.
    pub async fn async_update(&self) -> crate::Result<Refresh> {
        let client = self.client()?;
        match self.cache.refresh(client.as_ref(), false).await {
            Ok(refresh) => {
                if let Refresh::Fetched(count) = refresh {
                    self.publish_refresh(count);
                }
                Ok(refresh)
            }
            Err(e) => Err(self.protocol_failure(e)),
        }
    }

    /// Returns the shared cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<StateCache> {
        &self.cache
    }

    // ========== Commands ==========

    /// Sets an action to a raw gateway value.
    ///
    /// The cache is not updated; the effect becomes visible once the gateway
    /// reports it.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` without a connection, or the transport
    /// error if the gateway fails or rejects the command.
    pub async fn execute_action(&self, id: impl Into<ActionId>, value: u8) -> crate::Result<()> {
        let id = id.into();
        let client = self.client()?;

        tracing::debug!(hub = %self.hub_id(), %id, value, "Executing action");
        client
            .request(&GatewayRequest::execute(id, value))
            .await
            .map(|_| ())
            .map_err(|e| self.protocol_failure(e))
    }

    /// Sends a typed command to an action.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedCommand` if the action is known and the
    /// command does not fit its type, otherwise as
    /// [`execute_action`](Self::execute_action).
    pub async fn send_command(
        &self,
        id: impl Into<ActionId>,
        command: ActionCommand,
    ) -> crate::Result<()> {
        let id = id.into();
        let known_type = self
            .cache
            .records()
            .into_iter()
            .find(|record| record.id() == &id)
            .map(|record| record.action_type());

        if let Some(action_type) = known_type
            && !command.applies_to(action_type)
        {
            return Err(Error::UnsupportedCommand {
                id: id.to_string(),
                command: command.to_string(),
            });
        }
        self.execute_action(id, command.value1()).await
    }

    pub(crate) fn client(&self) -> crate::Result<Arc<C>> {
        self.client.read().clone().ok_or(Error::NotConnected)
    }

    fn protocol_failure(&self, error: ProtocolError) -> Error {
        if error.is_fatal() {
            self.connection.connection_lost(&error.to_string());
        }
        error.into()
    }

    fn publish_refresh(&self, count: usize) {
        self.connection.events().snapshot_refreshed(count);
    }
}

impl<C: GatewayClient> Subscribable for Hub<C> {
    fn register_callback(&self, id: ActionId, callback: &ActionCallback) -> bool {
        self.callbacks.register(id, callback)
    }

    fn remove_callback(&self, id: &ActionId, callback: &ActionCallback) -> bool {
        self.callbacks.remove(id, callback)
    }
}

impl<C: GatewayClient> std::fmt::Debug for Hub<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("hub_id", &self.hub_id())
            .field("address", &self.config.socket_addr())
            .field("state", &self.connection.state())
            .field("actions", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_ms(duration: Duration) -> u64 {
    // Configured timeouts are seconds, far below u64::MAX milliseconds.
    duration.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::action::ActionUpdate;
    use crate::protocol::mock::{MockGateway, raw};
    use crate::subscription::callback;
    use crate::types::{ActionType, Brightness};

    fn config() -> HubConfig {
        HubConfig::parse("Home", "127.0.0.1", 8000).unwrap()
    }

    fn gateway() -> (MockGateway, tokio::sync::mpsc::UnboundedSender<String>) {
        MockGateway::new(vec![raw(1, "Lamp", 1, 0), raw(2, "Blind", 4, 50)])
    }

    async fn connected() -> (Hub<MockGateway>, tokio::sync::mpsc::UnboundedSender<String>) {
        let hub = Hub::<MockGateway>::with_transport(config());
        let (command, _) = gateway();
        let (events, feed) = gateway();
        hub.establish(command, Some(events)).await.unwrap();
        (hub, feed)
    }

    async fn settle<F: Fn() -> bool>(condition: F) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[test]
    fn new_hub_is_unconnected() {
        let hub = Hub::new(config());
        assert_eq!(hub.hub_id(), "Home");
        assert_eq!(hub.connection_state(), ConnectionState::Unconnected);
        assert!(!hub.is_available());
        assert!(hub.actions().is_empty());
        assert_eq!(Hub::<TcpGateway>::MANUFACTURER, "Niko");
    }

    #[tokio::test]
    async fn establish_loads_snapshot() {
        let (hub, _feed) = connected().await;

        assert_eq!(hub.connection_state(), ConnectionState::Connected);
        assert!(hub.is_available());

        let actions = hub.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name(), "Lamp");
        assert_eq!(actions[1].action_type(), ActionType::Cover);
        assert_eq!(hub.get_action_state(2u32), Some(50));
        assert_eq!(hub.get_action_state(9u32), None);

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn push_event_updates_state_without_refresh() {
        let (hub, feed) = connected().await;

        feed.send(r#"{"event":"listactions","data":[{"id":2,"value1":0}]}"#.to_string())
            .unwrap();
        settle(|| hub.get_action_state(2u32) == Some(0)).await;

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn execute_does_not_touch_cache() {
        let (hub, _feed) = connected().await;

        hub.execute_action(1u32, 100).await.unwrap();
        assert_eq!(hub.get_action_state(1u32), Some(0));

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn execute_sends_wire_request() {
        let hub = Hub::<MockGateway>::with_transport(config().with_events(false));
        let (command, _feed) = gateway();
        hub.establish(command, None).await.unwrap();

        hub.send_command(2u32, ActionCommand::StopCover).await.unwrap();
        hub.send_command(1u32, ActionCommand::TurnOn).await.unwrap();

        let client = hub.client().unwrap();
        assert_eq!(
            client.sent(),
            vec![
                r#"{"cmd":"executeactions","id":2,"value1":253}"#,
                r#"{"cmd":"executeactions","id":1,"value1":100}"#,
            ]
        );
    }

    #[tokio::test]
    async fn send_command_rejects_mismatched_type() {
        let (hub, _feed) = connected().await;

        let result = hub.send_command(2u32, ActionCommand::TurnOn).await;
        assert!(matches!(result, Err(Error::UnsupportedCommand { .. })));

        let result = hub
            .send_command(1u32, ActionCommand::SetBrightness(Brightness::clamped(40)))
            .await;
        assert!(matches!(result, Err(Error::UnsupportedCommand { .. })));

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn commands_need_a_connection() {
        let hub = Hub::<MockGateway>::with_transport(config());
        assert!(matches!(
            hub.execute_action(1u32, 0).await,
            Err(Error::NotConnected)
        ));
        assert!(matches!(hub.async_update().await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn failed_command_reports_connection_loss_once() {
        let (hub, _feed) = connected().await;
        let mut events = hub.subscribe();
        hub.client().unwrap().fail_commands(true);

        assert!(hub.execute_action(1u32, 0).await.is_err());
        assert!(hub.execute_action(1u32, 0).await.is_err());

        assert_eq!(hub.connection_state(), ConnectionState::Disconnected);
        assert!(events.try_recv().unwrap().is_disconnect());
        assert!(events.try_recv().is_err());

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn closed_event_stream_disconnects_hub() {
        let (hub, feed) = connected().await;
        let mut events = hub.subscribe();

        drop(feed);

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(event.is_disconnect());
        assert_eq!(hub.connection_state(), ConnectionState::Disconnected);

        hub.disconnect().await;
        assert_eq!(hub.connection_state(), ConnectionState::Unconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn async_update_is_throttled() {
        let hub = Hub::<MockGateway>::with_transport(config().with_events(false));
        let (command, _feed) = gateway();
        hub.establish(command, None).await.unwrap();
        let client = hub.client().unwrap();
        assert_eq!(client.list_calls(), 1);

        assert_eq!(hub.async_update().await.unwrap(), Refresh::Throttled);
        assert_eq!(client.list_calls(), 1);

        tokio::time::advance(MIN_TIME_BETWEEN_UPDATES).await;
        client.set_actions(vec![raw(1, "Lamp", 1, 100), raw(2, "Blind", 4, 50)]);
        assert_eq!(hub.async_update().await.unwrap(), Refresh::Fetched(2));
        assert_eq!(hub.get_action_state(1u32), Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_update_marks_hub_unavailable() {
        let hub = Hub::<MockGateway>::with_transport(config().with_events(false));
        let (command, _feed) = gateway();
        hub.establish(command, None).await.unwrap();
        let client = hub.client().unwrap();

        tokio::time::advance(MIN_TIME_BETWEEN_UPDATES).await;
        client.fail_listing(true);
        assert!(hub.async_update().await.is_err());
        assert!(!hub.is_available());
        assert_eq!(hub.get_action_state(2u32), Some(50));
        assert_eq!(hub.connection_state(), ConnectionState::Connected);

        client.fail_listing(false);
        assert!(hub.async_update().await.is_ok());
        assert!(hub.is_available());
    }

    #[tokio::test]
    async fn failed_initial_snapshot_fails_establish() {
        let hub = Hub::<MockGateway>::with_transport(config().with_events(false));
        let (command, _feed) = gateway();
        command.fail_listing(true);

        let result = hub.establish(command, None).await;
        assert!(matches!(result, Err(Error::Protocol(ProtocolError::Timeout(_)))));
        assert!(!hub.is_available());
    }

    #[tokio::test]
    async fn connect_reports_unreachable_gateway() {
        let hub = Hub::<MockGateway>::with_transport(config());
        let result = hub.connect().await;

        assert!(matches!(
            result,
            Err(Error::Connect(ConnectError::Unreachable(_)))
        ));
        assert_eq!(hub.connection_state(), ConnectionState::Unconnected);
    }

    #[tokio::test]
    async fn observers_receive_pushed_updates() {
        let (hub, feed) = connected().await;
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let observer = callback(move |update: &ActionUpdate| {
            assert_eq!(update.id, ActionId::from(1u32));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(hub.register_callback(ActionId::from(1u32), &observer));
        assert!(!hub.register_callback(ActionId::from(1u32), &observer));

        feed.send(r#"{"event":"listactions","data":[{"id":1,"value1":100}]}"#.to_string())
            .unwrap();
        settle(|| seen.load(Ordering::SeqCst) == 1).await;

        assert!(hub.remove_callback(&ActionId::from(1u32), &observer));
        assert!(!hub.remove_callback(&ActionId::from(1u32), &observer));

        hub.disconnect().await;
    }

    #[tokio::test]
    async fn refresh_is_published() {
        let hub = Hub::<MockGateway>::with_transport(config().with_events(false));
        let mut events = hub.subscribe();
        let (command, _feed) = gateway();
        hub.establish(command, None).await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            HubEvent::SnapshotRefreshed {
                hub_id: "Home".to_string(),
                count: 2,
            }
        );
        assert!(matches!(
            events.try_recv().unwrap(),
            HubEvent::ConnectionChanged {
                state: ConnectionState::Connected,
                ..
            }
        ));
    }
}
