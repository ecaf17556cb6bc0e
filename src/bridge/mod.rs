// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push-event bridge.
//!
//! The bridge turns the gateway's event stream into cache updates and
//! observer notifications. It runs two tasks joined by a bounded queue:
//!
//! ```text
//! gateway --receive()--> listener --mpsc(10)--> dispatcher --> StateCache
//!                                                         \--> CallbackRegistry
//!                                                         \--> EventBus
//! ```
//!
//! The listener only reads lines. When the queue is full it waits, so a slow
//! observer slows the socket reads down instead of losing messages. The
//! dispatcher handles one message at a time, which keeps updates for the
//! same action in arrival order.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::command::GatewayRequest;
use crate::error::ProtocolError;
use crate::hub::ConnectionMonitor;
use crate::protocol::{GatewayClient, GatewayMessage};
use crate::state::StateCache;
use crate::subscription::CallbackRegistry;

/// Number of received messages buffered between the two tasks.
const QUEUE_CAPACITY: usize = 10;

/// Running push-event bridge for one gateway connection.
///
/// Dropping the bridge without calling [`stop`](Self::stop) also ends the
/// listener, but does not wait for it.
#[derive(Debug)]
pub struct EventBridge {
    shutdown: watch::Sender<bool>,
    listener: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl EventBridge {
    /// Subscribes to push events and spawns the bridge tasks.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the gateway does not acknowledge the
    /// subscription.
    pub(crate) async fn start<C: GatewayClient>(
        client: Arc<C>,
        cache: Arc<StateCache>,
        callbacks: Arc<CallbackRegistry>,
        connection: Arc<ConnectionMonitor>,
    ) -> Result<Self, ProtocolError> {
        client.request(&GatewayRequest::StartEvents).await?;
        tracing::debug!(hub = %connection.hub_id(), "Subscribed to gateway events");

        let (tx, rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
        let (shutdown, shutdown_rx) = watch::channel(false);

        let listener = tokio::spawn(listen(client, tx, shutdown_rx, Arc::clone(&connection)));
        let dispatcher = tokio::spawn(dispatch(rx, cache, callbacks, connection));

        Ok(Self {
            shutdown,
            listener,
            dispatcher,
        })
    }

    /// Returns `true` while the listener is still reading.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.listener.is_finished()
    }

    /// Stops reading and waits for queued messages to be dispatched.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.listener.await {
            tracing::warn!(error = %e, "Event listener task failed");
        }
        if let Err(e) = self.dispatcher.await {
            tracing::warn!(error = %e, "Event dispatcher task failed");
        }
    }
}

/// Reads the event stream until shutdown or connection loss.
async fn listen<C: GatewayClient>(
    client: Arc<C>,
    tx: mpsc::Sender<String>,
    mut shutdown: watch::Receiver<bool>,
    connection: Arc<ConnectionMonitor>,
) {
    loop {
        let received = tokio::select! {
            _ = shutdown.changed() => break,
            received = client.receive() => received,
        };

        match received {
            Ok(Some(line)) => {
                // Waits here while the queue is full.
                let queued = tokio::select! {
                    _ = shutdown.changed() => break,
                    queued = tx.send(line) => queued,
                };
                if queued.is_err() {
                    connection.connection_lost("event dispatcher stopped");
                    break;
                }
            }
            Ok(None) => {
                connection.connection_lost("connection closed by gateway");
                break;
            }
            Err(e) if !e.is_fatal() => {
                tracing::debug!(error = %e, "Skipping unreadable gateway message");
            }
            Err(e) => {
                connection.connection_lost(&e.to_string());
                break;
            }
        }
    }
    tracing::debug!(hub = %connection.hub_id(), "Event listener stopped");
}

/// Applies queued messages in order until the listener goes away.
async fn dispatch(
    mut rx: mpsc::Receiver<String>,
    cache: Arc<StateCache>,
    callbacks: Arc<CallbackRegistry>,
    connection: Arc<ConnectionMonitor>,
) {
    while let Some(line) = rx.recv().await {
        handle_line(&line, &cache, &callbacks, &connection);
    }
    tracing::debug!(hub = %connection.hub_id(), "Event dispatcher stopped");
}

fn handle_line(
    line: &str,
    cache: &StateCache,
    callbacks: &CallbackRegistry,
    connection: &ConnectionMonitor,
) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let updates = match GatewayMessage::parse(line).and_then(|message| message.action_updates()) {
        Ok(updates) => updates,
        Err(e) => {
            tracing::debug!(error = %e, line = %line, "Discarding malformed gateway message");
            return;
        }
    };

    for update in updates {
        let previous = cache.apply_update(&update);
        let notified = callbacks.dispatch(&update);
        tracing::trace!(
            id = %update.id,
            value = update.value,
            previous = ?previous,
            notified,
            "Applied pushed update"
        );
        connection.events().action_updated(update);
    }
}
