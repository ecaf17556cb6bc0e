// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory gateway used by unit tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::action::RawAction;
use crate::error::{ConnectError, ProtocolError};
use crate::protocol::GatewayClient;

/// Gateway double with a scripted action listing and an event feed.
///
/// A failing listing times out (transient); failing commands report a
/// closed connection (fatal).
///
/// Dropping the [`mpsc::UnboundedSender`] returned by [`MockGateway::new`]
/// closes the event stream.
#[derive(Debug)]
pub(crate) struct MockGateway {
    actions: Mutex<Vec<RawAction>>,
    fail_listing: AtomicBool,
    fail_commands: AtomicBool,
    list_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl MockGateway {
    pub(crate) fn new(actions: Vec<RawAction>) -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Self {
            actions: Mutex::new(actions),
            fail_listing: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            events: tokio::sync::Mutex::new(rx),
        };
        (gateway, tx)
    }

    pub(crate) fn set_actions(&self, actions: Vec<RawAction>) {
        *self.actions.lock() = actions;
    }

    pub(crate) fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

/// Builds a raw action the way the gateway lists it.
pub(crate) fn raw(id: u32, name: &str, kind: u8, value1: u8) -> RawAction {
    RawAction {
        id: id.into(),
        name: name.to_string(),
        kind,
        location: None,
        value1,
    }
}

impl GatewayClient for MockGateway {
    async fn connect(_address: SocketAddr, _timeout: Duration) -> Result<Self, ConnectError> {
        Err(ConnectError::Unreachable(std::io::Error::other(
            "mock gateway cannot dial",
        )))
    }

    async fn send(&self, command: &str) -> Result<String, ProtocolError> {
        self.sent.lock().push(command.to_string());
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionClosed);
        }
        let request: serde_json::Value = serde_json::from_str(command)
            .map_err(|e| ProtocolError::Malformed(e.into()))?;
        let name = request
            .get("cmd")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        Ok(format!(r#"{{"cmd":"{name}","data":{{"error":0}}}}"#))
    }

    async fn receive(&self) -> Result<Option<String>, ProtocolError> {
        Ok(self.events.lock().await.recv().await)
    }

    async fn list_actions_raw(&self) -> Result<Vec<RawAction>, ProtocolError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ProtocolError::Timeout(20_000));
        }
        Ok(self.actions.lock().clone())
    }
}
