// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport to the Niko Home Control gateway.
//!
//! The gateway speaks JSON over a plain TCP socket. Everything above this
//! module only relies on the [`GatewayClient`] trait, so the transport can be
//! swapped (for instance by an in-memory gateway in tests).
//!
//! # Transports
//!
//! - [`TcpGateway`]: one line-delimited JSON connection to the gateway
//!
//! # Messages
//!
//! [`GatewayMessage`] parses what comes back: command responses carry a
//! `cmd` field, push events an `event` field.

mod message;
#[cfg(test)]
pub(crate) mod mock;
mod tcp;

pub use message::GatewayMessage;
pub use tcp::TcpGateway;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use crate::action::RawAction;
use crate::command::GatewayRequest;
use crate::error::{ConnectError, ProtocolError};

/// A connection to the gateway.
///
/// Implementations must be usable from several tasks at once: request and
/// response pairs are serialized internally.
pub trait GatewayClient: Send + Sync + 'static {
    /// Opens a connection to the gateway.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::Timeout` if the socket is not established
    /// within `timeout`, `ConnectError::Unreachable` on socket errors.
    fn connect(
        address: SocketAddr,
        timeout: Duration,
    ) -> impl Future<Output = Result<Self, ConnectError>> + Send
    where
        Self: Sized;

    /// Sends one command line and returns the gateway's response line.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the exchange fails or times out.
    fn send(&self, command: &str) -> impl Future<Output = Result<String, ProtocolError>> + Send;

    /// Waits for the next unsolicited message.
    ///
    /// Returns `Ok(None)` once the gateway has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if reading from the connection fails.
    fn receive(&self) -> impl Future<Output = Result<Option<String>, ProtocolError>> + Send;

    /// Sends a request and checks the gateway's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::CommandRejected` if the gateway reports an
    /// error code, `ProtocolError::Malformed` if the response cannot be
    /// parsed or answers a different command.
    fn request(
        &self,
        request: &GatewayRequest,
    ) -> impl Future<Output = Result<GatewayMessage, ProtocolError>> + Send {
        async move {
            let line = request.to_line()?;
            let response = self.send(&line).await?;
            let message = GatewayMessage::parse(&response)?;
            message.expect_response(request.name())?;
            message.check_ack()?;
            Ok(message)
        }
    }

    /// Lists every action with its current value.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or the listing is malformed.
    fn list_actions_raw(&self) -> impl Future<Output = Result<Vec<RawAction>, ProtocolError>> + Send {
        async move {
            let message = self.request(&GatewayRequest::ListActions).await?;
            Ok(message.into_actions()?)
        }
    }
}
