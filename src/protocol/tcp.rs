// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport for the gateway.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::error::{ConnectError, ProtocolError};
use crate::protocol::{GatewayClient, GatewayMessage};

/// Line terminator used by the gateway.
const LINE_END: &[u8] = b"\r\n";

/// Longest line accepted from the gateway, in bytes.
const MAX_LINE_LEN: usize = 256 * 1024;

/// One TCP connection to the gateway.
///
/// Each request is written as a single JSON line; the next non-empty line
/// read back is its response. The read half is locked for the whole
/// exchange so concurrent callers never steal each other's responses.
///
/// The gateway answers requests in order. A response that arrives after its
/// request timed out is discarded by the next request, as is any response
/// naming another command.
///
/// Lines that are not UTF-8 or longer than 256 KiB are skipped.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use nhc_hub::protocol::{GatewayClient, TcpGateway};
///
/// # async fn example() -> nhc_hub::Result<()> {
/// let gateway = TcpGateway::connect("192.168.0.10:8000".parse().unwrap(), Duration::from_secs(20))
///     .await?;
/// let actions = gateway.list_actions_raw().await?;
/// println!("{} actions", actions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpGateway {
    address: SocketAddr,
    timeout: Duration,
    reader: Mutex<LineReader>,
    writer: Mutex<OwnedWriteHalf>,
}

#[derive(Debug)]
struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    /// Timed out requests whose responses have not been read yet.
    stale: usize,
}

impl LineReader {
    fn new(read_half: OwnedReadHalf) -> Self {
        Self {
            inner: BufReader::new(read_half),
            stale: 0,
        }
    }

    /// Reads the next line, `None` on end of stream.
    async fn next_line(&mut self) -> Result<Option<String>, ProtocolError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = self.read_chunk(&mut buf).await?;
            if read == 0 {
                return Ok(None);
            }
            if buf.len() == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
                tracing::debug!(limit = MAX_LINE_LEN, "Discarding oversized gateway line");
                self.skip_line().await?;
                continue;
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => return Ok(Some(line.trim_end().to_string())),
                Err(e) => tracing::debug!(error = %e, "Discarding gateway line that is not UTF-8"),
            }
        }
    }

    /// Appends at most one bounded line to `buf`.
    async fn read_chunk(&mut self, buf: &mut Vec<u8>) -> Result<usize, ProtocolError> {
        let mut limited = (&mut self.inner).take(MAX_LINE_LEN as u64);
        Ok(limited.read_until(b'\n', buf).await?)
    }

    /// Drops the remainder of an oversized line.
    async fn skip_line(&mut self) -> Result<(), ProtocolError> {
        let mut chunk = Vec::new();
        loop {
            chunk.clear();
            let read = self.read_chunk(&mut chunk).await?;
            if read == 0 || chunk.last() == Some(&b'\n') {
                return Ok(());
            }
        }
    }

    /// Reads lines until the response to `expected` arrives.
    ///
    /// Events, late responses to timed out requests and responses to other
    /// commands are skipped.
    async fn read_response(&mut self, expected: Option<&str>) -> Result<String, ProtocolError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Err(ProtocolError::ConnectionClosed);
            };
            if line.is_empty() {
                continue;
            }

            let answered = match GatewayMessage::parse(&line) {
                Ok(message) if message.is_event() => {
                    tracing::debug!(line = %line, "Skipping event on command connection");
                    continue;
                }
                Ok(message) => message.command().map(str::to_string),
                Err(_) => None,
            };
            let other_command = matches!(
                (expected, answered.as_deref()),
                (Some(want), Some(got)) if want != got
            );

            if other_command || self.stale > 0 {
                self.stale = self.stale.saturating_sub(1);
                tracing::debug!(response = %line, "Discarding late gateway response");
                continue;
            }
            return Ok(line);
        }
    }
}

impl TcpGateway {
    /// Returns the gateway address.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[allow(clippy::cast_possible_truncation)]
    fn timeout_ms(&self) -> u64 {
        // Configured timeouts are seconds, far below u64::MAX milliseconds.
        self.timeout.as_millis() as u64
    }

    async fn write_line(&self, line: &str) -> Result<(), ProtocolError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(LINE_END).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Shuts down the write half, signalling the gateway to close.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Io` if the shutdown fails.
    pub async fn shutdown(&self) -> Result<(), ProtocolError> {
        self.writer.lock().await.shutdown().await?;
        Ok(())
    }
}

impl GatewayClient for TcpGateway {
    async fn connect(address: SocketAddr, timeout: Duration) -> Result<Self, ConnectError> {
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = timeout.as_millis() as u64;

        tracing::debug!(%address, timeout_ms, "Connecting to gateway");

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ConnectError::Unreachable(e)),
            Err(_) => {
                return Err(ConnectError::Timeout {
                    address: address.to_string(),
                    timeout_ms,
                });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!(error = %e, "Failed to set TCP_NODELAY");
        }

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            address,
            timeout,
            reader: Mutex::new(LineReader::new(read_half)),
            writer: Mutex::new(write_half),
        })
    }

    async fn send(&self, command: &str) -> Result<String, ProtocolError> {
        let expected = GatewayMessage::parse(command)
            .ok()
            .and_then(|request| request.command().map(str::to_string));
        let mut reader = self.reader.lock().await;

        tracing::debug!(address = %self.address, command = %command, "Sending gateway command");
        self.write_line(command).await?;

        let Ok(response) =
            tokio::time::timeout(self.timeout, reader.read_response(expected.as_deref())).await
        else {
            reader.stale += 1;
            tracing::debug!(address = %self.address, stale = reader.stale, "Gateway response timed out");
            return Err(ProtocolError::Timeout(self.timeout_ms()));
        };
        let response = response?;

        tracing::debug!(address = %self.address, response = %response, "Received gateway response");
        Ok(response)
    }

    async fn receive(&self) -> Result<Option<String>, ProtocolError> {
        self.reader.lock().await.next_line().await
    }
}
