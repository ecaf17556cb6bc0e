// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `nhc_hub` library.
//!
//! Failures are grouped by concern: configuration validation, connection
//! establishment, transport communication, response parsing and value
//! validation. All of them fold into the top-level [`Error`].

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The hub configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The gateway connection could not be established.
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),

    /// Communication with the gateway failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A gateway response could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A value is outside its allowed range.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The hub has no live gateway connection.
    #[error("hub is not connected")]
    NotConnected,

    /// The command does not fit the action's device type.
    #[error("cannot {command} action {id}")]
    UnsupportedCommand {
        /// The targeted action.
        id: String,
        /// The rejected command.
        command: String,
    },

    /// No hub is registered under the given entry.
    #[error("hub entry not found")]
    EntryNotFound,
}

impl Error {
    /// Returns `true` if the error means the gateway connection is gone.
    ///
    /// Timeouts and rejected commands are transient; a closed or broken
    /// socket is not.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_fatal())
    }
}

/// Errors raised while validating a hub configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The host is not a valid IP address literal.
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// The port is outside 0-65535.
    #[error("invalid port: {0}")]
    InvalidPort(i64),

    /// The gateway did not accept a probe connection.
    #[error("cannot connect: {0}")]
    CannotConnect(String),
}

/// Errors raised while establishing the gateway connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The gateway did not respond within the configured timeout.
    #[error("timed out connecting to {address} after {timeout_ms} ms")]
    Timeout {
        /// The `host:port` that was being connected to.
        address: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// A socket-level error prevented the connection.
    #[error("gateway unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
}

/// Errors related to communication with the gateway.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading from or writing to the socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The gateway did not answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The gateway closed the connection.
    #[error("connection closed by gateway")]
    ConnectionClosed,

    /// The gateway acknowledged a command with a non-zero error code.
    #[error("command {command} rejected with error code {code}")]
    CommandRejected {
        /// The rejected command name.
        command: String,
        /// The error code reported by the gateway.
        code: i64,
    },

    /// The gateway answered but the answer could not be understood.
    #[error("malformed response: {0}")]
    Malformed(#[from] ParseError),
}

impl ProtocolError {
    /// Returns `true` if the underlying connection can no longer be used.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::ConnectionClosed)
    }
}

/// Errors related to parsing gateway messages.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the message.
    #[error("missing field in message: {0}")]
    MissingField(String),

    /// The message does not have the expected shape.
    #[error("unexpected message format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::InvalidHost("nas.local".to_string()).to_string(),
            "invalid host: nas.local"
        );
        assert_eq!(ConfigError::InvalidPort(70000).to_string(), "invalid port: 70000");
    }

    #[test]
    fn connect_timeout_display() {
        let err = ConnectError::Timeout {
            address: "192.168.0.10:8000".to_string(),
            timeout_ms: 20_000,
        };
        assert_eq!(
            err.to_string(),
            "timed out connecting to 192.168.0.10:8000 after 20000 ms"
        );
    }

    #[test]
    fn fatal_protocol_errors() {
        assert!(ProtocolError::ConnectionClosed.is_fatal());
        assert!(ProtocolError::Io(std::io::Error::other("reset")).is_fatal());
        assert!(!ProtocolError::Timeout(1000).is_fatal());
        assert!(
            !ProtocolError::CommandRejected {
                command: "executeactions".to_string(),
                code: 1,
            }
            .is_fatal()
        );
    }

    #[test]
    fn connection_lost_only_for_fatal_protocol_errors() {
        let lost: Error = ProtocolError::ConnectionClosed.into();
        assert!(lost.is_connection_lost());

        let timeout: Error = ProtocolError::Timeout(500).into();
        assert!(!timeout.is_connection_lost());
        assert!(!Error::NotConnected.is_connection_lost());
    }

    #[test]
    fn unsupported_command_display() {
        let err = Error::UnsupportedCommand {
            id: "2".to_string(),
            command: "turn on".to_string(),
        };
        assert_eq!(err.to_string(), "cannot turn on action 2");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("value1".to_string());
        assert_eq!(err.to_string(), "missing field in message: value1");
    }
}
