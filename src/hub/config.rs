// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;

use crate::error::ConfigError;

/// Port the gateway listens on.
pub const DEFAULT_PORT: u16 = 8000;

/// Name given to a hub when the user does not pick one.
pub const DEFAULT_NAME: &str = "Niko Home Control";

/// Bound on connecting and on every gateway request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Minimum interval between two snapshot fetches.
pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(1);

/// Interval at which hosts are expected to poll [`Hub::async_update`].
///
/// [`Hub::async_update`]: crate::hub::Hub::async_update
pub const SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one gateway.
///
/// Only `name`, `host` and `port` are persisted; they deserialize through the
/// same validation as [`HubConfig::parse`]. Timeouts and the event toggle are
/// runtime settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use nhc_hub::hub::HubConfig;
///
/// let config = HubConfig::parse("Home", "192.168.0.10", 8000)
///     .unwrap()
///     .with_timeout(Duration::from_secs(5))
///     .with_events(false);
///
/// assert_eq!(config.socket_addr().to_string(), "192.168.0.10:8000");
/// assert!(!config.events_enabled());
///
/// let stored: HubConfig =
///     serde_json::from_str(r#"{"name": "Home", "host": "192.168.0.10", "port": 8000}"#).unwrap();
/// assert_eq!(stored.name(), "Home");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredConfig", into = "StoredConfig")]
pub struct HubConfig {
    name: String,
    host: IpAddr,
    port: u16,
    timeout: Duration,
    throttle: Duration,
    events: bool,
}

/// Persisted form of a [`HubConfig`].
#[derive(Serialize, Deserialize)]
struct StoredConfig {
    #[serde(default = "default_name")]
    name: String,
    host: String,
    #[serde(default = "default_port")]
    port: i64,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_port() -> i64 {
    i64::from(DEFAULT_PORT)
}

impl HubConfig {
    /// Creates a configuration with the default port and timings.
    #[must_use]
    pub fn new(name: impl Into<String>, host: IpAddr) -> Self {
        Self {
            name: name.into(),
            host,
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            throttle: MIN_TIME_BETWEEN_UPDATES,
            events: true,
        }
    }

    /// Validates user input.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidHost` if `host` is not an IP address
    /// literal and `ConfigError::InvalidPort` if `port` is outside 0-65535.
    pub fn parse(name: impl Into<String>, host: &str, port: i64) -> Result<Self, ConfigError> {
        let host: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidPort(port))?;
        Ok(Self::new(name, host).with_port(port))
    }

    /// Sets the gateway port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect and request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the minimum interval between snapshot fetches.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Enables or disables the push-event connection.
    #[must_use]
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.events = enabled;
        self
    }

    /// Returns the hub name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the gateway address.
    #[must_use]
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Returns the gateway port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the gateway socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the connect and request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the minimum interval between snapshot fetches.
    #[must_use]
    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Returns `true` if the hub opens a push-event connection.
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.events
    }

    /// Checks that the gateway accepts connections.
    ///
    /// Opens and immediately closes a socket; no command is sent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CannotConnect` if the connection fails or does
    /// not complete within the timeout.
    pub async fn validate_connection(&self) -> Result<(), ConfigError> {
        let address = self.socket_addr();
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(_stream)) => {
                tracing::debug!(%address, "Gateway accepted probe connection");
                Ok(())
            }
            Ok(Err(e)) => Err(ConfigError::CannotConnect(format!("{address}: {e}"))),
            Err(_) => Err(ConfigError::CannotConnect(format!("{address}: timed out"))),
        }
    }
}

impl TryFrom<StoredConfig> for HubConfig {
    type Error = ConfigError;

    fn try_from(stored: StoredConfig) -> Result<Self, Self::Error> {
        Self::parse(stored.name, &stored.host, stored.port)
    }
}

impl From<HubConfig> for StoredConfig {
    fn from(config: HubConfig) -> Self {
        Self {
            name: config.name,
            host: config.host.to_string(),
            port: i64::from(config.port),
        }
    }
}
