// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire requests understood by the gateway.

use serde::Serialize;

use crate::error::ParseError;
use crate::types::ActionId;

/// A request sent to the gateway as one JSON line.
///
/// # Examples
///
/// ```
/// use nhc_hub::command::GatewayRequest;
///
/// assert_eq!(GatewayRequest::ListActions.to_line().unwrap(), r#"{"cmd":"listactions"}"#);
/// assert_eq!(GatewayRequest::StartEvents.name(), "startevents");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum GatewayRequest {
    /// List every action with its current value.
    ListActions,
    /// Set one action to a value.
    ExecuteActions {
        /// Target action.
        id: ActionId,
        /// Requested value.
        value1: u8,
    },
    /// Subscribe the connection to push events.
    StartEvents,
}

impl GatewayRequest {
    /// Creates an execute request.
    #[must_use]
    pub fn execute(id: ActionId, value1: u8) -> Self {
        Self::ExecuteActions { id, value1 }
    }

    /// Returns the `cmd` name of the request.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListActions => "listactions",
            Self::ExecuteActions { .. } => "executeactions",
            Self::StartEvents => "startevents",
        }
    }

    /// Serializes the request to a single JSON line, without terminator.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if serialization fails.
    pub fn to_line(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_actions_line() {
        assert_eq!(
            GatewayRequest::ListActions.to_line().unwrap(),
            r#"{"cmd":"listactions"}"#
        );
    }

    #[test]
    fn execute_line() {
        let request = GatewayRequest::execute(ActionId::from(4u32), 100);
        assert_eq!(
            request.to_line().unwrap(),
            r#"{"cmd":"executeactions","id":4,"value1":100}"#
        );
        assert_eq!(request.name(), "executeactions");
    }

    #[test]
    fn start_events_line() {
        assert_eq!(
            GatewayRequest::StartEvents.to_line().unwrap(),
            r#"{"cmd":"startevents"}"#
        );
    }
}
