// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of gateway responses and push events.

use serde::Deserialize;
use serde_json::Value;

use crate::action::{ActionUpdate, RawAction};
use crate::error::{ParseError, ProtocolError};

/// Event name under which the gateway pushes action value changes.
const ACTION_EVENT: &str = "listactions";

/// A message received from the gateway.
///
/// # Examples
///
/// ```
/// use nhc_hub::protocol::GatewayMessage;
///
/// let event = GatewayMessage::parse(r#"{"event":"listactions","data":[{"id":2,"value1":0}]}"#)
///     .unwrap();
/// let updates = event.action_updates().unwrap();
/// assert_eq!(updates.len(), 1);
/// assert_eq!(updates[0].value, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayMessage {
    /// Answer to a command.
    Response {
        /// The command being answered.
        command: String,
        /// Response payload.
        data: Value,
    },
    /// Unsolicited notification.
    Event {
        /// Event name.
        event: String,
        /// Event payload.
        data: Value,
    },
}

#[derive(Deserialize)]
struct Envelope {
    cmd: Option<String>,
    event: Option<String>,
    #[serde(default)]
    data: Value,
}

impl GatewayMessage {
    /// Parses one line received from the gateway.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the line is not JSON or carries neither a
    /// `cmd` nor an `event` field.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let envelope: Envelope = serde_json::from_str(line.trim())?;
        match (envelope.cmd, envelope.event) {
            (_, Some(event)) => Ok(Self::Event {
                event,
                data: envelope.data,
            }),
            (Some(command), None) => Ok(Self::Response {
                command,
                data: envelope.data,
            }),
            (None, None) => Err(ParseError::MissingField("cmd".to_string())),
        }
    }

    /// Returns `true` for push events.
    #[must_use]
    pub fn is_event(&self) -> bool {
        matches!(self, Self::Event { .. })
    }

    /// Returns the command a response answers, `None` for events.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Response { command, .. } => Some(command),
            Self::Event { .. } => None,
        }
    }

    /// Returns the message payload.
    #[must_use]
    pub fn data(&self) -> &Value {
        match self {
            Self::Response { data, .. } | Self::Event { data, .. } => data,
        }
    }

    /// Checks that this is the response to `command`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnexpectedFormat` for events or responses to
    /// another command.
    pub fn expect_response(&self, command: &str) -> Result<(), ParseError> {
        match self {
            Self::Response { command: got, .. } if got == command => Ok(()),
            Self::Response { command: got, .. } => Err(ParseError::UnexpectedFormat(format!(
                "expected response to {command}, got {got}"
            ))),
            Self::Event { event, .. } => Err(ParseError::UnexpectedFormat(format!(
                "expected response to {command}, got event {event}"
            ))),
        }
    }

    /// Checks the `error` code of a command acknowledgement.
    ///
    /// Payloads without an `error` field count as success.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::CommandRejected` for a non-zero code.
    pub fn check_ack(&self) -> Result<(), ProtocolError> {
        let Self::Response { command, data } = self else {
            return Ok(());
        };
        match data.get("error").and_then(Value::as_i64) {
            Some(0) | None => Ok(()),
            Some(code) => Err(ProtocolError::CommandRejected {
                command: command.clone(),
                code,
            }),
        }
    }

    /// Extracts the action listing from a `listactions` response.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not an array of actions.
    pub fn into_actions(self) -> Result<Vec<RawAction>, ParseError> {
        let data = match self {
            Self::Response { data, .. } => data,
            Self::Event { event, .. } => {
                return Err(ParseError::UnexpectedFormat(format!(
                    "expected action listing, got event {event}"
                )));
            }
        };
        if !data.is_array() {
            return Err(ParseError::UnexpectedFormat(
                "action listing is not an array".to_string(),
            ));
        }
        serde_json::from_value(data).map_err(Into::into)
    }

    /// Extracts action value changes from a push event.
    ///
    /// Events of other kinds, and responses, yield no updates.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if an action event carries a malformed payload.
    pub fn action_updates(&self) -> Result<Vec<ActionUpdate>, ParseError> {
        match self {
            Self::Event { event, data } if event == ACTION_EVENT => {
                Vec::<ActionUpdate>::deserialize(data).map_err(Into::into)
            }
            Self::Event { event, .. } => {
                tracing::debug!(event = %event, "Ignoring gateway event");
                Ok(Vec::new())
            }
            Self::Response { command, .. } => {
                tracing::debug!(command = %command, "Ignoring response on event stream");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionId;

    #[test]
    fn parse_response() {
        let msg = GatewayMessage::parse(r#"{"cmd":"executeactions","data":{"error":0}}"#).unwrap();
        assert!(!msg.is_event());
        assert!(msg.expect_response("executeactions").is_ok());
        assert!(msg.check_ack().is_ok());
    }

    #[test]
    fn request_lines_parse_as_commands() {
        let msg = GatewayMessage::parse(r#"{"cmd":"executeactions","id":1,"value1":100}"#).unwrap();
        assert_eq!(msg.command(), Some("executeactions"));
        assert_eq!(msg.data(), &Value::Null);
    }

    #[test]
    fn parse_event() {
        let msg = GatewayMessage::parse(r#"{"event":"listactions","data":[]}"#).unwrap();
        assert!(msg.is_event());
        assert_eq!(msg.command(), None);
        assert!(msg.expect_response("listactions").is_err());
    }

    #[test]
    fn parse_rejects_non_json() {
        assert!(matches!(
            GatewayMessage::parse("garbage"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn parse_rejects_untagged_object() {
        assert!(matches!(
            GatewayMessage::parse(r#"{"data":[]}"#),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn response_to_other_command() {
        let msg = GatewayMessage::parse(r#"{"cmd":"startevents","data":{"error":0}}"#).unwrap();
        assert!(matches!(
            msg.expect_response("listactions"),
            Err(ParseError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn rejected_ack() {
        let msg = GatewayMessage::parse(r#"{"cmd":"executeactions","data":{"error":2}}"#).unwrap();
        match msg.check_ack() {
            Err(ProtocolError::CommandRejected { command, code }) => {
                assert_eq!(command, "executeactions");
                assert_eq!(code, 2);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn actions_from_listing() {
        let msg = GatewayMessage::parse(
            r#"{"cmd":"listactions","data":[
                {"id":1,"name":"Lamp","type":1,"location":1,"value1":0},
                {"id":2,"name":"Blind","type":4,"location":1,"value1":50}
            ]}"#,
        )
        .unwrap();

        let actions = msg.into_actions().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].id, ActionId::from(2u32));
        assert_eq!(actions[1].value1, 50);
    }

    #[test]
    fn listing_must_be_array() {
        let msg = GatewayMessage::parse(r#"{"cmd":"listactions","data":{"error":0}}"#).unwrap();
        assert!(msg.into_actions().is_err());
    }

    #[test]
    fn updates_from_action_event() {
        let msg = GatewayMessage::parse(
            r#"{"event":"listactions","data":[{"id":5,"value1":10},{"id":6,"value1":0}]}"#,
        )
        .unwrap();

        let updates = msg.action_updates().unwrap();
        assert_eq!(
            updates,
            vec![ActionUpdate::new(5u32, 10), ActionUpdate::new(6u32, 0)]
        );
    }

    #[test]
    fn other_events_yield_no_updates() {
        let msg = GatewayMessage::parse(r#"{"event":"getlive","data":{"x":1}}"#).unwrap();
        assert!(msg.action_updates().unwrap().is_empty());
    }

    #[test]
    fn malformed_action_event() {
        let msg = GatewayMessage::parse(r#"{"event":"listactions","data":[{"id":5}]}"#).unwrap();
        assert!(msg.action_updates().is_err());
    }
}
