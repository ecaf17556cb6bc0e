// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action records reported by the gateway.
//!
//! An *action* is the gateway's term for one controllable device. The
//! gateway lists them as raw JSON objects ([`RawAction`]); the library turns
//! each into an immutable, strongly-typed [`ActionRecord`]. State changes
//! arriving later are carried as [`ActionUpdate`]s and never mutate a record
//! in place.

use serde::{Deserialize, Serialize};

use crate::types::{ActionId, ActionType};

/// An action as the gateway lists it.
///
/// ```
/// use nhc_hub::action::RawAction;
///
/// let raw: RawAction = serde_json::from_str(
///     r#"{"id": 1, "name": "Lamp", "type": 1, "location": 2, "value1": 0}"#,
/// ).unwrap();
/// assert_eq!(raw.name, "Lamp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction {
    /// Gateway-assigned identifier.
    pub id: ActionId,
    /// Human-readable label.
    pub name: String,
    /// Device-type code.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Location the action is assigned to, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<u32>,
    /// Current value.
    pub value1: u8,
}

/// One device known to the gateway.
///
/// Records are created when a snapshot is parsed and never change afterwards.
/// The current value of an action lives in the
/// [`StateCache`](crate::state::StateCache); the value stored here is the one
/// the record was created with.
///
/// # Examples
///
/// ```
/// use nhc_hub::action::ActionRecord;
/// use nhc_hub::types::{ActionId, ActionType};
///
/// let blind = ActionRecord::new(2u32, "Blind", ActionType::Cover, 50);
/// assert_eq!(blind.id(), &ActionId::from(2u32));
/// assert_eq!(blind.value(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    id: ActionId,
    name: String,
    action_type: ActionType,
    location: Option<u32>,
    value: u8,
}

impl ActionRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(
        id: impl Into<ActionId>,
        name: impl Into<String>,
        action_type: ActionType,
        value: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            action_type,
            location: None,
            value,
        }
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: u32) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// Returns the label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device type.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Returns the location, if the gateway reported one.
    #[must_use]
    pub fn location(&self) -> Option<u32> {
        self.location
    }

    /// Returns the value at the time the record was created.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns `true` if the value at creation time was non-zero.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.value != 0
    }

    /// Returns a new record carrying `value`, leaving `self` untouched.
    #[must_use]
    pub fn with_value(&self, value: u8) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

impl From<RawAction> for ActionRecord {
    fn from(raw: RawAction) -> Self {
        let action_type = ActionType::from_code(raw.kind);
        if !action_type.is_supported() {
            tracing::debug!(id = %raw.id, code = raw.kind, "Action has an unsupported type code");
        }
        Self {
            id: raw.id,
            name: raw.name,
            action_type,
            location: raw.location,
            value: raw.value1,
        }
    }
}

/// A new value for one action, from a push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionUpdate {
    /// The action that changed.
    pub id: ActionId,
    /// The new value.
    #[serde(rename = "value1")]
    pub value: u8,
}

impl ActionUpdate {
    /// Creates an update.
    #[must_use]
    pub fn new(id: impl Into<ActionId>, value: u8) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}
