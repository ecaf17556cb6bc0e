// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action identifier type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier the gateway assigns to an action.
///
/// Identifiers are unique within one gateway and stable across gateway
/// restarts, but the library treats them as opaque. Gateways report them as
/// JSON numbers; string identifiers are accepted as well and kept verbatim.
///
/// # Examples
///
/// ```
/// use nhc_hub::types::ActionId;
///
/// let id = ActionId::from(12);
/// assert_eq!(id.to_string(), "12");
/// assert_eq!(id, ActionId::new("12"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(String);

impl ActionId {
    /// Creates an identifier from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ActionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for ActionId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ActionId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for ActionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Numeric ids go back on the wire as numbers, the way the gateway sent them.
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ActionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from(n),
            Raw::Text(s) => Self(s),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_textual_forms_are_equal() {
        assert_eq!(ActionId::from(7u32), ActionId::new("7"));
    }

    #[test]
    fn deserialize_from_number() {
        let id: ActionId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn deserialize_from_string() {
        let id: ActionId = serde_json::from_str("\"hall-1\"").unwrap();
        assert_eq!(id.as_str(), "hall-1");
    }

    #[test]
    fn numeric_id_serializes_as_number() {
        let json = serde_json::to_string(&ActionId::from(3u32)).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ActionId::new("hall-1")).unwrap();
        assert_eq!(json, "\"hall-1\"");
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ActionId::from(1u32));
        set.insert(ActionId::new("1"));
        assert_eq!(set.len(), 1);
    }
}
