//! Type-safe identifier wrappers around catalog strings.
//!
//! Events, teams and criteria are identified by short human-authored
//! strings (`festival-dance`, `team2`, `technique`) taken from the event
//! catalog. Each gets its own newtype so an event id can never be passed
//! where a team id is expected.
//!
//! Team and criterion ids are only unique *within* an event: `team1` of
//! the Festival Dance is a different team from `team1` of the Speech
//! Choir.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this is the empty-string sentinel.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a judged competition (e.g. `festival-dance`).
    EventId
}

define_id! {
    /// Identifier of a competing team, unique within its event.
    TeamId
}

define_id! {
    /// Identifier of a scored criterion, unique within its event.
    CriterionId
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn ids_serialize_as_bare_strings() {
        let id = EventId::new("festival-dance");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"festival-dance\""));
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(TeamId::from("team2"), 7_u32);
        assert_eq!(map.get("team2"), Some(&7));
        assert!(TeamId::new("").is_empty());
    }
}
