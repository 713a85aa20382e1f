//! Type-safe identifier wrappers around [`String`].
//!
//! The simulated world names everything with human-readable strings: the
//! teammate by its display name, victims by their descriptor (e.g.
//! `"critically injured girl"`), rooms as `"area <n>"`, and world objects by
//! their object id. Each gets its own newtype so a victim descriptor can
//! never be passed where a room name is expected.

use serde::{Deserialize, Serialize};

use crate::enums::Severity;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
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
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Display name of a teammate (the human operator or a baseline
    /// identity such as `ALWAYS_TRUST`).
    TeammateId
}

define_id! {
    /// Descriptor of a victim, e.g. `"mildly injured cat"`.
    VictimId
}

define_id! {
    /// Identifier of an object in the simulated world.
    ObjectId
}

define_id! {
    /// Name of a searchable room, always of the form `"area <n>"`.
    RoomName
}

impl VictimId {
    /// Severity encoded in the descriptor, or `None` for healthy victims
    /// that never need rescuing.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_descriptor(&self.0)
    }

    /// Whether the descriptor names an injured victim.
    pub fn is_injured(&self) -> bool {
        self.severity().is_some()
    }
}

impl RoomName {
    /// Build the canonical room name for a numeric area index.
    pub fn from_index(index: u32) -> Self {
        Self(format!("area {index}"))
    }

    /// The numeric area index, if the name ends in one.
    pub fn index(&self) -> Option<u32> {
        self.0.split_whitespace().last().and_then(|t| t.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_roundtrips_index() {
        let room = RoomName::from_index(7);
        assert_eq!(room.as_str(), "area 7");
        assert_eq!(room.index(), Some(7));
        assert_eq!(RoomName::from("drop zone").index(), None);
    }

    #[test]
    fn victim_severity_from_descriptor() {
        assert_eq!(
            VictimId::from("critically injured girl").severity(),
            Some(Severity::Critical)
        );
        assert_eq!(
            VictimId::from("mildly injured cat").severity(),
            Some(Severity::Mild)
        );
        assert!(!VictimId::from("healthy boy").is_injured());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = TeammateId::from("alice");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"alice\""));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = ObjectId::from("stone_12");
        assert_eq!(id.to_string(), "stone_12");
    }
}
