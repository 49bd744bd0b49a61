//! Typed identifiers.
//!
//! Registry ids are human-readable slugs (`reimu`, `group_hakurei_shrine`)
//! authored in the data files, not generated uuids, so the newtypes wrap
//! `String` rather than `Uuid`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_slug_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(slug: impl Into<String>) -> Self {
                Self(slug.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_slug_id!(CharacterId);
define_slug_id!(GroupId);
