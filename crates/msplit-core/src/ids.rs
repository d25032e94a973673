// ABOUTME: Opaque string identifiers for panes, split nodes, and widget content.
// ABOUTME: Pane and node ids are generated as UUIDs and survive serialization unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
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

string_id!(
    /// Names a leaf pane (and its visual surface) for the lifetime of the process
    PaneId
);
string_id!(
    /// Names a split container
    NodeId
);
string_id!(
    /// Names the content a leaf displays; resolved by the content provider
    WidgetId
);

impl PaneId {
    /// Fresh random pane id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl NodeId {
    /// Fresh random node id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
