//! Unique identifiers for MemViz entities.
//!
//! All IDs are UUIDs and display with a short type prefix (`replay_...`,
//! `step_...`). Parsing accepts either the prefixed form or a bare UUID.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Create a new random ", stringify!($name))]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from UUID bytes
            #[must_use]
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// Wrap an existing UUID
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get as UUID
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Get as bytes
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }

            /// Display prefix for this ID type
            pub const PREFIX: &'static str = $prefix;
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(concat!($prefix, "_"))
                    .unwrap_or(s);
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|e| CoreError::InvalidId {
                        reason: format!("{}: {}", s, e),
                    })
            }
        }
    };
}

define_id!(
    /// Replay identifier - identifies one replay aggregate
    ReplayId,
    "replay"
);

define_id!(
    /// Step identifier - identifies one captured simulation step
    StepId,
    "step"
);

define_id!(
    /// Stack frame identifier
    FrameId,
    "frame"
);

define_id!(
    /// Heap object identifier
    HeapObjectId,
    "heap"
);

define_id!(
    /// Pointer identifier
    PointerId,
    "ptr"
);

define_id!(
    /// Variable identifier
    VariableId,
    "var"
);

define_id!(
    /// Event identifier - identifies a single lifecycle event
    EventId,
    "evt"
);
