//! Identity types for Mission Control records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone. Crosses the store boundary as integer milliseconds.
pub type Timestamp = DateTime<Utc>;

/// Number of trailing identifier characters shown in listings.
pub const SHORT_ID_LEN: usize = 8;

/// Generate a new opaque record identifier.
///
/// UUIDv7 rendered as 32 lowercase hex characters: sortable by creation time and
/// free of separators, so any trailing fragment is a plain substring.
pub fn new_record_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Trailing characters of an identifier used for display.
pub fn short_id(id: &str) -> &str {
    let start = id
        .char_indices()
        .rev()
        .nth(SHORT_ID_LEN - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &id[start..]
}

/// Behaviour shared by every typed record identifier.
pub trait RecordIdType:
    Clone + Eq + std::hash::Hash + fmt::Display + fmt::Debug + Send + Sync + 'static
{
    /// Wrap a raw identifier string.
    fn from_raw(raw: impl Into<String>) -> Self;

    /// Borrow the raw identifier string.
    fn as_str(&self) -> &str;

    /// Last [`SHORT_ID_LEN`] characters for display.
    fn short(&self) -> &str {
        short_id(self.as_str())
    }
}

macro_rules! define_record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Consume the identifier, returning the raw string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl RecordIdType for $name {
            fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(id: $name) -> Self {
                serde_json::Value::String(id.0)
            }
        }
    };
}

define_record_id!(
    /// Identifier of an [`Agent`](crate::Agent).
    AgentId
);
define_record_id!(
    /// Identifier of a [`Task`](crate::Task).
    TaskId
);
define_record_id!(
    /// Identifier of a [`Message`](crate::Message).
    MessageId
);
define_record_id!(
    /// Identifier of an [`Activity`](crate::Activity).
    ActivityId
);
define_record_id!(
    /// Identifier of a [`Document`](crate::Document).
    DocumentId
);
define_record_id!(
    /// Identifier of a [`Notification`](crate::Notification).
    NotificationId
);
define_record_id!(
    /// Identifier of a [`CalendarEntry`](crate::CalendarEntry).
    CalendarEntryId
);
