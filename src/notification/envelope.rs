//! The notification envelope.
//!
//! Envelopes are immutable once published and serializable so they can be
//! logged or forwarded as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_name::ObjectName;
use crate::value::Value;

/// Prefix of the event type emitted when a listened-to operation is invoked.
pub const OPERATION_CALL_PREFIX: &str = "jmx.operation.call.";

/// Event type of attribute change notifications.
pub const ATTRIBUTE_CHANGE: &str = "jmx.attribute.change";

/// Event type announcing a call to `operation`.
#[must_use]
pub fn operation_call_type(operation: &str) -> String {
    format!("{OPERATION_CALL_PREFIX}{operation}")
}

/// Old and new value of one attribute.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub attribute_name: String,
    pub attribute_type: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// One event.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event_type: String,
    pub source: ObjectName,
    pub sequence_number: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_change: Option<AttributeChange>,
}

impl Notification {
    /// Creates a notification stamped with the current time.
    #[must_use]
    pub fn new(event_type: impl Into<String>, source: ObjectName, sequence_number: u64) -> Self {
        Self {
            event_type: event_type.into(),
            source,
            sequence_number,
            timestamp: Utc::now(),
            message: None,
            user_data: None,
            attribute_change: None,
        }
    }

    /// Creates a `jmx.attribute.change` notification.
    #[must_use]
    pub fn attribute_change(source: ObjectName, sequence_number: u64, change: AttributeChange) -> Self {
        Self {
            attribute_change: Some(change),
            ..Self::new(ATTRIBUTE_CHANGE, source, sequence_number)
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_user_data(mut self, data: impl Into<Value>) -> Self {
        self.user_data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
