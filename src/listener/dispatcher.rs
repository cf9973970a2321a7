//! Shared dispatchers, one per listener kind.
//!
//! Each dispatcher is a process-wide singleton registered many times, once
//! per subscription. It keeps no state of its own: the handback that comes
//! back with a notification says which callback to run and against which
//! delegate.

use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::error::DeliveryError;
use crate::notification::{AttributeChange, Notification, NotificationListener};

use super::callback::{CallbackInvoker, Payload};
use super::handback::Handback;

static ATTRIBUTE_CHANGE: OnceLock<Arc<AttributeChangeDispatcher>> = OnceLock::new();
static OPERATION_CALL: OnceLock<Arc<OperationCallDispatcher>> = OnceLock::new();
static EXTERNAL_EVENT: OnceLock<Arc<ExternalEventDispatcher>> = OnceLock::new();

/// Builds the payload of an attribute change callback.
///
/// Keys: `oldValue`, `newValue`, `attribute`, `attributeType`,
/// `sequenceNumber`, `timeStamp` (milliseconds since the epoch).
#[must_use]
pub fn attribute_change_payload(notification: &Notification, change: &AttributeChange) -> Payload {
    Payload::new()
        .with("oldValue", change.old_value.clone())
        .with("newValue", change.new_value.clone())
        .with("attribute", change.attribute_name.as_str())
        .with("attributeType", change.attribute_type.as_str())
        .with("sequenceNumber", notification.sequence_number)
        .with("timeStamp", notification.timestamp_millis())
}

/// Builds the payload of an operation call or external event callback.
///
/// Keys: `event`, `source`, `sequenceNumber`, `timeStamp`, `message`, `data`.
/// Absent message or user data map to `Value::Null`.
#[must_use]
pub fn event_payload(notification: &Notification) -> Payload {
    Payload::new()
        .with("event", notification.event_type.as_str())
        .with("source", notification.source.to_string())
        .with("sequenceNumber", notification.sequence_number)
        .with("timeStamp", notification.timestamp_millis())
        .with("message", notification.message.clone())
        .with("data", notification.user_data.clone())
}

// No handback means nothing to call. Kept as a silent no-op; a missing
// handback would usually point at a registration made outside the proxy.
fn missing_handback(dispatcher: &'static str, notification: &Notification) {
    trace!(
        dispatcher,
        event_type = %notification.event_type,
        sequence = notification.sequence_number,
        "notification without handback ignored"
    );
}

fn dispatch_event(
    dispatcher: &'static str,
    notification: &Notification,
    handback: Option<&Handback>,
) -> Result<(), DeliveryError> {
    let Some(handback) = handback else {
        missing_handback(dispatcher, notification);
        return Ok(());
    };

    let payload = event_payload(notification);
    trace!(dispatcher, key = %handback.key, event_type = %notification.event_type, "dispatching");
    CallbackInvoker::invoke(handback.callback.as_ref(), &handback.delegate, payload)?;
    Ok(())
}

/// Routes attribute change notifications to their callbacks.
#[derive(Debug)]
pub struct AttributeChangeDispatcher {
    _private: (),
}

impl AttributeChangeDispatcher {
    const NAME: &'static str = "AttributeChangeDispatcher";

    /// The shared instance, created on first use.
    pub fn instance() -> Arc<Self> {
        Arc::clone(ATTRIBUTE_CHANGE.get_or_init(|| Arc::new(Self { _private: () })))
    }
}

impl NotificationListener for AttributeChangeDispatcher {
    fn handle_notification(
        &self,
        notification: &Notification,
        handback: Option<&Handback>,
    ) -> Result<(), DeliveryError> {
        let Some(handback) = handback else {
            missing_handback(Self::NAME, notification);
            return Ok(());
        };

        let Some(change) = &notification.attribute_change else {
            return Err(DeliveryError::UnexpectedNotification {
                listener: Self::NAME,
                event_type: notification.event_type.clone(),
            });
        };

        let payload = attribute_change_payload(notification, change);
        trace!(
            dispatcher = Self::NAME,
            key = %handback.key,
            attribute = %change.attribute_name,
            "dispatching"
        );
        CallbackInvoker::invoke(handback.callback.as_ref(), &handback.delegate, payload)?;
        Ok(())
    }
}

/// Routes `jmx.operation.call.*` notifications to their callbacks.
#[derive(Debug)]
pub struct OperationCallDispatcher {
    _private: (),
}

impl OperationCallDispatcher {
    const NAME: &'static str = "OperationCallDispatcher";

    /// The shared instance, created on first use.
    pub fn instance() -> Arc<Self> {
        Arc::clone(OPERATION_CALL.get_or_init(|| Arc::new(Self { _private: () })))
    }
}

impl NotificationListener for OperationCallDispatcher {
    fn handle_notification(
        &self,
        notification: &Notification,
        handback: Option<&Handback>,
    ) -> Result<(), DeliveryError> {
        dispatch_event(Self::NAME, notification, handback)
    }
}

/// Routes notifications from other broadcasters to their callbacks.
#[derive(Debug)]
pub struct ExternalEventDispatcher {
    _private: (),
}

impl ExternalEventDispatcher {
    const NAME: &'static str = "ExternalEventDispatcher";

    /// The shared instance, created on first use.
    pub fn instance() -> Arc<Self> {
        Arc::clone(EXTERNAL_EVENT.get_or_init(|| Arc::new(Self { _private: () })))
    }
}

impl NotificationListener for ExternalEventDispatcher {
    fn handle_notification(
        &self,
        notification: &Notification,
        handback: Option<&Handback>,
    ) -> Result<(), DeliveryError> {
        dispatch_event(Self::NAME, notification, handback)
    }
}
