//! Notification envelopes, filters and the broadcaster they travel through.

/// Listener table and synchronous delivery.
pub mod broadcaster;
/// The notification envelope and event type names.
pub mod envelope;
/// Per-registration filters.
pub mod filter;

pub use broadcaster::{
    DeliveryFailure, DeliveryReport, ListenerId, NotificationBroadcaster, NotificationEmitter,
    NotificationListener,
};
pub use envelope::{operation_call_type, AttributeChange, Notification, ATTRIBUTE_CHANGE, OPERATION_CALL_PREFIX};
pub use filter::{AttributeChangeFilter, NotificationFilter, TypeFilter};
