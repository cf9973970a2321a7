//! Notification substrate: listener table and synchronous delivery.
//!
//! A [`NotificationBroadcaster`] keeps registrations in insertion order, each
//! with an optional filter and an optional handback. Delivery happens on the
//! publishing thread. The table is snapshotted before listeners run, so a
//! listener may register or unregister while being notified.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::listener::Handback;
use crate::object_name::ObjectName;

use super::envelope::Notification;
use super::filter::NotificationFilter;

/// Unique identifier for one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives notifications from a broadcaster.
///
/// `handback` is exactly the value supplied when the listener was
/// registered. Implementations are called concurrently from any publishing
/// thread.
pub trait NotificationListener: Send + Sync {
    /// Handles one delivered notification.
    ///
    /// # Errors
    ///
    /// Returned errors are reported to the publisher; they never stop
    /// delivery to the remaining listeners.
    fn handle_notification(
        &self,
        notification: &Notification,
        handback: Option<&Handback>,
    ) -> Result<(), DeliveryError>;
}

impl<F> NotificationListener for F
where
    F: Fn(&Notification, Option<&Handback>) -> Result<(), DeliveryError> + Send + Sync,
{
    fn handle_notification(
        &self,
        notification: &Notification,
        handback: Option<&Handback>,
    ) -> Result<(), DeliveryError> {
        self(notification, handback)
    }
}

/// Anything listeners can subscribe to.
pub trait NotificationEmitter: Send + Sync {
    /// Identity used as the source of emitted notifications.
    fn object_name(&self) -> &ObjectName;

    /// Registers `listener`. The same listener may be registered many times,
    /// each registration with its own filter and handback.
    fn add_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        filter: Option<Box<dyn NotificationFilter>>,
        handback: Option<Arc<Handback>>,
    ) -> ListenerId;

    /// Removes one registration. Returns false if `id` was not registered.
    fn remove_notification_listener(&self, id: ListenerId) -> bool;
}

struct Registration {
    id: ListenerId,
    listener: Arc<dyn NotificationListener>,
    filter: Option<Arc<dyn NotificationFilter>>,
    handback: Option<Arc<Handback>>,
}

impl Clone for Registration {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
            filter: self.filter.clone(),
            handback: self.handback.clone(),
        }
    }
}

/// A listener that failed while handling a notification.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub listener_id: ListenerId,
    pub error: DeliveryError,
}

/// Outcome of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Registrations whose filter accepted the notification.
    pub delivered: usize,
    /// Listeners that returned an error.
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An ordered listener table for one notification channel.
pub struct NotificationBroadcaster {
    name: ObjectName,
    registrations: RwLock<Vec<Registration>>,
}

impl NotificationBroadcaster {
    #[must_use]
    pub fn new(name: ObjectName) -> Self {
        Self {
            name,
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// Number of active registrations.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `notification` to every registration whose filter accepts
    /// it, in registration order.
    ///
    /// Listener errors are logged and collected; they do not interrupt
    /// delivery.
    pub fn send_notification(&self, notification: &Notification) -> DeliveryReport {
        let snapshot: Vec<Registration> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut report = DeliveryReport::default();
        for reg in &snapshot {
            if let Some(filter) = &reg.filter {
                if !filter.is_enabled(notification) {
                    continue;
                }
            }

            report.delivered += 1;
            trace!(
                source = %self.name,
                listener = %reg.id,
                event_type = %notification.event_type,
                sequence = notification.sequence_number,
                "delivering notification"
            );

            if let Err(error) = reg.listener.handle_notification(notification, reg.handback.as_deref()) {
                warn!(
                    source = %self.name,
                    listener = %reg.id,
                    event_type = %notification.event_type,
                    %error,
                    "listener failed to handle notification"
                );
                report.failures.push(DeliveryFailure {
                    listener_id: reg.id,
                    error,
                });
            }
        }

        report
    }
}

impl NotificationEmitter for NotificationBroadcaster {
    fn object_name(&self) -> &ObjectName {
        &self.name
    }

    fn add_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        filter: Option<Box<dyn NotificationFilter>>,
        handback: Option<Arc<Handback>>,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                listener,
                filter: filter.map(Arc::from),
                handback,
            });
        id
    }

    fn remove_notification_listener(&self, id: ListenerId) -> bool {
        let mut regs = self.registrations.write().unwrap_or_else(PoisonError::into_inner);
        let before = regs.len();
        regs.retain(|reg| reg.id != id);
        regs.len() != before
    }
}

impl fmt::Debug for NotificationBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBroadcaster")
            .field("name", &self.name)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
