use crate::object_name::ObjectName;

use super::callback::{Callback, Delegate};
use super::descriptor::ListenerKind;

/// Per-registration context handed to a broadcaster at registration and
/// returned with every matching notification.
///
/// Dispatchers are shared by every registration of a kind; everything that
/// differs between registrations lives here.
#[derive(Debug, Clone)]
pub struct Handback {
    /// Descriptor key the registration came from.
    pub key: String,
    pub kind: ListenerKind,
    pub delegate: Delegate,
    pub callback: Option<Callback>,
    /// Attribute name, for attribute change registrations.
    pub attribute: Option<String>,
    /// Operation name, for operation call registrations.
    pub target: Option<String>,
    /// The proxy that made the registration.
    pub resource: ObjectName,
}

impl Handback {
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ListenerKind, resource: ObjectName) -> Self {
        Self {
            key: key.into(),
            kind,
            delegate: Delegate::unbound(),
            callback: None,
            attribute: None,
            target: None,
            resource,
        }
    }

    #[must_use]
    pub fn with_delegate(mut self, delegate: Delegate) -> Self {
        self.delegate = delegate;
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Option<Callback>) -> Self {
        self.callback = callback;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}
