//! Error types for modelbean.
//!
//! All errors are strongly typed using thiserror, one enum per concern,
//! gathered under [`BeanError`]. Callers can match on the specific
//! condition or just propagate with `?`.

use thiserror::Error;

use crate::object_name::ObjectName;

/// Validation errors for identities and registry input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid object name '{name}': {reason}")]
    InvalidObjectName {
        name: String,
        reason: String,
    },

    #[error("Invalid proxy configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Broadcaster already registered: {name}")]
    DuplicateName {
        name: ObjectName,
    },
}

/// The runtime refused to manage the supplied target.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Unsupported managed resource type '{resource_type}'")]
    UnsupportedResourceType {
        resource_type: String,
    },

    #[error("Target rejected as managed resource for {name}: {reason}")]
    Rejected {
        name: ObjectName,
        reason: String,
    },
}

/// A listener descriptor entry could not be registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Listener '{key}' is missing required field '{field}'")]
    MissingField {
        key: String,
        field: String,
    },

    #[error("Listener '{key}' targets undeclared attribute '{attribute}'")]
    UnknownAttribute {
        key: String,
        attribute: String,
    },
}

/// A broadcaster reference could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Broadcaster not found: {name}")]
    Broadcaster {
        name: ObjectName,
    },
}

/// Errors raised on the invoke / attribute path of a proxy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error("No managed resource bound to {name}")]
    NoTarget {
        name: ObjectName,
    },

    #[error("Operation '{operation}' is not declared")]
    UnknownOperation {
        operation: String,
    },

    #[error("Attribute '{attribute}' is not declared")]
    UnknownAttribute {
        attribute: String,
    },

    #[error("Attribute '{attribute}' is not writable")]
    AttributeNotWritable {
        attribute: String,
    },

    #[error("Operation '{operation}' failed: {message}")]
    Failed {
        operation: String,
        message: String,
    },
}

impl InvocationError {
    /// Creates a target-side failure for `operation`.
    #[must_use]
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Error raised from inside a user callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Callback failed: {message}")]
pub struct CallbackError {
    /// What went wrong, as reported by the callback.
    pub message: String,
}

impl CallbackError {
    /// Creates a callback error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors a listener reports back to the delivering broadcaster.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error("{listener} cannot handle notification of type '{event_type}'")]
    UnexpectedNotification {
        listener: &'static str,
        event_type: String,
    },
}

/// Top-level error type for modelbean.
#[derive(Debug, Error)]
pub enum BeanError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl BeanError {
    /// Returns true if this is a binding error.
    #[must_use]
    pub const fn is_binding(&self) -> bool {
        matches!(self, Self::Binding(_))
    }

    /// Returns true if this is a registration error.
    #[must_use]
    pub const fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this is an invocation error.
    #[must_use]
    pub const fn is_invocation(&self) -> bool {
        matches!(self, Self::Invocation(_))
    }
}

/// Result type alias for modelbean operations.
pub type BeanResult<T> = Result<T, BeanError>;
