//! # modelbean - Notification fan-out for managed-resource proxies
//!
//! A [`ManagedResourceProxy`] fronts one target object. It forwards
//! operation calls and attribute access to the target and turns them into
//! notifications that registered listeners receive.
//!
//! ## Core Concepts
//!
//! - **Proxy**: binds a target, forwards `invoke`, announces listened calls
//! - **Descriptor**: declarative listener entries registered in one call
//! - **Dispatcher**: one shared listener per kind, routed by its **Handback**
//! - **Broadcaster**: synchronous listener table with per-registration filters
//! - **Sequence**: process-wide monotonic notification numbering
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modelbean::{Callback, ListenerDescriptor, ManagedResourceProxy, MethodListenerSpec, ObjectName, SequenceGenerator};
//!
//! let proxy = ManagedResourceProxy::bound(
//!     ObjectName::parse("app:type=Service")?,
//!     SequenceGenerator::shared(),
//!     service,
//! )?;
//!
//! let report = proxy.register_call_listeners(ListenerDescriptor::new().with(
//!     "onStart",
//!     MethodListenerSpec::operation_call("start").with_callback(Callback::nullary(|_| Ok(()))),
//! ));
//! assert!(report.is_complete());
//!
//! // Emits jmx.operation.call.start after the target returns.
//! proxy.invoke("start", &[], &[])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod model;
pub mod object_name;
pub mod resource;
pub mod sequence;
pub mod value;

// Notification plumbing
pub mod listener;
pub mod notification;
pub mod registry;

// Proxy
pub mod proxy;

pub use config::ProxyConfig;
pub use error::{
    BeanError, BeanResult, BindingError, CallbackError, DeliveryError, InvocationError, NotFoundError,
    RegistrationError, ValidationError,
};
pub use model::{AttributeInfo, ModelInfo, OperationInfo};
pub use object_name::ObjectName;
pub use resource::{ManagedResource, RESOURCE_TYPE_OBJECT_REFERENCE};
pub use sequence::SequenceGenerator;
pub use value::Value;

pub use listener::{
    Callback, CallbackInvoker, Delegate, DescriptorEntry, EventListenerSpec, Handback, ListenerDescriptor,
    ListenerKind, MethodListenerSpec, Payload,
};
pub use notification::{
    AttributeChange, AttributeChangeFilter, DeliveryReport, ListenerId, Notification, NotificationBroadcaster,
    NotificationEmitter, NotificationFilter, NotificationListener, TypeFilter,
};
pub use proxy::{ManagedResourceProxy, Registration, RegistrationFailure, RegistrationReport};
pub use registry::{BroadcasterRegistry, InMemoryRegistry};
