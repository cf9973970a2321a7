//! Listener registration data and dispatch.
//!
//! Registration turns each descriptor entry into a [`Handback`] and registers
//! the shared dispatcher for its kind. On delivery the dispatcher reads the
//! handback, builds a payload and calls the user [`Callback`].

/// User callbacks, delegates and the invoker.
pub mod callback;
/// Descriptor input types.
pub mod descriptor;
/// Per-kind singleton dispatchers.
pub mod dispatcher;
mod handback;

pub use callback::{Callback, CallbackInvoker, Delegate, Payload};
pub use descriptor::{
    DescriptorEntry, EventListenerSpec, ListenerDescriptor, ListenerKind, MethodListenerSpec,
    ATTRIBUTE_CHANGE_LISTENER, OPERATION_CALL_LISTENER,
};
pub use dispatcher::{AttributeChangeDispatcher, ExternalEventDispatcher, OperationCallDispatcher};
pub use handback::Handback;
