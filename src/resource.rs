//! The managed-resource boundary.
//!
//! A [`ManagedResource`] is the arbitrary object a proxy stands in front of.
//! The proxy only needs three things from it: run an operation, read and
//! write attributes, and agree to be managed.

use std::any::Any;

use crate::error::InvocationError;
use crate::value::Value;

/// Resource type tag the proxy supplies when binding a target.
pub const RESOURCE_TYPE_OBJECT_REFERENCE: &str = "ObjectReference";

/// Downcasting support for trait objects.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object that can be exposed through a proxy.
///
/// Implementations are shared with notification callbacks running on other
/// threads, so mutable state needs interior synchronization.
pub trait ManagedResource: AsAny + Send + Sync {
    /// Runs `operation`.
    ///
    /// # Errors
    ///
    /// Any error is returned to the proxy's caller unchanged.
    fn invoke(&self, operation: &str, args: &[Value], signature: &[String]) -> Result<Value, InvocationError>;

    /// Reads an attribute.
    ///
    /// # Errors
    ///
    /// Defaults to `InvocationError::UnknownAttribute`.
    fn get_attribute(&self, name: &str) -> Result<Value, InvocationError> {
        Err(InvocationError::UnknownAttribute {
            attribute: name.to_string(),
        })
    }

    /// Writes an attribute.
    ///
    /// # Errors
    ///
    /// Defaults to `InvocationError::UnknownAttribute`.
    fn set_attribute(&self, name: &str, value: Value) -> Result<(), InvocationError> {
        let _ = value;
        Err(InvocationError::UnknownAttribute {
            attribute: name.to_string(),
        })
    }

    /// Called once when a proxy binds this object. Returning an error
    /// refuses the binding.
    ///
    /// # Errors
    ///
    /// A human-readable reason for the refusal.
    fn check_manageable(&self) -> Result<(), String> {
        Ok(())
    }
}
