//! User callbacks and the invoker that calls them.
//!
//! A callback's arity is fixed when it is built: [`Callback::nullary`] never
//! sees a payload, [`Callback::unary`] always does. Both receive the
//! [`Delegate`], the managed target the callback should act on.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::CallbackError;
use crate::resource::ManagedResource;
use crate::value::Value;

/// The managed target a callback runs against.
#[derive(Clone, Default)]
pub struct Delegate {
    target: Option<Arc<dyn ManagedResource>>,
}

impl Delegate {
    #[must_use]
    pub fn new(target: Arc<dyn ManagedResource>) -> Self {
        Self { target: Some(target) }
    }

    /// A delegate with no target, used when a listener is registered before
    /// the proxy is bound.
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<&dyn ManagedResource> {
        self.target.as_deref()
    }

    /// Downcasts the target to its concrete type.
    #[must_use]
    pub fn downcast_ref<T: ManagedResource>(&self) -> Option<&T> {
        let target: &dyn ManagedResource = self.target.as_deref()?;
        target.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate").field("bound", &self.is_bound()).finish()
    }
}

/// Named fields handed to unary callbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

type NullaryFn = dyn Fn(&Delegate) -> Result<(), CallbackError> + Send + Sync;
type UnaryFn = dyn Fn(&Delegate, Payload) -> Result<(), CallbackError> + Send + Sync;

/// A user callback tagged with its arity.
#[derive(Clone)]
pub enum Callback {
    /// Called with the delegate only.
    Nullary(Arc<NullaryFn>),
    /// Called with the delegate and the event payload.
    Unary(Arc<UnaryFn>),
}

impl Callback {
    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn(&Delegate) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::Nullary(Arc::new(f))
    }

    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(&Delegate, Payload) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::Unary(Arc::new(f))
    }

    /// Number of declared parameters, not counting the delegate.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::Unary(_) => 1,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nullary(_) => f.write_str("Callback::Nullary"),
            Self::Unary(_) => f.write_str("Callback::Unary"),
        }
    }
}

/// Calls callbacks with arity-dependent arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackInvoker;

impl CallbackInvoker {
    /// Invokes `callback` against `delegate`.
    ///
    /// A missing callback is a no-op. Nullary callbacks drop `payload`.
    ///
    /// # Errors
    ///
    /// Whatever the callback returns; nothing is swallowed here.
    pub fn invoke(callback: Option<&Callback>, delegate: &Delegate, payload: Payload) -> Result<(), CallbackError> {
        match callback {
            None => Ok(()),
            Some(Callback::Nullary(f)) => f(delegate),
            Some(Callback::Unary(f)) => f(delegate, payload),
        }
    }
}
