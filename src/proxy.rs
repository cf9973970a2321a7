//! The managed-resource proxy.
//!
//! A [`ManagedResourceProxy`] stands in front of one target object. Calls go
//! through [`invoke`](ManagedResourceProxy::invoke) unchanged; when someone
//! listens for a call to that operation, the proxy announces it afterwards on
//! its own notification channel as `jmx.operation.call.<name>`.
//!
//! Listener registration reads a descriptor, classifies each entry and
//! registers the shared dispatcher for its kind with a fresh [`Handback`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::config::ProxyConfig;
use crate::error::{BeanError, BeanResult, BindingError, InvocationError, NotFoundError, RegistrationError};
use crate::listener::{
    AttributeChangeDispatcher, Delegate, DescriptorEntry, EventListenerSpec, ExternalEventDispatcher, Handback,
    ListenerDescriptor, ListenerKind, MethodListenerSpec, OperationCallDispatcher,
};
use crate::model::ModelInfo;
use crate::notification::{
    operation_call_type, AttributeChange, AttributeChangeFilter, DeliveryReport, ListenerId, Notification,
    NotificationBroadcaster, NotificationEmitter, NotificationFilter, NotificationListener, TypeFilter,
};
use crate::object_name::ObjectName;
use crate::registry::BroadcasterRegistry;
use crate::resource::{ManagedResource, RESOURCE_TYPE_OBJECT_REFERENCE};
use crate::sequence::SequenceGenerator;
use crate::value::Value;

/// A listener registered from one descriptor entry.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Descriptor key.
    pub key: String,
    pub kind: ListenerKind,
    pub listener_id: ListenerId,
    /// The broadcaster holding the registration.
    pub broadcaster: ObjectName,
    /// Operation name for operation call listeners.
    pub operation: Option<String>,
}

/// A descriptor entry that could not be registered.
#[allow(missing_docs)]
#[derive(Debug)]
pub struct RegistrationFailure {
    pub key: String,
    pub error: BeanError,
}

/// Outcome of registering a descriptor.
///
/// Registration is best effort per entry: a bad entry is reported here and
/// its siblings are still registered.
#[allow(missing_docs)]
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<Registration>,
    pub failures: Vec<RegistrationFailure>,
    /// Keys skipped because their kind was not recognized.
    pub skipped: Vec<String>,
}

impl RegistrationReport {
    /// True when no entry failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn registration(&self, key: &str) -> Option<&Registration> {
        self.registered.iter().find(|r| r.key == key)
    }

    /// The registrations, or the first failure.
    ///
    /// # Errors
    ///
    /// The error of the first failed entry. Successful entries stay
    /// registered either way.
    pub fn into_result(self) -> BeanResult<Vec<Registration>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.registered),
        }
    }
}

/// Proxy for one managed resource.
pub struct ManagedResourceProxy {
    name: ObjectName,
    config: ProxyConfig,
    model: Option<ModelInfo>,
    target: RwLock<Option<Arc<dyn ManagedResource>>>,
    // Operation name -> number of live call listeners.
    call_listeners: RwLock<HashMap<String, usize>>,
    broadcaster: NotificationBroadcaster,
    sequence: Arc<SequenceGenerator>,
}

impl ManagedResourceProxy {
    /// Creates an unbound proxy with the default configuration.
    #[must_use]
    pub fn new(name: ObjectName, sequence: Arc<SequenceGenerator>) -> Self {
        Self::with_config(name, sequence, ProxyConfig::default())
    }

    #[must_use]
    pub fn with_config(name: ObjectName, sequence: Arc<SequenceGenerator>, config: ProxyConfig) -> Self {
        Self {
            broadcaster: NotificationBroadcaster::new(name.clone()),
            name,
            config,
            model: None,
            target: RwLock::new(None),
            call_listeners: RwLock::new(HashMap::new()),
            sequence,
        }
    }

    /// Creates a proxy already bound to `target`.
    ///
    /// # Errors
    ///
    /// See [`set_target`](Self::set_target).
    pub fn bound<T: ManagedResource>(
        name: ObjectName,
        sequence: Arc<SequenceGenerator>,
        target: T,
    ) -> Result<Self, BindingError> {
        let proxy = Self::new(name, sequence);
        proxy.set_target(target)?;
        Ok(proxy)
    }

    /// Attaches declared metadata. Undeclared operations and attributes are
    /// refused from then on.
    #[must_use]
    pub fn with_model_info(mut self, model: ModelInfo) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn name(&self) -> &ObjectName {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    #[must_use]
    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn sequence(&self) -> &Arc<SequenceGenerator> {
        &self.sequence
    }

    /// Binds the proxy to `target`, replacing any previous target.
    ///
    /// Listeners registered earlier keep the delegate they were registered
    /// with.
    ///
    /// # Errors
    ///
    /// `BindingError::UnsupportedResourceType` if the configured resource
    /// type is not `ObjectReference`; `BindingError::Rejected` if the target
    /// refuses to be managed. The proxy keeps its previous target on error.
    pub fn set_target<T: ManagedResource>(&self, target: T) -> Result<(), BindingError> {
        if self.config.resource_type != RESOURCE_TYPE_OBJECT_REFERENCE {
            return Err(BindingError::UnsupportedResourceType {
                resource_type: self.config.resource_type.clone(),
            });
        }

        target.check_manageable().map_err(|reason| BindingError::Rejected {
            name: self.name.clone(),
            reason,
        })?;

        *self.target.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(target));
        debug!(name = %self.name, "managed resource bound");
        Ok(())
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The bound target, if any.
    #[must_use]
    pub fn target(&self) -> Option<Arc<dyn ManagedResource>> {
        self.target.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// A delegate for the current target.
    #[must_use]
    pub fn delegate(&self) -> Delegate {
        self.target().map_or_else(Delegate::unbound, Delegate::new)
    }

    fn require_target(&self) -> Result<Arc<dyn ManagedResource>, InvocationError> {
        self.target().ok_or_else(|| InvocationError::NoTarget {
            name: self.name.clone(),
        })
    }

    /// Operations whose invocation is currently announced, sorted.
    #[must_use]
    pub fn call_listener_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .call_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn is_call_listened(&self, operation: &str) -> bool {
        self.call_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(operation)
    }

    /// Registers the local listeners of `descriptor`.
    ///
    /// Entries without a `methodListener`, or with an unrecognized `type`,
    /// are skipped. Attribute change entries name their attribute through
    /// `attribute`, falling back to `target`.
    pub fn register_call_listeners(&self, descriptor: ListenerDescriptor<DescriptorEntry>) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for (key, entry) in descriptor {
            let Some(spec) = entry.method_listener else {
                debug!(name = %self.name, %key, "descriptor entry has no method listener, skipped");
                report.skipped.push(key);
                continue;
            };

            let outcome = match spec.kind() {
                Some(ListenerKind::AttributeChange) => self.register_attribute_listener(&key, spec),
                Some(ListenerKind::OperationCall) => self.register_operation_listener(&key, spec),
                _ => {
                    debug!(
                        name = %self.name,
                        %key,
                        listener_type = spec.listener_type.as_deref().unwrap_or(""),
                        "unrecognized listener type, skipped"
                    );
                    report.skipped.push(key);
                    continue;
                }
            };

            match outcome {
                Ok(registration) => report.registered.push(registration),
                Err(error) => {
                    debug!(name = %self.name, %key, %error, "listener registration failed");
                    report.failures.push(RegistrationFailure {
                        key,
                        error: error.into(),
                    });
                }
            }
        }

        report
    }

    fn register_attribute_listener(
        &self,
        key: &str,
        spec: MethodListenerSpec,
    ) -> Result<Registration, RegistrationError> {
        let attribute = spec
            .attribute
            .or(spec.target)
            .ok_or_else(|| RegistrationError::MissingField {
                key: key.to_string(),
                field: "attribute".to_string(),
            })?;

        if let Some(model) = &self.model {
            if model.attribute(&attribute).is_none() {
                return Err(RegistrationError::UnknownAttribute {
                    key: key.to_string(),
                    attribute,
                });
            }
        }

        let handback = Handback::new(key, ListenerKind::AttributeChange, self.name.clone())
            .with_delegate(self.delegate())
            .with_attribute(attribute.clone())
            .with_callback(spec.callback);

        let listener_id = self.broadcaster.add_notification_listener(
            AttributeChangeDispatcher::instance(),
            Some(Box::new(AttributeChangeFilter::for_attribute(attribute.clone()))),
            Some(Arc::new(handback)),
        );
        debug!(name = %self.name, %key, %attribute, "attribute change listener registered");

        Ok(Registration {
            key: key.to_string(),
            kind: ListenerKind::AttributeChange,
            listener_id,
            broadcaster: self.name.clone(),
            operation: None,
        })
    }

    fn register_operation_listener(
        &self,
        key: &str,
        spec: MethodListenerSpec,
    ) -> Result<Registration, RegistrationError> {
        let operation = spec.target.ok_or_else(|| RegistrationError::MissingField {
            key: key.to_string(),
            field: "target".to_string(),
        })?;

        *self
            .call_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation.clone())
            .or_insert(0) += 1;

        let handback = Handback::new(key, ListenerKind::OperationCall, self.name.clone())
            .with_delegate(self.delegate())
            .with_target(operation.clone())
            .with_callback(spec.callback);

        let listener_id = self.broadcaster.add_notification_listener(
            OperationCallDispatcher::instance(),
            Some(Box::new(TypeFilter::for_type(operation_call_type(&operation)))),
            Some(Arc::new(handback)),
        );
        debug!(name = %self.name, %key, %operation, "operation call listener registered");

        Ok(Registration {
            key: key.to_string(),
            kind: ListenerKind::OperationCall,
            listener_id,
            broadcaster: self.name.clone(),
            operation: Some(operation),
        })
    }

    /// Registers listeners for events broadcast by other resources.
    ///
    /// Each entry subscribes the shared external dispatcher to the `from`
    /// broadcaster, filtered by `event` when present.
    pub fn register_external_listeners(
        &self,
        registry: &dyn BroadcasterRegistry,
        descriptor: ListenerDescriptor<EventListenerSpec>,
    ) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for (key, spec) in descriptor {
            match self.register_external_listener(registry, &key, spec) {
                Ok(registration) => report.registered.push(registration),
                Err(error) => {
                    debug!(name = %self.name, %key, %error, "external listener registration failed");
                    report.failures.push(RegistrationFailure { key, error });
                }
            }
        }

        report
    }

    fn register_external_listener(
        &self,
        registry: &dyn BroadcasterRegistry,
        key: &str,
        spec: EventListenerSpec,
    ) -> Result<Registration, BeanError> {
        let from = spec.from.ok_or_else(|| RegistrationError::MissingField {
            key: key.to_string(),
            field: "from".to_string(),
        })?;

        let filter: Option<Box<dyn NotificationFilter>> = spec
            .event
            .map(|event| Box::new(TypeFilter::for_type(event)) as Box<dyn NotificationFilter>);

        let handback = Handback::new(key, ListenerKind::ExternalEvent, self.name.clone())
            .with_delegate(self.delegate())
            .with_callback(spec.callback);

        let listener_id = registry.add_notification_listener(
            &from,
            ExternalEventDispatcher::instance(),
            filter,
            Some(Arc::new(handback)),
        )?;
        debug!(name = %self.name, %key, %from, "external listener registered");

        Ok(Registration {
            key: key.to_string(),
            kind: ListenerKind::ExternalEvent,
            listener_id,
            broadcaster: from,
            operation: None,
        })
    }

    /// Removes a local registration made by this proxy.
    ///
    /// Returns false for registrations held by other broadcasters; remove
    /// those through the registry.
    pub fn unregister(&self, registration: &Registration) -> bool {
        if registration.broadcaster != self.name || registration.kind == ListenerKind::ExternalEvent {
            return false;
        }

        if !self.broadcaster.remove_notification_listener(registration.listener_id) {
            return false;
        }

        if let Some(operation) = &registration.operation {
            let mut names = self.call_listeners.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(count) = names.get_mut(operation) {
                *count -= 1;
                if *count == 0 {
                    names.remove(operation);
                }
            }
        }

        debug!(name = %self.name, key = %registration.key, "listener unregistered");
        true
    }

    /// Removes an external registration through `registry`.
    ///
    /// Local registrations are handed to [`unregister`](Self::unregister).
    ///
    /// # Errors
    ///
    /// `NotFoundError::Broadcaster` if the broadcaster is no longer resolvable.
    pub fn unregister_external(
        &self,
        registry: &dyn BroadcasterRegistry,
        registration: &Registration,
    ) -> Result<bool, NotFoundError> {
        // Local registrations also carry call-listener bookkeeping.
        if registration.kind != ListenerKind::ExternalEvent {
            return Ok(self.unregister(registration));
        }
        registry.remove_notification_listener(&registration.broadcaster, registration.listener_id)
    }

    /// Invokes `operation` on the target.
    ///
    /// After a successful call to an operation with call listeners, exactly
    /// one `jmx.operation.call.<operation>` notification is published. A
    /// failed call publishes nothing and its error is returned unchanged.
    ///
    /// # Errors
    ///
    /// `InvocationError::NoTarget` when unbound,
    /// `InvocationError::UnknownOperation` when model info does not declare
    /// the operation, otherwise whatever the target returns.
    pub fn invoke(&self, operation: &str, args: &[Value], signature: &[String]) -> Result<Value, InvocationError> {
        if let Some(model) = &self.model {
            if model.operation(operation).is_none() {
                return Err(InvocationError::UnknownOperation {
                    operation: operation.to_string(),
                });
            }
        }

        let target = self.require_target()?;
        let result = target.invoke(operation, args, signature)?;

        if self.is_call_listened(operation) {
            let note = Notification::new(operation_call_type(operation), self.name.clone(), self.sequence.next());
            trace!(name = %self.name, %operation, sequence = note.sequence_number, "announcing operation call");
            self.broadcaster.send_notification(&note);
        }

        Ok(result)
    }

    /// Reads an attribute from the target.
    ///
    /// # Errors
    ///
    /// `InvocationError::NoTarget`, `InvocationError::UnknownAttribute` for
    /// attributes model info does not declare readable, or the target's error.
    pub fn get_attribute(&self, name: &str) -> Result<Value, InvocationError> {
        if let Some(model) = &self.model {
            if !model.attribute(name).is_some_and(|a| a.readable) {
                return Err(InvocationError::UnknownAttribute {
                    attribute: name.to_string(),
                });
            }
        }

        self.require_target()?.get_attribute(name)
    }

    /// Writes an attribute on the target and announces the change.
    ///
    /// The previous value is read first; if it cannot be read the change
    /// notification reports it as `Value::Null`.
    ///
    /// # Errors
    ///
    /// `InvocationError::NoTarget`, `InvocationError::UnknownAttribute`,
    /// `InvocationError::AttributeNotWritable`, or the target's error.
    pub fn set_attribute(&self, name: &str, value: Value) -> Result<(), InvocationError> {
        if let Some(model) = &self.model {
            match model.attribute(name) {
                None => {
                    return Err(InvocationError::UnknownAttribute {
                        attribute: name.to_string(),
                    })
                }
                Some(info) if !info.writable => {
                    return Err(InvocationError::AttributeNotWritable {
                        attribute: name.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        let target = self.require_target()?;
        let old_value = if self.config.attribute_change_notifications {
            target.get_attribute(name).unwrap_or_else(|error| {
                debug!(name = %self.name, attribute = %name, %error, "previous value unreadable, reported as null");
                Value::Null
            })
        } else {
            Value::Null
        };

        target.set_attribute(name, value.clone())?;

        if self.config.attribute_change_notifications {
            self.send_attribute_change_notification(name, old_value, value);
        }
        Ok(())
    }

    /// Publishes a `jmx.attribute.change` notification for `name`.
    ///
    /// The attribute type is the declared type when model info has one,
    /// otherwise the type name of `new_value`.
    pub fn send_attribute_change_notification(&self, name: &str, old_value: Value, new_value: Value) -> DeliveryReport {
        let attribute_type = self
            .model
            .as_ref()
            .and_then(|m| m.attribute(name))
            .map_or_else(|| new_value.type_name().to_string(), |a| a.type_name.clone());

        let note = Notification::attribute_change(
            self.name.clone(),
            self.sequence.next(),
            AttributeChange {
                attribute_name: name.to_string(),
                attribute_type,
                old_value,
                new_value,
            },
        );
        trace!(name = %self.name, attribute = %name, sequence = note.sequence_number, "announcing attribute change");
        self.broadcaster.send_notification(&note)
    }

    /// Publishes `notification` on this proxy's channel.
    pub fn send_notification(&self, notification: &Notification) -> DeliveryReport {
        self.broadcaster.send_notification(notification)
    }

    /// Number of listener registrations on this proxy's channel.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.broadcaster.listener_count()
    }
}

impl NotificationEmitter for ManagedResourceProxy {
    fn object_name(&self) -> &ObjectName {
        &self.name
    }

    fn add_notification_listener(
        &self,
        listener: Arc<dyn NotificationListener>,
        filter: Option<Box<dyn NotificationFilter>>,
        handback: Option<Arc<Handback>>,
    ) -> ListenerId {
        self.broadcaster.add_notification_listener(listener, filter, handback)
    }

    fn remove_notification_listener(&self, id: ListenerId) -> bool {
        self.broadcaster.remove_notification_listener(id)
    }
}

impl fmt::Debug for ManagedResourceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedResourceProxy")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .field("call_listeners", &self.call_listener_names())
            .field("broadcaster", &self.broadcaster)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::{CallbackError, DeliveryError};
    use crate::listener::{Callback, Payload};
    use crate::model::{AttributeInfo, OperationInfo};
    use crate::registry::InMemoryRegistry;

    #[derive(Default)]
    struct Service {
        status: Mutex<String>,
        starts: AtomicUsize,
    }

    impl ManagedResource for Service {
        fn invoke(&self, operation: &str, _args: &[Value], _signature: &[String]) -> Result<Value, InvocationError> {
            match operation {
                "start" => {
                    self.starts.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Bool(true))
                }
                "ping" => Ok(Value::from("pong")),
                "crash" => Err(InvocationError::failed("crash", "exploded")),
                other => Err(InvocationError::UnknownOperation {
                    operation: other.to_string(),
                }),
            }
        }

        fn get_attribute(&self, name: &str) -> Result<Value, InvocationError> {
            match name {
                "Status" => Ok(Value::from(self.status.lock().unwrap().clone())),
                other => Err(InvocationError::UnknownAttribute {
                    attribute: other.to_string(),
                }),
            }
        }

        fn set_attribute(&self, name: &str, value: Value) -> Result<(), InvocationError> {
            match (name, value) {
                ("Status", Value::String(s)) => {
                    *self.status.lock().unwrap() = s;
                    Ok(())
                }
                (other, _) => Err(InvocationError::UnknownAttribute {
                    attribute: other.to_string(),
                }),
            }
        }
    }

    struct Unmanageable;

    impl ManagedResource for Unmanageable {
        fn invoke(&self, _operation: &str, _args: &[Value], _signature: &[String]) -> Result<Value, InvocationError> {
            Ok(Value::Null)
        }

        fn check_manageable(&self) -> Result<(), String> {
            Err("no management interface".to_string())
        }
    }

    fn proxy() -> ManagedResourceProxy {
        ManagedResourceProxy::bound(
            ObjectName::parse("app:type=Service").unwrap(),
            Arc::new(SequenceGenerator::new()),
            Service::default(),
        )
        .unwrap()
    }

    fn collect(proxy: &ManagedResourceProxy) -> Arc<Mutex<Vec<Notification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        proxy.add_notification_listener(
            Arc::new(move |n: &Notification, _: Option<&Handback>| -> Result<(), DeliveryError> {
                sink.lock().unwrap().push(n.clone());
                Ok(())
            }),
            None,
            None,
        );
        seen
    }

    #[test]
    fn test_set_target_rejected_keeps_proxy_unbound() {
        let proxy = ManagedResourceProxy::new(
            ObjectName::parse("app:type=Broken").unwrap(),
            Arc::new(SequenceGenerator::new()),
        );
        let err = proxy.set_target(Unmanageable).unwrap_err();
        assert!(matches!(err, BindingError::Rejected { ref reason, .. } if reason == "no management interface"));
        assert!(!proxy.is_bound());
    }

    #[test]
    fn test_set_target_unsupported_resource_type() {
        let config = ProxyConfig {
            resource_type: "Handle".to_string(),
            ..ProxyConfig::default()
        };
        let proxy = ManagedResourceProxy::with_config(
            ObjectName::parse("app:type=Service").unwrap(),
            Arc::new(SequenceGenerator::new()),
            config,
        );
        let err = proxy.set_target(Service::default()).unwrap_err();
        assert_eq!(
            err,
            BindingError::UnsupportedResourceType {
                resource_type: "Handle".to_string()
            }
        );
    }

    #[test]
    fn test_invoke_without_listener_emits_nothing() {
        let proxy = proxy();
        let seen = collect(&proxy);
        assert_eq!(proxy.invoke("ping", &[], &[]).unwrap(), Value::from("pong"));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(proxy.sequence().current(), 0);
    }

    #[test]
    fn test_invoke_unbound() {
        let proxy = ManagedResourceProxy::new(
            ObjectName::parse("app:type=Service").unwrap(),
            Arc::new(SequenceGenerator::new()),
        );
        assert!(matches!(
            proxy.invoke("start", &[], &[]),
            Err(InvocationError::NoTarget { .. })
        ));
    }

    #[test]
    fn test_operation_listener_announces_call() {
        let proxy = proxy();
        let seen = collect(&proxy);
        let report = proxy.register_call_listeners(
            ListenerDescriptor::new().with("onStart", MethodListenerSpec::operation_call("start")),
        );
        assert!(report.is_complete());
        assert_eq!(proxy.call_listener_names(), vec!["start".to_string()]);

        assert_eq!(proxy.invoke("start", &[], &[]).unwrap(), Value::Bool(true));
        let notes = seen.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].event_type, "jmx.operation.call.start");
        assert_eq!(notes[0].source, *proxy.name());
        assert_eq!(notes[0].sequence_number, 1);
    }

    #[test]
    fn test_failed_invoke_emits_nothing() {
        let proxy = proxy();
        let seen = collect(&proxy);
        let _ = proxy.register_call_listeners(
            ListenerDescriptor::new().with("onCrash", MethodListenerSpec::operation_call("crash")),
        );

        let err = proxy.invoke("crash", &[], &[]).unwrap_err();
        assert_eq!(err, InvocationError::failed("crash", "exploded"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_best_effort_batch() {
        let proxy = proxy();
        let descriptor = ListenerDescriptor::new()
            .with(
                "a_missing_target",
                MethodListenerSpec {
                    listener_type: Some("operationCallListener".to_string()),
                    ..MethodListenerSpec::default()
                },
            )
            .with("b_start", MethodListenerSpec::operation_call("start"))
            .with("c_plain", DescriptorEntry::default())
            .with(
                "d_unknown",
                MethodListenerSpec {
                    target: Some("start".to_string()),
                    listener_type: Some("timerListener".to_string()),
                    ..MethodListenerSpec::default()
                },
            );

        let report = proxy.register_call_listeners(descriptor);
        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "a_missing_target");
        assert!(report.failures[0].error.is_registration());
        assert!(report.registration("b_start").is_some());
        assert_eq!(report.skipped, vec!["c_plain".to_string(), "d_unknown".to_string()]);
        assert!(proxy.is_call_listened("start"));

        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_attribute_listener_receives_change() {
        let proxy = proxy();
        let payloads: Arc<Mutex<Vec<Payload>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&payloads);
        let spec = MethodListenerSpec::attribute_change("Status").with_callback(Callback::unary(move |_, p| {
            sink.lock().unwrap().push(p);
            Ok(())
        }));
        let report = proxy.register_call_listeners(ListenerDescriptor::new().with("onStatus", spec));
        assert!(report.is_complete());

        proxy.set_attribute("Status", Value::from("running")).unwrap();

        let payloads = payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].get("oldValue"), Some(&Value::from("")));
        assert_eq!(payloads[0].get("newValue"), Some(&Value::from("running")));
        assert_eq!(payloads[0].get("attributeType"), Some(&Value::from("string")));
        // Attribute changes do not make the attribute an announced operation.
        assert!(proxy.call_listener_names().is_empty());
    }

    #[test]
    fn test_attribute_listener_ignores_other_attributes() {
        let proxy = proxy();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let spec = MethodListenerSpec::attribute_change("Load").with_callback(Callback::nullary(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let _ = proxy.register_call_listeners(ListenerDescriptor::new().with("onLoad", spec));

        proxy.set_attribute("Status", Value::from("running")).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_attribute_listener_falls_back_to_target() {
        let proxy = proxy();
        let spec = MethodListenerSpec {
            target: Some("Status".to_string()),
            listener_type: Some("attributeChangeListener".to_string()),
            ..MethodListenerSpec::default()
        };
        let report = proxy.register_call_listeners(ListenerDescriptor::new().with("onStatus", spec));
        let registration = report.registration("onStatus").unwrap();
        assert_eq!(registration.kind, ListenerKind::AttributeChange);
        assert_eq!(proxy.listener_count(), 1);
    }

    #[test]
    fn test_model_info_enforced() {
        let proxy = proxy().with_model_info(
            ModelInfo::new()
                .with_attribute(AttributeInfo::new("Status", "text").read_only())
                .with_operation(OperationInfo::new("start")),
        );

        assert!(matches!(
            proxy.invoke("ping", &[], &[]),
            Err(InvocationError::UnknownOperation { .. })
        ));
        assert!(proxy.invoke("start", &[], &[]).is_ok());
        assert!(matches!(
            proxy.set_attribute("Status", Value::from("x")),
            Err(InvocationError::AttributeNotWritable { .. })
        ));

        let report = proxy.register_call_listeners(
            ListenerDescriptor::new().with("onLoad", MethodListenerSpec::attribute_change("Load")),
        );
        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            BeanError::Registration(RegistrationError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_declared_attribute_type_is_reported() {
        let proxy = proxy().with_model_info(
            ModelInfo::new().with_attribute(AttributeInfo::new("Status", "text")),
        );
        let seen = collect(&proxy);
        proxy.set_attribute("Status", Value::from("running")).unwrap();

        let notes = seen.lock().unwrap();
        let change = notes[0].attribute_change.as_ref().unwrap();
        assert_eq!(change.attribute_type, "text");
    }

    #[test]
    fn test_attribute_notifications_can_be_disabled() {
        let proxy = ManagedResourceProxy::with_config(
            ObjectName::parse("app:type=Service").unwrap(),
            Arc::new(SequenceGenerator::new()),
            ProxyConfig {
                attribute_change_notifications: false,
                ..ProxyConfig::default()
            },
        );
        proxy.set_target(Service::default()).unwrap();
        let seen = collect(&proxy);

        proxy.set_attribute("Status", Value::from("running")).unwrap();
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(proxy.get_attribute("Status").unwrap(), Value::from("running"));
    }

    #[test]
    fn test_unregister_keeps_name_while_other_listener_remains() {
        let proxy = proxy();
        let report = proxy.register_call_listeners(
            ListenerDescriptor::new()
                .with("first", MethodListenerSpec::operation_call("start"))
                .with("second", MethodListenerSpec::operation_call("start")),
        );
        let first = report.registration("first").unwrap().clone();
        let second = report.registration("second").unwrap().clone();

        assert!(proxy.unregister(&first));
        assert!(!proxy.unregister(&first));
        assert!(proxy.is_call_listened("start"));

        assert!(proxy.unregister(&second));
        assert!(!proxy.is_call_listened("start"));
        assert_eq!(proxy.listener_count(), 0);
    }

    #[test]
    fn test_callback_failure_does_not_fail_invoke() {
        let proxy = proxy();
        let spec = MethodListenerSpec::operation_call("start")
            .with_callback(Callback::nullary(|_| Err(CallbackError::new("listener broke"))));
        let _ = proxy.register_call_listeners(ListenerDescriptor::new().with("onStart", spec));

        assert_eq!(proxy.invoke("start", &[], &[]).unwrap(), Value::Bool(true));

        let report = proxy.send_notification(&Notification::new(
            operation_call_type("start"),
            proxy.name().clone(),
            proxy.sequence().next(),
        ));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            DeliveryError::Callback(CallbackError::new("listener broke"))
        );
    }

    #[test]
    fn test_unregister_external_routes_local_registration() {
        let proxy = Arc::new(proxy());
        let registry = InMemoryRegistry::new();
        registry.register(proxy.clone()).unwrap();

        let report = proxy.register_call_listeners(
            ListenerDescriptor::new().with("onPing", MethodListenerSpec::operation_call("ping")),
        );
        let registration = report.registration("onPing").unwrap().clone();

        assert!(proxy.unregister_external(&registry, &registration).unwrap());
        assert_eq!(proxy.listener_count(), 0);
        assert!(proxy.call_listener_names().is_empty());

        proxy.invoke("ping", &[], &[]).unwrap();
        assert_eq!(proxy.sequence().current(), 0);
    }
}
