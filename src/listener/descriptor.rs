//! Listener descriptors consumed by the registration calls.
//!
//! Descriptors mirror the declarative layout a builder produces:
//!
//! ```text
//! { key -> { methodListener: { target, type, attribute?, callback } } }   local listeners
//! { key -> { event?, from, callback } }                                    external listeners
//! ```
//!
//! The non-callback fields deserialize from that layout; callbacks are
//! attached in code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::object_name::ObjectName;

use super::callback::Callback;

/// Descriptor `type` value for attribute change listeners.
pub const ATTRIBUTE_CHANGE_LISTENER: &str = "attributeChangeListener";

/// Descriptor `type` value for operation call listeners.
pub const OPERATION_CALL_LISTENER: &str = "operationCallListener";

/// The three listener categories, one dispatcher each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerKind {
    AttributeChange,
    OperationCall,
    ExternalEvent,
}

impl ListenerKind {
    /// Classifies a local descriptor `type`. Unknown types yield `None`.
    #[must_use]
    pub fn from_descriptor_type(listener_type: &str) -> Option<Self> {
        match listener_type {
            ATTRIBUTE_CHANGE_LISTENER => Some(Self::AttributeChange),
            OPERATION_CALL_LISTENER => Some(Self::OperationCall),
            _ => None,
        }
    }
}

/// A local listener: attribute change or operation call on the proxy itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodListenerSpec {
    /// Operation name, or attribute name when `attribute` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub listener_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(skip)]
    pub callback: Option<Callback>,
}

impl MethodListenerSpec {
    #[must_use]
    pub fn operation_call(operation: impl Into<String>) -> Self {
        Self {
            target: Some(operation.into()),
            listener_type: Some(OPERATION_CALL_LISTENER.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attribute_change(attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            listener_type: Some(ATTRIBUTE_CHANGE_LISTENER.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// The declared kind, if the `type` is recognized.
    #[must_use]
    pub fn kind(&self) -> Option<ListenerKind> {
        self.listener_type.as_deref().and_then(ListenerKind::from_descriptor_type)
    }
}

/// One entry of a local descriptor. Entries without a `methodListener` are
/// skipped at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_listener: Option<MethodListenerSpec>,
}

impl From<MethodListenerSpec> for DescriptorEntry {
    fn from(spec: MethodListenerSpec) -> Self {
        Self {
            method_listener: Some(spec),
        }
    }
}

/// An external listener: events broadcast by another resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventListenerSpec {
    /// Event type filter; `None` receives everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Broadcaster to subscribe to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ObjectName>,
    #[serde(skip)]
    pub callback: Option<Callback>,
}

impl EventListenerSpec {
    #[must_use]
    pub fn new(from: ObjectName) -> Self {
        Self {
            from: Some(from),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_event(mut self, event_type: impl Into<String>) -> Self {
        self.event = Some(event_type.into());
        self
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }
}

/// Keyed collection of listener specs. Entries are registered in key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerDescriptor<S> {
    entries: BTreeMap<String, S>,
}

impl<S> Default for ListenerDescriptor<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<S> ListenerDescriptor<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry under `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, spec: impl Into<S>) -> Self {
        self.insert(key, spec);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, spec: impl Into<S>) {
        self.entries.insert(key.into(), spec.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&S> {
        self.entries.get(key)
    }

    /// Attaches a callback to an entry after deserialization.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut S> {
        self.entries.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> IntoIterator for ListenerDescriptor<S> {
    type Item = (String, S);
    type IntoIter = std::collections::btree_map::IntoIter<String, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ListenerKind::from_descriptor_type("attributeChangeListener"),
            Some(ListenerKind::AttributeChange)
        );
        assert_eq!(
            ListenerKind::from_descriptor_type("operationCallListener"),
            Some(ListenerKind::OperationCall)
        );
        assert_eq!(ListenerKind::from_descriptor_type("timerListener"), None);
        assert_eq!(MethodListenerSpec::default().kind(), None);
    }

    #[test]
    fn test_local_descriptor_deserializes_builder_layout() {
        let json = serde_json::json!({
            "onStart": { "methodListener": { "target": "start", "type": "operationCallListener" } },
            "onStatus": { "methodListener": { "target": "Status", "type": "attributeChangeListener", "attribute": "Status" } },
            "plain": {}
        });
        let mut desc: ListenerDescriptor<DescriptorEntry> = serde_json::from_value(json).unwrap();
        assert_eq!(desc.len(), 3);

        let start = desc.get("onStart").unwrap().method_listener.as_ref().unwrap();
        assert_eq!(start.kind(), Some(ListenerKind::OperationCall));
        assert_eq!(start.target.as_deref(), Some("start"));
        assert!(start.callback.is_none());

        let status = desc.get("onStatus").unwrap().method_listener.as_ref().unwrap();
        assert_eq!(status.attribute.as_deref(), Some("Status"));
        assert!(desc.get("plain").unwrap().method_listener.is_none());

        let entry = desc.get_mut("onStart").unwrap();
        if let Some(spec) = entry.method_listener.as_mut() {
            spec.callback = Some(Callback::nullary(|_| Ok(())));
        }
        assert!(desc.get("onStart").unwrap().method_listener.as_ref().unwrap().callback.is_some());
    }

    #[test]
    fn test_external_descriptor_deserializes() {
        let json = serde_json::json!({
            "heartbeat": { "event": "app.heartbeat", "from": "app:type=Clock" },
            "everything": { "from": "app:type=Clock" }
        });
        let desc: ListenerDescriptor<EventListenerSpec> = serde_json::from_value(json).unwrap();
        let keys: Vec<_> = desc.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["everything", "heartbeat"]);
        assert_eq!(desc.get("heartbeat").unwrap().event.as_deref(), Some("app.heartbeat"));
        assert!(desc.get("everything").unwrap().event.is_none());
        assert_eq!(
            desc.get("everything").unwrap().from,
            Some(ObjectName::parse("app:type=Clock").unwrap())
        );
    }

    #[test]
    fn test_builders() {
        let desc = ListenerDescriptor::<DescriptorEntry>::new()
            .with("a", MethodListenerSpec::operation_call("stop"))
            .with("b", MethodListenerSpec::attribute_change("Load"));
        let a = desc.get("a").unwrap().method_listener.as_ref().unwrap();
        assert_eq!(a.listener_type.as_deref(), Some(OPERATION_CALL_LISTENER));
        let b = desc.get("b").unwrap().method_listener.as_ref().unwrap();
        assert_eq!(b.kind(), Some(ListenerKind::AttributeChange));
    }
}
