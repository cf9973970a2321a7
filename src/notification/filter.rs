//! Per-registration notification filters.

use std::collections::BTreeSet;
use std::fmt;

use super::envelope::Notification;

/// Decides whether a registration receives a notification.
pub trait NotificationFilter: Send + Sync + fmt::Debug {
    /// Returns true if `notification` should be delivered.
    fn is_enabled(&self, notification: &Notification) -> bool;
}

/// Accepts notifications whose type is one of the enabled types.
///
/// Matching follows the dotted hierarchy of event types: enabling
/// `jmx.operation.call` accepts `jmx.operation.call.start`, while enabling
/// `jmx.operation.call.start` does not accept `jmx.operation.call.startAll`.
/// This is stricter than a plain string prefix: a subscriber enabling
/// `clock.tick` receives `clock.tick.minute` but not `clock.ticker`.
///
/// # Examples
///
/// ```
/// use modelbean::TypeFilter;
///
/// let filter = TypeFilter::new().enable_type("jmx.operation.call");
/// assert!(filter.matches_type("jmx.operation.call.start"));
/// assert!(!filter.matches_type("jmx.attribute.change"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    enabled: BTreeSet<String>,
}

impl TypeFilter {
    /// A filter with no enabled types; it rejects everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter enabling exactly one type.
    #[must_use]
    pub fn for_type(event_type: impl Into<String>) -> Self {
        Self::new().enable_type(event_type)
    }

    #[must_use]
    pub fn enable_type(mut self, event_type: impl Into<String>) -> Self {
        self.enabled.insert(event_type.into());
        self
    }

    /// The enabled types in lexical order.
    pub fn enabled_types(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    #[must_use]
    pub fn matches_type(&self, event_type: &str) -> bool {
        self.enabled.iter().any(|enabled| {
            event_type
                .strip_prefix(enabled.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    }
}

impl NotificationFilter for TypeFilter {
    fn is_enabled(&self, notification: &Notification) -> bool {
        self.matches_type(&notification.event_type)
    }
}

/// Accepts attribute change notifications for the enabled attributes.
///
/// An empty filter built with [`all_attributes`](Self::all_attributes)
/// accepts every attribute change; anything that is not an attribute change
/// is always rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeChangeFilter {
    attributes: Option<BTreeSet<String>>,
}

impl AttributeChangeFilter {
    #[must_use]
    pub fn all_attributes() -> Self {
        Self { attributes: None }
    }

    #[must_use]
    pub fn for_attribute(name: impl Into<String>) -> Self {
        Self {
            attributes: Some(BTreeSet::from([name.into()])),
        }
    }

    #[must_use]
    pub fn enable_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.get_or_insert_with(BTreeSet::new).insert(name.into());
        self
    }
}

impl NotificationFilter for AttributeChangeFilter {
    fn is_enabled(&self, notification: &Notification) -> bool {
        let Some(change) = &notification.attribute_change else {
            return false;
        };
        self.attributes
            .as_ref()
            .map_or(true, |names| names.contains(&change.attribute_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_filter_matches_whole_segments() {
        let filter = TypeFilter::for_type("clock.tick");
        assert!(filter.matches_type("clock.tick"));
        assert!(filter.matches_type("clock.tick.minute"));
        assert!(!filter.matches_type("clock.ticker"));
    }
    use crate::notification::envelope::AttributeChange;
    use crate::object_name::ObjectName;
    use crate::value::Value;

    fn note(event_type: &str) -> Notification {
        Notification::new(event_type, ObjectName::parse("app:type=T").unwrap(), 1)
    }

    fn change(attribute: &str) -> Notification {
        Notification::attribute_change(
            ObjectName::parse("app:type=T").unwrap(),
            1,
            AttributeChange {
                attribute_name: attribute.to_string(),
                attribute_type: "int".to_string(),
                old_value: Value::Int(0),
                new_value: Value::Int(1),
            },
        )
    }

    #[test]
    fn test_type_filter_exact_and_hierarchy() {
        let filter = TypeFilter::for_type("jmx.operation.call.start");
        assert!(filter.is_enabled(&note("jmx.operation.call.start")));
        assert!(filter.is_enabled(&note("jmx.operation.call.start.phase2")));
        assert!(!filter.is_enabled(&note("jmx.operation.call.startAll")));
        assert!(!filter.is_enabled(&note("jmx.operation.call")));
    }

    #[test]
    fn test_type_filter_empty_rejects_all() {
        assert!(!TypeFilter::new().is_enabled(&note("anything")));
    }

    #[test]
    fn test_type_filter_multiple_types() {
        let filter = TypeFilter::new().enable_type("a.b").enable_type("c");
        assert!(filter.matches_type("a.b"));
        assert!(filter.matches_type("c.d"));
        assert!(!filter.matches_type("a"));
        assert_eq!(filter.enabled_types().collect::<Vec<_>>(), vec!["a.b", "c"]);
    }

    #[test]
    fn test_attribute_filter() {
        let filter = AttributeChangeFilter::for_attribute("Status");
        assert!(filter.is_enabled(&change("Status")));
        assert!(!filter.is_enabled(&change("Load")));
        assert!(!filter.is_enabled(&note("jmx.attribute.change")));

        let any = AttributeChangeFilter::all_attributes();
        assert!(any.is_enabled(&change("Load")));

        let two = AttributeChangeFilter::for_attribute("Status").enable_attribute("Load");
        assert!(two.is_enabled(&change("Load")));
    }
}
