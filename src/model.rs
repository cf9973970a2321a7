//! Declared attribute and operation metadata.
//!
//! A proxy without [`ModelInfo`] passes every call straight to its target.
//! With it, undeclared operations and attributes are refused before the
//! target sees them, read-only attributes cannot be set, and attribute
//! change notifications carry the declared type.

use serde::{Deserialize, Serialize};

/// One declared attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    pub name: String,
    /// Type name reported as `attributeType` in change notifications.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub readable: bool,
    #[serde(default = "default_true")]
    pub writable: bool,
}

impl AttributeInfo {
    /// A readable, writable attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            readable: true,
            writable: true,
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// One declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signature: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl OperationInfo {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: Vec::new(),
            return_type: None,
        }
    }
}

/// Metadata for one managed resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub operations: Vec<OperationInfo>,
}

impl ModelInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: OperationInfo) -> Self {
        self.operations.push(operation);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Operations are matched by name only; overloads share one entry.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationInfo> {
        self.operations.iter().find(|o| o.name == name)
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let info = ModelInfo::new()
            .with_attribute(AttributeInfo::new("Status", "text"))
            .with_attribute(AttributeInfo::new("Uptime", "long").read_only())
            .with_operation(OperationInfo::new("start"));

        assert_eq!(info.attribute("Status").unwrap().type_name, "text");
        assert!(!info.attribute("Uptime").unwrap().writable);
        assert!(info.attribute("Missing").is_none());
        assert!(info.operation("start").is_some());
        assert!(info.operation("stop").is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = serde_json::json!({
            "attributes": [{ "name": "Status", "type": "string" }],
            "operations": [{ "name": "start" }]
        });
        let info: ModelInfo = serde_json::from_value(json).unwrap();
        let status = info.attribute("Status").unwrap();
        assert!(status.readable);
        assert!(status.writable);
        assert!(info.operation("start").unwrap().signature.is_empty());
        assert!(info.description.is_none());
    }

    #[test]
    fn test_built_and_parsed_declarations_agree() {
        let parsed: AttributeInfo = serde_json::from_value(serde_json::json!({ "name": "Status", "type": "text" })).unwrap();
        assert_eq!(parsed, AttributeInfo::new("Status", "text"));

        let parsed: AttributeInfo =
            serde_json::from_value(serde_json::json!({ "name": "Status", "type": "text", "writable": false })).unwrap();
        assert_eq!(parsed, AttributeInfo::new("Status", "text").read_only());
    }
}
